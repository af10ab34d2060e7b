//! `/stock/*` handlers.
//!
//! Request bodies are optional JSON objects; an empty body means "use the
//! CMS defaults". Exchange and range strings are validated here, before any
//! provider is contacted.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::AppState;
use super::response::{ApiError, ApiResponse, ApiResult};
use crate::error::MarketDataError;
use crate::types::cms::HeaderSnapshot;
use crate::types::enums::{ChartRange, Exchange};
use crate::types::historical::{DateWindow, HistoricalRow};
use crate::types::{ChartSeries, Quote, QuoteValue};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ExchangeBody {
    #[serde(default)]
    pub exchange: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartBody {
    #[serde(default)]
    pub exchange: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WindowParams {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
}

fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> ApiResult<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid JSON body: {e}")))
}

/// An explicitly requested value, validated before the CMS is consulted.
fn explicit<T: FromStr<Err = MarketDataError>>(raw: Option<&str>) -> ApiResult<Option<T>> {
    Ok(raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .transpose()?)
}

/// `exchange`, or the CMS default when absent. The CMS is read only then.
async fn exchange_or_default(state: &AppState, exchange: Option<Exchange>) -> ApiResult<Exchange> {
    match exchange {
        Some(exchange) => Ok(exchange),
        None => Ok(state.service.settings().await?.default_exchange),
    }
}

async fn chart_selection(
    state: &AppState,
    exchange: Option<Exchange>,
    range: Option<ChartRange>,
) -> ApiResult<(Exchange, ChartRange)> {
    if let (Some(exchange), Some(range)) = (exchange, range) {
        return Ok((exchange, range));
    }
    let settings = state.service.settings().await?;
    Ok((
        exchange.unwrap_or(settings.default_exchange),
        range.unwrap_or(settings.default_range),
    ))
}

fn parse_window(from: Option<&str>, to: Option<&str>) -> ApiResult<Option<DateWindow>> {
    let blank = |s: &&str| !s.trim().is_empty();
    Ok(DateWindow::from_params(from.filter(blank), to.filter(blank))?)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
}

/// GET /health
pub async fn health() -> ApiResponse<Health> {
    ApiResponse::success(Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /stock/
pub async fn header_snapshot(
    State(state): State<Arc<AppState>>,
) -> ApiResult<ApiResponse<HeaderSnapshot>> {
    let snapshot = state
        .service
        .header_snapshot()
        .await?
        .ok_or_else(|| ApiError::NotFound("no header snapshot has been written".into()))?;
    Ok(ApiResponse::success(snapshot))
}

/// POST /stock/external
pub async fn external_quote(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<ApiResponse<Quote>> {
    let body: ExchangeBody = parse_body(&body)?;
    let exchange = exchange_or_default(&state, explicit(body.exchange.as_deref())?).await?;

    let quote = state.service.get_quote(exchange).await?;
    if state.service.mirrors_header_on_quote() {
        // detached; the response does not wait for the CMS
        drop(state.service.refresh_header_snapshot(&quote));
    }
    Ok(ApiResponse::success(quote))
}

/// POST /stock/quote-value
pub async fn quote_value(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<ApiResponse<QuoteValue>> {
    let body: ExchangeBody = parse_body(&body)?;
    let exchange = exchange_or_default(&state, explicit(body.exchange.as_deref())?).await?;

    let quote = state.service.get_quote(exchange).await?;
    Ok(ApiResponse::success(QuoteValue::from(&quote)))
}

/// POST /stock/chart-data
pub async fn chart_data(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<ApiResponse<ChartSeries>> {
    let body: ChartBody = parse_body(&body)?;
    let exchange = explicit(body.exchange.as_deref())?;
    let range = explicit(body.range.as_deref())?;
    let window = parse_window(body.from.as_deref(), body.to.as_deref())?;
    let (exchange, range) = chart_selection(&state, exchange, range).await?;

    let series = state.service.get_chart(exchange, range, window).await?;
    Ok(ApiResponse::success(series))
}

/// POST /stock/intraday-chart
pub async fn intraday_chart(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<ApiResponse<ChartSeries>> {
    let body: ExchangeBody = parse_body(&body)?;
    let exchange = exchange_or_default(&state, explicit(body.exchange.as_deref())?).await?;

    let series = state.service.get_intraday(exchange).await?;
    Ok(ApiResponse::success(series))
}

/// POST /stock/chart-by-api
pub async fn chart_by_api(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<ApiResponse<ChartSeries>> {
    let body: ChartBody = parse_body(&body)?;
    let exchange = explicit(body.exchange.as_deref())?;
    let window = parse_window(body.from.as_deref(), body.to.as_deref())?;
    let exchange = exchange_or_default(&state, exchange).await?;

    let series = state.service.get_chart_by_api(exchange, window).await?;
    Ok(ApiResponse::success(series))
}

/// GET /stock/historical/{type}
pub async fn historical(
    State(state): State<Arc<AppState>>,
    Path(kind): Path<String>,
    Query(params): Query<WindowParams>,
) -> ApiResult<ApiResponse<Vec<HistoricalRow>>> {
    let exchange: Exchange = kind.parse()?;
    let window = parse_window(params.from.as_deref(), params.to.as_deref())?;

    let rows = state.service.get_historical(exchange, window).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /stock/update-header (admin only)
pub async fn update_header(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<ApiResponse<HeaderSnapshot>> {
    let body: ExchangeBody = parse_body(&body)?;
    let exchange = exchange_or_default(&state, explicit(body.exchange.as_deref())?).await?;

    let snapshot = state.service.update_header(exchange).await?;
    Ok(ApiResponse::success(snapshot))
}
