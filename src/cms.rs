//! CMS collaborator.
//!
//! The market-data layer reads the Investors settings (report nonce, display
//! defaults) and reads/overwrites a single header snapshot row. Both live in
//! the site's CMS; [`CmsStore`] is the seam. [`MemoryCms`] backs tests and
//! the default binary, [`JsonFileCms`] persists to a JSON document on disk.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{MarketDataError, Result};
use crate::types::cms::{HeaderSnapshot, InvestorsSettings};

/// Read/write interface to the CMS records this crate touches.
#[async_trait]
pub trait CmsStore: Send + Sync {
    /// Current Investors settings. Read per request, never cached.
    async fn settings(&self) -> Result<InvestorsSettings>;

    /// Last written header snapshot, if any.
    async fn header_snapshot(&self) -> Result<Option<HeaderSnapshot>>;

    /// Overwrite the header snapshot row. Last write wins.
    async fn write_header_snapshot(&self, snapshot: &HeaderSnapshot) -> Result<()>;
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// CMS records held in memory.
#[derive(Debug, Default)]
pub struct MemoryCms {
    document: RwLock<CmsDocument>,
}

impl MemoryCms {
    /// Store seeded with `settings` and no header snapshot.
    pub fn new(settings: InvestorsSettings) -> Self {
        Self {
            document: RwLock::new(CmsDocument {
                settings,
                header: None,
            }),
        }
    }

    /// Replace the settings, e.g. to rotate the nonce.
    pub async fn set_settings(&self, settings: InvestorsSettings) {
        self.document.write().await.settings = settings;
    }
}

#[async_trait]
impl CmsStore for MemoryCms {
    async fn settings(&self) -> Result<InvestorsSettings> {
        Ok(self.document.read().await.settings.clone())
    }

    async fn header_snapshot(&self) -> Result<Option<HeaderSnapshot>> {
        Ok(self.document.read().await.header.clone())
    }

    async fn write_header_snapshot(&self, snapshot: &HeaderSnapshot) -> Result<()> {
        self.document.write().await.header = Some(snapshot.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// On-disk layout shared by both stores.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CmsDocument {
    #[serde(default)]
    settings: InvestorsSettings,
    #[serde(default)]
    header: Option<HeaderSnapshot>,
}

/// CMS records persisted as one JSON document.
///
/// The file is re-read on every call so edits made by the CMS side (a new
/// nonce, say) take effect without a restart. Writes go to a sibling temp
/// file that is then renamed over the original.
#[derive(Debug)]
pub struct JsonFileCms {
    path: PathBuf,
    // serializes read-modify-write cycles within this process
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonFileCms {
    /// Store backed by the JSON document at `path`. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<CmsDocument> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(CmsDocument::default()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                MarketDataError::Cms(format!("invalid CMS document {}: {e}", self.path.display()))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(CmsDocument::default()),
            Err(e) => Err(MarketDataError::Cms(format!(
                "cannot read {}: {e}",
                self.path.display()
            ))),
        }
    }

    async fn store(&self, doc: &CmsDocument) -> Result<()> {
        let json = serde_json::to_vec_pretty(doc)
            .map_err(|e| MarketDataError::Cms(format!("cannot encode CMS document: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| MarketDataError::Cms(format!("cannot write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            MarketDataError::Cms(format!("cannot replace {}: {e}", self.path.display()))
        })
    }
}

#[async_trait]
impl CmsStore for JsonFileCms {
    async fn settings(&self) -> Result<InvestorsSettings> {
        Ok(self.load().await?.settings)
    }

    async fn header_snapshot(&self) -> Result<Option<HeaderSnapshot>> {
        Ok(self.load().await?.header)
    }

    async fn write_header_snapshot(&self, snapshot: &HeaderSnapshot) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        doc.header = Some(snapshot.clone());
        self.store(&doc).await?;
        tracing::debug!(path = %self.path.display(), price = %snapshot.price, "header snapshot written");
        Ok(())
    }
}
