//! Minimal table extraction for the historical report HTML fragment.
//!
//! The report endpoint returns a single server-rendered `<table>`. Only rows
//! and cells are needed, so a handful of regular expressions is enough; the
//! markup is never evaluated.

use std::sync::LazyLock;

use regex::Regex;

static ROW_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<tr\b[^>]*>").expect("valid row pattern"));

// `</tr>` is optional in HTML; a row also ends where the next one or its section starts.
static ROW_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</tr\s*>|<tr\b|</?t(?:head|body|foot)\b[^>]*>|</table\s*>")
        .expect("valid row end pattern")
});

static CELL_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<t([dh])\b[^>]*>").expect("valid cell pattern"));

static CELL_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</t[dh]\s*>|<t[dh]\b|</tr\s*>").expect("valid cell end pattern")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag pattern"));

static TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<table\b").expect("valid table pattern"));

/// Whether the fragment contains a table at all.
pub fn has_table(html: &str) -> bool {
    TABLE.is_match(html)
}

/// Whether any `<td>` in the fragment carries text, row structure aside.
pub fn has_data_cells(html: &str) -> bool {
    cells(html).any(|(is_data, text)| is_data && !text.is_empty())
}

/// Text of every `<td>` row. Header rows (`<th>` only) are skipped.
pub fn data_rows(html: &str) -> Vec<Vec<String>> {
    ROW_OPEN
        .find_iter(html)
        .filter_map(|open| {
            let row = until(&html[open.end()..], &ROW_END);
            let mut is_data = false;
            let texts: Vec<String> = cells(row)
                .map(|(data, text)| {
                    is_data |= data;
                    text
                })
                .collect();
            (is_data && texts.iter().any(|c| !c.is_empty())).then_some(texts)
        })
        .collect()
}

/// `(is_td, text)` for every cell opened in `fragment`.
fn cells(fragment: &str) -> impl Iterator<Item = (bool, String)> + '_ {
    CELL_OPEN.captures_iter(fragment).filter_map(move |cap| {
        let open = cap.get(0)?;
        let is_data = cap.get(1)?.as_str().eq_ignore_ascii_case("d");
        Some((is_data, cell_text(until(&fragment[open.end()..], &CELL_END))))
    })
}

/// `rest` up to the first match of `end`, or all of it.
fn until<'a>(rest: &'a str, end: &Regex) -> &'a str {
    end.find(rest).map_or(rest, |m| &rest[..m.start()])
}

fn cell_text(inner: &str) -> String {
    let text = TAG.replace_all(inner, "");
    decode_entities(&text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&#8377;", "₹")
        .replace("&#44;", ",")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
