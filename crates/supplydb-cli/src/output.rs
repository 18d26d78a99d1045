//! JSON output for `export` and `show`.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use supplydb_db::ChangeLogEntry;

/// Flat, serialisable view of a change-log entry.
#[derive(Debug, Serialize)]
pub(crate) struct ChangeView {
    pub seq: u64,
    pub identity_name: String,
    pub source_domain: String,
    pub trust_score: u8,
    pub extracted_at: DateTime<Utc>,
    pub committed_at: DateTime<Utc>,
    pub replaced: bool,
}

impl From<ChangeLogEntry> for ChangeView {
    fn from(entry: ChangeLogEntry) -> Self {
        Self {
            seq: entry.seq,
            identity_name: entry.identity.name().to_owned(),
            source_domain: entry.identity.domain().to_owned(),
            trust_score: entry.trust_score,
            extracted_at: entry.extracted_at,
            committed_at: entry.committed_at,
            replaced: entry.replaced,
        }
    }
}

/// Pretty-print `value` as JSON to `path`, or to stdout when `path` is `None`.
pub(crate) fn write_json<T: Serialize + ?Sized>(value: &T, path: Option<&Path>) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => std::fs::write(path, json + "\n")?,
        None => println!("{json}"),
    }
    Ok(())
}
