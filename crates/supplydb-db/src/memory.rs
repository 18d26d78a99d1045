//! In-process [`RecordStore`] for tests and runs without `DATABASE_URL`.

use std::collections::BTreeMap;

use chrono::Utc;
use supplydb_core::{export_order, ScoredRecord, StoredSupplier, SupplierIdentity};
use tokio::sync::Mutex;

use crate::store::{require_identity, ChangeLogEntry, RecordStore, UpsertOutcome};
use crate::DbError;

#[derive(Debug, Default)]
struct Inner {
    entries: BTreeMap<SupplierIdentity, StoredSupplier>,
    log: Vec<ChangeLogEntry>,
}

/// A single mutex guards entries and log together, so commit order is the
/// order in which writers acquire it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl RecordStore for MemoryStore {
    async fn upsert(&self, record: &ScoredRecord) -> Result<UpsertOutcome, DbError> {
        let identity = require_identity(record)?;
        let mut inner = self.inner.lock().await;

        let revision = inner.log.len() as u64 + 1;
        let stored = StoredSupplier::from_scored(record, &identity, revision);
        let replaced = inner.entries.insert(identity.clone(), stored).is_some();
        inner.log.push(ChangeLogEntry {
            seq: revision,
            identity,
            trust_score: record.trust_score(),
            extracted_at: record.extracted_at(),
            committed_at: Utc::now(),
            replaced,
        });

        Ok(UpsertOutcome { revision, replaced })
    }

    async fn export_snapshot(&self) -> Result<Vec<StoredSupplier>, DbError> {
        let mut entries: Vec<StoredSupplier> =
            self.inner.lock().await.entries.values().cloned().collect();
        entries.sort_by(export_order);
        Ok(entries)
    }

    async fn query_by_identity(
        &self,
        identity: &SupplierIdentity,
    ) -> Result<Option<StoredSupplier>, DbError> {
        Ok(self.inner.lock().await.entries.get(identity).cloned())
    }

    async fn changes_since(&self, revision: u64) -> Result<Vec<ChangeLogEntry>, DbError> {
        let inner = self.inner.lock().await;
        let start = usize::try_from(revision).unwrap_or(usize::MAX);
        Ok(inner.log.get(start..).map(<[_]>::to_vec).unwrap_or_default())
    }
}
