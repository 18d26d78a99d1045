//! The persistence boundary shared by every record store.

use std::future::Future;

use chrono::{DateTime, Utc};
use supplydb_core::{ScoredRecord, StoredSupplier, SupplierIdentity};

use crate::DbError;

/// Result of a committed upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// Change-log sequence number assigned to this write.
    pub revision: u64,
    /// `true` if an entry for the identity already existed and was replaced.
    pub replaced: bool,
}

/// One committed upsert, as recorded in the change log.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeLogEntry {
    pub seq: u64,
    pub identity: SupplierIdentity,
    pub trust_score: u8,
    pub extracted_at: DateTime<Utc>,
    pub committed_at: DateTime<Utc>,
    pub replaced: bool,
}

/// Deduplicating store of scored suppliers keyed by [`SupplierIdentity`].
///
/// Upserts are atomic per identity and replace the whole entry. Concurrent
/// writers are serialized by the store: the last one to commit wins, and
/// change-log sequence numbers follow commit order.
pub trait RecordStore: Send + Sync {
    /// Insert or fully replace the entry for the record's identity.
    ///
    /// # Errors
    ///
    /// [`DbError::MissingIdentity`] if the record has no supplier name;
    /// [`DbError::Conflict`] if a durable store exhausts its retries.
    fn upsert(
        &self,
        record: &ScoredRecord,
    ) -> impl Future<Output = Result<UpsertOutcome, DbError>> + Send;

    /// Every entry, ordered by trust score desc, extracted_at desc, identity asc.
    fn export_snapshot(&self) -> impl Future<Output = Result<Vec<StoredSupplier>, DbError>> + Send;

    fn query_by_identity(
        &self,
        identity: &SupplierIdentity,
    ) -> impl Future<Output = Result<Option<StoredSupplier>, DbError>> + Send;

    /// Change-log entries with `seq > revision`, in commit order.
    fn changes_since(
        &self,
        revision: u64,
    ) -> impl Future<Output = Result<Vec<ChangeLogEntry>, DbError>> + Send;
}

pub(crate) fn require_identity(record: &ScoredRecord) -> Result<SupplierIdentity, DbError> {
    record.identity().ok_or_else(|| DbError::MissingIdentity {
        source_domain: record.source_domain().to_owned(),
    })
}
