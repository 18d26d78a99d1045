//! Durable [`RecordStore`] backed by the `suppliers` and `supplier_changes` tables.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use supplydb_core::{
    AppConfig, ResaleStatus, ScoredRecord, StoredSupplier, SupplierIdentity,
};

use crate::retry::retry_on_conflict;
use crate::store::{require_identity, ChangeLogEntry, RecordStore, UpsertOutcome};
use crate::DbError;

/// Advisory lock key taken by every upsert transaction. Writers queue on it,
/// which makes `supplier_changes.seq` order equal commit order.
const WRITE_LOCK_KEY: i64 = 0x5355_5050_4c59;

const SUPPLIER_COLUMNS: &str = "identity_name, source_domain, supplier_name, price, \
     minimum_order_quantity, certifications, years_in_business, review_count, \
     response_rate, contact, address, resale_status, category, source_url, \
     trust_score, score_confidence, extracted_at, revision";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `suppliers` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SupplierRow {
    pub identity_name: String,
    pub source_domain: String,
    pub supplier_name: String,
    pub price: Option<Decimal>,
    pub minimum_order_quantity: Option<i64>,
    pub certifications: Option<Vec<String>>,
    pub years_in_business: Option<i32>,
    pub review_count: Option<i64>,
    pub response_rate: Option<f64>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub resale_status: String,
    pub category: Option<String>,
    pub source_url: Option<String>,
    pub trust_score: i16,
    pub score_confidence: f64,
    pub extracted_at: DateTime<Utc>,
    pub revision: i64,
}

/// A row from the `supplier_changes` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChangeRow {
    pub seq: i64,
    pub identity_name: String,
    pub source_domain: String,
    pub trust_score: i16,
    pub extracted_at: DateTime<Utc>,
    pub committed_at: DateTime<Utc>,
    pub replaced: bool,
}

fn out_of_range(field: &str) -> DbError {
    DbError::InvalidRow(format!("{field} is out of range"))
}

fn opt_to_i64(value: Option<u64>, field: &str) -> Result<Option<i64>, DbError> {
    value
        .map(|v| i64::try_from(v).map_err(|_| out_of_range(field)))
        .transpose()
}

fn opt_to_u64(value: Option<i64>, field: &str) -> Result<Option<u64>, DbError> {
    value
        .map(|v| u64::try_from(v).map_err(|_| out_of_range(field)))
        .transpose()
}

impl TryFrom<SupplierRow> for StoredSupplier {
    type Error = DbError;

    fn try_from(row: SupplierRow) -> Result<Self, Self::Error> {
        let resale_status: ResaleStatus = row
            .resale_status
            .parse()
            .map_err(|e: supplydb_core::CoreError| DbError::InvalidRow(e.to_string()))?;
        Ok(Self {
            identity_name: row.identity_name,
            source_domain: row.source_domain,
            supplier_name: row.supplier_name,
            price: row.price,
            minimum_order_quantity: opt_to_u64(
                row.minimum_order_quantity,
                "minimum_order_quantity",
            )?,
            certifications: row.certifications,
            years_in_business: row
                .years_in_business
                .map(|y| u32::try_from(y).map_err(|_| out_of_range("years_in_business")))
                .transpose()?,
            review_count: opt_to_u64(row.review_count, "review_count")?,
            response_rate: row.response_rate,
            contact: row.contact,
            address: row.address,
            resale_status,
            category: row.category,
            source_url: row.source_url,
            trust_score: u8::try_from(row.trust_score).map_err(|_| out_of_range("trust_score"))?,
            score_confidence: row.score_confidence,
            extracted_at: row.extracted_at,
            revision: u64::try_from(row.revision).map_err(|_| out_of_range("revision"))?,
        })
    }
}

impl TryFrom<ChangeRow> for ChangeLogEntry {
    type Error = DbError;

    fn try_from(row: ChangeRow) -> Result<Self, Self::Error> {
        let identity = SupplierIdentity::new(&row.identity_name, &row.source_domain)
            .ok_or_else(|| DbError::InvalidRow(format!("change {} has an empty identity", row.seq)))?;
        Ok(Self {
            seq: u64::try_from(row.seq).map_err(|_| out_of_range("seq"))?,
            identity,
            trust_score: u8::try_from(row.trust_score).map_err(|_| out_of_range("trust_score"))?,
            extracted_at: row.extracted_at,
            committed_at: row.committed_at,
            replaced: row.replaced,
        })
    }
}

// ---------------------------------------------------------------------------
// PgStore
// ---------------------------------------------------------------------------

/// Postgres-backed store. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    max_retries: u32,
    retry_backoff_ms: u64,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            max_retries: 3,
            retry_backoff_ms: 50,
        }
    }

    /// Apply the write-conflict retry policy from `config`.
    #[must_use]
    pub fn with_retry_policy(mut self, config: &AppConfig) -> Self {
        self.max_retries = config.store_max_retries;
        self.retry_backoff_ms = config.store_retry_backoff_ms;
        self
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// One upsert transaction: take the write lock, append to the change log,
    /// then replace every column of the supplier row.
    async fn upsert_once(
        &self,
        identity: &SupplierIdentity,
        stored: &StoredSupplier,
    ) -> Result<UpsertOutcome, DbError> {
        let moq = opt_to_i64(stored.minimum_order_quantity, "minimum_order_quantity")?;
        let reviews = opt_to_i64(stored.review_count, "review_count")?;
        let years = stored
            .years_in_business
            .map(|y| i32::try_from(y).map_err(|_| out_of_range("years_in_business")))
            .transpose()?;

        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(WRITE_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let (seq, replaced): (i64, bool) = sqlx::query_as(
            "INSERT INTO supplier_changes \
                 (identity_name, source_domain, trust_score, extracted_at, replaced) \
             VALUES ($1, $2, $3, $4, EXISTS ( \
                 SELECT 1 FROM suppliers WHERE identity_name = $1 AND source_domain = $2)) \
             RETURNING seq, replaced",
        )
        .bind(identity.name())
        .bind(identity.domain())
        .bind(i16::from(stored.trust_score))
        .bind(stored.extracted_at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO suppliers \
                 (identity_name, source_domain, supplier_name, price, minimum_order_quantity, \
                  certifications, years_in_business, review_count, response_rate, contact, \
                  address, resale_status, category, source_url, trust_score, \
                  score_confidence, extracted_at, revision) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, \
                     $11, $12, $13, $14, $15, $16, $17, $18) \
             ON CONFLICT (identity_name, source_domain) DO UPDATE SET \
                 supplier_name          = EXCLUDED.supplier_name, \
                 price                  = EXCLUDED.price, \
                 minimum_order_quantity = EXCLUDED.minimum_order_quantity, \
                 certifications         = EXCLUDED.certifications, \
                 years_in_business      = EXCLUDED.years_in_business, \
                 review_count           = EXCLUDED.review_count, \
                 response_rate          = EXCLUDED.response_rate, \
                 contact                = EXCLUDED.contact, \
                 address                = EXCLUDED.address, \
                 resale_status          = EXCLUDED.resale_status, \
                 category               = EXCLUDED.category, \
                 source_url             = EXCLUDED.source_url, \
                 trust_score            = EXCLUDED.trust_score, \
                 score_confidence       = EXCLUDED.score_confidence, \
                 extracted_at           = EXCLUDED.extracted_at, \
                 revision               = EXCLUDED.revision, \
                 updated_at             = NOW()",
        )
        .bind(&stored.identity_name)
        .bind(&stored.source_domain)
        .bind(&stored.supplier_name)
        .bind(stored.price)
        .bind(moq)
        .bind(&stored.certifications)
        .bind(years)
        .bind(reviews)
        .bind(stored.response_rate)
        .bind(&stored.contact)
        .bind(&stored.address)
        .bind(stored.resale_status.as_str())
        .bind(&stored.category)
        .bind(&stored.source_url)
        .bind(i16::from(stored.trust_score))
        .bind(stored.score_confidence)
        .bind(stored.extracted_at)
        .bind(seq)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let revision = u64::try_from(seq).map_err(|_| out_of_range("seq"))?;
        Ok(UpsertOutcome { revision, replaced })
    }
}

impl RecordStore for PgStore {
    async fn upsert(&self, record: &ScoredRecord) -> Result<UpsertOutcome, DbError> {
        let identity = require_identity(record)?;
        // Revision is filled in from the change log inside the transaction.
        let stored = StoredSupplier::from_scored(record, &identity, 0);
        let label = identity.to_string();

        let outcome = retry_on_conflict(&label, self.max_retries, self.retry_backoff_ms, || {
            self.upsert_once(&identity, &stored)
        })
        .await?;

        tracing::debug!(
            identity = %label,
            revision = outcome.revision,
            replaced = outcome.replaced,
            "supplier upserted"
        );
        Ok(outcome)
    }

    async fn export_snapshot(&self) -> Result<Vec<StoredSupplier>, DbError> {
        let rows = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers \
             ORDER BY trust_score DESC, extracted_at DESC, \
                      identity_name COLLATE \"C\" ASC, source_domain COLLATE \"C\" ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StoredSupplier::try_from).collect()
    }

    async fn query_by_identity(
        &self,
        identity: &SupplierIdentity,
    ) -> Result<Option<StoredSupplier>, DbError> {
        let row = sqlx::query_as::<_, SupplierRow>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers \
             WHERE identity_name = $1 AND source_domain = $2"
        ))
        .bind(identity.name())
        .bind(identity.domain())
        .fetch_optional(&self.pool)
        .await?;

        row.map(StoredSupplier::try_from).transpose()
    }

    async fn changes_since(&self, revision: u64) -> Result<Vec<ChangeLogEntry>, DbError> {
        let after = i64::try_from(revision).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, ChangeRow>(
            "SELECT seq, identity_name, source_domain, trust_score, extracted_at, \
                    committed_at, replaced \
             FROM supplier_changes WHERE seq > $1 ORDER BY seq ASC",
        )
        .bind(after)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ChangeLogEntry::try_from).collect()
    }
}
