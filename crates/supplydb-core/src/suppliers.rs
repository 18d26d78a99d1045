use std::collections::BTreeSet;

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Resale terms advertised on a supplier card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResaleStatus {
    Approved,
    Restricted,
    #[default]
    Unknown,
}

impl ResaleStatus {
    /// Classify free-form resale-policy text.
    ///
    /// Approval phrases win over restriction phrases when both appear.
    #[must_use]
    pub fn from_policy_text(text: Option<&str>) -> Self {
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
            return Self::Unknown;
        };
        if text.contains("Authorized Reseller") || text.contains("Bulk Orders Allowed") {
            Self::Approved
        } else if text.contains("No Resale") {
            Self::Restricted
        } else {
            Self::Unknown
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Restricted => "restricted",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ResaleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResaleStatus {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Self::Approved),
            "restricted" => Ok(Self::Restricted),
            "unknown" => Ok(Self::Unknown),
            other => Err(crate::CoreError::InvalidResaleStatus(other.to_string())),
        }
    }
}

/// One supplier card as read from a listing page.
///
/// Every scored field is an `Option`: `None` means the field was not on the
/// page (or could not be parsed) and is distinct from a present zero or an
/// empty set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub supplier_name: Option<String>,
    /// Currency-agnostic unit price.
    pub price: Option<Decimal>,
    pub minimum_order_quantity: Option<u64>,
    /// `Some(empty)` when the certification list was on the page but empty.
    pub certifications: Option<BTreeSet<String>>,
    pub years_in_business: Option<u32>,
    pub review_count: Option<u64>,
    /// Fraction in `[0, 1]`.
    pub response_rate: Option<f64>,
    /// `href` of the card's contact link.
    pub contact: Option<String>,
    pub address: Option<String>,
    pub resale_status: ResaleStatus,
    /// Last path segment of the listing page URL, e.g. `"electronics.htm"`.
    pub category: Option<String>,
    pub source_url: Option<String>,
}

/// Deduplication key for a supplier: normalized name plus source domain.
///
/// Orders lexically by name, then domain.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SupplierIdentity {
    name: String,
    domain: String,
}

impl SupplierIdentity {
    /// Build an identity from a raw supplier name and source domain.
    ///
    /// Returns `None` when the name is blank after normalization.
    #[must_use]
    pub fn new(supplier_name: &str, source_domain: &str) -> Option<Self> {
        let name = normalize_supplier_name(supplier_name);
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name,
            domain: normalize_domain(source_domain),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl std::fmt::Display for SupplierIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.name, self.domain)
    }
}

/// Lowercase, trim, and collapse internal whitespace runs to one space.
#[must_use]
pub fn normalize_supplier_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Lowercase and trim a host name, dropping a trailing root dot.
#[must_use]
pub fn normalize_domain(raw: &str) -> String {
    raw.trim().trim_end_matches('.').to_lowercase()
}

/// Output of the trust score calculator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrustScore {
    /// Integer score in `[0, 100]`.
    pub score: u8,
    /// Share of signals backed by real data, in `[0, 1]`. Zero means the score
    /// is the all-unknown baseline and should not be relied on.
    pub confidence: f64,
}

/// A candidate record with its trust score. Immutable once built; a later
/// crawl produces a new `ScoredRecord` that replaces this one in the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    record: CandidateRecord,
    source_domain: String,
    trust_score: u8,
    score_confidence: f64,
    extracted_at: DateTime<Utc>,
}

impl ScoredRecord {
    /// `extracted_at` is truncated to microseconds, the precision Postgres keeps.
    #[must_use]
    pub fn new(
        record: CandidateRecord,
        source_domain: &str,
        score: TrustScore,
        extracted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            record,
            source_domain: normalize_domain(source_domain),
            trust_score: score.score.min(100),
            score_confidence: score.confidence.clamp(0.0, 1.0),
            extracted_at: extracted_at.trunc_subsecs(6),
        }
    }

    #[must_use]
    pub fn record(&self) -> &CandidateRecord {
        &self.record
    }

    #[must_use]
    pub fn source_domain(&self) -> &str {
        &self.source_domain
    }

    #[must_use]
    pub fn trust_score(&self) -> u8 {
        self.trust_score
    }

    #[must_use]
    pub fn score_confidence(&self) -> f64 {
        self.score_confidence
    }

    #[must_use]
    pub fn extracted_at(&self) -> DateTime<Utc> {
        self.extracted_at
    }

    /// The store key for this record, or `None` if the card had no usable name.
    #[must_use]
    pub fn identity(&self) -> Option<SupplierIdentity> {
        self.record
            .supplier_name
            .as_deref()
            .and_then(|name| SupplierIdentity::new(name, &self.source_domain))
    }
}

/// The flat, exportable form of a supplier held by a record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSupplier {
    /// Normalized supplier name (identity component).
    pub identity_name: String,
    /// Normalized source domain (identity component).
    pub source_domain: String,
    /// Supplier name as displayed on the page.
    pub supplier_name: String,
    pub price: Option<Decimal>,
    pub minimum_order_quantity: Option<u64>,
    pub certifications: Option<Vec<String>>,
    pub years_in_business: Option<u32>,
    pub review_count: Option<u64>,
    pub response_rate: Option<f64>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub resale_status: ResaleStatus,
    pub category: Option<String>,
    pub source_url: Option<String>,
    pub trust_score: u8,
    pub score_confidence: f64,
    pub extracted_at: DateTime<Utc>,
    /// Change-log sequence number of the upsert that wrote this entry.
    pub revision: u64,
}

impl StoredSupplier {
    /// Flatten a scored record into its stored form. Every field is taken from
    /// `scored`; nothing carries over from any previous entry.
    #[must_use]
    pub fn from_scored(scored: &ScoredRecord, identity: &SupplierIdentity, revision: u64) -> Self {
        let record = scored.record();
        Self {
            identity_name: identity.name().to_string(),
            source_domain: identity.domain().to_string(),
            supplier_name: record
                .supplier_name
                .as_deref()
                .map_or_else(|| identity.name().to_string(), |n| n.trim().to_string()),
            price: record.price,
            minimum_order_quantity: record.minimum_order_quantity,
            certifications: record
                .certifications
                .as_ref()
                .map(|set| set.iter().cloned().collect()),
            years_in_business: record.years_in_business,
            review_count: record.review_count,
            response_rate: record.response_rate,
            contact: record.contact.clone(),
            address: record.address.clone(),
            resale_status: record.resale_status,
            category: record.category.clone(),
            source_url: record.source_url.clone(),
            trust_score: scored.trust_score(),
            score_confidence: scored.score_confidence(),
            extracted_at: scored.extracted_at(),
            revision,
        }
    }

    #[must_use]
    pub fn identity(&self) -> SupplierIdentity {
        SupplierIdentity {
            name: self.identity_name.clone(),
            domain: self.source_domain.clone(),
        }
    }
}

/// Export ordering: trust score descending, then most recent extraction,
/// then identity ascending.
#[must_use]
pub fn export_order(a: &StoredSupplier, b: &StoredSupplier) -> std::cmp::Ordering {
    b.trust_score
        .cmp(&a.trust_score)
        .then_with(|| b.extracted_at.cmp(&a.extracted_at))
        .then_with(|| a.identity_name.cmp(&b.identity_name))
        .then_with(|| a.source_domain.cmp(&b.source_domain))
}
