pub mod app_config;
pub mod config;
pub mod scoring;
pub mod suppliers;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use scoring::{
    load_scoring_config, normalize_certification, parse_scoring_config, MoqBand, PriceBand,
    ScoringConfig, Weights,
};
pub use suppliers::{
    export_order, normalize_domain, normalize_supplier_name, CandidateRecord, ResaleStatus,
    ScoredRecord, StoredSupplier, SupplierIdentity, TrustScore,
};

use thiserror::Error;

/// Configuration failures. Always fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read scoring config {path}: {source}")]
    ScoringFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scoring config: {0}")]
    ScoringFileParse(#[source] serde_yaml::Error),

    #[error("invalid scoring config: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid resale status: {0}")]
    InvalidResaleStatus(String),
}
