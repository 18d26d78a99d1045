//! Scoring configuration: reference bands, saturation constants, and the six
//! signal weights consumed by the normalizer and the trust score calculator.

use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Inclusive price band treated as normal for the listings being scored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    pub min: Decimal,
    pub max: Decimal,
}

/// Inclusive minimum-order-quantity band treated as ideal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoqBand {
    pub min: u64,
    pub max: u64,
}

/// Per-signal weights. Must sum to exactly `1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Weights {
    pub price: Decimal,
    pub minimum_order_quantity: Decimal,
    pub certifications: Decimal,
    pub years_in_business: Decimal,
    pub review_count: Decimal,
    pub response_rate: Decimal,
}

impl Weights {
    /// Weights in signal order: price, MOQ, certifications, years, reviews,
    /// response rate.
    #[must_use]
    pub fn as_array(&self) -> [Decimal; 6] {
        [
            self.price,
            self.minimum_order_quantity,
            self.certifications,
            self.years_in_business,
            self.review_count,
            self.response_rate,
        ]
    }

    #[must_use]
    pub fn sum(&self) -> Decimal {
        self.as_array().iter().copied().sum()
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            price: Decimal::new(20, 2),
            minimum_order_quantity: Decimal::new(15, 2),
            certifications: Decimal::new(20, 2),
            years_in_business: Decimal::new(15, 2),
            review_count: Decimal::new(15, 2),
            response_rate: Decimal::new(15, 2),
        }
    }
}

/// Everything the normalizer and calculator need, passed explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub price_reference: PriceBand,
    /// Price signal at the top of the reference band.
    pub price_band_floor: f64,
    /// Prices above this are treated as extraction errors.
    pub price_sanity_max: Decimal,
    pub moq_ideal: MoqBand,
    /// Distance in log10 units from the band edge at which the MOQ signal hits 0.
    pub moq_falloff_decades: f64,
    pub certification_target: u32,
    /// Certifications that count toward the target. Empty accepts all.
    pub known_certifications: Vec<String>,
    pub years_ceiling: u32,
    /// Review count at which the review signal saturates.
    pub review_saturation: u64,
    /// Placeholder value for unknown signals.
    pub neutral_signal: f64,
    pub weights: Weights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            price_reference: PriceBand {
                min: Decimal::from(20),
                max: Decimal::from(60),
            },
            price_band_floor: 0.8,
            price_sanity_max: Decimal::from(100_000),
            moq_ideal: MoqBand { min: 100, max: 1000 },
            moq_falloff_decades: 2.0,
            certification_target: 2,
            known_certifications: [
                "ISO9001", "ISO14001", "ISO45001", "CE", "ROHS", "FCC", "UL", "FDA", "BSCI",
                "SGS", "GMP", "HACCP", "REACH",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
            years_ceiling: 10,
            review_saturation: 500,
            neutral_signal: 0.5,
            weights: Weights::default(),
        }
    }
}

impl ScoringConfig {
    /// Check every threshold and the weight sum.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] describing the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = self.weights.as_array();
        if weights.iter().any(|w| *w < Decimal::ZERO || *w > Decimal::ONE) {
            return Err(ConfigError::Validation(
                "each weight must be within [0, 1]".to_string(),
            ));
        }
        let sum = self.weights.sum();
        if sum != Decimal::ONE {
            return Err(ConfigError::Validation(format!(
                "weights must sum to 1.0, got {sum}"
            )));
        }

        let band = self.price_reference;
        if band.min.is_sign_negative() || band.min >= band.max {
            return Err(ConfigError::Validation(format!(
                "price_reference must satisfy 0 <= min < max, got {}..{}",
                band.min, band.max
            )));
        }
        if self.price_sanity_max < band.max {
            return Err(ConfigError::Validation(format!(
                "price_sanity_max {} is below price_reference.max {}",
                self.price_sanity_max, band.max
            )));
        }
        check_unit("price_band_floor", self.price_band_floor)?;

        if self.moq_ideal.min == 0 || self.moq_ideal.min > self.moq_ideal.max {
            return Err(ConfigError::Validation(format!(
                "moq_ideal must satisfy 1 <= min <= max, got {}..{}",
                self.moq_ideal.min, self.moq_ideal.max
            )));
        }
        if !self.moq_falloff_decades.is_finite() || self.moq_falloff_decades <= 0.0 {
            return Err(ConfigError::Validation(
                "moq_falloff_decades must be a positive number".to_string(),
            ));
        }

        if self.certification_target == 0 {
            return Err(ConfigError::Validation(
                "certification_target must be at least 1".to_string(),
            ));
        }
        if self.years_ceiling == 0 {
            return Err(ConfigError::Validation(
                "years_ceiling must be at least 1".to_string(),
            ));
        }
        if self.review_saturation == 0 {
            return Err(ConfigError::Validation(
                "review_saturation must be at least 1".to_string(),
            ));
        }
        check_unit("neutral_signal", self.neutral_signal)?;

        Ok(())
    }

    /// Whether `name` counts toward the certification target.
    #[must_use]
    pub fn is_known_certification(&self, name: &str) -> bool {
        let key = normalize_certification(name);
        if key.is_empty() {
            return false;
        }
        self.known_certifications.is_empty()
            || self
                .known_certifications
                .iter()
                .any(|known| normalize_certification(known) == key)
    }
}

fn check_unit(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{field} must be within [0, 1], got {value}"
        )))
    }
}

/// Canonical form for certification names: `"iso 9001"` and `"ISO-9001"`
/// both become `"ISO9001"`.
#[must_use]
pub fn normalize_certification(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '.' | '_') && !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Load and validate scoring configuration from a YAML file.
///
/// A missing file yields the built-in defaults. Fields omitted from the file
/// keep their default values.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed, or if the
/// resulting configuration fails validation.
pub fn load_scoring_config(path: &Path) -> Result<ScoringConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_scoring_config(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            let config = ScoringConfig::default();
            config.validate()?;
            Ok(config)
        }
        Err(e) => Err(ConfigError::ScoringFileIo {
            path: path.display().to_string(),
            source: e,
        }),
    }
}

/// Parse and validate scoring configuration from YAML text.
///
/// # Errors
///
/// Returns [`ConfigError::ScoringFileParse`] on malformed YAML or
/// [`ConfigError::Validation`] on invalid values.
pub fn parse_scoring_config(content: &str) -> Result<ScoringConfig, ConfigError> {
    let config: ScoringConfig =
        serde_yaml::from_str(content).map_err(ConfigError::ScoringFileParse)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
#[path = "scoring_test.rs"]
mod tests;
