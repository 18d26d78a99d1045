//! Signal normalization: [`CandidateRecord`] → [`NormalizedSignals`].
//!
//! Each field maps to a value in `[0, 1]` or to "unknown". Unknown signals
//! hold the configured neutral midpoint so that missing data neither
//! rewards nor punishes a supplier. Nothing here returns an error: inputs
//! out of range are clamped or marked unknown.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use supplydb_core::{CandidateRecord, ScoringConfig};

/// Number of signals feeding the trust score.
pub const SIGNAL_COUNT: usize = 6;

/// One bounded contributor to the trust score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    value: f64,
    unknown: bool,
}

impl Signal {
    /// A signal derived from real data, clamped to `[0, 1]`. NaN is unknown.
    #[must_use]
    pub fn known(value: f64, neutral: f64) -> Self {
        if value.is_nan() {
            return Self::unknown(neutral);
        }
        Self {
            value: value.clamp(0.0, 1.0),
            unknown: false,
        }
    }

    #[must_use]
    pub fn unknown(neutral: f64) -> Self {
        Self {
            value: neutral.clamp(0.0, 1.0),
            unknown: true,
        }
    }

    fn from_option(value: Option<f64>, neutral: f64) -> Self {
        value.map_or_else(|| Self::unknown(neutral), |v| Self::known(v, neutral))
    }

    /// Value used in aggregation (the neutral placeholder when unknown).
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.unknown
    }
}

/// The six normalized signals for one candidate record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedSignals {
    pub price: Signal,
    pub minimum_order_quantity: Signal,
    pub certifications: Signal,
    pub years_in_business: Signal,
    pub review_count: Signal,
    pub response_rate: Signal,
}

impl NormalizedSignals {
    /// Signals in the same order as [`supplydb_core::Weights::as_array`].
    #[must_use]
    pub fn as_array(&self) -> [Signal; SIGNAL_COUNT] {
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
    pub fn known_count(&self) -> usize {
        self.as_array().iter().filter(|s| !s.is_unknown()).count()
    }
}

/// Normalize every field of `record` against `config`.
#[must_use]
pub fn normalize_signals(record: &CandidateRecord, config: &ScoringConfig) -> NormalizedSignals {
    let neutral = config.neutral_signal;
    NormalizedSignals {
        price: Signal::from_option(
            record.price.and_then(|p| price_signal(p, config)),
            neutral,
        ),
        minimum_order_quantity: Signal::from_option(
            record
                .minimum_order_quantity
                .map(|moq| moq_signal(moq, config)),
            neutral,
        ),
        certifications: Signal::from_option(
            record
                .certifications
                .as_ref()
                .map(|certs| certification_signal(certs.iter().map(String::as_str), config)),
            neutral,
        ),
        years_in_business: Signal::from_option(
            record
                .years_in_business
                .map(|years| years_signal(years, config)),
            neutral,
        ),
        review_count: Signal::from_option(
            record.review_count.map(|n| review_signal(n, config)),
            neutral,
        ),
        response_rate: Signal::from_option(record.response_rate, neutral),
    }
}

/// Inverse price signal. `None` for non-positive prices or prices above the
/// sanity bound, which are treated as extraction errors.
///
/// - at or below `price_reference.min`: 1.0
/// - inside the band: linear from 1.0 down to `price_band_floor`
/// - above the band: linear from `price_band_floor` down to 0.0 at `price_sanity_max`
#[must_use]
pub fn price_signal(price: Decimal, config: &ScoringConfig) -> Option<f64> {
    if price <= Decimal::ZERO || price > config.price_sanity_max {
        return None;
    }
    let p = price.to_f64()?;
    let min = config.price_reference.min.to_f64()?;
    let max = config.price_reference.max.to_f64()?;
    let sanity = config.price_sanity_max.to_f64()?;
    let floor = config.price_band_floor;

    let signal = if p <= min {
        1.0
    } else if p <= max {
        1.0 - (1.0 - floor) * (p - min) / (max - min)
    } else if sanity > max {
        floor * (sanity - p) / (sanity - max)
    } else {
        0.0
    };
    Some(signal.clamp(0.0, 1.0))
}

/// MOQ signal: 1.0 inside the ideal band, falling off symmetrically in
/// log10 space on either side and reaching 0.0 `moq_falloff_decades` away
/// from the nearest band edge.
#[must_use]
pub fn moq_signal(moq: u64, config: &ScoringConfig) -> f64 {
    let band = config.moq_ideal;
    if (band.min..=band.max).contains(&moq) {
        return 1.0;
    }
    if moq == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let (moq, low, high) = (moq as f64, band.min as f64, band.max as f64);
    let decades = if moq < low {
        (low / moq).log10()
    } else {
        (moq / high).log10()
    };
    (1.0 - decades / config.moq_falloff_decades).clamp(0.0, 1.0)
}

/// Share of the certification target met by known certifications.
#[must_use]
pub fn certification_signal<'a>(
    certifications: impl Iterator<Item = &'a str>,
    config: &ScoringConfig,
) -> f64 {
    let mut seen = std::collections::BTreeSet::new();
    for cert in certifications.filter(|c| config.is_known_certification(c)) {
        seen.insert(supplydb_core::normalize_certification(cert));
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = seen.len() as f64 / f64::from(config.certification_target);
    ratio.min(1.0)
}

/// Linear in years, saturating at `years_ceiling`.
#[must_use]
pub fn years_signal(years: u32, config: &ScoringConfig) -> f64 {
    (f64::from(years) / f64::from(config.years_ceiling)).min(1.0)
}

/// `ln(1 + n) / ln(1 + saturation)`, capped at 1.0.
#[must_use]
pub fn review_signal(count: u64, config: &ScoringConfig) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let (n, saturation) = (count as f64, config.review_saturation as f64);
    (n.ln_1p() / saturation.ln_1p()).min(1.0)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
