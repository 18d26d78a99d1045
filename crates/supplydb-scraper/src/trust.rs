//! Trust score calculation: weighted sum of normalized signals.
//!
//! Arithmetic is done in [`Decimal`] so the weight sum is exact and rounding
//! is reproducible. Each signal is quantised to six decimal places before
//! weighting; the scaled total is rounded half-up to an integer in `[0, 100]`.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use supplydb_core::{TrustScore, Weights};

use crate::normalize::{NormalizedSignals, Signal, SIGNAL_COUNT};

const SIGNAL_SCALE: u32 = 6;

/// Combine `signals` into a trust score and confidence.
///
/// Unknown signals contribute their neutral placeholder; `confidence` is the
/// share of signals backed by real data. An all-unknown input yields the
/// baseline score with confidence 0.
#[must_use]
pub fn compute_trust_score(signals: &NormalizedSignals, weights: &Weights) -> TrustScore {
    let weighted: Decimal = signals
        .as_array()
        .iter()
        .zip(weights.as_array())
        .map(|(signal, weight)| quantise(signal) * weight)
        .sum();

    let hundred = Decimal::ONE_HUNDRED;
    let scaled = (weighted * hundred)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .clamp(Decimal::ZERO, hundred);

    #[allow(clippy::cast_precision_loss)]
    let confidence = signals.known_count() as f64 / SIGNAL_COUNT as f64;

    TrustScore {
        score: scaled.to_u8().unwrap_or(0),
        confidence,
    }
}

/// The score every supplier gets when nothing about it is known.
#[must_use]
pub fn baseline_score(neutral_signal: f64, weights: &Weights) -> u8 {
    let unknown = Signal::unknown(neutral_signal);
    let signals = NormalizedSignals {
        price: unknown,
        minimum_order_quantity: unknown,
        certifications: unknown,
        years_in_business: unknown,
        review_count: unknown,
        response_rate: unknown,
    };
    compute_trust_score(&signals, weights).score
}

fn quantise(signal: &Signal) -> Decimal {
    Decimal::from_f64(signal.value())
        .unwrap_or(Decimal::ZERO)
        .round_dp(SIGNAL_SCALE)
        .clamp(Decimal::ZERO, Decimal::ONE)
}
