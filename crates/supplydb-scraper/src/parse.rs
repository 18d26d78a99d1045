//! Strict parsers for numeric card fields.
//!
//! Every parser returns `None` rather than guessing: a price with a currency
//! symbol or a count with a thousands separator is absent, never zero.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

static PLAIN_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?$").expect("valid decimal regex"));

/// Digits, optionally followed by unit words: `"500"`, `"500 pieces"`, `"3 yrs."`.
static COUNT_WITH_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)(?:\s+[A-Za-z][A-Za-z.()]*)*$").expect("valid count regex")
});

static RATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*(%?)$").expect("valid rate regex"));

/// Parses a plain decimal price such as `"45"` or `"45.50"`.
#[must_use]
pub fn parse_price(text: &str) -> Option<Decimal> {
    let text = text.trim();
    if !PLAIN_DECIMAL.is_match(text) {
        return None;
    }
    Decimal::from_str(text).ok()
}

/// Parses a non-negative integer count with optional trailing unit words.
#[must_use]
pub fn parse_count(text: &str) -> Option<u64> {
    let caps = COUNT_WITH_UNIT.captures(text.trim())?;
    caps.get(1)?.as_str().parse::<u64>().ok()
}

/// Like [`parse_count`] but bounded to `u32`.
#[must_use]
pub fn parse_small_count(text: &str) -> Option<u32> {
    parse_count(text).and_then(|v| u32::try_from(v).ok())
}

/// Parses a response rate as a fraction in `[0, 1]`.
///
/// `"90%"` and `"0.9"` both yield `0.9`. A bare number above 1 is ambiguous
/// and treated as absent, as is any value outside the unit interval.
#[must_use]
pub fn parse_response_rate(text: &str) -> Option<f64> {
    let caps = RATE.captures(text.trim())?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let is_percent = caps.get(2).is_some_and(|m| !m.as_str().is_empty());
    let fraction = if is_percent { value / 100.0 } else { value };
    (0.0..=1.0).contains(&fraction).then_some(fraction)
}

/// The last non-empty path segment of a page URL, used as the listing category.
///
/// `"https://www.wholesalecentral.com/electronics.htm"` → `"electronics.htm"`.
#[must_use]
pub fn category_from_url(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .rfind(|segment| !segment.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod tests;
