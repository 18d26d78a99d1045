use super::*;

// -----------------------------------------------------------------------
// parse_price
// -----------------------------------------------------------------------

#[test]
fn price_plain_integer() {
    assert_eq!(parse_price("45"), Some(Decimal::from(45)));
}

#[test]
fn price_plain_decimal_with_whitespace() {
    assert_eq!(parse_price("  45.50 "), Some(Decimal::new(4550, 2)));
}

#[test]
fn price_with_currency_symbol_is_absent() {
    assert_eq!(parse_price("$45"), None);
    assert_eq!(parse_price("45 USD"), None);
    assert_eq!(parse_price("€12,50"), None);
}

#[test]
fn price_with_locale_separator_is_absent() {
    assert_eq!(parse_price("1,200"), None);
    assert_eq!(parse_price("1.200,50"), None);
}

#[test]
fn price_non_numeric_is_absent() {
    assert_eq!(parse_price("N/A"), None);
    assert_eq!(parse_price(""), None);
    assert_eq!(parse_price("-5"), None);
    assert_eq!(parse_price("1e3"), None);
}

#[test]
fn price_zero_parses_as_zero() {
    assert_eq!(parse_price("0"), Some(Decimal::ZERO));
}

// -----------------------------------------------------------------------
// parse_count
// -----------------------------------------------------------------------

#[test]
fn count_bare_digits() {
    assert_eq!(parse_count("500"), Some(500));
}

#[test]
fn count_with_unit_words() {
    assert_eq!(parse_count("500 pieces"), Some(500));
    assert_eq!(parse_count("3 yrs."), Some(3));
    assert_eq!(parse_count("200 verified reviews"), Some(200));
}

#[test]
fn count_with_separator_is_absent() {
    assert_eq!(parse_count("1,200"), None);
    assert_eq!(parse_count("1 200"), None);
}

#[test]
fn count_with_leading_text_is_absent() {
    assert_eq!(parse_count("Min. order: 500"), None);
    assert_eq!(parse_count("about 5"), None);
}

#[test]
fn count_negative_or_decimal_is_absent() {
    assert_eq!(parse_count("-3"), None);
    assert_eq!(parse_count("2.5"), None);
}

#[test]
fn small_count_rejects_overflow() {
    assert_eq!(parse_small_count("12"), Some(12));
    assert_eq!(parse_small_count("99999999999"), None);
}

// -----------------------------------------------------------------------
// parse_response_rate
// -----------------------------------------------------------------------

#[test]
fn rate_percent() {
    assert_eq!(parse_response_rate("90%"), Some(0.9));
    assert_eq!(parse_response_rate("100 %"), Some(1.0));
}

#[test]
fn rate_fraction() {
    assert_eq!(parse_response_rate("0.9"), Some(0.9));
    assert_eq!(parse_response_rate("1"), Some(1.0));
    assert_eq!(parse_response_rate("0"), Some(0.0));
}

#[test]
fn rate_out_of_range_is_absent() {
    assert_eq!(parse_response_rate("120%"), None);
    assert_eq!(parse_response_rate("90"), None);
}

#[test]
fn rate_garbage_is_absent() {
    assert_eq!(parse_response_rate("fast"), None);
    assert_eq!(parse_response_rate(""), None);
}

// -----------------------------------------------------------------------
// category_from_url
// -----------------------------------------------------------------------

#[test]
fn category_is_last_path_segment() {
    assert_eq!(
        category_from_url("https://www.wholesalecentral.com/electronics.htm").as_deref(),
        Some("electronics.htm")
    );
    assert_eq!(
        category_from_url("https://www.dhgate.com/wholesale/drones.html/").as_deref(),
        Some("drones.html")
    );
}

#[test]
fn category_absent_for_root_or_invalid_url() {
    assert_eq!(category_from_url("https://example.com/"), None);
    assert_eq!(category_from_url("not a url"), None);
}
