use super::*;

#[test]
fn default_config_is_valid() {
    ScoringConfig::default()
        .validate()
        .expect("default scoring config should validate");
}

#[test]
fn default_weights_sum_to_one() {
    assert_eq!(Weights::default().sum(), Decimal::ONE);
}

#[test]
fn weights_not_summing_to_one_are_rejected() {
    let mut config = ScoringConfig::default();
    config.weights.price = Decimal::new(30, 2);
    let err = config.validate().unwrap_err();
    assert!(
        matches!(err, ConfigError::Validation(ref msg) if msg.contains("sum to 1.0")),
        "expected weight-sum validation error, got: {err:?}"
    );
}

#[test]
fn negative_weight_is_rejected_even_if_sum_is_one() {
    let mut config = ScoringConfig::default();
    config.weights.price = Decimal::new(-10, 2);
    config.weights.certifications = Decimal::new(50, 2);
    assert_eq!(config.weights.sum(), Decimal::ONE);
    assert!(config.validate().is_err());
}

#[test]
fn inverted_price_band_is_rejected() {
    let mut config = ScoringConfig::default();
    config.price_reference = PriceBand {
        min: Decimal::from(60),
        max: Decimal::from(20),
    };
    assert!(config.validate().is_err());
}

#[test]
fn zero_moq_band_minimum_is_rejected() {
    let mut config = ScoringConfig::default();
    config.moq_ideal = MoqBand { min: 0, max: 10 };
    assert!(config.validate().is_err());
}

#[test]
fn neutral_signal_outside_unit_interval_is_rejected() {
    let mut config = ScoringConfig::default();
    config.neutral_signal = 1.5;
    assert!(config.validate().is_err());
}

#[test]
fn zero_certification_target_is_rejected() {
    let mut config = ScoringConfig::default();
    config.certification_target = 0;
    assert!(config.validate().is_err());
}

#[test]
fn parse_yaml_overrides_only_given_fields() {
    let yaml = r"
years_ceiling: 15
weights:
  price: 0.25
  minimum_order_quantity: 0.15
  certifications: 0.15
  years_in_business: 0.15
  review_count: 0.15
  response_rate: 0.15
";
    let config = parse_scoring_config(yaml).expect("valid yaml");
    assert_eq!(config.years_ceiling, 15);
    assert_eq!(config.weights.price, Decimal::new(25, 2));
    assert_eq!(config.review_saturation, 500);
    assert_eq!(config.moq_ideal, MoqBand { min: 100, max: 1000 });
}

#[test]
fn parse_yaml_with_bad_weight_sum_fails_fast() {
    let yaml = r"
weights:
  price: 0.5
  minimum_order_quantity: 0.5
  certifications: 0.5
  years_in_business: 0.0
  review_count: 0.0
  response_rate: 0.0
";
    let err = parse_scoring_config(yaml).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)), "got: {err:?}");
}

#[test]
fn parse_yaml_rejects_unknown_keys() {
    let err = parse_scoring_config("price_ceiling: 10\n").unwrap_err();
    assert!(matches!(err, ConfigError::ScoringFileParse(_)), "got: {err:?}");
}

#[test]
fn load_missing_file_returns_defaults() {
    let path = std::env::temp_dir().join("supplydb-scoring-does-not-exist.yaml");
    let config = load_scoring_config(&path).expect("missing file falls back to defaults");
    assert_eq!(config, ScoringConfig::default());
}

#[test]
fn load_file_from_disk() {
    let path = std::env::temp_dir().join(format!(
        "supplydb-scoring-{}.yaml",
        std::process::id()
    ));
    std::fs::write(&path, "certification_target: 3\n").unwrap();
    let config = load_scoring_config(&path).expect("file should load");
    std::fs::remove_file(&path).ok();
    assert_eq!(config.certification_target, 3);
}

#[test]
fn normalize_certification_strips_separators_and_uppercases() {
    assert_eq!(normalize_certification("iso 9001"), "ISO9001");
    assert_eq!(normalize_certification("ISO-9001"), "ISO9001");
    assert_eq!(normalize_certification("RoHS"), "ROHS");
    assert_eq!(normalize_certification("  "), "");
}

#[test]
fn known_certification_matching_ignores_formatting() {
    let config = ScoringConfig::default();
    assert!(config.is_known_certification("ISO 9001"));
    assert!(config.is_known_certification("iso-14001"));
    assert!(!config.is_known_certification("Best Seller Badge"));
    assert!(!config.is_known_certification(""));
}

#[test]
fn empty_known_list_accepts_any_certification() {
    let config = ScoringConfig {
        known_certifications: Vec::new(),
        ..ScoringConfig::default()
    };
    assert!(config.is_known_certification("Anything Goes"));
    assert!(!config.is_known_certification(" "));
}

#[test]
fn shipped_scoring_file_matches_defaults() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/scoring.yaml");
    let config = load_scoring_config(&path).expect("shipped scoring.yaml should load");
    assert_eq!(config, ScoringConfig::default());
}
