//! Integration tests for configuration loading.

use std::collections::HashMap;
use std::time::Duration;

use mws_api::{
    AccessKeyId, ConfigError, EndpointUrl, MwsConfig, Region, SecretKey, SellerId, ThrottleConfig,
};

fn lookup_from(pairs: &[(&'static str, &str)]) -> impl Fn(&'static str) -> Option<String> {
    let vars: HashMap<&'static str, String> = pairs
        .iter()
        .map(|(name, value)| (*name, (*value).to_string()))
        .collect();
    move |name| vars.get(name).cloned()
}

const REQUIRED: [(&str, &str); 3] = [
    ("MWS_ACCESS_KEY", "AKIDEXAMPLE"),
    ("MWS_SECRET_ACCESS_KEY", "secret"),
    ("MWS_MERCHANT_ID", "A1SELLER"),
];

#[test]
fn test_from_lookup_reads_required_variables() {
    let config = MwsConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();

    assert_eq!(config.access_key_id().as_ref(), "AKIDEXAMPLE");
    assert_eq!(config.seller_id().as_ref(), "A1SELLER");
    assert!(config.auth_token().is_none());
    assert_eq!(config.region(), Region::NorthAmerica);
    assert_eq!(config.endpoint().authority(), "mws.amazonservices.com");
}

#[test]
fn test_from_lookup_reads_optional_variables() {
    let mut pairs = REQUIRED.to_vec();
    pairs.push(("MWS_AUTH_TOKEN", "amzn.mws.token"));
    pairs.push(("MWS_REGION", "eu"));

    let config = MwsConfig::from_lookup(lookup_from(&pairs)).unwrap();

    assert_eq!(config.auth_token().unwrap().as_ref(), "amzn.mws.token");
    assert_eq!(config.region(), Region::Europe);
    assert_eq!(config.endpoint().authority(), "mws-eu.amazonservices.com");
}

#[test]
fn test_from_lookup_reports_first_missing_variable() {
    let result = MwsConfig::from_lookup(lookup_from(&REQUIRED[..2]));

    assert!(matches!(
        result,
        Err(ConfigError::MissingEnvironmentVariable {
            name: "MWS_MERCHANT_ID"
        })
    ));
}

#[test]
fn test_from_lookup_rejects_unknown_region() {
    let mut pairs = REQUIRED.to_vec();
    pairs.push(("MWS_REGION", "atlantis"));

    let result = MwsConfig::from_lookup(lookup_from(&pairs));
    assert!(matches!(result, Err(ConfigError::InvalidRegion { .. })));
}

#[test]
fn test_endpoint_override_wins_over_region() {
    let config = MwsConfig::builder()
        .access_key_id(AccessKeyId::new("AKIDEXAMPLE").unwrap())
        .secret_key(SecretKey::new("secret").unwrap())
        .seller_id(SellerId::new("A1SELLER").unwrap())
        .region(Region::Japan)
        .endpoint(EndpointUrl::new("http://127.0.0.1:8080").unwrap())
        .build()
        .unwrap();

    assert_eq!(config.endpoint().authority(), "127.0.0.1:8080");
    assert_eq!(config.endpoint().base(), "http://127.0.0.1:8080");
}

#[test]
fn test_builder_rejects_bad_throttle_margin() {
    let result = MwsConfig::builder()
        .access_key_id(AccessKeyId::new("AKIDEXAMPLE").unwrap())
        .secret_key(SecretKey::new("secret").unwrap())
        .seller_id(SellerId::new("A1SELLER").unwrap())
        .throttle(ThrottleConfig {
            safety_margin: 0.0,
            ..ThrottleConfig::default()
        })
        .build();

    assert!(matches!(
        result,
        Err(ConfigError::InvalidThrottleSetting {
            field: "safety_margin",
            ..
        })
    ));
}

#[test]
fn test_default_throttle_config() {
    let throttle = ThrottleConfig::default();
    assert_eq!(throttle.max_retries, 2);
    assert!((throttle.safety_margin - 1.5).abs() < f64::EPSILON);
    assert_eq!(throttle.fallback_wait, Duration::from_secs(2));
}
