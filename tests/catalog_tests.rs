//! Integration tests for the built-in operation catalog and option
//! validation against it.

use chrono::{TimeZone, Utc};
use mws_api::marshal::{flatten, transform, ValidationError};
use mws_api::{CallOptions, SchemaRegistry};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

fn schema(registry: &SchemaRegistry, name: &str) -> mws_api::schema::ParameterSchema {
    registry
        .get(name)
        .and_then(|descriptor| descriptor.parameters)
        .unwrap_or_else(|| panic!("{name} has no parameter schema"))
}

#[test]
fn test_builtin_catalog_is_consistent() {
    let registry = SchemaRegistry::builtin();
    assert!(!registry.is_empty());

    for name in registry.names() {
        let descriptor = registry.get(name).unwrap();
        assert_eq!(descriptor.name, name);
        assert!(descriptor.resource_path().starts_with('/'), "{name}");
        assert!(!descriptor.protocol_version().is_empty(), "{name}");
        if let Some(quota) = descriptor.quota {
            assert!(quota.is_usable(), "{name} has an unusable quota");
        }
    }
}

#[test]
fn test_core_operations_are_registered() {
    let registry = SchemaRegistry::builtin();
    for name in [
        "ListOrders",
        "ListOrdersByNextToken",
        "GetOrder",
        "ListOrderItems",
        "ListMarketplaceParticipations",
        "RequestReport",
        "GetReportRequestList",
        "GetReportList",
        "GetReport",
        "SubmitFeed",
    ] {
        assert!(registry.contains(name), "{name} is missing");
    }
}

#[test]
fn test_marketplace_list_cap_is_fifty() {
    let registry = SchemaRegistry::builtin();
    let list_orders = schema(&registry, "ListOrders");
    let ids = |n: usize| -> Vec<String> { (0..n).map(|i| format!("M{i}")).collect() };

    let query = assert_ok!(transform(
        list_orders,
        &CallOptions::new().set("MarketplaceId", ids(50))
    ));
    assert_eq!(query["MarketplaceId.Id.50"], "M49");

    let error = assert_err!(transform(
        list_orders,
        &CallOptions::new().set("MarketplaceId", ids(51))
    ));
    assert_eq!(
        error,
        ValidationError::ListTooLong {
            name: "MarketplaceId".to_string(),
            max: 50,
            len: 51,
        }
    );
}

#[test]
fn test_native_dates_are_sent_as_iso_strings() {
    let registry = SchemaRegistry::builtin();
    let created_after = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();

    let query = assert_ok!(transform(
        schema(&registry, "ListOrders"),
        &CallOptions::new()
            .set("MarketplaceId", vec!["ATVPDKIKX0DER"])
            .set("CreatedAfter", created_after)
    ));

    assert_eq!(query["CreatedAfter"], "2024-03-01T12:30:00.000Z");
}

#[test]
fn test_date_strings_that_do_not_round_trip_are_rejected() {
    let registry = SchemaRegistry::builtin();
    let list_orders = schema(&registry, "ListOrders");
    let with_date = |date: &str| {
        CallOptions::new()
            .set("MarketplaceId", vec!["ATVPDKIKX0DER"])
            .set("CreatedAfter", date)
    };

    assert_ok!(transform(list_orders, &with_date("2024-03-01T12:30:00.000Z")));
    assert_err!(transform(list_orders, &with_date("2024-03-01")));
    assert_err!(transform(list_orders, &with_date("yesterday")));
}

#[test]
fn test_max_results_range() {
    let registry = SchemaRegistry::builtin();
    let list_orders = schema(&registry, "ListOrders");
    let with_max = |max: i64| {
        CallOptions::new()
            .set("MarketplaceId", vec!["ATVPDKIKX0DER"])
            .set("MaxResultsPerPage", max)
    };

    assert_ok!(transform(list_orders, &with_max(1)));
    assert_ok!(transform(list_orders, &with_max(100)));
    assert!(matches!(
        transform(list_orders, &with_max(101)),
        Err(ValidationError::OutOfRange { max: 100, .. })
    ));
}

#[test]
fn test_flatten_twice_equals_flatten_once() {
    let tree = json!({
        "R": {
            "A": [["x"]],
            "B": [{"C": ["1"], "D": ["2", "3"]}],
            "E": []
        }
    });

    let once = flatten(tree);
    assert_eq!(flatten(once.clone()), once);
    assert_eq!(
        once,
        json!({"R": {"A": "x", "B": {"C": "1", "D": ["2", "3"]}, "E": []}})
    );
}
