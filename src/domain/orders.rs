//! Orders helpers.
//!
//! ```rust,ignore
//! use chrono::{Duration, Utc};
//! use mws_api::domain::orders;
//! use mws_api::CallOptions;
//!
//! let options = CallOptions::new()
//!     .set("MarketplaceId", vec!["ATVPDKIKX0DER"])
//!     .set("CreatedAfter", Utc::now() - Duration::days(7));
//!
//! for order in orders::list_orders(&dispatcher, &options).await? {
//!     println!("{} {}", order["amazonOrderId"], order["orderStatus"]);
//! }
//! ```

use serde_json::Value;

use super::{as_list, camel_records, text};
use crate::dispatch::{Dispatcher, MwsError};
use crate::marshal::CallOptions;

/// Lists orders matching `options`, following `NextToken` pages.
///
/// # Errors
///
/// Returns any [`MwsError`] raised by the underlying calls.
pub async fn list_orders(
    dispatcher: &Dispatcher,
    options: &CallOptions,
) -> Result<Vec<Value>, MwsError> {
    let mut result = dispatcher.call("ListOrders", options).await?;
    let mut orders = as_list(result.get("Orders").and_then(|o| o.get("Order")));

    while let Some(token) = text(&result, "NextToken") {
        tracing::debug!("Fetching next page of orders ({} so far)", orders.len());
        result = dispatcher
            .call(
                "ListOrdersByNextToken",
                &CallOptions::new().set("NextToken", token),
            )
            .await?;
        orders.extend(as_list(result.get("Orders").and_then(|o| o.get("Order"))));
    }

    Ok(camel_records(orders))
}

/// Fetches orders by Amazon order id (at most 50).
///
/// # Errors
///
/// Returns [`MwsError::Validation`] for an empty or oversized id list, or
/// any error raised by the call.
pub async fn get_order<S: AsRef<str>>(
    dispatcher: &Dispatcher,
    order_ids: &[S],
) -> Result<Vec<Value>, MwsError> {
    let ids: Vec<String> = order_ids.iter().map(|id| id.as_ref().to_string()).collect();
    let result = dispatcher
        .call("GetOrder", &CallOptions::new().set("AmazonOrderId", ids))
        .await?;

    Ok(camel_records(as_list(
        result.get("Orders").and_then(|o| o.get("Order")),
    )))
}

/// Lists the items of one order, following `NextToken` pages.
///
/// # Errors
///
/// Returns any [`MwsError`] raised by the underlying calls.
pub async fn list_order_items(
    dispatcher: &Dispatcher,
    order_id: &str,
) -> Result<Vec<Value>, MwsError> {
    let mut result = dispatcher
        .call(
            "ListOrderItems",
            &CallOptions::new().set("AmazonOrderId", order_id),
        )
        .await?;
    let items_of = |result: &Value| {
        as_list(
            result
                .get("OrderItems")
                .and_then(|items| items.get("OrderItem")),
        )
    };
    let mut items = items_of(&result);

    while let Some(token) = text(&result, "NextToken") {
        result = dispatcher
            .call(
                "ListOrderItemsByNextToken",
                &CallOptions::new().set("NextToken", token),
            )
            .await?;
        items.extend(items_of(&result));
    }

    Ok(camel_records(items))
}
