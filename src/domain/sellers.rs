//! Sellers helpers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{as_list, camel_records, text, unexpected};
use crate::dispatch::{Dispatcher, MwsError};
use crate::marshal::CallOptions;

/// A marketplace the seller participates in.
///
/// Combines the `Marketplace` record with the matching `Participation`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marketplace {
    /// Marketplace id, e.g. `ATVPDKIKX0DER`.
    pub marketplace_id: String,
    /// Display name, e.g. `Amazon.com`.
    #[serde(default)]
    pub name: String,
    /// Two-letter country code.
    #[serde(default)]
    pub default_country_code: String,
    /// ISO currency code.
    #[serde(default)]
    pub default_currency_code: String,
    /// Locale, e.g. `en_US`.
    #[serde(default)]
    pub default_language_code: String,
    /// Storefront domain.
    #[serde(default)]
    pub domain_name: String,
    /// Seller id within the marketplace.
    #[serde(default)]
    pub seller_id: Option<String>,
    /// `"Yes"` when the seller has suspended listings there.
    #[serde(default)]
    pub has_seller_suspended_listings: Option<String>,
}

/// Lists the marketplaces the seller participates in, following
/// `NextToken` pages.
///
/// # Errors
///
/// Returns [`MwsError::UnexpectedResponse`] when a marketplace record
/// lacks an id, or any error raised by the underlying calls.
pub async fn list_marketplaces(dispatcher: &Dispatcher) -> Result<Vec<Marketplace>, MwsError> {
    let mut result = dispatcher
        .call("ListMarketplaceParticipations", &CallOptions::new())
        .await?;
    let mut participations = Vec::new();
    let mut marketplaces = Vec::new();

    loop {
        participations.extend(as_list(
            result
                .get("ListParticipations")
                .and_then(|p| p.get("Participation")),
        ));
        marketplaces.extend(as_list(
            result
                .get("ListMarketplaces")
                .and_then(|m| m.get("Marketplace")),
        ));

        let Some(token) = text(&result, "NextToken") else {
            break;
        };
        result = dispatcher
            .call(
                "ListMarketplaceParticipationsByNextToken",
                &CallOptions::new().set("NextToken", token),
            )
            .await?;
    }

    let participations = camel_records(participations);
    camel_records(marketplaces)
        .into_iter()
        .map(|mut marketplace| {
            let id = marketplace.get("marketplaceId").cloned();
            if let (Some(id), Value::Object(fields)) = (id, &mut marketplace) {
                if let Some(Value::Object(participation)) = participations
                    .iter()
                    .find(|p| p.get("marketplaceId") == Some(&id))
                {
                    for (key, value) in participation {
                        fields.entry(key.clone()).or_insert_with(|| value.clone());
                    }
                }
            }
            serde_json::from_value(marketplace).map_err(|e| {
                unexpected("ListMarketplaceParticipations", format!("bad marketplace record: {e}"))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_marketplace_deserializes_from_camel_record() {
        let record = json!({
            "marketplaceId": "ATVPDKIKX0DER",
            "name": "Amazon.com",
            "defaultCountryCode": "US",
            "hasSellerSuspendedListings": "No"
        });
        let marketplace: Marketplace = serde_json::from_value(record).unwrap();
        assert_eq!(marketplace.marketplace_id, "ATVPDKIKX0DER");
        assert_eq!(marketplace.default_country_code, "US");
        assert_eq!(marketplace.has_seller_suspended_listings.as_deref(), Some("No"));
        assert!(marketplace.domain_name.is_empty());
    }
}
