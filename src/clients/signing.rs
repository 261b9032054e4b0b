//! Request signing (Signature Version 2).
//!
//! Every request carries a `Signature` parameter computed over a canonical
//! form of the request:
//!
//! ```text
//! POST\n{host}\n{path}\n{canonical query}
//! ```
//!
//! where the canonical query is every parameter (except `Signature`) sorted
//! by key, with keys and values percent-encoded per RFC 3986. The signature
//! is the base64 HMAC-SHA256 of that string, keyed with the secret key.
//!
//! Feed bodies are additionally protected by a base64 MD5 checksum sent as
//! both `ContentMD5Value` and the `Content-MD5` header.
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use mws_api::clients::signing::{canonical_query, string_to_sign, compute_signature};
//!
//! let mut params = BTreeMap::new();
//! params.insert("Action".to_string(), "GetServiceStatus".to_string());
//! params.insert("Timestamp".to_string(), "2017-01-01T00:00:00.000Z".to_string());
//!
//! let canonical = canonical_query(&params);
//! assert_eq!(canonical, "Action=GetServiceStatus&Timestamp=2017-01-01T00%3A00%3A00.000Z");
//!
//! let to_sign = string_to_sign("mws.amazonservices.com", "/Orders/2013-09-01", &canonical);
//! let signature = compute_signature(&to_sign, "secret");
//! assert_eq!(signature.len(), 44); // Base64 of 32 bytes
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha2::Sha256;

use crate::marshal::WireQuery;

type HmacSha256 = Hmac<Sha256>;

/// `SignatureMethod` parameter value.
pub const SIGNATURE_METHOD: &str = "HmacSHA256";

/// `SignatureVersion` parameter value.
pub const SIGNATURE_VERSION: &str = "2";

/// Builds the canonical query string: keys sorted, `Signature` excluded,
/// keys and values RFC 3986 encoded.
#[must_use]
pub fn canonical_query(params: &WireQuery) -> String {
    params
        .iter()
        .filter(|(key, _)| key.as_str() != "Signature")
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Builds the string to sign for a POST to `host` + `path`.
///
/// An empty path is signed as `/`.
#[must_use]
pub fn string_to_sign(host: &str, path: &str, canonical: &str) -> String {
    let path = if path.is_empty() { "/" } else { path };
    format!("POST\n{}\n{path}\n{canonical}", host.to_lowercase())
}

/// Computes the base64 HMAC-SHA256 signature of `message`.
///
/// # Note
///
/// This function uses `expect()` internally but this will never panic because
/// HMAC-SHA256 accepts keys of any length.
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn compute_signature(message: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Signs `params` in place: adds the `Signature` parameter.
pub fn sign(params: &mut WireQuery, host: &str, path: &str, secret: &str) {
    let canonical = canonical_query(params);
    let signature = compute_signature(&string_to_sign(host, path, &canonical), secret);
    params.insert("Signature".to_string(), signature);
}

/// Returns the base64 MD5 of a feed body.
///
/// ```rust
/// use mws_api::clients::signing::content_md5;
///
/// assert_eq!(content_md5(b""), "1B2M2Y8AsgTpgAmY7PhCfg==");
/// ```
#[must_use]
pub fn content_md5(body: &[u8]) -> String {
    STANDARD.encode(Md5::digest(body))
}
