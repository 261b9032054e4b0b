//! HTTP transport for MWS communication.
//!
//! This module provides [`HttpTransport`], the [`Transport`] that signs
//! requests and posts them to the regional endpoint.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::clients::errors::{HttpResponseError, TransportError};
use crate::clients::http_request::WireRequest;
use crate::clients::http_response::HttpResponse;
use crate::clients::signing::{self, SIGNATURE_METHOD, SIGNATURE_VERSION};
use crate::clients::transport::Transport;
use crate::clients::xml;
use crate::config::MwsConfig;
use crate::marshal::transform::format_timestamp;
use crate::marshal::WireQuery;

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// Signs and sends requests over HTTPS.
///
/// The transport handles:
/// - Credential parameters (`AWSAccessKeyId`, `SellerId`/`Merchant`,
///   `MWSAuthToken`) and the timestamp
/// - Signature Version 2 signing
/// - Form-encoded posts, or a raw body plus `Content-MD5` for feeds
/// - Decoding XML and tab-separated response bodies
///
/// It does not retry; throttling is handled by the dispatcher.
///
/// # Thread Safety
///
/// `HttpTransport` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use mws_api::{AccessKeyId, HttpTransport, MwsConfig, SecretKey, SellerId};
///
/// let config = MwsConfig::builder()
///     .access_key_id(AccessKeyId::new("AKIA...").unwrap())
///     .secret_key(SecretKey::new("secret").unwrap())
///     .seller_id(SellerId::new("A1B2C3D4E5").unwrap())
///     .build()
///     .unwrap();
///
/// let transport = HttpTransport::new(config)?;
/// ```
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: MwsConfig,
    user_agent: String,
}

// Verify HttpTransport is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpTransport>();
};

impl HttpTransport {
    /// Creates a transport for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Network`] if the underlying reqwest client
    /// cannot be created (e.g. TLS initialization failure).
    pub fn new(config: MwsConfig) -> Result<Self, TransportError> {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}MWS API Library/{SDK_VERSION} (Language=Rust/{rust_version})");

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            config,
            user_agent,
        })
    }

    /// Returns the configuration this transport signs with.
    #[must_use]
    pub const fn config(&self) -> &MwsConfig {
        &self.config
    }

    /// Returns the `User-Agent` header sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Adds credentials and the timestamp, then signs.
    ///
    /// Returns the full parameter set, `Signature` included.
    #[must_use]
    pub fn signed_params(&self, request: &WireRequest) -> WireQuery {
        let mut params = request.params.clone();
        params.insert(
            "AWSAccessKeyId".to_string(),
            self.config.access_key_id().as_ref().to_string(),
        );

        let seller_key = if request.is_root_path() {
            "Merchant"
        } else {
            "SellerId"
        };
        params.insert(
            seller_key.to_string(),
            self.config.seller_id().as_ref().to_string(),
        );

        if let Some(token) = self.config.auth_token() {
            params.insert("MWSAuthToken".to_string(), token.as_ref().to_string());
        }
        params.insert("SignatureMethod".to_string(), SIGNATURE_METHOD.to_string());
        params.insert("SignatureVersion".to_string(), SIGNATURE_VERSION.to_string());
        params
            .entry("Timestamp".to_string())
            .or_insert_with(|| format_timestamp(&Utc::now()));

        if let Some(body) = &request.body {
            params.insert(
                "ContentMD5Value".to_string(),
                signing::content_md5(body.as_bytes()),
            );
        }

        signing::sign(
            &mut params,
            self.config.endpoint().authority(),
            &request.path,
            self.config.secret_key().as_ref(),
        );
        params
    }

    fn error_from(response: &HttpResponse) -> HttpResponseError {
        let parsed = xml::parse_xml(&response.body).ok();
        let error = parsed
            .as_ref()
            .and_then(|doc| doc.get("ErrorResponse"))
            .and_then(|e| e.get("Error"))
            .and_then(|e| e.get(0));

        let field = |name: &str| {
            error
                .and_then(|e| e.get(name))
                .and_then(|v| v.get(0))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let body_request_id = parsed
            .as_ref()
            .and_then(|doc| doc.get("ErrorResponse"))
            .and_then(|e| e.get("RequestId"))
            .and_then(|v| v.get(0))
            .and_then(Value::as_str)
            .map(str::to_string);

        HttpResponseError {
            code: response.code,
            message: field("Message").unwrap_or_else(|| response.body.clone()),
            error_code: field("Code"),
            request_id: response
                .request_id()
                .map(str::to_string)
                .or(body_request_id),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: WireRequest) -> Result<Value, TransportError> {
        request.verify()?;

        let params = self.signed_params(&request);
        let url = format!("{}{}", self.config.endpoint().base(), request.path);
        // Sent exactly as signed
        let encoded = format!(
            "{}&Signature={}",
            signing::canonical_query(&params),
            urlencoding::encode(params.get("Signature").map_or("", String::as_str))
        );

        let builder = match (&request.body, request.body_type) {
            (Some(body), Some(body_type)) => {
                let md5 = params
                    .get("ContentMD5Value")
                    .cloned()
                    .unwrap_or_default();
                self.client
                    .post(format!("{url}?{encoded}"))
                    .header("Content-Type", body_type.as_content_type())
                    .header("Content-MD5", md5)
                    .body(body.clone())
            }
            _ => self
                .client
                .post(&url)
                .header("Content-Type", FORM_CONTENT_TYPE)
                .body(encoded),
        };

        tracing::debug!("Sending {} to {}", request.action(), url);
        let res = builder.send().await?;

        let code = res.status().as_u16();
        let headers = HttpResponse::collect_headers(res.headers());
        let body = res.text().await?;
        let response = HttpResponse::new(code, headers, body);

        if let Some(quota) = response.quota {
            tracing::debug!(
                "{} quota: {} of {} remaining",
                request.action(),
                quota.remaining,
                quota.max
            );
        }

        if !response.is_ok() {
            return Err(TransportError::Response(Self::error_from(&response)));
        }

        xml::decode_body(response.content_type(), &response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AccessKeyId, AuthToken, EndpointUrl, SecretKey, SellerId};

    fn create_test_config(with_token: bool) -> MwsConfig {
        let mut builder = MwsConfig::builder()
            .access_key_id(AccessKeyId::new("AKIDEXAMPLE").unwrap())
            .secret_key(SecretKey::new("test-secret").unwrap())
            .seller_id(SellerId::new("A1SELLER").unwrap())
            .endpoint(EndpointUrl::new("https://mws.example.com").unwrap());
        if with_token {
            builder = builder.auth_token(AuthToken::new("amzn.mws.token").unwrap());
        }
        builder.build().unwrap()
    }

    fn orders_request() -> WireRequest {
        WireRequest::builder("/Orders/2013-09-01", "GetServiceStatus", "2013-09-01")
            .build()
            .unwrap()
    }

    #[test]
    fn test_signed_params_add_credentials() {
        let transport = HttpTransport::new(create_test_config(true)).unwrap();
        let params = transport.signed_params(&orders_request());

        assert_eq!(params["AWSAccessKeyId"], "AKIDEXAMPLE");
        assert_eq!(params["SellerId"], "A1SELLER");
        assert_eq!(params["MWSAuthToken"], "amzn.mws.token");
        assert_eq!(params["SignatureMethod"], "HmacSHA256");
        assert_eq!(params["SignatureVersion"], "2");
        assert!(params["Timestamp"].ends_with('Z'));
        assert!(!params.contains_key("Merchant"));
    }

    #[test]
    fn test_root_path_uses_merchant() {
        let transport = HttpTransport::new(create_test_config(false)).unwrap();
        let request = WireRequest::builder("/", "GetReportList", "2009-01-01")
            .build()
            .unwrap();
        let params = transport.signed_params(&request);

        assert_eq!(params["Merchant"], "A1SELLER");
        assert!(!params.contains_key("SellerId"));
        assert!(!params.contains_key("MWSAuthToken"));
    }

    #[test]
    fn test_signature_covers_all_other_params() {
        let transport = HttpTransport::new(create_test_config(false)).unwrap();
        let params = transport.signed_params(&orders_request());

        let expected = signing::compute_signature(
            &signing::string_to_sign(
                "mws.example.com",
                "/Orders/2013-09-01",
                &signing::canonical_query(&params),
            ),
            "test-secret",
        );
        assert_eq!(params["Signature"], expected);
    }

    #[test]
    fn test_feed_body_gets_content_md5() {
        let transport = HttpTransport::new(create_test_config(false)).unwrap();
        let request = WireRequest::builder("/", "SubmitFeed", "2009-01-01")
            .body("hello")
            .body_type(crate::clients::BodyType::TabSeparated)
            .build()
            .unwrap();
        let params = transport.signed_params(&request);

        assert_eq!(params["ContentMD5Value"], "XUFAKrxLKna5cZ2REBfFkg==");
    }

    #[test]
    fn test_user_agent_with_prefix() {
        let config = MwsConfig::builder()
            .access_key_id(AccessKeyId::new("AKIDEXAMPLE").unwrap())
            .secret_key(SecretKey::new("test-secret").unwrap())
            .seller_id(SellerId::new("A1SELLER").unwrap())
            .user_agent_prefix("MyApp/1.0")
            .build()
            .unwrap();
        let transport = HttpTransport::new(config).unwrap();

        assert!(transport.user_agent().starts_with("MyApp/1.0 | "));
        assert!(transport.user_agent().contains("Language=Rust"));
    }

    #[test]
    fn test_error_from_parses_error_response() {
        let body = r#"<?xml version="1.0"?>
<ErrorResponse xmlns="https://mws.amazonservices.com/Orders/2013-09-01">
  <Error>
    <Type>Sender</Type>
    <Code>RequestThrottled</Code>
    <Message>Request is throttled</Message>
  </Error>
  <RequestId>req-42</RequestId>
</ErrorResponse>"#;
        let response = HttpResponse::new(503, std::collections::HashMap::new(), body.to_string());
        let error = HttpTransport::error_from(&response);

        assert_eq!(error.code, 503);
        assert_eq!(error.error_code.as_deref(), Some("RequestThrottled"));
        assert_eq!(error.message, "Request is throttled");
        assert_eq!(error.request_id.as_deref(), Some("req-42"));
    }

    #[test]
    fn test_error_from_falls_back_to_raw_body() {
        let response = HttpResponse::new(500, std::collections::HashMap::new(), "oops".to_string());
        let error = HttpTransport::error_from(&response);
        assert_eq!(error.message, "oops");
        assert!(error.error_code.is_none());
    }
}
