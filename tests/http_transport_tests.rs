//! Integration tests for the HTTP transport against a mock MWS endpoint.

use mws_api::clients::{signing, BodyType, HttpTransport, Transport, TransportError, WireRequest};
use mws_api::{AccessKeyId, AuthToken, EndpointUrl, MwsConfig, SecretKey, SellerId};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const STATUS_RESPONSE: &str = r#"<?xml version="1.0"?>
<GetServiceStatusResponse xmlns="https://mws.amazonservices.com/Orders/2013-09-01">
  <GetServiceStatusResult>
    <Status>GREEN</Status>
    <Timestamp>2024-01-01T00:00:00.000Z</Timestamp>
  </GetServiceStatusResult>
  <ResponseMetadata>
    <RequestId>req-1</RequestId>
  </ResponseMetadata>
</GetServiceStatusResponse>"#;

const THROTTLED_RESPONSE: &str = r#"<?xml version="1.0"?>
<ErrorResponse xmlns="https://mws.amazonservices.com/Orders/2013-09-01">
  <Error>
    <Type>Sender</Type>
    <Code>RequestThrottled</Code>
    <Message>Request is throttled</Message>
  </Error>
  <RequestId>req-throttled</RequestId>
</ErrorResponse>"#;

fn create_config(server: &MockServer, token: Option<&str>) -> MwsConfig {
    let mut builder = MwsConfig::builder()
        .access_key_id(AccessKeyId::new("AKIDEXAMPLE").unwrap())
        .secret_key(SecretKey::new("test-secret").unwrap())
        .seller_id(SellerId::new("A1SELLER").unwrap())
        .endpoint(EndpointUrl::new(server.uri()).unwrap());
    if let Some(token) = token {
        builder = builder.auth_token(AuthToken::new(token).unwrap());
    }
    builder.build().unwrap()
}

fn status_request() -> WireRequest {
    WireRequest::builder("/Orders/2013-09-01", "GetServiceStatus", "2013-09-01")
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_form_post_carries_signed_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Orders/2013-09-01"))
        .and(header(
            "Content-Type",
            "application/x-www-form-urlencoded; charset=utf-8",
        ))
        .and(body_string_contains("Action=GetServiceStatus"))
        .and(body_string_contains("Version=2013-09-01"))
        .and(body_string_contains("SellerId=A1SELLER"))
        .and(body_string_contains("AWSAccessKeyId=AKIDEXAMPLE"))
        .and(body_string_contains("MWSAuthToken=amzn.mws.token"))
        .and(body_string_contains("SignatureMethod=HmacSHA256"))
        .and(body_string_contains("Signature="))
        .respond_with(ResponseTemplate::new(200).set_body_raw(STATUS_RESPONSE, "text/xml"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new(create_config(&server, Some("amzn.mws.token"))).unwrap();
    let body = transport.send(status_request()).await.unwrap();

    let response = &body["GetServiceStatusResponse"];
    assert_eq!(
        response["$"]["xmlns"],
        "https://mws.amazonservices.com/Orders/2013-09-01"
    );
    assert_eq!(
        response["GetServiceStatusResult"],
        json!([{"Status": ["GREEN"], "Timestamp": ["2024-01-01T00:00:00.000Z"]}])
    );
    assert_eq!(
        response["ResponseMetadata"],
        json!([{"RequestId": ["req-1"]}])
    );
}

#[tokio::test]
async fn test_user_agent_header_is_sent() {
    let server = MockServer::start().await;
    let config = MwsConfig::builder()
        .access_key_id(AccessKeyId::new("AKIDEXAMPLE").unwrap())
        .secret_key(SecretKey::new("test-secret").unwrap())
        .seller_id(SellerId::new("A1SELLER").unwrap())
        .endpoint(EndpointUrl::new(server.uri()).unwrap())
        .user_agent_prefix("my-app/1.0")
        .build()
        .unwrap();
    let transport = HttpTransport::new(config).unwrap();

    Mock::given(method("POST"))
        .and(header("User-Agent", transport.user_agent()))
        .respond_with(ResponseTemplate::new(200).set_body_raw(STATUS_RESPONSE, "text/xml"))
        .expect(1)
        .mount(&server)
        .await;

    assert!(transport.user_agent().starts_with("my-app/1.0 | MWS API Library/"));
    transport.send(status_request()).await.unwrap();
}

#[tokio::test]
async fn test_throttled_response_is_reported_as_503() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_raw(THROTTLED_RESPONSE, "text/xml"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(create_config(&server, None)).unwrap();
    let error = transport.send(status_request()).await.unwrap_err();

    assert!(error.is_throttled());
    assert_eq!(error.status(), Some(503));
    match error {
        TransportError::Response(response) => {
            assert_eq!(response.error_code.as_deref(), Some("RequestThrottled"));
            assert_eq!(response.message, "Request is throttled");
            assert_eq!(response.request_id.as_deref(), Some("req-throttled"));
        }
        other => panic!("expected a response error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_client_error_is_not_throttled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .insert_header("x-mws-request-id", "req-header")
                .set_body_string("plain failure"),
        )
        .mount(&server)
        .await;

    let transport = HttpTransport::new(create_config(&server, None)).unwrap();
    let error = transport.send(status_request()).await.unwrap_err();

    assert!(!error.is_throttled());
    match error {
        TransportError::Response(response) => {
            assert_eq!(response.code, 400);
            assert_eq!(response.message, "plain failure");
            assert_eq!(response.error_code, None);
            assert_eq!(response.request_id.as_deref(), Some("req-header"));
        }
        other => panic!("expected a response error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_feed_body_is_sent_with_query_and_md5() {
    let feed = "<?xml version=\"1.0\"?><AmazonEnvelope><Message/></AmazonEnvelope>";
    let md5 = signing::content_md5(feed.as_bytes());

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .and(query_param("Action", "SubmitFeed"))
        .and(query_param("Merchant", "A1SELLER"))
        .and(query_param("ContentMD5Value", md5.as_str()))
        .and(header("Content-MD5", md5.as_str()))
        .and(header("Content-Type", "text/xml"))
        .and(body_string_contains("<AmazonEnvelope>"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<SubmitFeedResponse><SubmitFeedResult><FeedSubmissionInfo>\
             <FeedSubmissionId>50001</FeedSubmissionId>\
             </FeedSubmissionInfo></SubmitFeedResult></SubmitFeedResponse>",
            "text/xml",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let request = WireRequest::builder("/", "SubmitFeed", "2009-01-01")
        .param("FeedType", "_POST_PRODUCT_DATA_")
        .body(feed)
        .body_type(BodyType::Xml)
        .build()
        .unwrap();

    let transport = HttpTransport::new(create_config(&server, None)).unwrap();
    let body = transport.send(request).await.unwrap();

    assert_eq!(
        body["SubmitFeedResponse"]["SubmitFeedResult"][0]["FeedSubmissionInfo"][0]
            ["FeedSubmissionId"][0],
        "50001"
    );
}

#[tokio::test]
async fn test_tab_separated_body_becomes_rows() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "sku\tprice\nA-1\t9.99\nB-2\t19.50\n",
            "text/plain;charset=Cp1252",
        ))
        .mount(&server)
        .await;

    let request = WireRequest::builder("/", "GetReport", "2009-01-01")
        .param("ReportId", "123")
        .build()
        .unwrap();
    let transport = HttpTransport::new(create_config(&server, None)).unwrap();
    let body = transport.send(request).await.unwrap();

    assert_eq!(
        body,
        json!([
            {"sku": "A-1", "price": "9.99"},
            {"sku": "B-2", "price": "19.50"}
        ])
    );
}

#[tokio::test]
async fn test_invalid_xml_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<Broken><Open>", "text/xml"))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(create_config(&server, None)).unwrap();
    let error = transport.send(status_request()).await.unwrap_err();

    assert!(matches!(error, TransportError::Decode { .. }));
}
