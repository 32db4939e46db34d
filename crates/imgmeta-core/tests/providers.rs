//! Provider clients against a canned HTTP server.

mod support;

use std::time::Duration;

use imgmeta_core::config::{DescribeConfig, VisionConfig};
use imgmeta_core::providers::{ImageInput, StaticToken};
use imgmeta_core::types::{
    DESCRIPTION_BAD_JSON, DESCRIPTION_HTTP_FAILED, DESCRIPTION_REQUEST_FAILED, NO_DESCRIPTION,
    NO_TAGS, TAGS_FAILED,
};
use imgmeta_core::{
    AsticaClient, DescriptionOutcome, DescriptionProvider, ProviderError, TagOutcome,
    TagProvider, VisionClient,
};
use support::{closed_port_url, MockServer};

const TEST_KEY: &str = include_str!("fixtures/test_key.pem");

fn astica(endpoint: String, timeout_secs: u64) -> AsticaClient {
    let config = DescribeConfig {
        endpoint,
        timeout_secs,
        ..DescribeConfig::default()
    };
    AsticaClient::with_api_key(&config, Some("secret-token".to_string()))
}

fn vision(endpoint: String) -> VisionClient {
    let config = VisionConfig {
        endpoint,
        ..VisionConfig::default()
    };
    VisionClient::new(&config, Box::new(StaticToken("ya29.static".to_string())))
}

// --- Astica ---

#[tokio::test]
async fn astica_returns_caption_and_sends_expected_body() {
    let server = MockServer::respond(vec![(
        200,
        r#"{"status": "success", "caption": "A dog running on a beach."}"#,
    )])
    .await;
    let client = astica(server.url("/describe"), 30);

    let outcome = client.describe(&ImageInput::from_bytes(b"\x01\x02\x03")).await;
    assert_eq!(
        outcome,
        DescriptionOutcome::Caption("A dog running on a beach.".to_string())
    );

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/describe");
    let body = requests[0].json();
    assert_eq!(body["tkn"], "secret-token");
    assert_eq!(body["modelVersion"], "1.0_full");
    assert_eq!(body["visionParams"], "describe");
    assert_eq!(body["input"], "AQID");
}

#[tokio::test]
async fn astica_missing_caption() {
    let server = MockServer::respond(vec![(200, r#"{"status": "success"}"#)]).await;
    let outcome = astica(server.url("/describe"), 30)
        .describe(&ImageInput::from_bytes(b"x"))
        .await;
    assert_eq!(outcome.to_string(), NO_DESCRIPTION);
}

#[tokio::test]
async fn astica_http_error() {
    let server = MockServer::respond(vec![(502, r#"{"message": "bad gateway"}"#)]).await;
    let outcome = astica(server.url("/describe"), 30)
        .describe(&ImageInput::from_bytes(b"x"))
        .await;
    assert!(matches!(
        outcome,
        DescriptionOutcome::Failed(ProviderError::Http { status: 502, .. })
    ));
    assert_eq!(outcome.to_string(), DESCRIPTION_HTTP_FAILED);
}

#[tokio::test]
async fn astica_connection_refused() {
    let outcome = astica(closed_port_url(), 30)
        .describe(&ImageInput::from_bytes(b"x"))
        .await;
    assert!(matches!(
        outcome,
        DescriptionOutcome::Failed(ProviderError::Connection(_))
    ));
    assert_eq!(outcome.to_string(), DESCRIPTION_REQUEST_FAILED);
}

#[tokio::test]
async fn astica_timeout_is_a_request_error() {
    let server = MockServer::respond_after(
        Duration::from_millis(2500),
        vec![(200, r#"{"caption": "too late"}"#)],
    )
    .await;
    let outcome = astica(server.url("/describe"), 1)
        .describe(&ImageInput::from_bytes(b"x"))
        .await;
    assert_eq!(outcome.to_string(), DESCRIPTION_REQUEST_FAILED);
}

#[tokio::test]
async fn astica_malformed_json() {
    let server = MockServer::respond(vec![(200, "<html>maintenance</html>")]).await;
    let outcome = astica(server.url("/describe"), 30)
        .describe(&ImageInput::from_bytes(b"x"))
        .await;
    assert_eq!(outcome.to_string(), DESCRIPTION_BAD_JSON);
}

#[tokio::test]
async fn astica_service_error() {
    let server = MockServer::respond(vec![(
        200,
        r#"{"status": "error", "error": "Insufficient balance"}"#,
    )])
    .await;
    let outcome = astica(server.url("/describe"), 30)
        .describe(&ImageInput::from_bytes(b"x"))
        .await;
    assert_eq!(outcome.to_string(), "Astica API error: Insufficient balance");
}

// --- Google Vision ---

#[tokio::test]
async fn vision_joins_labels_in_response_order() {
    let server = MockServer::respond(vec![(
        200,
        r#"{"responses": [{"labelAnnotations": [
            {"description": "Mountain", "score": 0.98},
            {"description": "Snow", "score": 0.93},
            {"description": "Sky", "score": 0.90}
        ]}]}"#,
    )])
    .await;
    let outcome = vision(server.url("/v1/images:annotate"))
        .detect_labels(b"\xFF\xD8\xFF")
        .await;
    assert_eq!(outcome.to_string(), "Mountain, Snow, Sky");

    let requests = server.requests();
    assert_eq!(requests[0].header("authorization"), Some("Bearer ya29.static"));
    let body = requests[0].json();
    assert_eq!(body["requests"][0]["image"]["content"], "/9j/");
    assert_eq!(body["requests"][0]["features"][0]["type"], "LABEL_DETECTION");
}

#[tokio::test]
async fn vision_zero_labels() {
    let server = MockServer::respond(vec![(200, r#"{"responses": [{}]}"#)]).await;
    let outcome = vision(server.url("/v1/images:annotate"))
        .detect_labels(b"img")
        .await;
    assert_eq!(outcome, TagOutcome::NoLabels);
    assert_eq!(outcome.to_string(), NO_TAGS);
}

#[tokio::test]
async fn vision_http_error() {
    let server = MockServer::respond(vec![(
        403,
        r#"{"error": {"code": 403, "message": "Vision API has not been used"}}"#,
    )])
    .await;
    let outcome = vision(server.url("/v1/images:annotate"))
        .detect_labels(b"img")
        .await;
    assert!(matches!(
        outcome,
        TagOutcome::Failed(ProviderError::Http { status: 403, .. })
    ));
    assert_eq!(outcome.to_string(), TAGS_FAILED);
}

#[tokio::test]
async fn vision_per_image_error() {
    let server = MockServer::respond(vec![(
        200,
        r#"{"responses": [{"error": {"code": 3, "message": "Bad image data."}}]}"#,
    )])
    .await;
    let outcome = vision(server.url("/v1/images:annotate"))
        .detect_labels(b"img")
        .await;
    assert!(matches!(outcome, TagOutcome::Failed(ProviderError::Service(_))));
    assert_eq!(outcome.to_string(), TAGS_FAILED);
}

#[tokio::test]
async fn vision_connection_refused() {
    let outcome = vision(closed_port_url()).detect_labels(b"img").await;
    assert!(matches!(
        outcome,
        TagOutcome::Failed(ProviderError::Connection(_))
    ));
}

// --- Service-account flow ---

fn write_key_file(dir: &std::path::Path, token_uri: &str) -> std::path::PathBuf {
    let key = serde_json::json!({
        "type": "service_account",
        "project_id": "test-project",
        "private_key_id": "k1",
        "private_key": TEST_KEY,
        "client_email": "tagger@test-project.iam.gserviceaccount.com",
        "token_uri": token_uri,
    });
    let path = dir.join("service-account.json");
    std::fs::write(&path, key.to_string()).unwrap();
    path
}

#[tokio::test]
async fn vision_exchanges_and_reuses_service_account_token() {
    let token_server = MockServer::respond(vec![(
        200,
        r#"{"access_token": "ya29.exchanged", "expires_in": 3599, "token_type": "Bearer"}"#,
    )])
    .await;
    let vision_server = MockServer::respond(vec![(
        200,
        r#"{"responses": [{"labelAnnotations": [{"description": "Cat"}]}]}"#,
    )])
    .await;

    let dir = tempfile::tempdir().unwrap();
    let key_path = write_key_file(dir.path(), &token_server.url("/token"));
    let config = VisionConfig {
        endpoint: vision_server.url("/v1/images:annotate"),
        ..VisionConfig::default()
    };
    let client = VisionClient::from_key_file(&config, &key_path).unwrap();

    assert_eq!(client.detect_labels(b"a").await.to_string(), "Cat");
    assert_eq!(client.detect_labels(b"b").await.to_string(), "Cat");

    let token_requests = token_server.requests();
    assert_eq!(token_requests.len(), 1);
    let form = token_requests[0].body_text();
    assert!(form.contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer"));
    assert!(form.contains("assertion="));

    let vision_requests = vision_server.requests();
    assert_eq!(vision_requests.len(), 2);
    for request in vision_requests {
        assert_eq!(request.header("authorization"), Some("Bearer ya29.exchanged"));
    }
}

#[tokio::test]
async fn vision_token_rejection_fails_tags() {
    let token_server =
        MockServer::respond(vec![(400, r#"{"error": "invalid_grant"}"#)]).await;
    let vision_server = MockServer::respond(vec![(200, r#"{"responses": [{}]}"#)]).await;

    let dir = tempfile::tempdir().unwrap();
    let key_path = write_key_file(dir.path(), &token_server.url("/token"));
    let config = VisionConfig {
        endpoint: vision_server.url("/v1/images:annotate"),
        ..VisionConfig::default()
    };
    let client = VisionClient::from_key_file(&config, &key_path).unwrap();

    let outcome = client.detect_labels(b"a").await;
    assert!(matches!(
        outcome,
        TagOutcome::Failed(ProviderError::Credentials(_))
    ));
    assert_eq!(outcome.to_string(), TAGS_FAILED);
    assert!(vision_server.requests().is_empty());
}

#[test]
fn vision_rejects_unreadable_key_file() {
    let config = VisionConfig::default();
    let result = VisionClient::from_key_file(&config, std::path::Path::new("/no/key.json"));
    assert!(matches!(result, Err(ProviderError::Credentials(_))));
}
