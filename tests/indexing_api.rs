// Integration tests for the Indexing API client and the credentials provider.

use serde_json::json;
use sitemap_sentinel::indexing::{
    submit, CredentialProvider, FileCredentialProvider, GoogleIndexingClient, IndexingApi,
    RetryPolicy, SubmissionStatus, SubmitOptions,
};
use sitemap_sentinel::sitemap::SitemapEntry;
use std::io::Write;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn publish_ok(url: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "urlNotificationMetadata": {
            "url": url,
            "latestUpdate": {
                "url": url,
                "type": "URL_UPDATED",
                "notifyTime": "2024-05-01T10:00:00.123Z"
            }
        }
    }))
}

fn google_error(code: u16, message: &str, status: &str) -> ResponseTemplate {
    ResponseTemplate::new(code).set_body_json(json!({
        "error": { "code": code, "message": message, "status": status }
    }))
}

fn client(server: &MockServer) -> GoogleIndexingClient {
    GoogleIndexingClient::with_endpoint(
        "test-token",
        format!("{}/v3/urlNotifications:publish", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn credentials_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[tokio::test]
async fn publish_sends_bearer_token_and_reads_ack() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/urlNotifications:publish"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({"url": "https://example.com/", "type": "URL_UPDATED"})))
        .respond_with(publish_ok("https://example.com/"))
        .expect(1)
        .mount(&server)
        .await;

    let ack = client(&server).submit_url("https://example.com/").await.unwrap();

    assert_eq!(ack.url, "https://example.com/");
    assert_eq!(ack.notify_time.as_deref(), Some("2024-05-01T10:00:00.123Z"));
}

#[tokio::test]
async fn rate_limit_is_retryable_and_ownership_is_not() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("busy"))
        .respond_with(google_error(429, "Rate Limit Exceeded", "RESOURCE_EXHAUSTED"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("private"))
        .respond_with(google_error(
            403,
            "Permission denied. Failed to verify the URL ownership.",
            "PERMISSION_DENIED",
        ))
        .mount(&server)
        .await;

    let api = client(&server);

    let busy = api.submit_url("https://example.com/busy").await.unwrap_err();
    assert!(busy.retryable);
    assert_eq!(busy.code, Some(429));

    let private = api.submit_url("https://example.com/private").await.unwrap_err();
    assert!(!private.retryable);
    assert!(private.message.contains("ownership"));
}

#[tokio::test]
async fn submitter_retries_through_the_real_client() {
    let server = MockServer::start().await;
    // First call is throttled, every later one succeeds
    Mock::given(method("POST"))
        .respond_with(google_error(503, "Backend Error", "UNAVAILABLE"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(publish_ok("https://example.com/"))
        .mount(&server)
        .await;

    let options = SubmitOptions {
        retry: RetryPolicy::immediate(3),
        ..SubmitOptions::default()
    };
    let entries = vec![SitemapEntry::new("https://example.com/")];

    let report = submit(&entries, &client(&server), &options).await;

    let outcome = &report.outcomes()[0];
    assert_eq!(outcome.status, SubmissionStatus::Submitted);
    assert_eq!(outcome.attempts, 2);
}

#[tokio::test]
async fn authorized_user_credentials_are_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=1%2F%2Frefresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-token",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/publish"))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(publish_ok("https://example.com/"))
        .expect(1)
        .mount(&server)
        .await;

    let file = credentials_file(
        &json!({
            "type": "authorized_user",
            "client_id": "id.apps.googleusercontent.com",
            "client_secret": "secret",
            "refresh_token": "1//refresh",
            "token_uri": format!("{}/token", server.uri())
        })
        .to_string(),
    );
    let provider = FileCredentialProvider::new(Duration::from_secs(5))
        .with_endpoint(format!("{}/publish", server.uri()));
    let site = Url::parse("https://example.com/sitemap.xml").unwrap();

    let api = provider.authenticate(file.path(), &site).await.unwrap();
    api.submit_url("https://example.com/").await.unwrap();
}

#[tokio::test]
async fn service_account_credentials_use_jwt_bearer_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion=eyJ"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "service-token",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/publish"))
        .and(header("authorization", "Bearer service-token"))
        .respond_with(publish_ok("https://example.com/"))
        .expect(1)
        .mount(&server)
        .await;

    let file = credentials_file(
        &json!({
            "type": "service_account",
            "project_id": "demo",
            "private_key_id": "key-1",
            "private_key": include_str!("fixtures/service_account_key.pem"),
            "client_email": "indexer@demo.iam.gserviceaccount.com",
            "token_uri": format!("{}/token", server.uri())
        })
        .to_string(),
    );
    let provider = FileCredentialProvider::new(Duration::from_secs(5))
        .with_endpoint(format!("{}/publish", server.uri()));
    let site = Url::parse("https://example.com/sitemap.xml").unwrap();

    let api = provider.authenticate(file.path(), &site).await.unwrap();
    api.submit_url("https://example.com/").await.unwrap();
}

#[tokio::test]
async fn rejected_refresh_is_a_credential_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Token has been expired or revoked."
        })))
        .mount(&server)
        .await;

    let file = credentials_file(
        &json!({
            "type": "authorized_user",
            "client_id": "id",
            "client_secret": "secret",
            "refresh_token": "stale",
            "token_uri": format!("{}/token", server.uri())
        })
        .to_string(),
    );
    let provider = FileCredentialProvider::new(Duration::from_secs(5));
    let site = Url::parse("https://example.com/").unwrap();

    let err = provider.authenticate(file.path(), &site).await.unwrap_err();
    assert!(err.to_string().contains("invalid_grant"));
    assert!(err.to_string().contains("expired or revoked"));
}
