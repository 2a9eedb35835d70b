// Integration tests for HttpFetcher against a local wiremock server.

use sitemap_sentinel::fetch::{DocumentFetcher, HttpFetcher};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>https://example.com/</loc></url>
</urlset>"#;

fn fetcher() -> HttpFetcher {
    HttpFetcher::new(Duration::from_secs(5), "SitemapSentinel-test").unwrap()
}

#[tokio::test]
async fn fetch_returns_body_and_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .and(header("user-agent", "SitemapSentinel-test"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(SITEMAP, "application/xml; charset=utf-8"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let document = fetcher()
        .fetch(&format!("{}/sitemap.xml", server.uri()))
        .await
        .unwrap();

    assert_eq!(document.bytes, SITEMAP.as_bytes());
    assert_eq!(
        document.content_type.as_deref(),
        Some("application/xml; charset=utf-8")
    );
}

#[tokio::test]
async fn non_success_status_is_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = fetcher()
        .fetch(&format!("{}/sitemap.xml", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.status_code, Some(404));
    assert_eq!(err.to_string(), "HTTP 404: Not Found");
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    // Reserve a free port, then release it so nothing is listening there
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let err = fetcher()
        .fetch(&format!("http://127.0.0.1:{}/sitemap.xml", port))
        .await
        .unwrap_err();

    assert_eq!(err.status_code, None);
    assert!(err.message.starts_with("connection failed"), "{}", err.message);
}

#[tokio::test]
async fn redirects_report_the_final_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/sitemaps/main.xml", server.uri()).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sitemaps/main.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(SITEMAP, "application/xml"))
        .mount(&server)
        .await;

    let document = fetcher()
        .fetch(&format!("{}/sitemap.xml", server.uri()))
        .await
        .unwrap();

    assert_eq!(
        document.final_url,
        Some(format!("{}/sitemaps/main.xml", server.uri()))
    );
    assert_eq!(document.bytes, SITEMAP.as_bytes());
}
