// Runs the compiled binary and checks exit codes and output.

use assert_cmd::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cmd() -> Command {
    Command::cargo_bin("sitemap-sentinel").unwrap()
}

// Serves `body` at /sitemap.xml; "{base}" in the body becomes the server URI,
// so locations share the sitemap's scheme, host and port
async fn serve(body: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body.replace("{base}", &server.uri()), "application/xml"),
        )
        .mount(&server)
        .await;
    server
}

fn sitemap_url(server: &MockServer) -> String {
    format!("{}/sitemap.xml", server.uri())
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn help_lists_subcommands() {
    let output = cmd().arg("--help").output().unwrap();
    assert!(output.status.success());
    let text = stdout_of(&output);
    assert!(text.contains("validate"));
    assert!(text.contains("submit"));
}

#[test]
fn invalid_url_exits_with_two() {
    let output = cmd().args(["validate", "not-a-url"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error: invalid sitemap URL"));
}

#[tokio::test(flavor = "multi_thread")]
async fn valid_sitemap_exits_with_zero_and_prints_json() {
    let server = serve(
        r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
             <url><loc>{base}/</loc></url>
           </urlset>"#,
    )
    .await;

    let output = cmd()
        .args(["validate", &sitemap_url(&server), "--json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let json: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(json["kind"], "url_set");
    assert_eq!(json["entry_count"], 1);
    assert_eq!(json["validation"]["is_valid"], true);
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_sitemap_exits_with_one_and_is_not_submitted() {
    let server = serve(
        r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
             <url><loc>{base}/</loc></url>
             <url><loc>{base}/x</loc><priority>1.5</priority></url>
           </urlset>"#,
    )
    .await;

    // The credentials file does not exist: reaching authentication would exit 2
    let output = cmd()
        .args([
            "submit",
            &sitemap_url(&server),
            "--credentials",
            "/nonexistent/credentials.json",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let text = stdout_of(&output);
    assert!(text.contains("priority-out-of-range"));
    assert!(text.contains("Sitemap is invalid"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreadable_credentials_exit_with_two() {
    let server = serve(
        r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><url><loc>{base}/</loc></url></urlset>"#,
    )
    .await;

    let output = cmd()
        .args([
            "submit",
            &sitemap_url(&server),
            "--credentials",
            "/nonexistent/credentials.json",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot read"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unexpanded_index_submission_is_reported() {
    let server = serve(
        r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
             <sitemap><loc>{base}/posts.xml</loc></sitemap>
           </sitemapindex>"#,
    )
    .await;
    let mut credentials = tempfile::NamedTempFile::new().unwrap();
    std::io::Write::write_all(&mut credentials, br#"{"access_token": "ya29.test"}"#).unwrap();

    let output = cmd()
        .args(["submit", &sitemap_url(&server), "--credentials"])
        .arg(credentials.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    assert!(stdout_of(&output).contains("Sitemap index not expanded"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no URLs will be submitted"));
}
