#![allow(missing_docs, clippy::expect_used, clippy::unwrap_used)]

mod common;

use common::{docview_cmd, docview_cmd_with_api};
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn results() -> Value {
    json!({
        "total": 2,
        "results": [
            {
                "filename": "getting-started.md",
                "content": "# Getting Started\n\nInstall docview first.",
                "score": 4.25,
                "highlight": "<span class='highlight'>Install</span> docview first."
            },
            {
                "filename": "faq.md",
                "content": "# FAQ\n\nHow do I install?",
                "score": 1.5
            }
        ]
    })
}

async fn search_server(query: &str, expected_calls: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .and(body_json(json!({ "query": query })))
        .respond_with(ResponseTemplate::new(200).set_body_json(results()))
        .expect(expected_calls)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn search_prints_ranked_results() {
    let server = search_server("install", 1).await;

    docview_cmd_with_api(&server.uri())
        .args(["search", "install"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 results for 'install'"))
        .stdout(predicate::str::contains("1. Getting Started (getting-started.md)"))
        .stdout(predicate::str::contains("Install docview first."))
        .stdout(predicate::str::contains("2. Faq (faq.md)"));
}

#[tokio::test]
async fn search_json_passes_the_response_through() -> anyhow::Result<()> {
    let server = search_server("install guide", 1).await;

    let out = docview_cmd_with_api(&server.uri())
        .args(["search", "install", "guide", "--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: Value = serde_json::from_slice(&out)?;
    assert_eq!(json["total"], 2);
    assert_eq!(json["results"][0]["filename"], "getting-started.md");
    Ok(())
}

#[tokio::test]
async fn interactive_search_debounces_typing() -> anyhow::Result<()> {
    // Given: a backend that expects exactly one request, for the final text
    let server = search_server("install", 1).await;

    // When: the user types three prefixes in quick succession
    let out = docview_cmd_with_api(&server.uri())
        .args(["search", "--interactive", "--format", "json"])
        .write_stdin("ins\ninst\ninstall\n")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    // Then: the last state printed is the result of that one request
    let text = String::from_utf8(out)?;
    let last: Value = serde_json::from_str(text.lines().last().expect("a state line"))?;
    assert_eq!(last["status"], "success");
    assert_eq!(last["query"], "install");
    assert_eq!(last["total"], 2);
    Ok(())
}

#[tokio::test]
async fn interactive_search_reports_failures() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "code": 500, "name": "Internal Server Error", "message": "index offline" }
        })))
        .mount(&server)
        .await;

    docview_cmd_with_api(&server.uri())
        .args(["search", "-i"])
        .write_stdin("docs\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Search failed: Request failed: 500 index offline",
        ));
    Ok(())
}

#[test]
fn search_requires_a_query() {
    docview_cmd()
        .args(["search", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a search query is required"));
}

#[tokio::test]
async fn get_prints_toc_and_highlighted_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/document/guide.md"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "filename": "guide.md",
            "content": "# Guide\n\n## Setup\n\nRun setup once.\n",
            "title": "Guide",
            "file_size": 37,
            "last_modified": "2024-05-01T10:00:00"
        })))
        .mount(&server)
        .await;

    docview_cmd_with_api(&server.uri())
        .args(["get", "guide.md", "--highlight", "setup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("guide.md · 37 bytes · modified 2024-05-01T10:00:00 · 2 matches"))
        .stdout(predicate::str::contains("- Guide #guide"))
        .stdout(predicate::str::contains("  - Setup #setup"))
        .stdout(predicate::str::contains("Run setup once."));
}

#[tokio::test]
async fn get_missing_document_exits_with_two() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/document/nope.md"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "name": "Not Found", "message": "Document not found" }
        })))
        .mount(&server)
        .await;

    docview_cmd_with_api(&server.uri())
        .args(["get", "nope.md"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Document not found: nope.md"));
}

#[tokio::test]
async fn get_html_uses_the_theme() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/document/a.md"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "filename": "a.md",
            "content": "# A\n"
        })))
        .mount(&server)
        .await;

    docview_cmd_with_api(&server.uri())
        .args(["get", "a.md", "--html", "--theme", "dark"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"<div class="markdown-content" data-theme="dark"><h1 id="a">A</h1></div>"#,
        ));
}

#[tokio::test]
async fn stats_and_health() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 12 })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy",
            "elasticsearch": "connected"
        })))
        .mount(&server)
        .await;

    docview_cmd_with_api(&server.uri())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Indexed documents: 12"));

    docview_cmd_with_api(&server.uri())
        .arg("health")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backend: healthy (search engine connected)"));
}

#[tokio::test]
async fn unhealthy_backend_exits_with_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "status": "unhealthy",
            "elasticsearch": "disconnected"
        })))
        .mount(&server)
        .await;

    docview_cmd_with_api(&server.uri())
        .args(["health", "--format", "json"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(r#""status": "unhealthy""#));
}

#[test]
fn api_url_flag_is_validated() {
    docview_cmd()
        .args(["stats", "--api-url", "ftp://example.com"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid configuration"));
}
