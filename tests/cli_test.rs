mod common;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::Query;
use axum::http::{StatusCode, header};
use axum::routing::{get, post};
use axum::{Form, Json, Router};

use common::{ArchiefTest, bootstrap_json, spawn_server, zaken_payload};

type Posted = Arc<Mutex<Vec<(String, String)>>>;

/// Records endpoint and create form of a small server
async fn records_server() -> (SocketAddr, Posted) {
    let posted: Posted = Arc::default();
    let recorder = Arc::clone(&posted);
    let app = Router::new()
        .route(
            "/vernietigen/_fetch-zaken",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let all = [
                    ("https://zaken/1", "ZAAK-1", "https://zaaktypen/1"),
                    ("https://zaken/2", "ZAAK-2", "https://zaaktypen/2"),
                    ("https://zaken/3", "ZAAK-3", "https://zaaktypen/3"),
                ];
                if params.get("identificatie").map(String::as_str) == Some("kapot") {
                    return (
                        StatusCode::OK,
                        Json(serde_json::json!({ "error": "Zoekopdracht mislukt" })),
                    );
                }
                let zaaktypen: Vec<String> = params
                    .get("zaaktype__in")
                    .map(|v| v.split(',').map(str::to_string).collect())
                    .unwrap_or_default();
                let matching: Vec<_> = all
                    .into_iter()
                    .filter(|(_, _, zaaktype)| {
                        zaaktypen.is_empty() || zaaktypen.iter().any(|z| z == zaaktype)
                    })
                    .collect();
                (StatusCode::OK, Json(zaken_payload(&matching)))
            }),
        )
        .route(
            "/vernietigen/lijsten/toevoegen",
            post(move |Form(fields): Form<Vec<(String, String)>>| {
                let recorder = Arc::clone(&recorder);
                async move {
                    recorder.lock().unwrap().extend(fields);
                    (StatusCode::FOUND, [(header::LOCATION, "/vernietigen/lijsten/")])
                }
            }),
        );
    (spawn_server(app).await, posted)
}

fn with_bootstrap(test: &ArchiefTest, addr: SocketAddr) -> String {
    test.write_file("bootstrap.json", &bootstrap_json(addr))
        .to_string_lossy()
        .to_string()
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_set_and_get() {
    let test = ArchiefTest::new();

    let output = test.run_success(&["config", "set", "base_url", "https://archief.example/"]);
    assert!(output.contains("base_url"));

    let output = test.run_success(&["config", "get", "base_url"]);
    assert_eq!(output.trim(), "https://archief.example/");

    test.run_success(&["config", "set", "remote_timeout", "5"]);
    let output = test.run_success(&["config", "get", "remote_timeout", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["value"], "5");

    assert!(test.read_config().contains("remote_timeout: 5"));
}

#[test]
fn test_config_masks_secrets() {
    let test = ArchiefTest::new();
    test.run_success(&["config", "set", "auth.session_id", "abcdefghij"]);

    let output = test.run_success(&["config", "get", "auth.session_id"]);
    assert_eq!(output.trim(), "ab...ij");

    let output = test.run_success(&["config", "show", "--json"]);
    assert!(!output.contains("abcdefghij"));
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["auth"]["session_id_configured"], true);
    assert_eq!(json["auth"]["csrf_token_configured"], false);
}

#[test]
fn test_config_rejects_invalid_input() {
    let test = ArchiefTest::new();

    let stderr = test.run_failure(&["config", "set", "github.token", "x"]);
    assert!(stderr.contains("invalid config key"));

    let stderr = test.run_failure(&["config", "set", "remote_timeout", "soon"]);
    assert!(stderr.contains("remote_timeout"));

    let stderr = test.run_failure(&["config", "get", "base_url"]);
    assert!(stderr.contains("not set"));
}

#[test]
fn test_completions() {
    let test = ArchiefTest::new();
    let output = test.run_success(&["completions", "bash"]);
    assert!(output.contains("archiefbeheer"));
    assert!(output.contains("create-list"));
}

// ============================================================================
// Case lists
// ============================================================================

#[test]
fn test_list_without_base_url_fails() {
    let test = ArchiefTest::new();
    let stderr = test.run_failure(&["list"]);
    assert!(stderr.contains("base URL not configured"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_list_json() {
    let (addr, _) = records_server().await;
    let test = ArchiefTest::new();
    let bootstrap = with_bootstrap(&test, addr);

    let output = test.run_success(&["list", "--bootstrap", &bootstrap, "--json"]);
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["status"], "loaded");
    assert_eq!(json["zaken"].as_array().unwrap().len(), 3);
    assert_eq!(json["selected"].as_array().unwrap().len(), 0);
    assert_eq!(json["bronorganisaties"][0], "123456782");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_list_table_with_group_filter() {
    let (addr, _) = records_server().await;
    let test = ArchiefTest::new();
    let bootstrap = with_bootstrap(&test, addr);

    let output = test.run_success(&[
        "list",
        "--bootstrap",
        &bootstrap,
        "--zaaktype-group",
        "Vergunning",
    ]);
    assert!(output.contains("ZAAK-1"));
    assert!(output.contains("ZAAK-2"));
    assert!(!output.contains("ZAAK-3"));
    assert!(output.contains("0 of 2 selectable zaken selected"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_list_unknown_group_fails() {
    let (addr, _) = records_server().await;
    let test = ArchiefTest::new();
    let bootstrap = with_bootstrap(&test, addr);

    let stderr = test.run_failure(&["list", "--bootstrap", &bootstrap, "--zaaktype-group", "Nope"]);
    assert!(stderr.contains("unknown zaaktype group"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_list_server_error_is_reported() {
    let (addr, _) = records_server().await;
    let test = ArchiefTest::new();
    let bootstrap = with_bootstrap(&test, addr);

    let output = test.run(&["list", "--bootstrap", &bootstrap, "--identificatie", "kapot"]);
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("Zoekopdracht mislukt"));
    assert!(stderr.contains("Zoekopdracht mislukt"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_zaaktypes_tree() {
    let (addr, _) = records_server().await;
    let test = ArchiefTest::new();
    let bootstrap = with_bootstrap(&test, addr);

    let output = test.run_success(&[
        "zaaktypes",
        "--bootstrap",
        &bootstrap,
        "--selected",
        "https://zaaktypen/1",
        "--selected",
        "https://zaaktypen/2",
        "--json",
    ]);
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["groups"][0]["description"], "Vergunning");
    assert_eq!(json["groups"][0]["selected"], true);
    assert_eq!(json["groups"][1]["selected"], false);
}

// ============================================================================
// Destruction lists
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_create_list_dry_run() {
    let (addr, posted) = records_server().await;
    let test = ArchiefTest::new();
    let bootstrap = with_bootstrap(&test, addr);

    let output = test.run_success(&[
        "create-list",
        "--bootstrap",
        &bootstrap,
        "--name",
        "Mei 2024",
        "--reviewer-1",
        "1",
        "--reviewer-2",
        "2",
        "--zaak",
        "ZAAK-1",
        "--zaak",
        "https://zaken/3",
        "--dry-run",
        "--json",
    ]);
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["selected"], 2);

    let fields: HashMap<String, String> = json["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| {
            (
                f["name"].as_str().unwrap().to_string(),
                f["value"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(fields["name"], "Mei 2024");
    assert_eq!(fields["zaken"], "https://zaken/1,https://zaken/3");
    assert_eq!(fields["zaken_identificaties"], "ZAAK-1,ZAAK-3");
    assert!(!fields.contains_key("csrfmiddlewaretoken"));

    assert!(posted.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_create_list_posts_form() {
    let (addr, posted) = records_server().await;
    let test = ArchiefTest::new();
    let bootstrap = with_bootstrap(&test, addr);

    let output = test.run_success(&[
        "create-list",
        "--bootstrap",
        &bootstrap,
        "--name",
        "Alles",
        "--reviewer-1",
        "1",
        "--reviewer-2",
        "2",
        "--no-sensitive-info",
        "--all",
        "--json",
    ]);
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["selected"], 3);
    assert_eq!(json["location"], "/vernietigen/lijsten/");

    let posted = posted.lock().unwrap();
    let field = |name: &str| {
        posted
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    };
    assert_eq!(field("csrfmiddlewaretoken").as_deref(), Some("page-token"));
    assert_eq!(field("reviewer_1").as_deref(), Some("1"));
    assert_eq!(field("contains_sensitive_info"), None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_create_list_validation() {
    let (addr, posted) = records_server().await;
    let test = ArchiefTest::new();
    let bootstrap = with_bootstrap(&test, addr);

    let stderr = test.run_failure(&[
        "create-list",
        "--bootstrap",
        &bootstrap,
        "--name",
        "Lijst",
        "--reviewer-1",
        "1",
        "--zaak",
        "ZAAK-1",
    ]);
    assert!(stderr.contains("second reviewer is required"));

    let stderr = test.run_failure(&[
        "create-list",
        "--bootstrap",
        &bootstrap,
        "--name",
        "Lijst",
        "--reviewer-1",
        "1",
        "--reviewer-2",
        "2",
        "--zaak",
        "ZAAK-404",
    ]);
    assert!(stderr.contains("ZAAK-404"));

    assert!(posted.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_export_link() {
    let (addr, _) = records_server().await;
    let test = ArchiefTest::new();
    let bootstrap = with_bootstrap(&test, addr);

    let output = test.run_success(&[
        "export",
        "--bootstrap",
        &bootstrap,
        "--zaak",
        "ZAAK-2",
        "--json",
    ]);
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    let url = url::Url::parse(json["url"].as_str().unwrap()).unwrap();
    assert_eq!(url.path(), "/vernietigen/export/");
    let zaken_urls: Vec<String> = url
        .query_pairs()
        .filter(|(k, _)| k == "zaken_urls")
        .map(|(_, v)| v.into_owned())
        .collect();
    assert_eq!(zaken_urls, vec!["https://zaken/2".to_string()]);
}
