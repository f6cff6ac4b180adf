use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use assert_cmd::Command;
use assert_cmd::assert::{Assert, OutputAssertExt};
use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::sync::Mutex;

fn fritz() -> Command {
    let mut cmd = Command::cargo_bin("fritz").expect("bin");
    cmd.env_remove("FRITZ_API_URL")
        .env_remove("FRITZ_API_TIMEOUT_SECS")
        .env("RUST_LOG", "info");
    cmd
}

fn product() -> Value {
    json!({
        "id": "product",
        "name": "Product",
        "description": "",
        "allowInherit": false,
        "layout": {
            "type": "default",
            "components": [
                {
                    "type": "input",
                    "name": "sku",
                    "title": "SKU",
                    "dbtype": "varchar",
                    "mandatory": true,
                    "invisible": false,
                    "notEditable": false,
                    "settings": {"defaultValue": "SKU-0"}
                },
                {
                    "type": "integer",
                    "name": "qty",
                    "title": "Quantity",
                    "dbtype": "integer",
                    "mandatory": false,
                    "invisible": false,
                    "notEditable": false,
                    "settings": {"defaultValue": 1, "minValue": 0, "maxValue": 10}
                }
            ]
        }
    })
}

fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_string_pretty(value).expect("json")).expect("write");
    path
}

#[test]
fn version() {
    fritz()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fritz_cli"));
}

#[test]
fn types_are_grouped_by_category() {
    fritz()
        .arg("types")
        .assert()
        .success()
        .stdout(predicate::str::contains("Numeric"))
        .stdout(predicate::str::contains("float8"))
        .stdout(predicate::str::contains("Date picker field"));
}

#[test]
fn check_accepts_a_valid_definition() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_json(dir.path(), "product.json", &product());
    fritz()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("product: ok (2 components)"));
}

#[test]
fn check_rejects_a_definition_without_components() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_json(
        dir.path(),
        "empty.json",
        &json!({"id": "empty", "name": "Empty", "layout": {"type": "default", "components": null}}),
    );
    fritz()
        .arg("check")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains(
            "Definition must have at least one component before saving",
        ));
}

#[test]
fn defaults_come_from_settings() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_json(dir.path(), "product.json", &product());
    let output = fritz().arg("defaults").arg(&path).output().expect("run");
    assert!(output.status.success());
    let record: Value = serde_json::from_slice(&output.stdout).expect("json record");
    assert_eq!(record, json!({"sku": "SKU-0", "qty": 1}));
}

#[test]
fn validate_reports_field_errors() {
    let dir = TempDir::new().expect("tempdir");
    let def = write_json(dir.path(), "product.json", &product());
    let bad = write_json(dir.path(), "bad.json", &json!({"qty": 15}));
    let good = write_json(dir.path(), "good.json", &json!({"sku": "A-1", "qty": 3}));

    fritz()
        .args(["validate"])
        .arg(&def)
        .arg(&bad)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("qty: Quantity must be at most 10"))
        .stdout(predicate::str::contains("sku: SKU is required"));

    fritz()
        .arg("validate")
        .arg(&def)
        .arg(&good)
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn add_writes_back_with_a_unique_name() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_json(dir.path(), "product.json", &product());

    fritz()
        .args(["add"])
        .arg(&path)
        .args(["integer", "--title", "Stock", "--write"])
        .assert()
        .success();

    let saved: Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
    let components = saved["layout"]["components"].as_array().expect("components");
    assert_eq!(components.len(), 3);
    assert_eq!(components[2]["name"], "integer");
    assert_eq!(components[2]["title"], "Stock");
}

#[test]
fn add_rejects_unknown_types() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_json(dir.path(), "product.json", &product());
    fritz()
        .arg("add")
        .arg(&path)
        .arg("colour")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown field type: colour"));
}

#[test]
fn ddl_and_diff() {
    let dir = TempDir::new().expect("tempdir");
    let old = write_json(dir.path(), "old.json", &product());

    fritz()
        .arg("ddl")
        .arg(&old)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "CREATE TABLE IF NOT EXISTS \"entity_product\"",
        ))
        .stdout(predicate::str::contains("sku varchar DEFAULT 'SKU-0' NOT NULL"));

    let mut changed = product();
    changed["layout"]["components"][1]["mandatory"] = json!(true);
    let new = write_json(dir.path(), "new.json", &changed);

    fritz()
        .arg("diff")
        .arg(&old)
        .arg(&new)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "ALTER TABLE IF EXISTS \"entity_product\" ALTER COLUMN qty TYPE integer",
        ))
        .stdout(predicate::str::contains("ALTER COLUMN qty SET NOT NULL"));
}

#[test]
fn remote_commands_fail_cleanly_without_a_server() {
    fritz()
        .args(["--api-url", "http://127.0.0.1:9", "--timeout", "2", "remote", "list"])
        .assert()
        .failure()
        .code(1);
}

/// Definitions held by the fake server, and the requests it answered.
#[derive(Default)]
struct Stored {
    definitions: Vec<Value>,
    calls: Vec<String>,
}

type Shared = Arc<Mutex<Stored>>;

async fn get_definition(State(state): State<Shared>, UrlPath(id): UrlPath<String>) -> Response {
    let mut state = state.lock().await;
    state.calls.push(format!("get {id}"));
    match state.definitions.iter().find(|d| d["id"] == json!(id)) {
        Some(d) => Json(d.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"error": "definition not found"}))).into_response(),
    }
}

async fn create_definition(State(state): State<Shared>, Json(body): Json<Value>) -> StatusCode {
    let mut state = state.lock().await;
    state.calls.push(format!("create {}", body["id"].as_str().unwrap_or_default()));
    state.definitions.push(body);
    StatusCode::CREATED
}

async fn update_definition(
    State(state): State<Shared>,
    UrlPath(id): UrlPath<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    let mut state = state.lock().await;
    state.calls.push(format!("update {id}"));
    if let Some(d) = state.definitions.iter_mut().find(|d| d["id"] == json!(id)) {
        *d = body;
    }
    StatusCode::OK
}

async fn spawn_server() -> (String, Shared) {
    let state: Shared = Arc::default();
    let app = Router::new()
        .route("/api/v1/definitions/create", post(create_definition))
        .route("/api/v1/definitions/{id}", get(get_definition))
        .route("/api/v1/definitions/{id}/update", put(update_definition))
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{addr}"), state)
}

/// Run `fritz --api-url <url> remote load <path>` off the runtime so the server keeps serving.
async fn load(url: &str, path: &Path) -> Assert {
    let url = url.to_string();
    let path = path.to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        fritz()
            .args(["--api-url", &url, "remote", "load"])
            .arg(&path)
            .output()
    })
    .await
    .expect("join")
    .expect("run");
    output.assert()
}

#[tokio::test(flavor = "multi_thread")]
async fn remote_load_creates_then_updates() {
    let (url, state) = spawn_server().await;
    let dir = TempDir::new().expect("tempdir");
    write_json(dir.path(), "product.json", &product());
    let mut item = product();
    item["id"] = json!("item");
    item["name"] = json!("Item");
    write_json(dir.path(), "item.json", &item);
    fs::write(dir.path().join("README.txt"), "not a definition").expect("write");

    load(&url, dir.path())
        .await
        .success()
        .stdout(predicate::str::contains("created item"))
        .stdout(predicate::str::contains("created product"));

    let mut renamed = product();
    renamed["name"] = json!("Products");
    let single = write_json(dir.path(), "product.json", &renamed);
    load(&url, &single)
        .await
        .success()
        .stdout(predicate::str::contains("updated product"));

    let state = state.lock().await;
    assert_eq!(
        state.calls,
        [
            "get item",
            "create item",
            "get product",
            "create product",
            "get product",
            "update product"
        ]
    );
    assert_eq!(state.definitions[1]["name"], "Products");
}

#[tokio::test(flavor = "multi_thread")]
async fn remote_load_checks_every_file_before_sending() {
    let (url, state) = spawn_server().await;
    let dir = TempDir::new().expect("tempdir");
    write_json(dir.path(), "a_product.json", &product());
    write_json(
        dir.path(),
        "b_empty.json",
        &json!({"id": "empty", "name": "Empty", "layout": {"type": "default", "components": []}}),
    );

    load(&url, dir.path())
        .await
        .failure()
        .code(1)
        .stderr(predicate::str::contains("b_empty.json"))
        .stderr(predicate::str::contains(
            "Definition must have at least one component before saving",
        ));
    assert!(state.lock().await.calls.is_empty());
}
