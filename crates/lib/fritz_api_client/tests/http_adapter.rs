//! HttpAdapter against a fake Fritz server bound to an ephemeral port.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::sync::Mutex;
use uuid::Uuid;

use fritz_api_client::{ClientConfig, HttpAdapter};
use fritz_core::adapter::{AdapterError, PersistenceAdapter};
use fritz_core::confirm::AlwaysConfirm;
use fritz_core::definition::{Definition, DefinitionSession, FieldComponent};
use fritz_core::entity::NewEntity;
use fritz_core::form::EntityForm;
use fritz_core::registry::FieldTypeRegistry;

#[derive(Default)]
struct FakeServer {
    /// `None` until the first create, so listing answers `null`.
    definitions: Option<Vec<Value>>,
    entities: Vec<Value>,
    csrf_tokens: Vec<Option<String>>,
}

type Shared = Arc<Mutex<FakeServer>>;

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn csrf(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-csrf-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn list_definitions(State(state): State<Shared>) -> Json<Value> {
    let state = state.lock().await;
    Json(json!(state.definitions))
}

async fn field_types() -> Json<Value> {
    Json(json!(FieldTypeRegistry::builtin().list()))
}

async fn get_definition(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let state = state.lock().await;
    let found = state
        .definitions
        .iter()
        .flatten()
        .find(|d| d["id"] == json!(id))
        .cloned();
    match found {
        Some(d) => Json(d).into_response(),
        None => error(StatusCode::NOT_FOUND, "definition not found"),
    }
}

async fn create_definition(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().await;
    state.csrf_tokens.push(csrf(&headers));
    let definitions = state.definitions.get_or_insert_with(Vec::new);
    if definitions.iter().any(|d| d["id"] == body["id"]) {
        return error(StatusCode::BAD_REQUEST, "entity id already exists");
    }
    definitions.push(body);
    StatusCode::CREATED.into_response()
}

async fn update_definition(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().await;
    let slot = state
        .definitions
        .iter_mut()
        .flatten()
        .find(|d| d["id"] == json!(id));
    match slot {
        Some(d) => {
            *d = body;
            StatusCode::OK.into_response()
        }
        None => error(StatusCode::NOT_FOUND, "definition not found"),
    }
}

async fn delete_definition(State(state): State<Shared>, Path(id): Path<String>) -> StatusCode {
    let mut state = state.lock().await;
    if let Some(definitions) = state.definitions.as_mut() {
        definitions.retain(|d| d["id"] != json!(id));
    }
    StatusCode::OK
}

async fn create_entity(
    State(state): State<Shared>,
    Path(class): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if class != "product" {
        return error(StatusCode::BAD_REQUEST, "unknown entity class");
    }
    let entity = json!({
        "id": Uuid::new_v4(),
        "entity_class": class,
        "parent_id": null,
        "o_key": body["key"],
        "o_path": body["path"],
        "o_type": body.get("type").cloned().unwrap_or(json!("object")),
        "published": body["published"],
        "has_data": false,
        "created_at": "2025-01-01T00:00:00Z",
    });
    state.lock().await.entities.push(json!({"entity": entity, "data": null}));
    (StatusCode::CREATED, Json(json!({ "entity": entity }))).into_response()
}

async fn read_entity(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let state = state.lock().await;
    match state.entities.iter().find(|r| r["entity"]["id"] == body["id"]) {
        Some(r) => Json(r.clone()).into_response(),
        None => error(StatusCode::BAD_REQUEST, "entity not found"),
    }
}

async fn transition_entity(
    State(state): State<Shared>,
    Path((_class, id)): Path<(String, Uuid)>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().await;
    let Some(record) = state
        .entities
        .iter_mut()
        .find(|r| r["entity"]["id"] == json!(id))
    else {
        return error(StatusCode::BAD_REQUEST, "entity not found");
    };
    record["entity"]["has_data"] = json!(true);
    record["data"] = body["data"].clone();
    Json(record.clone()).into_response()
}

async fn save_entity(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().await;
    let Some(record) = state
        .entities
        .iter_mut()
        .find(|r| r["entity"]["id"] == body["id"])
    else {
        return error(StatusCode::BAD_REQUEST, "entity not found");
    };
    record["entity"]["o_key"] = body["key"].clone();
    record["data"] = body["data"].clone();
    Json(record.clone()).into_response()
}

async fn delete_entity(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().await;
    let before = state.entities.len();
    state.entities.retain(|r| r["entity"]["id"] != body["id"]);
    if state.entities.len() == before {
        return error(StatusCode::BAD_REQUEST, "invalid entity id");
    }
    StatusCode::OK.into_response()
}

async fn spawn_server() -> (String, Shared) {
    let state: Shared = Arc::default();
    let app = Router::new()
        .route("/api/v1/definitions/", get(list_definitions))
        .route("/api/v1/definitions/data-component-types", get(field_types))
        .route("/api/v1/definitions/create", post(create_definition))
        .route("/api/v1/definitions/{id}", get(get_definition))
        .route("/api/v1/definitions/{id}/update", put(update_definition))
        .route("/api/v1/definitions/{id}/delete", delete(delete_definition))
        .route("/api/v1/entities/{class}/create", post(create_entity))
        .route("/api/v1/entities/{class}/read", post(read_entity))
        .route("/api/v1/entities/{class}/save", post(save_entity))
        .route("/api/v1/entities/{class}/delete", post(delete_entity))
        .route("/api/v1/entities/{class}/{id}/transition", post(transition_entity))
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

fn product() -> Definition {
    Definition::new("product", "Product").with_layout(
        [
            FieldComponent::new("input", "sku").titled("SKU").mandatory(true),
            FieldComponent::new("integer", "qty").titled("Quantity"),
        ]
        .into_iter()
        .collect(),
    )
}

#[tokio::test]
async fn null_definition_list_is_empty() {
    let (url, _state) = spawn_server().await;
    let adapter = HttpAdapter::new(&ClientConfig::new(url)).unwrap();
    assert_eq!(adapter.list_definitions().await.unwrap(), Vec::<Definition>::new());
}

#[tokio::test]
async fn field_types_round_trip() {
    let (url, _state) = spawn_server().await;
    let adapter = HttpAdapter::new(&ClientConfig::new(url)).unwrap();
    let types = adapter.list_field_types().await.unwrap();
    assert_eq!(types, FieldTypeRegistry::builtin().list());
}

#[tokio::test]
async fn definition_crud_and_error_bodies() {
    let (url, state) = spawn_server().await;
    let adapter = HttpAdapter::new(&ClientConfig::new(url).with_csrf_token("token-1")).unwrap();

    adapter.create_definition(&product()).await.unwrap();
    assert_eq!(
        adapter.create_definition(&product()).await,
        Err(AdapterError::Conflict("entity id already exists".into()))
    );
    assert_eq!(
        state.lock().await.csrf_tokens,
        vec![Some("token-1".to_string()), Some("token-1".to_string())]
    );

    let mut renamed = adapter.get_definition("product").await.unwrap();
    assert_eq!(renamed, product());
    renamed.name = "Products".into();
    adapter.update_definition("product", &renamed).await.unwrap();
    assert_eq!(adapter.list_definitions().await.unwrap()[0].name, "Products");

    adapter.delete_definition("product").await.unwrap();
    assert_eq!(
        adapter.get_definition("product").await,
        Err(AdapterError::NotFound("definition not found".into()))
    );
}

#[tokio::test]
async fn session_saves_through_http() {
    let (url, _state) = spawn_server().await;
    let adapter = HttpAdapter::new(&ClientConfig::new(url)).unwrap();

    let mut session = DefinitionSession::new();
    assert!(session
        .start_new("car", "Car", &[], &mut AlwaysConfirm)
        .unwrap());
    session.add_component("input").unwrap();
    session.save(&adapter).await.unwrap();
    assert!(!session.has_changes());
    assert!(!session.is_new());

    let stored = adapter.get_definition("car").await.unwrap();
    assert_eq!(stored.layout.len(), 1);
}

#[tokio::test]
async fn entity_form_first_save_then_edit() {
    let (url, _state) = spawn_server().await;
    let adapter = HttpAdapter::new(&ClientConfig::new(url)).unwrap();

    assert_eq!(
        adapter.create_entity("car", &NewEntity::new("mini", "/")).await,
        Err(AdapterError::Rejected("unknown entity class".into()))
    );

    let entity = adapter
        .create_entity("product", &NewEntity::new("shoe", "/"))
        .await
        .unwrap();
    assert!(!entity.has_data);
    assert_eq!(entity.o_type, "object");

    let mut form = EntityForm::load(product(), entity.clone(), &adapter).await.unwrap();
    assert!(form.change("sku", json!("SH-1")));
    form.submit(&adapter).await.unwrap();

    let record = adapter.read_entity("product", entity.id).await.unwrap();
    assert!(record.entity.has_data);
    assert_eq!(record.data["sku"], json!("SH-1"));

    let mut form = EntityForm::load(product(), record.entity.clone(), &adapter)
        .await
        .unwrap();
    assert!(form.change("qty", json!(4)));
    form.submit(&adapter).await.unwrap();
    let record = adapter.read_entity("product", entity.id).await.unwrap();
    assert_eq!(record.data["qty"], json!(4));
}

#[tokio::test]
async fn entity_delete_posts_the_id() {
    let (url, state) = spawn_server().await;
    let adapter = HttpAdapter::new(&ClientConfig::new(url)).unwrap();

    let entity = adapter
        .create_entity("product", &NewEntity::new("shoe", "/"))
        .await
        .unwrap();
    adapter.delete_entity("product", entity.id).await.unwrap();
    assert!(state.lock().await.entities.is_empty());

    assert_eq!(
        adapter.delete_entity("product", entity.id).await,
        Err(AdapterError::Rejected("invalid entity id".into()))
    );
}

#[tokio::test]
async fn unreachable_server_is_unavailable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let adapter = HttpAdapter::new(&ClientConfig::new(format!("http://{addr}"))).unwrap();
    assert!(matches!(
        adapter.list_definitions().await,
        Err(AdapterError::Unavailable(_))
    ));
}
