//! End-to-end CRUD flows against an in-process axum server.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use parking_lot::Mutex;
use restie::Restie;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

type Table = Arc<Mutex<HashMap<String, Value>>>;

fn create(table: &Table, data: Value) -> Value {
    let key = uuid::Uuid::new_v4().to_string();
    let mut model = match data {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    model.insert("uuid".into(), json!(key));
    let model = Value::Object(model);
    table.lock().insert(key, model.clone());
    model
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Error 404").into_response()
}

async fn create_crayon(State(table): State<Table>, Json(body): Json<Value>) -> Json<Value> {
    Json(create(&table, body))
}

async fn read_vegetable(State(table): State<Table>, Path(uuid): Path<String>) -> Response {
    match table.lock().get(&uuid) {
        Some(model) => Json(model.clone()).into_response(),
        None => not_found(),
    }
}

async fn update_human(
    State(table): State<Table>,
    Path(uuid): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut table = table.lock();
    let Some(Value::Object(model)) = table.get_mut(&uuid) else {
        return not_found();
    };
    if let Value::Object(changes) = body {
        model.extend(changes);
    }
    Json(Value::Object(model.clone())).into_response()
}

async fn destroy_box(State(table): State<Table>, Path(uuid): Path<String>) -> Response {
    match table.lock().remove(&uuid) {
        Some(_) => Json(json!({"deleted": true})).into_response(),
        None => not_found(),
    }
}

async fn serve() -> (String, Table) {
    let table: Table = Arc::default();
    let app = Router::new()
        .route("/boxes/current/crayons", post(create_crayon))
        .route("/foods/vegetables/{uuid}", get(read_vegetable))
        .route("/planets/earth/humans/{uuid}", put(update_human))
        .route("/warehouse/1/boxes/{uuid}", delete(destroy_box))
        .with_state(table.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), table)
}

fn assert_subset(subset: &Value, of: &Value) {
    for (key, value) in subset.as_object().unwrap() {
        assert_eq!(of.get(key), Some(value), "mismatch on {key}");
    }
}

#[tokio::test]
async fn test_create_remote_model() {
    let (url, table) = serve().await;
    let crayons = Restie::new(url).item("boxes", "current").collection("crayons");

    let shape = json!({"color": "red", "size": "small"});
    let response = crayons.post().data(shape.clone()).await.unwrap();

    assert_subset(&shape, response.data());
    let uuid = response.data()["uuid"].as_str().unwrap().to_string();
    assert_eq!(table.lock().get(&uuid), Some(response.data()));
}

#[tokio::test]
async fn test_read_remote_model() {
    let (url, table) = serve().await;
    let existing = create(&table, json!({"isPotatoLike": true, "noun": "Potat", "color": "red"}));
    let uuid = existing["uuid"].as_str().unwrap();

    let vegetables = Restie::new(url).collection("foods").collection("vegetables");
    let response = vegetables.get().path(uuid).await.unwrap();
    assert_subset(&existing, response.data());

    let err = vegetables.get().path("missing").await.unwrap_err();
    assert_eq!(err.status_code(), 404);
    assert_eq!(err.response().unwrap().data(), &json!("Error 404"));
}

#[tokio::test]
async fn test_update_remote_model() {
    let (url, table) = serve().await;
    let base = json!({"fullName": "Hubert J. Farnsworth", "homeworld": "earth"});
    let mut seeded = base.clone();
    seeded["enjoymentOnHomeworld"] = json!(true);
    let existing = create(&table, seeded);

    let farnsworth = Restie::new(url)
        .item("planets", "earth")
        .item("humans", existing["uuid"].as_str().unwrap());

    let updated = farnsworth
        .put()
        .json(&json!({"enjoymentOnHomeworld": false}))
        .await
        .unwrap();

    let mut expected = base;
    expected["enjoymentOnHomeworld"] = json!(false);
    assert_subset(&expected, updated.data());
}

#[tokio::test]
async fn test_destroy_remote_model() {
    let (url, table) = serve().await;
    let existing = create(&table, json!({"size": "large", "color": "brown"}));
    let uuid = existing["uuid"].as_str().unwrap().to_string();

    let brown_box = Restie::new(url).item("warehouse", 1).item("boxes", uuid.as_str());
    let result = brown_box.delete().await.unwrap();

    assert_subset(&json!({"deleted": true}), result.data());
    assert!(!table.lock().contains_key(&uuid));
}
