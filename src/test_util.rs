use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use crate::app::build_app;
use crate::state::AppState;
use crate::store::types::{IngredientRow, MealRow};
use crate::store::MemoryStore;

pub fn test_app(state: AppState) -> Router {
    build_app(state)
}

/// Store seeded with the Keto meal the scenario tests revolve around.
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.add_meal(
        "Keto",
        MealRow {
            meal_id: 42,
            meal_name: "Keto Omelette".into(),
            image_url: Some("https://img.example/omelette.jpg".into()),
            protein_grams: 38.0,
            fat_grams: 28.0,
            carb_grams: 22.0,
            calories: Some(520),
        },
        vec![
            IngredientRow {
                ingredient_name: "Eggs".into(),
                quantity: "3".into(),
                smart_group: Some("Dairy & Eggs".into()),
            },
            IngredientRow {
                ingredient_name: "Spinach".into(),
                quantity: "1 cup".into(),
                smart_group: Some("Produce".into()),
            },
        ],
    );
    store
}

/// One-shot request returning status and parsed JSON body.
pub async fn request(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, text) = raw_request(app, method, uri, body).await;
    let json = if text.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn raw_request(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, String) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(value) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .expect("request builds"),
        None => builder.body(Body::empty()).expect("request builds"),
    };
    let response = app.oneshot(request).await.expect("router never errors");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}
