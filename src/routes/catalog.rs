use axum::response::{IntoResponse, Json};
use serde_json::json;

use crate::models::catalog;

#[axum::debug_handler]
pub async fn list_districts() -> impl IntoResponse {
    let items: Vec<_> = catalog::DISTRICTS
        .iter()
        .map(|district| {
            json!({
                "name": district.name,
                "villages": district.villages,
            })
        })
        .collect();
    Json(json!({ "items": items }))
}

#[axum::debug_handler]
pub async fn list_crops() -> impl IntoResponse {
    Json(json!({ "items": catalog::CROPS }))
}

#[axum::debug_handler]
pub async fn list_tasks() -> impl IntoResponse {
    Json(json!({ "items": catalog::TASKS }))
}

#[axum::debug_handler]
pub async fn list_time_windows() -> impl IntoResponse {
    Json(json!({ "items": catalog::TIME_WINDOWS }))
}
