use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::server::types::ApiErrorType;
use crate::types::AppState;

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveRequest {
    pub id: String,
    pub term: i32,
}

/// GET /selection
/// The current term → chosen-course-id lists.
pub async fn get_selection(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /selection");
    let selection = s.selection.lock().unwrap();
    (StatusCode::OK, Json(selection.terms())).into_response()
}

/// POST /selection/add
/// Adds a catalog course to its term's list. Adding an already-chosen
/// course is a no-op, reported through `added: false`.
pub async fn post_add(
    State(s): State<Arc<AppState>>,
    Json(request): Json<AddRequest>,
) -> Response {
    info!("POST /selection/add {}", request.id);

    let Some(course) = s.catalog.get(&request.id) else {
        return ApiErrorType::from((
            StatusCode::NOT_FOUND,
            "Unknown course id",
            Some(request.id),
        ))
        .into_response();
    };

    let added = s.selection.lock().unwrap().add(course);
    (
        StatusCode::OK,
        Json(json!({
            "id": course.id,
            "term": course.term,
            "added": added,
        })),
    )
        .into_response()
}

/// POST /selection/remove
/// Removes an id from a term's list. Unknown terms and absent ids are
/// no-ops, never errors.
pub async fn post_remove(
    State(s): State<Arc<AppState>>,
    Json(request): Json<RemoveRequest>,
) -> Response {
    info!("POST /selection/remove {} (term {})", request.id, request.term);
    let removed = s
        .selection
        .lock()
        .unwrap()
        .remove(&request.id, request.term);
    (
        StatusCode::OK,
        Json(json!({
            "id": request.id,
            "term": request.term,
            "removed": removed,
        })),
    )
        .into_response()
}

/// POST /selection/clear/:term
pub async fn post_clear_term(Path(term): Path<i32>, State(s): State<Arc<AppState>>) -> Response {
    info!("POST /selection/clear/{term}");
    s.selection.lock().unwrap().clear_term(term);
    (StatusCode::OK, Json(json!({ "cleared": term }))).into_response()
}

/// POST /selection/clear
pub async fn post_clear_all(State(s): State<Arc<AppState>>) -> Response {
    info!("POST /selection/clear");
    s.selection.lock().unwrap().clear_all();
    (StatusCode::OK, Json(json!({ "cleared": "all" }))).into_response()
}
