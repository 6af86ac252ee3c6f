use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::server::endpoints::{catalog, schedule, selection, status};
use crate::types::AppState;

mod endpoints;
mod types;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let catalog_router = Router::new()
        .route("/catalog/search", get(catalog::get_search))
        .route("/catalog/fields", get(catalog::get_fields))
        .route("/catalog/available", get(catalog::get_available))
        .route("/catalog/course/:id", get(catalog::get_course));

    let selection_router = Router::new()
        .route("/selection", get(selection::get_selection))
        .route("/selection/add", post(selection::post_add))
        .route("/selection/remove", post(selection::post_remove))
        .route("/selection/clear/:term", post(selection::post_clear_term))
        .route("/selection/clear", post(selection::post_clear_all));

    let schedule_router = Router::new()
        .route("/schedule/:term", get(schedule::get_layout))
        .route("/schedule/:term/export", get(schedule::get_export));

    Router::new()
        .route("/health", get(status::get_health))
        .merge(catalog_router)
        .merge(selection_router)
        .merge(schedule_router)
        .with_state(app_state)
}
