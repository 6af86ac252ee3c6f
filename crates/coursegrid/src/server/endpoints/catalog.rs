use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::catalog::{ClockTime, Weekday};
use crate::filter::{self, FilterCriteria};
use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// GET /catalog/search
/// Evaluates the browse filter against the catalog.
///
/// Query parameters: `search`, `term`, `days` and `fields` (comma-separated,
/// OR within the set), `min_from_time` (`HH:MM`), `hide_conflicting`.
pub async fn get_search(
    Query(params): Query<HashMap<String, String>>,
    State(s): State<Arc<AppState>>,
) -> Response {
    info!("GET /catalog/search");

    let criteria = match criteria_from_params(&params) {
        Ok(criteria) => criteria,
        Err(response) => return response,
    };

    let selection = s.selection.lock().unwrap();
    let results = filter::evaluate(&s.catalog, &criteria, &selection);
    (StatusCode::OK, Json(results)).into_response()
}

/// GET /catalog/fields
/// The derived field-of-study vocabulary, priority prefix first.
pub async fn get_fields(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /catalog/fields");
    (StatusCode::OK, Json(s.catalog.fields())).into_response()
}

/// GET /catalog/available
/// Catalog courses not yet picked in any term.
pub async fn get_available(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /catalog/available");
    let selection = s.selection.lock().unwrap();
    let results = filter::available_for_picking(&s.catalog, &selection);
    (StatusCode::OK, Json(results)).into_response()
}

/// GET /catalog/course/:id
/// Full detail for one course.
pub async fn get_course(Path(id): Path<String>, State(s): State<Arc<AppState>>) -> Response {
    info!("GET /catalog/course/{id}");
    match s.catalog.get(&id) {
        Some(course) => (StatusCode::OK, Json(course)).into_response(),
        None => ApiErrorType::from((StatusCode::NOT_FOUND, "Unknown course id", Some(id)))
            .into_response(),
    }
}

fn criteria_from_params(params: &HashMap<String, String>) -> Result<FilterCriteria, Response> {
    let mut criteria = FilterCriteria::default();

    if let Some(search) = params.get("search") {
        criteria.search = search.clone();
    }
    if let Some(term) = params.get("term") {
        criteria.term = Some(
            term.parse()
                .map_err(|_| bad_request("Invalid term", term))?,
        );
    }
    if let Some(days) = params.get("days") {
        for name in days.split(',').filter(|s| !s.is_empty()) {
            let day = Weekday::parse(name).ok_or_else(|| bad_request("Unknown day name", name))?;
            criteria.days.insert(day);
        }
    }
    if let Some(fields) = params.get("fields") {
        criteria.fields = fields
            .split(',')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(time) = params.get("min_from_time") {
        criteria.min_from_time =
            Some(ClockTime::parse(time).ok_or_else(|| bad_request("Invalid time", time))?);
    }
    criteria.hide_conflicting = params
        .get("hide_conflicting")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    Ok(criteria)
}

fn bad_request(message: &str, detail: &str) -> Response {
    ApiErrorType::from((StatusCode::BAD_REQUEST, message, Some(detail.to_string())))
        .into_response()
}
