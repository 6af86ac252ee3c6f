use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::sync::Arc;
use tracing::info;

use crate::catalog::CourseRecord;
use crate::ics;
use crate::layout;
use crate::types::AppState;

/// GET /schedule/:term
/// Grid placement for everything visible in the term: its own selection
/// plus the yearly list.
pub async fn get_layout(Path(term): Path<i32>, State(s): State<Arc<AppState>>) -> Response {
    info!("GET /schedule/{term}");
    let selection = s.selection.lock().unwrap();
    let blocks = layout::layout_for_term(&s.catalog, &selection, term);
    (StatusCode::OK, Json(blocks)).into_response()
}

/// GET /schedule/:term/export
/// The visible schedule as an iCalendar document.
pub async fn get_export(Path(term): Path<i32>, State(s): State<Arc<AppState>>) -> Response {
    info!("GET /schedule/{term}/export");

    let selection = s.selection.lock().unwrap();
    let courses: Vec<&CourseRecord> = selection
        .visible_ids(term)
        .into_iter()
        .filter_map(|id| s.catalog.get(id))
        .collect();

    let events = ics::events_for_courses(&courses);
    let body = ics::write_ics(&events);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/calendar; charset=utf-8")],
        body,
    )
        .into_response()
}
