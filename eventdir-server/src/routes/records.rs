//! Record endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use eventdir_core::ics::generate_ics;
use eventdir_core::view::Tab;
use eventdir_core::{EventDirError, EventRecord};
use serde::Deserialize;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/records", get(list_records))
        .route("/records/{id}", get(get_record))
        .route("/records/{id}/ics", get(download_ics))
}

#[derive(Deserialize)]
pub struct RecordsQuery {
    #[serde(default)]
    pub tab: Tab,
}

/// GET /records - Every normalized record, optionally for one tab
async fn list_records(
    State(state): State<AppState>,
    Query(query): Query<RecordsQuery>,
) -> Json<Vec<EventRecord>> {
    let records = state
        .records()
        .await
        .into_iter()
        .filter(|r| query.tab.matches(r.kind))
        .collect();

    Json(records)
}

async fn find(state: &AppState, id: &str) -> Result<EventRecord, AppError> {
    state
        .find(id)
        .await
        .ok_or_else(|| EventDirError::RecordNotFound(id.to_string()).into())
}

/// GET /records/{id}
async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventRecord>, AppError> {
    Ok(Json(find(&state, &id).await?))
}

/// GET /records/{id}/ics - "Add to calendar" download
async fn download_ics(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let record = find(&state, &id).await?;
    let ics = generate_ics(&record)?;

    let disposition = format!("attachment; filename=\"{}.ics\"", sanitize_file_name(&record.id));

    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        ics,
    ))
}

fn sanitize_file_name(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
