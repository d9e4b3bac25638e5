//! Timeline and calendar projections

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::Datelike;
use eventdir_core::date::monday_of;
use eventdir_core::view::{CalendarNav, Layout, Projection, Tab, ViewState};
use eventdir_core::{CalendarMode, parse_flexible_date, today_local};
use serde::Deserialize;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/timeline", get(timeline))
        .route("/calendar/month", get(month))
        .route("/calendar/week", get(week))
}

#[derive(Deserialize)]
pub struct TimelineQuery {
    /// Include records that have already ended
    #[serde(default)]
    pub all: bool,
    #[serde(default)]
    pub tab: Tab,
}

#[derive(Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    /// 1-based
    pub month: Option<u32>,
    #[serde(default)]
    pub tab: Tab,
}

#[derive(Deserialize)]
pub struct WeekQuery {
    /// Any date in the week; defaults to today
    pub start: Option<String>,
    #[serde(default)]
    pub tab: Tab,
}

async fn project(state: &AppState, view: ViewState) -> Result<Json<Projection>, AppError> {
    let records = state.records().await;
    view.project(&records, today_local(), &state.options)
        .map(Json)
        .ok_or_else(|| AppError::bad_request("date is outside the supported calendar range"))
}

/// GET /timeline?all=&tab=
async fn timeline(
    State(state): State<AppState>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<Projection>, AppError> {
    let view = ViewState {
        tab: query.tab,
        show_past: query.all,
        ..ViewState::default()
    };
    project(&state, view).await
}

/// GET /calendar/month?year=&month=&tab=
async fn month(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Projection>, AppError> {
    let today = today_local();
    let month = query.month.unwrap_or(today.month());
    if !(1..=12).contains(&month) {
        return Err(AppError::bad_request(format!(
            "month must be between 1 and 12, got {month}"
        )));
    }

    let nav = CalendarNav {
        year: query.year.unwrap_or(today.year()),
        month,
        ..CalendarNav::today(CalendarMode::Month, today)
    };
    let view = ViewState {
        tab: query.tab,
        layout: Layout::Calendar(nav),
        ..ViewState::default()
    };

    project(&state, view).await
}

/// GET /calendar/week?start=&tab=
async fn week(
    State(state): State<AppState>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<Projection>, AppError> {
    let today = today_local();
    let anchor = match query.start.as_deref() {
        Some(raw) => parse_flexible_date(raw)
            .date()
            .ok_or_else(|| AppError::bad_request(format!("could not parse date '{raw}'")))?,
        None => today,
    };

    let week_start = monday_of(anchor)
        .ok_or_else(|| AppError::bad_request(format!("no week starts before '{anchor}'")))?;

    let nav = CalendarNav {
        week_start,
        ..CalendarNav::today(CalendarMode::Week, today)
    };
    let view = ViewState {
        tab: query.tab,
        layout: Layout::Calendar(nav),
        ..ViewState::default()
    };

    project(&state, view).await
}
