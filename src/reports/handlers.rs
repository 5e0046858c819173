use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use time::{Date, Duration, OffsetDateTime, UtcOffset};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    food_logs::repo,
    nutrition::{
        daily_alerts, daily_summary,
        dates::{day_window, iso_date, today},
        weekly_summary, Alert, DailySummary, FoodLogEntry, WeeklySummary,
    },
    profile::handlers::load_patient,
    rejection::{self, Rejection},
    state::AppState,
};

pub const WEEK_DAYS: u32 = 7;

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    #[serde(default, deserialize_with = "iso_date::option::deserialize")]
    pub date: Option<Date>,
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    #[serde(default, deserialize_with = "iso_date::option::deserialize")]
    pub end_date: Option<Date>,
}

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/nutrition/daily", get(daily))
        .route("/nutrition/alerts", get(alerts))
        .route("/nutrition/weekly", get(weekly))
}

type Window = (OffsetDateTime, OffsetDateTime);

/// Instant window of `num_days` whole local days starting at `first_day`.
fn window(first_day: Date, num_days: u32, offset: UtcOffset) -> Result<Window, Rejection> {
    day_window(first_day, num_days, offset).ok_or_else(|| {
        warn!(%first_day, num_days, "report window outside supported dates");
        (StatusCode::BAD_REQUEST, "date out of range".to_string())
    })
}

async fn entries_in(
    state: &AppState,
    user_id: Uuid,
    (start, end): Window,
) -> Result<Vec<FoodLogEntry>, Rejection> {
    let entries = repo::list_in_window(&state.db, user_id, start, end)
        .await
        .map_err(rejection::internal)?;
    debug!(%user_id, count = entries.len(), %start, %end, "entries loaded");
    Ok(entries)
}

#[instrument(skip(state))]
pub async fn daily(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DayQuery>,
) -> Result<Json<DailySummary>, Rejection> {
    let offset = state.day_offset();
    let day = q.date.unwrap_or_else(|| today(offset));
    let span = window(day, 1, offset)?;
    let profile = load_patient(&state, user_id).await?;
    let entries = entries_in(&state, user_id, span).await?;
    daily_summary(&profile.engine_profile(), &entries, day, offset)
        .map(Json)
        .map_err(rejection::nutrition)
}

#[instrument(skip(state))]
pub async fn alerts(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DayQuery>,
) -> Result<Json<Vec<Alert>>, Rejection> {
    let offset = state.day_offset();
    let day = q.date.unwrap_or_else(|| today(offset));
    let span = window(day, 1, offset)?;
    let profile = load_patient(&state, user_id).await?;
    let entries = entries_in(&state, user_id, span).await?;
    daily_alerts(&profile.engine_profile(), &entries, day, offset)
        .map(Json)
        .map_err(rejection::nutrition)
}

#[instrument(skip(state))]
pub async fn weekly(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<WeekQuery>,
) -> Result<Json<WeeklySummary>, Rejection> {
    let offset = state.day_offset();
    let end_day = q.end_date.unwrap_or_else(|| today(offset));
    let start_day = week_start(end_day)
        .ok_or((StatusCode::BAD_REQUEST, "date out of range".to_string()))?;
    let span = window(start_day, WEEK_DAYS, offset)?;
    let profile = load_patient(&state, user_id).await?;
    let entries = entries_in(&state, user_id, span).await?;
    weekly_summary(&profile.engine_profile(), &entries, start_day, WEEK_DAYS, offset)
        .map(Json)
        .map_err(rejection::nutrition)
}

fn week_start(end_day: Date) -> Option<Date> {
    end_day.checked_sub(Duration::days(i64::from(WEEK_DAYS) - 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, offset};

    #[test]
    fn week_ends_on_end_date() {
        assert_eq!(week_start(date!(2025 - 03 - 07)), Some(date!(2025 - 03 - 01)));
        assert_eq!(week_start(date!(2025 - 01 - 03)), Some(date!(2024 - 12 - 28)));
        assert_eq!(week_start(Date::MIN), None);
    }

    #[test]
    fn empty_date_means_today() {
        let q: DayQuery = serde_json::from_value(serde_json::json!({ "date": "" })).unwrap();
        assert!(q.date.is_none());
        let q: DayQuery = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(q.date.is_none());
        let q: WeekQuery =
            serde_json::from_value(serde_json::json!({ "end_date": "2025-03-07" })).unwrap();
        assert_eq!(q.end_date, Some(date!(2025 - 03 - 07)));
    }

    #[test]
    fn last_supported_day_is_a_bad_request() {
        let last = date!(9999 - 12 - 31);
        let (status, _) = window(last, 1, offset!(UTC)).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let start = week_start(last).unwrap();
        let (status, msg) = window(start, WEEK_DAYS, offset!(-5)).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(msg, "date out of range");
    }

    #[test]
    fn ordinary_week_has_a_window() {
        let start = week_start(date!(2025 - 03 - 07)).unwrap();
        let (from, to) = window(start, WEEK_DAYS, offset!(UTC)).unwrap();
        assert_eq!(to - from, Duration::days(7));
    }
}
