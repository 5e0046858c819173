use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    routing::{delete, post},
    Json, Router,
};
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{CreateFoodLogRequest, EstimateBody, EstimateResponse, FoodLogView, LogsQuery},
    repo,
    services::validate_new_log,
};
use crate::{
    auth::services::AuthUser,
    estimation::{EstimateRequest, EstimationError, DEFAULT_PORTION_G},
    rejection::{self, Rejection},
    state::AppState,
};

pub fn food_routes() -> Router<AppState> {
    Router::new()
        .route("/food/estimate", post(estimate))
        .route("/food/logs", post(create_log).get(list_logs))
        .route("/food/logs/:id", delete(delete_log))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

#[instrument(skip(state, body))]
pub async fn estimate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<EstimateBody>,
) -> Result<Json<EstimateResponse>, Rejection> {
    let food_name = body
        .food_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let image = body
        .image
        .map(|b| Bytes::from(b.into_vec()))
        .filter(|b| !b.is_empty());
    if food_name.is_none() && image.is_none() {
        return Err((
            StatusCode::BAD_REQUEST,
            "food_name or image is required".into(),
        ));
    }

    let portion_size = body.portion_size.unwrap_or(DEFAULT_PORTION_G);
    if !(portion_size.is_finite() && portion_size > 0.0) {
        return Err((
            StatusCode::BAD_REQUEST,
            "portion_size must be a positive number".into(),
        ));
    }

    let request = EstimateRequest {
        food_name,
        portion_size,
        image,
    };
    let estimate = state.estimator.estimate(&request).await.map_err(|e| match e {
        EstimationError::Exhausted => {
            warn!(%user_id, "no estimate available");
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        other => rejection::internal(other),
    })?;

    info!(%user_id, source = estimate.source, "food estimated");
    Ok(Json(EstimateResponse {
        estimate,
        disclaimer: true,
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateFoodLogRequest>,
) -> Result<(StatusCode, Json<FoodLogView>), Rejection> {
    let log = validate_new_log(payload, OffsetDateTime::now_utc()).map_err(|e| {
        warn!(%user_id, error = %e, "invalid food log");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    let entry = repo::insert(&state.db, user_id, &log)
        .await
        .map_err(rejection::internal)?;

    info!(%user_id, log_id = %entry.id, "food logged");
    Ok((StatusCode::CREATED, Json(entry.into())))
}

#[instrument(skip(state))]
pub async fn list_logs(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<LogsQuery>,
) -> Result<Json<Vec<FoodLogView>>, Rejection> {
    let entries = repo::list(&state.db, user_id, q.start, q.end)
        .await
        .map_err(rejection::internal)?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state))]
pub async fn delete_log(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Rejection> {
    if !repo::delete(&state.db, user_id, id)
        .await
        .map_err(rejection::internal)?
    {
        return Err((StatusCode::NOT_FOUND, "Food log not found".into()));
    }
    info!(%user_id, log_id = %id, "food log deleted");
    Ok(StatusCode::NO_CONTENT)
}
