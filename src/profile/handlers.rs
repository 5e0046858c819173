use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{ProfileResponse, UpdateProfileRequest},
    model::PatientProfile,
    repo,
};
use crate::{
    auth::services::AuthUser,
    nutrition::compute_limits,
    rejection::{self, Rejection},
    state::AppState,
};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(update_profile))
}

/// Loads and validates the stored profile of `user_id`.
pub async fn load_patient(state: &AppState, user_id: Uuid) -> Result<PatientProfile, Rejection> {
    let row = repo::find_by_user(&state.db, user_id)
        .await
        .map_err(rejection::internal)?
        .ok_or_else(|| {
            warn!(%user_id, "profile requested for unknown user");
            (StatusCode::NOT_FOUND, "User not found".to_string())
        })?;
    PatientProfile::try_from(row).map_err(rejection::nutrition)
}

fn respond(profile: PatientProfile) -> Result<Json<ProfileResponse>, Rejection> {
    let limits = compute_limits(&profile.engine_profile()).map_err(rejection::nutrition)?;
    Ok(Json(ProfileResponse { profile, limits }))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, Rejection> {
    let profile = load_patient(&state, user_id).await?;
    respond(profile)
}

#[instrument(skip(state, payload))]
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, Rejection> {
    let current = load_patient(&state, user_id).await?;
    let updated = payload.apply_to(current);
    updated.validate().map_err(rejection::nutrition)?;

    if !repo::update(&state.db, user_id, &updated)
        .await
        .map_err(rejection::internal)?
    {
        return Err((StatusCode::NOT_FOUND, "User not found".into()));
    }

    info!(%user_id, ckd_stage = updated.ckd_stage, "profile updated");
    respond(updated)
}
