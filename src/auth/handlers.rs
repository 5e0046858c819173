use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
        repo::is_unique_violation,
        repo_types::User,
        services::{
            hash_password, is_valid_email, verify_password, AuthUser, JwtKeys, TokenKind,
            MIN_PASSWORD_LEN,
        },
    },
    rejection::{self, Rejection},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn issue_tokens(state: &AppState, user: User) -> Result<Json<AuthResponse>, Rejection> {
    let keys = JwtKeys::from_ref(state);
    let (access_token, refresh_token) = keys.sign_pair(user.id).map_err(|e| {
        error!(error = %e, user_id = %user.id, "jwt signing failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser {
            id: user.id,
            email: user.email,
        },
    }))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), Rejection> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err((StatusCode::BAD_REQUEST, "Password too short".into()));
    }

    payload.profile.validate().map_err(rejection::nutrition)?;

    if User::find_by_email(&state.db, &payload.email)
        .await
        .map_err(rejection::internal)?
        .is_some()
    {
        warn!(email = %payload.email, "email already registered");
        return Err((StatusCode::CONFLICT, "Email already registered".into()));
    }

    let hash = hash_password(&payload.password).map_err(rejection::internal)?;
    // a concurrent sign-up can still win the race to the unique index
    let user = User::create(&state.db, &payload.email, &hash, &payload.profile)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                warn!(email = %payload.email, "email registered concurrently");
                (StatusCode::CONFLICT, "Email already registered".to_string())
            } else {
                rejection::internal(e)
            }
        })?;

    info!(
        user_id = %user.id,
        ckd_stage = payload.profile.ckd_stage,
        "user registered"
    );
    Ok((StatusCode::CREATED, issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, Rejection> {
    payload.email = payload.email.trim().to_lowercase();

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::BAD_REQUEST, "Invalid email".into()));
    }

    let user = match User::find_by_email(&state.db, &payload.email)
        .await
        .map_err(rejection::internal)?
    {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
        }
    };

    if !verify_password(&payload.password, &user.password_hash).map_err(rejection::internal)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    info!(user_id = %user.id, "user logged in");
    issue_tokens(&state, user)
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, Rejection> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_kind(&payload.refresh_token, TokenKind::Refresh)
        .map_err(|e| {
            warn!(error = %e, "refresh rejected");
            (StatusCode::UNAUTHORIZED, e.to_string())
        })?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await
        .map_err(rejection::internal)?
        .ok_or_else(|| {
            warn!(user_id = %claims.sub, "refresh for deleted user");
            (StatusCode::UNAUTHORIZED, "User not found".to_string())
        })?;

    issue_tokens(&state, user)
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, Rejection> {
    let user = User::find_by_id(&state.db, user_id)
        .await
        .map_err(rejection::internal)?
        .ok_or_else(|| {
            warn!(%user_id, "token subject no longer exists");
            (StatusCode::UNAUTHORIZED, "User not found".to_string())
        })?;

    Ok(Json(PublicUser {
        id: user.id,
        email: user.email,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    #[test]
    fn public_user_hides_password_hash() {
        let response = PublicUser {
            id: uuid::Uuid::new_v4(),
            email: "patient@example.com".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("patient@example.com"));
        assert!(!json.contains("password"));
    }

    #[tokio::test]
    async fn register_rejects_bad_input_before_touching_db() {
        let app = auth_routes().with_state(AppState::fake());

        let body = |email: &str, password: &str, ckd_stage: u8| {
            serde_json::json!({
                "email": email,
                "password": password,
                "profile": {
                    "age": 60,
                    "ckd_stage": ckd_stage,
                    "weight_kg": 70,
                    "activity_level": "moderate"
                }
            })
            .to_string()
        };
        let cases = [
            (body("nope", "longenough", 3), StatusCode::BAD_REQUEST),
            (body("a@b.co", "short", 3), StatusCode::BAD_REQUEST),
            (body("a@b.co", "longenough", 7), StatusCode::UNPROCESSABLE_ENTITY),
        ];

        for (body, expected) in cases {
            let res = app
                .clone()
                .oneshot(
                    Request::post("/auth/register")
                        .header("content-type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(res.status(), expected, "body: {body}");
        }
    }

    #[tokio::test]
    async fn refresh_rejects_access_token() {
        let state = AppState::fake();
        let access = JwtKeys::from_ref(&state)
            .sign_access(uuid::Uuid::new_v4())
            .unwrap();
        let app = auth_routes().with_state(state);

        let res = app
            .oneshot(
                Request::post("/auth/refresh")
                    .header("content-type", "application/json")
                    .body(Body::from(format!(r#"{{"refresh_token":"{access}"}}"#)))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
