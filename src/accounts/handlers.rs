use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, instrument, warn};

use crate::{
    accounts::{
        dto::{
            LoginRequest, PublicUser, RefreshRequest, RefreshResponse, RegisterRequest,
            TokenResponse, REQUIRED,
        },
        jwt::{AuthUser, JwtKeys},
        login::LoginCredentials,
    },
    error::{AppError, AppResult, FieldErrors},
    json::AppJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register/", post(register))
        .route("/auth/login/", post(login))
        .route("/auth/token/refresh/", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me/", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<PublicUser>)> {
    let user = state.registration().register(payload).await?;
    Ok((StatusCode::CREATED, Json(PublicUser::from(&user))))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let credentials = LoginCredentials::try_from(payload)?;
    let response = state.login_issuer().validate(&credentials).await?;
    Ok(Json(response))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RefreshRequest>,
) -> AppResult<Json<RefreshResponse>> {
    let token = payload
        .refresh
        .filter(|t| !t.is_empty())
        .ok_or_else(|| FieldErrors::single("refresh", REQUIRED))?;

    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        AppError::InvalidToken
    })?;

    let access = keys.sign_access(claims.sub)?;
    debug!(user_id = %claims.sub, "access token refreshed");
    Ok(Json(RefreshResponse { access }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<PublicUser>> {
    let user = state
        .accounts
        .find_by_id(user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| {
            warn!(user_id = %user_id, "token for missing or inactive user");
            AppError::Authentication("User not found".into())
        })?;

    Ok(Json(PublicUser::from(&user)))
}
