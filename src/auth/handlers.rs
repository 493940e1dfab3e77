use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, TokenResponse},
        extractors::CurrentUser,
        jwt::JwtKeys,
        password::{verify_dummy_async, verify_password_async},
    },
    error::{ApiError, ApiResult},
    state::AppState,
    users::{dto::UserResponse, services::normalize_email},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

/// Unknown email and wrong password are indistinguishable to the caller.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: LoginRequest,
) -> ApiResult<Json<TokenResponse>> {
    let email = normalize_email(&payload.email);

    let Some(user) = state.users.find_by_email(&email).await? else {
        verify_dummy_async(payload.password)
            .await
            .map_err(ApiError::internal)?;
        warn!("login unknown email");
        return Err(ApiError::WrongCredentials);
    };

    let ok = verify_password_async(payload.password, user.password_hash.clone())
        .await
        .map_err(ApiError::internal)?;
    if !ok {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::WrongCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.issue(user.id).map_err(ApiError::internal)?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse::bearer(access_token)))
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}
