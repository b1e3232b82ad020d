use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::auth::{GooglerResponse, IdentityResponse, SignInRequest, SignOutResponse},
    error::AppError,
    services::auth_service,
    state::SharedState,
};

/// Sign-in state of the kiosk.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/sign-out", post(sign_out))
        .route("/auth/me", get(me))
}

/// Run the sign-in flow; does nothing when somebody is already signed in.
#[utoipa::path(
    post,
    path = "/auth/sign-in",
    tag = "auth",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed-in identity", body = IdentityResponse),
        (status = 401, description = "Sign-in cancelled or account unknown")
    )
)]
pub async fn sign_in(
    State(state): State<SharedState>,
    Valid(Json(request)): Valid<Json<SignInRequest>>,
) -> Result<Json<IdentityResponse>, AppError> {
    Ok(Json(auth_service::sign_in(&state, request).await?))
}

/// Sign out; idempotent.
#[utoipa::path(
    post,
    path = "/auth/sign-out",
    tag = "auth",
    responses((status = 200, description = "Sign-out outcome", body = SignOutResponse))
)]
pub async fn sign_out(State(state): State<SharedState>) -> Json<SignOutResponse> {
    Json(auth_service::sign_out(&state))
}

/// Signed-in user with its member record.
#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current googler", body = GooglerResponse),
        (status = 401, description = "Nobody signed in or not registered")
    )
)]
pub async fn me(State(state): State<SharedState>) -> Result<Json<GooglerResponse>, AppError> {
    Ok(Json(auth_service::current_googler(&state).await?))
}
