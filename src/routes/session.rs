use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use axum_valid::Valid;

use crate::{
    dto::session::{SessionSnapshot, SetSessionMembersRequest},
    error::AppError,
    services::session_service,
    state::SharedState,
};

/// Session lifecycle and check-in endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/session", get(get_session))
        .route("/session/open", post(open_session))
        .route("/session/close", post(close_session))
        .route("/session/members", put(set_session_members))
        .route(
            "/session/members/{id}",
            post(check_in).delete(check_out),
        )
}

/// Session status with members and games resolved against the roster.
#[utoipa::path(
    get,
    path = "/session",
    tag = "session",
    responses((status = 200, description = "Current session", body = SessionSnapshot))
)]
pub async fn get_session(
    State(state): State<SharedState>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(session_service::snapshot(&state)?))
}

/// Open a session. Organizers only.
#[utoipa::path(
    post,
    path = "/session/open",
    tag = "session",
    responses(
        (status = 200, description = "Session opened", body = SessionSnapshot),
        (status = 401, description = "Not an organizer")
    )
)]
pub async fn open_session(
    State(state): State<SharedState>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(session_service::open(&state).await?))
}

/// Close the session and drop its check-ins and games. Organizers only.
#[utoipa::path(
    post,
    path = "/session/close",
    tag = "session",
    responses(
        (status = 204, description = "Session closed"),
        (status = 401, description = "Not an organizer")
    )
)]
pub async fn close_session(State(state): State<SharedState>) -> Result<StatusCode, AppError> {
    session_service::close(&state).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the checked-in member list. Organizers only.
#[utoipa::path(
    put,
    path = "/session/members",
    tag = "session",
    request_body = SetSessionMembersRequest,
    responses((status = 200, description = "Checked-in member ids", body = [String]))
)]
pub async fn set_session_members(
    State(state): State<SharedState>,
    Valid(Json(request)): Valid<Json<SetSessionMembersRequest>>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(session_service::set_members(&state, request).await?))
}

/// Check one member into the open session; checking in twice is a no-op.
#[utoipa::path(
    post,
    path = "/session/members/{id}",
    tag = "session",
    params(("id" = String, Path, description = "Member to check in")),
    responses((status = 200, description = "Checked-in member ids", body = [String]))
)]
pub async fn check_in(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(session_service::check_in(&state, id).await?))
}

/// Check one member out of the open session.
#[utoipa::path(
    delete,
    path = "/session/members/{id}",
    tag = "session",
    params(("id" = String, Path, description = "Member to check out")),
    responses((status = 200, description = "Checked-in member ids", body = [String]))
)]
pub async fn check_out(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(session_service::check_out(&state, id).await?))
}
