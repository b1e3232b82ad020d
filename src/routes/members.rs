use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::member::{LookupMembersRequest, MemberSummary, RegisterMemberRequest},
    error::AppError,
    services::member_service,
    state::SharedState,
};

/// Member registration and roster lookups.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/members", get(list_members).post(register_member))
        .route("/members/lookup", post(lookup_members))
        .route("/members/{id}", get(get_member))
}

/// Create or overwrite a member with the default rating and role.
///
/// Requires sign-in; registering another id requires the organizer role.
#[utoipa::path(
    post,
    path = "/members",
    tag = "members",
    request_body = RegisterMemberRequest,
    responses(
        (status = 201, description = "Member registered", body = MemberSummary),
        (status = 401, description = "Not signed in, or registering someone else without the organizer role")
    )
)]
pub async fn register_member(
    State(state): State<SharedState>,
    Valid(Json(request)): Valid<Json<RegisterMemberRequest>>,
) -> Result<(StatusCode, Json<MemberSummary>), AppError> {
    let member = member_service::register(&state, request).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// Every registered member, ordered by id.
#[utoipa::path(
    get,
    path = "/members",
    tag = "members",
    responses((status = 200, description = "Every registered member", body = [MemberSummary]))
)]
pub async fn list_members(
    State(state): State<SharedState>,
) -> Result<Json<Vec<MemberSummary>>, AppError> {
    Ok(Json(member_service::list(&state).await?))
}

#[utoipa::path(
    get,
    path = "/members/{id}",
    tag = "members",
    params(("id" = String, Path, description = "Member identifier")),
    responses(
        (status = 200, description = "Member", body = MemberSummary),
        (status = 404, description = "No such member")
    )
)]
pub async fn get_member(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<MemberSummary>, AppError> {
    Ok(Json(member_service::get(&state, id).await?))
}

/// Members among the given ids; unknown ids are left out.
#[utoipa::path(
    post,
    path = "/members/lookup",
    tag = "members",
    request_body = LookupMembersRequest,
    responses((status = 200, description = "Known members", body = [MemberSummary]))
)]
pub async fn lookup_members(
    State(state): State<SharedState>,
    Valid(Json(request)): Valid<Json<LookupMembersRequest>>,
) -> Result<Json<Vec<MemberSummary>>, AppError> {
    Ok(Json(member_service::lookup(&state, request).await?))
}
