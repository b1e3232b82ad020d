use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use axum_valid::Valid;

use crate::{
    dto::game::{
        CreateGameRequest, FinishGameRequest, GameCategoryDto, GameRefResponse,
        GameResultResponse,
    },
    error::AppError,
    services::game_service,
    state::SharedState,
};

/// Team building and game lifecycle endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", post(create_game))
        .route("/results", get(list_results))
        .route("/games/{category}/{key}", delete(cancel_game))
        .route("/games/{category}/{key}/start", post(start_game))
        .route("/games/{category}/{key}/finish", post(finish_game))
}

/// Split a selection of checked-in members into two teams. Organizers only.
#[utoipa::path(
    post,
    path = "/games",
    tag = "games",
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game stored", body = GameRefResponse),
        (status = 400, description = "Selection rejected"),
        (status = 401, description = "Not an organizer")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Valid(Json(request)): Valid<Json<CreateGameRequest>>,
) -> Result<(StatusCode, Json<GameRefResponse>), AppError> {
    let reference = game_service::create(&state, request).await?;
    Ok((StatusCode::CREATED, Json(reference)))
}

/// The result log, oldest first.
#[utoipa::path(
    get,
    path = "/results",
    tag = "games",
    responses((status = 200, description = "Recorded results, oldest first", body = [GameResultResponse]))
)]
pub async fn list_results(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GameResultResponse>>, AppError> {
    Ok(Json(game_service::results(&state).await?))
}

/// Promote an upcoming game to the playing collection.
#[utoipa::path(
    post,
    path = "/games/{category}/{key}/start",
    tag = "games",
    params(
        ("category" = GameCategoryDto, Path, description = "Must be `upcoming`"),
        ("key" = String, Path, description = "Realtime key of the game")
    ),
    responses(
        (status = 200, description = "Game now playing", body = GameRefResponse),
        (status = 404, description = "No such game"),
        (status = 409, description = "Game is not upcoming")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Path((category, key)): Path<(GameCategoryDto, String)>,
) -> Result<Json<GameRefResponse>, AppError> {
    Ok(Json(
        game_service::start(&state, category.into(), key).await?,
    ))
}

/// Record the result of a playing game and remove it.
#[utoipa::path(
    post,
    path = "/games/{category}/{key}/finish",
    tag = "games",
    params(
        ("category" = GameCategoryDto, Path, description = "Must be `playing`"),
        ("key" = String, Path, description = "Realtime key of the game")
    ),
    request_body = FinishGameRequest,
    responses(
        (status = 200, description = "Result recorded", body = GameResultResponse),
        (status = 404, description = "No such game"),
        (status = 409, description = "Game is not playing")
    )
)]
pub async fn finish_game(
    State(state): State<SharedState>,
    Path((category, key)): Path<(GameCategoryDto, String)>,
    Json(request): Json<FinishGameRequest>,
) -> Result<Json<GameResultResponse>, AppError> {
    Ok(Json(
        game_service::finish(&state, category.into(), key, request).await?,
    ))
}

/// Drop a game without recording a result.
#[utoipa::path(
    delete,
    path = "/games/{category}/{key}",
    tag = "games",
    params(
        ("category" = GameCategoryDto, Path, description = "Collection holding the game"),
        ("key" = String, Path, description = "Realtime key of the game")
    ),
    responses(
        (status = 204, description = "Game removed"),
        (status = 404, description = "No such game")
    )
)]
pub async fn cancel_game(
    State(state): State<SharedState>,
    Path((category, key)): Path<(GameCategoryDto, String)>,
) -> Result<StatusCode, AppError> {
    game_service::cancel(&state, category.into(), key).await?;
    Ok(StatusCode::NO_CONTENT)
}
