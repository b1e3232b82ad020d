//! Game workflows: build teams from a selection, promote, finish and cancel games.

use tracing::{error, info, warn};

use crate::{
    dao::models::GameEntryEntity,
    dto::{
        game::{
            CreateGameRequest, FinishGameRequest, GameRefResponse, GameResultResponse, TeamSide,
        },
        sse::GameFinishedEvent,
    },
    error::ServiceError,
    facade::model::{GameCategory, GameEntry, GameRef, Member},
    services::{auth_service, session_service, teams::partition_teams},
    state::SharedState,
};

/// Largest selection the team builder accepts.
const MAX_SELECTION: usize = 4;

/// Split the selected checked-in members into two teams and store the game.
pub async fn create(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameRefResponse, ServiceError> {
    auth_service::require_organizer(state).await?;
    let _gate = state.workflow_gate().lock().await;
    session_service::ensure_open(state)?;
    let selected = selection(state, &request.member_ids).await?;
    let teams = partition_teams(&selected)?;

    let team1 = member_ids(&teams.team_a);
    let team2 = member_ids(&teams.team_b);
    let backend = state.backend();
    let reference = match GameCategory::from(request.category) {
        GameCategory::Upcoming => backend.add_upcoming_game(team1, team2).await?,
        GameCategory::Playing => backend.add_playing_game(team1, team2).await?,
    };
    info!(game = %reference, "game created");
    Ok(reference.into())
}

/// Move an upcoming game to the playing collection.
///
/// The upcoming entry is removed first and put back if the playing entry cannot
/// be written, so a game never sits in both collections.
pub async fn start(
    state: &SharedState,
    category: GameCategory,
    key: String,
) -> Result<GameRefResponse, ServiceError> {
    auth_service::require_identity(state)?;
    expect_category(category, GameCategory::Upcoming, "started")?;
    let _gate = state.workflow_gate().lock().await;
    let upcoming = existing_game(state, GameRef { category, key })?;

    let backend = state.backend();
    backend.delete(&upcoming.reference).await?;
    let playing = match backend
        .add_playing_game(upcoming.team1.clone(), upcoming.team2.clone())
        .await
    {
        Ok(playing) => playing,
        Err(err) => {
            restore(state, &upcoming).await;
            return Err(err.into());
        }
    };
    info!(from = %upcoming.reference, to = %playing, "game started");
    Ok(playing.into())
}

/// Remove a playing game and record its result.
///
/// The game is removed before the result is appended, and restored if the
/// append fails, so a retry can never log the same game twice.
pub async fn finish(
    state: &SharedState,
    category: GameCategory,
    key: String,
    request: FinishGameRequest,
) -> Result<GameResultResponse, ServiceError> {
    auth_service::require_identity(state)?;
    expect_category(category, GameCategory::Playing, "finished")?;
    let _gate = state.workflow_gate().lock().await;
    let game = existing_game(state, GameRef { category, key })?;

    let (win, lose) = match request.winner {
        TeamSide::Team1 => (game.team1.clone(), game.team2.clone()),
        TeamSide::Team2 => (game.team2.clone(), game.team1.clone()),
    };
    let backend = state.backend();
    backend.delete(&game.reference).await?;
    if let Err(err) = backend.add_game_result(win.clone(), lose.clone()).await {
        restore(state, &game).await;
        return Err(err.into());
    }
    info!(game = %game.reference, "game finished");

    state.notices().game_finished(&GameFinishedEvent {
        key: game.reference.key,
        win: win.clone(),
        lose: lose.clone(),
    });

    Ok(GameResultResponse { win, lose })
}

/// Drop a game without recording a result.
pub async fn cancel(
    state: &SharedState,
    category: GameCategory,
    key: String,
) -> Result<(), ServiceError> {
    auth_service::require_identity(state)?;
    let _gate = state.workflow_gate().lock().await;
    let game = existing_game(state, GameRef { category, key })?;
    state.backend().delete(&game.reference).await?;
    info!(game = %game.reference, "game cancelled");
    Ok(())
}

/// Every recorded result, oldest first.
pub async fn results(state: &SharedState) -> Result<Vec<GameResultResponse>, ServiceError> {
    let results = state.backend().game_results().await?;
    Ok(results.into_iter().map(Into::into).collect())
}

/// Resolve a selection to member records, in selection order.
///
/// Every id must be distinct, registered and checked into the session.
async fn selection(state: &SharedState, ids: &[String]) -> Result<Vec<Member>, ServiceError> {
    if ids.len() > MAX_SELECTION {
        return Err(ServiceError::InvalidInput(format!(
            "at most {MAX_SELECTION} members can be selected"
        )));
    }
    if ids.len() < 2 || ids.len() % 2 == 1 {
        return Err(ServiceError::InvalidInput(
            "select an even number of members, at least two".into(),
        ));
    }
    for (index, id) in ids.iter().enumerate() {
        if ids[..index].contains(id) {
            return Err(ServiceError::InvalidInput(format!(
                "member `{id}` selected twice"
            )));
        }
    }

    let checked_in = state.backend().session_member_ids()?;
    if let Some(absent) = ids.iter().find(|id| !checked_in.contains(id)) {
        return Err(ServiceError::InvalidInput(format!(
            "member `{absent}` is not checked in"
        )));
    }

    let mut members = state.backend().get_members_by_id(ids).await?;
    ids.iter()
        .map(|id| {
            members
                .iter()
                .position(|member| member.id == *id)
                .map(|index| members.swap_remove(index))
                .ok_or_else(|| ServiceError::NotFound(format!("member `{id}`")))
        })
        .collect()
}

/// Write a removed game back under its old key after a failed follow-up write.
async fn restore(state: &SharedState, game: &GameEntry) {
    let entity = GameEntryEntity {
        team1: game.team1.clone(),
        team2: game.team2.clone(),
    };
    match state.backend().update(&game.reference, &entity).await {
        Ok(()) => warn!(game = %game.reference, "game restored after a failed move"),
        Err(err) => error!(game = %game.reference, error = %err, "failed to restore game"),
    }
}

fn existing_game(state: &SharedState, reference: GameRef) -> Result<GameEntry, ServiceError> {
    state
        .backend()
        .find_game(&reference)?
        .ok_or_else(|| ServiceError::NotFound(format!("game `{reference}`")))
}

fn expect_category(
    actual: GameCategory,
    expected: GameCategory,
    action: &str,
) -> Result<(), ServiceError> {
    if actual == expected {
        Ok(())
    } else {
        Err(ServiceError::InvalidState(format!(
            "only {expected} games can be {action}"
        )))
    }
}

fn member_ids(team: &[Member]) -> Vec<String> {
    team.iter().map(|member| member.id.clone()).collect()
}
