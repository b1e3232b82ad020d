//! Session lifecycle and check-in management.

use tracing::info;

use crate::{
    dto::{
        game::GameSummary,
        member::MemberSummary,
        session::{SessionSnapshot, SetSessionMembersRequest},
    },
    error::ServiceError,
    facade::model::{GameCategory, GameEntry, Member},
    services::auth_service,
    state::SharedState,
    sync::{resolve_games, resolve_session_members},
};

/// Current session status with members and games resolved against the roster.
pub fn snapshot(state: &SharedState) -> Result<SessionSnapshot, ServiceError> {
    let backend = state.backend();
    let roster = state.roster().current();
    let member_ids = backend.session_member_ids()?;

    let members = resolve_session_members(roster.as_deref(), &member_ids)
        .map(|members| members.iter().map(MemberSummary::from).collect());
    let upcoming = resolved_games(roster.as_deref(), backend.games(GameCategory::Upcoming)?);
    let playing = resolved_games(roster.as_deref(), backend.games(GameCategory::Playing)?);

    Ok(SessionSnapshot {
        open: backend.is_session_open(),
        member_ids,
        members,
        upcoming,
        playing,
    })
}

/// Open the session; opening an open session only returns its snapshot.
pub async fn open(state: &SharedState) -> Result<SessionSnapshot, ServiceError> {
    let organizer = auth_service::require_organizer(state).await?;
    let _gate = state.workflow_gate().lock().await;
    if !state.backend().is_session_open() {
        state.backend().open_session().await?;
        info!(organizer = %organizer.member.id, "session opened");
    }
    snapshot(state)
}

/// Close the session, dropping its check-ins and games.
pub async fn close(state: &SharedState) -> Result<(), ServiceError> {
    let organizer = auth_service::require_organizer(state).await?;
    let _gate = state.workflow_gate().lock().await;
    state.backend().close_session().await?;
    info!(organizer = %organizer.member.id, "session closed");
    Ok(())
}

/// Replace the checked-in list; duplicates are dropped, first occurrence wins.
pub async fn set_members(
    state: &SharedState,
    request: SetSessionMembersRequest,
) -> Result<Vec<String>, ServiceError> {
    auth_service::require_organizer(state).await?;

    let mut ids = Vec::with_capacity(request.ids.len());
    for id in request.ids {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ensure_registered(state, &ids).await?;

    let _gate = state.workflow_gate().lock().await;
    ensure_open(state)?;
    state.backend().update_session_member_ids(&ids).await?;
    Ok(ids)
}

/// Add one member to the session; checking in twice is a no-op.
pub async fn check_in(state: &SharedState, id: String) -> Result<Vec<String>, ServiceError> {
    auth_service::require_identity(state)?;
    ensure_registered(state, std::slice::from_ref(&id)).await?;

    let _gate = state.workflow_gate().lock().await;
    ensure_open(state)?;
    let mut ids = state.backend().session_member_ids()?;
    if ids.contains(&id) {
        return Ok(ids);
    }
    ids.push(id);
    state.backend().update_session_member_ids(&ids).await?;
    Ok(ids)
}

/// Remove one member from the session; unknown ids are ignored.
pub async fn check_out(state: &SharedState, id: String) -> Result<Vec<String>, ServiceError> {
    auth_service::require_identity(state)?;

    let _gate = state.workflow_gate().lock().await;
    ensure_open(state)?;
    let mut ids = state.backend().session_member_ids()?;
    let before = ids.len();
    ids.retain(|current| *current != id);
    if ids.len() != before {
        state.backend().update_session_member_ids(&ids).await?;
    }
    Ok(ids)
}

/// Fails unless the session is open. Call with the workflow gate held.
pub(crate) fn ensure_open(state: &SharedState) -> Result<(), ServiceError> {
    if state.backend().is_session_open() {
        Ok(())
    } else {
        Err(ServiceError::InvalidState("no session is open".into()))
    }
}

async fn ensure_registered(state: &SharedState, ids: &[String]) -> Result<(), ServiceError> {
    let known = state.backend().get_members_by_id(ids).await?;
    let missing: Vec<&str> = ids
        .iter()
        .filter(|id| !known.iter().any(|member| member.id == **id))
        .map(String::as_str)
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::InvalidInput(format!(
            "unknown members: {}",
            missing.join(", ")
        )))
    }
}

fn resolved_games(
    roster: Option<&[Member]>,
    games: Vec<GameEntry>,
) -> Option<Vec<GameSummary>> {
    resolve_games(roster, &games).map(|games| games.iter().map(GameSummary::from).collect())
}
