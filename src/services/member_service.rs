//! Member registration and roster lookups.

use tracing::{info, warn};

use crate::{
    dto::member::{LookupMembersRequest, MemberSummary, RegisterMemberRequest},
    error::ServiceError,
    services::auth_service,
    state::SharedState,
};

/// Create or overwrite a member, then reload the shared roster.
///
/// Signed-in users register themselves; only organizers may register someone else.
pub async fn register(
    state: &SharedState,
    request: RegisterMemberRequest,
) -> Result<MemberSummary, ServiceError> {
    let identity = auth_service::require_identity(state)?;
    if identity.uid != request.id {
        auth_service::require_organizer(state).await?;
    }

    let member = state
        .backend()
        .register(&request.id, &request.name)
        .await?;
    info!(member_id = %member.id, "registration stored");

    // The record is stored; a stale roster only delays the live views.
    if let Err(err) = state.roster().refresh(state.backend()).await {
        warn!(error = %err, "roster not refreshed after registration");
    }

    Ok(member.into())
}

/// Every registered member, ordered by id.
pub async fn list(state: &SharedState) -> Result<Vec<MemberSummary>, ServiceError> {
    let members = state.backend().get_all_members().await?;
    Ok(members.into_iter().map(Into::into).collect())
}

/// One member by id.
pub async fn get(state: &SharedState, id: String) -> Result<MemberSummary, ServiceError> {
    state
        .backend()
        .get_members_by_id(std::slice::from_ref(&id))
        .await?
        .into_iter()
        .next()
        .map(Into::into)
        .ok_or_else(|| ServiceError::NotFound(format!("member `{id}`")))
}

/// Members among the requested ids; unknown ids are left out.
pub async fn lookup(
    state: &SharedState,
    request: LookupMembersRequest,
) -> Result<Vec<MemberSummary>, ServiceError> {
    let members = state.backend().get_members_by_id(&request.ids).await?;
    Ok(members.into_iter().map(Into::into).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::{organizer_state, roster_state};

    fn request(id: &str, name: &str) -> RegisterMemberRequest {
        RegisterMemberRequest {
            id: id.into(),
            name: name.into(),
        }
    }

    #[tokio::test]
    async fn anonymous_registration_is_refused_and_keeps_the_record() {
        let state = roster_state().await;
        let err = register(&state, request("org", "Mallory")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        let organizer = get(&state, "org".into()).await.unwrap();
        assert_eq!(organizer.name, "Olga");
        assert_eq!(organizer.elo, 1100);
    }

    #[tokio::test]
    async fn members_register_only_themselves() {
        let state = roster_state().await;
        state.backend().sign_in(Some("a".into())).await.unwrap();

        let err = register(&state, request("org", "Mallory")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));

        let own = register(&state, request("a", "Ann Again")).await.unwrap();
        assert_eq!(own.name, "Ann Again");
        assert_eq!(own.elo, 1000);
    }

    #[tokio::test]
    async fn organizers_register_newcomers_into_the_roster() {
        let state = organizer_state().await;
        register(&state, request("d", "Dee")).await.unwrap();

        let roster = state.roster().current().unwrap();
        assert!(roster.iter().any(|member| member.id == "d"));
    }
}
