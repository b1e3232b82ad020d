//! Sign-in state of the single process-wide session and role checks.

use tracing::debug;

use crate::{
    dao::identity::Identity,
    dto::auth::{GooglerResponse, IdentityResponse, SignInRequest, SignOutResponse},
    error::ServiceError,
    facade::{BackendError, model::Googler},
    state::SharedState,
};

/// Run the sign-in flow unless somebody is already signed in.
pub async fn sign_in(
    state: &SharedState,
    request: SignInRequest,
) -> Result<IdentityResponse, ServiceError> {
    let identity = state.backend().sign_in(request.login_hint).await?;
    Ok(identity.into())
}

/// Sign out; reports whether anybody was signed in.
pub fn sign_out(state: &SharedState) -> SignOutResponse {
    SignOutResponse {
        signed_out: state.backend().sign_out(),
    }
}

/// Signed-in user joined with its member record.
pub async fn current_googler(state: &SharedState) -> Result<GooglerResponse, ServiceError> {
    Ok(require_googler(state).await?.into())
}

/// Identity of the signed-in user or an unauthorized error.
pub fn require_identity(state: &SharedState) -> Result<Identity, ServiceError> {
    state
        .backend()
        .current_identity()
        .ok_or_else(|| ServiceError::Unauthorized("sign in first".into()))
}

/// Signed-in user that is also a registered member.
pub async fn require_googler(state: &SharedState) -> Result<Googler, ServiceError> {
    let identity = require_identity(state)?;
    match state.backend().get_googler(&identity).await {
        Ok(googler) => Ok(googler),
        Err(BackendError::NotFound(uid)) => Err(ServiceError::Unauthorized(format!(
            "`{uid}` is signed in but not registered"
        ))),
        Err(err) => Err(err.into()),
    }
}

/// Signed-in member holding the organizer role.
pub async fn require_organizer(state: &SharedState) -> Result<Googler, ServiceError> {
    let googler = require_googler(state).await?;
    if !googler.member.is_organizer() {
        debug!(member_id = %googler.member.id, "organizer action refused");
        return Err(ServiceError::Unauthorized(
            "only organizers may do this".into(),
        ));
    }
    Ok(googler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fixtures::roster_state;

    #[tokio::test]
    async fn googler_requires_sign_in() {
        let state = roster_state().await;
        let err = current_googler(&state).await.unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn sign_in_resolves_member_record() {
        let state = roster_state().await;
        let identity = sign_in(
            &state,
            SignInRequest {
                login_hint: Some("org".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(identity.uid, "org");

        let googler = current_googler(&state).await.unwrap();
        assert_eq!(googler.member.elo, 1100);
        assert!(require_organizer(&state).await.is_ok());

        assert!(sign_out(&state).signed_out);
        assert!(!sign_out(&state).signed_out);
    }

    #[tokio::test]
    async fn unknown_account_surfaces_auth_failure() {
        let state = roster_state().await;
        let err = sign_in(
            &state,
            SignInRequest {
                login_hint: Some("nobody".into()),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::AuthFailed(_)));
    }
}
