use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::identity::Identity,
    dto::member::MemberSummary,
    facade::model::Googler,
};

/// Sign-in payload; the hint names the account picked in the account chooser.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct SignInRequest {
    /// Uid or email of the chosen account; may be omitted when only one account exists.
    #[serde(default)]
    #[validate(length(min = 1, max = 254))]
    pub login_hint: Option<String>,
}

/// Authenticated principal as returned by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct IdentityResponse {
    /// Account id, also used as the member id.
    pub uid: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl From<Identity> for IdentityResponse {
    fn from(value: Identity) -> Self {
        Self {
            uid: value.uid,
            display_name: value.display_name,
            email: value.email,
        }
    }
}

/// Signed-in user joined with its member record.
#[derive(Debug, Serialize, ToSchema)]
pub struct GooglerResponse {
    pub identity: IdentityResponse,
    pub member: MemberSummary,
}

impl From<Googler> for GooglerResponse {
    fn from(value: Googler) -> Self {
        Self {
            identity: value.identity.into(),
            member: value.member.into(),
        }
    }
}

/// Result of a sign-out request.
#[derive(Debug, Serialize, ToSchema)]
pub struct SignOutResponse {
    /// `false` when nobody was signed in.
    pub signed_out: bool,
}
