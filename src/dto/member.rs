use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::validation::{validate_member_id, validate_member_ids},
    facade::model::{Member, Role},
};

/// Permission level exposed over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoleDto {
    Member,
    Organizer,
}

impl From<Role> for RoleDto {
    fn from(value: Role) -> Self {
        match value {
            Role::Member => RoleDto::Member,
            Role::Organizer => RoleDto::Organizer,
        }
    }
}

/// Public projection of a registered member.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberSummary {
    pub id: String,
    pub name: String,
    /// Current rating.
    pub elo: i32,
    pub role: RoleDto,
}

impl From<&Member> for MemberSummary {
    fn from(value: &Member) -> Self {
        Self {
            id: value.id.clone(),
            name: value.name.clone(),
            elo: value.elo,
            role: value.role.into(),
        }
    }
}

impl From<Member> for MemberSummary {
    fn from(value: Member) -> Self {
        Self::from(&value)
    }
}

/// Registration payload; an existing id is overwritten.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RegisterMemberRequest {
    /// Identity uid of the member; must match the signed-in user unless an organizer registers.
    #[validate(custom(function = "validate_member_id"))]
    pub id: String,
    /// Display name, 1 to 80 characters.
    #[validate(length(min = 1, max = 80))]
    pub name: String,
}

/// Batch lookup of members by id.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LookupMembersRequest {
    /// Unknown ids are left out of the answer.
    #[validate(custom(function = "validate_member_ids"))]
    pub ids: Vec<String>,
}
