use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::{
    game::GameSummary, member::MemberSummary, validation::validate_member_ids,
};

/// Point-in-time view of the running session.
///
/// Resolved lists are `null` while the roster is still loading or a game
/// references a member the roster does not know yet.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionSnapshot {
    pub open: bool,
    /// Checked-in ids in check-in order, as stored.
    pub member_ids: Vec<String>,
    /// Checked-in members in roster order.
    pub members: Option<Vec<MemberSummary>>,
    pub upcoming: Option<Vec<GameSummary>>,
    pub playing: Option<Vec<GameSummary>>,
}

/// Full replacement of the checked-in member list.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SetSessionMembersRequest {
    /// Member ids in check-in order; duplicates are dropped.
    #[validate(custom(function = "validate_member_ids"))]
    pub ids: Vec<String>,
}
