use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dto::{member::MemberSummary, validation::validate_member_ids},
    facade::model::{GameCategory, GameRef, GameResult, ResolvedGame},
};

/// Realtime collection a game belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GameCategoryDto {
    #[default]
    Upcoming,
    Playing,
}

impl From<GameCategoryDto> for GameCategory {
    fn from(value: GameCategoryDto) -> Self {
        match value {
            GameCategoryDto::Upcoming => GameCategory::Upcoming,
            GameCategoryDto::Playing => GameCategory::Playing,
        }
    }
}

impl From<GameCategory> for GameCategoryDto {
    fn from(value: GameCategory) -> Self {
        match value {
            GameCategory::Upcoming => GameCategoryDto::Upcoming,
            GameCategory::Playing => GameCategoryDto::Playing,
        }
    }
}

/// Selection of checked-in members to split into two teams.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateGameRequest {
    /// Two or four distinct checked-in member ids.
    #[validate(length(min = 2, max = 4), custom(function = "validate_member_ids"))]
    pub member_ids: Vec<String>,
    /// Defaults to `upcoming`.
    #[serde(default)]
    pub category: GameCategoryDto,
}

/// Winning side of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Team1,
    Team2,
}

/// Payload closing a playing game.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FinishGameRequest {
    pub winner: TeamSide,
}

/// Location of a stored game.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameRefResponse {
    pub category: GameCategoryDto,
    /// Push key used in `/games/{category}/{key}` routes.
    pub key: String,
}

impl From<GameRef> for GameRefResponse {
    fn from(value: GameRef) -> Self {
        Self {
            category: value.category.into(),
            key: value.key,
        }
    }
}

/// Game with its teams resolved to member records.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameSummary {
    pub category: GameCategoryDto,
    pub key: String,
    /// Higher-rated side.
    pub team1: Vec<MemberSummary>,
    pub team2: Vec<MemberSummary>,
}

impl From<&ResolvedGame> for GameSummary {
    fn from(value: &ResolvedGame) -> Self {
        Self {
            category: value.reference.category.into(),
            key: value.reference.key.clone(),
            team1: value.team1.iter().map(MemberSummary::from).collect(),
            team2: value.team2.iter().map(MemberSummary::from).collect(),
        }
    }
}

/// Entry of the append-only result log.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameResultResponse {
    /// Member ids of the winning team.
    pub win: Vec<String>,
    /// Member ids of the losing team.
    pub lose: Vec<String>,
}

impl From<GameResult> for GameResultResponse {
    fn from(value: GameResult) -> Self {
        Self {
            win: value.win,
            lose: value.lose,
        }
    }
}
