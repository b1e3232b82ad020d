//! Domain shapes handed out by the backend façade.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dao::{
    identity::Identity,
    models::{GameEntryEntity, GameResultEntity, MemberEntity, RoleEntity},
    realtime::{DbRef, Location},
};

/// Permission level of a member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Member,
    Organizer,
}

/// Registered meetup participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Identity uid the record was registered under.
    pub id: String,
    pub name: String,
    /// Rating used to balance teams; starts at 1000.
    pub elo: i32,
    pub role: Role,
}

impl Member {
    /// Organizers open and close sessions and build games.
    pub fn is_organizer(&self) -> bool {
        self.role == Role::Organizer
    }
}

/// Signed-in user: the member record joined with its identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Googler {
    pub identity: Identity,
    pub member: Member,
}

/// Outcome of a finished game as kept in the result log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    /// Member ids of the winning team.
    pub win: Vec<String>,
    /// Member ids of the losing team.
    pub lose: Vec<String>,
}

impl From<GameResultEntity> for GameResult {
    fn from(value: GameResultEntity) -> Self {
        Self {
            win: value.win,
            lose: value.lose,
        }
    }
}

/// Realtime collection a game lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameCategory {
    Upcoming,
    Playing,
}

impl GameCategory {
    /// Realtime location holding the collection.
    pub fn location(self) -> Location {
        match self {
            GameCategory::Upcoming => Location::Upcoming,
            GameCategory::Playing => Location::Playing,
        }
    }
}

impl fmt::Display for GameCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.location().as_str())
    }
}

/// Back-reference to a stored game, used to update or remove it later.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GameRef {
    pub category: GameCategory,
    /// Push key of the entry inside its collection.
    pub key: String,
}

impl GameRef {
    pub(crate) fn db_ref(&self) -> DbRef {
        DbRef::child(self.category.location(), self.key.clone())
    }
}

impl fmt::Display for GameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.key)
    }
}

/// Two teams of players plus the location of the stored entry.
///
/// `P` is a member id on the wire and a [`Member`] once resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game<P> {
    pub team1: Vec<P>,
    pub team2: Vec<P>,
    /// Where the entry is stored.
    pub reference: GameRef,
}

/// Game as delivered by the realtime store.
pub type GameEntry = Game<String>;
/// Game with every member id resolved against the roster.
pub type ResolvedGame = Game<Member>;

impl GameEntry {
    pub(crate) fn from_entity(reference: GameRef, entity: GameEntryEntity) -> Self {
        Self {
            team1: entity.team1,
            team2: entity.team2,
            reference,
        }
    }
}

impl From<RoleEntity> for Role {
    fn from(value: RoleEntity) -> Self {
        match value {
            RoleEntity::Member => Role::Member,
            RoleEntity::Organizer => Role::Organizer,
        }
    }
}

impl From<MemberEntity> for Member {
    fn from(value: MemberEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            elo: value.elo,
            role: value.role.into(),
        }
    }
}
