//! Stored shapes shared by the document stores and the realtime database.

use serde::{Deserialize, Serialize};

/// Rating every member starts with on registration.
pub const DEFAULT_ELO: i32 = 1000;

/// Permission level of a member inside the meetup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleEntity {
    #[default]
    Member,
    Organizer,
}

/// Member record as stored in the `googlers` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemberEntity {
    /// Document key; equal to the identity provider uid.
    pub id: String,
    pub name: String,
    pub elo: i32,
    /// Missing in records written before roles existed.
    #[serde(default)]
    pub role: RoleEntity,
}

impl MemberEntity {
    /// Fresh registration with the default rating and role.
    pub fn registered(id: String, name: String) -> Self {
        Self {
            id,
            name,
            elo: DEFAULT_ELO,
            role: RoleEntity::default(),
        }
    }
}

/// Append-only record stored in the `gameResult` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameResultEntity {
    /// Member ids of the winning team.
    pub win: Vec<String>,
    /// Member ids of the losing team.
    pub lose: Vec<String>,
}

/// Game entry as stored under the `upcoming` and `playing` realtime locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntryEntity {
    // The realtime store drops empty arrays.
    #[serde(default)]
    pub team1: Vec<String>,
    #[serde(default)]
    pub team2: Vec<String>,
}
