use mongodb::bson::{Document, doc, oid::ObjectId};
use serde::{Deserialize, Serialize};

use crate::dao::models::{GameResultEntity, MemberEntity, RoleEntity};

/// Member document keyed by the identity provider uid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMemberDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    elo: i32,
    #[serde(default)]
    role: RoleEntity,
}

impl From<MemberEntity> for MongoMemberDocument {
    fn from(value: MemberEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            elo: value.elo,
            role: value.role,
        }
    }
}

impl From<MongoMemberDocument> for MemberEntity {
    fn from(value: MongoMemberDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            elo: value.elo,
            role: value.role,
        }
    }
}

/// Result document; the generated object id keeps the log in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameResultDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    win: Vec<String>,
    lose: Vec<String>,
}

impl From<GameResultEntity> for MongoGameResultDocument {
    fn from(value: GameResultEntity) -> Self {
        Self {
            id: ObjectId::new(),
            win: value.win,
            lose: value.lose,
        }
    }
}

impl From<MongoGameResultDocument> for GameResultEntity {
    fn from(value: MongoGameResultDocument) -> Self {
        Self {
            win: value.win,
            lose: value.lose,
        }
    }
}

pub fn doc_id(id: &str) -> Document {
    doc! {"_id": id}
}
