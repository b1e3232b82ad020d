//! Failures of the MongoDB document store, one variant per operation.

use mongodb::error::Error as MongoError;
use thiserror::Error;

/// Result alias for MongoDB store operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// MongoDB failure annotated with the member or log operation that hit it.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB database `{database}` unreachable after {attempts} attempt(s)")]
    Unreachable {
        database: String,
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to save member `{id}`")]
    SaveMember {
        id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to load member `{id}`")]
    LoadMember {
        id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to list members")]
    ListMembers {
        #[source]
        source: MongoError,
    },
    #[error("failed to append game result")]
    SaveGameResult {
        #[source]
        source: MongoError,
    },
    #[error("failed to list game results")]
    ListGameResults {
        #[source]
        source: MongoError,
    },
}
