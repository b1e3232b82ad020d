//! Connection bootstrap for the member and result-log collections.

use std::time::Duration;

use mongodb::{Client, Database, bson::doc, options::ClientOptions};
use tokio::time::sleep;
use tracing::{info, warn};

use super::{
    error::{MongoDaoError, MongoResult},
    store::{GAME_RESULT_COLLECTION_NAME, MEMBER_COLLECTION_NAME},
};

/// Database used when `MONGO_DB` is not set.
const DEFAULT_DB: &str = "meetup_session";
/// Ping attempts before startup gives up on the document store.
const CONNECT_ATTEMPTS: u32 = 10;
const FIRST_RETRY_DELAY: Duration = Duration::from_millis(250);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Where the member records and the game result log live.
#[derive(Clone)]
pub struct MongoConfig {
    options: ClientOptions,
    database_name: String,
}

impl MongoConfig {
    /// Parse a connection string; `db_name` defaults to [`DEFAULT_DB`].
    pub async fn from_uri(uri: &str, db_name: Option<&str>) -> MongoResult<Self> {
        let options = ClientOptions::parse(uri)
            .await
            .map_err(|source| MongoDaoError::InvalidUri {
                uri: uri.to_owned(),
                source,
            })?;

        Ok(Self {
            options,
            database_name: db_name.unwrap_or(DEFAULT_DB).to_owned(),
        })
    }

    /// Name of the database holding both collections.
    pub fn database_name(&self) -> &str {
        &self.database_name
    }
}

/// Open the session database, waiting for the server to answer a ping.
///
/// Startup cannot serve sign-ins without member records, so the ping is retried
/// with doubling delays before giving up.
pub(super) async fn open_database(config: &MongoConfig) -> MongoResult<Database> {
    let client = Client::with_options(config.options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(&config.database_name);

    let mut delay = FIRST_RETRY_DELAY;
    let mut attempt = 1;
    loop {
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => break,
            Err(source) if attempt >= CONNECT_ATTEMPTS => {
                return Err(MongoDaoError::Unreachable {
                    database: config.database_name.clone(),
                    attempts: attempt,
                    source,
                });
            }
            Err(err) => {
                warn!(
                    database = %config.database_name,
                    attempt,
                    retry_in_ms = delay.as_millis() as u64,
                    error = %err,
                    "document store not reachable yet"
                );
                sleep(delay).await;
                delay = (delay * 2).min(MAX_RETRY_DELAY);
                attempt += 1;
            }
        }
    }

    log_collection_sizes(&database).await;
    Ok(database)
}

/// Report how many members and results the store already holds.
async fn log_collection_sizes(database: &Database) {
    let members = database
        .collection::<mongodb::bson::Document>(MEMBER_COLLECTION_NAME)
        .estimated_document_count()
        .await;
    let results = database
        .collection::<mongodb::bson::Document>(GAME_RESULT_COLLECTION_NAME)
        .estimated_document_count()
        .await;
    match (members, results) {
        (Ok(members), Ok(results)) => info!(
            database = %database.name(),
            members,
            results,
            "document store reachable"
        ),
        (members, results) => warn!(
            database = %database.name(),
            members_ok = members.is_ok(),
            results_ok = results.is_ok(),
            "document store reachable but collection sizes unknown"
        ),
    }
}
