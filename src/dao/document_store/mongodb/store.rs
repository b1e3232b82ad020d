//! MongoDB implementation of the member store and the game result log.

use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Collection, Database, bson::doc};
use tracing::info;

use super::{
    connection::{MongoConfig, open_database},
    error::{MongoDaoError, MongoResult},
    models::{MongoGameResultDocument, MongoMemberDocument, doc_id},
};
use crate::dao::{
    document_store::DocumentStore,
    models::{GameResultEntity, MemberEntity},
    storage::StorageResult,
};

pub(super) const MEMBER_COLLECTION_NAME: &str = "googlers";
pub(super) const GAME_RESULT_COLLECTION_NAME: &str = "gameResult";

/// Document store persisting members and results in MongoDB.
#[derive(Clone)]
pub struct MongoDocumentStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }
}

impl MongoDocumentStore {
    /// Connect to the configured database; fails once the startup retries run out.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let database = open_database(&config).await?;
        info!(database = %config.database_name(), "using MongoDB document store");
        Ok(Self {
            inner: Arc::new(MongoInner { database }),
        })
    }

    fn members(&self) -> Collection<MongoMemberDocument> {
        self.inner
            .database
            .collection::<MongoMemberDocument>(MEMBER_COLLECTION_NAME)
    }

    fn game_results(&self) -> Collection<MongoGameResultDocument> {
        self.inner
            .database
            .collection::<MongoGameResultDocument>(GAME_RESULT_COLLECTION_NAME)
    }

    async fn upsert_member(&self, member: MemberEntity) -> MongoResult<()> {
        let id = member.id.clone();
        let document: MongoMemberDocument = member.into();
        self.members()
            .replace_one(doc_id(&id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveMember { id, source })?;
        Ok(())
    }

    async fn find_member(&self, id: String) -> MongoResult<Option<MemberEntity>> {
        let document = self
            .members()
            .find_one(doc_id(&id))
            .await
            .map_err(|source| MongoDaoError::LoadMember { id, source })?;
        Ok(document.map(Into::into))
    }

    async fn find_members_matching(
        &self,
        filter: mongodb::bson::Document,
    ) -> MongoResult<Vec<MemberEntity>> {
        let documents: Vec<MongoMemberDocument> = self
            .members()
            .find(filter)
            .sort(doc! {"_id": 1})
            .await
            .map_err(|source| MongoDaoError::ListMembers { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListMembers { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn append_game_result(&self, result: GameResultEntity) -> MongoResult<String> {
        let document: MongoGameResultDocument = result.into();
        self.game_results()
            .insert_one(&document)
            .await
            .map_err(|source| MongoDaoError::SaveGameResult { source })?;
        Ok(document.id.to_hex())
    }

    async fn list_game_results(&self) -> MongoResult<Vec<GameResultEntity>> {
        let documents: Vec<MongoGameResultDocument> = self
            .game_results()
            .find(doc! {})
            .sort(doc! {"_id": 1})
            .await
            .map_err(|source| MongoDaoError::ListGameResults { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListGameResults { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }
}

impl DocumentStore for MongoDocumentStore {
    fn upsert_member(&self, member: MemberEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.upsert_member(member).await.map_err(Into::into) })
    }

    fn find_member(&self, id: String) -> BoxFuture<'static, StorageResult<Option<MemberEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_member(id).await.map_err(Into::into) })
    }

    fn list_members(&self) -> BoxFuture<'static, StorageResult<Vec<MemberEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_members_matching(doc! {})
                .await
                .map_err(Into::into)
        })
    }

    fn find_members(
        &self,
        ids: Vec<String>,
    ) -> BoxFuture<'static, StorageResult<Vec<MemberEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            store
                .find_members_matching(doc! {"_id": {"$in": ids}})
                .await
                .map_err(Into::into)
        })
    }

    fn append_game_result(
        &self,
        result: GameResultEntity,
    ) -> BoxFuture<'static, StorageResult<String>> {
        let store = self.clone();
        Box::pin(async move { store.append_game_result(result).await.map_err(Into::into) })
    }

    fn list_game_results(&self) -> BoxFuture<'static, StorageResult<Vec<GameResultEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_game_results().await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }
}
