//! Process-local document store.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use futures::future::{self, BoxFuture};
use uuid::Uuid;

use crate::dao::{
    document_store::DocumentStore,
    models::{GameResultEntity, MemberEntity},
    storage::StorageResult,
};

/// Process-local document store used for development and tests.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    members: DashMap<String, MemberEntity>,
    results: Mutex<Vec<(String, GameResultEntity)>>,
}

impl MemoryDocumentStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_members(&self, filter: impl Fn(&MemberEntity) -> bool) -> Vec<MemberEntity> {
        let mut members: Vec<MemberEntity> = self
            .inner
            .members
            .iter()
            .filter(|entry| filter(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        members.sort_by(|a, b| a.id.cmp(&b.id));
        members
    }

    fn results(&self) -> std::sync::MutexGuard<'_, Vec<(String, GameResultEntity)>> {
        // A poisoned log is still a valid append-only vector.
        self.inner
            .results
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn upsert_member(&self, member: MemberEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.inner.members.insert(member.id.clone(), member);
            Ok(())
        })
    }

    fn find_member(&self, id: String) -> BoxFuture<'static, StorageResult<Option<MemberEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.inner.members.get(&id).map(|entry| entry.value().clone())) })
    }

    fn list_members(&self) -> BoxFuture<'static, StorageResult<Vec<MemberEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.sorted_members(|_| true)) })
    }

    fn find_members(
        &self,
        ids: Vec<String>,
    ) -> BoxFuture<'static, StorageResult<Vec<MemberEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.sorted_members(|member| ids.contains(&member.id))) })
    }

    fn append_game_result(
        &self,
        result: GameResultEntity,
    ) -> BoxFuture<'static, StorageResult<String>> {
        let store = self.clone();
        Box::pin(async move {
            let id = Uuid::new_v4().simple().to_string();
            store.results().push((id.clone(), result));
            Ok(id)
        })
    }

    fn list_game_results(&self) -> BoxFuture<'static, StorageResult<Vec<GameResultEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .results()
                .iter()
                .map(|(_, result)| result.clone())
                .collect())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(future::ready(Ok(())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str) -> MemberEntity {
        MemberEntity::registered(id.into(), id.to_uppercase())
    }

    #[tokio::test]
    async fn upsert_overwrites_existing_member() {
        let store = MemoryDocumentStore::new();
        store.upsert_member(member("a")).await.unwrap();

        let mut promoted = member("a");
        promoted.elo = 1200;
        store.upsert_member(promoted.clone()).await.unwrap();

        assert_eq!(store.find_member("a".into()).await.unwrap(), Some(promoted));
        assert_eq!(store.list_members().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn find_members_skips_unknown_ids() {
        let store = MemoryDocumentStore::new();
        for id in ["c", "a", "b"] {
            store.upsert_member(member(id)).await.unwrap();
        }

        let found = store
            .find_members(vec!["c".into(), "zz".into(), "a".into()])
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[tokio::test]
    async fn results_are_appended_in_order() {
        let store = MemoryDocumentStore::new();
        let first = GameResultEntity {
            win: vec!["a".into()],
            lose: vec!["b".into()],
        };
        let second = GameResultEntity {
            win: vec!["b".into()],
            lose: vec!["a".into()],
        };
        let id1 = store.append_game_result(first.clone()).await.unwrap();
        let id2 = store.append_game_result(second.clone()).await.unwrap();

        assert_ne!(id1, id2);
        assert_eq!(store.list_game_results().await.unwrap(), vec![first, second]);
    }
}
