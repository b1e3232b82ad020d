//! Document store seam: member records and the game result log.

pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{GameResultEntity, MemberEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;

/// Abstraction over the document store holding members and the game result log.
pub trait DocumentStore: Send + Sync {
    /// Replace the member stored under `member.id`, creating it when absent.
    fn upsert_member(&self, member: MemberEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// The member stored under `id`, if any.
    fn find_member(&self, id: String) -> BoxFuture<'static, StorageResult<Option<MemberEntity>>>;
    /// Every member, ordered by document id.
    fn list_members(&self) -> BoxFuture<'static, StorageResult<Vec<MemberEntity>>>;
    /// Members whose id is listed in `ids`; unknown ids are skipped.
    fn find_members(
        &self,
        ids: Vec<String>,
    ) -> BoxFuture<'static, StorageResult<Vec<MemberEntity>>>;
    /// Append a result and return the generated document id.
    fn append_game_result(
        &self,
        result: GameResultEntity,
    ) -> BoxFuture<'static, StorageResult<String>>;
    /// Every recorded result, oldest first.
    fn list_game_results(&self) -> BoxFuture<'static, StorageResult<Vec<GameResultEntity>>>;
    /// Cheap round trip proving the store is reachable.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
