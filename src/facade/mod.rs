//! Backend access façade: the single integration point with the identity
//! provider, the document store and the realtime database.

mod error;
pub mod model;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};

pub use self::error::{BackendError, BackendResult};
use self::model::{GameCategory, GameEntry, GameRef, GameResult, Googler, Member};
use crate::{
    dao::{
        document_store::{DocumentStore, memory::MemoryDocumentStore},
        identity::{AccountDirectory, Identity, IdentityProvider, SignInPrompt},
        models::{GameEntryEntity, GameResultEntity, MemberEntity},
        realtime::{DbRef, Location, RealtimeDatabase},
        storage::{StorageError, StorageResult},
    },
    sync::Subscription,
};

/// Explicitly constructed client for every backend operation.
///
/// Cloning is cheap; all clones share the same connections and auth state.
#[derive(Clone)]
pub struct SessionBackend {
    inner: Arc<BackendInner>,
}

struct BackendInner {
    identity: Arc<dyn IdentityProvider>,
    documents: Arc<dyn DocumentStore>,
    realtime: Arc<RealtimeDatabase>,
    auth_state: watch::Sender<Option<Identity>>,
    sign_in_gate: Mutex<()>,
}

impl SessionBackend {
    /// Wire the façade to its three backends; nobody is signed in yet.
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        documents: Arc<dyn DocumentStore>,
        realtime: Arc<RealtimeDatabase>,
    ) -> Self {
        let (auth_state, _receiver) = watch::channel(None);
        Self {
            inner: Arc::new(BackendInner {
                identity,
                documents,
                realtime,
                auth_state,
                sign_in_gate: Mutex::new(()),
            }),
        }
    }

    /// Backend running entirely in process with the given sign-in accounts.
    pub fn in_memory(accounts: Vec<Identity>) -> Self {
        Self::new(
            Arc::new(AccountDirectory::new(accounts)),
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(RealtimeDatabase::new()),
        )
    }

    /// Realtime database handle, exposed for connectivity control and diagnostics.
    pub fn realtime(&self) -> &Arc<RealtimeDatabase> {
        &self.inner.realtime
    }

    /// Identity of the signed-in user, if any.
    pub fn current_identity(&self) -> Option<Identity> {
        self.inner.auth_state.borrow().clone()
    }

    /// Run the sign-in flow, forcing account selection.
    ///
    /// Does nothing and returns the current identity when already signed in.
    pub async fn sign_in(&self, login_hint: Option<String>) -> BackendResult<Identity> {
        let _gate = self.inner.sign_in_gate.lock().await;
        if let Some(identity) = self.current_identity() {
            debug!(uid = %identity.uid, "sign-in skipped; already signed in");
            return Ok(identity);
        }

        let prompt = SignInPrompt {
            select_account: true,
            login_hint,
        };
        let identity = self
            .inner
            .identity
            .authenticate(prompt)
            .await
            .inspect_err(|err| warn!(error = %err, "sign-in failed"))?;

        info!(uid = %identity.uid, "signed in");
        self.inner.auth_state.send_replace(Some(identity.clone()));
        Ok(identity)
    }

    /// Clear the signed-in identity. Returns `false` if nobody was signed in.
    pub fn sign_out(&self) -> bool {
        let signed_out = self
            .inner
            .auth_state
            .send_if_modified(|current| current.take().is_some());
        if signed_out {
            info!("signed out");
        }
        signed_out
    }

    /// Current identity immediately, then every sign-in and sign-out.
    pub fn on_auth_state_changed(&self) -> Subscription<Option<Identity>> {
        Subscription::from_watch(self.inner.auth_state.subscribe(), |identity| identity)
    }

    /// Create or overwrite a member with the default rating and role.
    pub async fn register(&self, id: &str, name: &str) -> BackendResult<Member> {
        let entity = MemberEntity::registered(id.to_owned(), name.to_owned());
        self.inner.documents.upsert_member(entity.clone()).await?;
        info!(member_id = %id, "member registered");
        Ok(entity.into())
    }

    /// Join the identity with its member record.
    pub async fn get_googler(&self, identity: &Identity) -> BackendResult<Googler> {
        let member = self
            .inner
            .documents
            .find_member(identity.uid.clone())
            .await?
            .ok_or_else(|| BackendError::NotFound(identity.uid.clone()))?;

        Ok(Googler {
            identity: identity.clone(),
            member: member.into(),
        })
    }

    /// Every registered member, ordered by id.
    pub async fn get_all_members(&self) -> BackendResult<Vec<Member>> {
        let members = self.inner.documents.list_members().await?;
        Ok(members.into_iter().map(Into::into).collect())
    }

    /// Members among `ids`; ids without a record are left out of the result.
    pub async fn get_members_by_id(&self, ids: &[String]) -> BackendResult<Vec<Member>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let members = self.inner.documents.find_members(ids.to_vec()).await?;
        Ok(members.into_iter().map(Into::into).collect())
    }

    /// Store fixture members that are not registered yet. Returns how many were added.
    ///
    /// Existing records are left untouched so ratings survive a restart.
    pub async fn seed_members(&self, members: &[MemberEntity]) -> BackendResult<usize> {
        let mut added = 0;
        for member in members {
            if self.inner.documents.find_member(member.id.clone()).await?.is_some() {
                continue;
            }
            self.inner.documents.upsert_member(member.clone()).await?;
            added += 1;
        }
        if added > 0 {
            info!(added, "seed members stored");
        }
        Ok(added)
    }

    /// Replace the whole session membership list.
    pub async fn update_session_member_ids(&self, ids: &[String]) -> BackendResult<()> {
        debug!(count = ids.len(), "updating session member ids");
        self.write(&DbRef::root(Location::Members), &ids)
            .inspect_err(|err| error!(error = %err, "failed to update session member ids"))?;
        Ok(())
    }

    /// One-shot read of the checked-in ids, in check-in order.
    pub fn session_member_ids(&self) -> BackendResult<Vec<String>> {
        let value = self.inner.realtime.get(&DbRef::root(Location::Members));
        Ok(decode_member_ids(value)?)
    }

    /// Checked-in ids immediately, then after every change. A missing list reads as empty.
    pub fn listen_to_session_member_ids(&self) -> Subscription<Vec<String>> {
        Subscription::from_watch(self.inner.realtime.subscribe(Location::Members), |value| value)
            .filter_map(|value| {
                decode_member_ids(value)
                    .inspect_err(|err| warn!(error = %err, "skipping malformed members snapshot"))
                    .ok()
            })
    }

    /// Append a game waiting for a court and return its back-reference.
    pub async fn add_upcoming_game(
        &self,
        team1: Vec<String>,
        team2: Vec<String>,
    ) -> BackendResult<GameRef> {
        self.add_game(GameCategory::Upcoming, team1, team2)
    }

    /// Append a game that is already being played.
    pub async fn add_playing_game(
        &self,
        team1: Vec<String>,
        team2: Vec<String>,
    ) -> BackendResult<GameRef> {
        self.add_game(GameCategory::Playing, team1, team2)
    }

    /// Whole upcoming collection immediately, then after every change.
    pub fn listen_to_upcoming_games(&self) -> Subscription<Vec<GameEntry>> {
        self.listen_to_games(GameCategory::Upcoming)
    }

    pub fn listen_to_playing_games(&self) -> Subscription<Vec<GameEntry>> {
        self.listen_to_games(GameCategory::Playing)
    }

    /// One-shot read of a whole game collection.
    pub fn games(&self, category: GameCategory) -> BackendResult<Vec<GameEntry>> {
        let value = self.inner.realtime.get(&DbRef::root(category.location()));
        Ok(decode_games(category, value)?)
    }

    /// The game stored at `reference`, or `None` once it was removed.
    pub fn find_game(&self, reference: &GameRef) -> BackendResult<Option<GameEntry>> {
        let location = reference.to_string();
        match self.inner.realtime.get(&reference.db_ref()) {
            Value::Null => Ok(None),
            value => {
                let entity: GameEntryEntity = serde_json::from_value(value)
                    .map_err(|source| StorageError::malformed(location, source))?;
                Ok(Some(GameEntry::from_entity(reference.clone(), entity)))
            }
        }
    }

    /// Append a result to the log. The teams are not checked against any game.
    pub async fn add_game_result(&self, win: Vec<String>, lose: Vec<String>) -> BackendResult<()> {
        let id = self
            .inner
            .documents
            .append_game_result(GameResultEntity { win, lose })
            .await?;
        debug!(result_id = %id, "game result recorded");
        Ok(())
    }

    /// The whole result log, oldest first.
    pub async fn game_results(&self) -> BackendResult<Vec<GameResult>> {
        let results = self.inner.documents.list_game_results().await?;
        Ok(results.into_iter().map(Into::into).collect())
    }

    /// Overwrite the value stored at a game back-reference.
    pub async fn update<T: Serialize>(&self, reference: &GameRef, value: &T) -> BackendResult<()> {
        self.write(&reference.db_ref(), value)?;
        Ok(())
    }

    /// Remove the game stored at `reference`. Removing a missing game is a no-op.
    pub async fn delete(&self, reference: &GameRef) -> BackendResult<()> {
        self.inner.realtime.remove(&reference.db_ref())?;
        Ok(())
    }

    /// Whether a session is running; an unset flag counts as closed.
    pub fn is_session_open(&self) -> bool {
        self.inner.realtime.get(&DbRef::root(Location::Open)) == Value::Bool(true)
    }

    /// Open flag immediately, then after every change.
    pub fn listen_to_session_open(&self) -> Subscription<bool> {
        Subscription::from_watch(self.inner.realtime.subscribe(Location::Open), |value| {
            value == Value::Bool(true)
        })
    }

    /// Mark the session open. Members and games are left as they are.
    pub async fn open_session(&self) -> BackendResult<()> {
        self.inner
            .realtime
            .set(&DbRef::root(Location::Open), Value::Bool(true))?;
        info!("session opened");
        Ok(())
    }

    /// Mark the session closed and clear its members and games.
    pub async fn close_session(&self) -> BackendResult<()> {
        let realtime = &self.inner.realtime;
        realtime.set(&DbRef::root(Location::Open), Value::Bool(false))?;
        for location in [Location::Members, Location::Upcoming, Location::Playing] {
            realtime.remove(&DbRef::root(location))?;
        }
        info!("session closed");
        Ok(())
    }

    /// Fails when the document store is unreachable or the realtime database is offline.
    pub async fn health_check(&self) -> BackendResult<()> {
        self.inner.documents.health_check().await?;
        if !self.inner.realtime.is_online() {
            return Err(StorageError::Offline {
                location: "/".into(),
            }
            .into());
        }
        Ok(())
    }

    fn add_game(
        &self,
        category: GameCategory,
        team1: Vec<String>,
        team2: Vec<String>,
    ) -> BackendResult<GameRef> {
        let entity = GameEntryEntity { team1, team2 };
        let value = serde_json::to_value(&entity)
            .map_err(|source| StorageError::malformed(category.to_string(), source))?;
        let reference = self.inner.realtime.push(category.location(), value)?;
        let key = reference.key.unwrap_or_default();
        debug!(%category, %key, "game added");
        Ok(GameRef { category, key })
    }

    fn listen_to_games(&self, category: GameCategory) -> Subscription<Vec<GameEntry>> {
        Subscription::from_watch(
            self.inner.realtime.subscribe(category.location()),
            |value| value,
        )
        .filter_map(move |value| {
            decode_games(category, value)
                .inspect_err(|err| warn!(%category, error = %err, "skipping malformed games snapshot"))
                .ok()
        })
    }

    fn write<T: Serialize + ?Sized>(&self, reference: &DbRef, value: &T) -> StorageResult<()> {
        let value = serde_json::to_value(value)
            .map_err(|source| StorageError::malformed(reference.to_string(), source))?;
        self.inner.realtime.set(reference, value)
    }
}

fn decode_member_ids(value: Value) -> StorageResult<Vec<String>> {
    match value {
        Value::Null => Ok(Vec::new()),
        value => serde_json::from_value(value)
            .map_err(|source| StorageError::malformed(Location::Members.as_str(), source)),
    }
}

fn decode_games(category: GameCategory, value: Value) -> StorageResult<Vec<GameEntry>> {
    let entries = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(entries) => entries,
        other => {
            let source = <serde_json::Error as serde::de::Error>::custom(format!(
                "expected a keyed collection, got {other}"
            ));
            return Err(StorageError::malformed(category.to_string(), source));
        }
    };

    entries
        .into_iter()
        .map(|(key, value)| {
            let entity: GameEntryEntity = serde_json::from_value(value).map_err(|source| {
                StorageError::malformed(format!("{category}/{key}"), source)
            })?;
            Ok(GameEntry::from_entity(GameRef { category, key }, entity))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::{StreamExt, future::BoxFuture};
    use serde_json::json;

    use super::*;
    use crate::dao::identity::AuthError;

    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl IdentityProvider for CountingProvider {
        fn authenticate(
            &self,
            prompt: SignInPrompt,
        ) -> BoxFuture<'static, Result<Identity, AuthError>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert!(prompt.select_account);
            Box::pin(async {
                Ok(Identity {
                    uid: "x".into(),
                    display_name: "Xavier".into(),
                    email: None,
                })
            })
        }
    }

    fn counting_backend() -> (SessionBackend, Arc<CountingProvider>) {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let backend = SessionBackend::new(
            provider.clone(),
            Arc::new(MemoryDocumentStore::new()),
            Arc::new(RealtimeDatabase::new()),
        );
        (backend, provider)
    }

    #[tokio::test]
    async fn sign_in_twice_authenticates_once() {
        let (backend, provider) = counting_backend();
        let first = backend.sign_in(None).await.unwrap();
        let second = backend.sign_in(None).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn sign_out_when_signed_out_is_noop() {
        let (backend, _) = counting_backend();
        assert!(!backend.sign_out());
        backend.sign_in(None).await.unwrap();
        assert!(backend.sign_out());
        assert!(!backend.sign_out());
    }

    #[tokio::test]
    async fn auth_state_is_delivered_immediately_and_on_change() {
        let (backend, _) = counting_backend();
        let mut states = backend.on_auth_state_changed();
        assert_eq!(states.next().await, Some(None));

        backend.sign_in(None).await.unwrap();
        let signed_in = states.next().await.unwrap();
        assert_eq!(signed_in.map(|identity| identity.uid), Some("x".to_string()));

        assert!(states.detach());
        assert!(!states.detach());
    }

    #[tokio::test]
    async fn cancelled_sign_in_surfaces_auth_error() {
        let backend = SessionBackend::in_memory(Vec::new());
        let err = backend.sign_in(None).await.unwrap_err();
        assert!(matches!(err, BackendError::Auth(AuthError::Cancelled)));
        assert_eq!(backend.current_identity(), None);
    }

    #[tokio::test]
    async fn googler_without_member_is_not_found() {
        let backend = SessionBackend::in_memory(Vec::new());
        let identity = Identity {
            uid: "ghost".into(),
            display_name: "Ghost".into(),
            email: None,
        };
        let err = backend.get_googler(&identity).await.unwrap_err();
        assert!(matches!(err, BackendError::NotFound(ref id) if id == "ghost"));
    }

    #[tokio::test]
    async fn seeding_keeps_existing_members() {
        let backend = SessionBackend::in_memory(Vec::new());
        backend.register("a", "Ann").await.unwrap();

        let mut veteran = MemberEntity::registered("a".into(), "Ann".into());
        veteran.elo = 1400;
        let fresh = MemberEntity::registered("b".into(), "Bob".into());
        let added = backend.seed_members(&[veteran, fresh]).await.unwrap();

        assert_eq!(added, 1);
        let members = backend.get_all_members().await.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].elo, 1000);
    }

    #[tokio::test]
    async fn session_member_write_failure_is_returned() {
        let backend = SessionBackend::in_memory(Vec::new());
        backend.realtime().set_online(false);

        let err = backend
            .update_session_member_ids(&["a".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Storage(StorageError::Offline { .. })));
    }

    #[tokio::test]
    async fn member_ids_listener_treats_missing_value_as_empty() {
        let backend = SessionBackend::in_memory(Vec::new());
        let mut ids = backend.listen_to_session_member_ids();
        assert_eq!(ids.next().await, Some(Vec::new()));

        backend
            .update_session_member_ids(&["a".to_string(), "c".to_string()])
            .await
            .unwrap();
        assert_eq!(ids.next().await, Some(vec!["a".to_string(), "c".to_string()]));
    }

    #[tokio::test]
    async fn games_listener_delivers_full_collection_with_references() {
        let backend = SessionBackend::in_memory(Vec::new());
        let mut upcoming = backend.listen_to_upcoming_games();
        assert_eq!(upcoming.next().await, Some(Vec::new()));

        let first = backend
            .add_upcoming_game(vec!["a".into()], vec!["b".into()])
            .await
            .unwrap();
        let snapshot = upcoming.next().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].reference, first);

        backend
            .add_upcoming_game(vec!["c".into()], vec!["d".into()])
            .await
            .unwrap();
        let snapshot = upcoming.next().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].team1, vec!["a".to_string()]);
        assert_eq!(snapshot[1].team2, vec!["d".to_string()]);
    }

    #[tokio::test]
    async fn update_and_delete_address_single_entry() {
        let backend = SessionBackend::in_memory(Vec::new());
        let game = backend
            .add_playing_game(vec!["a".into()], vec!["b".into()])
            .await
            .unwrap();

        backend
            .update(&game, &json!({"team1": ["b"], "team2": ["a"]}))
            .await
            .unwrap();
        let stored = backend.find_game(&game).unwrap().unwrap();
        assert_eq!(stored.team1, vec!["b".to_string()]);

        backend.delete(&game).await.unwrap();
        assert_eq!(backend.find_game(&game).unwrap(), None);
        assert!(backend.games(GameCategory::Playing).unwrap().is_empty());
    }

    #[tokio::test]
    async fn closing_session_clears_members_and_games() {
        let backend = SessionBackend::in_memory(Vec::new());
        backend.open_session().await.unwrap();
        backend
            .update_session_member_ids(&["a".to_string()])
            .await
            .unwrap();
        backend
            .add_upcoming_game(vec!["a".into()], vec!["b".into()])
            .await
            .unwrap();
        assert!(backend.is_session_open());

        backend.close_session().await.unwrap();
        assert!(!backend.is_session_open());
        assert!(backend.session_member_ids().unwrap().is_empty());
        assert!(backend.games(GameCategory::Upcoming).unwrap().is_empty());
    }
}
