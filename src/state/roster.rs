//! Shared member roster feeding the live views.

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::{
    facade::{BackendResult, SessionBackend},
    sync::{Roster, Subscription},
};

/// Shared copy of the member roster feeding every live derivation.
///
/// The roster is a fetched collection rather than a realtime location, so it is
/// held here and pushed to subscribers after each refresh.
pub struct RosterHub {
    sender: watch::Sender<Roster>,
}

impl RosterHub {
    /// Create an unloaded hub; subscribers see `None` until the first refresh.
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(None);
        Self { sender }
    }

    /// Last loaded roster, if any.
    pub fn current(&self) -> Roster {
        self.sender.borrow().clone()
    }

    /// Current roster immediately, then every refresh that changed it.
    pub fn subscribe(&self) -> Subscription<Roster> {
        Subscription::from_watch(self.sender.subscribe(), |roster| roster)
    }

    /// Reload every member from the document store.
    ///
    /// A failed load keeps the previous roster in place.
    pub async fn refresh(&self, backend: &SessionBackend) -> BackendResult<usize> {
        let members = backend
            .get_all_members()
            .await
            .inspect_err(|err| warn!(error = %err, "roster refresh failed"))?;
        let count = members.len();
        let members = Some(members);
        self.sender.send_if_modified(|current| {
            if *current == members {
                return false;
            }
            *current = members;
            true
        });
        debug!(count, "roster refreshed");
        Ok(count)
    }
}

impl Default for RosterHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;

    #[tokio::test]
    async fn subscribers_see_pending_then_loaded_roster() {
        let backend = SessionBackend::in_memory(Vec::new());
        let hub = RosterHub::new();
        let mut roster = hub.subscribe();
        assert_eq!(roster.next().await, Some(None));

        backend.register("a", "Ann").await.unwrap();
        assert_eq!(hub.refresh(&backend).await.unwrap(), 1);

        let loaded = roster.next().await.unwrap().unwrap();
        assert_eq!(loaded[0].id, "a");
        assert_eq!(hub.current().map(|members| members.len()), Some(1));
    }

    #[tokio::test]
    async fn empty_store_loads_as_empty_roster() {
        let backend = SessionBackend::in_memory(Vec::new());
        let hub = RosterHub::new();
        hub.refresh(&backend).await.unwrap();
        assert_eq!(hub.current(), Some(Vec::new()));
    }
}
