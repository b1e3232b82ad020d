//! Shared application state handed to every handler.

mod notices;
mod roster;

use std::sync::Arc;

use tokio::sync::Mutex;

pub use self::roster::RosterHub;
pub use self::notices::{GAME_FINISHED_EVENT, NoticeHub};
use crate::{config::AppConfig, facade::SessionBackend};

/// Handle cloned into every handler and background task.
pub type SharedState = Arc<AppState>;

/// Capacity of the notice broadcast channel.
const NOTICE_CAPACITY: usize = 16;

/// Central application state: the backend façade plus the shared roster.
pub struct AppState {
    backend: SessionBackend,
    roster: RosterHub,
    notices: NoticeHub,
    workflow_gate: Mutex<()>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The roster starts unloaded; call [`RosterHub::refresh`] once storage is reachable.
    pub fn new(backend: SessionBackend, config: AppConfig) -> SharedState {
        Arc::new(Self {
            backend,
            roster: RosterHub::new(),
            notices: NoticeHub::new(NOTICE_CAPACITY),
            workflow_gate: Mutex::new(()),
            config,
        })
    }

    /// Façade over the identity provider, document store and realtime database.
    pub fn backend(&self) -> &SessionBackend {
        &self.backend
    }

    /// Roster shared by every session view.
    pub fn roster(&self) -> &RosterHub {
        &self.roster
    }

    /// Hub used for notices such as recorded game results.
    pub fn notices(&self) -> &NoticeHub {
        &self.notices
    }

    /// Serialises read-modify-write workflows on the realtime database.
    pub fn workflow_gate(&self) -> &Mutex<()> {
        &self.workflow_gate
    }

    /// Configuration loaded at startup.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
