//! In-process realtime key-value store.
//!
//! Each top-level [`Location`] holds a JSON value published through a
//! [`watch`] channel, so every listener receives the full current value on
//! subscription and again after every change. Keyed collections (`upcoming`,
//! `playing`) are JSON objects whose children are addressed by push keys.

use std::{
    fmt,
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
};

use rand::{Rng, distr::Alphanumeric};
use serde_json::{Map, Value};
use tokio::sync::watch;
use tracing::debug;

use crate::dao::storage::{StorageError, StorageResult};

const PUSH_SUFFIX_LEN: usize = 8;

/// Top-level locations known to the session backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    /// Ordered list of member ids checked into the session.
    Members,
    /// Games waiting for a free court.
    Upcoming,
    /// Games currently being played.
    Playing,
    /// Whether a session is running.
    Open,
}

impl Location {
    const ALL: [Location; 4] = [
        Location::Members,
        Location::Upcoming,
        Location::Playing,
        Location::Open,
    ];

    /// Storage key of the location.
    pub fn as_str(self) -> &'static str {
        match self {
            Location::Members => "members",
            Location::Upcoming => "upcoming",
            Location::Playing => "playing",
            Location::Open => "open",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Address of a value: a whole location or one child of a keyed collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DbRef {
    pub location: Location,
    pub key: Option<String>,
}

impl DbRef {
    /// The whole value at `location`.
    pub fn root(location: Location) -> Self {
        Self {
            location,
            key: None,
        }
    }

    /// One entry of the keyed collection at `location`.
    pub fn child(location: Location, key: impl Into<String>) -> Self {
        Self {
            location,
            key: Some(key.into()),
        }
    }
}

impl fmt::Display for DbRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}/{}", self.location.as_str(), key),
            None => f.write_str(self.location.as_str()),
        }
    }
}

/// Realtime database holding one watch channel per [`Location`].
pub struct RealtimeDatabase {
    nodes: [watch::Sender<Value>; 4],
    online: AtomicBool,
    sequence: AtomicU64,
}

impl Default for RealtimeDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl RealtimeDatabase {
    /// Online database with every location unset.
    pub fn new() -> Self {
        Self {
            nodes: Location::ALL.map(|_| {
                let (sender, _receiver) = watch::channel(Value::Null);
                sender
            }),
            online: AtomicBool::new(true),
            sequence: AtomicU64::new(0),
        }
    }

    /// Toggle connectivity. Writes fail while offline; listeners keep the last value.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Read the current value at `reference` (`Null` when absent).
    pub fn get(&self, reference: &DbRef) -> Value {
        let root = self.node(reference.location).borrow();
        match &reference.key {
            None => root.clone(),
            Some(key) => root.get(key).cloned().unwrap_or(Value::Null),
        }
    }

    /// Overwrite the value at `reference`. Writing `Null` removes it.
    pub fn set(&self, reference: &DbRef, value: Value) -> StorageResult<()> {
        self.ensure_online(reference)?;

        let changed = self
            .node(reference.location)
            .send_if_modified(|root| match &reference.key {
                None => {
                    if *root == value {
                        return false;
                    }
                    *root = value.clone();
                    true
                }
                Some(key) => write_child(root, key, value.clone()),
            });

        debug!(reference = %reference, changed, "realtime write");
        Ok(())
    }

    /// Append `value` under a freshly generated, chronologically sortable key.
    pub fn push(&self, location: Location, value: Value) -> StorageResult<DbRef> {
        let reference = DbRef::child(location, self.next_push_key());
        self.set(&reference, value)?;
        Ok(reference)
    }

    /// Delete the value at `reference`; same as writing `Null`.
    pub fn remove(&self, reference: &DbRef) -> StorageResult<()> {
        self.set(reference, Value::Null)
    }

    /// Attach a listener to a whole location.
    pub fn subscribe(&self, location: Location) -> watch::Receiver<Value> {
        self.node(location).subscribe()
    }

    /// Number of listeners currently attached to `location`.
    pub fn listener_count(&self, location: Location) -> usize {
        self.node(location).receiver_count()
    }

    fn node(&self, location: Location) -> &watch::Sender<Value> {
        &self.nodes[location.index()]
    }

    fn ensure_online(&self, reference: &DbRef) -> StorageResult<()> {
        if self.is_online() {
            Ok(())
        } else {
            Err(StorageError::Offline {
                location: reference.to_string(),
            })
        }
    }

    fn next_push_key(&self) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let suffix: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(PUSH_SUFFIX_LEN)
            .map(char::from)
            .collect();
        format!("{sequence:012}{suffix}")
    }
}

/// Write one child of a keyed collection, collapsing empty collections to `Null`.
fn write_child(root: &mut Value, key: &str, value: Value) -> bool {
    if value.is_null() {
        let Value::Object(map) = root else {
            return false;
        };
        if map.remove(key).is_none() {
            return false;
        }
        if map.is_empty() {
            *root = Value::Null;
        }
        return true;
    }

    if !root.is_object() {
        *root = Value::Object(Map::new());
    }
    let Value::Object(map) = root else {
        return false;
    };
    if map.get(key) == Some(&value) {
        return false;
    }
    map.insert(key.to_owned(), value);
    true
}
