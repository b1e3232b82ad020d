use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::auth::IdentityResponse;

#[derive(Clone, Debug)]
/// Dispatched payload carried across SSE channels.
pub struct ServerEvent {
    /// SSE `event:` name; `None` sends an unnamed message.
    pub event: Option<String>,
    /// JSON payload sent as the `data:` field.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast whenever somebody signs in or out.
pub struct AuthStateEvent {
    /// `null` once signed out.
    pub identity: Option<IdentityResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the session is opened or closed.
pub struct SessionStatusEvent {
    pub open: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast once a playing game has been recorded in the result log.
pub struct GameFinishedEvent {
    /// Push key the game had in the playing collection.
    pub key: String,
    pub win: Vec<String>,
    pub lose: Vec<String>,
}
