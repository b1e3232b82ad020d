use thiserror::Error;

use crate::dao::{identity::AuthError, storage::StorageError};

/// Result alias for façade operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Failures surfaced by [`SessionBackend`](super::SessionBackend).
#[derive(Debug, Error)]
pub enum BackendError {
    /// The sign-in flow was cancelled or rejected.
    #[error("authentication failed")]
    Auth(#[from] AuthError),
    /// No member record exists under the given id.
    #[error("no member registered under `{0}`")]
    NotFound(String),
    /// A backend read or write failed.
    #[error("backend storage failure")]
    Storage(#[from] StorageError),
}
