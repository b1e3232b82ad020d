/// Member and game-result persistence.
pub mod document_store;
/// Identity provider abstraction backing the sign-in flow.
pub mod identity;
/// Database model definitions.
pub mod models;
/// Realtime key-value store delivering full snapshots to listeners.
pub mod realtime;
/// Storage abstraction layer for database operations.
pub mod storage;
