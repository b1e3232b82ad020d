/// Sign-in state and role checks.
pub mod auth_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Team building and game lifecycle.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Member registration and lookups.
pub mod member_service;
/// Session lifecycle and check-ins.
pub mod session_service;
/// Server-Sent Events streaming of live session views.
pub mod sse_service;
/// Rating-balanced team partitioning.
pub mod teams;

#[cfg(test)]
pub(crate) mod fixtures;
