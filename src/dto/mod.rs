//! Request and response shapes of the HTTP API.

pub mod auth;
pub mod game;
pub mod health;
pub mod member;
pub mod session;
pub mod sse;
pub mod validation;
