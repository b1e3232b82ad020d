//! Live view-state synchronisation: subscriptions, combinators and derivations.

pub mod combine;
pub mod resolve;
pub mod subscription;
pub mod view_state;

pub use combine::combine_latest;
pub use resolve::{Roster, games_view, resolve_games, resolve_session_members, session_members_view};
pub use subscription::Subscription;
pub use view_state::LiveState;
