//! Chat session lifecycle.
//!
//! `SessionManager` owns the single live provider session. Any change of
//! configuration rebuilds it from scratch with the conversation so far
//! replayed as history; sessions are never edited in place.

mod manager;
mod types;

#[cfg(test)]
mod tests;

pub use manager::SessionManager;
pub use types::BoundSession;
pub(crate) use types::TurnGuard;
