//! Session state module
//!
//! Holds the cached identity, the actions that change it, and the
//! reducer that applies them.

mod actions;
mod state;
mod transitions;

pub use actions::{AuthAction, Operation};
pub use state::{get_token, get_user, get_user_error, get_user_is_loading, Session};
pub use transitions::{SessionMachine, SessionTransition};
