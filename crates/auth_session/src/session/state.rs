//! Session state and read selectors.

use serde::{Deserialize, Serialize};

use crate::token::Claims;

/// Client-side cached identity of the current user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<Claims>,
    pub token: Option<String>,
    pub loading: bool,
    /// Last rejection message; kept until logout.
    pub error: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

pub fn get_user(session: &Session) -> Option<&Claims> {
    session.user.as_ref()
}

pub fn get_token(session: &Session) -> Option<&str> {
    session.token.as_deref()
}

pub fn get_user_is_loading(session: &Session) -> bool {
    session.loading
}

pub fn get_user_error(session: &Session) -> Option<&str> {
    session.error.as_deref()
}
