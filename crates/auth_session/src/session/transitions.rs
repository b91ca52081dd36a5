//! Session transitions - the reducer and its bounded history.

use chrono::{DateTime, Utc};

use super::actions::AuthAction;
use super::state::Session;

/// Record of one applied action.
#[derive(Debug, Clone)]
pub struct SessionTransition {
    pub from: Session,
    pub to: Session,
    pub action: AuthAction,
    /// Whether the session actually changed.
    pub changed: bool,
    pub applied_at: DateTime<Utc>,
}

/// Owns the current session and applies actions to it.
#[derive(Debug, Clone)]
pub struct SessionMachine {
    current: Session,
    history: Vec<SessionTransition>,
    max_history: usize,
}

impl Default for SessionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionMachine {
    pub fn new() -> Self {
        Self::with_session(Session::default())
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            current: session,
            history: Vec::new(),
            max_history: 50,
        }
    }

    pub fn session(&self) -> &Session {
        &self.current
    }

    pub fn history(&self) -> &[SessionTransition] {
        &self.history
    }

    pub fn handle_action(&mut self, action: AuthAction) -> SessionTransition {
        let from = self.current.clone();
        let to = Self::reduce(&from, &action);
        let changed = from != to;

        self.current = to.clone();

        let transition = SessionTransition {
            from,
            to,
            action,
            changed,
            applied_at: Utc::now(),
        };

        self.history.push(transition.clone());
        if self.history.len() > self.max_history {
            self.history.remove(0);
        }

        transition
    }

    /// Compute the next session for an action. Errors are only cleared by logout.
    pub fn reduce(session: &Session, action: &AuthAction) -> Session {
        let mut next = session.clone();
        match action {
            AuthAction::Pending(_) => {
                next.loading = true;
            }
            AuthAction::Fulfilled { user, token, .. } => {
                next.user = Some(user.clone());
                next.token = Some(token.clone());
                next.loading = false;
            }
            AuthAction::Rejected { error, .. } => {
                next.loading = false;
                next.error = Some(error.clone());
            }
            AuthAction::UpdateAccepted => {}
            AuthAction::UpdateIgnored { .. } => {
                next.loading = false;
            }
            AuthAction::Restored { user, token } => {
                next.user = Some(user.clone());
                next.token = Some(token.clone());
            }
            AuthAction::LoggedOut => {
                next.user = None;
                next.token = None;
                next.error = None;
            }
        }
        next
    }
}
