//! Session actions - everything that can change the session state.

use crate::token::Claims;

/// The asynchronous backend operations that drive the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Register,
    Login,
    FetchUser,
    UpdateUser,
}

impl Operation {
    /// Action type prefix, e.g. `USER_LOGIN`.
    pub fn type_prefix(&self) -> &'static str {
        match self {
            Operation::Register => "USER_REGISTER",
            Operation::Login => "USER_LOGIN",
            Operation::FetchUser => "USER_GET",
            Operation::UpdateUser => "USER_UPDATE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthAction {
    /// A request for the operation is in flight.
    Pending(Operation),

    /// The backend issued a token that decoded and was persisted.
    Fulfilled {
        operation: Operation,
        user: Claims,
        token: String,
    },

    /// The operation failed; `error` is the user-facing message.
    Rejected { operation: Operation, error: String },

    /// The backend accepted an update; a follow-up fetch refreshes the user.
    UpdateAccepted,

    /// The update request succeeded with a status other than "accepted".
    UpdateIgnored { code: u16 },

    /// A token was found in persistent storage.
    Restored { user: Claims, token: String },

    LoggedOut,
}

impl AuthAction {
    /// Name used in logs and history, e.g. `USER_LOGIN/fulfilled`.
    pub fn type_name(&self) -> String {
        match self {
            AuthAction::Pending(op) => format!("{}/pending", op.type_prefix()),
            AuthAction::Fulfilled { operation, .. } => {
                format!("{}/fulfilled", operation.type_prefix())
            }
            AuthAction::Rejected { operation, .. } => {
                format!("{}/rejected", operation.type_prefix())
            }
            AuthAction::UpdateAccepted => "USER_UPDATE/fulfilled".to_string(),
            AuthAction::UpdateIgnored { .. } => "USER_UPDATE/ignored".to_string(),
            AuthAction::Restored { .. } => "user/getUserFromLocalStorage".to_string(),
            AuthAction::LoggedOut => "user/logout".to_string(),
        }
    }
}
