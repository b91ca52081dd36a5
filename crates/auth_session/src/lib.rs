//! # Auth Session
//!
//! Client-side authentication state: backend calls for register, login,
//! fetch and update, local decoding of the issued token, and a persisted
//! session that view code can read and subscribe to.

pub mod api;
pub mod config;
pub mod error;
pub mod masking;
pub mod notify;
pub mod session;
pub mod storage;
pub mod store;
pub mod token;
pub mod utils;

pub use api::client::HttpUserApi;
pub use api::models::{Credentials, FilePart, Registration, UserChanges};
pub use api::user_api::UserApi;
pub use config::Config;
pub use error::{AuthError, Result, REJECTION_MESSAGE};
pub use masking::mask_token;
pub use notify::{LogNotifier, Notifier};
pub use session::{
    get_token, get_user, get_user_error, get_user_is_loading, AuthAction, Operation, Session,
};
pub use storage::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use store::AuthStore;
pub use token::{decode_claims, Claims};
