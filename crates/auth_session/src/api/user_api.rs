use async_trait::async_trait;

use crate::api::models::{Credentials, Registration, UserChanges};
use crate::error::Result;

/// Backend operations behind the session store.
///
/// Token-returning calls yield the raw token string; decoding is left to
/// the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn register(&self, data: &Registration) -> Result<String>;

    async fn login(&self, credentials: &Credentials) -> Result<String>;

    async fn fetch_user(&self, id: &str) -> Result<String>;

    /// Returns the success status code; the caller decides what it means.
    async fn update_user(&self, id: &str, changes: UserChanges) -> Result<u16>;
}
