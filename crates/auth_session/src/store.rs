use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info, warn};
use tokio::sync::{watch, RwLock};

use crate::api::client::HttpUserApi;
use crate::api::models::{Credentials, Registration, UserChanges, UPDATE_ACCEPTED};
use crate::api::user_api::UserApi;
use crate::config::Config;
use crate::error::{Result, REJECTION_MESSAGE};
use crate::masking::mask_token;
use crate::notify::{LogNotifier, Notifier};
use crate::session::{AuthAction, Operation, Session, SessionMachine, SessionTransition};
use crate::storage::{FileTokenStore, TokenStore};
use crate::token::{decode_claims, Claims};

pub const UPDATE_CONFIRMATION: &str = "User updated successfully";
pub const UPDATE_FAILURE_TITLE: &str = "Something went wrong";
pub const UPDATE_FAILURE_HINT: &str = "Try again or try changing the image";

/// State container for the authenticated user.
///
/// Every operation dispatches actions through a [`SessionMachine`]; the
/// resulting snapshots are published to [`AuthStore::subscribe`] receivers.
pub struct AuthStore {
    machine: RwLock<SessionMachine>,
    api: Arc<dyn UserApi>,
    storage: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
    token_key: String,
    updates: watch::Sender<Session>,
}

impl AuthStore {
    pub fn new(
        api: Arc<dyn UserApi>,
        storage: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
        token_key: impl Into<String>,
    ) -> Self {
        let (updates, _) = watch::channel(Session::default());
        AuthStore {
            machine: RwLock::new(SessionMachine::new()),
            api,
            storage,
            notifier,
            token_key: token_key.into(),
            updates,
        }
    }

    /// HTTP backend, file-backed token store and log alerts.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::from_config_with_notifier(config, Arc::new(LogNotifier))
    }

    pub fn from_config_with_notifier(
        config: &Config,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let api = HttpUserApi::new(config)?;
        let storage = FileTokenStore::new(config.session_file());
        info!(
            "Auth store using {} with session file {}",
            api.api_base(),
            storage.path().display()
        );
        Ok(Self::new(
            Arc::new(api),
            Arc::new(storage),
            notifier,
            config.token_key.clone(),
        ))
    }

    pub async fn snapshot(&self) -> Session {
        self.machine.read().await.session().clone()
    }

    pub async fn history(&self) -> Vec<SessionTransition> {
        self.machine.read().await.history().to_vec()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.updates.subscribe()
    }

    async fn dispatch(&self, action: AuthAction) -> SessionTransition {
        let transition = {
            let mut machine = self.machine.write().await;
            let transition = machine.handle_action(action);
            // Publish before releasing the lock so subscribers see updates in order.
            self.updates.send_replace(transition.to.clone());
            transition
        };
        debug!(
            "{} (changed: {})",
            transition.action.type_name(),
            transition.changed
        );
        transition
    }

    pub async fn user_register(&self, data: &Registration) -> Result<Claims> {
        self.authenticate(Operation::Register, self.api.register(data))
            .await
    }

    pub async fn user_login(&self, credentials: &Credentials) -> Result<Claims> {
        self.authenticate(Operation::Login, self.api.login(credentials))
            .await
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Claims> {
        self.authenticate(Operation::FetchUser, self.api.fetch_user(id))
            .await
    }

    /// Sends profile changes. An accepted update refreshes the user from the
    /// backend before confirming. Returns the backend status code.
    pub async fn update_user(&self, id: &str, changes: UserChanges) -> Result<u16> {
        self.dispatch(AuthAction::Pending(Operation::UpdateUser))
            .await;

        match self.api.update_user(id, changes).await {
            Ok(UPDATE_ACCEPTED) => {
                self.dispatch(AuthAction::UpdateAccepted).await;
                if let Err(e) = self.get_user_by_id(id).await {
                    warn!("User {id} updated but refreshing it failed: {e}");
                }
                self.notifier.confirm(UPDATE_CONFIRMATION);
                Ok(UPDATE_ACCEPTED)
            }
            Ok(code) => {
                info!("Update of user {id} returned {code}; nothing to refresh");
                self.dispatch(AuthAction::UpdateIgnored { code }).await;
                Ok(code)
            }
            Err(e) => {
                error!("Failed to update user {id}: {e}");
                self.dispatch(AuthAction::Rejected {
                    operation: Operation::UpdateUser,
                    error: REJECTION_MESSAGE.to_string(),
                })
                .await;
                self.notifier.error(UPDATE_FAILURE_TITLE, UPDATE_FAILURE_HINT);
                Err(e)
            }
        }
    }

    /// Loads the persisted token, if any, into the session.
    ///
    /// A stored token that no longer decodes is ignored.
    pub async fn restore_from_storage(&self) -> Result<Option<Claims>> {
        let Some(token) = self.storage.get(&self.token_key).await? else {
            debug!("No stored token under {:?}", self.token_key);
            return Ok(None);
        };

        match decode_claims(&token) {
            Ok(user) => {
                info!("Restored session with token {}", mask_token(&token));
                if user.is_expired(Utc::now()) {
                    warn!(
                        "Stored token {} expired at {}",
                        mask_token(&token),
                        user.expires_at().map(|t| t.to_rfc3339()).unwrap_or_default()
                    );
                }
                self.dispatch(AuthAction::Restored {
                    user: user.clone(),
                    token,
                })
                .await;
                Ok(Some(user))
            }
            Err(e) => {
                warn!("Ignoring stored token {}: {e}", mask_token(&token));
                Ok(None)
            }
        }
    }

    pub async fn logout(&self) -> Result<()> {
        self.dispatch(AuthAction::LoggedOut).await;
        self.storage.remove(&self.token_key).await?;
        info!("Logged out");
        Ok(())
    }

    async fn authenticate<F>(&self, operation: Operation, request: F) -> Result<Claims>
    where
        F: Future<Output = Result<String>>,
    {
        self.dispatch(AuthAction::Pending(operation)).await;

        match self.accept_token(request.await).await {
            Ok((user, token)) => {
                self.dispatch(AuthAction::Fulfilled {
                    operation,
                    user: user.clone(),
                    token,
                })
                .await;
                Ok(user)
            }
            Err(e) => {
                error!("{} failed: {e}", operation.type_prefix());
                self.dispatch(AuthAction::Rejected {
                    operation,
                    error: REJECTION_MESSAGE.to_string(),
                })
                .await;
                Err(e)
            }
        }
    }

    async fn accept_token(&self, token: Result<String>) -> Result<(Claims, String)> {
        let token = token?;
        let user = decode_claims(&token)?;
        self.storage.set(&self.token_key, &token).await?;
        Ok((user, token))
    }
}
