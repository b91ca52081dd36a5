use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Method, Proxy};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

use crate::api::models::{Credentials, Registration, UserChanges};
use crate::api::user_api::UserApi;
use crate::config::Config;
use crate::error::{AuthError, Result};
use crate::masking::mask_token;
use crate::utils::http_utils::execute_request;

/// [`UserApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpUserApi {
    client: Arc<ClientWithMiddleware>,
    // Multipart bodies are streamed and cannot be cloned for a retry.
    upload_client: Arc<ClientWithMiddleware>,
    api_base: String,
}

impl HttpUserApi {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Self::build_http_client(config)?;
        let retry_client = Self::build_retry_client(client.clone(), config);
        let upload_client = ClientBuilder::new(client).build();

        Ok(Self::with_clients(
            Arc::new(retry_client),
            Arc::new(upload_client),
            &config.api_base,
        ))
    }

    pub fn with_clients(
        client: Arc<ClientWithMiddleware>,
        upload_client: Arc<ClientWithMiddleware>,
        api_base: &str,
    ) -> Self {
        HttpUserApi {
            client,
            upload_client,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn build_http_client(config: &Config) -> Result<Client> {
        let mut builder = Client::builder()
            .default_headers(Self::get_default_headers())
            .timeout(Duration::from_secs(config.timeout_secs));
        if config.http_proxy.is_empty() && config.https_proxy.is_empty() {
            builder = builder.no_proxy();
        }
        if !config.http_proxy.is_empty() {
            builder = builder.proxy(Proxy::http(&config.http_proxy)?);
        }
        if !config.https_proxy.is_empty() {
            builder = builder.proxy(Proxy::https(&config.https_proxy)?);
        }
        builder
            .build()
            .map_err(|e| AuthError::Config(format!("Failed to build HTTP client: {e}")))
    }

    fn build_retry_client(client: Client, config: &Config) -> ClientWithMiddleware {
        let min_interval = Duration::from_millis(config.retry_min_interval_ms);
        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(min_interval, min_interval.saturating_mul(30))
            .build_with_max_retries(config.max_retries);

        ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }

    pub fn get_default_headers() -> HeaderMap {
        let mut header = HeaderMap::new();
        header.insert(ACCEPT, HeaderValue::from_static("application/json"));
        header
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// `{api_base}/users/{id}` with `id` encoded as a single path segment.
    fn user_url(&self, id: &str) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.api_base)
            .map_err(|e| AuthError::Config(format!("Invalid api_base {}: {e}", self.api_base)))?;
        url.path_segments_mut()
            .map_err(|_| AuthError::Config(format!("api_base {} cannot be a base URL", self.api_base)))?
            .pop_if_empty()
            .push("users")
            .push(id);
        Ok(url)
    }
}

#[async_trait]
impl UserApi for HttpUserApi {
    async fn register(&self, data: &Registration) -> Result<String> {
        let url = self.url("/users/register");
        let request = self.client.post(&url).json(data);
        let response = execute_request(request, Method::POST, &url).await?;
        let token = response.encrypted_token()?;
        info!("Registered {}, token {}", data.email, mask_token(&token));
        Ok(token)
    }

    async fn login(&self, credentials: &Credentials) -> Result<String> {
        let url = self.url("/auth/login");
        let request = self.client.post(&url).json(credentials);
        let response = execute_request(request, Method::POST, &url).await?;
        let token = response.bare_token()?;
        info!("Logged in {}, token {}", credentials.email, mask_token(&token));
        Ok(token)
    }

    async fn fetch_user(&self, id: &str) -> Result<String> {
        let url = self.user_url(id)?;
        let request = self.client.get(url.clone());
        let response = execute_request(request, Method::GET, url.as_str()).await?;
        response.encrypted_token()
    }

    async fn update_user(&self, id: &str, changes: UserChanges) -> Result<u16> {
        let url = self.user_url(id)?;
        debug!(
            "Updating user {id}: {} fields, {} files",
            changes.fields().len(),
            changes.files().len()
        );
        let request = self.upload_client.put(url.clone()).multipart(changes.into_form()?);
        let response = execute_request(request, Method::PUT, url.as_str()).await?;
        Ok(response.code)
    }
}
