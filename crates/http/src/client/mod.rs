//! Bukload HTTP client
//!
//! [`BukloadClient::request`] sends a request with the stored access token.
//! When the server rejects it with 401 or 403 the client refreshes the token
//! once, shared by every request rejected during the same episode, and
//! resubmits each of them exactly once.

pub mod auth;
pub mod courses;
pub mod envelope;
pub mod error;
pub mod places;
pub mod refresh;
pub mod request;
pub mod reviews;
pub mod token_store;
pub mod travel;
pub mod users;

pub use envelope::ApiOutcome;
pub use error::ClientError;
pub use refresh::RefreshCoordinator;
pub use request::{ApiResponse, PendingRequest, RequestOptions};
pub use token_store::{Credentials, FileTokenStore, MemoryTokenStore, TokenStore};

use refresh::Admission;
use reqwest::{Client, ClientBuilder, Method, header};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::types::{RefreshRequest, RefreshResponse};

/// Default transport timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const DEFAULT_USER_AGENT: &str = concat!("bukload-client/", env!("CARGO_PKG_VERSION"));

/// Bukload API client
///
/// Clones share the token store and the refresh coordinator.
#[derive(Clone)]
pub struct BukloadClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
    coordinator: Arc<RefreshCoordinator>,
}

impl BukloadClient {
    /// Create a new client with default configuration
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    /// Create a new client builder
    pub fn builder() -> BukloadClientBuilder {
        BukloadClientBuilder::default()
    }

    /// Create a client from loaded configuration, keeping tokens in its state dir
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::builder()
            .base_url(&config.base_url)
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(&config.user_agent)
            .token_store(Arc::new(FileTokenStore::in_dir(&config.state_dir)))
            .build()
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stored credentials
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Refresh coordination state shared by all clones of this client
    pub fn refresh_coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send one logical API call.
    ///
    /// Statuses other than 401/403 are returned as-is, errors included. A
    /// first 401/403 triggers the refresh protocol; a 401/403 after the retry,
    /// a missing refresh token or a failed refresh end in an error.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<ApiResponse, ClientError> {
        self.dispatch(PendingRequest::new(method, path, body, options)).await
    }

    async fn dispatch(&self, mut request: PendingRequest) -> Result<ApiResponse, ClientError> {
        let sent_with = request
            .bearer
            .clone()
            .or_else(|| self.credentials.access_token());
        let response = self.send(&request, sent_with.as_deref()).await?;
        if !response.is_auth_rejection() {
            return Ok(response);
        }
        if request.retried {
            return Err(terminal_rejection(&request, &response));
        }

        // A refresh finished while this request was in flight: reuse its token.
        if let Some(current) = self
            .credentials
            .access_token()
            .filter(|current| sent_with.as_ref() != Some(current))
        {
            debug!(
                method = %request.method,
                path = %request.path,
                "token replaced since send, resubmitting without refresh"
            );
            request.reauthorize(&current);
            return self.resubmit(request).await;
        }

        debug!(
            method = %request.method,
            path = %request.path,
            status = response.status.as_u16(),
            "access token rejected"
        );
        match self.coordinator.admit(request) {
            Admission::Lead(lease, mut request) => {
                let outcome = self.refresh().await;
                let waiters = lease.settle();
                match outcome {
                    Ok(token) => {
                        debug!(waiters = waiters.len(), "resubmitting queued requests");
                        for waiter in waiters {
                            waiter.resume(&token);
                        }
                        request.reauthorize(&token);
                        self.resubmit(request).await
                    }
                    Err(e) => {
                        let reason = e.to_string();
                        for waiter in waiters {
                            waiter.reject(&reason);
                        }
                        Err(e)
                    }
                }
            }
            Admission::Wait(ticket) => {
                let request = ticket.await?;
                self.resubmit(request).await
            }
        }
    }

    /// Second and final attempt of a request after a refresh
    async fn resubmit(&self, request: PendingRequest) -> Result<ApiResponse, ClientError> {
        debug_assert!(request.retried);
        let response = self.send(&request, request.bearer.as_deref()).await?;
        if response.is_auth_rejection() {
            return Err(terminal_rejection(&request, &response));
        }
        Ok(response)
    }

    async fn send(
        &self,
        request: &PendingRequest,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, ClientError> {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path));

        if !request.options.query.is_empty() {
            builder = builder.query(&request.options.query);
        }
        for (name, value) in &request.options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        ApiResponse::read(response).await
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Any failure clears both stored tokens.
    pub(crate) async fn refresh(&self) -> Result<String, ClientError> {
        info!("refreshing access token");
        match self.exchange_refresh_token().await {
            Ok(token) => {
                info!("access token refreshed");
                Ok(token)
            }
            Err(e) => {
                warn!("token refresh failed, clearing stored credentials: {e}");
                if let Err(clear_err) = self.credentials.clear() {
                    error!("failed to clear stored credentials: {clear_err}");
                }
                if matches!(e, ClientError::AuthenticationFailed(_)) {
                    Err(e)
                } else {
                    Err(ClientError::AuthenticationFailed(format!(
                        "token refresh failed: {e}"
                    )))
                }
            }
        }
    }

    async fn exchange_refresh_token(&self) -> Result<String, ClientError> {
        let refresh_token = self.credentials.refresh_token().ok_or_else(|| {
            ClientError::AuthenticationFailed("no refresh token available".to_string())
        })?;

        // Sent without an Authorization header.
        let response = self
            .client
            .post(self.url("/auth/refresh"))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;
        let response = ApiResponse::read(response).await?.error_for_status()?;
        let body: RefreshResponse = response.json()?;

        let access_token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ClientError::AuthenticationFailed("refresh response had no access token".into())
            })?;
        self.credentials.set_access_token(&access_token)?;
        if let Some(rotated) = body.refresh_token.filter(|t| !t.is_empty()) {
            self.credentials.set_refresh_token(&rotated)?;
        }
        Ok(access_token)
    }

    /// Send a request and decode the enveloped, successful response
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        let response = self
            .request(method, path, body, options)
            .await?
            .error_for_status()?;
        ApiOutcome::decode(&response.body)?.into_result()
    }

    /// Send a request to an endpoint that needs no token and answers with bare JSON
    pub(crate) async fn call_public<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, ClientError> {
        let response = self
            .client
            .request(method, self.url(path))
            .json(body)
            .send()
            .await?;
        let response = ApiResponse::read(response).await?;
        if !response.is_success() {
            // Login and signup failures carry a JSON `message` when the server has one.
            let message = response
                .json::<Value>()
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| response.error_message());
            return Err(ClientError::from_status(response.status, message));
        }
        response.json()
    }
}

/// A 401/403 on a request that was already retried is final
fn terminal_rejection(request: &PendingRequest, response: &ApiResponse) -> ClientError {
    warn!(
        method = %request.method,
        path = %request.path,
        status = response.status.as_u16(),
        "request rejected again after token refresh"
    );
    ClientError::from_status(response.status, response.error_message())
}

/// Builder for BukloadClient
#[derive(Default)]
pub struct BukloadClientBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    token_store: Option<Arc<dyn TokenStore>>,
}

impl BukloadClientBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Set where the token pair is kept (in memory by default)
    pub fn token_store(mut self, store: Arc<dyn TokenStore>) -> Self {
        self.token_store = Some(store);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<BukloadClient, ClientError> {
        let base_url = self
            .base_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;

        // Ensure base_url ends without a trailing slash
        let base_url = base_url.trim_end_matches('/').to_string();

        let client = ClientBuilder::new()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .user_agent(
                self.user_agent
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            )
            .build()?;

        let store = self
            .token_store
            .unwrap_or_else(|| Arc::new(MemoryTokenStore::new()));

        Ok(BukloadClient {
            client,
            base_url,
            credentials: Credentials::new(store),
            coordinator: Arc::new(RefreshCoordinator::new()),
        })
    }
}
