//! Authenticated gateway to the admin backend.
//!
//! Every request passes through [`ApiGateway::execute`], which attaches the
//! bearer token, normalizes failures into [`ApiError`], and on a 401 trades
//! the refresh token for a new pair and replays the request once.
//!
//! Token exchanges are serialized. A request that was rejected with a token
//! some other request has since replaced replays with the current token
//! instead of starting its own exchange.

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{header, Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::auth::CredentialStore;
use crate::cache::CacheStore;
use crate::config::Config;
use crate::models::{LoginRequest, RefreshRequest, TokenPair};

use super::endpoints::{AUTH_LOGIN, AUTH_REFRESH};
use super::invalidation::{default_rules, InvalidationRules};
use super::request::{ApiResponse, GetOptions, Method, QueryParams, RequestDescriptor};
use super::ApiError;

/// Capacity of the session event channel. Events are dropped, not awaited,
/// when the receiver falls behind.
pub const SESSION_EVENT_BUFFER: usize = 16;

/// Session changes observed by the gateway while serving requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A 401 started a token exchange.
    Refreshing,
    /// New tokens were stored.
    Refreshed,
    /// Credentials were purged; the admin must log in again.
    Expired,
}

/// Gateway to the admin REST API.
/// Clone is cheap: the HTTP client, cache and credentials are all shared.
#[derive(Clone)]
pub struct ApiGateway {
    client: Client,
    base_url: String,
    cache: Arc<CacheStore>,
    credentials: Arc<CredentialStore>,
    rules: InvalidationRules,
    cache_enabled: bool,
    events: Option<mpsc::Sender<SessionEvent>>,
    /// Held for the whole of a token exchange.
    refresh_lock: Arc<Mutex<()>>,
}

impl ApiGateway {
    pub fn new(
        config: &Config,
        cache: Arc<CacheStore>,
        credentials: Arc<CredentialStore>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url().to_string(),
            cache,
            credentials,
            rules: default_rules(),
            cache_enabled: config.cache_enabled,
            events: None,
            refresh_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Report session changes on `sender`.
    pub fn with_events(mut self, sender: mpsc::Sender<SessionEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn with_rules(mut self, rules: InvalidationRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    // ===== Request surface =====

    /// GET `endpoint`, answering from the cache when allowed and fresh.
    pub async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: QueryParams,
        options: GetOptions,
    ) -> Result<ApiResponse<T>, ApiError> {
        let request = RequestDescriptor::get(endpoint, params);
        let key = request.cache_key();
        let use_cache = self.cache_enabled && options.use_cache;

        if use_cache && !options.force_refresh {
            if let Some(value) = self.cache.get(&key) {
                match serde_json::from_value(value) {
                    Ok(data) => {
                        debug!(key = %key, "Cache hit");
                        return Ok(ApiResponse::from_cache(data));
                    }
                    Err(e) => {
                        warn!(key = %key, error = %e, "Dropping cache entry that no longer decodes");
                        self.cache.remove(&key);
                    }
                }
            } else {
                debug!(key = %key, "Cache miss");
            }
        }

        let value = self.execute(request).await?;
        let data = decode(value.clone())?;
        if use_cache {
            self.cache.set(&key, value, options.ttl);
        }
        Ok(ApiResponse::from_network(data))
    }

    pub async fn post<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = RequestDescriptor::new(Method::Post, endpoint).with_body(to_body(body)?);
        self.write(request).await
    }

    pub async fn put<T, B>(&self, endpoint: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = RequestDescriptor::new(Method::Put, endpoint).with_body(to_body(body)?);
        self.write(request).await
    }

    /// DELETE `endpoint`. An empty response body decodes as `Value::Null`.
    pub async fn delete(&self, endpoint: &str) -> Result<Value, ApiError> {
        self.write(RequestDescriptor::new(Method::Delete, endpoint)).await
    }

    /// Exchange phone and password for a token pair and store it.
    /// A rejected login is an `Auth` error and never starts a refresh.
    pub async fn login(&self, phone_number: &str, password: &str) -> Result<TokenPair, ApiError> {
        let body = to_body(&LoginRequest {
            phone_number: phone_number.to_string(),
            password: password.to_string(),
        })?;
        let request = RequestDescriptor::new(Method::Post, AUTH_LOGIN)
            .with_body(body)
            .without_refresh();

        let tokens: TokenPair = decode(self.execute(request).await?)?;
        self.credentials.store_tokens(&tokens);
        info!(phone = %phone_number, "Logged in");
        Ok(tokens)
    }

    /// Trade the stored refresh token for a new pair.
    ///
    /// Any failure, including a missing refresh token, purges the stored
    /// credentials and comes back as an `Auth` error.
    pub async fn refresh_credentials(&self) -> Result<TokenPair, ApiError> {
        let _guard = self.refresh_lock.lock().await;
        self.exchange_refresh_token().await
    }

    /// Recover from a 401 on a request sent with `sent_with`.
    ///
    /// When the stored access token already differs, another request
    /// refreshed while this one was in flight and a replay is enough.
    async fn recover_session(&self, sent_with: Option<&str>) -> Result<(), ApiError> {
        let _guard = self.refresh_lock.lock().await;

        let current = self.credentials.access_token();
        if current.is_some() && current.as_deref() != sent_with {
            debug!("Access token replaced by a concurrent refresh");
            return Ok(());
        }
        self.exchange_refresh_token().await.map(|_| ())
    }

    /// Caller must hold `refresh_lock`.
    async fn exchange_refresh_token(&self) -> Result<TokenPair, ApiError> {
        self.notify(SessionEvent::Refreshing);

        let Some(refresh_token) = self.credentials.refresh_token() else {
            warn!("No refresh token available");
            self.expire_session();
            return Err(ApiError::Auth("No refresh token available".to_string()));
        };

        let request = RequestDescriptor::new(Method::Post, AUTH_REFRESH)
            .with_body(to_body(&RefreshRequest {
                refresh_token: refresh_token.clone(),
            })?)
            .without_refresh();

        // Sent directly rather than through `execute`: the exchange itself
        // must never recurse into another refresh.
        let access_token = self.credentials.access_token();
        let outcome = match self.send(&request, access_token.as_deref()).await {
            Ok((status, body)) if status.is_success() => serde_json::from_str::<TokenPair>(&body)
                .map_err(|e| ApiError::invalid_response(status, e)),
            Ok((status, body)) => Err(ApiError::from_status(status, &body)),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(tokens) => {
                self.credentials.store_tokens(&tokens);
                self.notify(SessionEvent::Refreshed);
                debug!("Token refresh succeeded");
                Ok(tokens)
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                // A login that landed meanwhile stored a pair this failure
                // says nothing about.
                if self.credentials.refresh_token().as_deref() == Some(refresh_token.as_str()) {
                    self.expire_session();
                }
                Err(ApiError::Auth(format!("Session refresh failed: {}", e)))
            }
        }
    }

    /// Drop cached entries whose key contains `pattern`.
    pub fn invalidate(&self, pattern: &str) -> usize {
        self.cache.invalidate(pattern)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    // ===== Pipeline =====

    async fn write<T: DeserializeOwned>(&self, request: RequestDescriptor) -> Result<T, ApiError> {
        let endpoint = request.endpoint.clone();
        let value = self.execute(request).await?;

        let mut removed = 0;
        for pattern in self.rules.patterns_for(&endpoint) {
            removed += self.cache.invalidate(&pattern);
        }
        debug!(endpoint = %endpoint, removed, "Invalidated cache after write");

        decode(value)
    }

    /// Run a request to completion: `send`, and on a 401 refresh once and
    /// replay. A rejected replay or a 403 ends the session.
    async fn execute(&self, request: RequestDescriptor) -> Result<Value, ApiError> {
        let mut request = request;
        loop {
            let sent_with = self.credentials.access_token();
            let (status, body) = self.send(&request, sent_with.as_deref()).await?;

            if status.is_success() {
                return parse_body(status, &body);
            }

            if status == StatusCode::UNAUTHORIZED && request.may_refresh() {
                debug!(endpoint = %request.endpoint, "Access token rejected, refreshing");
                self.recover_session(sent_with.as_deref()).await?;
                request = request.replay();
                continue;
            }

            let session_rejected = match status {
                StatusCode::UNAUTHORIZED => request.retried,
                StatusCode::FORBIDDEN => request.refresh_on_auth_failure,
                _ => false,
            };
            if session_rejected && sent_with.is_some() {
                self.expire_session_sent_with(&request, sent_with.as_deref());
            }

            return Err(ApiError::from_status(status, &body));
        }
    }

    async fn send(
        &self,
        request: &RequestDescriptor,
        access_token: Option<&str>,
    ) -> Result<(StatusCode, String), ApiError> {
        let url = format!("{}{}", self.base_url, request.endpoint);

        let mut builder = self
            .client
            .request(request.method.as_reqwest(), &url)
            .header(header::ACCEPT, "application/json");
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        if let Some(token) = access_token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(
            method = ?request.method,
            endpoint = %request.endpoint,
            retried = request.retried,
            "Sending request"
        );

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    /// End the session after the backend rejected `request`, unless the
    /// token it carried has been replaced since.
    fn expire_session_sent_with(&self, request: &RequestDescriptor, sent_with: Option<&str>) {
        if self.credentials.access_token().as_deref() != sent_with {
            debug!(endpoint = %request.endpoint, "Rejected token already replaced");
            return;
        }
        warn!(endpoint = %request.endpoint, retried = request.retried, "Session rejected by backend");
        self.expire_session();
    }

    fn expire_session(&self) {
        self.credentials.purge();
        self.notify(SessionEvent::Expired);
    }

    fn notify(&self, event: SessionEvent) {
        if let Some(sender) = &self.events {
            if let Err(e) = sender.try_send(event) {
                debug!(?event, error = %e, "Session event dropped");
            }
        }
    }
}

impl std::fmt::Debug for ApiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiGateway")
            .field("base_url", &self.base_url)
            .field("cache_enabled", &self.cache_enabled)
            .finish()
    }
}

fn parse_body(status: StatusCode, body: &str) -> Result<Value, ApiError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| ApiError::invalid_response(status, e))
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::invalid_response(StatusCode::OK, e))
}

fn to_body<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Validation(format!("Invalid request body: {}", e)))
}
