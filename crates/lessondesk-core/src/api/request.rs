//! Request descriptors, GET options and response wrappers.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;

/// Query parameters. A `BTreeMap` keeps them sorted, which makes the
/// serialized form canonical.
pub type QueryParams = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Method::Get)
    }

    pub(crate) fn as_reqwest(&self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// An outbound call. Immutable: a replay after a token refresh is a new
/// descriptor produced by [`RequestDescriptor::replay`].
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub endpoint: String,
    pub params: QueryParams,
    pub body: Option<Value>,
    /// Set on the single replay that follows a token refresh.
    pub retried: bool,
    /// Login and refresh calls must never trigger the refresh flow.
    pub refresh_on_auth_failure: bool,
}

impl RequestDescriptor {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            params: QueryParams::new(),
            body: None,
            retried: false,
            refresh_on_auth_failure: true,
        }
    }

    pub fn get(endpoint: impl Into<String>, params: QueryParams) -> Self {
        Self {
            params,
            ..Self::new(Method::Get, endpoint)
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn without_refresh(mut self) -> Self {
        self.refresh_on_auth_failure = false;
        self
    }

    /// The one permitted replay of this request.
    pub fn replay(&self) -> Self {
        Self {
            retried: true,
            ..self.clone()
        }
    }

    /// Whether a 401 on this request may start a token refresh.
    pub fn may_refresh(&self) -> bool {
        self.refresh_on_auth_failure && !self.retried
    }

    pub fn cache_key(&self) -> String {
        cache_key(&self.endpoint, &self.params)
    }
}

/// Cache key for `endpoint` with `params`: the endpoint, then `?` and the
/// form-urlencoded parameters sorted by name. No `?` when there are none.
pub fn cache_key(endpoint: &str, params: &QueryParams) -> String {
    if params.is_empty() {
        return endpoint.to_string();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter())
        .finish();
    format!("{}?{}", endpoint, query)
}

/// Per-call cache behaviour for GETs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GetOptions {
    pub use_cache: bool,
    /// Overrides the store's default TTL for the stored result.
    pub ttl: Option<Duration>,
    /// Skip the lookup but still store the fresh result.
    pub force_refresh: bool,
}

impl Default for GetOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            ttl: None,
            force_refresh: false,
        }
    }
}

impl GetOptions {
    pub fn uncached() -> Self {
        Self {
            use_cache: false,
            ..Self::default()
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }
}

/// Where a GET result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
}

/// A typed GET result plus its source.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
    pub source: ResponseSource,
}

impl<T> ApiResponse<T> {
    pub fn from_cache(data: T) -> Self {
        Self {
            data,
            source: ResponseSource::Cache,
        }
    }

    pub fn from_network(data: T) -> Self {
        Self {
            data,
            source: ResponseSource::Network,
        }
    }

    pub fn is_cached(&self) -> bool {
        self.source == ResponseSource::Cache
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            data: f(self.data),
            source: self.source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_canonical() {
        let mut a = QueryParams::new();
        a.insert("skip".into(), "0".into());
        a.insert("active_only".into(), "false".into());
        a.insert("limit".into(), "20".into());

        let mut b = QueryParams::new();
        b.insert("limit".into(), "20".into());
        b.insert("active_only".into(), "false".into());
        b.insert("skip".into(), "0".into());

        assert_eq!(cache_key("/api/x", &a), cache_key("/api/x", &b));
        assert_eq!(cache_key("/api/x", &a), "/api/x?active_only=false&limit=20&skip=0");
    }

    #[test]
    fn test_cache_key_without_params_and_with_escaping() {
        assert_eq!(cache_key("/api/admin/users", &QueryParams::new()), "/api/admin/users");

        let mut params = QueryParams::new();
        params.insert("q".into(), "a b&c".into());
        assert_eq!(cache_key("/api/admin/users", &params), "/api/admin/users?q=a+b%26c");
    }

    #[test]
    fn test_replay_is_marked_and_cannot_refresh_again() {
        let original = RequestDescriptor::get("/api/admin/stats", QueryParams::new());
        assert!(original.may_refresh());

        let replay = original.replay();
        assert!(replay.retried);
        assert!(!replay.may_refresh());
        assert!(!original.retried);
    }

    #[test]
    fn test_login_style_requests_never_refresh() {
        let login = RequestDescriptor::new(Method::Post, "/api/admin/login").without_refresh();
        assert!(!login.may_refresh());
        assert!(login.method.is_mutating());
    }

    #[test]
    fn test_get_options_builders() {
        let opts = GetOptions::default()
            .with_ttl(Duration::from_secs(1))
            .force_refresh(true);
        assert!(opts.use_cache);
        assert!(opts.force_refresh);
        assert_eq!(opts.ttl, Some(Duration::from_secs(1)));
        assert!(!GetOptions::uncached().use_cache);
    }
}
