//! REST gateway for the admin backend.
//!
//! This module provides the `ApiGateway`, the single path every backend
//! call takes. It attaches bearer credentials, serves GETs from the cache,
//! invalidates cached reads after writes, and recovers once from an expired
//! access token by refreshing it.

pub mod client;
pub mod endpoints;
pub mod error;
pub mod invalidation;
pub mod request;

pub use client::{ApiGateway, SessionEvent, SESSION_EVENT_BUFFER};
pub use error::{ApiError, ErrorKind};
pub use invalidation::{default_rules, InvalidationRules};
pub use request::{
    cache_key, ApiResponse, GetOptions, Method, QueryParams, RequestDescriptor, ResponseSource,
};
