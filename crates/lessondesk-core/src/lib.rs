//! Core library for the lessondesk admin console.
//!
//! All backend traffic goes through [`api::ApiGateway`]. The gateway attaches
//! bearer credentials, answers GETs from a TTL-bound [`cache::CacheStore`],
//! and performs one token refresh and replay when the backend rejects the
//! access token. [`auth::AuthContext`] drives the admin session on top of it.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiError, ApiGateway, ApiResponse, ErrorKind, GetOptions, ResponseSource, SessionEvent};
pub use auth::{AuthContext, AuthEvent, AuthState, CredentialStore};
pub use cache::{CacheStore, FileStorage, MemoryStorage, PersistentStore};
pub use config::Config;
