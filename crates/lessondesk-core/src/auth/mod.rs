//! Authentication module for the admin session.
//!
//! This module provides:
//! - `CredentialStore`: access/refresh tokens and profile, persisted through
//!   the injected `PersistentStore`
//! - `AuthState`: the session state machine
//! - `AuthContext`: login, restore, refresh and logout on top of the gateway

pub mod credentials;
pub mod session;
pub mod state;

pub use credentials::CredentialStore;
pub use session::AuthContext;
pub use state::{AuthEvent, AuthState};
