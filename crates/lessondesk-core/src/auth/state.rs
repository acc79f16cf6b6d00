//! Admin session state machine.
//!
//! ```text
//! Unauthenticated --LoginStarted--> Authenticating --LoginSucceeded--> Authenticated
//!                                                  --LoginFailed-----> Unauthenticated
//! Authenticated   --RefreshStarted--> Refreshing --RefreshSucceeded--> Authenticated
//!                                                --RefreshFailed----> Unauthenticated
//! any             --LoggedOut--> Unauthenticated
//! ```
//!
//! Transitions are pure: `transition` consumes a state and an event and
//! returns the next state. An event that makes no sense in the current
//! state leaves it unchanged.

use crate::models::UserProfile;

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Unauthenticated { error: Option<String> },
    Authenticating,
    Authenticated { user: Option<UserProfile> },
    Refreshing { user: Option<UserProfile> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    /// Stored credentials found at startup.
    Restored { user: Option<UserProfile> },
    LoginStarted,
    LoginSucceeded { user: UserProfile },
    LoginFailed { error: String },
    RefreshStarted,
    RefreshSucceeded,
    RefreshFailed { error: String },
    LoggedOut,
    ErrorCleared,
}

impl Default for AuthState {
    fn default() -> Self {
        AuthState::Unauthenticated { error: None }
    }
}

impl AuthState {
    pub fn transition(self, event: AuthEvent) -> AuthState {
        use AuthEvent as E;
        use AuthState as S;

        match (self, event) {
            (_, E::LoggedOut) => S::Unauthenticated { error: None },

            (S::Unauthenticated { .. }, E::Restored { user }) => S::Authenticated { user },
            (S::Unauthenticated { .. }, E::LoginStarted) => S::Authenticating,
            (S::Unauthenticated { .. }, E::ErrorCleared) => S::Unauthenticated { error: None },

            (S::Authenticating, E::LoginSucceeded { user }) => S::Authenticated { user: Some(user) },
            (S::Authenticating, E::LoginFailed { error }) => S::Unauthenticated { error: Some(error) },

            (S::Authenticated { user }, E::RefreshStarted) => S::Refreshing { user },
            (S::Refreshing { user }, E::RefreshSucceeded) => S::Authenticated { user },
            (S::Authenticated { .. } | S::Refreshing { .. }, E::RefreshFailed { error }) => {
                S::Unauthenticated { error: Some(error) }
            }

            (state, _) => state,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. } | AuthState::Refreshing { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Authenticating | AuthState::Refreshing { .. })
    }

    pub fn user(&self) -> Option<&UserProfile> {
        match self {
            AuthState::Authenticated { user } | AuthState::Refreshing { user } => user.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AuthState::Unauthenticated { error } => error.as_deref(),
            _ => None,
        }
    }
}
