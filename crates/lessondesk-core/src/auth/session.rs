use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::endpoints::ADMIN_STATS;
use crate::api::{ApiError, ApiGateway, GetOptions, QueryParams, SessionEvent, SESSION_EVENT_BUFFER};
use crate::models::{AdminStats, UserProfile};
use crate::utils::{validate_password, validate_phone_number};

use super::state::{AuthEvent, AuthState};

/// Shown when the gateway gave up on the session.
const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

/// Owns the admin session: the auth state plus the gateway that serves it.
pub struct AuthContext {
    gateway: ApiGateway,
    state: AuthState,
    events: mpsc::Receiver<SessionEvent>,
}

impl AuthContext {
    /// Wrap `gateway`, subscribing to its session events.
    pub fn new(gateway: ApiGateway) -> Self {
        let (sender, events) = mpsc::channel(SESSION_EVENT_BUFFER);
        Self {
            gateway: gateway.with_events(sender),
            state: AuthState::default(),
            events,
        }
    }

    pub fn gateway(&self) -> &ApiGateway {
        &self.gateway
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.state.user()
    }

    fn apply(&mut self, event: AuthEvent) {
        let previous = std::mem::take(&mut self.state);
        self.state = previous.transition(event);
        debug!(state = ?self.state, "Auth state updated");
    }

    /// Derive the state from stored credentials.
    pub fn restore(&mut self) -> &AuthState {
        let credentials = self.gateway.credentials();
        if credentials.is_authenticated() {
            let user = credentials.user();
            self.apply(AuthEvent::Restored { user });
        } else {
            self.apply(AuthEvent::LoggedOut);
        }
        &self.state
    }

    /// Confirm a restored session still works with an uncached stats call.
    ///
    /// An `Auth` failure ends the session. Other failures leave it in place
    /// and are returned for the caller to report.
    pub async fn verify(&mut self) -> Result<(), ApiError> {
        if !self.state.is_authenticated() {
            return Ok(());
        }

        let result = self
            .gateway
            .get::<AdminStats>(ADMIN_STATS, QueryParams::new(), GetOptions::uncached())
            .await;
        self.sync_events();

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.is_auth() => {
                warn!(error = %e, "Stored session rejected");
                self.logout();
                Err(e)
            }
            Err(e) => {
                warn!(error = %e, "Could not verify session, keeping it");
                Err(e)
            }
        }
    }

    /// Validate the input, then log in.
    ///
    /// Invalid input is a `Validation` error and sends nothing. It only
    /// lands in `state().error()` when no session is active; an active
    /// session is left as it was.
    pub async fn login(&mut self, phone: &str, password: &str) -> Result<UserProfile, ApiError> {
        self.sync_events();

        let phone = match validate_phone_number(phone)
            .and_then(|phone| validate_password(password).map(|_| phone))
        {
            Ok(phone) => phone,
            Err(e) => {
                let message = e.to_string();
                if matches!(self.state, AuthState::Unauthenticated { .. }) {
                    self.apply(AuthEvent::LoginStarted);
                    self.apply(AuthEvent::LoginFailed {
                        error: message.clone(),
                    });
                }
                return Err(ApiError::Validation(message));
            }
        };

        if self.state.is_authenticated() {
            self.apply(AuthEvent::LoggedOut);
        }
        self.apply(AuthEvent::LoginStarted);

        match self.gateway.login(&phone, password).await {
            Ok(_) => {
                let user = UserProfile::new(phone);
                self.gateway.credentials().store_user(&user);
                self.apply(AuthEvent::LoginSucceeded { user: user.clone() });
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.apply(AuthEvent::LoginFailed {
                    error: login_failure_message(&e),
                });
                Err(e)
            }
        }
    }

    /// Refresh the token pair now. A failure ends the session.
    pub async fn refresh_session(&mut self) -> Result<(), ApiError> {
        self.sync_events();
        let result = self.gateway.refresh_credentials().await;
        self.sync_events();

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                // The gateway already purged credentials; make sure the
                // state follows even if its event was dropped.
                if self.state.is_authenticated() {
                    self.gateway.clear_cache();
                    self.apply(AuthEvent::RefreshFailed {
                        error: SESSION_EXPIRED_MESSAGE.to_string(),
                    });
                }
                Err(e)
            }
        }
    }

    /// Forget credentials and cached data.
    pub fn logout(&mut self) {
        self.gateway.credentials().purge();
        self.gateway.clear_cache();
        while self.events.try_recv().is_ok() {}
        self.apply(AuthEvent::LoggedOut);
        info!("Logged out");
    }

    /// Apply session events the gateway reported since the last call.
    pub fn sync_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                SessionEvent::Refreshing => self.apply(AuthEvent::RefreshStarted),
                SessionEvent::Refreshed => self.apply(AuthEvent::RefreshSucceeded),
                SessionEvent::Expired => {
                    self.gateway.clear_cache();
                    self.apply(AuthEvent::RefreshFailed {
                        error: SESSION_EXPIRED_MESSAGE.to_string(),
                    });
                }
            }
        }
    }

    pub fn clear_error(&mut self) {
        self.apply(AuthEvent::ErrorCleared);
    }
}

fn login_failure_message(error: &ApiError) -> String {
    match error {
        ApiError::Auth(message) | ApiError::Validation(message) => message.clone(),
        other => other.user_message(),
    }
}
