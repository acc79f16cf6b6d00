use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Access/refresh pair issued by login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Display-only profile of the logged-in admin. Carries no authority;
/// the bearer token alone authorizes requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub phone_number: String,
    #[serde(default = "default_is_admin")]
    pub is_admin: bool,
    pub last_login: Option<DateTime<Utc>>,
}

fn default_is_admin() -> bool {
    true
}

impl UserProfile {
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            is_admin: true,
            last_login: Some(Utc::now()),
        }
    }
}
