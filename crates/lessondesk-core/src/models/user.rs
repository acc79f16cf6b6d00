use serde::{Deserialize, Serialize};

use crate::utils::contains_ignore_case;

/// A registered learner from `/api/admin/users`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Student {
    pub id: i64,
    #[serde(default)]
    pub telegram_id: Option<i64>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            format!("User #{}", self.id)
        } else {
            parts.join(" ")
        }
    }

    /// Up to two uppercase initials, "A" when no name is known.
    pub fn initials(&self) -> String {
        let initial = |s: &Option<String>| {
            s.as_deref()
                .and_then(|name| name.chars().next())
                .map(|c| c.to_uppercase().to_string())
                .unwrap_or_default()
        };
        let initials = format!("{}{}", initial(&self.first_name), initial(&self.last_name));
        if initials.is_empty() {
            "A".to_string()
        } else {
            initials
        }
    }

    pub fn telegram_link(&self) -> Option<String> {
        self.telegram_id
            .map(|id| format!("https://t.me/user?id={}", id))
    }

    /// Case-insensitive match on first or last name, plain match on phone.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let name_match = [&self.first_name, &self.last_name]
            .into_iter()
            .flatten()
            .any(|name| contains_ignore_case(name, query));
        name_match
            || self
                .phone_number
                .as_deref()
                .is_some_and(|phone| phone.contains(query))
    }
}

/// One row of `/api/leaderboard/leaderboard`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct LeaderboardEntry {
    pub user_id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub total_points: i64,
    #[serde(default)]
    pub rank: Option<u32>,
}
