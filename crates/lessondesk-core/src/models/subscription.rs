use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::api::QueryParams;

/// Subscriptions ending within this many days are flagged as expiring.
const EXPIRING_SOON_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub amount: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Active,
    ExpiringSoon,
    Expired,
    Inactive,
}

impl SubscriptionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::ExpiringSoon => "expiring",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Inactive => "inactive",
        }
    }
}

/// Parse an ISO date or datetime string into a UTC instant.
fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(s.get(..10)?, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

impl Subscription {
    /// Whole days until `end_date`, negative once it has passed.
    pub fn days_remaining_at(&self, now: DateTime<Utc>) -> Option<i64> {
        let end = parse_date(self.end_date.as_deref()?)?;
        Some((end - now).num_days())
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> SubscriptionStatus {
        if !self.is_active {
            return SubscriptionStatus::Inactive;
        }
        match self.end_date.as_deref().and_then(parse_date) {
            Some(end) if end < now => SubscriptionStatus::Expired,
            Some(end) if (end - now).num_days() <= EXPIRING_SOON_DAYS => {
                SubscriptionStatus::ExpiringSoon
            }
            _ => SubscriptionStatus::Active,
        }
    }

    pub fn status(&self) -> SubscriptionStatus {
        self.status_at(Utc::now())
    }

    pub fn days_remaining(&self) -> Option<i64> {
        self.days_remaining_at(Utc::now())
    }
}

/// Paging and filtering for `/api/subscription/admin/subscriptions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionFilters {
    pub active_only: bool,
    pub skip: u32,
    pub limit: u32,
}

impl Default for SubscriptionFilters {
    fn default() -> Self {
        Self {
            active_only: false,
            skip: 0,
            limit: 20,
        }
    }
}

impl SubscriptionFilters {
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.insert("active_only".to_string(), self.active_only.to_string());
        params.insert("skip".to_string(), self.skip.to_string());
        params.insert("limit".to_string(), self.limit.to_string());
        params
    }
}

/// Storefront settings from `/api/subscription/admin/business`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(default)]
pub struct BusinessProfile {
    pub company_name: Option<String>,
    pub support_email: Option<String>,
    pub telegram_url: Option<String>,
    pub instagram_url: Option<String>,
    pub website_url: Option<String>,
    pub required_app_version: Option<String>,
}
