use serde::{Deserialize, Serialize};

/// Platform-wide aggregates from `/api/admin/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(default)]
pub struct AdminStats {
    pub total_users: u64,
    pub active_users_last_7_days: u64,
    pub total_modules: u64,
    pub total_lessons: u64,
    pub total_packs: u64,
    pub total_words: u64,
    pub total_grammar_questions: u64,
    pub total_translations: u64,
}

impl AdminStats {
    /// Words plus grammar questions.
    pub fn total_content(&self) -> u64 {
        self.total_words + self.total_grammar_questions
    }

    /// Share of users active in the last 7 days, in percent.
    pub fn engagement_rate(&self) -> f64 {
        if self.total_users == 0 {
            return 0.0;
        }
        self.active_users_last_7_days as f64 / self.total_users as f64 * 100.0
    }

    pub fn content_per_user(&self) -> f64 {
        if self.total_users == 0 {
            return 0.0;
        }
        self.total_content() as f64 / self.total_users as f64
    }
}

/// Revenue figures from `/api/subscription/admin/financial`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(default)]
pub struct FinancialStats {
    pub total_revenue: f64,
    pub monthly_revenue: f64,
    pub total_paid_subscriptions: u64,
    pub active_subscriptions: u64,
    pub average_subscription_value: f64,
}
