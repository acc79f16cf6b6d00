//! Which cached reads a successful write makes stale.

/// Maps endpoint prefixes to the cache key patterns a write under that
/// prefix invalidates.
#[derive(Debug, Clone, Default)]
pub struct InvalidationRules {
    rules: Vec<(String, Vec<String>)>,
}

impl InvalidationRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule: a write to any endpoint starting with `prefix` drops every
    /// cache key containing one of `patterns`.
    pub fn rule<I, S>(mut self, prefix: impl Into<String>, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules
            .push((prefix.into(), patterns.into_iter().map(Into::into).collect()));
        self
    }

    /// Patterns to invalidate after a successful write to `endpoint`.
    ///
    /// Always includes the endpoint path itself (query stripped), so a
    /// cached copy of the written resource never outlives the write.
    pub fn patterns_for(&self, endpoint: &str) -> Vec<String> {
        let path = endpoint.split('?').next().unwrap_or(endpoint);

        let mut patterns = vec![path.to_string()];
        for (prefix, targets) in &self.rules {
            if path.starts_with(prefix.as_str()) {
                for target in targets {
                    if !patterns.contains(target) {
                        patterns.push(target.clone());
                    }
                }
            }
        }
        patterns
    }
}

/// The admin backend's resource families. Aggregate stats are counted from
/// content and users, so every content or user write invalidates them.
pub fn default_rules() -> InvalidationRules {
    use super::endpoints::*;

    InvalidationRules::new()
        .rule(
            "/api/education",
            [EDUCATION_LESSONS, EDUCATION_MODULES, EDUCATION_PACKS, ADMIN_STATS],
        )
        .rule("/api/quiz", ["/api/quiz", EDUCATION_LESSONS, ADMIN_STATS])
        .rule("/api/grammar", ["/api/grammar", ADMIN_STATS])
        .rule(ADMIN_USERS, [ADMIN_USERS, ADMIN_STATS, LEADERBOARD])
        .rule("/api/subscription", ["/api/subscription", ADMIN_STATS])
}
