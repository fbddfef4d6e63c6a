//! Read-only configuration passed into a crawl. Loading these from disk is
//! the front-end's job; the engine treats them as already validated.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Login credentials for the opportunistic login attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Prefer the email over the username when both are configured.
    #[serde(default)]
    pub use_email: bool,
}

impl Credentials {
    /// A login attempt needs an identity plus a password; anything less and
    /// the login engine never triggers.
    pub fn usable(&self) -> bool {
        (self.username.is_some() || self.email.is_some()) && self.password.is_some()
    }
}

/// Substring rules applied to discovered links. Exclude always wins over
/// include; an empty rule set disables rule filtering entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkRules {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl LinkRules {
    pub fn is_active(&self) -> bool {
        !self.include.is_empty() || !self.exclude.is_empty()
    }
}

/// Crawl bounds: page budget and per-navigation timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlLimits {
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_max_pages() -> usize {
    50
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl CrawlLimits {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_need_identity_and_password() {
        let mut creds = Credentials::default();
        assert!(!creds.usable());

        creds.password = Some("hunter2".to_string());
        assert!(!creds.usable());

        creds.email = Some("a@b.com".to_string());
        assert!(creds.usable());

        creds.email = None;
        creds.username = Some("alice".to_string());
        assert!(creds.usable());
    }

    #[test]
    fn empty_rules_are_inactive() {
        assert!(!LinkRules::default().is_active());
        let rules = LinkRules {
            include: vec![],
            exclude: vec!["/admin".to_string()],
        };
        assert!(rules.is_active());
    }

    #[test]
    fn limits_default_from_partial_json() {
        let limits: CrawlLimits = serde_json::from_str(r#"{"max_pages": 10}"#).unwrap();
        assert_eq!(limits.max_pages, 10);
        assert_eq!(limits.timeout_ms, 30_000);
    }
}
