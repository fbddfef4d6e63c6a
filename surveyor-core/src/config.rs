//! Configuration file loading for the front-ends.
//!
//! Missing files are tolerated: a crawl without credentials simply never
//! logs in, and a crawl without rules filters nothing. A file that exists
//! but fails to parse is an error worth surfacing.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use surveyor_scanner::config::{Credentials, LinkRules};
use tracing::debug;

/// Load credentials from a JSON file:
/// `{"username": "...", "email": "...", "password": "...", "use_email": false}`
pub fn load_credentials(path: &Path) -> Result<Credentials> {
    let Some(raw) = read_optional(path)? else {
        debug!("No credentials file at {}", path.display());
        return Ok(Credentials::default());
    };
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid credentials file: {}", path.display()))
}

/// Load link rules from a JSON file:
/// `{"include": ["/docs"], "exclude": ["/admin"]}`
pub fn load_link_rules(path: &Path) -> Result<LinkRules> {
    let Some(raw) = read_optional(path)? else {
        debug!("No link rules file at {}", path.display());
        return Ok(LinkRules::default());
    };
    serde_json::from_str(&raw)
        .with_context(|| format!("Invalid link rules file: {}", path.display()))
}

/// None for a missing or blank file, the contents otherwise.
fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(raw))
}
