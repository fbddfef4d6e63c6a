//! Decides whether a discovered link may enter the frontier.
//!
//! Pure decision function; malformed links are dropped here instead of
//! erroring past this boundary.

use crate::config::LinkRules;
use crate::element::Link;
use tracing::debug;
use url::Url;

/// Binary/media resources are recorded by the classifier as downloads but
/// never queued for navigation.
const SKIP_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "svg", "pdf", "zip", "docx", "exe", "dmg",
];

/// Following one of these would tear down the authenticated session the
/// login engine just established.
const SESSION_KILLERS: &[&str] = &["logout", "signout"];

/// Apply the full rule chain to one candidate link.
///
/// Order matters: parseability, same-host, extension, logout text, then
/// the include/exclude substring rules (exclude wins over include).
pub fn is_allowed(link: &Link, domain: &str, rules: &LinkRules) -> bool {
    let parsed = match Url::parse(&link.url) {
        Ok(parsed) => parsed,
        Err(_) => {
            debug!("Dropping unparsable link: {}", link.url);
            return false;
        }
    };

    let host = parsed.host_str().unwrap_or("");
    if !host.eq_ignore_ascii_case(domain) {
        debug!("Dropping off-domain link: {} (host {})", link.url, host);
        return false;
    }

    if has_skip_extension(parsed.path()) {
        debug!("Dropping binary/media link: {}", link.url);
        return false;
    }

    if mentions_session_killer(link, &parsed) {
        debug!("Dropping logout/signout link: {}", link.url);
        return false;
    }

    if rules.is_active() && !passes_rules(&link.url, rules) {
        debug!("Dropping rule-filtered link: {}", link.url);
        return false;
    }

    true
}

fn has_skip_extension(path: &str) -> bool {
    path.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .is_some_and(|ext| SKIP_EXTENSIONS.contains(&ext.as_str()))
}

fn mentions_session_killer(link: &Link, parsed: &Url) -> bool {
    let path = parsed.path().to_ascii_lowercase();
    let text = link
        .text
        .as_deref()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    SESSION_KILLERS
        .iter()
        .any(|kw| text.contains(kw) || path.contains(kw))
}

fn passes_rules(url: &str, rules: &LinkRules) -> bool {
    // Exclude takes precedence over include
    if rules.exclude.iter().any(|rule| url.contains(rule.as_str())) {
        return false;
    }
    if !rules.include.is_empty() && !rules.include.iter().any(|rule| url.contains(rule.as_str())) {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_rules() -> LinkRules {
        LinkRules::default()
    }

    #[test]
    fn allows_same_domain_page() {
        let link = Link::new("https://x.com/about");
        assert!(is_allowed(&link, "x.com", &no_rules()));
    }

    #[test]
    fn rejects_unparsable() {
        let link = Link::new("not a url");
        assert!(!is_allowed(&link, "x.com", &no_rules()));
    }

    #[test]
    fn rejects_other_domain() {
        let link = Link::new("https://evil.com/about");
        assert!(!is_allowed(&link, "x.com", &no_rules()));
    }

    #[test]
    fn host_comparison_is_case_insensitive() {
        let link = Link::new("https://X.com/about");
        assert!(is_allowed(&link, "x.com", &no_rules()));
    }

    #[test]
    fn rejects_binary_and_media_paths() {
        for url in [
            "https://x.com/photo.PNG",
            "https://x.com/report.pdf",
            "https://x.com/release.zip",
            "https://x.com/setup.exe",
        ] {
            assert!(!is_allowed(&Link::new(url), "x.com", &no_rules()), "{url}");
        }
    }

    #[test]
    fn rejects_logout_links_regardless_of_rules() {
        let by_text = Link::with_text("https://x.com/account", "Logout");
        assert!(!is_allowed(&by_text, "x.com", &no_rules()));

        let by_text_upper = Link::with_text("https://x.com/account", "SIGNOUT NOW");
        assert!(!is_allowed(&by_text_upper, "x.com", &no_rules()));

        let by_path = Link::new("https://x.com/logout");
        assert!(!is_allowed(&by_path, "x.com", &no_rules()));

        // Even when an include rule matches it
        let rules = LinkRules {
            include: vec!["/account".to_string()],
            exclude: vec![],
        };
        assert!(!is_allowed(&by_text, "x.com", &rules));
    }

    #[test]
    fn exclude_wins_over_include() {
        let rules = LinkRules {
            include: vec!["/docs".to_string()],
            exclude: vec!["/admin".to_string()],
        };
        let link = Link::new("https://x.com/docs/admin");
        assert!(!is_allowed(&link, "x.com", &rules));
    }

    #[test]
    fn include_requires_a_match_when_present() {
        let rules = LinkRules {
            include: vec!["/docs".to_string()],
            exclude: vec![],
        };
        assert!(is_allowed(
            &Link::new("https://x.com/docs/intro"),
            "x.com",
            &rules
        ));
        assert!(!is_allowed(&Link::new("https://x.com/blog"), "x.com", &rules));
    }

    #[test]
    fn empty_rules_filter_nothing() {
        let link = Link::new("https://x.com/anything/at/all");
        assert!(is_allowed(&link, "x.com", &no_rules()));
    }
}
