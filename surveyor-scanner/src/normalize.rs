//! URL canonicalization for visited-set comparisons.
//!
//! Two URLs that normalize identically are the same page for dedup
//! purposes. This is deliberately a pure string transform: it never
//! reorders or re-encodes anything, it only drops the fragment and a
//! single trailing slash.

/// Canonicalize a URL: strip everything from the first `#`, then strip
/// exactly one trailing `/`. Idempotent.
pub fn normalize(url: &str) -> String {
    let without_fragment = match url.find('#') {
        Some(idx) => &url[..idx],
        None => url,
    };
    without_fragment
        .strip_suffix('/')
        .unwrap_or(without_fragment)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fragment() {
        assert_eq!(normalize("https://x.com/page#section"), "https://x.com/page");
    }

    #[test]
    fn strips_single_trailing_slash() {
        assert_eq!(normalize("https://x.com/page/"), "https://x.com/page");
    }

    #[test]
    fn strips_fragment_then_trailing_slash() {
        assert_eq!(normalize("https://x.com/page/#top"), "https://x.com/page");
    }

    #[test]
    fn keeps_query_string() {
        assert_eq!(
            normalize("https://x.com/page?a=1#frag"),
            "https://x.com/page?a=1"
        );
    }

    #[test]
    fn strips_only_one_trailing_slash() {
        assert_eq!(normalize("https://x.com/page//"), "https://x.com/page/");
    }

    #[test]
    fn untouched_url_passes_through() {
        assert_eq!(normalize("https://x.com/a/b"), "https://x.com/a/b");
    }

    #[test]
    fn idempotent() {
        for url in [
            "https://x.com/page/#section",
            "https://x.com/",
            "https://x.com/a?b=c",
            "",
        ] {
            let once = normalize(url);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn fragment_and_slash_variants_collapse() {
        let base = normalize("https://x.com/docs");
        assert_eq!(normalize("https://x.com/docs/"), base);
        assert_eq!(normalize("https://x.com/docs#intro"), base);
        assert_eq!(normalize("https://x.com/docs/#intro"), base);
    }
}
