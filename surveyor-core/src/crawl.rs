//! Crawl orchestration for front-ends: wires configuration, the HTTP
//! session, and progress reporting around the scanner's crawl loop.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use surveyor_scanner::Crawler;
use surveyor_scanner::config::{Credentials, CrawlLimits, LinkRules};
use surveyor_scanner::crawler::ProgressCallback;
use surveyor_scanner::driver::HttpSession;
use surveyor_scanner::element::SiteModel;
use url::Url;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub start_url: String,
    pub limits: CrawlLimits,
    pub credentials: Credentials,
    pub rules: LinkRules,
    pub show_progress: bool,
}

/// Execute a crawl with the given options and return the site model.
///
/// Per-page failures are absorbed inside the crawl loop; the only fatal
/// errors here are an unusable start URL and a session that cannot be
/// constructed at all.
pub async fn execute_crawl(options: CrawlOptions) -> Result<SiteModel> {
    let CrawlOptions {
        start_url,
        limits,
        credentials,
        rules,
        show_progress,
    } = options;

    let host = Url::parse(&start_url)
        .with_context(|| format!("Invalid start URL: {start_url}"))?
        .host_str()
        .with_context(|| format!("Start URL has no host: {start_url}"))?
        .to_string();

    let client_timeout_secs = (limits.timeout_ms / 1000).max(1);
    let session = HttpSession::with_timeout(client_timeout_secs)
        .context("Failed to create HTTP session")?
        .with_restrict_host(host);

    // Single spinner for overall crawl progress (only if enabled)
    let progress_bar = if show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    let progress_callback: ProgressCallback = match progress_bar {
        Some(ref pb) => {
            let pb = pb.clone();
            let budget = limits.max_pages;
            Arc::new(move |count: usize, url: String| {
                pb.set_message(format!("Scanning page {count}/{budget}: {url}"));
                pb.tick();
            })
        }
        None => Arc::new(|_count: usize, _url: String| {}),
    };

    let mut crawler = Crawler::new(session)
        .with_credentials(credentials)
        .with_rules(rules)
        .with_limits(limits)
        .with_progress_callback(progress_callback);

    let model = crawler.crawl(&start_url).await?;

    if let Some(ref pb) = progress_bar {
        pb.finish_with_message(format!("Crawl complete! {} pages scanned", model.len()));
    }

    Ok(model)
}
