//! The crawl loop: frontier in, site model out.

use crate::classifier::classify;
use crate::config::{Credentials, CrawlLimits, LinkRules};
use crate::driver::Driver;
use crate::element::{PageRecord, SiteModel};
use crate::error::{Result, ScanError};
use crate::filter;
use crate::frontier::Frontier;
use crate::login::LoginEngine;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

/// Reports (pages scanned so far, url being scanned) as the crawl runs.
pub type ProgressCallback = Arc<dyn Fn(usize, String) + Send + Sync>;

/// Sequential crawl over a single driver session. Pages are scanned one at
/// a time; per-page failures are logged and skipped, never fatal.
pub struct Crawler<D: Driver> {
    driver: D,
    credentials: Credentials,
    rules: LinkRules,
    limits: CrawlLimits,
    progress_callback: Option<ProgressCallback>,
}

impl<D: Driver> Crawler<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            credentials: Credentials::default(),
            rules: LinkRules::default(),
            limits: CrawlLimits::default(),
            progress_callback: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_rules(mut self, rules: LinkRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_limits(mut self, limits: CrawlLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Crawl from `start_url` until the frontier is exhausted or the page
    /// budget is spent. Returns the site model keyed by normalized URL.
    pub async fn crawl(&mut self, start_url: &str) -> Result<SiteModel> {
        let parsed = Url::parse(start_url)
            .map_err(|e| ScanError::InvalidUrl(format!("{start_url}: {e}")))?;
        let domain = parsed
            .host_str()
            .ok_or_else(|| ScanError::InvalidUrl(format!("{start_url}: no host")))?
            .to_ascii_lowercase();

        info!(
            "Starting crawl of {} (budget: {} pages, timeout: {}ms)",
            start_url, self.limits.max_pages, self.limits.timeout_ms
        );

        let mut frontier = Frontier::new(self.limits.max_pages);
        frontier.enqueue(start_url);

        // Both the login flag and the model are scoped to this run
        let mut login = LoginEngine::new();
        let mut model = SiteModel::new();

        while !frontier.is_exhausted() {
            let Some(url) = frontier.dequeue() else {
                break;
            };
            if let Some(ref callback) = self.progress_callback {
                callback(frontier.visited_count(), url.clone());
            }

            info!("Scanning: {}", url);
            if let Err(e) = self.driver.navigate(&url, self.limits.timeout()).await {
                // The URL stays visited so it is never retried
                warn!("Failed to load {}: {}", url, e);
                continue;
            }

            let record = match self.scan_page(&mut login, &url).await {
                Ok(record) => record,
                Err(e) => {
                    warn!("Failed to scan {}: {}", url, e);
                    continue;
                }
            };

            for link in &record.links {
                if filter::is_allowed(link, &domain, &self.rules) {
                    frontier.enqueue(&link.url);
                }
            }
            model.insert(url, record);
        }

        info!(
            "Crawl complete: {} pages scanned, {} links still queued",
            model.len(),
            frontier.pending_count()
        );
        Ok(model)
    }

    /// Snapshot, opportunistic login, classify. The snapshot and links are
    /// taken before the login attempt so a login-triggered navigation
    /// cannot lose the page's data.
    async fn scan_page(&mut self, login: &mut LoginEngine, url: &str) -> Result<PageRecord> {
        let elements = self.driver.extract_elements().await?;
        let links = self.driver.extract_links().await?;

        let outcome = login
            .try_login(&mut self.driver, &self.credentials, &elements, url)
            .await;
        debug!("Login outcome on {}: {:?}", url, outcome);

        Ok(PageRecord {
            categories: classify(&elements),
            links,
        })
    }

    /// Hand the driver session back, e.g. to continue in an authenticated
    /// state after the crawl.
    pub fn into_driver(self) -> D {
        self.driver
    }
}
