//! The automation capability the crawl engine drives.
//!
//! [`Driver`] is the seam between the engine and whatever loads pages:
//! a real browser session, or the bundled [`HttpSession`] which speaks
//! plain HTTP and parses the returned HTML without rendering it.

use crate::element::{Link, RawElement, Rect};
use crate::error::{Result, ScanError};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Truncation applied to element text at snapshot time.
const TEXT_LIMIT: usize = 50;

/// One automation session against the target site. Implementations hold
/// whatever page state they need; the engine never runs two navigations
/// concurrently against the same session.
#[async_trait]
pub trait Driver: Send {
    /// Load a page. Cross-host navigations are aborted by the session
    /// itself when a host restriction is configured, independent of any
    /// filtering the engine does.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Snapshot every element of the current page.
    async fn extract_elements(&mut self) -> Result<Vec<RawElement>>;

    /// Collect absolute outbound links with their visible text.
    async fn extract_links(&mut self) -> Result<Vec<Link>>;

    /// Fill the first control matching the CSS selector.
    async fn fill(&mut self, selector: &str, value: &str) -> Result<()>;

    /// Read back the current value of the first matching control.
    async fn read_value(&mut self, selector: &str) -> Result<String>;

    /// Activate the first matching control. Returns false when nothing
    /// matched; a matched control may trigger navigation.
    async fn click(&mut self, selector: &str) -> Result<bool>;

    /// Bounded wait for in-flight activity to quiesce.
    async fn wait_for_settle(&mut self, timeout: Duration) -> Result<()>;
}

/// What a click on the current page resolves to.
enum ClickAction {
    NoMatch,
    /// Control without form or target; nothing happens over plain HTTP.
    Inert,
    FollowLink(Url),
    SubmitForm {
        method: String,
        action: Url,
        fields: Vec<(String, String)>,
    },
}

/// Non-rendering [`Driver`] backed by an HTTP client and an HTML parser.
///
/// Pages are fetched, parsed, and walked; geometry is synthesized (hidden
/// controls get a zero rect, everything else a nominal one) since nothing
/// is laid out. Form fills are tracked by control name and replayed when a
/// submit control is clicked. Good enough for cooperative sites and test
/// fixtures; a real browser driver implements the same trait.
pub struct HttpSession {
    client: Client,
    restrict_host: Option<String>,
    current_url: Option<Url>,
    body: Option<String>,
    filled: HashMap<String, String>,
}

impl HttpSession {
    pub fn new() -> Result<Self> {
        Self::with_timeout(10)
    }

    pub fn with_timeout(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent("Surveyor/0.2 (https://github.com/trapdoorsec/surveyor)")
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(ScanError::HttpError)?;

        Ok(Self {
            client,
            restrict_host: None,
            current_url: None,
            body: None,
            filled: HashMap::new(),
        })
    }

    /// Abort any navigation that would leave this host.
    pub fn with_restrict_host(mut self, host: impl Into<String>) -> Self {
        self.restrict_host = Some(host.into());
        self
    }

    pub fn current_url(&self) -> Option<&Url> {
        self.current_url.as_ref()
    }

    fn check_host(&self, url: &Url) -> Result<()> {
        if let Some(ref host) = self.restrict_host {
            let target = url.host_str().unwrap_or("");
            if !target.eq_ignore_ascii_case(host) {
                return Err(ScanError::NavigationBlocked(format!(
                    "{} is outside {}",
                    url, host
                )));
            }
        }
        Ok(())
    }

    async fn load(&mut self, response: reqwest::Response) -> Result<()> {
        let final_url = response.url().clone();
        self.check_host(&final_url)?;

        let is_html = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("text/html"))
            .unwrap_or(false);
        let body = response.text().await?;

        debug!("Loaded {} ({} bytes, html: {})", final_url, body.len(), is_html);
        self.current_url = Some(final_url);
        self.body = Some(if is_html { body } else { String::new() });
        self.filled.clear();
        Ok(())
    }

    fn body(&self) -> Result<&str> {
        self.body.as_deref().ok_or(ScanError::NoPage)
    }

    fn parse_selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector).map_err(|e| ScanError::InvalidSelector(format!("{selector}: {e}")))
    }

    /// Resolve the `name` attribute of the first element matching the
    /// selector. Fills are keyed by name, the way a form submission is.
    fn resolve_control_name(&self, selector: &str) -> Result<Option<String>> {
        let parsed = Self::parse_selector(selector)?;
        let document = Html::parse_document(self.body()?);
        match document.select(&parsed).next() {
            Some(el) => Ok(el.value().attr("name").map(str::to_string)),
            None => Err(ScanError::NoMatch(selector.to_string())),
        }
    }

    /// Work out what clicking the first match would do, without doing it.
    /// Synchronous so no parsed document is held across an await.
    fn resolve_click(&self, selector: &str) -> Result<ClickAction> {
        let parsed = Self::parse_selector(selector)?;
        let base = self.current_url.clone().ok_or(ScanError::NoPage)?;
        let document = Html::parse_document(self.body()?);

        let Some(target) = document.select(&parsed).next() else {
            return Ok(ClickAction::NoMatch);
        };

        if target.value().name() == "a" {
            if let Some(href) = target.value().attr("href")
                && let Ok(resolved) = base.join(href)
            {
                return Ok(ClickAction::FollowLink(resolved));
            }
            return Ok(ClickAction::Inert);
        }

        let Some(form) = enclosing_form(target) else {
            return Ok(ClickAction::Inert);
        };

        let method = form
            .value()
            .attr("method")
            .unwrap_or("get")
            .to_ascii_lowercase();
        let action = match form.value().attr("action") {
            Some(action) if !action.is_empty() => base
                .join(action)
                .map_err(|e| ScanError::InvalidUrl(e.to_string()))?,
            _ => base,
        };

        let mut fields = Vec::new();
        for control in form_controls(form) {
            let Some(name) = control.value().attr("name") else {
                continue;
            };
            let value = match self.filled.get(name) {
                Some(filled) => filled.clone(),
                None => default_control_value(control),
            };
            fields.push((name.to_string(), value));
        }

        Ok(ClickAction::SubmitForm {
            method,
            action,
            fields,
        })
    }
}

#[async_trait]
impl Driver for HttpSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let target = Url::parse(url).map_err(|e| ScanError::InvalidUrl(e.to_string()))?;
        self.check_host(&target)?;

        let response = tokio::time::timeout(timeout, self.client.get(target).send())
            .await
            .map_err(|_| ScanError::Timeout(url.to_string()))??;
        self.load(response).await
    }

    async fn extract_elements(&mut self) -> Result<Vec<RawElement>> {
        let document = Html::parse_document(self.body()?);
        let mut elements = Vec::new();
        for node in document.root_element().descendants() {
            if let Some(el) = ElementRef::wrap(node) {
                elements.push(snapshot_element(el));
            }
        }
        Ok(elements)
    }

    async fn extract_links(&mut self) -> Result<Vec<Link>> {
        let base = self.current_url.clone().ok_or(ScanError::NoPage)?;
        let document = Html::parse_document(self.body()?);
        let anchor = Selector::parse("a[href]").expect("static selector");

        let mut links = Vec::new();
        for el in document.select(&anchor) {
            let href = el.value().attr("href").unwrap_or_default();
            if href.is_empty()
                || href.starts_with('#')
                || href.starts_with("javascript:")
                || href.starts_with("mailto:")
                || href.starts_with("tel:")
            {
                continue;
            }
            let Ok(mut resolved) = base.join(href) else {
                continue;
            };
            if !matches!(resolved.scheme(), "http" | "https") {
                continue;
            }
            resolved.set_fragment(None);
            let text = collapse_text(&el.text().collect::<String>());
            links.push(Link {
                url: resolved.to_string(),
                text,
            });
        }
        Ok(links)
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<()> {
        match self.resolve_control_name(selector)? {
            Some(name) => {
                self.filled.insert(name, value.to_string());
                Ok(())
            }
            None => {
                // Nameless control: the value would never reach the server
                warn!("Filled control without a name attribute: {}", selector);
                Ok(())
            }
        }
    }

    async fn read_value(&mut self, selector: &str) -> Result<String> {
        let parsed = Self::parse_selector(selector)?;
        let document = Html::parse_document(self.body()?);
        let Some(el) = document.select(&parsed).next() else {
            return Err(ScanError::NoMatch(selector.to_string()));
        };
        if let Some(name) = el.value().attr("name")
            && let Some(filled) = self.filled.get(name)
        {
            return Ok(filled.clone());
        }
        Ok(el.value().attr("value").unwrap_or_default().to_string())
    }

    async fn click(&mut self, selector: &str) -> Result<bool> {
        match self.resolve_click(selector)? {
            ClickAction::NoMatch => Ok(false),
            ClickAction::Inert => Ok(true),
            ClickAction::FollowLink(url) => {
                self.check_host(&url)?;
                let response = self.client.get(url).send().await?;
                self.load(response).await?;
                Ok(true)
            }
            ClickAction::SubmitForm {
                method,
                action,
                fields,
            } => {
                self.check_host(&action)?;
                debug!("Submitting form: {} {} ({} fields)", method, action, fields.len());
                let response = if method == "post" {
                    self.client.post(action).form(&fields).send().await?
                } else {
                    let mut target = action;
                    target
                        .query_pairs_mut()
                        .clear()
                        .extend_pairs(fields.iter().map(|(k, v)| (k.as_str(), v.as_str())));
                    self.client.get(target).send().await?
                };
                self.load(response).await?;
                Ok(true)
            }
        }
    }

    async fn wait_for_settle(&mut self, _timeout: Duration) -> Result<()> {
        // HTTP responses are settled by the time they arrive
        Ok(())
    }
}

fn snapshot_element(el: ElementRef<'_>) -> RawElement {
    let attributes: BTreeMap<String, String> = el
        .value()
        .attrs()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

    let ancestors = el
        .ancestors()
        .filter_map(ElementRef::wrap)
        .map(|a| a.value().name().to_string())
        .collect();

    RawElement {
        tag: el.value().name().to_string(),
        id: attributes.get("id").cloned(),
        class: attributes.get("class").cloned(),
        text: collapse_text(&el.text().collect::<String>()),
        rect: synthetic_rect(&attributes),
        attributes,
        ancestors,
    }
}

/// No layout happens here, so geometry is synthesized: anything a browser
/// would obviously not paint gets a zero rect (and is later dropped by the
/// classifier), everything else a nominal 1x1.
fn synthetic_rect(attributes: &BTreeMap<String, String>) -> Rect {
    let hidden = attributes.contains_key("hidden")
        || attributes.get("type").is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
        || attributes
            .get("style")
            .is_some_and(|s| s.replace(' ', "").contains("display:none"));
    if hidden {
        Rect::default()
    } else {
        Rect {
            x: 0,
            y: 0,
            width: 1,
            height: 1,
        }
    }
}

/// Collapse whitespace runs and truncate to the snapshot limit.
fn collapse_text(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    Some(collapsed.chars().take(TEXT_LIMIT).collect())
}

fn enclosing_form(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "form")
}

fn form_controls(form: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    form.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| matches!(el.value().name(), "input" | "textarea" | "select"))
        .collect()
}

fn default_control_value(control: ElementRef<'_>) -> String {
    match control.value().name() {
        "textarea" => control.text().collect::<String>(),
        "select" => control
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "option")
            .and_then(|opt| opt.value().attr("value").map(str::to_string))
            .unwrap_or_default(),
        _ => control
            .value()
            .attr("value")
            .unwrap_or_default()
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_text_squashes_and_truncates() {
        assert_eq!(
            collapse_text("  hello \n\t world  "),
            Some("hello world".to_string())
        );
        assert_eq!(collapse_text("   \n  "), None);

        let long = "a".repeat(80);
        assert_eq!(collapse_text(&long).unwrap().len(), TEXT_LIMIT);
    }

    #[test]
    fn synthetic_rect_zeroes_hidden_controls() {
        let visible = BTreeMap::from([("type".to_string(), "text".to_string())]);
        assert!(!synthetic_rect(&visible).is_empty());

        let hidden_type = BTreeMap::from([("type".to_string(), "hidden".to_string())]);
        assert!(synthetic_rect(&hidden_type).is_empty());

        let hidden_attr = BTreeMap::from([("hidden".to_string(), String::new())]);
        assert!(synthetic_rect(&hidden_attr).is_empty());

        let styled = BTreeMap::from([("style".to_string(), "display: none;".to_string())]);
        assert!(synthetic_rect(&styled).is_empty());
    }

    #[test]
    fn snapshot_records_ancestry_nearest_first() {
        let html = Html::parse_document(
            "<html><body><nav><ul><li><a href=\"/x\">X</a></li></ul></nav></body></html>",
        );
        let selector = Selector::parse("a").unwrap();
        let anchor = html.select(&selector).next().unwrap();
        let raw = snapshot_element(anchor);
        assert_eq!(raw.tag, "a");
        assert_eq!(
            raw.ancestors,
            vec!["li", "ul", "nav", "body", "html"]
        );
    }

    #[test]
    fn form_controls_and_defaults() {
        let html = Html::parse_document(
            r#"<form>
                <input name="q" value="preset">
                <textarea name="msg">body text</textarea>
                <select name="kind"><option value="a">A</option><option value="b">B</option></select>
                <input type="submit">
            </form>"#,
        );
        let selector = Selector::parse("form").unwrap();
        let form = html.select(&selector).next().unwrap();
        let controls = form_controls(form);
        assert_eq!(controls.len(), 4);
        assert_eq!(default_control_value(controls[0]), "preset");
        assert_eq!(default_control_value(controls[1]), "body text");
        assert_eq!(default_control_value(controls[2]), "a");
    }
}
