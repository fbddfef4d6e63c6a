//! Human-readable report over a site model.

use chrono::Local;
use colored::Colorize;
use std::collections::BTreeMap;
use surveyor_scanner::element::{CategorySet, PageRecord, SiteModel};
use url::Url;

/// Bucket labels in report order, with accessors.
const CATEGORIES: &[(&str, fn(&CategorySet) -> usize)] = &[
    ("UI components", |c| c.ui_components.len()),
    ("Clickable controls", |c| c.clickable_controls.len()),
    ("Input fields", |c| c.input_fields.len()),
    ("Forms", |c| c.forms.len()),
    ("Authentication points", |c| c.authentication_points.len()),
    ("Navigation paths", |c| c.navigation_paths.len()),
    ("File upload", |c| c.file_upload.len()),
    ("File download", |c| c.file_download.len()),
    ("Drag & drop", |c| c.drag_drop.len()),
    ("Generic DOM anchors", |c| c.generic_dom.len()),
];

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() { "/".to_string() } else { path }
        })
        .unwrap_or_else(|| url.to_string())
}

/// Generate a scan report from a site model
pub fn generate_scan_report(model: &SiteModel) -> String {
    let mut report = String::new();
    report.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");
    report.push_str(&format!("{}\n", "# Summary:".bold()));
    report.push_str(&format!("  Scanned at: {}\n", Local::now().format("%Y-%m-%d %H:%M:%S")));
    report.push_str(&format!("  Pages scanned: {}\n\n", model.len()));

    for (label, count_of) in CATEGORIES {
        let total: usize = model.pages.values().map(|p| count_of(&p.categories)).sum();
        report.push_str(&format!("  {:<22} {}\n", format!("{label}:"), total));
    }

    report.push_str("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n\n");

    // Group pages by host
    let mut by_host: BTreeMap<String, Vec<(&String, &PageRecord)>> = BTreeMap::new();
    for (url, record) in &model.pages {
        if let Ok(parsed) = Url::parse(url)
            && let Some(host) = parsed.host_str()
        {
            by_host.entry(host.to_string()).or_default().push((url, record));
        }
    }

    for (host, pages) in &by_host {
        report.push_str(&format!("{}\n", format!("## {host}").cyan().bold()));
        report.push_str(&format!("  {} pages scanned\n\n", pages.len()));

        for (url, record) in pages {
            let path = extract_url_path(url);
            let categories = &record.categories;

            let mut line = format!("  {} ({} elements)", path.bold(), categories.total());
            let auth = categories.authentication_points.len();
            if auth > 0 {
                line.push_str(&format!(" {}", format!("[{auth} auth]").red()));
            }
            let forms = categories.forms.len();
            if forms > 0 {
                line.push_str(&format!(" {}", format!("[{forms} forms]").yellow()));
            }
            let uploads = categories.file_upload.len();
            if uploads > 0 {
                line.push_str(&format!(" {}", format!("[{uploads} upload]").magenta()));
            }
            report.push_str(&line);
            report.push('\n');
        }
        report.push('\n');
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_of_root_url() {
        assert_eq!(extract_url_path("http://example.com"), "/");
        assert_eq!(extract_url_path("http://example.com/"), "/");
    }

    #[test]
    fn path_of_nested_url() {
        assert_eq!(extract_url_path("http://example.com/a/b?q=1"), "/a/b");
    }

    #[test]
    fn path_of_invalid_url_is_the_input() {
        assert_eq!(extract_url_path("not a url"), "not a url");
    }
}
