use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Bounding box of an element at scan time, integer-rounded by the driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Zero-area elements are treated as not visibly present.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Immutable snapshot of a single DOM node.
///
/// Field names follow the wire format consumed by the downstream test-case
/// generator, so the serde renames here are load-bearing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementInfo {
    #[serde(rename = "tagName")]
    pub tag: String,
    pub id: Option<String>,
    #[serde(rename = "className")]
    pub class: Option<String>,
    pub text: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub rect: Rect,
    /// Synthetic marker (`image`, `image_link`) attached by the classifier.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
}

/// Driver-side element descriptor: an [`ElementInfo`] plus the ancestry the
/// classifier needs for landmark-nesting decisions. Ancestor tag names are
/// ordered nearest-first.
#[derive(Debug, Clone, PartialEq)]
pub struct RawElement {
    pub tag: String,
    pub id: Option<String>,
    pub class: Option<String>,
    pub text: Option<String>,
    pub attributes: BTreeMap<String, String>,
    pub rect: Rect,
    pub ancestors: Vec<String>,
}

impl RawElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The `type` attribute, lowercased (input types are case-insensitive).
    pub fn input_type(&self) -> Option<String> {
        self.attr("type").map(|t| t.to_ascii_lowercase())
    }

    pub fn name_attr(&self) -> Option<&str> {
        self.attr("name")
    }

    pub fn has_ancestor(&self, tags: &[&str]) -> bool {
        self.ancestors.iter().any(|a| tags.contains(&a.as_str()))
    }

    pub fn class_contains(&self, needle: &str) -> bool {
        self.class.as_deref().is_some_and(|c| c.contains(needle))
    }

    pub fn info(&self) -> ElementInfo {
        ElementInfo {
            tag: self.tag.clone(),
            id: self.id.clone(),
            class: self.class.clone(),
            text: self.text.clone(),
            attributes: self.attributes.clone(),
            rect: self.rect,
            marker: None,
        }
    }

    /// Snapshot with a synthetic marker attached (`image`, `image_link`).
    pub fn tagged(&self, marker: &str) -> ElementInfo {
        let mut info = self.info();
        info.marker = Some(marker.to_string());
        info
    }
}

/// An outbound link as collected at scan time. Visible anchor text rides
/// along so the link filter can apply its logout/signout rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub url: String,
    pub text: Option<String>,
}

impl Link {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: None,
        }
    }

    pub fn with_text(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: Some(text.into()),
        }
    }
}

/// The ten classification buckets. Membership is non-exclusive; an element
/// may appear in several buckets. Bucket names are the downstream wire
/// format and must not change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySet {
    pub ui_components: Vec<ElementInfo>,
    pub clickable_controls: Vec<ElementInfo>,
    pub input_fields: Vec<ElementInfo>,
    pub forms: Vec<ElementInfo>,
    pub authentication_points: Vec<ElementInfo>,
    pub navigation_paths: Vec<ElementInfo>,
    pub file_upload: Vec<ElementInfo>,
    pub file_download: Vec<ElementInfo>,
    pub drag_drop: Vec<ElementInfo>,
    pub generic_dom: Vec<ElementInfo>,
}

/// Names one bucket of a [`CategorySet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    UiComponents,
    ClickableControls,
    InputFields,
    Forms,
    AuthenticationPoints,
    NavigationPaths,
    FileUpload,
    FileDownload,
    DragDrop,
    GenericDom,
}

impl CategorySet {
    pub fn bucket_mut(&mut self, category: Category) -> &mut Vec<ElementInfo> {
        match category {
            Category::UiComponents => &mut self.ui_components,
            Category::ClickableControls => &mut self.clickable_controls,
            Category::InputFields => &mut self.input_fields,
            Category::Forms => &mut self.forms,
            Category::AuthenticationPoints => &mut self.authentication_points,
            Category::NavigationPaths => &mut self.navigation_paths,
            Category::FileUpload => &mut self.file_upload,
            Category::FileDownload => &mut self.file_download,
            Category::DragDrop => &mut self.drag_drop,
            Category::GenericDom => &mut self.generic_dom,
        }
    }

    pub fn bucket(&self, category: Category) -> &[ElementInfo] {
        match category {
            Category::UiComponents => &self.ui_components,
            Category::ClickableControls => &self.clickable_controls,
            Category::InputFields => &self.input_fields,
            Category::Forms => &self.forms,
            Category::AuthenticationPoints => &self.authentication_points,
            Category::NavigationPaths => &self.navigation_paths,
            Category::FileUpload => &self.file_upload,
            Category::FileDownload => &self.file_download,
            Category::DragDrop => &self.drag_drop,
            Category::GenericDom => &self.generic_dom,
        }
    }

    /// Total element entries across all buckets (duplicates counted).
    pub fn total(&self) -> usize {
        self.ui_components.len()
            + self.clickable_controls.len()
            + self.input_fields.len()
            + self.forms.len()
            + self.authentication_points.len()
            + self.navigation_paths.len()
            + self.file_upload.len()
            + self.file_download.len()
            + self.drag_drop.len()
            + self.generic_dom.len()
    }
}

/// Everything recorded for one successfully scanned page. The JSON shape is
/// URL -> the ten buckets, so the category set is flattened and the raw
/// link list stays internal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    #[serde(flatten)]
    pub categories: CategorySet,
    #[serde(skip)]
    pub links: Vec<Link>,
}

/// The site model produced by one crawl: normalized URL -> page record,
/// in insertion-independent (sorted) order for stable output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteModel {
    pub pages: BTreeMap<String, PageRecord>,
}

impl SiteModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: String, record: PageRecord) {
        self.pages.insert(url, record);
    }

    pub fn contains(&self, url: &str) -> bool {
        self.pages.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_info() -> ElementInfo {
        ElementInfo {
            tag: "input".to_string(),
            id: Some("user".to_string()),
            class: None,
            text: None,
            attributes: BTreeMap::from([("type".to_string(), "text".to_string())]),
            rect: Rect {
                x: 10,
                y: 20,
                width: 100,
                height: 30,
            },
            marker: None,
        }
    }

    #[test]
    fn rect_zero_area_is_empty() {
        let mut rect = Rect {
            x: 5,
            y: 5,
            width: 0,
            height: 10,
        };
        assert!(rect.is_empty());
        rect.width = 10;
        assert!(!rect.is_empty());
        rect.height = 0;
        assert!(rect.is_empty());
    }

    #[test]
    fn element_info_wire_format() {
        let info = sample_info();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["tagName"], "input");
        assert_eq!(json["id"], "user");
        assert_eq!(json["className"], serde_json::Value::Null);
        assert_eq!(json["attributes"]["type"], "text");
        assert_eq!(json["rect"]["width"], 100);
        // Marker is omitted entirely when absent
        assert!(json.get("type").is_none());
    }

    #[test]
    fn tagged_marker_serializes_as_type() {
        let raw = RawElement {
            tag: "img".to_string(),
            id: None,
            class: None,
            text: None,
            attributes: BTreeMap::new(),
            rect: Rect {
                x: 0,
                y: 0,
                width: 1,
                height: 1,
            },
            ancestors: vec![],
        };
        let json = serde_json::to_value(raw.tagged("image")).unwrap();
        assert_eq!(json["type"], "image");
    }

    #[test]
    fn page_record_flattens_buckets() {
        let mut record = PageRecord::default();
        record.categories.input_fields.push(sample_info());
        record.links.push(Link::new("https://x.com/next"));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["input_fields"][0]["tagName"], "input");
        assert!(json["forms"].as_array().unwrap().is_empty());
        // Raw links never leak into the site model
        assert!(json.get("links").is_none());
    }

    #[test]
    fn site_model_serializes_as_plain_map() {
        let mut model = SiteModel::new();
        model.insert("https://x.com".to_string(), PageRecord::default());
        let json = serde_json::to_value(&model).unwrap();
        assert!(json.is_object());
        assert!(json["https://x.com"]["ui_components"].is_array());
    }
}
