//! Heuristic DOM classifier.
//!
//! Partitions a page's element snapshot into the ten category buckets.
//! The classifier is a pure function over the snapshot: an ordered table
//! of independent predicates is applied uniformly to every visible
//! element, and each predicate decides membership for itself. Buckets are
//! non-exclusive, so one element can land in several. The predicates are
//! heuristics; false positives and negatives are expected and tolerated.

use crate::element::{Category, CategorySet, ElementInfo, RawElement};

pub(crate) const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "svg"];

pub(crate) const DOWNLOAD_EXTENSIONS: &[&str] =
    &["pdf", "zip", "docx", "xlsx", "csv", "exe", "dmg", "iso"];

/// Substrings that flag a form as part of a login/registration flow.
const AUTH_HINTS: &[&str] = &["login", "sign in", "register", "password", "auth"];

/// Landmark tags that make an enclosed anchor a navigation path.
const NAV_LANDMARKS: &[&str] = &["nav", "header", "footer"];

/// Structural tags recorded as UI components in their own right.
const STRUCTURAL_TAGS: &[&str] = &[
    "header", "footer", "main", "aside", "nav", "article", "section",
];

/// Attributes that indicate a click handler wired up natively or by a
/// frontend framework.
const CLICK_HANDLER_ATTRS: &[&str] = &["onclick", "ng-click", "@click", "v-on:click"];

/// One bucket assignment produced by a predicate, optionally carrying a
/// synthetic marker (`image`, `image_link`).
struct Hit {
    category: Category,
    marker: Option<&'static str>,
}

impl Hit {
    fn plain(category: Category) -> Self {
        Self {
            category,
            marker: None,
        }
    }

    fn tagged(category: Category, marker: &'static str) -> Self {
        Self {
            category,
            marker: Some(marker),
        }
    }
}

type Predicate = fn(&RawElement) -> Vec<Hit>;

/// Applied in order to every visible element. Each entry is independent;
/// adding a category means adding a row here, not touching the traversal.
const PREDICATES: &[Predicate] = &[
    clickable_control,
    anchor_role,
    input_field,
    form_auth,
    password_auth,
    drag_drop,
    ui_component,
    resource_link,
    generic_dom_anchor,
];

/// Classify a page snapshot into its category set. Deterministic: the same
/// snapshot always produces the same buckets in the same order.
pub fn classify(elements: &[RawElement]) -> CategorySet {
    let mut set = CategorySet::default();
    for element in elements {
        if element.rect.is_empty() {
            continue;
        }
        for predicate in PREDICATES {
            for hit in predicate(element) {
                let info: ElementInfo = match hit.marker {
                    Some(marker) => element.tagged(marker),
                    None => element.info(),
                };
                set.bucket_mut(hit.category).push(info);
            }
        }
    }
    set
}

fn role(element: &RawElement) -> Option<String> {
    element.attr("role").map(|r| r.to_ascii_lowercase())
}

/// Does the href end in one of the given extensions (query/fragment
/// stripped first)?
fn href_has_extension(href: &str, extensions: &[&str]) -> bool {
    let path = href
        .split(['?', '#'])
        .next()
        .unwrap_or(href)
        .to_ascii_lowercase();
    extensions.iter().any(|ext| {
        path.len() > ext.len() && path.ends_with(ext) && path.as_bytes()[path.len() - ext.len() - 1] == b'.'
    })
}

/// Buttons, button-roled elements, submit-ish inputs, and anything with a
/// wired click handler.
fn clickable_control(element: &RawElement) -> Vec<Hit> {
    let input_type = element.input_type();
    let is_submitish = matches!(input_type.as_deref(), Some("submit" | "button" | "reset"));
    let has_handler = CLICK_HANDLER_ATTRS
        .iter()
        .any(|attr| element.attr(attr).is_some());

    if element.tag == "button"
        || role(element).as_deref() == Some("button")
        || is_submitish
        || has_handler
    {
        vec![Hit::plain(Category::ClickableControls)]
    } else {
        vec![]
    }
}

/// Anchors: navigation when nested under a landmark, clickable control
/// otherwise. Image-target anchors are left for `resource_link`, and
/// href-less anchors count as controls.
fn anchor_role(element: &RawElement) -> Vec<Hit> {
    if element.tag != "a" {
        return vec![];
    }
    match element.attr("href") {
        Some(href) => {
            if href_has_extension(href, IMAGE_EXTENSIONS) {
                // Recorded as a resource, never treated as a page link
                vec![]
            } else if element.has_ancestor(NAV_LANDMARKS) {
                vec![Hit::plain(Category::NavigationPaths)]
            } else {
                vec![Hit::plain(Category::ClickableControls)]
            }
        }
        None => vec![Hit::plain(Category::ClickableControls)],
    }
}

fn input_field(element: &RawElement) -> Vec<Hit> {
    if !matches!(element.tag.as_str(), "input" | "textarea" | "select") {
        return vec![];
    }
    let mut hits = vec![Hit::plain(Category::InputFields)];
    if element.tag == "input" && element.input_type().as_deref() == Some("file") {
        hits.push(Hit::plain(Category::FileUpload));
    }
    hits
}

/// Every form is a form; a form whose visible text or action smells like a
/// login/registration flow is additionally an authentication point.
fn form_auth(element: &RawElement) -> Vec<Hit> {
    if element.tag != "form" {
        return vec![];
    }
    let mut hits = vec![Hit::plain(Category::Forms)];

    let text = element
        .text
        .as_deref()
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let action = element
        .attr("action")
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if AUTH_HINTS
        .iter()
        .any(|hint| text.contains(hint) || action.contains(hint))
    {
        hits.push(Hit::plain(Category::AuthenticationPoints));
    }
    hits
}

/// Password inputs are authentication points in their own right, whether
/// typed as `password` or merely named like one.
fn password_auth(element: &RawElement) -> Vec<Hit> {
    if element.tag != "input" {
        return vec![];
    }
    let by_type = element.input_type().as_deref() == Some("password");
    let by_name = element
        .name_attr()
        .is_some_and(|name| name.to_ascii_lowercase().contains("password"));
    if by_type || by_name {
        vec![Hit::plain(Category::AuthenticationPoints)]
    } else {
        vec![]
    }
}

fn drag_drop(element: &RawElement) -> Vec<Hit> {
    let draggable = matches!(element.attr("draggable"), Some("true") | Some(""));
    if draggable
        || role(element).as_deref() == Some("application")
        || element.class_contains("draggable")
    {
        vec![Hit::plain(Category::DragDrop)]
    } else {
        vec![]
    }
}

/// Semantic-roled elements, structural landmarks, card/modal/dialog-classed
/// containers, and images (tagged). A single element can satisfy several of
/// these and is recorded once per satisfied condition.
fn ui_component(element: &RawElement) -> Vec<Hit> {
    let mut hits = Vec::new();

    if let Some(role) = role(element)
        && !matches!(role.as_str(), "presentation" | "none" | "button" | "link")
    {
        hits.push(Hit::plain(Category::UiComponents));
    }
    if STRUCTURAL_TAGS.contains(&element.tag.as_str()) {
        hits.push(Hit::plain(Category::UiComponents));
    }
    if element.class_contains("card")
        || element.class_contains("modal")
        || element.class_contains("dialog")
    {
        hits.push(Hit::plain(Category::UiComponents));
    }
    if element.tag == "img" {
        hits.push(Hit::tagged(Category::UiComponents, "image"));
    }
    hits
}

/// Download links and image-target links: recorded, never navigated.
fn resource_link(element: &RawElement) -> Vec<Hit> {
    if element.tag != "a" {
        return vec![];
    }
    let mut hits = Vec::new();
    let href = element.attr("href");

    let is_download = element.attr("download").is_some()
        || href.is_some_and(|href| href_has_extension(href, DOWNLOAD_EXTENSIONS));
    if is_download {
        hits.push(Hit::plain(Category::FileDownload));
    }
    if href.is_some_and(|href| href_has_extension(href, IMAGE_EXTENSIONS)) {
        hits.push(Hit::tagged(Category::FileDownload, "image_link"));
    }
    hits
}

/// Block containers carrying an id, name, or test hook: no semantic role,
/// but stable anchors for downstream automation.
fn generic_dom_anchor(element: &RawElement) -> Vec<Hit> {
    if !matches!(element.tag.as_str(), "div" | "span" | "section" | "article") {
        return vec![];
    }
    if element.id.is_some()
        || element.name_attr().is_some()
        || element.attr("data-testid").is_some()
    {
        vec![Hit::plain(Category::GenericDom)]
    } else {
        vec![]
    }
}
