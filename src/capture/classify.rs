//! Pointer-target classification
//!
//! Pure helpers shared by the click and move observers: clickability,
//! ancestor path, and container-relative coordinates.

use crate::dom::{Element, ElementRef, Rect};

/// Tags treated as interactive regardless of handlers or attributes.
pub const CLICKABLE_TAGS: [&str; 3] = ["a", "button", "input"];

/// Marks an element as interactive whatever its tag.
pub const CLICKABLE_ATTRIBUTE: &str = "data-clickable";

/// Human-readable label forwarded verbatim as `context`.
pub const READABLE_ATTRIBUTE: &str = "data-readable";

const PATH_SEPARATOR: &str = " > ";

/// Result of classifying one event target
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    pub clickable_element: Option<String>,
    pub tree: Option<String>,
    pub context: Option<String>,
}

impl Classification {
    pub fn is_clickable(&self) -> bool {
        self.clickable_element.is_some()
    }
}

pub fn is_clickable(element: &dyn Element) -> bool {
    if element.has_click_handler() || element.has_attribute(CLICKABLE_ATTRIBUTE) {
        return true;
    }
    let tag = element.tag_name();
    CLICKABLE_TAGS
        .iter()
        .any(|candidate| tag.eq_ignore_ascii_case(candidate))
}

/// Lowercase tag of `element` when it qualifies as clickable.
pub fn clickable_element(element: &dyn Element) -> Option<String> {
    is_clickable(element).then(|| element.tag_name().to_lowercase())
}

/// Root-to-target tag path, e.g. `html > body > div > button`.
pub fn ancestor_path(target: &ElementRef) -> Option<String> {
    let mut tags = Vec::new();
    let mut current = Some(target.clone());
    while let Some(element) = current {
        tags.push(element.tag_name().to_lowercase());
        current = element.parent();
    }

    if tags.is_empty() {
        return None;
    }
    tags.reverse();
    Some(tags.join(PATH_SEPARATOR))
}

pub fn readable_context(element: &dyn Element) -> Option<String> {
    element.attribute(READABLE_ATTRIBUTE)
}

/// Translate absolute coordinates into the container's frame. Without a
/// rectangle the offset is zero and coordinates stay viewport-absolute.
pub fn relative_position(x: f64, y: f64, container: Option<Rect>) -> (f64, f64) {
    let (left, top) = container.map(|rect| (rect.left, rect.top)).unwrap_or((0.0, 0.0));
    (x - left, y - top)
}

pub fn classify(target: Option<&ElementRef>) -> Classification {
    let Some(target) = target else {
        return Classification::default();
    };

    let clickable_element = clickable_element(target.as_ref());
    // The path is only worth walking for interactive targets.
    let tree = match clickable_element {
        Some(_) => ancestor_path(target),
        None => None,
    };

    Classification {
        clickable_element,
        tree,
        context: readable_context(target.as_ref()),
    }
}
