//! In-memory document for hosts without a live DOM

use super::{Element, ElementRef, Location, PageEnvironment, Rect, Viewport};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Element backed by plain data
#[derive(Default)]
pub struct MemoryElement {
    tag_name: String,
    parent: Option<ElementRef>,
    attributes: HashMap<String, String>,
    click_handler: bool,
    rect: Option<Rect>,
}

impl MemoryElement {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_click_handler(mut self) -> Self {
        self.click_handler = true;
        self
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = Some(rect);
        self
    }

    pub fn under(mut self, parent: &ElementRef) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    pub fn build(self) -> ElementRef {
        Arc::new(self)
    }
}

impl Element for MemoryElement {
    fn tag_name(&self) -> String {
        self.tag_name.clone()
    }

    fn parent(&self) -> Option<ElementRef> {
        self.parent.clone()
    }

    fn has_click_handler(&self) -> bool {
        self.click_handler
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn bounding_rect(&self) -> Option<Rect> {
        self.rect
    }
}

/// Mutable window state; the clock is pinned when `set_now_ms` has been called.
pub struct MemoryPage {
    viewport: RwLock<Viewport>,
    location: RwLock<Location>,
    pinned_now_ms: AtomicI64,
}

const UNPINNED: i64 = i64::MIN;

impl MemoryPage {
    pub fn new(url: &str, title: &str) -> Self {
        Self {
            viewport: RwLock::new(Viewport {
                width: 1280.0,
                height: 800.0,
                scroll_x: 0.0,
                scroll_y: 0.0,
            }),
            location: RwLock::new(Location {
                url: url.to_string(),
                title: title.to_string(),
            }),
            pinned_now_ms: AtomicI64::new(UNPINNED),
        }
    }

    pub fn set_viewport(&self, viewport: Viewport) {
        *self.viewport.write() = viewport;
    }

    pub fn scroll_to(&self, x: f64, y: f64) {
        let mut viewport = self.viewport.write();
        viewport.scroll_x = x;
        viewport.scroll_y = y;
    }

    pub fn navigate(&self, url: &str, title: &str) {
        *self.location.write() = Location {
            url: url.to_string(),
            title: title.to_string(),
        };
    }

    pub fn set_now_ms(&self, now_ms: i64) {
        self.pinned_now_ms.store(now_ms, Ordering::SeqCst);
    }
}

impl PageEnvironment for MemoryPage {
    fn viewport(&self) -> Viewport {
        *self.viewport.read()
    }

    fn location(&self) -> Location {
        self.location.read().clone()
    }

    fn now_ms(&self) -> i64 {
        match self.pinned_now_ms.load(Ordering::SeqCst) {
            UNPINNED => chrono::Utc::now().timestamp_millis(),
            pinned => pinned,
        }
    }
}
