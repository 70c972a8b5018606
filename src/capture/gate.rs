//! Recording gate
//!
//! Which categories the server currently wants captured. Observers read it
//! on every event, so a directive takes effect without re-registering
//! any listener.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

/// Recordable event categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Clicks,
    Movements,
    Forms,
    Scrolls,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Clicks,
        Category::Movements,
        Category::Forms,
        Category::Scrolls,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Clicks => "clicks",
            Category::Movements => "movements",
            Category::Forms => "forms",
            Category::Scrolls => "scrolls",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown recording category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct RecordingGate {
    enabled: RwLock<HashSet<Category>>,
    page_tracking: AtomicBool,
}

impl RecordingGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether records of `category` should be captured right now.
    pub fn allows(&self, category: Category) -> bool {
        self.enabled.read().contains(&category)
    }

    /// Replace the enabled set wholesale.
    pub fn replace(&self, categories: impl IntoIterator<Item = Category>) {
        *self.enabled.write() = categories.into_iter().collect();
    }

    /// Snapshot of the enabled categories.
    pub fn enabled(&self) -> HashSet<Category> {
        self.enabled.read().clone()
    }

    /// Whether the page-change watcher may poll. On only while connected.
    pub fn page_tracking(&self) -> bool {
        self.page_tracking.load(Ordering::SeqCst)
    }

    pub fn set_page_tracking(&self, on: bool) {
        self.page_tracking.store(on, Ordering::SeqCst);
    }
}
