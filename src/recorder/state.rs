//! Session state and recording directives

use crate::capture::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Server instruction: which categories to capture, under which session id
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordingDirective {
    #[serde(default)]
    pub enabled: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl RecordingDirective {
    pub fn new(categories: &[Category], id: Option<i64>) -> Self {
        Self {
            enabled: categories.iter().map(|c| c.as_str().to_string()).collect(),
            id,
        }
    }

    /// Known categories named by the directive; unknown names are dropped.
    pub fn categories(&self) -> Vec<Category> {
        self.enabled
            .iter()
            .filter_map(|name| match name.parse::<Category>() {
                Ok(category) => Some(category),
                Err(e) => {
                    tracing::debug!("{}", e);
                    None
                }
            })
            .collect()
    }
}

/// Where the coordinator is in its connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectionState {
    Disconnected,
    /// Handshake done, waiting for a directive on this connection.
    Connected,
    /// Directive applied; records are forwarded.
    Recording,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connected => write!(f, "connected"),
            ConnectionState::Recording => write!(f, "recording"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct SessionState {
    pub connected: bool,
    /// A directive has been applied since the current connection came up.
    pub synced: bool,
    pub user_id: String,
    pub recordings_id: Option<i64>,
    /// URL last announced on the current connection.
    pub announced_url: Option<String>,
}

impl SessionState {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            ..Default::default()
        }
    }

    pub fn can_forward(&self) -> bool {
        self.connected && self.synced
    }

    pub fn connection_state(&self) -> ConnectionState {
        match (self.connected, self.synced) {
            (false, _) => ConnectionState::Disconnected,
            (true, false) => ConnectionState::Connected,
            (true, true) => ConnectionState::Recording,
        }
    }

    pub fn on_connected(&mut self) {
        self.connected = true;
        self.synced = false;
        self.announced_url = None;
    }

    pub fn on_disconnected(&mut self) {
        self.connected = false;
        self.synced = false;
    }
}

/// Point-in-time view of the coordinator for hosts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: ConnectionState,
    pub user_id: String,
    pub recordings_id: Option<i64>,
    pub enabled: BTreeSet<String>,
}
