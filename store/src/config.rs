use std::time::Duration;

use wishwall_common::identity::Credentials;
use wishwall_common::DEFAULT_ROOM;

pub const DEFAULT_NODE_URL: &str = "http://localhost:3030";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where a screen finds the node and who it signs in as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub node_url: String,
    pub room: String,
    pub credentials: Credentials,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig::new(DEFAULT_NODE_URL)
    }
}

impl ClientConfig {
    pub fn new(node_url: impl Into<String>) -> Self {
        ClientConfig {
            node_url: node_url.into().trim_end_matches('/').to_string(),
            room: DEFAULT_ROOM.to_string(),
            credentials: Credentials::Anonymous,
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Build from `WISHWALL_NODE_URL`, `WISHWALL_ROOM`, `WISHWALL_ADMIN_TOKEN`
    /// and `WISHWALL_TIMEOUT_MS`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config =
            ClientConfig::new(lookup("WISHWALL_NODE_URL").unwrap_or_else(|| DEFAULT_NODE_URL.into()));
        if let Some(room) = lookup("WISHWALL_ROOM").filter(|r| !r.trim().is_empty()) {
            config.room = room;
        }
        config.credentials = Credentials::from_token(lookup("WISHWALL_ADMIN_TOKEN"));
        if let Some(ms) = lookup("WISHWALL_TIMEOUT_MS").and_then(|v| v.parse::<u64>().ok()) {
            config.request_timeout = Duration::from_millis(ms);
        }
        config
    }

    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = room.into();
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// WebSocket base derived from the node URL.
    pub fn ws_url(&self) -> String {
        if let Some(rest) = self.node_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.node_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.node_url.clone()
        }
    }
}
