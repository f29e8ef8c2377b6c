use wishwall_common::DEFAULT_ROOM;
use wishwall_store::{MemoryRoom, MessageStore};

use crate::error::ApiError;
use crate::sessions::SessionRegistry;

/// Settings the node starts with.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub room: String,
    /// Token that signs in as moderator. Without one nobody can moderate.
    pub admin_token: Option<String>,
    pub allow_anonymous: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        NodeConfig {
            room: DEFAULT_ROOM.to_string(),
            admin_token: None,
            allow_anonymous: true,
        }
    }
}

pub struct AppState {
    pub room: MemoryRoom,
    pub sessions: SessionRegistry,
}

impl AppState {
    pub fn new(config: NodeConfig) -> Self {
        AppState {
            room: MemoryRoom::new(config.room),
            sessions: SessionRegistry::new(config.admin_token, config.allow_anonymous),
        }
    }

    pub fn room_name(&self) -> &str {
        self.room.room()
    }

    /// The node hosts a single room; any other name is unknown.
    pub fn check_room(&self, room: &str) -> Result<(), ApiError> {
        if room == self.room_name() {
            Ok(())
        } else {
            Err(ApiError::UnknownRoom(room.to_string()))
        }
    }
}
