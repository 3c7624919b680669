// crates/plugin_friends/src/types.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PlayerId = Uuid;
pub type OfferId = Uuid;

/// Whether a player is currently connected to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PlayerStatus {
    Online,
    Offline,
}

impl PlayerStatus {
    pub fn from_online(online: bool) -> Self {
        if online {
            PlayerStatus::Online
        } else {
            PlayerStatus::Offline
        }
    }
}

/// How a chat message should be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Error,
    Information,
}

/// The nil UUID stands in for a missing identifier.
pub fn is_null(id: &PlayerId) -> bool {
    id.is_nil()
}
