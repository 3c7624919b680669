//! Interfaces the host server provides to the plugin, and the lifecycle the
//! plugin exposes back.

use async_trait::async_trait;
use uuid::Uuid;

use crate::chat::ChatMessage;
use crate::error::PluginError;
use crate::types::{PlayerId, PlayerStatus};

/// Player lookups backed by the host
pub trait PlayerDirectory: Send + Sync {
    fn is_online(&self, player: PlayerId) -> bool;

    /// Last known name of the player, online or not
    fn display_name(&self, player: PlayerId) -> Option<String>;

    /// Finds a known player, online or not, by name
    fn find_by_name(&self, name: &str) -> Option<PlayerId>;

    fn status(&self, player: PlayerId) -> PlayerStatus {
        PlayerStatus::from_online(self.is_online(player))
    }

    /// Name to show in chat, falling back to the raw identifier
    fn name_or_id(&self, player: PlayerId) -> String {
        self.display_name(player)
            .unwrap_or_else(|| player.to_string())
    }

    /// Resolves a command argument, either a UUID or a player name
    fn resolve(&self, name_or_id: &str) -> Option<PlayerId> {
        match Uuid::parse_str(name_or_id) {
            Ok(id) => Some(id),
            Err(_) => self.find_by_name(name_or_id),
        }
    }
}

/// Delivers chat messages to players
pub trait Messenger: Send + Sync {
    fn send(&self, player: PlayerId, message: ChatMessage);
}

/// Lifecycle hooks the host drives
#[async_trait]
pub trait HostPlugin: Send + Sync {
    fn name(&self) -> &str;

    fn version(&self) -> &str;

    /// Called once when the host starts the plugin
    async fn on_enable(&mut self) -> Result<(), PluginError>;

    /// Called once when the host stops the plugin
    async fn on_disable(&mut self) -> Result<(), PluginError>;
}
