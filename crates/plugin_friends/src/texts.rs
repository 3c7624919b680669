//! Message registry
//!
//! Each text has a fixed kind and an English default template. Templates use
//! `{name}` placeholders. A TOML file mapping text names to templates can
//! replace any subset of the defaults.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use crate::chat::{ChatColor, ChatComponent, ChatMessage};
use crate::error::{StorageError, StorageResult};
use crate::types::MessageKind;

/// A message template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    pub kind: MessageKind,
    pub template: String,
}

impl Text {
    pub fn error(template: &str) -> Self {
        Self {
            kind: MessageKind::Error,
            template: template.to_string(),
        }
    }

    pub fn information(template: &str) -> Self {
        Self {
            kind: MessageKind::Information,
            template: template.to_string(),
        }
    }

    /// Substitutes `{key}` placeholders. Unknown placeholders are left as is.
    pub fn render(&self, args: &[(&str, &str)]) -> String {
        args.iter().fold(self.template.clone(), |acc, (key, value)| {
            acc.replace(&format!("{{{key}}}"), value)
        })
    }

    pub fn format(&self, args: &[(&str, &str)]) -> ChatMessage {
        let color = match self.kind {
            MessageKind::Error => ChatColor::Red,
            MessageKind::Information => ChatColor::Gray,
        };
        ChatMessage::new(self.kind, ChatComponent::colored(self.render(args), color))
    }

    pub fn message(&self) -> ChatMessage {
        self.format(&[])
    }
}

macro_rules! texts_registry {
    ($( $field:ident : $kind:ident => $template:literal ),* $(,)?) => {
        /// Every message the plugin sends
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct Texts {
            $( pub $field: Text, )*
        }

        impl Default for Texts {
            fn default() -> Self {
                Self {
                    $( $field: Text::$kind($template), )*
                }
            }
        }

        impl Texts {
            fn template_mut(&mut self, name: &str) -> Option<&mut Text> {
                match name {
                    $( stringify!($field) => Some(&mut self.$field), )*
                    _ => None,
                }
            }
        }
    };
}

texts_registry! {
    already_friend_with_other: error => "You are already friends with {player}.",
    other_is_no_longer_friend_with_you: information => "{player} is no longer your friend.",
    not_friend_with_other_anymore: information => "You are no longer friends with {player}.",
    not_friend_with_that_player: error => "You are not friends with that player.",
    online_friends: information => "Online friends:",
    no_online_friends: information => "None of your friends are online.",
    offline_friends: information => "Offline friends:",
    no_offline_friends: information => "You have no offline friends.",
    cannot_befriend_yourself: error => "You cannot be friends with yourself.",
    offer_sent: information => "Friend request sent to {player}.",
    offer_received: information => "{player} wants to be your friend. Use /friend accept {player} or /friend deny {player}.",
    offer_already_pending: error => "You already sent a friend request to {player}.",
    now_friends: information => "You are now friends with {player}.",
    offer_denied_by_recipient: information => "{player} declined your friend request.",
    offer_denied: information => "You declined the friend request from {player}.",
    offer_taken_back: information => "You withdrew your friend request to {player}.",
    offer_taken_back_by_sender: information => "{player} withdrew their friend request.",
    offer_expired: information => "Your friend request to {player} has expired.",
    offer_expired_on_answer: error => "The friend request from {player} has expired.",
    no_pending_offer: error => "There is no matching pending friend request.",
    ambiguous_offer: error => "Several friend requests are pending ({players}), name the player.",
    pending_received: information => "Requests received: {players}",
    pending_sent: information => "Requests sent: {players}",
    no_pending_offers: information => "You have no pending friend requests.",
    unknown_player: error => "Unknown or offline player: {player}.",
    usage: error => "{error}. Usage: /friend <list|remove|propose|accept|deny|takeback|pending>",
}

impl Texts {
    /// Replaces the templates named in `overrides`. Returns the names that
    /// matched no text.
    pub fn apply_overrides(&mut self, overrides: HashMap<String, String>) -> Vec<String> {
        let mut unknown = Vec::new();
        for (name, template) in overrides {
            match self.template_mut(&name) {
                Some(text) => text.template = template,
                None => unknown.push(name),
            }
        }
        unknown.sort();
        unknown
    }

    /// Defaults, overridden by `path` when it exists
    pub async fn load(path: &Path) -> StorageResult<Self> {
        let mut texts = Texts::default();

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No texts file at {}, using defaults", path.display());
                return Ok(texts);
            }
            Err(e) => return Err(StorageError::TextsRead(path.to_path_buf(), e)),
        };

        let overrides: HashMap<String, String> = toml::from_str(&content)
            .map_err(|e| StorageError::TextsParse(path.to_path_buf(), e))?;

        for name in texts.apply_overrides(overrides) {
            warn!("Unknown text '{}' in {}", name, path.display());
        }
        Ok(texts)
    }
}
