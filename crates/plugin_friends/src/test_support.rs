//! In-memory host collaborators for unit tests

use std::collections::HashMap;
use std::sync::Mutex;

use crate::chat::ChatMessage;
use crate::host::{Messenger, PlayerDirectory};
use crate::types::PlayerId;

#[derive(Default)]
pub struct StaticDirectory {
    players: HashMap<PlayerId, (String, bool)>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn online(mut self, id: PlayerId, name: &str) -> Self {
        self.players.insert(id, (name.to_string(), true));
        self
    }

    pub fn offline(mut self, id: PlayerId, name: &str) -> Self {
        self.players.insert(id, (name.to_string(), false));
        self
    }
}

impl PlayerDirectory for StaticDirectory {
    fn is_online(&self, player: PlayerId) -> bool {
        self.players.get(&player).is_some_and(|(_, online)| *online)
    }

    fn display_name(&self, player: PlayerId) -> Option<String> {
        self.players.get(&player).map(|(name, _)| name.clone())
    }

    fn find_by_name(&self, name: &str) -> Option<PlayerId> {
        self.players
            .iter()
            .find(|(_, (known, _))| known.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id)
    }
}

#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(PlayerId, ChatMessage)>>,
}

impl RecordingMessenger {
    pub fn sent(&self) -> Vec<(PlayerId, ChatMessage)> {
        self.sent.lock().unwrap().clone()
    }

    /// Plain text of every message `player` received, in order
    pub fn plain_for(&self, player: PlayerId) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| *to == player)
            .map(|(_, message)| message.to_plain())
            .collect()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }
}

impl Messenger for RecordingMessenger {
    fn send(&self, player: PlayerId, message: ChatMessage) {
        self.sent.lock().unwrap().push((player, message));
    }
}
