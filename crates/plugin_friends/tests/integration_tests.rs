//! Integration tests for the friends plugin lifecycle
//!
//! These tests drive the plugin the way a host does: enable, run chat
//! commands, disable, and start again from the saved file.

use plugin_friends::{
    ChatMessage, FriendsConfig, FriendsPlugin, Friendships, HostPlugin, MalformedLinePolicy,
    Messenger, OfferError, PlayerDirectory, PlayerId, PluginError,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tempfile::TempDir;
use uuid::Uuid;

const A: &str = "11111111-1111-1111-1111-111111111111";
const B: &str = "22222222-2222-2222-2222-222222222222";
const C: &str = "33333333-3333-3333-3333-333333333333";
const D: &str = "44444444-4444-4444-4444-444444444444";

fn id(raw: &str) -> PlayerId {
    Uuid::parse_str(raw).unwrap()
}

/// Everybody the test knows about is online
#[derive(Default)]
struct Roster {
    names: HashMap<PlayerId, String>,
}

impl Roster {
    fn with(players: &[(&str, &str)]) -> Self {
        Self {
            names: players
                .iter()
                .map(|(raw, name)| (id(raw), name.to_string()))
                .collect(),
        }
    }
}

impl PlayerDirectory for Roster {
    fn is_online(&self, player: PlayerId) -> bool {
        self.names.contains_key(&player)
    }

    fn display_name(&self, player: PlayerId) -> Option<String> {
        self.names.get(&player).cloned()
    }

    fn find_by_name(&self, name: &str) -> Option<PlayerId> {
        self.names
            .iter()
            .find(|(_, known)| known.as_str() == name)
            .map(|(id, _)| *id)
    }
}

#[derive(Default)]
struct Inbox {
    messages: Mutex<Vec<(PlayerId, ChatMessage)>>,
}

impl Inbox {
    fn for_player(&self, player: PlayerId) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| *to == player)
            .map(|(_, message)| message.to_plain())
            .collect()
    }
}

impl Messenger for Inbox {
    fn send(&self, player: PlayerId, message: ChatMessage) {
        self.messages.lock().unwrap().push((player, message));
    }
}

/// Helper to build a plugin storing its data in `dir`
fn create_test_plugin(dir: &TempDir, policy: MalformedLinePolicy) -> (FriendsPlugin, Arc<Inbox>) {
    let mut config = FriendsConfig {
        data_folder: dir.path().to_path_buf(),
        ..Default::default()
    };
    config.storage.on_malformed_line = policy;

    let roster = Arc::new(Roster::with(&[(A, "Alice"), (B, "Bob"), (C, "Carol"), (D, "Dave")]));
    let inbox = Arc::new(Inbox::default());
    (FriendsPlugin::new(config, roster, inbox.clone()), inbox)
}

#[test]
fn test_add_and_remove_scenario() {
    let (a, b) = (id(A), id(B));
    let mut friendships = Friendships::new();

    friendships.add_friendship(a, b).unwrap();
    assert_eq!(friendships.get_friends(a).into_iter().collect::<Vec<_>>(), vec![b]);
    assert_eq!(friendships.get_friends(b).into_iter().collect::<Vec<_>>(), vec![a]);

    friendships.remove_friendship(a, b).unwrap();
    assert!(friendships.get_friends(a).is_empty());
    assert!(friendships.get_friends(b).is_empty());
}

#[tokio::test]
async fn test_friendships_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let now = Instant::now();

    let (mut plugin, _) = create_test_plugin(&dir, MalformedLinePolicy::Skip);
    plugin.on_enable().await.unwrap();
    plugin.execute(id(A), &["propose", "Bob"], now).unwrap();
    plugin.execute(id(B), &["accept", "Alice"], now).unwrap();
    plugin.friendships_mut().add_friendship(id(C), id(D)).unwrap();
    plugin.on_disable().await.unwrap();

    let (mut restarted, _) = create_test_plugin(&dir, MalformedLinePolicy::Skip);
    restarted.on_enable().await.unwrap();

    let friendships = restarted.friendships();
    assert!(friendships.are_friends(id(A), id(B)).unwrap());
    assert!(friendships.are_friends(id(C), id(D)).unwrap());
    assert_eq!(friendships.get_friends(id(A)).len(), 1);
    assert_eq!(friendships.len(), 2);
}

#[tokio::test]
async fn test_offer_between_friends_notifies_sender_only() {
    let dir = tempfile::tempdir().unwrap();
    let (mut plugin, inbox) = create_test_plugin(&dir, MalformedLinePolicy::Skip);
    plugin.on_enable().await.unwrap();
    plugin.friendships_mut().add_friendship(id(A), id(B)).unwrap();

    let result = plugin.execute(id(A), &["propose", B], Instant::now());

    assert!(matches!(
        result,
        Err(PluginError::Offer(OfferError::AlreadyFriends(friend))) if friend == id(B)
    ));
    assert!(plugin.offers().is_empty());
    assert_eq!(inbox.for_player(id(A)), vec!["You are already friends with Bob."]);
    assert!(inbox.for_player(id(B)).is_empty());
}

#[tokio::test]
async fn test_missing_file_loads_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let (mut plugin, _) = create_test_plugin(&dir, MalformedLinePolicy::Skip);

    plugin.on_enable().await.unwrap();

    assert!(plugin.is_enabled());
    assert!(plugin.friendships().is_empty());
}

#[tokio::test]
async fn test_malformed_line_with_abort_loads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let contents = format!("{A} <-> {B}\n{C} <-> {D} <-> {A}\n");
    std::fs::write(dir.path().join("friendships.txt"), contents).unwrap();

    let (mut plugin, _) = create_test_plugin(&dir, MalformedLinePolicy::Abort);
    plugin.on_enable().await.unwrap();

    assert!(plugin.is_enabled());
    assert!(plugin.friendships().is_empty());
}

#[tokio::test]
async fn test_malformed_line_with_skip_keeps_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let contents = format!("{A} <-> {B}\n{C} <-> {D} <-> {A}\nnot a friendship\n");
    std::fs::write(dir.path().join("friendships.txt"), contents).unwrap();

    let (mut plugin, _) = create_test_plugin(&dir, MalformedLinePolicy::Skip);
    plugin.on_enable().await.unwrap();

    assert!(plugin.friendships().are_friends(id(A), id(B)).unwrap());
    assert!(!plugin.friendships().are_friends(id(C), id(D)).unwrap());
    assert_eq!(plugin.friendships().len(), 1);
}

#[tokio::test]
async fn test_texts_file_overrides_messages() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("texts.toml"),
        "offer_sent = \"Demande envoyée à {player}.\"\n",
    )
    .unwrap();

    let (mut plugin, inbox) = create_test_plugin(&dir, MalformedLinePolicy::Skip);
    plugin.on_enable().await.unwrap();
    plugin.execute(id(A), &["propose", "Bob"], Instant::now()).unwrap();

    assert_eq!(inbox.for_player(id(A)), vec!["Demande envoyée à Bob."]);
}

#[tokio::test]
async fn test_unreadable_file_survives_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("friendships.txt");
    let contents = format!("{A} <-> {B}\n{B} <-> {A}\ngarbage line\n");
    std::fs::write(&path, &contents).unwrap();
    let now = Instant::now();

    let (mut plugin, _) = create_test_plugin(&dir, MalformedLinePolicy::Abort);
    plugin.on_enable().await.unwrap();
    plugin.execute(id(C), &["propose", "Dave"], now).unwrap();
    plugin.execute(id(D), &["accept"], now).unwrap();
    plugin.on_disable().await.unwrap();

    assert_eq!(
        std::fs::read_to_string(dir.path().join("friendships.txt.bak")).unwrap(),
        contents
    );
    let saved = std::fs::read_to_string(&path).unwrap();
    assert_eq!(saved, format!("{C} <-> {D}\n{D} <-> {C}\n"));
}
