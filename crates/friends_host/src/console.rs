//! Console front end
//!
//! Simulates a game server from stdin: players join and quit by name, and
//! `as <name> ...` runs a `/friend` command on a player's behalf. Chat sent
//! by the plugin is printed to stdout.

use plugin_friends::{ChatMessage, FriendsPlugin, MessageKind, Messenger, PlayerDirectory, PlayerId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

pub const HELP: &str = "\
Commands:
  join <name>               connect a player
  quit <name>               disconnect a player
  players                   list known players
  as <name> <friend args>   run /friend <friend args> as <name>
  help                      show this help
  stop                      save and exit";

/// Identifier a console player gets, stable across runs
pub fn player_id(name: &str) -> PlayerId {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.to_lowercase().as_bytes())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct KnownPlayer {
    name: String,
    online: bool,
}

/// Every player seen since startup
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: RwLock<HashMap<PlayerId, KnownPlayer>>,
}

impl PlayerRegistry {
    fn read(&self) -> RwLockReadGuard<'_, HashMap<PlayerId, KnownPlayer>> {
        self.players.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<PlayerId, KnownPlayer>> {
        self.players.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn join(&self, name: &str) -> PlayerId {
        let id = player_id(name);
        self.write().insert(
            id,
            KnownPlayer {
                name: name.to_string(),
                online: true,
            },
        );
        id
    }

    /// Marks `name` offline. Returns `None` for players never seen.
    pub fn quit(&self, name: &str) -> Option<PlayerId> {
        let id = player_id(name);
        let mut players = self.write();
        let player = players.get_mut(&id)?;
        player.online = false;
        Some(id)
    }

    /// Known players with their online flag, sorted by name
    pub fn players(&self) -> Vec<(String, bool)> {
        let mut players: Vec<(String, bool)> = self
            .read()
            .values()
            .map(|p| (p.name.clone(), p.online))
            .collect();
        players.sort();
        players
    }
}

impl PlayerDirectory for PlayerRegistry {
    fn is_online(&self, player: PlayerId) -> bool {
        self.read().get(&player).is_some_and(|p| p.online)
    }

    fn display_name(&self, player: PlayerId) -> Option<String> {
        self.read().get(&player).map(|p| p.name.clone())
    }

    fn find_by_name(&self, name: &str) -> Option<PlayerId> {
        let id = player_id(name);
        self.read().contains_key(&id).then_some(id)
    }
}

/// Prints chat to stdout, prefixed by the recipient's name
pub struct ConsoleMessenger {
    registry: Arc<PlayerRegistry>,
    json: bool,
}

impl ConsoleMessenger {
    pub fn new(registry: Arc<PlayerRegistry>, json: bool) -> Self {
        Self { registry, json }
    }

    fn render(&self, player: PlayerId, message: &ChatMessage) -> String {
        let name = self.registry.name_or_id(player);
        let marker = match message.kind {
            MessageKind::Error => "!",
            MessageKind::Information => ">",
        };

        if self.json {
            match message.component.to_json() {
                Ok(json) => return format!("[{name}] {marker} {json}"),
                Err(e) => warn!("Could not serialize chat message: {}", e),
            }
        }
        format!("[{name}] {marker} {}", message.to_plain())
    }
}

impl Messenger for ConsoleMessenger {
    fn send(&self, player: PlayerId, message: ChatMessage) {
        println!("{}", self.render(player, &message));
    }
}

/// A line typed into the console
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Join(String),
    Quit(String),
    Players,
    As { player: String, args: Vec<String> },
    Help,
    Stop,
}

impl ConsoleCommand {
    /// Parses one line. Blank lines give `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut words = line.split_whitespace();
        let Some(keyword) = words.next() else {
            return Ok(None);
        };

        let command = match keyword.to_ascii_lowercase().as_str() {
            "join" => ConsoleCommand::Join(single_name(words, "join")?),
            "quit" => ConsoleCommand::Quit(single_name(words, "quit")?),
            "players" => ConsoleCommand::Players,
            "as" => {
                let player = words.next().ok_or("Usage: as <name> <friend args>")?;
                ConsoleCommand::As {
                    player: player.to_string(),
                    args: words.map(str::to_string).collect(),
                }
            }
            "help" => ConsoleCommand::Help,
            "stop" | "exit" => ConsoleCommand::Stop,
            other => return Err(format!("Unknown command '{other}', try 'help'")),
        };
        Ok(Some(command))
    }
}

fn single_name<'a>(mut words: impl Iterator<Item = &'a str>, keyword: &str) -> Result<String, String> {
    match (words.next(), words.next()) {
        (Some(name), None) => Ok(name.to_string()),
        _ => Err(format!("Usage: {keyword} <name>")),
    }
}

/// Whether the console loop should keep reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Stop,
}

/// Binds the console commands to a plugin and its player registry
pub struct Console {
    plugin: FriendsPlugin,
    registry: Arc<PlayerRegistry>,
}

impl Console {
    pub fn new(plugin: FriendsPlugin, registry: Arc<PlayerRegistry>) -> Self {
        Self { plugin, registry }
    }

    pub fn plugin(&self) -> &FriendsPlugin {
        &self.plugin
    }

    pub fn plugin_mut(&mut self) -> &mut FriendsPlugin {
        &mut self.plugin
    }

    pub fn handle_line(&mut self, line: &str, now: Instant) -> Outcome {
        match ConsoleCommand::parse(line) {
            Ok(Some(command)) => self.handle(command, now),
            Ok(None) => Outcome::Continue,
            Err(message) => {
                println!("{message}");
                Outcome::Continue
            }
        }
    }

    pub fn handle(&mut self, command: ConsoleCommand, now: Instant) -> Outcome {
        match command {
            ConsoleCommand::Join(name) => {
                let id = self.registry.join(&name);
                println!("{name} joined ({id})");
            }
            ConsoleCommand::Quit(name) => match self.registry.quit(&name) {
                Some(_) => println!("{name} left"),
                None => println!("Unknown player '{name}'"),
            },
            ConsoleCommand::Players => {
                for (name, online) in self.registry.players() {
                    let status = if online { "online" } else { "offline" };
                    println!("  {name} ({status}) {}", player_id(&name));
                }
            }
            ConsoleCommand::As { player, args } => {
                let source = player_id(&player);
                if !self.registry.is_online(source) {
                    println!("{player} is not online, 'join {player}' first");
                    return Outcome::Continue;
                }
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                if let Err(e) = self.plugin.execute(source, &args, now) {
                    debug!("/friend command from {} failed: {}", player, e);
                }
            }
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Stop => return Outcome::Stop,
        }
        Outcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugin_friends::{ChatComponent, FriendsConfig};
    use tempfile::tempdir;

    fn console_in(dir: &tempfile::TempDir) -> Console {
        let registry = Arc::new(PlayerRegistry::default());
        let messenger = Arc::new(ConsoleMessenger::new(registry.clone(), false));
        let config = FriendsConfig {
            data_folder: dir.path().to_path_buf(),
            ..Default::default()
        };
        Console::new(FriendsPlugin::new(config, registry.clone(), messenger), registry)
    }

    #[test]
    fn test_parse_lines() {
        assert_eq!(ConsoleCommand::parse("   "), Ok(None));
        assert_eq!(
            ConsoleCommand::parse("join Alice"),
            Ok(Some(ConsoleCommand::Join("Alice".to_string())))
        );
        assert_eq!(
            ConsoleCommand::parse("as Alice propose Bob"),
            Ok(Some(ConsoleCommand::As {
                player: "Alice".to_string(),
                args: vec!["propose".to_string(), "Bob".to_string()],
            }))
        );
        assert_eq!(ConsoleCommand::parse("STOP"), Ok(Some(ConsoleCommand::Stop)));
        assert!(ConsoleCommand::parse("join").is_err());
        assert!(ConsoleCommand::parse("join Alice Bob").is_err());
        assert!(ConsoleCommand::parse("dance").is_err());
    }

    #[test]
    fn test_player_ids_are_stable_and_case_insensitive() {
        assert_eq!(player_id("Alice"), player_id("alice"));
        assert_ne!(player_id("Alice"), player_id("Bob"));
    }

    #[test]
    fn test_registry_tracks_online_status() {
        let registry = PlayerRegistry::default();
        let alice = registry.join("Alice");

        assert!(registry.is_online(alice));
        assert_eq!(registry.find_by_name("ALICE"), Some(alice));
        assert_eq!(registry.quit("Alice"), Some(alice));
        assert!(!registry.is_online(alice));
        assert_eq!(registry.display_name(alice), Some("Alice".to_string()));
        assert_eq!(registry.quit("Nobody"), None);
        assert_eq!(registry.players(), vec![("Alice".to_string(), false)]);
    }

    #[test]
    fn test_messenger_rendering() {
        let registry = Arc::new(PlayerRegistry::default());
        let alice = registry.join("Alice");
        let message = ChatMessage::error(ChatComponent::text("nope"));

        let plain = ConsoleMessenger::new(registry.clone(), false);
        assert_eq!(plain.render(alice, &message), "[Alice] ! nope");

        let json = ConsoleMessenger::new(registry, true);
        assert_eq!(json.render(alice, &message), r#"[Alice] ! {"text":"nope"}"#);
    }

    #[test]
    fn test_friend_request_through_console() {
        let dir = tempdir().unwrap();
        let mut console = console_in(&dir);
        let now = Instant::now();

        for line in ["join Alice", "join Bob", "as Alice propose Bob", "as Bob accept"] {
            assert_eq!(console.handle_line(line, now), Outcome::Continue);
        }

        assert!(console
            .plugin()
            .friendships()
            .are_friends(player_id("Alice"), player_id("Bob"))
            .unwrap());
        assert_eq!(console.handle_line("stop", now), Outcome::Stop);
    }

    #[test]
    fn test_offline_player_cannot_run_commands() {
        let dir = tempdir().unwrap();
        let mut console = console_in(&dir);
        let now = Instant::now();

        console.handle_line("join Bob", now);
        console.handle_line("as Alice propose Bob", now);

        assert!(console.plugin().offers().is_empty());
    }
}
