//! `/friend` subcommand parsing

use uuid::Uuid;

use crate::error::{CommandError, CommandResult};
use crate::types::PlayerId;

pub const BASE_COMMAND: &str = "/friend";

/// A parsed `/friend` invocation. Player arguments stay raw until the
/// plugin resolves them against the host's directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FriendCommand {
    List,
    Remove(PlayerId),
    Propose(String),
    Accept(Option<String>),
    Deny(Option<String>),
    TakeBack(String),
    Pending,
}

impl FriendCommand {
    /// Parses the arguments following `/friend`
    pub fn parse(args: &[&str]) -> CommandResult<Self> {
        let (subcommand, rest) = args
            .split_first()
            .ok_or(CommandError::MissingArgument("subcommand"))?;
        let first = rest.first().map(|s| s.to_string());

        match subcommand.to_ascii_lowercase().as_str() {
            "list" => Ok(FriendCommand::List),
            "remove" => {
                let raw = rest.first().ok_or(CommandError::MissingArgument("uuid"))?;
                Uuid::parse_str(raw)
                    .map(FriendCommand::Remove)
                    .map_err(|_| CommandError::InvalidIdentifier(raw.to_string()))
            }
            "propose" => first
                .map(FriendCommand::Propose)
                .ok_or(CommandError::MissingArgument("player")),
            "accept" => Ok(FriendCommand::Accept(first)),
            "deny" => Ok(FriendCommand::Deny(first)),
            "takeback" => first
                .map(FriendCommand::TakeBack)
                .ok_or(CommandError::MissingArgument("player")),
            "pending" => Ok(FriendCommand::Pending),
            other => Err(CommandError::UnknownSubcommand(other.to_string())),
        }
    }
}

/// Command line run by the clickable remove marker of a friend list entry
pub fn remove_command_line(friend: PlayerId) -> String {
    format!("{BASE_COMMAND} remove {friend}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_subcommands() {
        assert_eq!(FriendCommand::parse(&["list"]), Ok(FriendCommand::List));
        assert_eq!(FriendCommand::parse(&["PENDING"]), Ok(FriendCommand::Pending));
        assert_eq!(
            FriendCommand::parse(&["propose", "Bob"]),
            Ok(FriendCommand::Propose("Bob".to_string()))
        );
        assert_eq!(FriendCommand::parse(&["accept"]), Ok(FriendCommand::Accept(None)));
        assert_eq!(
            FriendCommand::parse(&["deny", "Alice"]),
            Ok(FriendCommand::Deny(Some("Alice".to_string())))
        );
        assert_eq!(
            FriendCommand::parse(&["takeback", "Bob"]),
            Ok(FriendCommand::TakeBack("Bob".to_string()))
        );
    }

    #[test]
    fn test_parse_remove_requires_uuid() {
        let id = Uuid::new_v4();
        let raw = id.to_string();
        assert_eq!(FriendCommand::parse(&["remove", &raw]), Ok(FriendCommand::Remove(id)));
        assert_eq!(
            FriendCommand::parse(&["remove", "Bob"]),
            Err(CommandError::InvalidIdentifier("Bob".to_string()))
        );
        assert_eq!(
            FriendCommand::parse(&["remove"]),
            Err(CommandError::MissingArgument("uuid"))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            FriendCommand::parse(&[]),
            Err(CommandError::MissingArgument("subcommand"))
        );
        assert_eq!(
            FriendCommand::parse(&["hug", "Bob"]),
            Err(CommandError::UnknownSubcommand("hug".to_string()))
        );
        assert_eq!(
            FriendCommand::parse(&["propose"]),
            Err(CommandError::MissingArgument("player"))
        );
    }

    #[test]
    fn test_remove_command_line_round_trips() {
        let id = Uuid::new_v4();
        let line = remove_command_line(id);
        let args: Vec<&str> = line.split_whitespace().skip(1).collect();
        assert_eq!(FriendCommand::parse(&args), Ok(FriendCommand::Remove(id)));
    }
}
