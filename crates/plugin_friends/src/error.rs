//! Error types for the friends plugin

use std::{io::Error as IoError, path::PathBuf};
use thiserror::Error;

use crate::types::PlayerId;

/// Relation store errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FriendshipError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("Not friends with {0}")]
    NotFriends(PlayerId),
}

/// Persistence errors.
///
/// `FileRead`, `MalformedLine` and `InvalidIdentifier` are read failures,
/// the `File{Create,Write,Sync,Rename}` variants are write failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read file {0}: {1}")]
    FileRead(PathBuf, IoError),

    #[error("Failed to create file {0}: {1}")]
    FileCreate(PathBuf, IoError),

    #[error("Failed to write to file {0}: {1}")]
    FileWrite(PathBuf, IoError),

    #[error("Failed to sync file {0}: {1}")]
    FileSync(PathBuf, IoError),

    #[error("Failed to rename file from {0} to {1}: {2}")]
    FileRename(PathBuf, PathBuf, IoError),

    #[error("Malformed line {line_number} in {path}: {line:?}")]
    MalformedLine {
        path: PathBuf,
        line_number: usize,
        line: String,
    },

    #[error("Invalid player identifier on line {line_number} in {path}: {source}")]
    InvalidIdentifier {
        path: PathBuf,
        line_number: usize,
        #[source]
        source: uuid::Error,
    },

    #[error("Failed to read texts file {0}: {1}")]
    TextsRead(PathBuf, IoError),

    #[error("Failed to parse texts file {0}: {1}")]
    TextsParse(PathBuf, toml::de::Error),
}

impl StorageError {
    /// Whether this error happened while reading persisted data
    pub fn is_read_failure(&self) -> bool {
        matches!(
            self,
            StorageError::FileRead(..)
                | StorageError::MalformedLine { .. }
                | StorageError::InvalidIdentifier { .. }
        )
    }
}

/// Offer workflow errors
#[derive(Debug, Error)]
pub enum OfferError {
    #[error("A player cannot send an offer to themselves")]
    SelfOffer,

    #[error("Already friends with {0}")]
    AlreadyFriends(PlayerId),

    #[error("An offer from {sender} to {recipient} is already pending")]
    AlreadyPending {
        sender: PlayerId,
        recipient: PlayerId,
    },

    #[error("No pending offer")]
    NoPendingOffer,

    #[error("Several offers are pending, from: {0:?}")]
    AmbiguousOffer(Vec<PlayerId>),

    #[error("Offer from {sender} to {recipient} has expired")]
    Expired {
        sender: PlayerId,
        recipient: PlayerId,
    },

    #[error("Offer callback failed: {0}")]
    Policy(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<FriendshipError> for OfferError {
    fn from(e: FriendshipError) -> Self {
        OfferError::Policy(Box::new(e))
    }
}

/// Command parsing errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Unknown subcommand: {0}")]
    UnknownSubcommand(String),

    #[error("Invalid player identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Unknown or offline player: {0}")]
    UnknownPlayer(String),
}

/// Plugin lifecycle errors
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Friendship error: {0}")]
    Friendship(#[from] FriendshipError),

    #[error("Offer error: {0}")]
    Offer(#[from] OfferError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),
}

pub type FriendshipResult<T> = Result<T, FriendshipError>;
pub type StorageResult<T> = Result<T, StorageError>;
pub type OfferResult<T> = Result<T, OfferError>;
pub type CommandResult<T> = Result<T, CommandError>;
pub type PluginResult<T> = Result<T, PluginError>;
