//! Plugin configuration
//!
//! Every field has a default so hosts can embed an empty `[friends]` table.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// What to do with a line of the friendships file that cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedLinePolicy {
    /// Log a warning and keep loading the remaining lines
    #[default]
    Skip,
    /// Fail the whole load, nothing is loaded
    Abort,
}

/// Friends plugin configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FriendsConfig {
    /// Folder holding the plugin's data files
    #[serde(default = "default_data_folder")]
    pub data_folder: PathBuf,
    /// File name of the persisted friendships, relative to `data_folder`
    #[serde(default = "default_friendships_file")]
    pub friendships_file: String,
    /// Optional message overrides, relative to `data_folder`
    #[serde(default = "default_texts_file")]
    pub texts_file: String,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub offers: OfferSettings,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub on_malformed_line: MalformedLinePolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferSettings {
    /// Seconds before a pending offer expires, 0 disables expiry
    #[serde(default = "default_expiry_secs")]
    pub expiry_secs: u64,
}

fn default_data_folder() -> PathBuf {
    PathBuf::from("plugins/friends")
}

fn default_friendships_file() -> String {
    "friendships.txt".to_string()
}

fn default_texts_file() -> String {
    "texts.toml".to_string()
}

fn default_expiry_secs() -> u64 {
    120
}

impl Default for FriendsConfig {
    fn default() -> Self {
        Self {
            data_folder: default_data_folder(),
            friendships_file: default_friendships_file(),
            texts_file: default_texts_file(),
            storage: StorageSettings::default(),
            offers: OfferSettings::default(),
        }
    }
}

impl Default for OfferSettings {
    fn default() -> Self {
        Self {
            expiry_secs: default_expiry_secs(),
        }
    }
}

impl OfferSettings {
    pub fn time_to_live(&self) -> Option<Duration> {
        (self.expiry_secs > 0).then(|| Duration::from_secs(self.expiry_secs))
    }
}

impl FriendsConfig {
    /// Where to store the friendships
    pub fn friendships_path(&self) -> PathBuf {
        self.data_folder.join(&self.friendships_file)
    }

    pub fn texts_path(&self) -> PathBuf {
        self.data_folder.join(&self.texts_file)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.friendships_file.trim().is_empty() {
            return Err("Friendships file name cannot be empty".to_string());
        }
        if self.texts_file.trim().is_empty() {
            return Err("Texts file name cannot be empty".to_string());
        }
        Ok(())
    }
}
