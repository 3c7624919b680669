//! Flat-file persistence for the friendship relation
//!
//! One directed pair per line, `<friend> <-> <player>`. Both directions of
//! every friendship are written, so the order of the two identifiers on a
//! line carries no meaning and loading re-inserts each pair symmetrically.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::{fs as tokio_fs, io::AsyncWriteExt};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::config::MalformedLinePolicy;
use crate::error::{StorageError, StorageResult};
use crate::types::PlayerId;

pub const DELIMITER_IN_SAVED_FILE: &str = " <-> ";

/// Pairs read back from storage
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadedPairs {
    pub pairs: Vec<(PlayerId, PlayerId)>,
    /// Line numbers (1-based) that were skipped as malformed
    pub skipped_lines: Vec<usize>,
}

/// Friendship storage trait
#[async_trait]
pub trait FriendshipStorage: Send + Sync + std::fmt::Debug {
    /// Load every persisted pair. A missing store is empty, not an error.
    async fn load(&self) -> StorageResult<LoadedPairs>;

    /// Replace the persisted data with the given directed pairs
    async fn save(&self, pairs: &[(PlayerId, PlayerId)]) -> StorageResult<()>;

    /// Moves the persisted data out of the way of the next save. Returns
    /// where it went, or `None` if this backend keeps no copy, in which case
    /// the caller must not save over it.
    async fn back_up(&self) -> StorageResult<Option<PathBuf>> {
        Ok(None)
    }
}

/// Newline-delimited text file storage
#[derive(Debug, Clone)]
pub struct FlatFileStorage {
    path: PathBuf,
    on_malformed_line: MalformedLinePolicy,
}

impl FlatFileStorage {
    pub fn new(path: PathBuf, on_malformed_line: MalformedLinePolicy) -> Self {
        Self {
            path,
            on_malformed_line,
        }
    }
}

/// `path` with `.suffix` appended to its file name
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

#[async_trait]
impl FriendshipStorage for FlatFileStorage {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> StorageResult<LoadedPairs> {
        let contents = match tokio_fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No saved friendships at {}", self.path.display());
                return Ok(LoadedPairs::default());
            }
            Err(e) => return Err(StorageError::FileRead(self.path.clone(), e)),
        };

        parse_document(&self.path, &contents, self.on_malformed_line)
    }

    #[instrument(skip(self, pairs), fields(path = %self.path.display(), pairs = pairs.len()))]
    async fn save(&self, pairs: &[(PlayerId, PlayerId)]) -> StorageResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio_fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::FileCreate(parent.to_path_buf(), e))?;
        }

        let contents = render_document(pairs);
        let temp_path = self.path.with_extension("tmp");

        let mut file = tokio_fs::File::create(&temp_path)
            .await
            .map_err(|e| StorageError::FileCreate(temp_path.clone(), e))?;

        file.write_all(contents.as_bytes())
            .await
            .map_err(|e| StorageError::FileWrite(temp_path.clone(), e))?;

        file.sync_all()
            .await
            .map_err(|e| StorageError::FileSync(temp_path.clone(), e))?;
        drop(file);

        tokio_fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StorageError::FileRename(temp_path, self.path.clone(), e))?;

        info!("Wrote {} friendship lines to {}", pairs.len(), self.path.display());
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn back_up(&self) -> StorageResult<Option<PathBuf>> {
        let mut backup = sibling(&self.path, "bak");
        let mut attempt = 1;
        while tokio_fs::try_exists(&backup).await.unwrap_or(false) {
            backup = sibling(&self.path, &format!("bak.{attempt}"));
            attempt += 1;
        }

        tokio_fs::rename(&self.path, &backup)
            .await
            .map_err(|e| StorageError::FileRename(self.path.clone(), backup.clone(), e))?;

        warn!("Moved {} to {}", self.path.display(), backup.display());
        Ok(Some(backup))
    }
}

/// Parse a whole friendships file. `path` is only used for error reporting.
pub fn parse_document(
    path: &Path,
    contents: &str,
    policy: MalformedLinePolicy,
) -> StorageResult<LoadedPairs> {
    let mut loaded = LoadedPairs::default();

    for (index, raw) in contents.lines().enumerate() {
        let line_number = index + 1;
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        match parse_line(path, line_number, line) {
            Ok(pair) => loaded.pairs.push(pair),
            Err(e) => match policy {
                MalformedLinePolicy::Abort => return Err(e),
                MalformedLinePolicy::Skip => {
                    warn!("Skipping line {}: {}", line_number, e);
                    loaded.skipped_lines.push(line_number);
                }
            },
        }
    }

    Ok(loaded)
}

fn parse_line(path: &Path, line_number: usize, line: &str) -> StorageResult<(PlayerId, PlayerId)> {
    let split: Vec<&str> = line.split(DELIMITER_IN_SAVED_FILE).collect();
    let [first, second] = split.as_slice() else {
        return Err(StorageError::MalformedLine {
            path: path.to_path_buf(),
            line_number,
            line: line.to_string(),
        });
    };

    let parse = |token: &str| {
        Uuid::parse_str(token.trim()).map_err(|source| StorageError::InvalidIdentifier {
            path: path.to_path_buf(),
            line_number,
            source,
        })
    };

    Ok((parse(*first)?, parse(*second)?))
}

/// One line per directed pair, sorted so repeated saves are byte-identical.
pub fn render_document(pairs: &[(PlayerId, PlayerId)]) -> String {
    let mut lines: Vec<String> = pairs
        .iter()
        .map(|(player, friend)| format!("{friend}{DELIMITER_IN_SAVED_FILE}{player}"))
        .collect();
    lines.sort_unstable();

    let mut contents = lines.join("\n");
    if !contents.is_empty() {
        contents.push('\n');
    }
    contents
}
