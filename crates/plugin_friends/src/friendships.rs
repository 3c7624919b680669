//! Symmetric friendship relation store
//!
//! Every friendship is kept as two directed entries so neighbour lookup is
//! O(1) from either side. All mutations go through `add_friendship` and
//! `remove_friendship`, which always touch both directions.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::error::{FriendshipError, FriendshipResult};
use crate::types::{is_null, PlayerId};

/// Manages all friendships data.
#[derive(Debug, Default, Clone)]
pub struct Friendships {
    table: HashMap<PlayerId, HashSet<PlayerId>>,
}

impl Friendships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a friendship between the two given players. The order does not matter.
    pub fn add_friendship(&mut self, some: PlayerId, other: PlayerId) -> FriendshipResult<()> {
        check_not_null(&some, &other)?;
        if some == other {
            return Err(FriendshipError::InvalidArgument(
                "a player cannot be friends with themselves",
            ));
        }

        self.table.entry(some).or_default().insert(other);
        self.table.entry(other).or_default().insert(some);
        debug!("Friendship added: {} <-> {}", some, other);
        Ok(())
    }

    /// Removes the friendship between the two given players, if there is one.
    pub fn remove_friendship(&mut self, some: PlayerId, other: PlayerId) -> FriendshipResult<()> {
        check_not_null(&some, &other)?;
        let removed = self.remove_directed(some, other) | self.remove_directed(other, some);
        if removed {
            debug!("Friendship removed: {} <-> {}", some, other);
        }
        Ok(())
    }

    /// Whether the given players are friends or not.
    pub fn are_friends(&self, some: PlayerId, other: PlayerId) -> FriendshipResult<bool> {
        check_not_null(&some, &other)?;
        if some == other {
            return Err(FriendshipError::InvalidArgument(
                "cannot check a friendship of a player with themselves",
            ));
        }

        Ok(self
            .table
            .get(&some)
            .is_some_and(|friends| friends.contains(&other)))
    }

    /// All the friends of the given player.
    pub fn get_friends(&self, player: PlayerId) -> HashSet<PlayerId> {
        self.table.get(&player).cloned().unwrap_or_default()
    }

    /// Number of (unordered) friendships.
    pub fn len(&self) -> usize {
        self.table.values().map(HashSet::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Every directed entry of the table as `(player, friend)`.
    pub fn directed_pairs(&self) -> impl Iterator<Item = (PlayerId, PlayerId)> + '_ {
        self.table
            .iter()
            .flat_map(|(player, friends)| friends.iter().map(move |friend| (*player, *friend)))
    }

    /// Inserts loaded pairs symmetrically. Pairs the store refuses are logged
    /// and counted.
    pub fn extend_pairs<I>(&mut self, pairs: I) -> usize
    where
        I: IntoIterator<Item = (PlayerId, PlayerId)>,
    {
        let mut rejected = 0;
        for (some, other) in pairs {
            if let Err(e) = self.add_friendship(some, other) {
                warn!("Ignoring friendship {} <-> {}: {}", some, other, e);
                rejected += 1;
            }
        }
        rejected
    }

    fn remove_directed(&mut self, from: PlayerId, to: PlayerId) -> bool {
        let Some(friends) = self.table.get_mut(&from) else {
            return false;
        };
        let removed = friends.remove(&to);
        if friends.is_empty() {
            self.table.remove(&from);
        }
        removed
    }
}

fn check_not_null(some: &PlayerId, other: &PlayerId) -> FriendshipResult<()> {
    if is_null(some) || is_null(other) {
        return Err(FriendshipError::InvalidArgument("player identifier must not be null"));
    }
    Ok(())
}
