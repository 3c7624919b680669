//! Friends - player friendships plugin
//!
//! Lets players send each other friend requests, and list or remove their
//! friends from chat:
//! - a symmetric friendship store persisted to a flat text file
//! - a generic offer workflow, specialised for friend requests
//! - `/friend` subcommands rendered as chat components
//!
//! The host owns the plugin and hands it its collaborators at construction
//! time; nothing here is global.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub mod chat;
pub mod commands;
pub mod config;
pub mod error;
pub mod friend_offers;
pub mod friendships;
pub mod host;
pub mod offers;
pub mod storage;
pub mod texts;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::chat::{ChatColor, ChatComponent, ChatMessage};
pub use crate::commands::FriendCommand;
pub use crate::config::{FriendsConfig, MalformedLinePolicy};
pub use crate::error::*;
pub use crate::friend_offers::{FriendOfferPolicy, FriendOffers};
pub use crate::friendships::Friendships;
pub use crate::host::{HostPlugin, Messenger, PlayerDirectory};
pub use crate::offers::{Offer, OfferPolicy, OffersManager};
pub use crate::storage::{FlatFileStorage, FriendshipStorage};
pub use crate::texts::{Text, Texts};
pub use crate::types::*;

// ============================================================================
// Core Plugin Implementation
// ============================================================================

/// Friends plugin
pub struct FriendsPlugin {
    name: String,
    version: String,
    config: FriendsConfig,
    friendships: Friendships,
    offers: FriendOffers,
    storage: Box<dyn FriendshipStorage>,
    directory: Arc<dyn PlayerDirectory>,
    messenger: Arc<dyn Messenger>,
    texts: Arc<Texts>,
    enabled: bool,
    /// Saved data existed but could not be read on enable
    load_failed: bool,
}

impl FriendsPlugin {
    /// Plugin persisting to the flat file named by `config`
    pub fn new(
        config: FriendsConfig,
        directory: Arc<dyn PlayerDirectory>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        let storage = FlatFileStorage::new(
            config.friendships_path(),
            config.storage.on_malformed_line,
        );
        Self::with_storage(config, Box::new(storage), directory, messenger)
    }

    pub fn with_storage(
        config: FriendsConfig,
        storage: Box<dyn FriendshipStorage>,
        directory: Arc<dyn PlayerDirectory>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        let texts = Arc::new(Texts::default());
        let offers = FriendOffers::new(
            config.offers.time_to_live(),
            directory.clone(),
            messenger.clone(),
            texts.clone(),
        );

        Self {
            name: "friends".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            config,
            friendships: Friendships::new(),
            offers,
            storage,
            directory,
            messenger,
            texts,
            enabled: false,
            load_failed: false,
        }
    }

    pub fn config(&self) -> &FriendsConfig {
        &self.config
    }

    pub fn friendships(&self) -> &Friendships {
        &self.friendships
    }

    pub fn friendships_mut(&mut self) -> &mut Friendships {
        &mut self.friendships
    }

    pub fn offers(&self) -> &FriendOffers {
        &self.offers
    }

    pub fn texts(&self) -> &Texts {
        &self.texts
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_texts(&mut self, texts: Texts) {
        self.texts = Arc::new(texts);
        self.offers.set_texts(self.texts.clone());
    }

    /// Reads the saved friendships into the (empty) store.
    async fn load_saved_data(&mut self) -> StorageResult<()> {
        let loaded = self.storage.load().await?;
        let rejected = self.friendships.extend_pairs(loaded.pairs);
        let skipped = loaded.skipped_lines.len() + rejected;

        if skipped > 0 {
            warn!("Skipped {} unusable friendship lines", skipped);
        }
        info!("📋 Successfully loaded {} friendships", self.friendships.len());
        Ok(())
    }

    /// Writes every directed entry of the store.
    async fn save_data(&self) -> StorageResult<()> {
        let pairs: Vec<(PlayerId, PlayerId)> = self.friendships.directed_pairs().collect();
        self.storage.save(&pairs).await?;
        info!("💾 Successfully saved {} friendships", self.friendships.len());
        Ok(())
    }

    /// Backs up the file that failed to load so saving cannot destroy it.
    async fn set_aside_unreadable_data(&self) -> bool {
        match self.storage.back_up().await {
            Ok(Some(backup)) => {
                warn!("Unreadable friendships kept in {}", backup.display());
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Could not back up unreadable friendships: {}", e);
                false
            }
        }
    }

    // ------------------------------------------------------------------------
    // Command surface
    // ------------------------------------------------------------------------

    /// Runs `/friend <args>` on behalf of `source`. Every failure has already
    /// been reported to the player when this returns `Err`.
    pub fn execute(&mut self, source: PlayerId, args: &[&str], now: Instant) -> PluginResult<()> {
        match FriendCommand::parse(args) {
            Ok(command) => self.dispatch(source, command, now),
            Err(e) => {
                let error = e.to_string();
                self.send(source, self.texts.usage.format(&[("error", &error)]));
                Err(e.into())
            }
        }
    }

    pub fn dispatch(&mut self, source: PlayerId, command: FriendCommand, now: Instant) -> PluginResult<()> {
        debug!("{} runs {:?}", source, command);
        match command {
            FriendCommand::List => {
                self.list_friends(source);
                Ok(())
            }
            FriendCommand::Remove(friend) => self.remove_friend(source, friend),
            FriendCommand::Propose(target) => self.propose(source, &target, now),
            FriendCommand::Accept(sender) => self.accept(source, sender.as_deref(), now),
            FriendCommand::Deny(sender) => self.deny(source, sender.as_deref(), now),
            FriendCommand::TakeBack(target) => self.take_back(source, &target, now),
            FriendCommand::Pending => {
                self.list_pending(source, now);
                Ok(())
            }
        }
    }

    /// Sends the offline then the online friends of `source`
    pub fn list_friends(&self, source: PlayerId) {
        let mut friends: Vec<(String, PlayerId, PlayerStatus)> = self
            .friendships
            .get_friends(source)
            .into_iter()
            .map(|id| (self.directory.name_or_id(id), id, self.directory.status(id)))
            .collect();
        friends.sort();

        self.send_friend_group(source, PlayerStatus::Offline, &friends);
        self.send_friend_group(source, PlayerStatus::Online, &friends);
    }

    fn send_friend_group(
        &self,
        source: PlayerId,
        status: PlayerStatus,
        friends: &[(String, PlayerId, PlayerStatus)],
    ) {
        let (header, empty) = match status {
            PlayerStatus::Online => (&self.texts.online_friends, &self.texts.no_online_friends),
            PlayerStatus::Offline => (&self.texts.offline_friends, &self.texts.no_offline_friends),
        };

        let entries: Vec<ChatComponent> = friends
            .iter()
            .filter(|(_, _, s)| *s == status)
            .map(|(name, id, _)| friend_entry(name, *id))
            .collect();

        if entries.is_empty() {
            self.send(source, empty.message());
            return;
        }

        self.send(source, header.message());
        let mut line = chat::join(entries, &ChatComponent::colored(", ", ChatColor::Gray));
        line.append(ChatComponent::colored(".", ChatColor::Gray));
        self.send(source, ChatMessage::information(line));
    }

    fn remove_friend(&mut self, source: PlayerId, friend: PlayerId) -> PluginResult<()> {
        if !self.friendships.are_friends(source, friend).unwrap_or(false) {
            self.send(source, self.texts.not_friend_with_that_player.message());
            return Err(FriendshipError::NotFriends(friend).into());
        }

        self.friendships.remove_friendship(source, friend)?;

        let friend_name = self.directory.name_or_id(friend);
        let source_name = self.directory.name_or_id(source);
        self.send(
            source,
            self.texts.not_friend_with_other_anymore.format(&[("player", &friend_name)]),
        );
        self.notify_if_online(
            friend,
            self.texts.other_is_no_longer_friend_with_you.format(&[("player", &source_name)]),
        );
        Ok(())
    }

    fn propose(&mut self, source: PlayerId, target: &str, now: Instant) -> PluginResult<()> {
        let recipient = self
            .directory
            .resolve(target)
            .filter(|id| self.directory.is_online(*id));
        let Some(recipient) = recipient else {
            self.send(source, self.texts.unknown_player.format(&[("player", target)]));
            return Err(CommandError::UnknownPlayer(target.to_string()).into());
        };

        let offer = Offer::new(source, recipient, now);
        if let Err(e) = self.offers.post(&self.friendships, offer, now) {
            self.report_offer_error(source, &e);
            return Err(e.into());
        }

        let recipient_name = self.directory.name_or_id(recipient);
        let source_name = self.directory.name_or_id(source);
        self.send(source, self.texts.offer_sent.format(&[("player", &recipient_name)]));
        self.send(recipient, self.texts.offer_received.format(&[("player", &source_name)]));
        Ok(())
    }

    fn accept(&mut self, source: PlayerId, sender: Option<&str>, now: Instant) -> PluginResult<()> {
        let sender = self.resolve_known(source, sender)?;

        let offer = match self.offers.accept(&mut self.friendships, source, sender, now) {
            Ok(offer) => offer,
            Err(e) => {
                self.report_offer_error(source, &e);
                return Err(e.into());
            }
        };

        let sender_name = self.directory.name_or_id(offer.sender);
        let source_name = self.directory.name_or_id(source);
        self.send(source, self.texts.now_friends.format(&[("player", &sender_name)]));
        self.notify_if_online(offer.sender, self.texts.now_friends.format(&[("player", &source_name)]));
        Ok(())
    }

    fn deny(&mut self, source: PlayerId, sender: Option<&str>, now: Instant) -> PluginResult<()> {
        let sender = self.resolve_known(source, sender)?;

        let offer = match self.offers.deny(source, sender, now) {
            Ok(offer) => offer,
            Err(e) => {
                self.report_offer_error(source, &e);
                return Err(e.into());
            }
        };

        let sender_name = self.directory.name_or_id(offer.sender);
        let source_name = self.directory.name_or_id(source);
        self.send(source, self.texts.offer_denied.format(&[("player", &sender_name)]));
        self.notify_if_online(
            offer.sender,
            self.texts.offer_denied_by_recipient.format(&[("player", &source_name)]),
        );
        Ok(())
    }

    fn take_back(&mut self, source: PlayerId, target: &str, now: Instant) -> PluginResult<()> {
        let Some(recipient) = self.resolve_known(source, Some(target))? else {
            return Err(CommandError::UnknownPlayer(target.to_string()).into());
        };

        if let Err(e) = self.offers.take_back(source, recipient, now) {
            self.report_offer_error(source, &e);
            return Err(e.into());
        }

        let recipient_name = self.directory.name_or_id(recipient);
        let source_name = self.directory.name_or_id(source);
        self.send(source, self.texts.offer_taken_back.format(&[("player", &recipient_name)]));
        self.notify_if_online(
            recipient,
            self.texts.offer_taken_back_by_sender.format(&[("player", &source_name)]),
        );
        Ok(())
    }

    /// Sends the offers `source` has received and sent
    pub fn list_pending(&self, source: PlayerId, now: Instant) {
        let received = self.names(self.offers.pending_for(source, now).iter().map(|o| o.sender));
        let sent = self.names(self.offers.sent_by(source, now).iter().map(|o| o.recipient));

        if received.is_empty() && sent.is_empty() {
            self.send(source, self.texts.no_pending_offers.message());
            return;
        }
        if !received.is_empty() {
            self.send(source, self.texts.pending_received.format(&[("players", &received)]));
        }
        if !sent.is_empty() {
            self.send(source, self.texts.pending_sent.format(&[("players", &sent)]));
        }
    }

    /// Drops expired offers and tells their senders. Returns how many expired.
    pub fn expire_offers(&mut self, now: Instant) -> usize {
        let expired = self.offers.expire(now);
        for offer in &expired {
            let recipient_name = self.directory.name_or_id(offer.recipient);
            self.notify_if_online(
                offer.sender,
                self.texts.offer_expired.format(&[("player", &recipient_name)]),
            );
        }
        expired.len()
    }

    /// Resolves an optional player argument, telling `source` when it names
    /// nobody.
    fn resolve_known(&self, source: PlayerId, name: Option<&str>) -> PluginResult<Option<PlayerId>> {
        let Some(name) = name else {
            return Ok(None);
        };
        match self.directory.resolve(name) {
            Some(id) => Ok(Some(id)),
            None => {
                self.send(source, self.texts.unknown_player.format(&[("player", name)]));
                Err(CommandError::UnknownPlayer(name.to_string()).into())
            }
        }
    }

    fn report_offer_error(&self, source: PlayerId, error: &OfferError) {
        let message = match error {
            OfferError::SelfOffer => self.texts.cannot_befriend_yourself.message(),
            // The gate has already told the sender
            OfferError::AlreadyFriends(_) => return,
            OfferError::AlreadyPending { recipient, .. } => {
                let name = self.directory.name_or_id(*recipient);
                self.texts.offer_already_pending.format(&[("player", &name)])
            }
            OfferError::NoPendingOffer => self.texts.no_pending_offer.message(),
            OfferError::AmbiguousOffer(senders) => {
                let players = self.names(senders.iter().copied());
                self.texts.ambiguous_offer.format(&[("players", &players)])
            }
            OfferError::Expired { sender, recipient } if *sender == source => {
                let name = self.directory.name_or_id(*recipient);
                self.texts.offer_expired.format(&[("player", &name)])
            }
            OfferError::Expired { sender, .. } => {
                let name = self.directory.name_or_id(*sender);
                self.texts.offer_expired_on_answer.format(&[("player", &name)])
            }
            OfferError::Policy(e) => {
                warn!("Friend offer callback failed for {}: {}", source, e);
                return;
            }
        };
        self.send(source, message);
    }

    fn names(&self, players: impl Iterator<Item = PlayerId>) -> String {
        players
            .map(|id| self.directory.name_or_id(id))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn send(&self, player: PlayerId, message: ChatMessage) {
        self.messenger.send(player, message);
    }

    fn notify_if_online(&self, player: PlayerId, message: ChatMessage) {
        if self.directory.is_online(player) {
            self.send(player, message);
        }
    }
}

/// Friend name followed by a clickable ` [X]` remove marker
fn friend_entry(name: &str, friend: PlayerId) -> ChatComponent {
    let mut marker = ChatComponent::colored(" [", ChatColor::Gray)
        .on_click_run(commands::remove_command_line(friend));
    marker.append(ChatComponent::colored("X", ChatColor::Red));
    marker.append(ChatComponent::colored("]", ChatColor::Gray));

    let mut entry = ChatComponent::colored(name, ChatColor::Gray);
    entry.append(marker);
    entry
}

#[async_trait]
impl HostPlugin for FriendsPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }

    async fn on_enable(&mut self) -> Result<(), PluginError> {
        self.config.validate().map_err(PluginError::Config)?;
        info!("👥 Enabling {} v{}", self.name, self.version);

        match Texts::load(&self.config.texts_path()).await {
            Ok(texts) => self.set_texts(texts),
            Err(e) => warn!("Could not read texts, using defaults: {}", e),
        }

        self.friendships.clear();
        self.load_failed = false;
        if let Err(e) = self.load_saved_data().await {
            warn!("Could not read saved friendships: {}", e);
            self.friendships.clear();
            self.load_failed = true;
        }

        self.enabled = true;
        Ok(())
    }

    async fn on_disable(&mut self) -> Result<(), PluginError> {
        if !self.enabled {
            warn!("{} was never enabled, not saving", self.name);
            return Ok(());
        }

        if self.load_failed && !self.set_aside_unreadable_data().await {
            warn!("Not saving friendships, the unreadable file is left untouched");
        } else if let Err(e) = self.save_data().await {
            warn!("Could not save friendships: {}", e);
        }

        self.friendships.clear();
        self.offers.clear();
        self.enabled = false;
        info!("👥 {} disabled", self.name);
        Ok(())
    }
}
