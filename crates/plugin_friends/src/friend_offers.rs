//! Friend requests: the offers engine wired to the friendship store

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::{OfferError, OfferResult};
use crate::friendships::Friendships;
use crate::host::{Messenger, PlayerDirectory};
use crate::offers::{Offer, OfferPolicy, OffersManager};
use crate::texts::Texts;
use crate::types::{OfferId, PlayerId};

/// Accepting a friend offer creates the friendship
#[derive(Debug, Default, Clone, Copy)]
pub struct FriendOfferPolicy;

impl OfferPolicy for FriendOfferPolicy {
    type Context = Friendships;

    fn on_accepted(&self, friendships: &mut Friendships, offer: &Offer) -> OfferResult<()> {
        friendships.add_friendship(offer.sender, offer.recipient)?;
        info!("🤝 {} and {} are now friends", offer.sender, offer.recipient);
        Ok(())
    }

    fn on_expired(&self, offer: &Offer) {
        debug!("Friend offer {} -> {} expired", offer.sender, offer.recipient);
    }
}

/// Gate in front of the offers engine that refuses offers between players
/// who are already friends.
pub struct FriendOffers {
    manager: OffersManager<FriendOfferPolicy>,
    directory: Arc<dyn PlayerDirectory>,
    messenger: Arc<dyn Messenger>,
    texts: Arc<Texts>,
}

impl FriendOffers {
    pub fn new(
        time_to_live: Option<Duration>,
        directory: Arc<dyn PlayerDirectory>,
        messenger: Arc<dyn Messenger>,
        texts: Arc<Texts>,
    ) -> Self {
        Self {
            manager: OffersManager::new(FriendOfferPolicy, time_to_live),
            directory,
            messenger,
            texts,
        }
    }

    pub fn set_texts(&mut self, texts: Arc<Texts>) {
        self.texts = texts;
    }

    /// Posts `offer` unless its players are already friends, in which case
    /// only the sender is told and the offer is dropped.
    pub fn post(
        &mut self,
        friendships: &Friendships,
        offer: Offer,
        now: Instant,
    ) -> OfferResult<OfferId> {
        if offer.sender == offer.recipient {
            return Err(OfferError::SelfOffer);
        }

        if friendships.are_friends(offer.sender, offer.recipient)? {
            let name = self.directory.name_or_id(offer.recipient);
            self.messenger.send(
                offer.sender,
                self.texts.already_friend_with_other.format(&[("player", &name)]),
            );
            return Err(OfferError::AlreadyFriends(offer.recipient));
        }

        self.manager.post(offer, now)
    }

    /// Accepts a pending offer. A crossed offer the other way round is
    /// dropped, the players being friends now.
    pub fn accept(
        &mut self,
        friendships: &mut Friendships,
        recipient: PlayerId,
        sender: Option<PlayerId>,
        now: Instant,
    ) -> OfferResult<Offer> {
        let offer = self.manager.accept(friendships, recipient, sender, now)?;
        self.manager.discard(offer.recipient, offer.sender);
        Ok(offer)
    }

    pub fn deny(
        &mut self,
        recipient: PlayerId,
        sender: Option<PlayerId>,
        now: Instant,
    ) -> OfferResult<Offer> {
        self.manager.deny(recipient, sender, now)
    }

    pub fn take_back(
        &mut self,
        sender: PlayerId,
        recipient: PlayerId,
        now: Instant,
    ) -> OfferResult<Offer> {
        self.manager.take_back(sender, recipient, now)
    }

    pub fn pending_for(&self, recipient: PlayerId, now: Instant) -> Vec<&Offer> {
        self.manager.pending_for(recipient, now)
    }

    pub fn sent_by(&self, sender: PlayerId, now: Instant) -> Vec<&Offer> {
        self.manager.sent_by(sender, now)
    }

    pub fn expire(&mut self, now: Instant) -> Vec<Offer> {
        self.manager.expire(now)
    }

    pub fn len(&self) -> usize {
        self.manager.len()
    }

    pub fn is_empty(&self) -> bool {
        self.manager.is_empty()
    }

    pub fn clear(&mut self) {
        self.manager.clear();
    }
}
