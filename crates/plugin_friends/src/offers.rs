//! Generic pending-offer workflow
//!
//! An offer is a directed proposal from a sender to a recipient. While it is
//! pending the manager owns it; it then leaves the manager through exactly
//! one of accept, deny, take back or expiry. What an outcome means is left
//! to an [`OfferPolicy`], so the same engine can back any kind of
//! player-to-player invitation.

use std::time::{Duration, Instant};

use tracing::debug;
use uuid::Uuid;

use crate::error::{OfferError, OfferResult};
use crate::types::{OfferId, PlayerId};

/// A pending proposal from `sender` to `recipient`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Offer {
    pub id: OfferId,
    pub sender: PlayerId,
    pub recipient: PlayerId,
    pub created_at: Instant,
}

impl Offer {
    pub fn new(sender: PlayerId, recipient: PlayerId, now: Instant) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            recipient,
            created_at: now,
        }
    }

    pub fn is_expired(&self, time_to_live: Option<Duration>, now: Instant) -> bool {
        time_to_live.is_some_and(|ttl| now.saturating_duration_since(self.created_at) >= ttl)
    }
}

/// Hooks run when an offer leaves the pending state.
///
/// `Context` is whatever state acceptance mutates; the manager only passes
/// it through.
pub trait OfferPolicy {
    type Context;

    /// Runs once per accepted offer
    fn on_accepted(&self, ctx: &mut Self::Context, offer: &Offer) -> OfferResult<()>;

    fn on_posted(&self, _offer: &Offer) {}

    fn on_denied(&self, _offer: &Offer) {}

    fn on_taken_back(&self, _offer: &Offer) {}

    fn on_expired(&self, _offer: &Offer) {}
}

/// Pending offers, in posting order
#[derive(Debug)]
pub struct OffersManager<P: OfferPolicy> {
    policy: P,
    pending: Vec<Offer>,
    time_to_live: Option<Duration>,
}

impl<P: OfferPolicy> OffersManager<P> {
    pub fn new(policy: P, time_to_live: Option<Duration>) -> Self {
        Self {
            policy,
            pending: Vec::new(),
            time_to_live,
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Queues a new offer
    pub fn post(&mut self, offer: Offer, now: Instant) -> OfferResult<OfferId> {
        if offer.sender == offer.recipient {
            return Err(OfferError::SelfOffer);
        }

        if let Some(index) = self.position(offer.sender, offer.recipient) {
            if !self.pending[index].is_expired(self.time_to_live, now) {
                return Err(OfferError::AlreadyPending {
                    sender: offer.sender,
                    recipient: offer.recipient,
                });
            }
            let stale = self.pending.remove(index);
            self.policy.on_expired(&stale);
        }

        debug!("Offer {} posted: {} -> {}", offer.id, offer.sender, offer.recipient);
        self.policy.on_posted(&offer);
        let id = offer.id;
        self.pending.push(offer);
        Ok(id)
    }

    /// Accepts the offer sent to `recipient` by `sender`, or the only live
    /// one when no sender is given.
    pub fn accept(
        &mut self,
        ctx: &mut P::Context,
        recipient: PlayerId,
        sender: Option<PlayerId>,
        now: Instant,
    ) -> OfferResult<Offer> {
        let offer = self.take_resolved(recipient, sender, now)?;
        debug!("Offer {} accepted", offer.id);
        self.policy.on_accepted(ctx, &offer)?;
        Ok(offer)
    }

    pub fn deny(
        &mut self,
        recipient: PlayerId,
        sender: Option<PlayerId>,
        now: Instant,
    ) -> OfferResult<Offer> {
        let offer = self.take_resolved(recipient, sender, now)?;
        debug!("Offer {} denied", offer.id);
        self.policy.on_denied(&offer);
        Ok(offer)
    }

    /// Withdraws an offer previously sent by `sender`
    pub fn take_back(
        &mut self,
        sender: PlayerId,
        recipient: PlayerId,
        now: Instant,
    ) -> OfferResult<Offer> {
        let index = self
            .position(sender, recipient)
            .ok_or(OfferError::NoPendingOffer)?;
        let offer = self.remove_live(index, now)?;
        debug!("Offer {} taken back", offer.id);
        self.policy.on_taken_back(&offer);
        Ok(offer)
    }

    /// Drops the pending offer from `sender` to `recipient` without running
    /// any callback.
    pub fn discard(&mut self, sender: PlayerId, recipient: PlayerId) -> Option<Offer> {
        let index = self.position(sender, recipient)?;
        let offer = self.pending.remove(index);
        debug!("Offer {} discarded", offer.id);
        Some(offer)
    }

    /// Live offers received by `recipient`
    pub fn pending_for(&self, recipient: PlayerId, now: Instant) -> Vec<&Offer> {
        self.live(now).filter(|o| o.recipient == recipient).collect()
    }

    /// Live offers sent by `sender`
    pub fn sent_by(&self, sender: PlayerId, now: Instant) -> Vec<&Offer> {
        self.live(now).filter(|o| o.sender == sender).collect()
    }

    /// Removes and returns every offer past its time-to-live
    pub fn expire(&mut self, now: Instant) -> Vec<Offer> {
        let ttl = self.time_to_live;
        let (expired, live): (Vec<Offer>, Vec<Offer>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|o| o.is_expired(ttl, now));
        self.pending = live;

        for offer in &expired {
            debug!("Offer {} expired", offer.id);
            self.policy.on_expired(offer);
        }
        expired
    }

    /// Number of stored offers, expired ones included until the next sweep
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    fn live(&self, now: Instant) -> impl Iterator<Item = &Offer> {
        let ttl = self.time_to_live;
        self.pending.iter().filter(move |o| !o.is_expired(ttl, now))
    }

    fn position(&self, sender: PlayerId, recipient: PlayerId) -> Option<usize> {
        self.pending
            .iter()
            .position(|o| o.sender == sender && o.recipient == recipient)
    }

    fn take_resolved(
        &mut self,
        recipient: PlayerId,
        sender: Option<PlayerId>,
        now: Instant,
    ) -> OfferResult<Offer> {
        let index = match sender {
            Some(sender) => self
                .position(sender, recipient)
                .ok_or(OfferError::NoPendingOffer)?,
            None => {
                let candidates: Vec<&Offer> = self.pending_for(recipient, now);
                match candidates.as_slice() {
                    [] => return Err(OfferError::NoPendingOffer),
                    [only] => {
                        let sender = only.sender;
                        self.position(sender, recipient)
                            .ok_or(OfferError::NoPendingOffer)?
                    }
                    many => {
                        return Err(OfferError::AmbiguousOffer(
                            many.iter().map(|o| o.sender).collect(),
                        ))
                    }
                }
            }
        };
        self.remove_live(index, now)
    }

    fn remove_live(&mut self, index: usize, now: Instant) -> OfferResult<Offer> {
        let offer = self.pending.remove(index);
        if offer.is_expired(self.time_to_live, now) {
            self.policy.on_expired(&offer);
            return Err(OfferError::Expired {
                sender: offer.sender,
                recipient: offer.recipient,
            });
        }
        Ok(offer)
    }
}
