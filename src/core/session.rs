//! Review session state.
//!
//! A `ReviewSession` owns the transient view state of one study sitting:
//! which card is showing and whether its answer side is visible. Nothing here
//! is persisted; only the scheduling fields written through the card store
//! outlive the session.

use chrono::{DateTime, Utc};

use super::card::Flashcard;
use super::clock::Clock;
use super::scheduler::{advance, review_in, AdvancePolicy};
use crate::error::{Result, TabulaeError};
use crate::storage::{CardStore, ScheduleUpdate};

/// One study sitting over a learner's deck.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    /// The deck as loaded, refreshed with each stored review.
    cards: Vec<Flashcard>,
    /// Indices into `cards`, in presentation order.
    queue: Vec<usize>,
    /// Position in `queue` of the card being shown.
    position: usize,
    /// Whether the answer side is showing.
    flipped: bool,
    policy: AdvancePolicy,
    reviewed: usize,
}

impl ReviewSession {
    /// Start a session over `cards` (in store listing order).
    ///
    /// `CycleAllCards` queues the whole deck; `CycleDueOnly` queues the cards
    /// due at `now`.
    pub fn new(cards: Vec<Flashcard>, policy: AdvancePolicy, now: DateTime<Utc>) -> Self {
        let queue: Vec<usize> = match policy {
            AdvancePolicy::CycleAllCards => (0..cards.len()).collect(),
            AdvancePolicy::CycleDueOnly => cards
                .iter()
                .enumerate()
                .filter(|(_, card)| card.is_due(now))
                .map(|(i, _)| i)
                .collect(),
        };

        tracing::debug!(
            cards = cards.len(),
            queued = queue.len(),
            policy = policy.as_config_value(),
            "starting review session"
        );

        Self {
            cards,
            queue,
            position: 0,
            flipped: false,
            policy,
            reviewed: 0,
        }
    }

    /// Load an owner's deck from a store and start a session.
    pub fn load<S, C>(store: &S, clock: &C, owner_id: &str, policy: AdvancePolicy) -> Result<Self>
    where
        S: CardStore + ?Sized,
        C: Clock + ?Sized,
    {
        let cards = store.list(owner_id)?;
        Ok(Self::new(cards, policy, clock.now()))
    }

    pub fn policy(&self) -> AdvancePolicy {
        self.policy
    }

    /// The card being shown, if any.
    pub fn current(&self) -> Option<&Flashcard> {
        self.queue
            .get(self.position)
            .and_then(|&index| self.cards.get(index))
    }

    /// Position of the current card in the queue (0-based).
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// All cards of the deck, reflecting reviews stored during this session.
    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }

    /// Number of ratings stored during this session.
    pub fn reviewed(&self) -> usize {
        self.reviewed
    }

    /// A session is finished once its queue is empty.
    ///
    /// Under `CycleAllCards` that only happens for an empty deck.
    pub fn is_finished(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Toggle between front and back. Returns the new flip state.
    pub fn flip(&mut self) -> bool {
        self.flipped = !self.flipped;
        self.flipped
    }

    /// Move to the next card without rating the current one.
    pub fn skip(&mut self) {
        self.flipped = false;
        if let Some(next) = advance(self.position, self.queue.len()) {
            self.position = next;
        }
    }

    /// Rate the current card, persist its new schedule and advance.
    ///
    /// The write is conditional on the version the session loaded, so a
    /// review stored by another device in the meantime surfaces as
    /// `VersionConflict` instead of being overwritten. On a conflict the
    /// session reloads the card from the store, so rating it again applies
    /// to the stored schedule; under `CycleDueOnly` a reloaded card that is
    /// no longer due leaves the queue. On any other error the session does
    /// not move.
    pub fn rate<S, C>(&mut self, quality: u8, store: &S, clock: &C) -> Result<Flashcard>
    where
        S: CardStore + ?Sized,
        C: Clock + ?Sized,
    {
        let index = *self
            .queue
            .get(self.position)
            .ok_or(TabulaeError::NoCurrentCard)?;

        let now = clock.now();
        let current = &self.cards[index];
        let reviewed = review_in(current, quality, now, clock.zone())?;
        let update = ScheduleUpdate::conditional(reviewed.schedule, current.version);
        let stored = match store.update(reviewed.id, &update) {
            Ok(stored) => stored,
            Err(e @ TabulaeError::VersionConflict { .. }) => {
                self.refresh(index, store, now)?;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        self.cards[index] = stored.clone();
        self.reviewed += 1;
        self.flipped = false;

        match self.policy {
            AdvancePolicy::CycleAllCards => self.skip(),
            AdvancePolicy::CycleDueOnly => {
                if stored.is_due(now) {
                    self.skip();
                } else {
                    self.dequeue_current();
                }
            }
        }

        tracing::debug!(
            card_id = %stored.id,
            quality,
            remaining = self.queue.len(),
            "stored review"
        );

        Ok(stored)
    }

    /// Replace the in-session copy of `cards[index]` with the stored card.
    fn refresh<S>(&mut self, index: usize, store: &S, now: DateTime<Utc>) -> Result<()>
    where
        S: CardStore + ?Sized,
    {
        let id = self.cards[index].id;
        let Some(fresh) = store.get(id)? else {
            return Err(TabulaeError::card_not_found(id));
        };

        tracing::debug!(card_id = %id, version = fresh.version, "reloaded card after conflict");
        let still_due = fresh.is_due(now);
        self.cards[index] = fresh;
        self.flipped = false;

        if self.policy == AdvancePolicy::CycleDueOnly && !still_due {
            self.dequeue_current();
        }
        Ok(())
    }

    /// Drop the current card from the queue; the next card slides into its place.
    fn dequeue_current(&mut self) {
        self.queue.remove(self.position);
        if self.position >= self.queue.len() {
            self.position = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;
    use crate::storage::MemoryCardStore;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        "2026-03-01T09:30:00Z".parse().unwrap()
    }

    /// Three cards created a minute apart; the middle one is not due.
    fn setup() -> (MemoryCardStore, Vec<Flashcard>) {
        let a = Flashcard::new("learner-1", "a", "A", now() - Duration::minutes(3)).unwrap();
        let mut b = Flashcard::new("learner-1", "b", "B", now() - Duration::minutes(2)).unwrap();
        b.schedule.next_review = Some(now() + Duration::days(3));
        let c = Flashcard::new("learner-1", "c", "C", now() - Duration::minutes(1)).unwrap();

        let store = MemoryCardStore::with_cards(vec![a, b, c]);
        let cards = store.list("learner-1").unwrap();
        (store, cards)
    }

    fn front(session: &ReviewSession) -> Option<&str> {
        session.current().map(|c| c.front.as_str())
    }

    #[test]
    fn test_cycle_all_cards_visits_whole_deck() {
        let (store, cards) = setup();
        let clock = FixedClock::new(now());
        let mut session = ReviewSession::new(cards, AdvancePolicy::CycleAllCards, now());

        assert_eq!(session.queue_len(), 3);
        assert_eq!(front(&session), Some("a"));

        session.rate(4, &store, &clock).unwrap();
        assert_eq!(front(&session), Some("b"));

        session.rate(4, &store, &clock).unwrap();
        assert_eq!(front(&session), Some("c"));

        session.rate(4, &store, &clock).unwrap();
        assert_eq!(front(&session), Some("a"));
        assert!(!session.is_finished());
        assert_eq!(session.reviewed(), 3);
    }

    #[test]
    fn test_cycle_due_only_skips_future_cards() {
        let (store, cards) = setup();
        let clock = FixedClock::new(now());
        let mut session = ReviewSession::new(cards, AdvancePolicy::CycleDueOnly, now());

        assert_eq!(session.queue_len(), 2);
        assert_eq!(front(&session), Some("a"));

        session.rate(3, &store, &clock).unwrap();
        assert_eq!(front(&session), Some("c"));
        assert_eq!(session.queue_len(), 1);

        session.rate(3, &store, &clock).unwrap();
        assert!(session.is_finished());
        assert!(session.current().is_none());
    }

    #[test]
    fn test_rate_persists_schedule() {
        let (store, cards) = setup();
        let clock = FixedClock::new(now());
        let first_id = cards[0].id;
        let mut session = ReviewSession::new(cards, AdvancePolicy::CycleAllCards, now());

        let stored = session.rate(1, &store, &clock).unwrap();

        assert_eq!(stored.id, first_id);
        assert_eq!(stored.version, 1);
        assert_eq!(stored.schedule.repetitions, 0);
        assert!((stored.schedule.ease_factor - 1.96).abs() < 1e-9);
        assert_eq!(store.get(first_id).unwrap().unwrap(), stored);
        assert_eq!(session.cards()[0], stored);
    }

    #[test]
    fn test_rate_uses_clock() {
        let (store, cards) = setup();
        let clock = FixedClock::new(now());
        clock.advance(Duration::days(10));
        let mut session = ReviewSession::new(cards, AdvancePolicy::CycleAllCards, now());

        let stored = session.rate(3, &store, &clock).unwrap();
        assert_eq!(
            stored.schedule.next_review,
            Some(now() + Duration::days(11))
        );
    }

    #[test]
    fn test_rate_invalid_quality_does_not_move() {
        let (store, cards) = setup();
        let clock = FixedClock::new(now());
        let mut session = ReviewSession::new(cards, AdvancePolicy::CycleAllCards, now());
        session.flip();

        let err = session.rate(9, &store, &clock).unwrap_err();
        assert!(matches!(err, TabulaeError::InvalidRating { quality: 9 }));
        assert_eq!(front(&session), Some("a"));
        assert!(session.is_flipped());
        assert_eq!(session.reviewed(), 0);
        assert_eq!(store.get(session.cards()[0].id).unwrap().unwrap().version, 0);
    }

    #[test]
    fn test_rate_detects_concurrent_write() {
        let (store, cards) = setup();
        let clock = FixedClock::new(now());
        let mut phone = ReviewSession::new(cards.clone(), AdvancePolicy::CycleAllCards, now());
        let mut laptop = ReviewSession::new(cards, AdvancePolicy::CycleAllCards, now());

        phone.rate(4, &store, &clock).unwrap();
        let err = laptop.rate(1, &store, &clock).unwrap_err();

        assert!(matches!(err, TabulaeError::VersionConflict { .. }));
        assert_eq!(
            store.get(laptop.cards()[0].id).unwrap().unwrap().schedule.repetitions,
            1
        );
    }

    #[test]
    fn test_rate_after_conflict_uses_stored_card() {
        let (store, cards) = setup();
        let clock = FixedClock::new(now());
        let mut phone = ReviewSession::new(cards.clone(), AdvancePolicy::CycleAllCards, now());
        let mut laptop = ReviewSession::new(cards, AdvancePolicy::CycleAllCards, now());

        phone.rate(3, &store, &clock).unwrap();
        assert!(laptop.rate(3, &store, &clock).is_err());

        // Still on the same card, now carrying the phone's review
        assert_eq!(front(&laptop), Some("a"));
        assert_eq!(laptop.current().unwrap().version, 1);
        assert!(!laptop.is_flipped());

        let stored = laptop.rate(3, &store, &clock).unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.schedule.repetitions, 2);
        assert_eq!(stored.schedule.interval_days, 6);
    }

    #[test]
    fn test_conflict_drops_card_no_longer_due() {
        let (store, cards) = setup();
        let clock = FixedClock::new(now());
        let mut phone = ReviewSession::new(cards.clone(), AdvancePolicy::CycleDueOnly, now());
        let mut laptop = ReviewSession::new(cards, AdvancePolicy::CycleDueOnly, now());
        assert_eq!(laptop.queue_len(), 2);

        phone.rate(4, &store, &clock).unwrap();
        let err = laptop.rate(1, &store, &clock).unwrap_err();

        assert!(matches!(err, TabulaeError::VersionConflict { .. }));
        assert_eq!(laptop.queue_len(), 1);
        assert_eq!(front(&laptop), Some("c"));
        assert_eq!(laptop.reviewed(), 0);
    }

    #[test]
    fn test_flip_and_skip() {
        let (_store, cards) = setup();
        let mut session = ReviewSession::new(cards, AdvancePolicy::CycleAllCards, now());

        assert!(!session.is_flipped());
        assert!(session.flip());
        assert!(!session.flip());
        session.flip();

        session.skip();
        assert!(!session.is_flipped());
        assert_eq!(front(&session), Some("b"));
        assert_eq!(session.position(), 1);
        assert_eq!(session.reviewed(), 0);
    }

    #[test]
    fn test_empty_session() {
        let store = MemoryCardStore::new();
        let clock = FixedClock::new(now());
        let mut session =
            ReviewSession::load(&store, &clock, "learner-1", AdvancePolicy::CycleAllCards).unwrap();

        assert!(session.is_finished());
        assert!(session.current().is_none());
        session.skip();
        assert!(matches!(
            session.rate(3, &store, &clock),
            Err(TabulaeError::NoCurrentCard)
        ));
    }

    #[test]
    fn test_load_uses_store_order() {
        let (store, _cards) = setup();
        let clock = FixedClock::new(now());
        let session =
            ReviewSession::load(&store, &clock, "learner-1", AdvancePolicy::CycleDueOnly).unwrap();

        assert_eq!(session.policy(), AdvancePolicy::CycleDueOnly);
        assert_eq!(session.queue_len(), 2);
        assert_eq!(front(&session), Some("a"));
    }
}
