//! Card storage traits for Tabulae.
//!
//! This module defines the `CardStore` trait for card persistence and the
//! `ScheduleUpdate` write that a review produces.

use std::sync::Arc;

use uuid::Uuid;

use crate::core::{Flashcard, Schedule};
use crate::error::{Result, TabulaeError};

/// The partial write a review sends to the store.
///
/// Carries exactly the four scheduling fields. `expected_version`, when set,
/// turns the write into a conditional one: the store rejects it with
/// `VersionConflict` if the stored card has moved on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleUpdate {
    pub schedule: Schedule,
    pub expected_version: Option<u64>,
}

impl ScheduleUpdate {
    /// An unconditional write (last writer wins).
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            expected_version: None,
        }
    }

    /// A write that only applies while the stored card is at `version`.
    pub fn conditional(schedule: Schedule, version: u64) -> Self {
        Self {
            schedule,
            expected_version: Some(version),
        }
    }

    /// Validate and apply this update to a stored card, bumping its version.
    pub fn apply_to(&self, card: &mut Flashcard) -> Result<()> {
        if let Some(expected) = self.expected_version {
            if expected != card.version {
                tracing::warn!(
                    card_id = %card.id,
                    expected,
                    actual = card.version,
                    "rejecting stale schedule update"
                );
                return Err(TabulaeError::version_conflict(card.id, expected, card.version));
            }
        }
        self.schedule.validate()?;

        card.schedule = self.schedule;
        card.version += 1;
        Ok(())
    }
}

/// Trait for card storage backends.
///
/// Implementations provide persistent storage for flashcards, supporting the
/// create/list/update operations a review session needs.
pub trait CardStore: Send + Sync {
    /// List every card owned by `owner_id`.
    ///
    /// Cards are ordered oldest first (see [`sort_cards`]).
    fn list(&self, owner_id: &str) -> Result<Vec<Flashcard>>;

    /// Retrieve a card by ID.
    ///
    /// Returns `Ok(None)` if the card doesn't exist.
    fn get(&self, id: Uuid) -> Result<Option<Flashcard>>;

    /// Store a new card.
    ///
    /// Fails with `InvalidCardState` if the card is invalid or its ID is taken.
    fn create(&self, card: &Flashcard) -> Result<Flashcard>;

    /// Write a card's scheduling fields and return the stored card.
    ///
    /// Fails with `CardNotFound` for unknown IDs and `VersionConflict` for
    /// stale conditional writes.
    fn update(&self, id: Uuid, update: &ScheduleUpdate) -> Result<Flashcard>;

    /// Delete a card.
    ///
    /// Returns `Ok(())` even if the card doesn't exist.
    fn delete(&self, id: Uuid) -> Result<()>;

    /// Check if a card exists.
    fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.get(id)?.is_some())
    }
}

/// Blanket implementation of CardStore for Arc-wrapped stores.
///
/// This allows a review session and its caller to share one store.
impl<T: CardStore + ?Sized> CardStore for Arc<T> {
    fn list(&self, owner_id: &str) -> Result<Vec<Flashcard>> {
        (**self).list(owner_id)
    }

    fn get(&self, id: Uuid) -> Result<Option<Flashcard>> {
        (**self).get(id)
    }

    fn create(&self, card: &Flashcard) -> Result<Flashcard> {
        (**self).create(card)
    }

    fn update(&self, id: Uuid, update: &ScheduleUpdate) -> Result<Flashcard> {
        (**self).update(id, update)
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        (**self).delete(id)
    }
}

/// Sort cards into listing order: oldest first, ties broken by ID.
pub fn sort_cards(cards: &mut [Flashcard]) {
    cards.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

/// Test utilities for CardStore implementations.
#[cfg(test)]
pub mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn now() -> DateTime<Utc> {
        "2026-03-01T09:30:00Z".parse().unwrap()
    }

    /// Test helper to verify CardStore implementations.
    pub fn test_card_store_crud<S: CardStore>(store: &S) {
        let card = Flashcard::new("learner-1", "front", "back", now()).unwrap();

        // Initially should not exist
        assert!(!store.exists(card.id).unwrap());
        assert!(store.get(card.id).unwrap().is_none());

        // Create the card
        let created = store.create(&card).unwrap();
        assert_eq!(created, card);
        assert!(store.exists(card.id).unwrap());

        // Creating the same ID twice fails
        assert!(store.create(&card).is_err());

        // List by owner
        let listed = store.list("learner-1").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, card.id);
        assert!(store.list("someone-else").unwrap().is_empty());

        // Unconditional update bumps the version
        let mut schedule = card.schedule;
        schedule.interval_days = 6;
        schedule.repetitions = 2;
        schedule.next_review = Some(now() + Duration::days(6));
        let updated = store.update(card.id, &ScheduleUpdate::new(schedule)).unwrap();
        assert_eq!(updated.schedule, schedule);
        assert_eq!(updated.version, 1);
        assert_eq!(updated.front, "front");
        assert_eq!(store.get(card.id).unwrap().unwrap(), updated);

        // Stale conditional update is rejected and leaves the card untouched
        let err = store
            .update(card.id, &ScheduleUpdate::conditional(card.schedule, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            TabulaeError::VersionConflict {
                expected: 0,
                actual: 1,
                ..
            }
        ));
        assert_eq!(store.get(card.id).unwrap().unwrap(), updated);

        // Fresh conditional update applies
        let again = store
            .update(card.id, &ScheduleUpdate::conditional(card.schedule, 1))
            .unwrap();
        assert_eq!(again.version, 2);

        // Invalid schedule is rejected
        let mut bad = card.schedule;
        bad.ease_factor = 0.5;
        assert!(store.update(card.id, &ScheduleUpdate::new(bad)).is_err());

        // Unknown card
        let missing = Uuid::new_v4();
        let err = store
            .update(missing, &ScheduleUpdate::new(card.schedule))
            .unwrap_err();
        assert!(matches!(err, TabulaeError::CardNotFound { .. }));

        // Delete the card
        store.delete(card.id).unwrap();
        assert!(!store.exists(card.id).unwrap());

        // Delete again should succeed
        store.delete(card.id).unwrap();
    }

    /// Test helper to verify listing order.
    pub fn test_card_store_ordering<S: CardStore>(store: &S) {
        let newest = Flashcard::new("learner-1", "c", "c", now() + Duration::hours(2)).unwrap();
        let oldest = Flashcard::new("learner-1", "a", "a", now()).unwrap();
        let middle = Flashcard::new("learner-1", "b", "b", now() + Duration::hours(1)).unwrap();

        store.create(&newest).unwrap();
        store.create(&oldest).unwrap();
        store.create(&middle).unwrap();

        let fronts: Vec<String> = store
            .list("learner-1")
            .unwrap()
            .into_iter()
            .map(|c| c.front)
            .collect();
        assert_eq!(fronts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_schedule_update_apply_bumps_version() {
        let mut card = Flashcard::new("learner-1", "front", "back", now()).unwrap();
        let mut schedule = card.schedule;
        schedule.repetitions = 1;

        ScheduleUpdate::new(schedule).apply_to(&mut card).unwrap();
        assert_eq!(card.version, 1);
        assert_eq!(card.schedule.repetitions, 1);
    }

    #[test]
    fn test_schedule_update_conflict_leaves_card() {
        let mut card = Flashcard::new("learner-1", "front", "back", now()).unwrap();
        card.version = 4;
        let before = card.clone();

        let mut schedule = card.schedule;
        schedule.repetitions = 9;
        let result = ScheduleUpdate::conditional(schedule, 3).apply_to(&mut card);

        assert!(result.is_err());
        assert_eq!(card, before);
    }

    #[test]
    fn test_sort_cards_ties_by_id() {
        let mut a = Flashcard::new("learner-1", "a", "a", now()).unwrap();
        let mut b = Flashcard::new("learner-1", "b", "b", now()).unwrap();
        a.id = Uuid::from_u128(2);
        b.id = Uuid::from_u128(1);

        let mut cards = vec![a, b];
        sort_cards(&mut cards);
        assert_eq!(cards[0].front, "b");
    }
}
