//! In-memory card storage.
//!
//! This module provides a thread-safe in-memory implementation of the
//! CardStore trait, used by tests and by callers that persist elsewhere.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use uuid::Uuid;

use crate::core::Flashcard;
use crate::error::{Result, TabulaeError};
use crate::storage::traits::sort_cards;
use crate::storage::{CardStore, ScheduleUpdate};

/// In-memory card store.
///
/// Thread-safe implementation using `RwLock<HashMap>`. Each update runs under
/// the write lock, so conditional writes are atomic.
#[derive(Debug, Default)]
pub struct MemoryCardStore {
    cards: RwLock<HashMap<Uuid, Flashcard>>,
}

impl MemoryCardStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            cards: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store pre-populated with cards.
    pub fn with_cards(cards: impl IntoIterator<Item = Flashcard>) -> Self {
        let cards = cards.into_iter().map(|c| (c.id, c)).collect();
        Self {
            cards: RwLock::new(cards),
        }
    }

    /// Get the number of cards in the store.
    pub fn len(&self) -> usize {
        self.cards
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CardStore for MemoryCardStore {
    fn list(&self, owner_id: &str) -> Result<Vec<Flashcard>> {
        let cards = self.cards.read().unwrap_or_else(PoisonError::into_inner);
        let mut result: Vec<Flashcard> = cards
            .values()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        sort_cards(&mut result);
        Ok(result)
    }

    fn get(&self, id: Uuid) -> Result<Option<Flashcard>> {
        let cards = self.cards.read().unwrap_or_else(PoisonError::into_inner);
        Ok(cards.get(&id).cloned())
    }

    fn create(&self, card: &Flashcard) -> Result<Flashcard> {
        card.validate()?;

        let mut cards = self.cards.write().unwrap_or_else(PoisonError::into_inner);
        if cards.contains_key(&card.id) {
            return Err(TabulaeError::invalid_card_state(format!(
                "card {} already exists",
                card.id
            )));
        }
        cards.insert(card.id, card.clone());
        Ok(card.clone())
    }

    fn update(&self, id: Uuid, update: &ScheduleUpdate) -> Result<Flashcard> {
        let mut cards = self.cards.write().unwrap_or_else(PoisonError::into_inner);
        let card = cards
            .get_mut(&id)
            .ok_or_else(|| TabulaeError::card_not_found(id))?;

        update.apply_to(card)?;
        Ok(card.clone())
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        let mut cards = self.cards.write().unwrap_or_else(PoisonError::into_inner);
        cards.remove(&id);
        Ok(())
    }
}
