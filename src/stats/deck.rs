//! Per-deck counts shown by the `stats` command.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::Flashcard;

/// Counts over one learner's deck at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeckStats {
    /// Number of cards in the deck.
    pub total: usize,
    /// Cards due at the evaluation time.
    pub due: usize,
    /// Cards with at least one successful review in the current streak.
    pub learned: usize,
    /// Mean ease factor across the deck, `None` for an empty deck.
    pub average_ease: Option<f64>,
    /// Earliest scheduled review among cards that are not yet due.
    pub next_due: Option<DateTime<Utc>>,
}

impl DeckStats {
    /// Compute statistics for `cards` as of `now`.
    pub fn compute(cards: &[Flashcard], now: DateTime<Utc>) -> Self {
        let mut stats = Self {
            total: cards.len(),
            ..Self::default()
        };

        let mut ease_sum = 0.0;
        for card in cards {
            ease_sum += card.schedule.ease_factor;

            if card.is_due(now) {
                stats.due += 1;
            } else if let Some(at) = card.schedule.next_review {
                stats.next_due = Some(stats.next_due.map_or(at, |prev| prev.min(at)));
            }

            if card.is_learned() {
                stats.learned += 1;
            }
        }

        if !cards.is_empty() {
            stats.average_ease = Some(ease_sum / cards.len() as f64);
        }

        stats
    }

    /// Cards that have never been recalled successfully (or lapsed since).
    pub fn unlearned(&self) -> usize {
        self.total - self.learned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        "2026-03-01T09:30:00Z".parse().unwrap()
    }

    fn card(next_review: Option<DateTime<Utc>>, repetitions: u32, ease: f64) -> Flashcard {
        let mut card = Flashcard::new("learner-1", "front", "back", now()).unwrap();
        card.schedule.next_review = next_review;
        card.schedule.repetitions = repetitions;
        card.schedule.ease_factor = ease;
        card
    }

    #[test]
    fn test_empty_deck() {
        let stats = DeckStats::compute(&[], now());

        assert_eq!(stats, DeckStats::default());
        assert_eq!(stats.unlearned(), 0);
    }

    #[test]
    fn test_counts() {
        let cards = vec![
            card(Some(now()), 0, 2.5),
            card(None, 0, 2.5),
            card(Some(now() + Duration::days(6)), 2, 2.5),
            card(Some(now() + Duration::days(1)), 1, 2.0),
        ];

        let stats = DeckStats::compute(&cards, now());

        assert_eq!(stats.total, 4);
        assert_eq!(stats.due, 2);
        assert_eq!(stats.learned, 2);
        assert_eq!(stats.unlearned(), 2);
        assert_eq!(stats.next_due, Some(now() + Duration::days(1)));
        let average = stats.average_ease.unwrap();
        assert!((average - 2.375).abs() < 1e-9);
    }

    #[test]
    fn test_learned_card_can_be_due() {
        let cards = vec![card(Some(now() - Duration::days(2)), 3, 2.7)];

        let stats = DeckStats::compute(&cards, now());

        assert_eq!(stats.due, 1);
        assert_eq!(stats.learned, 1);
        assert_eq!(stats.next_due, None);
    }

    #[test]
    fn test_serializes_to_json() {
        let stats = DeckStats::compute(&[card(None, 0, 2.5)], now());
        let value = serde_json::to_value(&stats).unwrap();

        assert_eq!(value["total"], 1);
        assert_eq!(value["due"], 1);
        assert_eq!(value["learned"], 0);
        assert_eq!(value["average_ease"], 2.5);
    }
}
