//! Review command for Tabulae.
//!
//! Rates a single card outside of a study session and stores the new
//! schedule with a conditional write.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::list::CardInfo;
use crate::core::{review_in, Clock, Rating, SystemClock};
use crate::error::{Result, TabulaeError};
use crate::storage::{CardStore, ScheduleUpdate};
use crate::util::{format_interval, parse_card_id};

/// Options for the review command.
#[derive(Debug, Clone, Default)]
pub struct ReviewOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the review command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewOutput {
    /// Whether the review was stored.
    pub success: bool,
    /// The rating applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    /// The card after the review.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<CardInfo>,
    /// Error message if the review failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReviewOutput {
    /// Create a successful output.
    pub fn success(rating: Rating, card: CardInfo) -> Self {
        Self {
            success: true,
            rating: Some(rating),
            card: Some(card),
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            rating: None,
            card: None,
            error: Some(error.into()),
        }
    }
}

/// The review command implementation.
pub struct ReviewCommand<S: CardStore> {
    store: S,
    clock: Arc<dyn Clock>,
}

impl<S: CardStore> ReviewCommand<S> {
    /// Create a new review command.
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use a different time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run the review command.
    pub fn run(&self, card_id: &str, quality: u8, _options: &ReviewOptions) -> ReviewOutput {
        match self.review_card(card_id, quality) {
            Ok(output) => output,
            Err(e) => ReviewOutput::failure(e.to_string()),
        }
    }

    fn review_card(&self, card_id: &str, quality: u8) -> Result<ReviewOutput> {
        let rating = Rating::try_from(quality)?;
        let id = parse_card_id(card_id)?;
        let card = self
            .store
            .get(id)?
            .ok_or_else(|| TabulaeError::card_not_found(id))?;

        let now = self.clock.now();
        let reviewed = review_in(&card, quality, now, self.clock.zone())?;
        let update = ScheduleUpdate::conditional(reviewed.schedule, card.version);
        let stored = self.store.update(id, &update)?;

        tracing::info!(card_id = %id, quality, "stored review");
        Ok(ReviewOutput::success(
            rating,
            CardInfo::from_card(&stored, now),
        ))
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ReviewOutput, options: &ReviewOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &ReviewOutput) -> String {
        match (&output.card, output.rating, output.success) {
            (Some(card), Some(rating), true) => format!(
                "Rated {} as {}.\nNext review in {} (ease {:.2}, streak {}).\n",
                card.front,
                rating,
                format_interval(card.interval_days),
                card.ease_factor,
                card.repetitions
            ),
            _ => format!(
                "Review failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FixedClock, Flashcard};
    use crate::storage::MemoryCardStore;
    use chrono::{DateTime, Duration, Utc};

    fn now() -> DateTime<Utc> {
        "2026-03-01T09:30:00Z".parse().unwrap()
    }

    fn setup() -> (Arc<MemoryCardStore>, Flashcard) {
        let card = Flashcard::new("local", "amo", "I love", now()).unwrap();
        let store = Arc::new(MemoryCardStore::with_cards(vec![card.clone()]));
        (store, card)
    }

    fn command(store: &Arc<MemoryCardStore>) -> ReviewCommand<Arc<MemoryCardStore>> {
        ReviewCommand::new(Arc::clone(store))
            .with_clock(Arc::new(FixedClock::new(now())))
    }

    #[test]
    fn test_review_good_new_card() {
        let (store, card) = setup();
        let output = command(&store).run(&card.id.to_string(), 3, &ReviewOptions::default());

        assert!(output.success);
        assert_eq!(output.rating, Some(Rating::Good));
        let info = output.card.unwrap();
        assert_eq!(info.interval_days, 1);
        assert_eq!(info.repetitions, 1);
        assert_eq!(info.next_review, Some(now() + Duration::days(1)));

        let stored = store.get(card.id).unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert!((stored.schedule.ease_factor - 2.36).abs() < 1e-9);
    }

    #[test]
    fn test_review_invalid_quality_leaves_card() {
        let (store, card) = setup();
        let output = command(&store).run(&card.id.to_string(), 5, &ReviewOptions::default());

        assert!(!output.success);
        assert!(output.error.unwrap().contains("invalid rating: 5"));
        assert_eq!(store.get(card.id).unwrap().unwrap(), card);
    }

    #[test]
    fn test_review_unknown_card() {
        let (store, _card) = setup();
        let output = command(&store).run(
            "00000000-0000-0000-0000-000000000000",
            3,
            &ReviewOptions::default(),
        );

        assert!(!output.success);
        assert!(output.error.unwrap().contains("card not found"));
    }

    #[test]
    fn test_review_malformed_id() {
        let (store, _card) = setup();
        let output = command(&store).run("abc", 3, &ReviewOptions::default());

        assert!(!output.success);
        assert!(output.error.unwrap().contains("invalid card id"));
    }

    #[test]
    fn test_format_output() {
        let (store, card) = setup();
        let cmd = command(&store);
        let options = ReviewOptions::default();

        let text = cmd.format_output(&cmd.run(&card.id.to_string(), 4, &options), &options);
        assert!(text.contains("Rated amo as 4 (easy)"));
        assert!(text.contains("Next review in 1d"));

        let quiet = ReviewOptions {
            quiet: true,
            ..Default::default()
        };
        assert!(cmd
            .format_output(&ReviewOutput::failure("x"), &quiet)
            .is_empty());
    }
}
