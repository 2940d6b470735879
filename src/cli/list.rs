//! List command for Tabulae.
//!
//! Lists a learner's cards in creation order, optionally only the due ones.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::core::{due_cards, Clock, Flashcard, SystemClock};
use crate::storage::CardStore;
use crate::util::format_interval;

/// Options for the list command.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Show only cards that are due now.
    pub due: bool,
    /// Deck owner (default: configured profile owner).
    pub owner: Option<String>,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

/// Output format for the list command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListOutput {
    /// Whether the list was successful.
    pub success: bool,
    /// Number of cards returned.
    pub count: usize,
    /// The cards.
    pub cards: Vec<CardInfo>,
    /// Error message if listing failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Card summary used by command output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardInfo {
    pub id: String,
    pub front: String,
    pub back: String,
    pub interval_days: u32,
    pub ease_factor: f64,
    pub repetitions: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review: Option<DateTime<Utc>>,
    /// Whether the card was due when the command ran.
    pub due: bool,
}

impl CardInfo {
    pub fn from_card(card: &Flashcard, now: DateTime<Utc>) -> Self {
        Self {
            id: card.id.to_string(),
            front: card.front.clone(),
            back: card.back.clone(),
            interval_days: card.schedule.interval_days,
            ease_factor: card.schedule.ease_factor,
            repetitions: card.schedule.repetitions,
            next_review: card.schedule.next_review,
            due: card.is_due(now),
        }
    }
}

impl ListOutput {
    /// Create a successful output.
    pub fn success(cards: Vec<CardInfo>) -> Self {
        Self {
            success: true,
            count: cards.len(),
            cards,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            count: 0,
            cards: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// The list command implementation.
pub struct ListCommand<S: CardStore> {
    store: S,
    config: Config,
    clock: Arc<dyn Clock>,
}

impl<S: CardStore> ListCommand<S> {
    /// Create a new list command.
    pub fn new(store: S, config: Config) -> Self {
        Self {
            store,
            config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use a different time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run the list command.
    pub fn run(&self, options: &ListOptions) -> ListOutput {
        let owner = options
            .owner
            .as_deref()
            .unwrap_or(&self.config.profile.owner);

        let cards = match self.store.list(owner) {
            Ok(cards) => cards,
            Err(e) => return ListOutput::failure(e.to_string()),
        };

        let now = self.clock.now();
        let selected: Vec<&Flashcard> = if options.due {
            due_cards(&cards, now)
        } else {
            cards.iter().collect()
        };

        let limit = options.limit.unwrap_or(usize::MAX);
        let infos = selected
            .into_iter()
            .take(limit)
            .map(|card| CardInfo::from_card(card, now))
            .collect();

        ListOutput::success(infos)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ListOutput, options: &ListOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output, options)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &ListOutput, options: &ListOptions) -> String {
        if !output.success {
            return format!(
                "List failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        if output.cards.is_empty() {
            return if options.due {
                "No cards due.\n".to_string()
            } else {
                "No cards found.\n".to_string()
            };
        }

        let mut lines = Vec::new();
        if options.due {
            lines.push(format!("{} card(s) due:\n", output.count));
        } else {
            lines.push(format!("{} card(s):\n", output.count));
        }

        for (i, card) in output.cards.iter().enumerate() {
            let when = if card.due {
                "due now".to_string()
            } else {
                match card.next_review {
                    Some(at) => format!("due {}", at.format("%Y-%m-%d")),
                    None => "due now".to_string(),
                }
            };
            lines.push(format!(
                "{}. {} -> {}\n   {} | interval {} | ease {:.2} | streak {}\n   id: {}\n",
                i + 1,
                card.front,
                card.back,
                when,
                format_interval(card.interval_days),
                card.ease_factor,
                card.repetitions,
                card.id
            ));
        }

        lines.join("\n")
    }
}
