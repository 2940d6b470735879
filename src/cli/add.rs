//! Add command for Tabulae.
//!
//! Creates a card with the initial schedule: due immediately, interval one
//! day, ease 2.5, no repetitions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::list::CardInfo;
use crate::config::Config;
use crate::core::{Clock, Flashcard, SystemClock};
use crate::storage::CardStore;

/// Options for the add command.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Deck owner (default: configured profile owner).
    pub owner: Option<String>,
}

/// Output format for the add command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddOutput {
    /// Whether the card was created.
    pub success: bool,
    /// The created card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<CardInfo>,
    /// Error message if creation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AddOutput {
    /// Create a successful output.
    pub fn success(card: CardInfo) -> Self {
        Self {
            success: true,
            card: Some(card),
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            card: None,
            error: Some(error.into()),
        }
    }
}

/// The add command implementation.
pub struct AddCommand<S: CardStore> {
    store: S,
    config: Config,
    clock: Arc<dyn Clock>,
}

impl<S: CardStore> AddCommand<S> {
    /// Create a new add command.
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

    /// Run the add command.
    pub fn run(&self, front: &str, back: &str, options: &AddOptions) -> AddOutput {
        let owner = options
            .owner
            .as_deref()
            .unwrap_or(&self.config.profile.owner);
        let now = self.clock.now();

        let card = match Flashcard::new(owner, front.trim(), back.trim(), now) {
            Ok(card) => card,
            Err(e) => return AddOutput::failure(e.to_string()),
        };

        match self.store.create(&card) {
            Ok(stored) => {
                tracing::info!(card_id = %stored.id, owner_id = %stored.owner_id, "added card");
                AddOutput::success(CardInfo::from_card(&stored, now))
            }
            Err(e) => AddOutput::failure(e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &AddOutput, options: &AddOptions) -> String {
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
    fn format_human_readable(&self, output: &AddOutput) -> String {
        match (&output.card, output.success) {
            (Some(card), true) => format!("Added card {}\n  {} -> {}\n", card.id, card.front, card.back),
            _ => format!(
                "Add failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}
