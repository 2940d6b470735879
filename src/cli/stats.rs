//! Stats command for Tabulae.
//!
//! Shows deck counts: total, due now, learned and new.

use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::core::{Clock, SystemClock};
use crate::stats::DeckStats;
use crate::storage::CardStore;

/// Options for the stats command.
#[derive(Debug, Clone, Default)]
pub struct StatsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Deck owner (default: configured profile owner).
    pub owner: Option<String>,
}

/// Output format for the stats command.
#[derive(Debug, Clone, Serialize)]
pub struct StatsOutput {
    /// Whether stats were computed.
    pub success: bool,
    /// Owner whose deck was counted.
    pub owner: String,
    /// Deck counts.
    #[serde(flatten)]
    pub stats: DeckStats,
    /// Error message if computing stats failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatsOutput {
    /// Create a successful output.
    pub fn success(owner: impl Into<String>, stats: DeckStats) -> Self {
        Self {
            success: true,
            owner: owner.into(),
            stats,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(owner: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            owner: owner.into(),
            stats: DeckStats::default(),
            error: Some(error.into()),
        }
    }
}

/// The stats command implementation.
pub struct StatsCommand<S: CardStore> {
    store: S,
    config: Config,
    clock: Arc<dyn Clock>,
}

impl<S: CardStore> StatsCommand<S> {
    /// Create a new stats command.
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

    /// Run the stats command.
    pub fn run(&self, options: &StatsOptions) -> StatsOutput {
        let owner = options
            .owner
            .clone()
            .unwrap_or_else(|| self.config.profile.owner.clone());

        match self.store.list(&owner) {
            Ok(cards) => {
                let stats = DeckStats::compute(&cards, self.clock.now());
                StatsOutput::success(owner, stats)
            }
            Err(e) => StatsOutput::failure(owner, e.to_string()),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &StatsOutput, options: &StatsOptions) -> String {
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
    fn format_human_readable(&self, output: &StatsOutput) -> String {
        if !output.success {
            return format!(
                "Stats failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let stats = &output.stats;
        let mut text = format!(
            "Deck for {}\n  Total:   {}\n  Due:     {}\n  Learned: {}\n  New:     {}\n",
            output.owner,
            stats.total,
            stats.due,
            stats.learned,
            stats.unlearned()
        );
        if let Some(ease) = stats.average_ease {
            text.push_str(&format!("  Ease:    {:.2} average\n", ease));
        }
        if let Some(next) = stats.next_due {
            text.push_str(&format!("  Next:    {}\n", next.format("%Y-%m-%d %H:%M UTC")));
        }
        text
    }
}
