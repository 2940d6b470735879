//! Study command for Tabulae.
//!
//! Runs an interactive review session over a reader/writer pair. Each card is
//! shown front side first:
//! - Enter flips the card
//! - `1`..`4` rates it (forgot, hard, good, easy)
//! - `n` moves on without rating
//! - `q` (or end of input) ends the session

use std::io::{BufRead, Write};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::core::{preview_intervals, AdvancePolicy, Clock, Rating, ReviewSession, SystemClock};
use crate::error::{Result, TabulaeError};
use crate::storage::CardStore;
use crate::util::format_interval;

/// Options for the study command.
#[derive(Debug, Clone, Default)]
pub struct StudyOptions {
    /// Output the summary as JSON.
    pub json: bool,
    /// Suppress the summary.
    pub quiet: bool,
    /// Advance policy (default: configured policy).
    pub policy: Option<AdvancePolicy>,
    /// Stop after this many ratings (default: configured `max_reviews`).
    pub limit: Option<usize>,
    /// Deck owner (default: configured profile owner).
    pub owner: Option<String>,
}

/// Why a study session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Nothing left to study.
    Finished,
    /// The learner quit (or input ended).
    Quit,
    /// The review limit was reached.
    Limit,
}

/// Output format for the study command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyOutput {
    /// Whether the session ran without a store failure.
    pub success: bool,
    /// Advance policy used (`all` or `due`).
    pub policy: String,
    /// Number of ratings stored.
    pub reviewed: usize,
    /// Ratings stored per quality, indexed `[forgot, hard, good, easy]`.
    pub ratings: [usize; 4],
    /// Cards still queued when the session ended.
    pub remaining: usize,
    /// Why the session ended.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopped: Option<StopReason>,
    /// Error message if the session failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StudyOutput {
    /// Create a failed output.
    pub fn failure(policy: AdvancePolicy, error: impl Into<String>) -> Self {
        Self {
            success: false,
            policy: policy.as_config_value().to_string(),
            reviewed: 0,
            ratings: [0; 4],
            remaining: 0,
            stopped: None,
            error: Some(error.into()),
        }
    }
}

/// A line of learner input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Flip,
    Rate(u8),
    Next,
    Quit,
    Unknown,
}

impl Input {
    fn parse(line: &str) -> Self {
        match line.trim().to_lowercase().as_str() {
            "" | "f" => Input::Flip,
            "n" | "next" => Input::Next,
            "q" | "quit" => Input::Quit,
            other => match other.parse::<u8>() {
                Ok(quality) => Input::Rate(quality),
                Err(_) => Input::Unknown,
            },
        }
    }
}

/// The study command implementation.
pub struct StudyCommand<S: CardStore> {
    store: S,
    config: Config,
    clock: Arc<dyn Clock>,
}

impl<S: CardStore> StudyCommand<S> {
    /// Create a new study command.
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

    /// Run an interactive session, reading commands from `input` and writing
    /// prompts to `output`.
    pub fn run<R: BufRead, W: Write>(
        &self,
        input: R,
        output: W,
        options: &StudyOptions,
    ) -> StudyOutput {
        let policy = options
            .policy
            .unwrap_or_else(|| self.config.advance_policy());
        let owner = options
            .owner
            .as_deref()
            .unwrap_or(&self.config.profile.owner);

        let mut session =
            match ReviewSession::load(&self.store, self.clock.as_ref(), owner, policy) {
                Ok(session) => session,
                Err(e) => return StudyOutput::failure(policy, e.to_string()),
            };

        let mut summary = StudyOutput {
            success: true,
            policy: policy.as_config_value().to_string(),
            reviewed: 0,
            ratings: [0; 4],
            remaining: 0,
            stopped: None,
            error: None,
        };

        let result = self.drive(&mut session, input, output, options, &mut summary);
        summary.reviewed = session.reviewed();
        summary.remaining = session.queue_len();

        match result {
            Ok(reason) => summary.stopped = Some(reason),
            Err(e) => {
                summary.success = false;
                summary.error = Some(e.to_string());
            }
        }

        tracing::info!(
            reviewed = summary.reviewed,
            remaining = summary.remaining,
            "study session ended"
        );
        summary
    }

    fn drive<R: BufRead, W: Write>(
        &self,
        session: &mut ReviewSession,
        mut input: R,
        mut output: W,
        options: &StudyOptions,
        summary: &mut StudyOutput,
    ) -> Result<StopReason> {
        let limit = options.limit.or_else(|| self.config.max_reviews());
        let mut line = String::new();

        loop {
            if limit.is_some_and(|max| session.reviewed() >= max) {
                writeln!(output, "Review limit reached.")?;
                return Ok(StopReason::Limit);
            }
            if session.is_finished() {
                writeln!(output, "Nothing left to review.")?;
                return Ok(StopReason::Finished);
            }

            self.show_card(session, &mut output)?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                return Ok(StopReason::Quit);
            }

            match Input::parse(&line) {
                Input::Flip => {
                    session.flip();
                }
                Input::Next => session.skip(),
                Input::Quit => return Ok(StopReason::Quit),
                Input::Unknown => {
                    writeln!(output, "Enter flips, 1-4 rates, n skips, q quits.")?;
                }
                Input::Rate(_) if !session.is_flipped() => {
                    writeln!(output, "Flip the card before rating it.")?;
                }
                Input::Rate(quality) => {
                    match session.rate(quality, &self.store, self.clock.as_ref()) {
                        Ok(stored) => {
                            summary.ratings[usize::from(quality - 1)] += 1;
                            writeln!(
                                output,
                                "Next review in {}.\n",
                                format_interval(stored.schedule.interval_days)
                            )?;
                        }
                        Err(e) if e.is_validation() => writeln!(output, "{}", e)?,
                        Err(e @ TabulaeError::VersionConflict { .. }) => {
                            writeln!(output, "{}; reloaded the stored card.", e)?;
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }
    }

    fn show_card<W: Write>(&self, session: &ReviewSession, output: &mut W) -> Result<()> {
        let Some(card) = session.current() else {
            return Ok(());
        };

        writeln!(
            output,
            "[{}/{}] {}",
            session.position() + 1,
            session.queue_len(),
            card.front
        )?;

        if !session.is_flipped() {
            write!(output, "(Enter to flip, n next, q quit) > ")?;
            return Ok(());
        }

        writeln!(output, "  {}", card.back)?;
        let choices: Vec<String> = if self.config.study.show_intervals {
            let intervals = preview_intervals(&card.schedule);
            Rating::all()
                .iter()
                .zip(intervals)
                .map(|(rating, days)| format!("{} {}", rating, format_interval(days)))
                .collect()
        } else {
            Rating::all().iter().map(ToString::to_string).collect()
        };
        write!(output, "{} > ", choices.join("  "))?;
        Ok(())
    }

    /// Format the session summary based on options.
    pub fn format_output(&self, output: &StudyOutput, options: &StudyOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format the summary as human-readable text.
    fn format_human_readable(&self, output: &StudyOutput) -> String {
        if !output.success {
            return format!(
                "Study failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut text = format!(
            "Reviewed {} card(s), {} remaining.\n",
            output.reviewed, output.remaining
        );
        if output.reviewed > 0 {
            let breakdown: Vec<String> = Rating::all()
                .iter()
                .zip(output.ratings)
                .filter(|(_, count)| *count > 0)
                .map(|(rating, count)| format!("{} {}", rating.label(), count))
                .collect();
            text.push_str(&format!("  {}\n", breakdown.join(", ")));
        }
        text
    }
}
