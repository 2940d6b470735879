//! Flashcard entity and its spaced-repetition state.
//!
//! A card carries four scheduling fields (`interval_days`, `ease_factor`,
//! `repetitions`, `next_review`) that are always written together. They are
//! grouped in [`Schedule`] and flattened into the card's JSON form.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, TabulaeError};

/// Lower bound for the ease factor.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor of a freshly created card.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Interval of a freshly created card.
pub const INITIAL_INTERVAL_DAYS: u32 = 1;

/// Ratings at or above this quality count as a successful recall.
pub const SUCCESS_THRESHOLD: u8 = 3;

/// A learner's self-rated recall quality for one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    /// Could not recall the answer.
    Forgot = 1,
    /// Recalled incorrectly or with heavy effort.
    Hard = 2,
    /// Recalled correctly.
    Good = 3,
    /// Recalled instantly.
    Easy = 4,
}

impl Rating {
    /// All ratings, in quality order.
    pub fn all() -> &'static [Rating] {
        &[Rating::Forgot, Rating::Hard, Rating::Good, Rating::Easy]
    }

    /// Numeric quality on the 1..=4 scale.
    pub fn quality(self) -> u8 {
        self as u8
    }

    /// Whether this rating takes the success branch of the scheduler.
    pub fn is_success(self) -> bool {
        self.quality() >= SUCCESS_THRESHOLD
    }

    /// Short label shown next to the rating key.
    pub fn label(self) -> &'static str {
        match self {
            Rating::Forgot => "forgot",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }
}

impl TryFrom<u8> for Rating {
    type Error = TabulaeError;

    fn try_from(quality: u8) -> Result<Self> {
        match quality {
            1 => Ok(Rating::Forgot),
            2 => Ok(Rating::Hard),
            3 => Ok(Rating::Good),
            4 => Ok(Rating::Easy),
            other => Err(TabulaeError::invalid_rating(other)),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.quality(), self.label())
    }
}

/// The scheduling fields of a card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Days until the next scheduled review.
    pub interval_days: u32,
    /// Interval growth multiplier, never below [`MIN_EASE_FACTOR`].
    pub ease_factor: f64,
    /// Consecutive successful recalls since the last lapse.
    pub repetitions: u32,
    /// Earliest instant the card is due again. `None` means never reviewed.
    #[serde(default)]
    pub next_review: Option<DateTime<Utc>>,
}

impl Schedule {
    /// The schedule of a card created at `now`.
    pub fn initial(now: DateTime<Utc>) -> Self {
        Self {
            interval_days: INITIAL_INTERVAL_DAYS,
            ease_factor: DEFAULT_EASE_FACTOR,
            repetitions: 0,
            next_review: Some(now),
        }
    }

    /// A card is due when it has no scheduled review or the review time has passed.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_review {
            None => true,
            Some(next) => next <= now,
        }
    }

    /// Check the ease factor invariant.
    ///
    /// Negative intervals and repetition counts are unrepresentable, so the
    /// ease factor is the only field that can be out of range.
    pub fn validate(&self) -> Result<()> {
        if !self.ease_factor.is_finite() {
            return Err(TabulaeError::invalid_card_state(format!(
                "ease_factor {} is not a finite number",
                self.ease_factor
            )));
        }
        if self.ease_factor < MIN_EASE_FACTOR {
            return Err(TabulaeError::invalid_card_state(format!(
                "ease_factor {} is below {}",
                self.ease_factor, MIN_EASE_FACTOR
            )));
        }
        Ok(())
    }
}

/// A flashcard owned by one learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    /// Unique card identifier, immutable.
    pub id: Uuid,
    /// Learner who owns the card, immutable.
    pub owner_id: String,
    /// Prompt side.
    pub front: String,
    /// Answer side.
    pub back: String,
    /// Spaced-repetition state.
    #[serde(flatten)]
    pub schedule: Schedule,
    /// Write counter bumped by the store on every scheduling update.
    #[serde(default)]
    pub version: u64,
    /// When the card was created. Stores list cards in this order.
    pub created_at: DateTime<Utc>,
}

impl Flashcard {
    /// Create a card with the initial schedule.
    ///
    /// Fails with `InvalidCardState` when the owner or either side is blank.
    pub fn new(
        owner_id: impl Into<String>,
        front: impl Into<String>,
        back: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let card = Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            front: front.into(),
            back: back.into(),
            schedule: Schedule::initial(now),
            version: 0,
            created_at: now,
        };
        card.validate()?;
        Ok(card)
    }

    /// Check text fields and the scheduling invariant.
    pub fn validate(&self) -> Result<()> {
        if self.owner_id.trim().is_empty() {
            return Err(TabulaeError::invalid_card_state("owner_id must not be blank"));
        }
        if self.front.trim().is_empty() {
            return Err(TabulaeError::invalid_card_state("front must not be blank"));
        }
        if self.back.trim().is_empty() {
            return Err(TabulaeError::invalid_card_state("back must not be blank"));
        }
        self.schedule.validate()
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.schedule.is_due(now)
    }

    /// Whether the card has at least one successful recall in its current streak.
    pub fn is_learned(&self) -> bool {
        self.schedule.repetitions > 0
    }
}
