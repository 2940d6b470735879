//! Review scheduling.
//!
//! The transition rule, for a rating `q` on the 1..=4 scale:
//!
//! 1. Success (`q >= 3`): the interval becomes 1 day on the first recall,
//!    6 days on the second, and `round(interval * ease)` afterwards. The
//!    repetition counter increments.
//! 2. Lapse (`q < 3`): the repetition counter resets and the interval is 1 day.
//! 3. Always: `ease = max(1.3, ease + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)))`.
//! 4. `next_review = now + interval` calendar days, keeping the time of day
//!    in the clock's [`CalendarZone`] (UTC unless the caller names a zone).
//!
//! The ease formula is the classical 0..=5 one applied unchanged to the 1..=4
//! scale. With it, `Easy` leaves the ease factor where it was and every other
//! rating lowers it.

use chrono::{DateTime, Utc};

use super::card::{Flashcard, Rating, Schedule, MIN_EASE_FACTOR};
use super::clock::CalendarZone;
use crate::error::Result;

/// Interval after the first successful recall.
pub const FIRST_INTERVAL_DAYS: u32 = 1;

/// Interval after the second consecutive successful recall.
pub const SECOND_INTERVAL_DAYS: u32 = 6;

/// Interval after a lapse.
pub const LAPSE_INTERVAL_DAYS: u32 = 1;

/// How a review session moves to the next card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvancePolicy {
    /// Cycle through the whole deck, due or not.
    #[default]
    CycleAllCards,
    /// Cycle through the cards that were due when the session started.
    CycleDueOnly,
}

/// Accepted config values for [`AdvancePolicy`].
pub const VALID_ADVANCE_POLICIES: &[&str] = &["all", "due"];

impl AdvancePolicy {
    /// Parse a config value (`"all"` or `"due"`).
    pub fn from_config_value(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::CycleAllCards),
            "due" => Some(Self::CycleDueOnly),
            _ => None,
        }
    }

    pub fn as_config_value(self) -> &'static str {
        match self {
            Self::CycleAllCards => "all",
            Self::CycleDueOnly => "due",
        }
    }
}

/// Review a card with a raw quality rating.
///
/// Rejects qualities outside `1..=4` with `InvalidRating` and inputs breaking
/// the ease invariant with `InvalidCardState`. The returned card differs from
/// the input only in its schedule; the store bumps `version` when it persists.
pub fn review(card: &Flashcard, quality: u8, now: DateTime<Utc>) -> Result<Flashcard> {
    review_in(card, quality, now, CalendarZone::Utc)
}

/// [`review`], counting the new interval in `zone`'s calendar days.
pub fn review_in(
    card: &Flashcard,
    quality: u8,
    now: DateTime<Utc>,
    zone: CalendarZone,
) -> Result<Flashcard> {
    let rating = Rating::try_from(quality)?;
    card.schedule.validate()?;

    let mut reviewed = card.clone();
    reviewed.schedule = next_schedule_in(&card.schedule, rating, now, zone);

    tracing::debug!(
        card_id = %card.id,
        quality,
        interval_days = reviewed.schedule.interval_days,
        ease_factor = reviewed.schedule.ease_factor,
        repetitions = reviewed.schedule.repetitions,
        "reviewed card"
    );

    Ok(reviewed)
}

/// Compute the schedule that follows `current` after a review rated `rating`.
pub fn next_schedule(current: &Schedule, rating: Rating, now: DateTime<Utc>) -> Schedule {
    next_schedule_in(current, rating, now, CalendarZone::Utc)
}

/// [`next_schedule`], counting the new interval in `zone`'s calendar days.
pub fn next_schedule_in(
    current: &Schedule,
    rating: Rating,
    now: DateTime<Utc>,
    zone: CalendarZone,
) -> Schedule {
    let (interval_days, repetitions) = next_interval(current, rating);

    Schedule {
        interval_days,
        ease_factor: next_ease_factor(current.ease_factor, rating),
        repetitions,
        next_review: Some(zone.add_days(now, interval_days)),
    }
}

/// Interval and repetition count after a review, ignoring the ease update.
fn next_interval(current: &Schedule, rating: Rating) -> (u32, u32) {
    if !rating.is_success() {
        return (LAPSE_INTERVAL_DAYS, 0);
    }

    let interval_days = match current.repetitions {
        0 => FIRST_INTERVAL_DAYS,
        1 => SECOND_INTERVAL_DAYS,
        _ => scale_interval(current.interval_days, current.ease_factor),
    };

    (interval_days, current.repetitions.saturating_add(1))
}

/// `round(interval * ease)`, half away from zero.
///
/// The float-to-int cast saturates, so huge products clamp at `u32::MAX`.
fn scale_interval(interval_days: u32, ease_factor: f64) -> u32 {
    (f64::from(interval_days) * ease_factor).round() as u32
}

/// Apply the ease adjustment for `rating`, floored at [`MIN_EASE_FACTOR`].
pub fn next_ease_factor(ease_factor: f64, rating: Rating) -> f64 {
    let distance = 5.0 - f64::from(rating.quality());
    let delta = 0.1 - distance * (0.08 + distance * 0.02);
    (ease_factor + delta).max(MIN_EASE_FACTOR)
}

/// Intervals each rating would produce, indexed `[forgot, hard, good, easy]`.
pub fn preview_intervals(current: &Schedule) -> [u32; 4] {
    let mut intervals = [0; 4];
    for (slot, rating) in intervals.iter_mut().zip(Rating::all()) {
        *slot = next_interval(current, *rating).0;
    }
    intervals
}

pub fn is_due(card: &Flashcard, now: DateTime<Utc>) -> bool {
    card.is_due(now)
}

/// Every card that is due at `now`, in input order.
pub fn due_cards(cards: &[Flashcard], now: DateTime<Utc>) -> Vec<&Flashcard> {
    cards.iter().filter(|card| card.is_due(now)).collect()
}

/// Next position in a queue of `queue_len` cards, wrapping at the end.
///
/// Returns `None` for an empty queue.
pub fn advance(current_index: usize, queue_len: usize) -> Option<usize> {
    if queue_len == 0 {
        return None;
    }
    Some((current_index + 1) % queue_len)
}
