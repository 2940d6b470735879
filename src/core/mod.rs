//! Core types and logic for Tabulae.
//!
//! This module contains the flashcard entity, the review scheduler, the
//! injectable clock and the session-local review state.

pub mod card;
pub mod clock;
pub mod scheduler;
pub mod session;

pub use card::{
    Flashcard, Rating, Schedule, DEFAULT_EASE_FACTOR, INITIAL_INTERVAL_DAYS, MIN_EASE_FACTOR,
    SUCCESS_THRESHOLD,
};
pub use clock::{CalendarZone, Clock, FixedClock, SystemClock};
pub use scheduler::{
    advance, due_cards, is_due, next_ease_factor, next_schedule, next_schedule_in,
    preview_intervals, review, review_in, AdvancePolicy, VALID_ADVANCE_POLICIES,
};
pub use session::ReviewSession;
