//! Tabulae - spaced-repetition flashcards
//!
//! Tabulae schedules flashcard reviews with an SM-2 style algorithm: each
//! rating from 1 (forgot) to 4 (easy) moves a card's next review further out
//! or back to tomorrow. Cards live in a pluggable card store; the CLI drives
//! review sessions over the file-backed store.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod stats;
pub mod storage;
pub mod util;

pub use config::Config;
pub use crate::core::{
    advance, due_cards, is_due, review, AdvancePolicy, CalendarZone, Clock, Flashcard, Rating,
    ReviewSession, Schedule, SystemClock,
};
pub use error::{Result, TabulaeError};
pub use stats::DeckStats;
pub use storage::{CardStore, FileCardStore, MemoryCardStore, ScheduleUpdate};

// CLI commands
pub use cli::{
    AddCommand, ListCommand, RemoveCommand, ReviewCommand, StatsCommand, StudyCommand,
};
