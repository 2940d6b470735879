//! CLI commands for Tabulae.
//!
//! This module provides CLI commands for Tabulae, organized into:
//! - **Deck commands**: add, list, remove
//! - **Review commands**: review, study
//! - **Reporting**: stats

// Deck commands
pub mod add;
pub mod list;
pub mod remove;

// Review commands
pub mod review;
pub mod study;

// Reporting
pub mod stats;

pub use add::AddCommand;
pub use list::{CardInfo, ListCommand};
pub use remove::RemoveCommand;
pub use review::ReviewCommand;
pub use stats::StatsCommand;
pub use study::StudyCommand;
