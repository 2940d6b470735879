//! Card storage for Tabulae.
//!
//! This module provides persistent storage for flashcards,
//! supporting file-based and in-memory backends.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileCardStore;
pub use memory::MemoryCardStore;
pub use traits::{CardStore, ScheduleUpdate};
