//! Utility functions for Tabulae.
//!
//! Small helpers shared by the storage layer and the CLI.

use std::fs;
use std::path::Path;

use uuid::Uuid;

use crate::error::{Result, TabulaeError};

/// Maximum size of a single card file (1 MB).
///
/// A card is a few hundred bytes of JSON; anything bigger is not a card file.
pub const MAX_CARD_FILE_SIZE: u64 = 1024 * 1024;

/// Read a file into a string, refusing files larger than `max_size` bytes.
///
/// # Errors
///
/// Returns an error if the file cannot be read or exceeds `max_size`.
pub fn read_to_string_with_limit(path: &Path, max_size: u64) -> Result<String> {
    let metadata = fs::metadata(path).map_err(|e| TabulaeError::storage(path, e))?;

    let size = metadata.len();
    if size > max_size {
        return Err(TabulaeError::serde(format!(
            "File {} is too large ({} bytes, max {} bytes)",
            path.display(),
            size,
            max_size
        )));
    }

    fs::read_to_string(path).map_err(|e| TabulaeError::storage(path, e))
}

/// Parse a card ID given on the command line.
pub fn parse_card_id(input: &str) -> Result<Uuid> {
    Uuid::parse_str(input.trim()).map_err(|_| TabulaeError::invalid_card_id(input))
}

/// Format an interval in days as a short human-readable string.
///
/// Examples: `now`, `1d`, `5d`, `2w`, `3mo`, `1y`.
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..=6 => format!("{}d", days),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}
