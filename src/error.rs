//! Unified error types for Tabulae.
//!
//! Validation failures (`InvalidRating`, `InvalidCardState`) are programmer
//! errors raised before any scheduling field is touched. The remaining
//! variants come from the card store and configuration layers.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// The main error type for Tabulae operations.
#[derive(Error, Debug)]
pub enum TabulaeError {
    /// Quality rating outside `1..=4`.
    #[error("invalid rating: {quality} (expected 1-4)")]
    InvalidRating { quality: u8 },

    /// Card fields violate a scheduling or creation invariant.
    #[error("invalid card state: {message}")]
    InvalidCardState { message: String },

    /// I/O errors from card file operations.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML parsing/serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// Text that should have been a card ID.
    #[error("invalid card id: {input}")]
    InvalidCardId { input: String },

    /// A review session was asked to rate with nothing left to show.
    #[error("review session has no current card")]
    NoCurrentCard,

    /// Card not found in the store.
    #[error("card not found: {id}")]
    CardNotFound { id: Uuid },

    /// Conditional write rejected because the stored card moved on.
    #[error("version conflict on card {id}: expected {expected}, found {actual}")]
    VersionConflict { id: Uuid, expected: u64, actual: u64 },
}

/// A specialized Result type for Tabulae operations.
pub type Result<T> = std::result::Result<T, TabulaeError>;

impl TabulaeError {
    /// Create an invalid rating error.
    pub fn invalid_rating(quality: u8) -> Self {
        Self::InvalidRating { quality }
    }

    /// Create an invalid card state error.
    pub fn invalid_card_state(message: impl Into<String>) -> Self {
        Self::InvalidCardState {
            message: message.into(),
        }
    }

    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn invalid_card_id(input: impl Into<String>) -> Self {
        Self::InvalidCardId {
            input: input.into(),
        }
    }

    pub fn card_not_found(id: Uuid) -> Self {
        Self::CardNotFound { id }
    }

    pub fn version_conflict(id: Uuid, expected: u64, actual: u64) -> Self {
        Self::VersionConflict {
            id,
            expected,
            actual,
        }
    }

    /// Whether this error was caused by the caller's input rather than
    /// by the store or the environment.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidRating { .. }
                | Self::InvalidCardState { .. }
                | Self::InvalidCardId { .. }
        )
    }
}

impl From<io::Error> for TabulaeError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for TabulaeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Exit codes for the Tabulae CLI.
pub mod exit_codes {
    /// Command completed.
    pub const SUCCESS: i32 = 0;

    /// Command failed (validation, storage or lookup error).
    pub const ERROR: i32 = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_rating_display() {
        let err = TabulaeError::invalid_rating(7);
        assert_eq!(err.to_string(), "invalid rating: 7 (expected 1-4)");
    }

    #[test]
    fn test_invalid_card_state_display() {
        let err = TabulaeError::invalid_card_state("ease_factor 1.1 is below 1.3");
        assert_eq!(
            err.to_string(),
            "invalid card state: ease_factor 1.1 is below 1.3"
        );
    }

    #[test]
    fn test_storage_error_display() {
        let err = TabulaeError::storage(
            "/tmp/card.json",
            io::Error::new(io::ErrorKind::NotFound, "file not found"),
        );
        assert!(err.to_string().contains("storage error"));
        assert!(err.to_string().contains("/tmp/card.json"));
    }

    #[test]
    fn test_card_not_found_display() {
        let id = Uuid::nil();
        let err = TabulaeError::card_not_found(id);
        assert_eq!(err.to_string(), format!("card not found: {}", id));
    }

    #[test]
    fn test_version_conflict_display() {
        let id = Uuid::nil();
        let err = TabulaeError::version_conflict(id, 2, 3);
        assert!(err.to_string().contains("expected 2, found 3"));
    }

    #[test]
    fn test_is_validation() {
        assert!(TabulaeError::invalid_rating(0).is_validation());
        assert!(TabulaeError::invalid_card_state("x").is_validation());
        assert!(!TabulaeError::config("x").is_validation());
        assert!(!TabulaeError::card_not_found(Uuid::nil()).is_validation());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: TabulaeError = io_err.into();
        assert!(matches!(err, TabulaeError::Storage { .. }));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: TabulaeError = json_err.into();
        assert!(matches!(err, TabulaeError::Serde { .. }));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(exit_codes::SUCCESS, 0);
        assert_eq!(exit_codes::ERROR, 1);
    }
}
