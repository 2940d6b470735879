//! Remove command for Tabulae.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TabulaeError};
use crate::storage::CardStore;
use crate::util::parse_card_id;

/// Options for the remove command.
#[derive(Debug, Clone, Default)]
pub struct RemoveOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the remove command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveOutput {
    /// Whether the card was removed.
    pub success: bool,
    /// ID of the removed card.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Error message if removal failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RemoveOutput {
    pub fn success(id: impl Into<String>) -> Self {
        Self {
            success: true,
            id: Some(id.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            id: None,
            error: Some(error.into()),
        }
    }
}

/// The remove command implementation.
pub struct RemoveCommand<S: CardStore> {
    store: S,
}

impl<S: CardStore> RemoveCommand<S> {
    /// Create a new remove command.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Run the remove command.
    pub fn run(&self, card_id: &str, _options: &RemoveOptions) -> RemoveOutput {
        match self.remove_card(card_id) {
            Ok(output) => output,
            Err(e) => RemoveOutput::failure(e.to_string()),
        }
    }

    fn remove_card(&self, card_id: &str) -> Result<RemoveOutput> {
        let id = parse_card_id(card_id)?;
        if !self.store.exists(id)? {
            return Err(TabulaeError::card_not_found(id));
        }
        self.store.delete(id)?;

        tracing::info!(card_id = %id, "removed card");
        Ok(RemoveOutput::success(id.to_string()))
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &RemoveOutput, options: &RemoveOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else if output.success {
            format!("Removed card {}\n", output.id.as_deref().unwrap_or_default())
        } else {
            format!(
                "Remove failed: {}\n",
                output.error.as_deref().unwrap_or("unknown error")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Flashcard;
    use crate::storage::MemoryCardStore;
    use chrono::Utc;
    use std::sync::Arc;

    #[test]
    fn test_remove_existing_card() {
        let card = Flashcard::new("local", "amo", "I love", Utc::now()).unwrap();
        let store = Arc::new(MemoryCardStore::with_cards(vec![card.clone()]));
        let cmd = RemoveCommand::new(Arc::clone(&store));

        let output = cmd.run(&card.id.to_string(), &RemoveOptions::default());

        assert!(output.success);
        assert_eq!(output.id, Some(card.id.to_string()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_missing_card() {
        let store = Arc::new(MemoryCardStore::new());
        let cmd = RemoveCommand::new(Arc::clone(&store));

        let output = cmd.run(&uuid::Uuid::new_v4().to_string(), &RemoveOptions::default());

        assert!(!output.success);
        assert!(output.error.unwrap().contains("card not found"));
    }

    #[test]
    fn test_format_output() {
        let store = Arc::new(MemoryCardStore::new());
        let cmd = RemoveCommand::new(store);
        let options = RemoveOptions::default();

        assert_eq!(
            cmd.format_output(&RemoveOutput::success("abc"), &options),
            "Removed card abc\n"
        );
        assert_eq!(
            cmd.format_output(&cmd.run("abc", &options), &options),
            "Remove failed: invalid card id: abc\n"
        );
    }
}
