//! File-based card storage for Tabulae.
//!
//! Cards are stored as JSON files in `~/.tabulae/cards/`, one file per card.
//! Atomic writes are achieved via temp file + rename pattern.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::config::cards_dir;
use crate::core::Flashcard;
use crate::error::{Result, TabulaeError};
use crate::storage::traits::sort_cards;
use crate::storage::{CardStore, ScheduleUpdate};
use crate::util::{read_to_string_with_limit, MAX_CARD_FILE_SIZE};

/// File-based card storage.
///
/// Stores cards as JSON files in a configurable directory. Conditional
/// updates compare versions under a read-then-rename sequence, which guards
/// against stale sessions but not against two processes racing on the same
/// card within one write.
#[derive(Debug, Clone)]
pub struct FileCardStore {
    /// Directory where card files are stored.
    cards_dir: PathBuf,
}

impl FileCardStore {
    /// Create a new file card store with the default directory.
    ///
    /// Uses `~/.tabulae/cards/` or `$TABULAE_HOME/cards/`.
    pub fn new() -> Result<Self> {
        let dir = cards_dir().ok_or_else(|| {
            TabulaeError::config("Could not determine cards directory (no home directory)")
        })?;
        Self::with_dir(dir)
    }

    /// Create a new file card store with a custom directory.
    pub fn with_dir(cards_dir: impl Into<PathBuf>) -> Result<Self> {
        let cards_dir = cards_dir.into();

        if !cards_dir.exists() {
            fs::create_dir_all(&cards_dir).map_err(|e| TabulaeError::storage(&cards_dir, e))?;
        }

        Ok(Self { cards_dir })
    }

    /// Get the path for a card file.
    fn card_path(&self, id: Uuid) -> PathBuf {
        self.cards_dir.join(format!("{}.json", id))
    }

    /// Get the path for a temp file used during atomic writes.
    fn temp_path(&self, id: Uuid) -> PathBuf {
        self.cards_dir.join(format!(".{}.json.tmp", id))
    }

    /// Write a card atomically using temp file + rename.
    fn atomic_write(&self, card: &Flashcard) -> Result<()> {
        let final_path = self.card_path(card.id);
        let temp_path = self.temp_path(card.id);

        let json = serde_json::to_string_pretty(card)?;

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| TabulaeError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| TabulaeError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| TabulaeError::storage(&temp_path, e))?;
        }

        // Rename is atomic on POSIX
        fs::rename(&temp_path, &final_path).map_err(|e| TabulaeError::storage(&final_path, e))?;

        Ok(())
    }

    fn read_card(&self, path: &Path) -> Result<Flashcard> {
        let content = read_to_string_with_limit(path, MAX_CARD_FILE_SIZE)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl CardStore for FileCardStore {
    fn list(&self, owner_id: &str) -> Result<Vec<Flashcard>> {
        if !self.cards_dir.exists() {
            return Ok(Vec::new());
        }

        let entries =
            fs::read_dir(&self.cards_dir).map_err(|e| TabulaeError::storage(&self.cards_dir, e))?;

        let mut cards = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TabulaeError::storage(&self.cards_dir, e))?;
            let path = entry.path();

            // Skip non-JSON files and temp files
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            if path
                .file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(true)
            {
                continue;
            }

            match self.read_card(&path) {
                Ok(card) if card.owner_id == owner_id => cards.push(card),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable card file");
                }
            }
        }

        sort_cards(&mut cards);
        Ok(cards)
    }

    fn get(&self, id: Uuid) -> Result<Option<Flashcard>> {
        let path = self.card_path(id);

        if !path.exists() {
            return Ok(None);
        }

        self.read_card(&path).map(Some)
    }

    fn create(&self, card: &Flashcard) -> Result<Flashcard> {
        card.validate()?;

        if self.card_path(card.id).exists() {
            return Err(TabulaeError::invalid_card_state(format!(
                "card {} already exists",
                card.id
            )));
        }

        self.atomic_write(card)?;
        tracing::debug!(card_id = %card.id, owner_id = %card.owner_id, "created card");
        Ok(card.clone())
    }

    fn update(&self, id: Uuid, update: &ScheduleUpdate) -> Result<Flashcard> {
        let mut card = self
            .get(id)?
            .ok_or_else(|| TabulaeError::card_not_found(id))?;

        update.apply_to(&mut card)?;
        self.atomic_write(&card)?;

        tracing::debug!(card_id = %id, version = card.version, "updated card schedule");
        Ok(card)
    }

    fn delete(&self, id: Uuid) -> Result<()> {
        let path = self.card_path(id);

        if path.exists() {
            fs::remove_file(&path).map_err(|e| TabulaeError::storage(&path, e))?;
        }

        // Also clean up any temp file
        let temp_path = self.temp_path(id);
        if temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        Ok(())
    }
}
