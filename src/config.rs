//! Configuration loading for Tabulae.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.tabulae/config.toml`)
//! 3. User config (`~/.tabulae/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The system runs with sensible defaults
//! when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{AdvancePolicy, VALID_ADVANCE_POLICIES};
use crate::error::{Result, TabulaeError};

/// Owner used when none is configured.
pub const DEFAULT_OWNER: &str = "local";

/// Main configuration struct for Tabulae.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Whose deck the CLI works on.
    pub profile: ProfileConfig,
    /// Study session behavior.
    pub study: StudyConfig,
}

/// Learner profile configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfileConfig {
    /// Owner ID stamped on new cards and used to filter listings.
    pub owner: String,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
        }
    }
}

/// Study session configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StudyConfig {
    /// Advance policy: "all" cycles the whole deck, "due" only due cards.
    pub advance_policy: String,
    /// Stop a study session after this many ratings (0 = unlimited).
    pub max_reviews: u32,
    /// Show the interval each rating would schedule before rating.
    pub show_intervals: bool,
}

impl StudyConfig {
    /// Check if a value is a valid advance policy.
    pub fn is_valid_advance_policy(value: &str) -> bool {
        VALID_ADVANCE_POLICIES.contains(&value)
    }
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            advance_policy: AdvancePolicy::default().as_config_value().to_string(),
            max_reviews: 0,
            show_intervals: true,
        }
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    ///
    /// Precedence (highest to lowest):
    /// 1. Environment variables
    /// 2. Project config (`.tabulae/config.toml` in cwd or an ancestor)
    /// 3. User config (`~/.tabulae/config.toml`)
    /// 4. Defaults
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.tabulae/config.toml`.
    fn load_user_config() -> Option<Config> {
        let path = tabulae_home()?.join("config.toml");
        Self::load_layer(&path)
    }

    /// Load project config from the nearest `.tabulae/config.toml`.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        let path = find_project_config(cwd)?;
        Self::load_layer(&path)
    }

    /// Load one layer, warning about files that exist but do not parse.
    fn load_layer(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    /// Load config from a specific file path.
    fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| TabulaeError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| TabulaeError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // TABULAE_OWNER
        if let Ok(val) = env::var("TABULAE_OWNER") {
            let trimmed = val.trim();
            if trimmed.is_empty() {
                eprintln!(
                    "Warning: TABULAE_OWNER is empty. Using '{}'.",
                    self.profile.owner
                );
            } else {
                self.profile.owner = trimmed.to_string();
            }
        }

        // TABULAE_ADVANCE_POLICY
        if let Ok(val) = env::var("TABULAE_ADVANCE_POLICY") {
            if StudyConfig::is_valid_advance_policy(&val) {
                self.study.advance_policy = val;
            } else {
                eprintln!(
                    "Warning: Invalid TABULAE_ADVANCE_POLICY value '{}'. \
                    Valid values: {}. Using '{}'.",
                    val,
                    VALID_ADVANCE_POLICIES.join(", "),
                    self.study.advance_policy
                );
            }
        }

        // TABULAE_MAX_REVIEWS
        if let Ok(val) = env::var("TABULAE_MAX_REVIEWS") {
            match val.parse::<u32>() {
                Ok(n) => self.study.max_reviews = n,
                Err(_) => eprintln!(
                    "Warning: Invalid TABULAE_MAX_REVIEWS value '{}'. \
                    Expected a non-negative integer. Using '{}'.",
                    val, self.study.max_reviews
                ),
            }
        }

        // TABULAE_SHOW_INTERVALS
        if let Ok(val) = env::var("TABULAE_SHOW_INTERVALS") {
            match val.to_lowercase().as_str() {
                "true" | "1" | "yes" => self.study.show_intervals = true,
                "false" | "0" | "no" => self.study.show_intervals = false,
                _ => eprintln!(
                    "Warning: Invalid TABULAE_SHOW_INTERVALS value '{}'. \
                    Expected true or false. Using '{}'.",
                    val, self.study.show_intervals
                ),
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// Values from `other` take precedence where they differ from defaults,
    /// so a layer only needs to name its customizations. A layer cannot
    /// reset a lower layer's value back to the default.
    fn merge(mut self, other: Config) -> Self {
        let default_profile = ProfileConfig::default();
        if other.profile.owner != default_profile.owner {
            self.profile.owner = other.profile.owner;
        }

        let default_study = StudyConfig::default();
        if other.study.advance_policy != default_study.advance_policy {
            self.study.advance_policy = other.study.advance_policy;
        }
        if other.study.max_reviews != default_study.max_reviews {
            self.study.max_reviews = other.study.max_reviews;
        }
        if other.study.show_intervals != default_study.show_intervals {
            self.study.show_intervals = other.study.show_intervals;
        }

        self
    }

    /// The configured advance policy.
    ///
    /// A value that is not `"all"` or `"due"` (e.g. a typo in a config file)
    /// falls back to cycling through all cards.
    pub fn advance_policy(&self) -> AdvancePolicy {
        AdvancePolicy::from_config_value(&self.study.advance_policy).unwrap_or_else(|| {
            tracing::warn!(
                value = %self.study.advance_policy,
                "unknown advance_policy, cycling through all cards"
            );
            AdvancePolicy::default()
        })
    }

    /// Session review cap, `None` when unlimited.
    pub fn max_reviews(&self) -> Option<usize> {
        match self.study.max_reviews {
            0 => None,
            n => Some(n as usize),
        }
    }
}

/// Get the Tabulae home directory.
///
/// Returns `$TABULAE_HOME` if set and non-empty, otherwise `~/.tabulae`.
/// Relative `TABULAE_HOME` values are canonicalized when they exist.
pub fn tabulae_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("TABULAE_HOME") {
        if home.is_empty() {
            tracing::warn!("TABULAE_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("TABULAE_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".tabulae"));
    }

    let fallback_path = fallback_tabulae_home();
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

#[cfg(unix)]
fn fallback_tabulae_home() -> PathBuf {
    use std::os::unix::fs::MetadataExt;
    let uid = std::fs::metadata("/").map(|m| m.uid()).unwrap_or(0);
    PathBuf::from(format!("/tmp/tabulae-{}", uid))
}

#[cfg(not(unix))]
fn fallback_tabulae_home() -> PathBuf {
    std::env::temp_dir().join("tabulae")
}

/// Get the cards directory.
///
/// Returns `<tabulae_home>/cards/`.
pub fn cards_dir() -> Option<PathBuf> {
    tabulae_home().map(|h| h.join("cards"))
}

/// Find the nearest `.tabulae/config.toml` in `cwd` or one of its ancestors.
pub fn find_project_config(cwd: &Path) -> Option<PathBuf> {
    cwd.ancestors()
        .map(|dir| dir.join(".tabulae").join("config.toml"))
        .find(|path| path.is_file())
}
