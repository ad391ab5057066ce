//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.folio/config.toml`. If missing on first run, a
//! commented-out default is generated so readers can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::progress::default_progress_path;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub timing: TimingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Book file to open when `--book` is not given.
    pub book: Option<String>,
    pub progress_file: Option<String>,
    /// Set to false to keep progress in memory only.
    pub persist: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TimingConfig {
    pub page_exit_ms: Option<u64>,
    pub feedback_visible_ms: Option<u64>,
    pub feedback_fade_ms: Option<u64>,
    pub check_status_ms: Option<u64>,
    pub drop_feedback_ms: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_PAGE_EXIT_MS: u64 = 300;
pub const DEFAULT_FEEDBACK_VISIBLE_MS: u64 = 2000;
pub const DEFAULT_FEEDBACK_FADE_MS: u64 = 500;
pub const DEFAULT_CHECK_STATUS_MS: u64 = 3000;
pub const DEFAULT_DROP_FEEDBACK_MS: u64 = 2000;

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

/// Durations for the animation delay and every transient indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub page_exit: Duration,
    pub feedback_visible: Duration,
    pub feedback_fade: Duration,
    pub check_status: Duration,
    pub drop_feedback: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            page_exit: Duration::from_millis(DEFAULT_PAGE_EXIT_MS),
            feedback_visible: Duration::from_millis(DEFAULT_FEEDBACK_VISIBLE_MS),
            feedback_fade: Duration::from_millis(DEFAULT_FEEDBACK_FADE_MS),
            check_status: Duration::from_millis(DEFAULT_CHECK_STATUS_MS),
            drop_feedback: Duration::from_millis(DEFAULT_DROP_FEEDBACK_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// None = built-in book.
    pub book_path: Option<PathBuf>,
    /// None = keep progress in memory.
    pub progress_path: Option<PathBuf>,
    /// Start on the first page regardless of saved progress.
    pub restart: bool,
    pub timing: Timing,
}

/// CLI flags that take part in resolution (None/false = not specified).
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub book: Option<PathBuf>,
    pub no_persist: bool,
    pub restart: bool,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.folio/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".folio").join("config.toml"))
}

/// Load config from `~/.folio/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `FolioConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<FolioConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(FolioConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(FolioConfig::default());
    }

    load_config_from(&path)
}

/// Load config from an explicit path.
pub fn load_config_from(path: &Path) -> Result<FolioConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: FolioConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Commented-out template written on first run.
const DEFAULT_CONFIG: &str = r#"# Folio Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# book = "~/books/grammar.toml"      # Or set FOLIO_BOOK, or pass --book
# progress_file = "progress.json"    # Path relative to ~/.folio/, or FOLIO_PROGRESS_FILE
# persist = true                     # false keeps progress in memory only

# [timing]
# page_exit_ms = 300                 # Page exit animation before the swap
# feedback_visible_ms = 2000         # Quiz feedback shown before fading
# feedback_fade_ms = 500             # Quiz feedback fade-out
# check_status_ms = 3000             # "Check answers" result label
# drop_feedback_ms = 2000            # Drop zone match indicator
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &FolioConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Book: CLI → env → config → built-in
    let book_path = cli
        .book
        .clone()
        .or_else(|| std::env::var("FOLIO_BOOK").ok().map(PathBuf::from))
        .or_else(|| config.general.book.as_deref().map(expand_home));

    // Progress file: env → config (relative to ~/.folio/) → default
    let persist = !cli.no_persist && config.general.persist.unwrap_or(true);
    let progress_path = if persist {
        std::env::var("FOLIO_PROGRESS_FILE")
            .ok()
            .map(PathBuf::from)
            .or_else(|| config.general.progress_file.as_deref().and_then(in_folio_dir))
            .or_else(default_progress_path)
    } else {
        None
    };

    ResolvedConfig {
        book_path,
        progress_path,
        restart: cli.restart,
        timing: resolve_timing(&config.timing),
    }
}

fn resolve_timing(timing: &TimingConfig) -> Timing {
    let ms = |value: Option<u64>, default: u64| Duration::from_millis(value.unwrap_or(default));
    Timing {
        page_exit: ms(timing.page_exit_ms, DEFAULT_PAGE_EXIT_MS),
        feedback_visible: ms(timing.feedback_visible_ms, DEFAULT_FEEDBACK_VISIBLE_MS),
        feedback_fade: ms(timing.feedback_fade_ms, DEFAULT_FEEDBACK_FADE_MS),
        check_status: ms(timing.check_status_ms, DEFAULT_CHECK_STATUS_MS),
        drop_feedback: ms(timing.drop_feedback_ms, DEFAULT_DROP_FEEDBACK_MS),
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Absolute paths pass through; relative ones live under `~/.folio/`.
fn in_folio_dir(path: &str) -> Option<PathBuf> {
    let candidate = expand_home(path);
    if candidate.is_absolute() {
        return Some(candidate);
    }
    dirs::home_dir().map(|h| h.join(".folio").join(candidate))
}
