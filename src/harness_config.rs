//! Harness configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the standard arena setup. `STRICTLY_BLITZ_DEBUG` overrides `debug`.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Environment variable that overrides [`HarnessConfig::debug`].
pub const DEBUG_ENV_VAR: &str = "STRICTLY_BLITZ_DEBUG";

/// Top-level harness configuration.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct HarnessConfig {
    /// Echo every error and warning record through `tracing` at error level.
    #[serde(default)]
    debug: bool,

    /// Location stamped on error records.
    #[serde(default = "default_location")]
    #[setters(into)]
    location: String,

    /// Substrings that mark an error record as critical.
    #[serde(default = "default_critical_keywords")]
    critical_keywords: Vec<String>,

    /// Persistence layout.
    #[serde(default)]
    storage: StorageSettings,

    /// Assessment rating formula.
    #[serde(default)]
    assessment: AssessmentSettings,

    /// Delays used by the suites.
    #[serde(default)]
    timing: TimingSettings,

    /// Game rules shared by the reference host.
    #[serde(default)]
    game: GameSettings,
}

#[instrument]
fn default_location() -> String {
    "app://strictly_blitz/local".to_string()
}

#[instrument]
fn default_critical_keywords() -> Vec<String> {
    ["localStorage", "QuotaExceeded", "Network", "Failed to fetch"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            debug: false,
            location: default_location(),
            critical_keywords: default_critical_keywords(),
            storage: StorageSettings::default(),
            assessment: AssessmentSettings::default(),
            timing: TimingSettings::default(),
            game: GameSettings::default(),
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        info!(debug = config.debug, namespace = %config.storage.namespace, "Config loaded successfully");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Applies `STRICTLY_BLITZ_DEBUG` when it is set to a recognised value.
    #[instrument(skip(self))]
    pub fn apply_env(self) -> Self {
        match std::env::var(DEBUG_ENV_VAR) {
            Ok(raw) => match parse_flag(&raw) {
                Some(flag) => {
                    debug!(flag, "Debug flag overridden from environment");
                    self.with_debug(flag)
                }
                None => {
                    warn!(value = %raw, "Ignoring unrecognised {}", DEBUG_ENV_VAR);
                    self
                }
            },
            Err(_) => self,
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Where and how the engine persists its records.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_", into)]
pub struct StorageSettings {
    /// Prefix shared by every key this harness owns.
    #[serde(default = "default_namespace")]
    namespace: String,

    /// Substring identifying evictable log keys.
    #[serde(default = "default_log_marker")]
    log_marker: String,

    /// Key holding the game-state snapshot.
    #[serde(default = "default_game_state_key")]
    game_state_key: String,

    /// Key holding the persisted error tail.
    #[serde(default = "default_error_log_key")]
    error_log_key: String,

    /// Number of error records kept in the persisted tail.
    #[serde(default = "default_error_log_capacity")]
    error_log_capacity: usize,

    /// Optional byte budget for the storage backend.
    #[serde(default)]
    quota_bytes: Option<usize>,
}

#[instrument]
fn default_namespace() -> String {
    "chessBlitz".to_string()
}

#[instrument]
fn default_log_marker() -> String {
    "log".to_string()
}

#[instrument]
fn default_game_state_key() -> String {
    "chessBlitzGameState".to_string()
}

#[instrument]
fn default_error_log_key() -> String {
    "chessBlitzErrors".to_string()
}

#[instrument]
fn default_error_log_capacity() -> usize {
    50
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            log_marker: default_log_marker(),
            game_state_key: default_game_state_key(),
            error_log_key: default_error_log_key(),
            error_log_capacity: default_error_log_capacity(),
            quota_bytes: None,
        }
    }
}

impl StorageSettings {
    /// Returns true for keys the quota policy may evict.
    pub fn is_evictable(&self, key: &str) -> bool {
        key.starts_with(self.namespace.as_str()) && key.contains(self.log_marker.as_str())
    }
}

/// Placement assessment parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct AssessmentSettings {
    /// Rating before any answer counts.
    #[serde(default = "default_base")]
    base: i64,

    /// Points added per correct answer.
    #[serde(default = "default_per_correct")]
    per_correct: i64,

    /// Points removed per wrong answer.
    #[serde(default = "default_per_wrong")]
    per_wrong: i64,

    /// Puzzles in one assessment.
    #[serde(default = "default_puzzle_count")]
    puzzle_count: usize,
}

#[instrument]
fn default_base() -> i64 {
    800
}

#[instrument]
fn default_per_correct() -> i64 {
    80
}

#[instrument]
fn default_per_wrong() -> i64 {
    30
}

#[instrument]
fn default_puzzle_count() -> usize {
    10
}

impl Default for AssessmentSettings {
    fn default() -> Self {
        Self {
            base: default_base(),
            per_correct: default_per_correct(),
            per_wrong: default_per_wrong(),
            puzzle_count: default_puzzle_count(),
        }
    }
}

impl AssessmentSettings {
    /// Rating earned from an assessment with the given tallies.
    #[instrument(skip(self))]
    pub fn rating_for(&self, correct: usize, wrong: usize) -> i64 {
        let correct = i64::try_from(correct).unwrap_or(i64::MAX);
        let wrong = i64::try_from(wrong).unwrap_or(i64::MAX);
        self.base
            .saturating_add(correct.saturating_mul(self.per_correct))
            .saturating_sub(wrong.saturating_mul(self.per_wrong))
    }
}

/// Delays, in milliseconds, used by checks that wait on game effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct TimingSettings {
    /// Delay before the host loads the next puzzle after a correct answer.
    #[serde(default = "default_auto_advance")]
    auto_advance: u64,
    /// How long a check waits for an auto-advance.
    #[serde(default = "default_advance_wait")]
    advance_wait: u64,
    /// Brief settle after an action.
    #[serde(default = "default_short_settle")]
    short_settle: u64,
    /// How long a check waits for one timer tick.
    #[serde(default = "default_timer_wait")]
    timer_wait: u64,
    /// Partial wait before freezing the timer.
    #[serde(default = "default_freeze_probe")]
    freeze_probe: u64,
    /// Observation window for console error capture.
    #[serde(default = "default_console_window")]
    console_window: u64,
    /// Fixed polling interval for timed conditions.
    #[serde(default = "default_poll_interval")]
    poll_interval: u64,
}

#[instrument]
fn default_auto_advance() -> u64 {
    1000
}

#[instrument]
fn default_advance_wait() -> u64 {
    1100
}

#[instrument]
fn default_short_settle() -> u64 {
    100
}

#[instrument]
fn default_timer_wait() -> u64 {
    1100
}

#[instrument]
fn default_freeze_probe() -> u64 {
    500
}

#[instrument]
fn default_console_window() -> u64 {
    1000
}

#[instrument]
fn default_poll_interval() -> u64 {
    100
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            auto_advance: default_auto_advance(),
            advance_wait: default_advance_wait(),
            short_settle: default_short_settle(),
            timer_wait: default_timer_wait(),
            freeze_probe: default_freeze_probe(),
            console_window: default_console_window(),
            poll_interval: default_poll_interval(),
        }
    }
}

impl TimingSettings {
    /// Auto-advance delay as a [`Duration`].
    pub fn auto_advance_delay(&self) -> Duration {
        Duration::from_millis(self.auto_advance)
    }

    /// Auto-advance wait as a [`Duration`].
    pub fn advance_wait_delay(&self) -> Duration {
        Duration::from_millis(self.advance_wait)
    }

    /// Short settle as a [`Duration`].
    pub fn short_settle_delay(&self) -> Duration {
        Duration::from_millis(self.short_settle)
    }

    /// Timer wait as a [`Duration`].
    pub fn timer_wait_delay(&self) -> Duration {
        Duration::from_millis(self.timer_wait)
    }

    /// Freeze probe as a [`Duration`].
    pub fn freeze_probe_delay(&self) -> Duration {
        Duration::from_millis(self.freeze_probe)
    }

    /// Console window as a [`Duration`].
    pub fn console_window_delay(&self) -> Duration {
        Duration::from_millis(self.console_window)
    }

    /// Polling interval as a [`Duration`].
    pub fn poll_interval_delay(&self) -> Duration {
        Duration::from_millis(self.poll_interval)
    }
}

/// Rules for the turn timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct GameSettings {
    /// Seconds on the clock when a puzzle starts.
    #[serde(default = "default_turn_seconds")]
    turn_seconds: u32,
    /// At or below this many seconds the timer shows a warning.
    #[serde(default = "default_timer_warning_at")]
    timer_warning_at: u32,
}

#[instrument]
fn default_turn_seconds() -> u32 {
    30
}

#[instrument]
fn default_timer_warning_at() -> u32 {
    10
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            turn_seconds: default_turn_seconds(),
            timer_warning_at: default_timer_warning_at(),
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assessment_formula() {
        let settings = AssessmentSettings::default();
        assert_eq!(settings.rating_for(8, 2), 1380);
        assert_eq!(settings.rating_for(0, 10), 500);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_evictable_keys() {
        let storage = StorageSettings::default();
        assert!(storage.is_evictable("chessBlitz_log_abc"));
        assert!(!storage.is_evictable("chessBlitzGameState"));
        assert!(!storage.is_evictable("other_log"));
    }
}
