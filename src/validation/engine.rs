//! The validation engine: rule checks, guarded mutation and persistence,
//! and the bounded error log.

use super::log::{
    CriticalClassifier, ErrorRecord, ErrorReport, ErrorSink, FeedbackKind, FeedbackSink,
    WarningRecord,
};
use super::path::{FieldPath, FieldValue, display_value};
use super::rules::{REQUIRED_PUZZLE_FIELDS, REQUIRED_STATE_FIELDS, RuleNamespace, ValidationRules};
use crate::games::chessblitz::{GameState, Puzzle, notation};
use crate::harness_config::{HarnessConfig, StorageSettings};
use crate::storage::{LocalStorage, MemoryStorage, StorageError};
use crate::unwind::catch_failure;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::fmt::Display;
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

/// Rating above which a state draws a warning.
const RATING_WARNING_THRESHOLD: f64 = 10_000.0;

/// Level above which a state draws a warning.
const LEVEL_WARNING_THRESHOLD: f64 = 1_000.0;

/// Validates arena records and guards every mutation and storage access.
///
/// Validation never fails: problems come back as message lists. Guarded
/// operations never propagate failures either; they log them and return a
/// fallback.
pub struct ValidationEngine {
    rules: ValidationRules,
    errors: Vec<ErrorRecord>,
    warnings: Vec<WarningRecord>,
    storage: Box<dyn LocalStorage>,
    feedback: Option<Box<dyn FeedbackSink>>,
    classifier: CriticalClassifier,
    settings: StorageSettings,
    location: String,
    debug: bool,
}

impl std::fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("errors", &self.errors.len())
            .field("warnings", &self.warnings.len())
            .field("stored_keys", &self.storage.len())
            .field("feedback", &self.feedback.is_some())
            .field("debug", &self.debug)
            .finish()
    }
}

impl ValidationEngine {
    /// Creates an engine over `storage` with the standard rule table.
    #[instrument(skip(config, storage))]
    pub fn new(config: &HarnessConfig, storage: Box<dyn LocalStorage>) -> Self {
        info!(namespace = %config.storage().namespace(), debug = config.debug(), "Validation engine ready");
        Self {
            rules: ValidationRules::standard(),
            errors: Vec::new(),
            warnings: Vec::new(),
            storage,
            feedback: None,
            classifier: CriticalClassifier::new(config.critical_keywords().clone()),
            settings: config.storage().clone(),
            location: config.location().clone(),
            debug: *config.debug(),
        }
    }

    /// Creates an engine over fresh in-memory storage, honouring the
    /// configured byte budget.
    #[instrument(skip(config))]
    pub fn in_memory(config: &HarnessConfig) -> Self {
        let storage = match config.storage().quota_bytes() {
            Some(quota) => MemoryStorage::with_quota(*quota),
            None => MemoryStorage::new(),
        };
        Self::new(config, Box::new(storage))
    }

    /// Replaces the rule table.
    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }

    /// Installs the user-visible feedback channel.
    pub fn with_feedback(mut self, sink: Box<dyn FeedbackSink>) -> Self {
        self.feedback = Some(sink);
        self
    }

    /// Swaps the feedback channel, returning the previous one.
    pub fn replace_feedback(
        &mut self,
        sink: Option<Box<dyn FeedbackSink>>,
    ) -> Option<Box<dyn FeedbackSink>> {
        std::mem::replace(&mut self.feedback, sink)
    }

    /// The rule table in use.
    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Storage layout in use.
    pub fn settings(&self) -> &StorageSettings {
        &self.settings
    }

    /// Whether records are echoed at error level.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Read access to the backend.
    pub fn storage(&self) -> &dyn LocalStorage {
        self.storage.as_ref()
    }

    /// Direct access to the backend, bypassing the guards.
    pub fn storage_mut(&mut self) -> &mut dyn LocalStorage {
        self.storage.as_mut()
    }

    /// Errors logged so far, oldest first.
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// Warnings logged so far, oldest first.
    pub fn warnings(&self) -> &[WarningRecord] {
        &self.warnings
    }

    /// Checks a game-state record against the `gameState` rules.
    ///
    /// Warnings for implausibly high rating or level are logged, not
    /// returned.
    #[instrument(skip(self, state))]
    pub fn validate_game_state(&mut self, state: Option<&Value>) -> Vec<String> {
        let Some(state) = state.filter(|s| !s.is_null()) else {
            return vec!["Game state is null or undefined".to_string()];
        };

        let mut errors: Vec<String> = REQUIRED_STATE_FIELDS
            .iter()
            .filter(|field| state.get(**field).is_none())
            .map(|field| format!("Missing required field: {}", field))
            .collect();

        errors.extend(self.rule_failures(RuleNamespace::GameState, state, ""));

        let negative = |field: &str| state.get(field).and_then(Value::as_f64).is_some_and(|v| v < 0.0);
        if negative("xp") || negative("rating") || negative("level") {
            errors.push("Corrupted state detected (negative values)".to_string());
        }

        if let Some(rating) = state.get("rating").filter(|v| v.as_f64().is_some_and(|r| r > RATING_WARNING_THRESHOLD)) {
            self.log_warning("Extremely high rating detected", rating.clone());
        }
        if let Some(level) = state.get("level").filter(|v| v.as_f64().is_some_and(|l| l > LEVEL_WARNING_THRESHOLD)) {
            self.log_warning("Extremely high level detected", level.clone());
        }

        debug!(error_count = errors.len(), "Game state validated");
        errors
    }

    /// Checks a typed game state through its JSON snapshot.
    #[instrument(skip(self, state))]
    pub fn validate_state(&mut self, state: &GameState) -> Vec<String> {
        match serde_json::to_value(state) {
            Ok(snapshot) => self.validate_game_state(Some(&snapshot)),
            Err(e) => vec![format!("Game state could not be serialized: {}", e)],
        }
    }

    /// Checks a puzzle record: required fields, `puzzle` rules, FEN
    /// structure and every solution move.
    #[instrument(skip(self, puzzle))]
    pub fn validate_puzzle(&self, puzzle: Option<&Value>) -> Vec<String> {
        let Some(puzzle) = puzzle.filter(|p| !p.is_null()) else {
            return vec!["Puzzle is null or undefined".to_string()];
        };

        let mut errors: Vec<String> = REQUIRED_PUZZLE_FIELDS
            .iter()
            .filter(|field| puzzle.get(**field).is_none())
            .map(|field| format!("Puzzle missing required field: {}", field))
            .collect();

        errors.extend(self.rule_failures(RuleNamespace::Puzzle, puzzle, "puzzle "));

        if let Some(fen) = puzzle.get("fen").and_then(Value::as_str).filter(|f| !f.is_empty()) {
            if !notation::is_structurally_valid_fen(fen) {
                errors.push(format!("Invalid FEN format: {}", fen));
            }
        }

        if let Some(solution) = puzzle.get("solution").and_then(Value::as_array) {
            for (i, mv) in solution.iter().enumerate() {
                let valid = mv.as_str().is_some_and(notation::matches_move_grammar);
                if !valid {
                    errors.push(format!("Invalid solution move {}: {}", i, display_value(mv)));
                }
            }
        }

        debug!(error_count = errors.len(), "Puzzle validated");
        errors
    }

    /// Checks a typed puzzle through its JSON snapshot.
    #[instrument(skip(self, puzzle), fields(id = %puzzle.id))]
    pub fn validate_puzzle_record(&self, puzzle: &Puzzle) -> Vec<String> {
        match serde_json::to_value(puzzle) {
            Ok(snapshot) => self.validate_puzzle(Some(&snapshot)),
            Err(e) => vec![format!("Puzzle could not be serialized: {}", e)],
        }
    }

    /// Checks a move string. Each failing move rule adds its own message.
    #[instrument(skip(self))]
    pub fn validate_move(&self, mv: Option<&str>) -> Vec<String> {
        let Some(mv) = mv.filter(|m| !m.is_empty()) else {
            return vec!["Move is not a valid string".to_string()];
        };
        self.rules
            .move_rules()
            .iter()
            .filter(|rule| !rule.holds(mv))
            .map(|rule| rule.failure_message(mv))
            .collect()
    }

    /// Checks an arbitrary value as a move.
    pub fn validate_move_value(&self, mv: &Value) -> Vec<String> {
        self.validate_move(mv.as_str())
    }

    fn rule_failures(&self, namespace: RuleNamespace, record: &Value, prefix: &str) -> Vec<String> {
        self.rules
            .field_rules(namespace)
            .iter()
            .filter_map(|rule| match rule.path().resolve(record) {
                FieldValue::Present(value) if !rule.constraint().holds(value) => Some(format!(
                    "Invalid {}{}: {}",
                    prefix,
                    rule.path(),
                    display_value(value)
                )),
                _ => None,
            })
            .collect()
    }

    /// Runs `f`, logging any error or panic as `Error in <label>` and
    /// resolving to `None` in that case.
    pub async fn wrap<T, E, F, Fut>(&mut self, label: &str, f: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let label = if label.is_empty() { "anonymous function" } else { label };
        match catch_failure(async move { f().await }).await {
            Ok(value) => Some(value),
            Err(message) => {
                self.log_error(format!("Error in {}", label), message, json!({}));
                None
            }
        }
    }

    /// Writes `value` at the dotted `key` inside `state`.
    ///
    /// A validator rejection logs a warning and leaves `state` untouched.
    /// Missing or null intermediates are created as records. Returns
    /// whether the write happened.
    #[instrument(skip(self, state, value, validator))]
    pub fn safe_set(
        &mut self,
        state: &mut Value,
        key: &str,
        value: Value,
        validator: Option<&dyn Fn(&Value) -> bool>,
    ) -> bool {
        if let Some(accepts) = validator {
            if !accepts(&value) {
                self.log_warning(format!("Invalid value for {}", key), value);
                return false;
            }
        }
        match FieldPath::parse(key).assign(state, value) {
            Ok(()) => true,
            Err(e) => {
                self.log_error("Error setting state", &e.message, json!({ "key": key }));
                false
            }
        }
    }

    /// [`ValidationEngine::safe_set`] on a typed state.
    ///
    /// The write goes through the JSON snapshot. It is rejected when the
    /// result no longer deserialises or when `key` is not a field of the
    /// state.
    #[instrument(skip(self, state, value, validator))]
    pub fn safe_set_state(
        &mut self,
        state: &mut GameState,
        key: &str,
        value: Value,
        validator: Option<&dyn Fn(&Value) -> bool>,
    ) -> bool {
        let mut snapshot = match serde_json::to_value(&*state) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                self.log_error("Error setting state", e, json!({ "key": key }));
                return false;
            }
        };
        if !self.safe_set(&mut snapshot, key, value.clone(), validator) {
            return false;
        }
        let updated: GameState = match serde_json::from_value(snapshot) {
            Ok(updated) => updated,
            Err(e) => {
                self.log_error("Error setting state", e, json!({ "key": key }));
                return false;
            }
        };
        let landed = serde_json::to_value(&updated)
            .ok()
            .is_some_and(|after| FieldPath::parse(key).resolve(&after).value() == Some(&value));
        if !landed {
            self.log_error(
                "Error setting state",
                format!("'{}' is not a field of the game state", key),
                json!({ "key": key }),
            );
            return false;
        }
        *state = updated;
        true
    }

    /// Reads and decodes `key`, returning `default` when the key is absent
    /// or anything goes wrong.
    #[instrument(skip(self, default))]
    pub fn safe_local_storage_get<T: DeserializeOwned>(&mut self, key: &str, default: T) -> T {
        let raw = match self.storage.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(e) => {
                self.log_error("Error reading from localStorage", &e.message, json!({ "key": key }));
                return default;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                self.log_error("Error reading from localStorage", e, json!({ "key": key }));
                default
            }
        }
    }

    /// Encodes and writes `value` under `key`.
    ///
    /// On a quota failure the evictable log keys are removed and the write
    /// is retried exactly once. Any other failure is logged and not retried.
    #[instrument(skip(self, value))]
    pub fn safe_local_storage_set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> bool {
        let serialized = match serde_json::to_string(value) {
            Ok(serialized) => serialized,
            Err(e) => {
                self.log_error("Error writing to localStorage", e, json!({ "key": key }));
                return false;
            }
        };
        match self.storage.set_item(key, &serialized) {
            Ok(()) => true,
            Err(e) if e.is_quota_exceeded() => {
                self.log_error("localStorage quota exceeded", &e.message, json!({ "key": key }));
                let evicted = self.clear_old_logs();
                match self.storage.set_item(key, &serialized) {
                    Ok(()) => {
                        info!(evicted, "Write succeeded after eviction");
                        true
                    }
                    Err(retry) => {
                        warn!(evicted, error = %retry, "Write failed after eviction");
                        false
                    }
                }
            }
            Err(e) => {
                self.log_error("Error writing to localStorage", &e.message, json!({ "key": key }));
                false
            }
        }
    }

    /// Removes every key the quota policy may evict. Returns how many went.
    #[instrument(skip(self))]
    pub fn clear_old_logs(&mut self) -> usize {
        let doomed: Vec<String> = self
            .storage
            .keys()
            .into_iter()
            .filter(|key| self.settings.is_evictable(key))
            .collect();
        let mut removed = 0;
        for key in &doomed {
            match self.storage.remove_item(key) {
                Ok(()) => removed += 1,
                Err(e) => error!(key = %key, error = %e, "Failed to clear old logs"),
            }
        }
        debug!(removed, "Old logs cleared");
        removed
    }

    /// Appends an error record, surfaces it when critical and persists the
    /// bounded tail.
    #[instrument(skip(self, kind, message, details))]
    pub fn log_error(&mut self, kind: impl Into<String>, message: impl Display, details: Value) {
        let message = message.to_string();
        let record = ErrorRecord {
            kind: kind.into(),
            message: if message.is_empty() {
                "Unknown error".to_string()
            } else {
                message
            },
            details,
            timestamp: Utc::now(),
            url: self.location.clone(),
        };

        if self.classifier.is_critical(&record) {
            self.show_error_to_user(&record);
        }
        if self.debug {
            error!(kind = %record.kind, message = %record.message, details = %record.details, "Error logged");
        } else {
            debug!(kind = %record.kind, message = %record.message, "Error logged");
        }

        self.errors.push(record);
        self.persist_errors();
    }

    /// Appends a warning record. Warnings are never persisted.
    #[instrument(skip(self, message, details))]
    pub fn log_warning(&mut self, message: impl Into<String>, details: Value) {
        let record = WarningRecord {
            message: message.into(),
            details,
            timestamp: Utc::now(),
        };
        if self.debug {
            warn!(message = %record.message, details = %record.details, "Warning logged");
        } else {
            debug!(message = %record.message, "Warning logged");
        }
        self.warnings.push(record);
    }

    fn show_error_to_user(&self, record: &ErrorRecord) {
        match &self.feedback {
            Some(sink) => sink.show_feedback(&format!("Error: {}", record.message), FeedbackKind::Error),
            None => error!(message = %record.message, "CRITICAL ERROR"),
        }
    }

    fn persist_errors(&mut self) {
        let start = self.errors.len().saturating_sub(*self.settings.error_log_capacity());
        let outcome = serde_json::to_string(&self.errors[start..])
            .map_err(StorageError::from)
            .and_then(|tail| self.storage.set_item(self.settings.error_log_key(), &tail));
        if let Err(e) = outcome {
            debug!(error = %e, "Could not persist error tail");
        }
    }

    /// Reads the persisted error tail.
    #[instrument(skip(self))]
    pub fn persisted_errors(&self) -> Vec<ErrorRecord> {
        self.storage
            .get_item(self.settings.error_log_key())
            .ok()
            .flatten()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    /// Loads the persisted tail ahead of anything logged in this run.
    /// Returns how many records were restored.
    #[instrument(skip(self))]
    pub fn restore_persisted_errors(&mut self) -> usize {
        let mut restored = self.persisted_errors();
        let count = restored.len();
        restored.append(&mut self.errors);
        self.errors = restored;
        info!(count, "Restored persisted errors");
        count
    }

    /// Everything logged so far. Pure read.
    pub fn error_report(&self) -> ErrorReport {
        ErrorReport {
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
            error_count: self.errors.len(),
            warning_count: self.warnings.len(),
            last_error: self.errors.last().cloned(),
            critical_errors: self
                .errors
                .iter()
                .filter(|record| self.classifier.is_critical(record))
                .cloned()
                .collect(),
        }
    }

    /// Empties both logs and removes the persisted tail.
    #[instrument(skip(self))]
    pub fn clear_errors(&mut self) {
        self.errors.clear();
        self.warnings.clear();
        if let Err(e) = self.storage.remove_item(self.settings.error_log_key()) {
            debug!(error = %e, "Could not remove persisted error tail");
        }
    }

    /// Writes the error report as pretty JSON to
    /// `chess-errors-<unix millis>.json` inside `dir`.
    #[instrument(skip(self, dir), fields(dir = %dir.as_ref().display()))]
    pub fn export_errors(&self, dir: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        let path = dir
            .as_ref()
            .join(format!("chess-errors-{}.json", Utc::now().timestamp_millis()));
        let content = serde_json::to_string_pretty(&self.error_report())?;
        std::fs::write(&path, content)?;
        info!(path = %path.display(), "Error report exported");
        Ok(path)
    }
}

impl ErrorSink for ValidationEngine {
    fn record_error(&mut self, kind: &str, message: &str, details: Value) {
        self.log_error(kind, message, details);
    }

    fn record_warning(&mut self, message: &str, details: Value) {
        self.log_warning(message, details);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ValidationEngine {
        ValidationEngine::in_memory(&HarnessConfig::default())
    }

    #[test]
    fn test_negative_values_signal_twice() {
        let mut engine = engine();
        let state = json!({
            "rating": -5, "level": 1, "xp": 0, "coins": 0, "streak": 0,
            "powers": {"hint": 0, "freeze": 0, "skip": 0, "double": 0}
        });
        let errors = engine.validate_game_state(Some(&state));
        assert!(errors.contains(&"Invalid rating: -5".to_string()));
        assert!(errors.contains(&"Corrupted state detected (negative values)".to_string()));
    }

    #[test]
    fn test_high_rating_is_a_warning_only() {
        let mut engine = engine();
        let state = json!({
            "rating": 12000, "level": 1, "xp": 0, "coins": 0, "streak": 0,
            "powers": {"hint": 0, "freeze": 0, "skip": 0, "double": 0}
        });
        let errors = engine.validate_game_state(Some(&state));
        assert_eq!(errors, vec!["Invalid rating: 12000".to_string()]);
        assert_eq!(engine.warnings().len(), 1);
        assert_eq!(engine.warnings()[0].message, "Extremely high rating detected");
    }

    #[test]
    fn test_null_intermediate_is_absent() {
        let mut engine = engine();
        let state = json!({
            "rating": 800, "level": 1, "xp": 0, "coins": 0, "streak": 0, "powers": null
        });
        assert!(engine.validate_game_state(Some(&state)).is_empty());
    }

    #[test]
    fn test_empty_message_becomes_unknown() {
        let mut engine = engine();
        engine.log_error("Console Error", "", json!({}));
        assert_eq!(engine.errors()[0].message, "Unknown error");
    }

    #[tokio::test]
    async fn test_wrap_labels_anonymous() {
        let mut engine = engine();
        let out: Option<u8> = engine.wrap("", || async { Err::<u8, _>("bad") }).await;
        assert!(out.is_none());
        assert_eq!(engine.errors()[0].kind, "Error in anonymous function");
        assert_eq!(engine.errors()[0].message, "bad");
    }
}
