//! Tests for the validation engine: rule checks, guarded mutation,
//! guarded persistence and the bounded error log.

use serde_json::{Value, json};
use std::cell::Cell;
use std::rc::Rc;
use strictly_blitz::{
    FeedbackKind, FeedbackLog, GameState, HarnessConfig, LocalStorage, MemoryStorage,
    StorageError, ValidationEngine, start_position_puzzle,
};

fn setup_engine() -> ValidationEngine {
    ValidationEngine::in_memory(&HarnessConfig::default())
}

fn setup_engine_with_quota(quota: usize) -> ValidationEngine {
    ValidationEngine::new(
        &HarnessConfig::default(),
        Box::new(MemoryStorage::with_quota(quota)),
    )
}

fn valid_state() -> Value {
    json!({
        "rating": 800,
        "level": 1,
        "xp": 0,
        "coins": 0,
        "streak": 0,
        "timer": 30,
        "powers": {"hint": 3, "freeze": 2, "skip": 1, "double": 1}
    })
}

#[test]
fn test_valid_state_has_no_errors() {
    let mut engine = setup_engine();
    assert!(engine.validate_game_state(Some(&valid_state())).is_empty());
    assert!(engine.warnings().is_empty());
}

#[test]
fn test_null_state() {
    let mut engine = setup_engine();
    assert_eq!(
        engine.validate_game_state(None),
        vec!["Game state is null or undefined".to_string()]
    );
    assert_eq!(
        engine.validate_game_state(Some(&Value::Null)),
        vec!["Game state is null or undefined".to_string()]
    );
}

#[test]
fn test_missing_fields_reported_in_order() {
    let mut engine = setup_engine();
    let errors = engine.validate_game_state(Some(&json!({"rating": 800, "level": 1})));
    assert_eq!(
        errors,
        vec![
            "Missing required field: xp".to_string(),
            "Missing required field: coins".to_string(),
            "Missing required field: streak".to_string(),
            "Missing required field: powers".to_string(),
        ]
    );
}

#[test]
fn test_out_of_range_power() {
    let mut engine = setup_engine();
    let mut state = valid_state();
    state["powers"]["hint"] = json!(101);
    assert_eq!(
        engine.validate_game_state(Some(&state)),
        vec!["Invalid powers.hint: 101".to_string()]
    );
}

#[test]
fn test_non_number_fails_numeric_rule() {
    let mut engine = setup_engine();
    let mut state = valid_state();
    state["coins"] = json!("lots");
    state["xp"] = Value::Null;
    let errors = engine.validate_game_state(Some(&state));
    assert!(errors.contains(&"Invalid coins: lots".to_string()));
    assert!(errors.contains(&"Invalid xp: null".to_string()));
}

#[test]
fn test_high_level_warns_and_fails_range() {
    let mut engine = setup_engine();
    let mut state = valid_state();
    state["level"] = json!(20000);
    let errors = engine.validate_game_state(Some(&state));
    assert_eq!(errors, vec!["Invalid level: 20000".to_string()]);
    assert_eq!(engine.warnings()[0].message, "Extremely high level detected");
}

#[test]
fn test_default_typed_state_is_valid() {
    let mut engine = setup_engine();
    assert!(engine.validate_state(&GameState::default()).is_empty());
}

#[test]
fn test_start_position_puzzle_is_valid() {
    let engine = setup_engine();
    assert!(
        engine
            .validate_puzzle_record(&start_position_puzzle())
            .is_empty()
    );
}

#[test]
fn test_bad_fen_is_reported() {
    let engine = setup_engine();
    let puzzle = json!({
        "fen": "bad",
        "solution": ["e2e4"],
        "toMove": "White",
        "rating": 1200
    });
    let errors = engine.validate_puzzle(Some(&puzzle));
    assert!(errors.contains(&"Invalid puzzle fen: bad".to_string()));
    assert!(errors.contains(&"Invalid FEN format: bad".to_string()));
}

#[test]
fn test_puzzle_solution_moves_checked() {
    let engine = setup_engine();
    let mut puzzle = serde_json::to_value(start_position_puzzle()).expect("serialize failed");
    puzzle["solution"] = json!(["e2e4", "zz99", 5]);
    let errors = engine.validate_puzzle(Some(&puzzle));
    assert_eq!(
        errors,
        vec![
            "Invalid solution move 1: zz99".to_string(),
            "Invalid solution move 2: 5".to_string(),
        ]
    );
}

#[test]
fn test_puzzle_side_and_missing_fields() {
    let engine = setup_engine();
    let errors = engine.validate_puzzle(Some(&json!({"toMove": "Green"})));
    assert!(errors.contains(&"Puzzle missing required field: fen".to_string()));
    assert!(errors.contains(&"Puzzle missing required field: solution".to_string()));
    assert!(errors.contains(&"Invalid puzzle toMove: Green".to_string()));
    assert_eq!(
        engine.validate_puzzle(None),
        vec!["Puzzle is null or undefined".to_string()]
    );
}

#[test]
fn test_move_rules() {
    let engine = setup_engine();
    assert!(engine.validate_move(Some("e2e4")).is_empty());
    assert!(engine.validate_move(Some("e7e8q")).is_empty());
    assert_eq!(
        engine.validate_move(Some("e9e4")),
        vec![
            "Invalid move format: e9e4".to_string(),
            "Invalid squares in move: e9e4".to_string(),
        ]
    );
    assert_eq!(
        engine.validate_move(None),
        vec!["Move is not a valid string".to_string()]
    );
    assert_eq!(
        engine.validate_move(Some("")),
        vec!["Move is not a valid string".to_string()]
    );
}

#[test]
fn test_safe_set_creates_nested_path() {
    let mut engine = setup_engine();
    let mut state = json!({});
    assert!(engine.safe_set(&mut state, "a.b.c", json!(1), None));
    assert_eq!(state, json!({"a": {"b": {"c": 1}}}));
}

#[test]
fn test_safe_set_validator_rejection_leaves_state() {
    let mut engine = setup_engine();
    let mut state = valid_state();
    let positive = |v: &Value| v.as_i64().is_some_and(|n| n >= 0);
    assert!(!engine.safe_set(&mut state, "coins", json!(-10), Some(&positive)));
    assert_eq!(state["coins"], json!(0));
    assert_eq!(engine.warnings()[0].message, "Invalid value for coins");
    assert!(engine.errors().is_empty());
}

#[test]
fn test_safe_set_state_rejects_unknown_field() {
    let mut engine = setup_engine();
    let mut state = GameState::default();
    assert!(engine.safe_set_state(&mut state, "coins", json!(250), None));
    assert_eq!(state.coins, 250);
    assert!(engine.safe_set_state(&mut state, "powers.hint", json!(9), None));
    assert_eq!(state.powers.hint, 9);

    assert!(!engine.safe_set_state(&mut state, "nonsense", json!(1), None));
    assert_eq!(engine.errors().last().expect("error logged").kind, "Error setting state");
}

#[test]
fn test_storage_get_default_and_decode_failure() {
    let mut engine = setup_engine();
    assert_eq!(engine.safe_local_storage_get("missing", 7_i64), 7);

    engine
        .storage_mut()
        .set_item("broken", "{not json")
        .expect("set failed");
    assert_eq!(engine.safe_local_storage_get("broken", 7_i64), 7);
    assert_eq!(engine.errors()[0].kind, "Error reading from localStorage");
}

#[test]
fn test_storage_set_and_get_round_trip() {
    let mut engine = setup_engine();
    let state = GameState::default();
    assert!(engine.safe_local_storage_set("chessBlitzGameState", &state));
    let loaded: GameState = engine.safe_local_storage_get("chessBlitzGameState", GameState::default());
    assert_eq!(loaded, state);
}

#[test]
fn test_quota_evicts_logs_and_retries_once() {
    let mut engine = setup_engine_with_quota(200);
    engine
        .storage_mut()
        .set_item("chessBlitz_log_old", &"x".repeat(100))
        .expect("seed failed");
    engine
        .storage_mut()
        .set_item("keep", "1")
        .expect("seed failed");

    let payload = "y".repeat(80);
    assert!(engine.safe_local_storage_set("chessBlitzGameState", &payload));

    let storage = engine.storage();
    assert!(storage.get_item("chessBlitz_log_old").expect("get failed").is_none());
    assert_eq!(storage.get_item("keep").expect("get failed").as_deref(), Some("1"));
    assert_eq!(engine.errors()[0].kind, "localStorage quota exceeded");
}

#[test]
fn test_quota_failure_after_eviction_is_final() {
    let mut engine = setup_engine_with_quota(50);
    let payload = "z".repeat(100);
    assert!(!engine.safe_local_storage_set("chessBlitzGameState", &payload));

    let quota_errors = engine
        .errors()
        .iter()
        .filter(|e| e.kind == "localStorage quota exceeded")
        .count();
    assert_eq!(quota_errors, 1);
    assert!(
        engine
            .storage()
            .get_item("chessBlitzGameState")
            .expect("get failed")
            .is_none()
    );
}

/// Storage that always refuses writes to one key and counts the attempts.
struct RefusingStorage {
    inner: MemoryStorage,
    refused: &'static str,
    attempts: Rc<Cell<usize>>,
}

impl LocalStorage for RefusingStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if key == self.refused {
            self.attempts.set(self.attempts.get() + 1);
            return Err(StorageError::quota_exceeded("storage full"));
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(key)
    }

    fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.inner.clear()
    }
}

#[test]
fn test_quota_retries_exactly_once() {
    let attempts = Rc::new(Cell::new(0));
    let mut inner = MemoryStorage::new();
    inner
        .set_item("chessBlitz_log_old", "stale")
        .expect("seed failed");
    let storage = RefusingStorage {
        inner,
        refused: "chessBlitzGameState",
        attempts: Rc::clone(&attempts),
    };
    let mut engine = ValidationEngine::new(&HarnessConfig::default(), Box::new(storage));

    assert!(!engine.safe_local_storage_set("chessBlitzGameState", &json!({"level": 3})));
    assert_eq!(attempts.get(), 2);
    assert_eq!(engine.storage().keys(), vec!["chessBlitzErrors".to_string()]);
}

#[test]
fn test_persisted_tail_is_capped_at_fifty() {
    let mut engine = setup_engine();
    for i in 0..60 {
        engine.log_error("Test Error", format!("error {}", i), json!({"i": i}));
    }
    assert_eq!(engine.errors().len(), 60);

    let persisted = engine.persisted_errors();
    assert_eq!(persisted.len(), 50);
    assert_eq!(persisted[0].message, "error 10");
    assert_eq!(persisted[49].message, "error 59");
}

#[test]
fn test_restore_puts_persisted_first() {
    let config = HarnessConfig::default();
    let mut first = ValidationEngine::in_memory(&config);
    first.log_error("Earlier", "from a previous run", json!({}));
    let raw = first
        .storage()
        .get_item("chessBlitzErrors")
        .expect("get failed")
        .expect("tail persisted");

    let mut storage = MemoryStorage::new();
    storage.set_item("chessBlitzErrors", &raw).expect("set failed");
    let mut second = ValidationEngine::new(&config, Box::new(storage));
    assert_eq!(second.restore_persisted_errors(), 1);
    second.log_error("Later", "from this run", json!({}));

    assert_eq!(second.persisted_errors().len(), 2);
    let kinds: Vec<&str> = second.errors().iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, vec!["Earlier", "Later"]);
}

#[test]
fn test_critical_errors_reach_feedback() {
    let feedback = FeedbackLog::new();
    let mut engine = setup_engine().with_feedback(Box::new(feedback.clone()));

    engine.log_error("Network", "request dropped", json!({}));
    engine.log_error("Render", "glitch", json!({}));

    assert_eq!(feedback.count(FeedbackKind::Error), 1);
    assert_eq!(feedback.entries()[0].0, "Error: request dropped");

    let report = engine.error_report();
    assert_eq!(report.error_count, 2);
    assert_eq!(report.critical_errors.len(), 1);
    assert_eq!(report.last_error.expect("last error").kind, "Render");
}

#[test]
fn test_clear_errors_removes_persisted_tail() {
    let mut engine = setup_engine();
    engine.log_error("Test Error", "one", json!({}));
    engine.log_warning("careful", json!({}));
    engine.clear_errors();

    let report = engine.error_report();
    assert_eq!(report.error_count, 0);
    assert_eq!(report.warning_count, 0);
    assert!(engine.persisted_errors().is_empty());
}

#[test]
fn test_export_errors_writes_report() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut engine = setup_engine();
    engine.log_error("Test Error", "exported", json!({}));

    let path = engine.export_errors(dir.path()).expect("export failed");
    let name = path.file_name().and_then(|n| n.to_str()).expect("file name");
    assert!(name.starts_with("chess-errors-"));

    let content = std::fs::read_to_string(&path).expect("read failed");
    let report: Value = serde_json::from_str(&content).expect("parse failed");
    assert_eq!(report["errorCount"], json!(1));
    assert_eq!(report["errors"][0]["type"], json!("Test Error"));
}

#[tokio::test]
async fn test_wrap_passes_success_through() {
    let mut engine = setup_engine();
    let value = engine
        .wrap("loadNextPuzzle", || async { Ok::<_, String>(42) })
        .await;
    assert_eq!(value, Some(42));
    assert!(engine.errors().is_empty());
}

#[tokio::test]
async fn test_wrap_logs_labelled_failure() {
    let mut engine = setup_engine();
    let value: Option<u8> = engine
        .wrap("loadNextPuzzle", || async { Err::<u8, _>("deck empty") })
        .await;
    assert!(value.is_none());
    assert_eq!(engine.errors()[0].kind, "Error in loadNextPuzzle");
    assert_eq!(engine.errors()[0].message, "deck empty");
}
