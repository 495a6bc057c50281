//! The categorised behaviour suite.
//!
//! Checks share one host and run in order, so later checks see the state
//! earlier ones left behind.

use super::check::{Category, Suite, SuiteKind};
use super::outcome::Verdict;
use super::support::{settle, wait_until, with_substitute};
use crate::games::chessblitz::{
    FeedbackLog, GameHost, MoveOutcome, PowerKind, Puzzle, PuzzleDeck, RatingTier, START_FEN, Side,
    globals, ids, selectors, start_position_puzzle,
};
use crate::session::SessionId;
use crate::validation::FeedbackSink;
use anyhow::Context;
use futures::FutureExt;
use serde_json::{Value, json};

const BLACK_TO_MOVE_FEN: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";

/// Name of the structured suite.
pub const STRUCTURED_SUITE: &str = "Chess Blitz Arena";

/// Builds the full structured suite.
pub fn structured_suite<H: GameHost + 'static>() -> Suite<H> {
    Suite::<H>::new(STRUCTURED_SUITE, SuiteKind::Structured)
        .category(assessment_flow())
        .category(puzzle_solving())
        .category(power_ups())
        .category(level_progression())
        .category(rating_system())
        .category(streak_tracking())
        .category(timer_system())
        .category(storage_persistence())
        .category(error_handling())
        .category(board_orientation())
        .category(move_validation())
        .category(ai_engine())
        .category(edge_cases())
}

fn black_to_move_puzzle() -> Puzzle {
    Puzzle {
        id: "black-to-move".to_string(),
        fen: BLACK_TO_MOVE_FEN.to_string(),
        solution: vec!["e7e5".to_string()],
        to_move: Side::Black,
        ..start_position_puzzle()
    }
}

fn first_solution_move<H: GameHost>(host: &H) -> anyhow::Result<String> {
    host.state()
        .current_puzzle
        .as_ref()
        .and_then(|p| p.first_move())
        .map(String::from)
        .context("no puzzle loaded")
}

// Assessment flow

fn assessment_flow<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("Assessment Flow")
        .boolean("Assessment modal appears on first load", |h| {
            async move { Ok(h.count(selectors::MODAL_OVERLAY) > 0) }.boxed_local()
        })
        .boolean("START ASSESSMENT button exists and clickable", |h| {
            async move {
                Ok(h.element(ids::START_ASSESSMENT)
                    .is_some_and(|button| button.visible && button.enabled))
            }
            .boxed_local()
        })
        .boolean("Assessment progress shows 10 dots", |h| {
            async move { Ok(h.count(selectors::PROGRESS_DOT) == 10) }.boxed_local()
        })
        .boolean("Assessment state initialized correctly", |h| {
            async move { Ok(!h.state().in_assessment && h.state().assessment_puzzle == 0) }
                .boxed_local()
        })
        .boolean("Starting assessment sets correct state", |h| {
            async move {
                h.start_assessment();
                Ok(h.state().in_assessment)
            }
            .boxed_local()
        })
        .boolean("Assessment loads progressive difficulty", |h| {
            assessment_loads_progressive_difficulty(h).boxed_local()
        })
        .boolean("Assessment completes after 10 puzzles", |h| {
            async move {
                let state = h.state_mut();
                state.in_assessment = true;
                state.assessment_puzzle = 10;
                state.assessment_results = vec![true; 10];
                let before = h.state().in_assessment;
                h.complete_assessment();
                Ok(before && !h.state().in_assessment)
            }
            .boxed_local()
        })
        .verdict("Assessment calculates rating correctly", |h| {
            async move {
                let results = vec![true, true, true, false, true, true, false, true, true, true];
                let correct = results.iter().filter(|r| **r).count() as i64;
                let wrong = results.len() as i64 - correct;
                let expected = 800 + correct * 80 - wrong * 30;
                h.state_mut().assessment_results = results;
                let calculated = h.calculate_assessment_rating();
                Ok(Verdict::from((calculated - expected).abs() < 10)
                    .details(json!({ "expected": expected, "calculated": calculated })))
            }
            .boxed_local()
        })
}

async fn assessment_loads_progressive_difficulty<H: GameHost>(host: &mut H) -> anyhow::Result<bool> {
    let mut difficulties = Vec::new();
    for step in 1..=10 {
        host.state_mut().assessment_puzzle = step;
        host.load_assessment_puzzle();
        if let Some(puzzle) = &host.state().current_puzzle {
            difficulties.push(puzzle.rating as f64);
        }
    }
    anyhow::ensure!(difficulties.len() >= 2, "only {} assessment puzzles loaded", difficulties.len());
    let (first, last) = difficulties.split_at(difficulties.len() / 2);
    let mean = |xs: &[f64]| xs.iter().sum::<f64>() / xs.len() as f64;
    Ok(mean(last) >= mean(first))
}

// Puzzle solving

fn puzzle_solving<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("Puzzle Solving")
        .boolean("Puzzle loads with valid FEN", |h| {
            async move {
                h.load_next_puzzle();
                Ok(h.state()
                    .current_puzzle
                    .as_ref()
                    .is_some_and(|p| p.fen.len() > 10))
            }
            .boxed_local()
        })
        .boolean("Correct move triggers success", |h| correct_move_triggers_success(h).boxed_local())
        .boolean("Wrong move triggers failure", |h| {
            async move {
                h.load_next_puzzle();
                h.check_move("a1a1", 0, 0);
                Ok(h.state().streak == 0)
            }
            .boxed_local()
        })
        .boolean("Illegal move is rejected", |h| {
            async move {
                h.load_next_puzzle();
                let streak = h.state().streak;
                let outcome = h.check_move("z9z9", 0, 0);
                Ok(matches!(outcome, MoveOutcome::Rejected(_)) && h.state().streak == streak)
            }
            .boxed_local()
        })
        .boolean("Chess.js validates moves correctly", |h| {
            async move {
                h.state_mut().current_puzzle = Some(start_position_puzzle());
                anyhow::ensure!(h.initialize_chess_instance(), "start position rejected");
                Ok(h.probe_move("e2e4") && !h.probe_move("e2e9"))
            }
            .boxed_local()
        })
        .boolean("Puzzle advances after correct answer", |h| {
            puzzle_advances_after_correct_answer(h).boxed_local()
        })
}

async fn correct_move_triggers_success<H: GameHost>(host: &mut H) -> anyhow::Result<bool> {
    host.load_next_puzzle();
    let correct = first_solution_move(host)?;
    let streak = host.state().streak;
    let xp = host.state().xp;
    host.check_move(&correct, 0, 0);
    Ok(host.state().streak == streak + 1 && host.state().xp > xp)
}

async fn puzzle_advances_after_correct_answer<H: GameHost>(host: &mut H) -> anyhow::Result<bool> {
    let before = host.puzzles_loaded();
    host.handle_correct_answer();
    let timing = host.config().timing();
    let (poll, wait) = (timing.poll_interval_delay(), timing.advance_wait_delay());
    Ok(wait_until(host, poll, wait, |h| h.puzzles_loaded() > before).await)
}

// Power-ups

fn power_ups<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("Power-Ups")
        .boolean("Hint power-up exists and has count", |h| {
            async move { Ok(h.state().powers.hint >= 0) }.boxed_local()
        })
        .boolean("Using hint decrements count", |h| {
            async move {
                let before = h.state().powers.hint;
                if before <= 0 {
                    return Ok(true);
                }
                h.use_power(PowerKind::Hint);
                Ok(h.state().powers.hint == before - 1)
            }
            .boxed_local()
        })
        .boolean("Hint shows puzzle solution info", |h| hint_shows_solution_info(h).boxed_local())
        .boolean("Freeze timer power-up works", |h| {
            async move {
                h.state_mut().powers.freeze = 5;
                h.state_mut().timer_frozen = false;
                h.use_power(PowerKind::Freeze);
                Ok(h.state().timer_frozen)
            }
            .boxed_local()
        })
        .boolean("Skip power-up loads next puzzle", |h| skip_loads_next_puzzle(h).boxed_local())
        .boolean("Double XP power-up multiplies XP", |h| {
            async move {
                h.state_mut().powers.double = 5;
                h.state_mut().double_xp_active = false;
                h.use_power(PowerKind::Double);
                Ok(h.state().double_xp_active)
            }
            .boxed_local()
        })
        .boolean("Power-ups cannot be used with 0 count", |h| {
            async move {
                h.state_mut().powers.hint = 0;
                let before = h.state().powers;
                let used = h.use_power(PowerKind::Hint);
                Ok(!used && h.state().powers == before)
            }
            .boxed_local()
        })
}

async fn hint_shows_solution_info<H: GameHost>(host: &mut H) -> anyhow::Result<bool> {
    host.load_next_puzzle();
    host.state_mut().powers.hint = 5;
    let instruction = |h: &H| h.element(ids::PUZZLE_INSTRUCTION).map(|e| e.text);
    let before = instruction(&*host).context("instruction element missing")?;
    host.show_hint().await;
    let after = instruction(&*host).context("instruction element missing")?;
    Ok(after != before && after.contains("Hint"))
}

async fn skip_loads_next_puzzle<H: GameHost>(host: &mut H) -> anyhow::Result<bool> {
    host.state_mut().powers.skip = 5;
    let before = host.puzzles_loaded();
    host.use_power(PowerKind::Skip);
    let wait = host.config().timing().short_settle_delay();
    settle(host, wait).await;
    Ok(host.puzzles_loaded() != before)
}

// Level progression

fn level_progression<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("Level Progression")
        .boolean("XP increases on correct answer", |h| {
            async move {
                let before = h.state().xp;
                h.add_xp(25);
                Ok(h.state().xp == before + 25)
            }
            .boxed_local()
        })
        .boolean("Level up triggers at XP threshold", |h| {
            async move {
                let level = h.state().level;
                let threshold = h.state().xp_to_level;
                h.state_mut().xp = threshold - 1;
                h.add_xp(10);
                Ok(h.state().level == level + 1)
            }
            .boxed_local()
        })
        .boolean("XP to level increases after level up", |h| {
            async move {
                let threshold = h.state().xp_to_level;
                h.state_mut().xp = threshold;
                h.add_xp(1);
                Ok(h.state().xp_to_level > threshold)
            }
            .boxed_local()
        })
        .boolean("Level up grants rewards", |h| {
            async move {
                let coins = h.state().coins;
                let hints = h.state().powers.hint;
                let threshold = h.state().xp_to_level;
                h.state_mut().xp = threshold;
                h.add_xp(1);
                Ok(h.state().coins > coins && h.state().powers.hint > hints)
            }
            .boxed_local()
        })
        .boolean("Level displays correctly", |h| {
            async move {
                h.state_mut().level = 42;
                h.update_all_displays();
                Ok(h.element(ids::LEVEL_BADGE).is_some_and(|badge| badge.text.contains("42")))
            }
            .boxed_local()
        })
}

// Rating

fn rating_system<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("Rating System")
        .boolean("Rating increases on correct answer", |h| {
            async move {
                let before = h.state().rating;
                let gain = h.calculate_rating_gain();
                h.state_mut().rating += gain;
                Ok(h.state().rating > before)
            }
            .boxed_local()
        })
        .boolean("Rating decreases on wrong answer", |h| {
            async move {
                h.state_mut().rating = 1000;
                h.handle_wrong_answer();
                Ok(h.state().rating < 1000)
            }
            .boxed_local()
        })
        .verdict("Rating gain scales with puzzle difficulty", |h| {
            async move {
                h.state_mut().rating = 1000;
                let base = h
                    .state()
                    .current_puzzle
                    .clone()
                    .unwrap_or_else(start_position_puzzle);
                h.state_mut().current_puzzle = Some(Puzzle { rating: 800, ..base.clone() });
                let easy = h.calculate_rating_gain();
                h.state_mut().current_puzzle = Some(Puzzle { rating: 1300, ..base });
                let hard = h.calculate_rating_gain();
                Ok(Verdict::from(hard > easy).details(json!({ "easy": easy, "hard": hard })))
            }
            .boxed_local()
        })
        .boolean("Rating never goes below 100", |h| {
            async move {
                h.state_mut().rating = 150;
                for _ in 0..10 {
                    h.handle_wrong_answer();
                }
                Ok(h.state().rating >= 100)
            }
            .boxed_local()
        })
        .boolean("Rating tier calculated correctly", |h| {
            async move {
                h.state_mut().rating = 1200;
                Ok(h.rating_tier() == RatingTier::Intermediate && !h.rating_tier().name().is_empty())
            }
            .boxed_local()
        })
}

// Streaks

fn streak_tracking<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("Streak Tracking")
        .boolean("Streak increases on correct answer", |h| {
            async move {
                h.state_mut().streak = 3;
                h.handle_correct_answer();
                Ok(h.state().streak == 4)
            }
            .boxed_local()
        })
        .boolean("Streak resets on wrong answer", |h| {
            async move {
                h.state_mut().streak = 5;
                h.handle_wrong_answer();
                Ok(h.state().streak == 0)
            }
            .boxed_local()
        })
        .boolean("Best streak updates correctly", |h| {
            async move {
                h.state_mut().streak = 10;
                h.state_mut().best_streak = 8;
                h.handle_correct_answer();
                Ok(h.state().best_streak == 11)
            }
            .boxed_local()
        })
        .boolean("Streak bonus activates at milestone", |h| {
            async move {
                h.state_mut().streak = 2;
                h.handle_correct_answer();
                Ok(h.state().streak == 3)
            }
            .boxed_local()
        })
        .boolean("Streak displays with fire emoji", |h| {
            async move {
                h.state_mut().streak = 5;
                h.update_all_displays();
                Ok(h.element(ids::STREAK_COUNT)
                    .and_then(|e| e.text.trim().parse::<i64>().ok())
                    == Some(5))
            }
            .boxed_local()
        })
}

// Timer

fn timer_system<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("Timer System")
        .boolean("Timer starts at 30 seconds", |h| {
            async move {
                h.start_timer();
                Ok(h.state().timer == i64::from(*h.config().game().turn_seconds()))
            }
            .boxed_local()
        })
        .boolean("Timer counts down", |h| timer_counts_down(h).boxed_local())
        .boolean("Timer freeze stops countdown", |h| timer_freeze_stops_countdown(h).boxed_local())
        .boolean("Timer expiry triggers wrong answer", |h| timer_expiry_is_wrong_answer(h).boxed_local())
        .boolean("Timer warning activates at 10 seconds", |h| {
            async move {
                h.state_mut().timer = 10;
                let display = h.update_timer_display();
                let styled = h.element(ids::TIMER).is_some_and(|e| e.has_class("warning"));
                Ok(display.warning && styled)
            }
            .boxed_local()
        })
}

async fn timer_counts_down<H: GameHost>(host: &mut H) -> anyhow::Result<bool> {
    host.start_timer();
    let start = host.state().timer;
    let wait = host.config().timing().timer_wait_delay();
    settle(host, wait).await;
    Ok(host.state().timer < start)
}

async fn timer_freeze_stops_countdown<H: GameHost>(host: &mut H) -> anyhow::Result<bool> {
    host.start_timer();
    let probe = host.config().timing().freeze_probe_delay();
    settle(host, probe).await;
    host.state_mut().timer_frozen = true;
    let frozen_at = host.state().timer;
    let wait = host.config().timing().timer_wait_delay();
    settle(host, wait).await;
    Ok(host.state().timer == frozen_at)
}

async fn timer_expiry_is_wrong_answer<H: GameHost>(host: &mut H) -> anyhow::Result<bool> {
    host.start_timer();
    host.state_mut().timer = 1;
    let wait = host.config().timing().timer_wait_delay();
    settle(host, wait).await;
    Ok(host.state().streak == 0)
}

// Persistence

fn storage_persistence<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("Storage Persistence")
        .boolean("Game state saves to localStorage", |h| {
            async move {
                h.state_mut().coins = 12345;
                h.save_game_state();
                let saved = stored_game_state(h)?;
                Ok(saved.get("coins").and_then(Value::as_i64) == Some(12345))
            }
            .boxed_local()
        })
        .boolean("Game state loads from localStorage", |h| {
            async move {
                let key = h.config().storage().game_state_key().clone();
                let snapshot = json!({ "coins": 99999, "level": 50, "rating": 2000 });
                h.diagnostics()
                    .storage_mut()
                    .set_item(&key, &snapshot.to_string())?;
                h.load_game_state();
                Ok(h.state().coins == 99999 && h.state().level == 50)
            }
            .boxed_local()
        })
        .boolean("Auto-save triggers after puzzle", |h| {
            async move {
                let key = h.config().storage().game_state_key().clone();
                h.diagnostics().storage_mut().remove_item(&key)?;
                h.handle_correct_answer();
                Ok(h.diagnostics().storage().get_item(&key)?.is_some())
            }
            .boxed_local()
        })
        .boolean("Session logs persist to localStorage", |h| {
            async move {
                let namespace = h.config().storage().namespace().clone();
                let key = SessionId::generate().log_key(&namespace);
                let entry = json!([{ "action": "test_action", "test": true }]);
                let engine = h.diagnostics();
                anyhow::ensure!(engine.safe_local_storage_set(&key, &entry), "session log not written");
                let logs: Vec<Value> = engine.safe_local_storage_get(&key, Vec::new());
                Ok(!logs.is_empty())
            }
            .boxed_local()
        })
}

fn stored_game_state<H: GameHost>(host: &mut H) -> anyhow::Result<Value> {
    let key = host.config().storage().game_state_key().clone();
    let raw = host
        .diagnostics()
        .storage()
        .get_item(&key)?
        .context("no saved game state")?;
    Ok(serde_json::from_str(&raw)?)
}

// Error handling

fn error_handling<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("Error Handling")
        .boolean("Invalid FEN handled gracefully", |h| {
            async move {
                h.state_mut().current_puzzle = Some(Puzzle {
                    fen: "INVALID_FEN".to_string(),
                    ..start_position_puzzle()
                });
                Ok(!h.initialize_chess_instance())
            }
            .boxed_local()
        })
        .boolean("Missing puzzle data handled", |h| {
            async move {
                h.state_mut().current_puzzle = None;
                let view = h.render_board();
                Ok(view.squares.len() == 64)
            }
            .boxed_local()
        })
        .boolean("AI engine failure handled", |h| {
            async move {
                with_substitute(
                    h,
                    None,
                    |host: &mut H, engine| host.replace_ai_engine(engine),
                    |host| {
                        async move {
                            host.show_hint().await;
                            Ok(true)
                        }
                        .boxed_local()
                    },
                )
                .await
            }
            .boxed_local()
        })
        .boolean("LocalStorage full handled", |h| {
            async move {
                let large = "x".repeat(1_000_000);
                let engine = h.diagnostics();
                let written = engine.safe_local_storage_set("chessBlitzLargeData", &large);
                let stored = engine.storage().get_item("chessBlitzLargeData")?.is_some();
                engine.storage_mut().remove_item("chessBlitzLargeData")?;
                Ok(written == stored)
            }
            .boxed_local()
        })
        .boolean("Console errors logged", |h| console_errors_logged(h).boxed_local())
}

async fn console_errors_logged<H: GameHost + 'static>(host: &mut H) -> anyhow::Result<bool> {
    let capture = FeedbackLog::new();
    let sink = capture.clone();
    with_substitute(
        host,
        Some(Box::new(sink) as Box<dyn FeedbackSink>),
        |h: &mut H, sink| h.diagnostics().replace_feedback(sink),
        |h| {
            async move {
                h.diagnostics()
                    .log_error("Console Error", "Failed to fetch test resource", json!({}));
                Ok(())
            }
            .boxed_local()
        },
    )
    .await?;
    Ok(!capture.entries().is_empty())
}

// Board orientation

fn board_orientation<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("Board Orientation")
        .boolean("Board renders 64 squares", |h| {
            async move {
                h.render_board();
                Ok(h.count(selectors::SQUARE) == 64)
            }
            .boxed_local()
        })
        .boolean("White to move shows white at bottom", |h| {
            async move {
                h.state_mut().current_puzzle = Some(start_position_puzzle());
                let view = h.render_board();
                let corner = view.bottom_right().context("board has no squares")?;
                Ok(corner.square.to_string() == "h1" && corner.piece_side == Some(Side::White))
            }
            .boxed_local()
        })
        .boolean("Black to move shows black at bottom", |h| {
            async move {
                h.state_mut().current_puzzle = Some(black_to_move_puzzle());
                let view = h.render_board();
                let corner = view.bottom_right().context("board has no squares")?;
                Ok(view.orientation == Side::Black
                    && corner.square.to_string() == "a8"
                    && corner.piece_side == Some(Side::Black))
            }
            .boxed_local()
        })
        .boolean("Piece colors distinguishable", |h| {
            async move {
                h.render_board();
                Ok(h.count(selectors::WHITE_PIECE) > 0 && h.count(selectors::BLACK_PIECE) > 0)
            }
            .boxed_local()
        })
}

// Move validation

fn move_validation<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("Move Validation")
        .boolean("Legal move validation works", |h| {
            async move {
                h.state_mut().current_puzzle = Some(start_position_puzzle());
                h.initialize_chess_instance();
                Ok(!h.legal_moves(6, 4).is_empty())
            }
            .boxed_local()
        })
        .boolean("Selecting wrong color rejected", |h| {
            async move {
                h.state_mut().current_puzzle = Some(start_position_puzzle());
                h.initialize_chess_instance();
                h.state_mut().selected_square = None;
                h.handle_square_click(0, 4);
                Ok(h.state().selected_square.is_none())
            }
            .boxed_local()
        })
        .boolean("Legal move highlighting works", |h| {
            async move {
                let view = h.render_board();
                let Some(piece) = view
                    .squares
                    .iter()
                    .find(|s| {
                        s.piece_side == Some(Side::White)
                            && !h.legal_moves(s.square.row(), s.square.col()).is_empty()
                    })
                else {
                    return Ok(true);
                };
                h.handle_square_hover(piece.square.row(), piece.square.col());
                Ok(h.count(selectors::LEGAL_MOVE) > 0)
            }
            .boxed_local()
        })
}

// AI engine

fn ai_engine<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("AI Engine")
        .verdict("AI engine initializes", |h| {
            async move {
                Ok(match (h.ai_engine(), h.has_global(globals::AI_ENGINE)) {
                    (Some(_), _) => Verdict::pass("AI engine available"),
                    (None, false) => Verdict::pass("AI engine not installed, skipped"),
                    (None, true) => Verdict::fail("AI engine declared but missing"),
                })
            }
            .boxed_local()
        })
        .boolean("AI engine ready check works", |h| {
            async move {
                if let Some(engine) = h.ai_engine() {
                    let _ready: bool = engine.is_ready().await;
                }
                Ok(true)
            }
            .boxed_local()
        })
        .boolean("AI analysis returns best move", |h| {
            async move {
                let Some(engine) = h.ai_engine() else {
                    return Ok(true);
                };
                let analysis = engine
                    .analyze_position(START_FEN)
                    .await?;
                Ok(!analysis.best_move.is_empty())
            }
            .boxed_local()
        })
}

// Edge cases

fn edge_cases<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("Edge Cases")
        .boolean("Rapid clicking does not break state", |h| {
            async move {
                for _ in 0..20 {
                    h.handle_square_click(0, 0);
                }
                Ok(true)
            }
            .boxed_local()
        })
        .boolean("Multiple power-up usage in sequence", |h| {
            async move {
                h.state_mut().powers.hint = 5;
                h.state_mut().powers.freeze = 5;
                h.use_power(PowerKind::Hint);
                h.use_power(PowerKind::Freeze);
                h.use_power(PowerKind::Hint);
                Ok(h.state().powers.hint == 3 && h.state().powers.freeze == 4)
            }
            .boxed_local()
        })
        .boolean("Switching puzzles rapidly", |h| {
            async move {
                for _ in 0..10 {
                    h.load_next_puzzle();
                }
                Ok(h.state().current_puzzle.is_some())
            }
            .boxed_local()
        })
        .boolean("Level overflow handled", |h| {
            async move {
                h.state_mut().level = 999;
                h.add_xp(1_000_000);
                let level = h.state().level;
                Ok(level > 999 && level < 10_000)
            }
            .boxed_local()
        })
        .boolean("Rating overflow handled", |h| {
            async move {
                h.state_mut().rating = 5000;
                Ok(h.rating_tier() == RatingTier::Grandmaster)
            }
            .boxed_local()
        })
        .boolean("Empty puzzle database handled", |h| {
            async move {
                with_substitute(
                    h,
                    PuzzleDeck::empty(),
                    |host: &mut H, deck| host.replace_puzzle_deck(deck),
                    |host| async move { Ok(!host.load_rated_puzzle()) }.boxed_local(),
                )
                .await
            }
            .boxed_local()
        })
}
