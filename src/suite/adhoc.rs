//! The flat presence-probe suite.
//!
//! Probes the surface a page would expose: elements, globals and the
//! console. Missing optional pieces warn instead of failing.

use super::check::{Category, Suite, SuiteKind};
use super::outcome::Verdict;
use super::support::settle;
use crate::games::chessblitz::{GameHost, globals, ids, selectors};
use futures::FutureExt;
use serde_json::json;

/// Name of the ad-hoc suite.
pub const ADHOC_SUITE: &str = "Chess Blitz Smoke Test";

/// Builds the ad-hoc suite. Setup renders the board and displays once so
/// the probes see a populated page.
pub fn adhoc_suite<H: GameHost + 'static>() -> Suite<H> {
    Suite::<H>::new(ADHOC_SUITE, SuiteKind::AdHoc)
        .with_setup(|h| {
            async move {
                h.render_board();
                h.update_timer_display();
                h.update_all_displays();
                Ok(())
            }
            .boxed_local()
        })
        .category(basic_loading())
        .category(chess_board())
        .category(power_up_buttons())
        .category(debug_console())
        .category(console_errors())
        .category(dependencies())
        .category(interactive_elements())
        .category(ui_elements())
        .category(game_state())
}

fn present(found: bool, pass: &str, fail: Verdict) -> Verdict {
    if found { Verdict::pass(pass) } else { fail }
}

fn basic_loading<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("Basic Loading")
        .verdict("Site Loads", |h| {
            async move {
                Ok(present(
                    h.has_global(globals::GAME_STATE),
                    "Game page is loaded",
                    Verdict::fail("Game page not found"),
                ))
            }
            .boxed_local()
        })
        .verdict("Chess Board Element", |h| {
            async move {
                Ok(present(
                    h.element(ids::CHESS_BOARD).is_some(),
                    "Chess board container found",
                    Verdict::fail("Chess board container not found"),
                ))
            }
            .boxed_local()
        })
        .verdict("Start Button", |h| {
            async move {
                Ok(match h.element(ids::START_ASSESSMENT) {
                    Some(button) => Verdict::pass("START ASSESSMENT button found")
                        .details(json!({ "text": button.text })),
                    None => Verdict::fail("START ASSESSMENT button not found"),
                })
            }
            .boxed_local()
        })
}

fn chess_board<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("Chess Board")
        .verdict("Board Squares", |h| {
            async move {
                let squares = h.count(selectors::SQUARE);
                Ok(if squares > 0 {
                    Verdict::pass(format!("Found {} squares", squares))
                        .details(json!({ "expected": 64 }))
                } else {
                    Verdict::warn("No board squares found (assessment may not have started)")
                })
            }
            .boxed_local()
        })
        .verdict("Piece Colors", |h| {
            async move {
                let white = h.count(selectors::WHITE_PIECE);
                let black = h.count(selectors::BLACK_PIECE);
                Ok(match (white, black) {
                    (0, 0) => Verdict::warn("No pieces found (board might be empty before starting)"),
                    (w, b) if w > 0 && b > 0 => {
                        Verdict::pass(format!("White pieces: {}, Black pieces: {}", w, b))
                    }
                    (w, b) => Verdict::fail(format!("Unbalanced pieces - White: {}, Black: {}", w, b)),
                })
            }
            .boxed_local()
        })
}

fn power_up_buttons<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("Power-Ups")
        .verdict("Hint Button", |h| {
            async move {
                Ok(match h.element(ids::POWER_HINT) {
                    Some(_) => {
                        let count = h.element(ids::HINT_COUNT).map(|e| e.text);
                        Verdict::pass("Hint power-up button found").details(json!({ "count": count }))
                    }
                    None => Verdict::fail("Hint power-up button not found"),
                })
            }
            .boxed_local()
        })
        .verdict("Freeze Button", |h| {
            async move {
                Ok(present(
                    h.element(ids::POWER_FREEZE).is_some(),
                    "Freeze power-up button found",
                    Verdict::warn("Freeze power-up button not found"),
                ))
            }
            .boxed_local()
        })
}

fn debug_console<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("Debug Console")
        .verdict("Debug Console", |h| {
            async move {
                Ok(present(
                    h.has_global(globals::DEBUG_CONSOLE),
                    "Debug console is available",
                    Verdict::fail("Debug console not found"),
                ))
            }
            .boxed_local()
        })
        .verdict("Debug Logs", |h| {
            async move {
                let engine = h.diagnostics();
                let settings = engine.settings().clone();
                let logs = engine
                    .storage()
                    .keys()
                    .into_iter()
                    .filter(|key| settings.is_evictable(key))
                    .count();
                let persisted = engine.persisted_errors().len();
                Ok(Verdict::pass(format!("Retrieved {} log entries", logs + persisted)))
            }
            .boxed_local()
        })
        .verdict("Error Logs", |h| {
            async move {
                let report = h.diagnostics().error_report();
                Ok(if report.error_count > 0 {
                    Verdict::warn(format!("Found {} error(s)", report.error_count))
                        .details(json!({ "errors": report.errors }))
                } else {
                    Verdict::pass("No errors logged")
                })
            }
            .boxed_local()
        })
}

fn console_errors<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("Console Error Detection").verdict("Console Errors", |h| {
        async move {
            let before = h.diagnostics().errors().len();
            let window = h.config().timing().console_window_delay();
            settle(h, window).await;
            let captured: Vec<String> = h
                .diagnostics()
                .errors()
                .get(before..)
                .unwrap_or_default()
                .iter()
                .map(|record| record.message.clone())
                .collect();
            Ok(if captured.is_empty() {
                Verdict::pass("No console errors detected during test")
            } else {
                Verdict::warn(format!("{} console error(s) detected", captured.len()))
                    .details(json!({ "errors": captured }))
            })
        }
        .boxed_local()
    })
}

fn dependencies<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("External Dependencies")
        .verdict("Chess Library", |h| {
            async move {
                Ok(present(
                    h.has_global(globals::CHESS_LIBRARY),
                    "Move-generation library loaded",
                    Verdict::fail("Move-generation library not loaded"),
                ))
            }
            .boxed_local()
        })
        .verdict("AI Engine", |h| {
            async move {
                Ok(present(
                    h.has_global(globals::AI_ENGINE),
                    "AI engine loaded",
                    Verdict::warn("AI engine not loaded (AI hints may not work)"),
                ))
            }
            .boxed_local()
        })
}

fn interactive_elements<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("Interactive Elements").verdict("Piece Click Handlers", |h| {
        async move {
            Ok(present(
                h.count(selectors::SQUARE) > 0 && h.count(selectors::CLICKABLE) > 0,
                "Squares have click handlers",
                Verdict::warn("Could not verify click handlers (may need to start assessment)"),
            ))
        }
        .boxed_local()
    })
}

fn ui_elements<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("UI Elements")
        .verdict("Timer Element", |h| {
            async move {
                Ok(match h.element(ids::TIMER) {
                    Some(timer) => Verdict::pass("Timer found").details(json!({ "value": timer.text })),
                    None => Verdict::fail("Timer not found"),
                })
            }
            .boxed_local()
        })
        .verdict("Puzzle Instructions", |h| {
            async move {
                Ok(present(
                    h.element(ids::PUZZLE_INSTRUCTION).is_some(),
                    "Puzzle instruction element found",
                    Verdict::fail("Puzzle instruction element not found"),
                ))
            }
            .boxed_local()
        })
}

fn game_state<H: GameHost + 'static>() -> Category<H> {
    Category::<H>::new("Game State")
        .verdict("Game State", |h| {
            async move {
                if !h.has_global(globals::GAME_STATE) {
                    return Ok(Verdict::fail("Game state not found"));
                }
                let state = h.state();
                Ok(Verdict::pass("Game state exists").details(json!({
                    "rating": state.rating,
                    "level": state.level,
                    "coins": state.coins,
                })))
            }
            .boxed_local()
        })
        .verdict("Game State Validity", |h| {
            async move {
                let state = h.state().clone();
                let errors = h.diagnostics().validate_state(&state);
                Ok(if errors.is_empty() {
                    Verdict::pass("Game state passes validation")
                } else {
                    Verdict::fail(format!("{} validation error(s)", errors.len()))
                        .details(json!({ "errors": errors }))
                })
            }
            .boxed_local()
        })
}
