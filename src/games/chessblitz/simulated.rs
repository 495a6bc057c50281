//! Reference host: the arena's progression rules without a browser.

use super::ai::{AiEngine, BookEngine};
use super::board::{Board, PieceKind, START_FEN};
use super::deck::PuzzleDeck;
use super::host::{
    BoardView, ElementProbe, GameHost, HostSurface, HudSnapshot, MoveOutcome, SquareView,
    TimerDisplay, globals, ids, selectors,
};
use super::notation::{Promotion, Square, UciMove};
use super::types::{GameState, PowerKind, Puzzle, RatingTier, Side};
use crate::harness_config::HarnessConfig;
use crate::storage::LocalStorage;
use crate::validation::{FeedbackKind, FeedbackSink, ValidationEngine};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const MIN_RATING: i64 = 100;
const MAX_RATING: i64 = 5000;
const MAX_LEVEL: i64 = 10_000;
const MAX_POWER: i64 = 100;
const WRONG_ANSWER_PENALTY: i64 = 12;
const BASE_XP: i64 = 20;
const STREAK_BONUS_EVERY: i64 = 3;
const STREAK_BONUS_XP: i64 = 10;
const COINS_PER_SOLVE: i64 = 5;
const LEVEL_UP_COINS: i64 = 50;
const TICK: Duration = Duration::from_secs(1);

/// Shared record of everything shown through `showFeedback`.
#[derive(Debug, Clone, Default)]
pub struct FeedbackLog {
    entries: Rc<RefCell<Vec<(String, FeedbackKind)>>>,
}

impl FeedbackLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages shown so far, oldest first.
    pub fn entries(&self) -> Vec<(String, FeedbackKind)> {
        self.entries.borrow().clone()
    }

    /// Number of messages of `kind`.
    pub fn count(&self, kind: FeedbackKind) -> usize {
        self.entries.borrow().iter().filter(|(_, k)| *k == kind).count()
    }
}

impl FeedbackSink for FeedbackLog {
    fn show_feedback(&self, message: &str, kind: FeedbackKind) {
        debug!(message, kind = %kind, "Feedback shown");
        self.entries.borrow_mut().push((message.to_string(), kind));
    }
}

/// A position-only puzzle for the standard opening.
pub fn start_position_puzzle() -> Puzzle {
    Puzzle {
        id: "start-position".to_string(),
        title: "Opening".to_string(),
        fen: START_FEN.to_string(),
        solution: vec!["e2e4".to_string()],
        rating: 1200,
        to_move: Side::White,
        hint: None,
    }
}

/// In-process game host.
///
/// Progression rules:
/// - a correct answer extends the streak, earns XP (a bonus every third
///   streak step, doubled once by the double-XP power), rating and coins,
///   then schedules the next puzzle after the auto-advance delay;
/// - a wrong answer resets the streak and costs rating, never below 100;
/// - levelling up raises the next threshold by a fifth and awards coins
///   and a hint;
/// - the timer ticks once per elapsed second unless frozen, and expiry
///   counts as a wrong answer. Restarting the timer abandons a pending
///   auto-advance.
#[derive(Debug)]
pub struct SimulatedHost {
    config: HarnessConfig,
    state: GameState,
    engine: ValidationEngine,
    deck: PuzzleDeck,
    ai: Option<Rc<dyn AiEngine>>,
    chess: Option<Board>,
    chess_source: Option<String>,
    feedback: FeedbackLog,
    timer_running: bool,
    tick_carry: Duration,
    pending_advance: Option<Duration>,
    assessment_done: bool,
    rendered: Option<BoardView>,
    hover_targets: Vec<Square>,
    timer_view: Option<TimerDisplay>,
    hud: HudSnapshot,
    puzzles_loaded: u64,
}

impl SimulatedHost {
    /// Creates a host over in-memory storage, the standard deck and a
    /// book engine.
    #[instrument(skip(config))]
    pub fn new(config: HarnessConfig) -> Self {
        let engine = ValidationEngine::in_memory(&config);
        Self::with_engine(config, engine)
    }

    /// Creates a host over `storage`.
    #[instrument(skip(config, storage))]
    pub fn with_storage(config: HarnessConfig, storage: Box<dyn LocalStorage>) -> Self {
        let engine = ValidationEngine::new(&config, storage);
        Self::with_engine(config, engine)
    }

    fn with_engine(config: HarnessConfig, engine: ValidationEngine) -> Self {
        let feedback = FeedbackLog::new();
        let engine = engine.with_feedback(Box::new(feedback.clone()));
        let deck = PuzzleDeck::standard();
        let ai: Rc<dyn AiEngine> = Rc::new(BookEngine::from_deck(&deck));
        let state = GameState {
            timer: i64::from(*config.game().turn_seconds()),
            ..GameState::default()
        };
        info!(puzzles = deck.len(), "Simulated host ready");
        Self {
            config,
            state,
            engine,
            deck,
            ai: Some(ai),
            chess: None,
            chess_source: None,
            feedback,
            timer_running: false,
            tick_carry: Duration::ZERO,
            pending_advance: None,
            assessment_done: false,
            rendered: None,
            hover_targets: Vec::new(),
            timer_view: None,
            hud: HudSnapshot::default(),
            puzzles_loaded: 0,
        }
    }

    /// Removes the AI engine.
    pub fn without_ai(mut self) -> Self {
        self.ai = None;
        self
    }

    /// Uses `deck` instead of the standard puzzles.
    pub fn with_deck(mut self, deck: PuzzleDeck) -> Self {
        self.deck = deck;
        self
    }

    /// Feedback shown so far.
    pub fn feedback(&self) -> &FeedbackLog {
        &self.feedback
    }

    /// The validation engine, read-only.
    pub fn engine(&self) -> &ValidationEngine {
        &self.engine
    }

    /// Whether the turn timer is counting.
    pub fn timer_running(&self) -> bool {
        self.timer_running
    }

    #[instrument(skip(self, puzzle), fields(id = %puzzle.id))]
    fn set_current_puzzle(&mut self, puzzle: Puzzle) -> bool {
        let errors = self.engine.validate_puzzle_record(&puzzle);
        if !errors.is_empty() {
            self.engine
                .log_error("Invalid puzzle", errors.join("; "), json!({ "id": puzzle.id }));
            return false;
        }
        self.state.instruction = format!("{} to move - find the best move", puzzle.to_move);
        self.state.current_puzzle = Some(puzzle);
        self.state.selected_square = None;
        self.hover_targets.clear();
        self.puzzles_loaded += 1;
        self.initialize_chess_instance();
        true
    }

    fn sync_chess(&mut self) {
        let wanted = self.state.current_puzzle.as_ref().map(|p| p.fen.clone());
        if wanted.is_some() && wanted != self.chess_source {
            self.initialize_chess_instance();
        }
    }

    fn advance_assessment(&mut self) {
        let count = *self.config.assessment().puzzle_count();
        if self.state.assessment_results.len() >= count {
            self.complete_assessment();
        } else {
            self.state.assessment_puzzle += 1;
            self.load_assessment_puzzle();
        }
    }

    fn xp_for_correct_answer(&mut self) -> i64 {
        let mut gain = BASE_XP;
        if self.state.streak > 0 && self.state.streak % STREAK_BONUS_EVERY == 0 {
            gain += STREAK_BONUS_XP;
        }
        if self.state.double_xp_active {
            gain *= 2;
            self.state.double_xp_active = false;
        }
        gain
    }

    fn hint_text(&self, best_move: Option<&str>) -> String {
        match best_move.and_then(|mv| mv.parse::<UciMove>().ok()) {
            Some(mv) => format!("Hint: move the piece on {}", mv.from),
            None => "Hint: look for checks and captures".to_string(),
        }
    }

    fn timer_display(&self) -> TimerDisplay {
        let seconds = self.state.timer.max(0);
        TimerDisplay {
            seconds,
            text: format!("{}:{:02}", seconds / 60, seconds % 60),
            warning: seconds <= i64::from(*self.config.game().timer_warning_at()),
        }
    }

    fn modal_visible(&self) -> bool {
        !self.state.in_assessment && !self.assessment_done
    }

    fn rendered_count(&self, keep: impl Fn(&SquareView) -> bool) -> usize {
        self.rendered
            .as_ref()
            .map(|view| view.squares.iter().filter(|s| keep(s)).count())
            .unwrap_or(0)
    }
}

impl HostSurface for SimulatedHost {
    fn element(&self, id: &str) -> Option<ElementProbe> {
        let probe = |text: String, enabled: bool| ElementProbe {
            id: id.to_string(),
            text,
            visible: true,
            enabled,
            classes: Vec::new(),
        };
        let powers = &self.state.powers;
        match id {
            ids::CHESS_BOARD => Some(probe(String::new(), true)),
            ids::START_ASSESSMENT => Some(probe(
                "START ASSESSMENT".to_string(),
                !self.state.in_assessment,
            )),
            ids::POWER_HINT => Some(probe(format!("HINT {}", powers.hint), powers.hint > 0)),
            ids::HINT_COUNT => Some(probe(powers.hint.to_string(), true)),
            ids::POWER_FREEZE => Some(probe(format!("FREEZE {}", powers.freeze), powers.freeze > 0)),
            ids::TIMER => {
                let display = self.timer_view.clone().unwrap_or_else(|| self.timer_display());
                let mut element = probe(display.text, true);
                if display.warning {
                    element.classes.push("warning".to_string());
                }
                Some(element)
            }
            ids::PUZZLE_INSTRUCTION => Some(probe(self.state.instruction.clone(), true)),
            ids::LEVEL_BADGE => Some(probe(self.hud.level_badge.clone(), true)),
            ids::STREAK_COUNT => Some(probe(self.hud.streak_count.clone(), true)),
            _ => None,
        }
    }

    fn count(&self, selector: &str) -> usize {
        match selector {
            selectors::SQUARE | selectors::CLICKABLE => self.rendered_count(|_| true),
            selectors::WHITE_PIECE => self.rendered_count(|s| s.piece_side == Some(Side::White)),
            selectors::BLACK_PIECE => self.rendered_count(|s| s.piece_side == Some(Side::Black)),
            selectors::LEGAL_MOVE => self.rendered_count(|s| s.legal_target),
            selectors::PROGRESS_DOT => *self.config.assessment().puzzle_count(),
            selectors::MODAL_OVERLAY => usize::from(self.modal_visible()),
            _ => 0,
        }
    }

    fn has_global(&self, name: &str) -> bool {
        match name {
            globals::GAME_STATE
            | globals::ERROR_HANDLER
            | globals::DEBUG_CONSOLE
            | globals::CHESS_LIBRARY => true,
            globals::AI_ENGINE => self.ai.is_some(),
            _ => false,
        }
    }
}

#[async_trait(?Send)]
impl GameHost for SimulatedHost {
    fn config(&self) -> &HarnessConfig {
        &self.config
    }

    fn state(&self) -> &GameState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    fn diagnostics(&mut self) -> &mut ValidationEngine {
        &mut self.engine
    }

    #[instrument(skip(self))]
    fn check_move(&mut self, mv: &str, _row: u8, _col: u8) -> MoveOutcome {
        self.state.selected_square = None;
        let errors = self.engine.validate_move(Some(mv));
        if !errors.is_empty() {
            self.engine.log_warning(format!("Rejected move {}", mv), json!(errors));
            self.feedback.show_feedback("Invalid move", FeedbackKind::Error);
            return MoveOutcome::Rejected(errors);
        }
        let Some(expected) = self
            .state
            .current_puzzle
            .as_ref()
            .and_then(|p| p.first_move().map(String::from))
        else {
            return MoveOutcome::NoPuzzle;
        };
        if mv == expected {
            self.handle_correct_answer();
            MoveOutcome::Correct
        } else {
            self.handle_wrong_answer();
            MoveOutcome::Wrong
        }
    }

    #[instrument(skip(self))]
    fn use_power(&mut self, kind: PowerKind) -> bool {
        let count = self.state.powers.count_mut(kind);
        if *count <= 0 {
            self.feedback
                .show_feedback(&format!("No {} power-ups left", kind), FeedbackKind::Info);
            return false;
        }
        *count -= 1;
        match kind {
            PowerKind::Hint => {
                let first = self
                    .state
                    .current_puzzle
                    .as_ref()
                    .and_then(|p| p.first_move().map(String::from));
                self.state.instruction = self.hint_text(first.as_deref());
            }
            PowerKind::Freeze => self.state.timer_frozen = true,
            PowerKind::Skip => self.load_next_puzzle(),
            PowerKind::Double => self.state.double_xp_active = true,
        }
        debug!(power = %kind, "Power used");
        true
    }

    #[instrument(skip(self))]
    fn load_next_puzzle(&mut self) {
        self.pending_advance = None;
        match self.deck.next_puzzle() {
            Some(puzzle) => {
                if self.set_current_puzzle(puzzle) {
                    self.start_timer();
                }
            }
            None => self
                .engine
                .log_warning("No puzzles available", json!({ "deck": self.deck.len() })),
        }
    }

    #[instrument(skip(self))]
    fn load_assessment_puzzle(&mut self) {
        let count = *self.config.assessment().puzzle_count();
        match self.deck.assessment_puzzle(self.state.assessment_puzzle, count) {
            Some(puzzle) => {
                if self.set_current_puzzle(puzzle) {
                    self.start_timer();
                }
            }
            None => self.engine.log_warning(
                "No assessment puzzle available",
                json!({ "step": self.state.assessment_puzzle }),
            ),
        }
    }

    #[instrument(skip(self))]
    fn start_assessment(&mut self) {
        self.state.in_assessment = true;
        self.state.assessment_puzzle = 1;
        self.state.assessment_results.clear();
        self.assessment_done = false;
        self.load_assessment_puzzle();
    }

    #[instrument(skip(self))]
    fn complete_assessment(&mut self) -> i64 {
        let rating = self.calculate_assessment_rating().clamp(MIN_RATING, MAX_RATING);
        self.state.rating = rating;
        self.state.in_assessment = false;
        self.state.assessment_puzzle = 0;
        self.assessment_done = true;
        self.state.instruction = format!("Assessment complete: rating {}", rating);
        self.feedback
            .show_feedback(&self.state.instruction, FeedbackKind::Success);
        self.save_game_state();
        info!(rating, "Assessment complete");
        rating
    }

    fn calculate_assessment_rating(&self) -> i64 {
        let results = &self.state.assessment_results;
        let correct = results.iter().filter(|r| **r).count();
        self.config
            .assessment()
            .rating_for(correct, results.len() - correct)
    }

    #[instrument(skip(self))]
    fn add_xp(&mut self, amount: i64) {
        let state = &mut self.state;
        state.xp = state.xp.saturating_add(amount);
        while state.xp >= state.xp_to_level && state.level < MAX_LEVEL {
            state.xp -= state.xp_to_level;
            state.level += 1;
            state.xp_to_level += state.xp_to_level / 5;
            state.coins += LEVEL_UP_COINS;
            state.powers.hint = (state.powers.hint + 1).min(MAX_POWER);
        }
        debug!(level = state.level, xp = state.xp, "XP added");
    }

    #[instrument(skip(self))]
    fn handle_correct_answer(&mut self) {
        self.state.streak += 1;
        self.state.best_streak = self.state.best_streak.max(self.state.streak);
        let xp = self.xp_for_correct_answer();
        let gain = self.calculate_rating_gain();
        self.state.rating = (self.state.rating + gain).min(MAX_RATING);
        self.state.coins += COINS_PER_SOLVE;
        self.state.puzzles_solved += 1;
        self.add_xp(xp);
        self.timer_running = false;
        self.state.instruction = format!("Correct! +{} XP", xp);
        self.feedback
            .show_feedback(&self.state.instruction, FeedbackKind::Success);

        if self.state.in_assessment {
            self.state.assessment_results.push(true);
            self.advance_assessment();
        } else {
            self.pending_advance = Some(self.config.timing().auto_advance_delay());
        }
        self.save_game_state();
    }

    #[instrument(skip(self))]
    fn handle_wrong_answer(&mut self) {
        self.state.streak = 0;
        self.state.rating = (self.state.rating - WRONG_ANSWER_PENALTY).max(MIN_RATING);
        self.state.instruction = "Not quite - try again".to_string();
        self.feedback
            .show_feedback(&self.state.instruction, FeedbackKind::Error);
        if self.state.in_assessment {
            self.state.assessment_results.push(false);
            self.advance_assessment();
        }
        self.save_game_state();
    }

    fn calculate_rating_gain(&self) -> i64 {
        let puzzle_rating = self
            .state
            .current_puzzle
            .as_ref()
            .map(|p| p.rating)
            .unwrap_or(self.state.rating);
        (10 + (puzzle_rating - self.state.rating) / 50).clamp(1, 40)
    }

    fn rating_tier(&self) -> RatingTier {
        RatingTier::for_rating(self.state.rating)
    }

    #[instrument(skip(self))]
    fn start_timer(&mut self) {
        self.state.timer = i64::from(*self.config.game().turn_seconds());
        self.state.timer_frozen = false;
        self.timer_running = true;
        self.tick_carry = Duration::ZERO;
        self.pending_advance = None;
    }

    fn update_timer_display(&mut self) -> TimerDisplay {
        let display = self.timer_display();
        self.timer_view = Some(display.clone());
        display
    }

    #[instrument(skip(self))]
    fn render_board(&mut self) -> BoardView {
        self.sync_chess();
        let board = match (&self.state.current_puzzle, &self.chess) {
            (Some(_), Some(board)) => board.clone(),
            _ => Board::empty(),
        };
        let orientation = self
            .state
            .current_puzzle
            .as_ref()
            .map(|p| p.to_move)
            .unwrap_or(Side::White);
        let mut squares: Vec<SquareView> = Square::all()
            .map(|square| {
                let piece = board.piece_at(square);
                SquareView {
                    square,
                    piece: piece.map(|p| p.fen_char()),
                    piece_side: piece.map(|p| p.side),
                    selected: self.state.selected_square == Some(square),
                    legal_target: self.hover_targets.contains(&square),
                }
            })
            .collect();
        if orientation == Side::Black {
            squares.reverse();
        }
        let view = BoardView {
            orientation,
            squares,
        };
        self.rendered = Some(view.clone());
        view
    }

    fn update_all_displays(&mut self) -> HudSnapshot {
        self.hud = HudSnapshot {
            level_badge: format!("LVL {}", self.state.level),
            streak_count: self.state.streak.to_string(),
            rating: self.state.rating.to_string(),
            coins: self.state.coins.to_string(),
        };
        self.update_timer_display();
        self.hud.clone()
    }

    #[instrument(skip(self))]
    fn save_game_state(&mut self) -> bool {
        let key = self.config.storage().game_state_key().clone();
        self.engine.safe_local_storage_set(&key, &self.state)
    }

    #[instrument(skip(self))]
    fn load_game_state(&mut self) -> bool {
        let key = self.config.storage().game_state_key().clone();
        let stored: Value = self.engine.safe_local_storage_get(&key, Value::Null);
        let Value::Object(stored) = stored else {
            debug!("No saved game state");
            return false;
        };
        let mut merged = match serde_json::to_value(&self.state) {
            Ok(Value::Object(current)) => current,
            _ => return false,
        };
        merged.extend(stored);
        let merged = Value::Object(merged);

        let errors = self.engine.validate_game_state(Some(&merged));
        if !errors.is_empty() {
            warn!(?errors, "Loaded game state has problems");
            self.engine
                .log_warning("Loaded game state failed validation", json!(errors));
        }
        match serde_json::from_value::<GameState>(merged) {
            Ok(state) => {
                self.state = state;
                true
            }
            Err(e) => {
                self.engine
                    .log_error("Error reading from localStorage", e, json!({ "key": key }));
                false
            }
        }
    }

    #[instrument(skip(self))]
    fn initialize_chess_instance(&mut self) -> bool {
        let fen = self
            .state
            .current_puzzle
            .as_ref()
            .map(|p| p.fen.clone())
            .unwrap_or_else(|| START_FEN.to_string());
        self.chess_source = Some(fen.clone());
        match Board::from_fen(&fen) {
            Ok(board) => {
                self.chess = Some(board);
                true
            }
            Err(e) => {
                self.chess = None;
                self.engine.log_error(
                    "Error in initializeChessInstance",
                    &e.message,
                    json!({ "fen": fen }),
                );
                false
            }
        }
    }

    fn probe_move(&self, mv: &str) -> bool {
        match (&self.chess, mv.parse::<UciMove>()) {
            (Some(board), Ok(mv)) => board.clone().try_move(&mv),
            _ => false,
        }
    }

    fn legal_moves(&self, row: u8, col: u8) -> Vec<Square> {
        match (&self.chess, Square::new(row, col)) {
            (Some(board), Some(square)) => board.pseudo_legal_targets(square),
            _ => Vec::new(),
        }
    }

    #[instrument(skip(self))]
    fn handle_square_click(&mut self, row: u8, col: u8) {
        self.sync_chess();
        let (Some(board), Some(square)) = (self.chess.clone(), Square::new(row, col)) else {
            return;
        };
        if let Some(selected) = self.state.selected_square {
            if board.pseudo_legal_targets(selected).contains(&square) {
                let mut mv = UciMove::new(selected, square);
                let last_rank = match board.side_to_move() {
                    Side::White => 0,
                    Side::Black => 7,
                };
                let is_pawn = board
                    .piece_at(selected)
                    .is_some_and(|p| p.kind == PieceKind::Pawn);
                if is_pawn && square.row() == last_rank {
                    mv.promotion = Some(Promotion::Queen);
                }
                self.check_move(&mv.to_string(), row, col);
                return;
            }
        }
        let own_piece = board
            .piece_at(square)
            .is_some_and(|p| p.side == board.side_to_move());
        self.state.selected_square = own_piece.then_some(square);
    }

    fn handle_square_hover(&mut self, row: u8, col: u8) -> Vec<Square> {
        self.sync_chess();
        self.hover_targets = self.legal_moves(row, col);
        self.render_board();
        self.hover_targets.clone()
    }

    #[instrument(skip(self))]
    async fn show_hint(&mut self) -> String {
        let Some(puzzle) = self.state.current_puzzle.clone() else {
            self.state.instruction = "Hint: load a puzzle first".to_string();
            return self.state.instruction.clone();
        };
        if self.state.powers.hint <= 0 {
            self.feedback.show_feedback("No hints left", FeedbackKind::Info);
            return self.state.instruction.clone();
        }
        self.state.powers.hint -= 1;

        let mut best = None;
        if let Some(ai) = self.ai.clone() {
            if ai.is_ready().await {
                let fen = puzzle.fen.clone();
                best = self
                    .engine
                    .wrap("showHint", || async move { ai.analyze_position(&fen).await })
                    .await
                    .map(|analysis| analysis.best_move);
            }
        }
        let best = best.or_else(|| puzzle.first_move().map(String::from));
        self.state.instruction = self.hint_text(best.as_deref());
        self.state.instruction.clone()
    }

    fn ai_engine(&self) -> Option<Rc<dyn AiEngine>> {
        self.ai.clone()
    }

    fn replace_ai_engine(&mut self, engine: Option<Rc<dyn AiEngine>>) -> Option<Rc<dyn AiEngine>> {
        std::mem::replace(&mut self.ai, engine)
    }

    fn replace_puzzle_deck(&mut self, deck: PuzzleDeck) -> PuzzleDeck {
        std::mem::replace(&mut self.deck, deck)
    }

    #[instrument(skip(self))]
    fn load_rated_puzzle(&mut self) -> bool {
        match self.deck.nearest_rated(self.state.rating) {
            Some(puzzle) => {
                let loaded = self.set_current_puzzle(puzzle);
                if loaded {
                    self.start_timer();
                }
                loaded
            }
            None => {
                self.engine
                    .log_warning("Puzzle database is empty", json!({ "rating": self.state.rating }));
                false
            }
        }
    }

    fn puzzles_loaded(&self) -> u64 {
        self.puzzles_loaded
    }

    #[instrument(skip(self))]
    fn advance(&mut self, elapsed: Duration) {
        if let Some(remaining) = self.pending_advance {
            if elapsed >= remaining {
                self.pending_advance = None;
                debug!("Auto-advancing to next puzzle");
                self.load_next_puzzle();
                return;
            }
            self.pending_advance = Some(remaining - elapsed);
        }

        if !self.timer_running || self.state.timer_frozen {
            return;
        }
        self.tick_carry += elapsed;
        while self.tick_carry >= TICK {
            self.tick_carry -= TICK;
            self.state.timer -= 1;
            if self.state.timer <= 0 {
                self.state.timer = 0;
                self.timer_running = false;
                info!("Timer expired");
                self.handle_wrong_answer();
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> SimulatedHost {
        SimulatedHost::new(HarnessConfig::default())
    }

    #[test]
    fn test_correct_answer_progression() {
        let mut host = host();
        host.load_next_puzzle();
        let solution = host.state().current_puzzle.as_ref().and_then(|p| p.first_move().map(String::from));
        let outcome = host.check_move(&solution.expect("puzzle has a solution"), 0, 0);
        assert_eq!(outcome, MoveOutcome::Correct);
        assert_eq!(host.state().streak, 1);
        assert_eq!(host.state().xp, BASE_XP);
        assert_eq!(host.state().rating, 806);
    }

    #[test]
    fn test_rejected_move_changes_nothing() {
        let mut host = host();
        host.load_next_puzzle();
        host.state_mut().streak = 4;
        assert!(matches!(host.check_move("z9z9", 0, 0), MoveOutcome::Rejected(_)));
        assert_eq!(host.state().streak, 4);
    }

    #[test]
    fn test_timer_expiry_is_a_wrong_answer() {
        let mut host = host();
        host.load_next_puzzle();
        host.state_mut().streak = 3;
        host.state_mut().timer = 1;
        host.advance(Duration::from_millis(1100));
        assert_eq!(host.state().streak, 0);
        assert_eq!(host.state().timer, 0);
        assert!(!host.timer_running());
    }

    #[test]
    fn test_frozen_timer_holds() {
        let mut host = host();
        host.start_timer();
        host.state_mut().timer_frozen = true;
        host.advance(Duration::from_secs(5));
        assert_eq!(host.state().timer, 30);
    }

    #[test]
    fn test_auto_advance_after_delay() {
        let mut host = host();
        host.load_next_puzzle();
        let before = host.puzzles_loaded();
        host.handle_correct_answer();
        host.advance(Duration::from_millis(500));
        assert_eq!(host.puzzles_loaded(), before);
        host.advance(Duration::from_millis(600));
        assert_eq!(host.puzzles_loaded(), before + 1);
    }

    #[test]
    fn test_level_up_rewards() {
        let mut host = host();
        host.state_mut().xp = 99;
        host.add_xp(10);
        assert_eq!(host.state().level, 2);
        assert_eq!(host.state().xp, 9);
        assert_eq!(host.state().xp_to_level, 120);
        assert_eq!(host.state().coins, LEVEL_UP_COINS);
        assert_eq!(host.state().powers.hint, 4);
    }

    #[test]
    fn test_black_board_is_flipped() {
        let mut host = host();
        host.state_mut().current_puzzle = Some(Puzzle {
            fen: "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1".to_string(),
            to_move: Side::Black,
            solution: vec!["e7e5".to_string()],
            ..start_position_puzzle()
        });
        let view = host.render_board();
        let corner = view.bottom_right().expect("64 squares");
        assert_eq!(corner.square.to_string(), "a8");
        assert_eq!(corner.piece_side, Some(Side::Black));
    }

    #[tokio::test]
    async fn test_hint_without_ai_falls_back_to_solution() {
        let mut host = host().without_ai();
        host.load_next_puzzle();
        let text = host.show_hint().await;
        assert!(text.starts_with("Hint"));
        assert_eq!(host.state().powers.hint, 2);
    }
}
