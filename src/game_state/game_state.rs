//! Game state machine.
//!
//! `GameState` owns the board of one game and is the only place it is
//! mutated. Every ply goes through `make_move` (or `redo`), which validates
//! turn and legality, applies the ply, updates the position encoder
//! incrementally and then runs end-of-game evaluation, move listeners and
//! search scheduling in that order. `single_ply_redo` takes the latest ply
//! back and queues it for `redo`.
//!
//! Callers serialize access; there is no internal locking. Search workers
//! only ever see `PositionSnapshot` values.

use std::cell::OnceCell;
use std::fmt;

use chrono::Duration;
use tracing::{debug, info, warn};

use crate::board::board::Board;
use crate::board::figure::{Color, FigureType};
use crate::board::position::Position;
use crate::board::setup::standard_board;
use crate::encoding::position_bitset::PositionBitset;
use crate::encoding::position_encoder::{PositionEncoder, PositionSnapshot};
use crate::errors::{invariant_violation, ChessErrors, ChessResult, IllegalMoveReason};
use crate::game_state::game_status::{GameClock, GameConfig, GameOutcome, GameStatus, Player};
use crate::game_state::undo_state::UndoState;
use crate::move_generation::legal_move_apply::{apply_player_move, revert_player_move};
use crate::move_generation::legal_move_checks::is_in_check;
use crate::move_generation::legal_move_generator::LegalMoveGenerator;
use crate::move_generation::move_generator::{GenerationContext, MoveGenerator};
use crate::moves::move_history::MoveHistory;
use crate::moves::player_move::PlayerMove;
use crate::search::scheduler::{SearchHandle, SearchProposal, SearchRequest, SearchScheduler};
use crate::utils::algebraic::parse_coordinate_move;
use crate::utils::fen::{generate_fen, parse_fen, FenSetup};

/// Callback run after every committed ply with the status it produced.
pub type MoveListener = Box<dyn FnMut(&PlayerMove, GameStatus) + Send>;

pub struct GameState {
    config: GameConfig,
    board: Board,
    history: MoveHistory,
    undo_stack: Vec<UndoState>,
    side_to_move: Color,
    status: GameStatus,
    round: u16,
    halfmove_clock: u16,
    /// Double-step column given by the setup; applies while no ply exists.
    setup_en_passant: Option<u8>,
    // [color]
    legal_moves: [OnceCell<Vec<PlayerMove>>; 2],
    redo_queue: Vec<PlayerMove>,
    encoder: PositionEncoder,
    clock: GameClock,
    move_made: bool,
    listeners: Vec<MoveListener>,
    scheduler: Option<Box<dyn SearchScheduler>>,
    pending_search: Option<Box<dyn SearchHandle>>,
}

impl GameState {
    /// Fresh game from the standard layout with two human players.
    pub fn new_game() -> Self {
        Self::with_config(GameConfig::default())
    }

    pub fn with_config(config: GameConfig) -> Self {
        let setup = FenSetup {
            board: standard_board(),
            side_to_move: Color::White,
            en_passant_column: None,
            halfmove_clock: 0,
            round: 1,
        };
        Self::from_setup(setup, config)
    }

    pub fn from_fen(fen: &str) -> ChessResult<Self> {
        Self::from_fen_with_config(fen, GameConfig::default())
    }

    pub fn from_fen_with_config(fen: &str, config: GameConfig) -> ChessResult<Self> {
        Ok(Self::from_setup(parse_fen(fen)?, config))
    }

    /// Rebuild a position from an encoder snapshot. Used by search workers,
    /// which never see the live board.
    pub fn from_snapshot(snapshot: &PositionSnapshot) -> Self {
        let bitset = &snapshot.bitset;
        let mut board = Board::new_empty();
        for position in Position::all_squares() {
            let Some(index) = position.index() else {
                continue;
            };
            if let Some((color, figure_type)) = bitset.figure_at(index) {
                board.spawn(figure_type, color, position);
            }
        }
        board.apply_castling_rights(bitset.castling_rights());

        let setup = FenSetup {
            board,
            side_to_move: bitset.side_to_move(),
            en_passant_column: bitset.en_passant_column(),
            halfmove_clock: 0,
            round: 1,
        };
        Self::from_setup(
            setup,
            GameConfig {
                verify_invariants: false,
                ..GameConfig::default()
            },
        )
    }

    fn from_setup(setup: FenSetup, config: GameConfig) -> Self {
        let encoder = PositionEncoder::from_position(
            &setup.board,
            setup.side_to_move,
            setup.board.castling_rights(),
            setup.en_passant_column,
        );
        Self {
            config,
            board: setup.board,
            history: MoveHistory::new(),
            undo_stack: Vec::new(),
            side_to_move: setup.side_to_move,
            status: GameStatus::NotStarted,
            round: setup.round,
            halfmove_clock: setup.halfmove_clock,
            setup_en_passant: setup.en_passant_column,
            legal_moves: Default::default(),
            redo_queue: Vec::new(),
            encoder,
            clock: GameClock::default(),
            move_made: false,
            listeners: Vec::new(),
            scheduler: None,
            pending_search: None,
        }
    }

    /// Throwaway copy for look-ahead. Listeners, the scheduler and any
    /// pending search stay with the original.
    pub fn simulation(&self) -> Self {
        Self {
            config: self.config.clone(),
            board: self.board.clone(),
            history: self.history.clone(),
            undo_stack: self.undo_stack.clone(),
            side_to_move: self.side_to_move,
            status: self.status,
            round: self.round,
            halfmove_clock: self.halfmove_clock,
            setup_en_passant: self.setup_en_passant,
            legal_moves: self.legal_moves.clone(),
            redo_queue: self.redo_queue.clone(),
            encoder: self.encoder.clone(),
            clock: self.clock.clone(),
            move_made: false,
            listeners: Vec::new(),
            scheduler: None,
            pending_search: None,
        }
    }

    pub fn to_fen(&self) -> String {
        generate_fen(self)
    }

    // --- Accessors ---

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[inline]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    /// Side that lost, `None` while undecided or drawn.
    #[inline]
    pub fn loser(&self) -> Option<Color> {
        self.status.outcome().and_then(GameOutcome::loser)
    }

    /// Full-move number, starting at 1 and advancing after Black's ply.
    #[inline]
    pub fn round(&self) -> u16 {
        self.round
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u16 {
        self.halfmove_clock
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[inline]
    pub fn player(&self, color: Color) -> &Player {
        self.config.player(color)
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.encoder.hash()
    }

    #[inline]
    pub fn bitset(&self) -> &PositionBitset {
        self.encoder.bitset()
    }

    #[inline]
    pub fn snapshot(&self) -> PositionSnapshot {
        self.encoder.snapshot()
    }

    #[inline]
    pub fn redo_len(&self) -> usize {
        self.redo_queue.len()
    }

    /// Play time excluding pauses.
    pub fn elapsed(&self) -> Duration {
        self.clock.elapsed()
    }

    /// Whether a ply was committed or undone since the last call.
    pub fn take_move_made(&mut self) -> bool {
        std::mem::take(&mut self.move_made)
    }

    fn en_passant_column(&self) -> Option<u8> {
        if self.history.is_empty() {
            self.setup_en_passant
        } else {
            self.history.double_step_column(self.side_to_move.enemy())
        }
    }

    pub fn generation_context(&self) -> GenerationContext {
        GenerationContext::new(self.side_to_move, self.en_passant_column())
    }

    /// Legal moves of the side to move, computed once per position.
    pub fn legal_moves(&self) -> &[PlayerMove] {
        self.legal_moves_for(self.side_to_move)
    }

    /// Legal moves `color` would have in the current position. En passant
    /// only applies to the side to move.
    pub fn legal_moves_for(&self, color: Color) -> &[PlayerMove] {
        self.legal_moves[color.index()].get_or_init(|| {
            let en_passant_column = if color == self.side_to_move {
                self.en_passant_column()
            } else {
                None
            };
            LegalMoveGenerator.generate_legal_moves(&self.board, GenerationContext::new(color, en_passant_column))
        })
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        is_in_check(&self.board, color)
    }

    /// Resolve coordinate text such as `e2e4` or `e7e8q` against the legal moves.
    pub fn find_move(&self, text: &str) -> ChessResult<PlayerMove> {
        let wanted = parse_coordinate_move(text)?;
        self.legal_moves()
            .iter()
            .find(|mv| mv.origin() == wanted.from && mv.destination() == wanted.to && mv.promoted_to() == wanted.promotion)
            .copied()
            .ok_or(ChessErrors::IllegalMove(IllegalMoveReason::NotInLegalSet))
    }

    // --- Collaborators ---

    pub fn add_move_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&PlayerMove, GameStatus) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    pub fn set_search_scheduler(&mut self, scheduler: Box<dyn SearchScheduler>) {
        self.cancel_pending_search();
        self.scheduler = Some(scheduler);
    }

    // --- Lifecycle ---

    /// Start the clock. Evaluates the setup position and asks for a search if
    /// the first mover is a computer.
    pub fn start(&mut self) -> GameStatus {
        if self.status == GameStatus::NotStarted {
            self.begin();
            self.decide_end();
            self.request_search();
        }
        self.status
    }

    fn begin(&mut self) {
        self.status = GameStatus::Running;
        self.clock.start();
        info!(
            white = %self.config.white.name,
            black = %self.config.black.name,
            side_to_move = %self.side_to_move,
            "game started"
        );
    }

    pub fn pause(&mut self) -> GameStatus {
        if self.status == GameStatus::Running {
            self.cancel_pending_search();
            self.status = GameStatus::Paused;
            self.clock.pause();
            debug!("game paused");
        }
        self.status
    }

    pub fn resume(&mut self) -> GameStatus {
        if self.status == GameStatus::Paused {
            self.status = GameStatus::Running;
            self.clock.resume();
            debug!("game resumed");
            self.request_search();
        }
        self.status
    }

    /// Classify the position after a ply. With no legal moves left the side
    /// to move has lost when in check and the game is drawn otherwise.
    pub fn decide_end(&mut self) -> GameStatus {
        if self.status != GameStatus::Running || !self.legal_moves().is_empty() {
            return self.status;
        }
        let outcome = if self.is_in_check(self.side_to_move) {
            GameOutcome::Won {
                winner: self.side_to_move.enemy(),
            }
        } else {
            GameOutcome::Draw
        };
        self.finish(outcome);
        self.status
    }

    /// End the game by agreement or resignation.
    pub fn declare_result(&mut self, outcome: GameOutcome) -> ChessResult<()> {
        if self.status.is_finished() {
            return Err(ChessErrors::IllegalMove(IllegalMoveReason::GameFinished));
        }
        if self.status == GameStatus::NotStarted {
            self.begin();
        }
        self.finish(outcome);
        Ok(())
    }

    fn finish(&mut self, outcome: GameOutcome) {
        self.cancel_pending_search();
        self.status = GameStatus::Finished(outcome);
        self.clock.stop();
        info!(result = outcome.result_token(), plies = self.history.len(), "game finished");
    }

    // --- Plies ---

    fn validate(&self, player_move: &PlayerMove) -> ChessResult<()> {
        let reason = match self.status {
            GameStatus::Paused => Some(IllegalMoveReason::GameNotRunning),
            GameStatus::Finished(_) => Some(IllegalMoveReason::GameFinished),
            GameStatus::NotStarted | GameStatus::Running => {
                if player_move.color() != self.side_to_move {
                    Some(IllegalMoveReason::OutOfTurn {
                        expected: self.side_to_move,
                        attempted: player_move.color(),
                    })
                } else if !self.legal_moves().contains(player_move) {
                    Some(IllegalMoveReason::NotInLegalSet)
                } else {
                    None
                }
            }
        };
        match reason {
            Some(reason) => {
                warn!(%player_move, ?reason, "move rejected");
                Err(ChessErrors::IllegalMove(reason))
            }
            None => Ok(()),
        }
    }

    /// Play a ply for the side to move. A game that has not been started is
    /// started implicitly. On error the game is unchanged.
    pub fn make_move(&mut self, player_move: PlayerMove) -> ChessResult<GameStatus> {
        self.validate(&player_move)?;
        if self.status == GameStatus::NotStarted {
            self.begin();
        }
        self.cancel_pending_search();
        self.commit(player_move);
        self.redo_queue.clear();
        Ok(self.after_ply(&player_move))
    }

    /// Re-apply the most recently undone ply.
    pub fn redo(&mut self) -> ChessResult<GameStatus> {
        let player_move = *self.redo_queue.last().ok_or(ChessErrors::NothingToRedo)?;
        self.validate(&player_move)?;
        self.redo_queue.pop();
        if self.status == GameStatus::NotStarted {
            self.begin();
        }
        self.cancel_pending_search();
        self.commit(player_move);
        Ok(self.after_ply(&player_move))
    }

    /// Take back the latest ply. Cancels any in-flight search before touching
    /// the position and reopens a finished game.
    pub fn single_ply_redo(&mut self) -> ChessResult<PlayerMove> {
        let Some(undo) = self.undo_stack.pop() else {
            return Err(ChessErrors::NothingToUndo);
        };
        self.cancel_pending_search();
        let Some(player_move) = self.history.pop() else {
            invariant_violation("undo stack and move history disagree");
        };

        revert_player_move(&mut self.board, &player_move);
        self.encoder.update_backward(&player_move, &undo);
        self.side_to_move = player_move.color();
        self.round = undo.round_before;
        self.halfmove_clock = undo.halfmove_before;
        self.invalidate_legal_moves();
        self.move_made = true;
        self.redo_queue.push(player_move);

        if self.status.is_finished() {
            self.status = GameStatus::Running;
            self.clock.reopen();
            info!("game reopened by undo");
        }

        debug!(ply = self.history.len() + 1, %player_move, hash = self.encoder.hash(), "undid ply");
        self.verify_invariants();
        Ok(player_move)
    }

    fn commit(&mut self, player_move: PlayerMove) {
        let en_passant_before = self.en_passant_column();
        let castling_before = self.board.castling_rights();

        apply_player_move(&mut self.board, &player_move);

        let undo = UndoState {
            castling_before,
            castling_after: self.board.castling_rights(),
            en_passant_before,
            en_passant_after: if player_move.is_double_step() {
                player_move.main.from.column()
            } else {
                None
            },
            round_before: self.round,
            halfmove_before: self.halfmove_clock,
        };
        self.encoder.update_forward(&player_move, &undo);

        if player_move.is_strike || player_move.figure_type() == FigureType::Pawn {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }
        if self.side_to_move == Color::Black {
            self.round = self.round.saturating_add(1);
        }
        self.side_to_move = self.side_to_move.enemy();
        self.history.push(player_move);
        self.undo_stack.push(undo);
        self.invalidate_legal_moves();
        self.move_made = true;

        debug!(ply = self.history.len(), %player_move, hash = self.encoder.hash(), "committed ply");
        self.verify_invariants();
    }

    fn after_ply(&mut self, player_move: &PlayerMove) -> GameStatus {
        let status = self.decide_end();
        for listener in &mut self.listeners {
            listener(player_move, status);
        }
        self.request_search();
        status
    }

    #[inline]
    fn invalidate_legal_moves(&mut self) {
        self.legal_moves = Default::default();
    }

    fn verify_invariants(&self) {
        if !self.config.verify_invariants {
            return;
        }
        if let Some(report) = self.board.invariant_report(!self.status.is_finished()) {
            invariant_violation(report);
        }
    }

    // --- Search ---

    /// Schedule one search for the side to move when it is a computer player
    /// and the game is running. Returns whether a search was scheduled.
    pub fn request_search(&mut self) -> bool {
        if self.status != GameStatus::Running || !self.config.player(self.side_to_move).is_computer() {
            return false;
        }
        self.cancel_pending_search();
        let request = SearchRequest {
            color: self.side_to_move,
            snapshot: self.encoder.snapshot(),
            ply: self.history.len(),
        };
        let Some(scheduler) = self.scheduler.as_mut() else {
            return false;
        };
        debug!(color = %request.color, ply = request.ply, hash = request.snapshot.hash, "search scheduled");
        self.pending_search = Some(scheduler.schedule_search(request));
        true
    }

    #[inline]
    pub fn has_pending_search(&self) -> bool {
        self.pending_search.is_some()
    }

    fn cancel_pending_search(&mut self) {
        if let Some(mut handle) = self.pending_search.take() {
            if !handle.is_finished() {
                debug!(color = %handle.color(), "search cancelled");
            }
            handle.cancel();
        }
    }

    /// Play the move a search proposed, provided it was computed for the
    /// current position.
    pub fn apply_search_proposal(&mut self, proposal: SearchProposal) -> ChessResult<GameStatus> {
        if proposal.color != self.side_to_move || proposal.hash != self.encoder.hash() {
            warn!(
                color = %proposal.color,
                hash = proposal.hash,
                current = self.encoder.hash(),
                "stale search proposal"
            );
            return Err(ChessErrors::StaleSearchResult);
        }
        self.make_move(proposal.player_move)
    }
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameState")
            .field("fen", &self.to_fen())
            .field("status", &self.status)
            .field("plies", &self.history.len())
            .field("redo", &self.redo_queue.len())
            .field("hash", &format_args!("{:#018x}", self.encoder.hash()))
            .field("listeners", &self.listeners.len())
            .field("pending_search", &self.pending_search.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use rand::rngs::StdRng;
    use rand::seq::IndexedRandom;
    use rand::SeedableRng;

    use super::*;

    fn sq(text: &str) -> Position {
        crate::utils::algebraic::algebraic_to_position(text).expect("test square should parse")
    }

    fn play(game: &mut GameState, moves: &[&str]) {
        for text in moves {
            let mv = game.find_move(text).unwrap_or_else(|err| panic!("{text}: {err}"));
            game.make_move(mv).unwrap_or_else(|err| panic!("{text}: {err}"));
        }
    }

    fn figure_on(game: &GameState, square: &str) -> Option<(Color, FigureType)> {
        game.board()
            .figure_at(sq(square))
            .map(|figure| (figure.color, figure.figure_type))
    }

    #[test]
    fn initial_position_has_twenty_moves() {
        let game = GameState::new_game();
        assert_eq!(game.legal_moves().len(), 20);
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(game.status(), GameStatus::NotStarted);
    }

    #[test]
    fn turns_alternate_and_out_of_turn_is_rejected() {
        let mut game = GameState::new_game();
        let black_move = game.legal_moves_for(Color::Black)[0];
        let before = game.snapshot();

        let err = game.make_move(black_move).expect_err("black cannot open");
        assert_eq!(
            err,
            ChessErrors::IllegalMove(IllegalMoveReason::OutOfTurn {
                expected: Color::White,
                attempted: Color::Black,
            })
        );
        assert_eq!(game.snapshot(), before);
        assert_eq!(game.status(), GameStatus::NotStarted);

        play(&mut game, &["e2e4"]);
        assert_eq!(game.status(), GameStatus::Running);
        assert_eq!(game.side_to_move(), Color::Black);
        play(&mut game, &["e7e5"]);
        assert_eq!(game.side_to_move(), Color::White);
        assert_eq!(game.round(), 2);

        let colors: Vec<Color> = game.history().iter().map(PlayerMove::color).collect();
        assert_eq!(colors, vec![Color::White, Color::Black]);
    }

    #[test]
    fn move_outside_legal_set_is_rejected() {
        let mut game = GameState::new_game();
        let mut bogus = game.find_move("e2e4").expect("e2e4 is legal");
        bogus.main.to = sq("e5");
        assert_eq!(
            game.make_move(bogus),
            Err(ChessErrors::IllegalMove(IllegalMoveReason::NotInLegalSet))
        );
        assert!(game.history().is_empty());
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let mut game = GameState::new_game();
        play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5"]);

        let capture = game.find_move("e5d6").expect("en passant should be legal");
        assert!(capture.is_en_passant && capture.is_strike);
        game.make_move(capture).expect("en passant should apply");

        assert_eq!(figure_on(&game, "d6"), Some((Color::White, FigureType::Pawn)));
        assert_eq!(figure_on(&game, "d5"), None);
        assert_eq!(figure_on(&game, "e5"), None);
        assert_eq!(game.board().benched_of_type(Color::Black, FigureType::Pawn), 1);

        game.single_ply_redo().expect("undo should succeed");
        assert_eq!(figure_on(&game, "d5"), Some((Color::Black, FigureType::Pawn)));
        assert_eq!(figure_on(&game, "e5"), Some((Color::White, FigureType::Pawn)));
        assert_eq!(figure_on(&game, "d6"), None);
    }

    #[test]
    fn en_passant_expires_after_one_ply() {
        let mut game = GameState::new_game();
        play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5", "h2h3", "h7h6"]);
        assert!(game.find_move("e5d6").is_err());
    }

    #[test]
    fn kingside_castle_moves_king_and_rook() {
        let mut game = GameState::new_game();
        play(&mut game, &["e2e4", "e7e5", "g1f3", "b8c6", "f1c4", "f8c5"]);

        let castle = game.find_move("e1g1").expect("castling should be legal");
        assert!(castle.is_castling);
        game.make_move(castle).expect("castling should apply");
        assert_eq!(figure_on(&game, "g1"), Some((Color::White, FigureType::King)));
        assert_eq!(figure_on(&game, "f1"), Some((Color::White, FigureType::Rook)));
        assert_eq!(figure_on(&game, "e1"), None);
        assert_eq!(figure_on(&game, "h1"), None);

        game.single_ply_redo().expect("undo should succeed");
        assert_eq!(figure_on(&game, "e1"), Some((Color::White, FigureType::King)));
        assert_eq!(figure_on(&game, "h1"), Some((Color::White, FigureType::Rook)));
        assert_eq!(game.board().castling_rights() & 0b0011, 0b0011);
    }

    #[test]
    fn promotion_replaces_the_pawn_and_undo_restores_it() {
        let mut game = GameState::from_fen("8/P6k/8/8/8/8/8/4K3 w - - 0 1").expect("FEN should parse");
        let promotions: Vec<PlayerMove> = game.legal_moves().iter().filter(|mv| mv.is_promotion).copied().collect();
        assert_eq!(promotions.len(), 4);

        let queen = game.find_move("a7a8q").expect("queen promotion should be legal");
        game.make_move(queen).expect("promotion should apply");
        assert_eq!(figure_on(&game, "a8"), Some((Color::White, FigureType::Queen)));
        assert_eq!(figure_on(&game, "a7"), None);
        assert_eq!(game.board().promoted_count(Color::White), 1);

        game.single_ply_redo().expect("undo should succeed");
        assert_eq!(figure_on(&game, "a7"), Some((Color::White, FigureType::Pawn)));
        assert_eq!(figure_on(&game, "a8"), None);
        assert_eq!(game.board().promoted_count(Color::White), 0);
    }

    #[test]
    fn promotion_with_full_army_passes_invariant_checks() {
        let config = GameConfig {
            verify_invariants: true,
            ..GameConfig::default()
        };
        let mut game = GameState::from_fen_with_config("rnbqkbnr/pPpppppp/8/8/8/8/PP1PPPPP/RNBQKBNR w KQkq - 0 1", config)
            .expect("FEN should parse");
        assert_eq!(game.board().on_board_count(Color::White), 16);

        play(&mut game, &["b7a8q"]);
        assert_eq!(figure_on(&game, "a8"), Some((Color::White, FigureType::Queen)));
        assert_eq!(game.board().on_board_count(Color::White), 16);
        assert_eq!(game.board().promoted_count(Color::White), 1);
        assert_eq!(game.board().invariant_report(true), None);

        game.single_ply_redo().expect("undo should succeed");
        assert_eq!(figure_on(&game, "b7"), Some((Color::White, FigureType::Pawn)));
        assert_eq!(figure_on(&game, "a8"), Some((Color::Black, FigureType::Rook)));
    }

    #[test]
    fn undo_restores_captured_figure_and_snapshot() {
        let mut game = GameState::new_game();
        play(&mut game, &["e2e4", "d7d5"]);
        let before = game.snapshot();
        play(&mut game, &["e4d5"]);
        assert_eq!(game.board().bench_count(Color::Black), 1);

        let undone = game.single_ply_redo().expect("undo should succeed");
        assert!(undone.is_strike);
        assert_eq!(figure_on(&game, "d5"), Some((Color::Black, FigureType::Pawn)));
        assert_eq!(game.board().bench_count(Color::Black), 0);
        assert_eq!(game.snapshot(), before);
        assert_eq!(game.side_to_move(), Color::White);
    }

    #[test]
    fn undo_on_empty_history_fails() {
        let mut game = GameState::new_game();
        assert_eq!(game.single_ply_redo(), Err(ChessErrors::NothingToUndo));
        assert_eq!(game.redo(), Err(ChessErrors::NothingToRedo));
    }

    #[test]
    fn fools_mate_is_won_by_black() {
        let mut game = GameState::new_game();
        play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        assert_eq!(
            game.status(),
            GameStatus::Finished(GameOutcome::Won { winner: Color::Black })
        );
        assert_eq!(game.loser(), Some(Color::White));

        let any = game.legal_moves_for(Color::White).first().copied();
        assert!(any.is_none());

        game.single_ply_redo().expect("undo should reopen the game");
        assert_eq!(game.status(), GameStatus::Running);
        assert_eq!(game.loser(), None);
    }

    #[test]
    fn moves_after_the_end_are_rejected() {
        let mut game = GameState::new_game();
        play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
        let mut probe = GameState::new_game();
        let e4 = probe.find_move("e2e4").expect("legal");
        probe.declare_result(GameOutcome::Draw).expect("declaring should succeed");
        assert_eq!(
            probe.make_move(e4),
            Err(ChessErrors::IllegalMove(IllegalMoveReason::GameFinished))
        );
        assert_eq!(
            game.declare_result(GameOutcome::Draw),
            Err(ChessErrors::IllegalMove(IllegalMoveReason::GameFinished))
        );
    }

    #[test]
    fn stalemate_is_a_draw() {
        let mut game = GameState::from_fen("k7/8/8/2Q5/8/8/8/7K w - - 0 1").expect("FEN should parse");
        play(&mut game, &["c5c7"]);
        assert_eq!(game.status(), GameStatus::Finished(GameOutcome::Draw));
        assert_eq!(game.loser(), None);
    }

    #[test]
    fn redo_replays_in_original_order_and_new_move_clears_queue() {
        let mut game = GameState::new_game();
        play(&mut game, &["e2e4", "e7e5", "g1f3"]);
        let played: Vec<PlayerMove> = game.history().iter().copied().collect();

        game.single_ply_redo().expect("undo");
        game.single_ply_redo().expect("undo");
        assert_eq!(game.redo_len(), 2);
        game.redo().expect("redo");
        game.redo().expect("redo");
        assert_eq!(game.history().as_slice(), played.as_slice());
        assert_eq!(game.redo_len(), 0);

        game.single_ply_redo().expect("undo");
        play(&mut game, &["b1c3"]);
        assert_eq!(game.redo_len(), 0);
        assert_eq!(game.redo(), Err(ChessErrors::NothingToRedo));
    }

    #[test]
    fn paused_game_rejects_moves() {
        let mut game = GameState::new_game();
        assert_eq!(game.start(), GameStatus::Running);
        assert_eq!(game.pause(), GameStatus::Paused);
        let e4 = game.find_move("e2e4").expect("legal");
        assert_eq!(
            game.make_move(e4),
            Err(ChessErrors::IllegalMove(IllegalMoveReason::GameNotRunning))
        );
        assert_eq!(game.resume(), GameStatus::Running);
        game.make_move(e4).expect("move after resume");
    }

    #[test]
    fn listeners_see_every_ply_with_its_status() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut game = GameState::new_game();
        game.add_move_listener(move |mv, status| {
            if let Ok(mut seen) = sink.lock() {
                seen.push((mv.to_string(), status));
            }
        });
        play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);

        let seen = seen.lock().expect("listener mutex");
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], ("f2f3".to_owned(), GameStatus::Running));
        assert_eq!(
            seen[3],
            ("d8h4".to_owned(), GameStatus::Finished(GameOutcome::Won { winner: Color::Black }))
        );
        assert!(game.take_move_made());
        assert!(!game.take_move_made());
    }

    #[test]
    fn cached_legal_moves_are_refreshed_after_mutation() {
        let mut game = GameState::new_game();
        assert_eq!(game.legal_moves().len(), 20);
        play(&mut game, &["e2e4"]);
        assert!(game.legal_moves().iter().all(|mv| mv.color() == Color::Black));
        assert_eq!(game.legal_moves().len(), 20);
        assert_eq!(game.legal_moves_for(Color::White).len(), 30);
    }

    #[test]
    fn snapshot_reconstruction_round_trips() {
        let mut game = GameState::new_game();
        play(&mut game, &["e2e4", "c7c5", "e4e5", "d7d5"]);
        let snapshot = game.snapshot();
        let rebuilt = GameState::from_snapshot(&snapshot);
        assert_eq!(rebuilt.snapshot(), snapshot);
        assert_eq!(rebuilt.side_to_move(), Color::White);
        assert_eq!(rebuilt.legal_moves(), game.legal_moves());
    }

    #[test]
    fn simulation_does_not_touch_the_original() {
        let mut game = GameState::new_game();
        play(&mut game, &["e2e4"]);
        let before = game.snapshot();

        let mut scratch = game.simulation();
        play(&mut scratch, &["e7e5", "g1f3"]);
        assert_eq!(game.snapshot(), before);
        assert_eq!(game.history().len(), 1);
        assert_eq!(scratch.history().len(), 3);
    }

    #[test]
    fn random_playouts_keep_invariants_and_undo_to_start() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..4 {
            let mut game = GameState::with_config(GameConfig {
                verify_invariants: true,
                ..GameConfig::default()
            });
            let start = game.snapshot();
            for _ in 0..120 {
                let Some(mv) = game.legal_moves().choose(&mut rng).copied() else {
                    break;
                };
                let mover = game.side_to_move();
                game.make_move(mv).expect("legal move should apply");
                assert_ne!(game.side_to_move(), mover);
                assert_eq!(game.board().invariant_report(!game.status().is_finished()), None);
                if game.status().is_finished() {
                    break;
                }
            }
            while game.single_ply_redo().is_ok() {}
            assert_eq!(game.snapshot(), start);
            assert_eq!(game.to_fen(), crate::utils::fen::STARTING_POSITION_FEN);
        }
    }

    #[derive(Default)]
    struct Recorder {
        requests: Mutex<Vec<SearchRequest>>,
        cancelled: AtomicUsize,
    }

    struct RecordingScheduler(Arc<Recorder>);

    struct RecordingHandle {
        color: Color,
        recorder: Arc<Recorder>,
        cancelled: AtomicBool,
    }

    impl SearchHandle for RecordingHandle {
        fn color(&self) -> Color {
            self.color
        }

        fn cancel(&mut self) {
            if !self.cancelled.swap(true, Ordering::SeqCst) {
                self.recorder.cancelled.fetch_add(1, Ordering::SeqCst);
            }
        }

        fn is_finished(&self) -> bool {
            self.cancelled.load(Ordering::SeqCst)
        }
    }

    impl SearchScheduler for RecordingScheduler {
        fn schedule_search(&mut self, request: SearchRequest) -> Box<dyn SearchHandle> {
            self.0.requests.lock().expect("recorder mutex").push(request);
            Box::new(RecordingHandle {
                color: request.color,
                recorder: Arc::clone(&self.0),
                cancelled: AtomicBool::new(false),
            })
        }
    }

    fn game_against_computer() -> (GameState, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let mut game = GameState::with_config(GameConfig {
            white: Player::human("Alice"),
            black: Player::computer("Engine"),
            verify_invariants: true,
        });
        game.set_search_scheduler(Box::new(RecordingScheduler(Arc::clone(&recorder))));
        (game, recorder)
    }

    #[test]
    fn search_is_scheduled_once_per_computer_ply_with_a_snapshot() {
        let (mut game, recorder) = game_against_computer();
        assert_eq!(game.start(), GameStatus::Running);
        assert!(recorder.requests.lock().expect("mutex").is_empty());

        play(&mut game, &["e2e4"]);
        let requests = recorder.requests.lock().expect("mutex").clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].color, Color::Black);
        assert_eq!(requests[0].snapshot, game.snapshot());
        assert_eq!(requests[0].ply, 1);
        assert!(game.has_pending_search());
    }

    #[test]
    fn undo_cancels_the_pending_search() {
        let (mut game, recorder) = game_against_computer();
        play(&mut game, &["e2e4"]);
        game.single_ply_redo().expect("undo should succeed");
        assert_eq!(recorder.cancelled.load(Ordering::SeqCst), 1);
        assert!(!game.has_pending_search());
    }

    #[test]
    fn stale_proposals_are_rejected() {
        let (mut game, _recorder) = game_against_computer();
        play(&mut game, &["e2e4"]);
        let reply = game.find_move("e7e5").expect("legal");
        let stale = SearchProposal {
            color: Color::Black,
            hash: game.hash() ^ 1,
            player_move: reply,
        };
        assert_eq!(game.apply_search_proposal(stale), Err(ChessErrors::StaleSearchResult));

        let fresh = SearchProposal {
            color: Color::Black,
            hash: game.hash(),
            player_move: reply,
        };
        assert_eq!(game.apply_search_proposal(fresh), Ok(GameStatus::Running));
        assert_eq!(game.side_to_move(), Color::White);
    }
}
