//! Errors used throughout the rules core.
//!
//! `ChessErrors` is the single recoverable error type of the crate. Callers
//! get it back for moves that are out of turn or not legal, for notation
//! that cannot be read, and for malformed setup strings; in every such case
//! the game state is left unchanged.
//!
//! Corrupted internal state (two figures on one square, a figure benched
//! twice, a missing king) is not represented here. Those conditions go
//! through `invariant_violation`, which logs and aborts the operation.

use std::error::Error;
use std::fmt;

use crate::board::figure::Color;

pub type ChessResult<T> = Result<T, ChessErrors>;

/// Why a move was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IllegalMoveReason {
    /// The move belongs to the side that is not to move.
    OutOfTurn { expected: Color, attempted: Color },
    /// The move is not in the current legal-move set.
    NotInLegalSet,
    /// The game is paused or has not been started.
    GameNotRunning,
    /// The game already has a result.
    GameFinished,
}

/// What went wrong with a single notation token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotationErrorKind {
    /// The token is not valid move, round or result text.
    UnreadableToken,
    /// No legal move fits the token.
    NoMatchingMove,
    /// More than one legal move fits the token.
    AmbiguousMove { candidates: usize },
    /// Capture or en-passant marker disagrees with the board.
    InconsistentMarker,
    /// A move token follows a concluded game.
    TokenAfterGameEnd,
    /// A result token contradicts the outcome on the board.
    ResultMismatch,
    /// The token names a legal move but the game refused it.
    MoveRejected(IllegalMoveReason),
}

/// Notation failure carrying the zero-based index of the offending token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotationError {
    pub token_index: usize,
    pub token: String,
    pub kind: NotationErrorKind,
}

impl fmt::Display for NotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match &self.kind {
            NotationErrorKind::UnreadableToken => "unreadable token".to_owned(),
            NotationErrorKind::NoMatchingMove => "no legal move matches".to_owned(),
            NotationErrorKind::AmbiguousMove { candidates } => {
                format!("ambiguous between {candidates} legal moves")
            }
            NotationErrorKind::InconsistentMarker => "capture marker disagrees with the board".to_owned(),
            NotationErrorKind::TokenAfterGameEnd => "move after the game ended".to_owned(),
            NotationErrorKind::ResultMismatch => "result contradicts the final position".to_owned(),
            NotationErrorKind::MoveRejected(reason) => ChessErrors::IllegalMove(reason.clone()).to_string(),
        };
        write!(f, "token {} '{}': {what}", self.token_index, self.token)
    }
}

/// Unified recoverable error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChessErrors {
    /// A move was refused; the game state is unchanged.
    IllegalMove(IllegalMoveReason),
    /// Notation input could not be replayed.
    Notation(NotationError),
    /// Undo requested with an empty history.
    NothingToUndo,
    /// Redo requested with an empty redo queue.
    NothingToRedo,
    /// Malformed FEN string.
    InvalidFen(String),
    /// Malformed square or coordinate move text.
    InvalidAlgebraic(String),
    /// A search proposal was computed for a position that is no longer current.
    StaleSearchResult,
}

impl fmt::Display for ChessErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChessErrors::IllegalMove(IllegalMoveReason::OutOfTurn { expected, attempted }) => {
                write!(f, "illegal move: {attempted} moved but {expected} is to move")
            }
            ChessErrors::IllegalMove(IllegalMoveReason::NotInLegalSet) => {
                write!(f, "illegal move: not in the legal move set")
            }
            ChessErrors::IllegalMove(IllegalMoveReason::GameNotRunning) => {
                write!(f, "illegal move: game is not running")
            }
            ChessErrors::IllegalMove(IllegalMoveReason::GameFinished) => {
                write!(f, "illegal move: game is finished")
            }
            ChessErrors::Notation(err) => write!(f, "notation error: {err}"),
            ChessErrors::NothingToUndo => write!(f, "no ply to undo"),
            ChessErrors::NothingToRedo => write!(f, "no ply to redo"),
            ChessErrors::InvalidFen(msg) => write!(f, "invalid FEN: {msg}"),
            ChessErrors::InvalidAlgebraic(msg) => write!(f, "invalid algebraic text: {msg}"),
            ChessErrors::StaleSearchResult => write!(f, "search result belongs to an outdated position"),
        }
    }
}

impl Error for ChessErrors {}

impl From<NotationError> for ChessErrors {
    fn from(value: NotationError) -> Self {
        ChessErrors::Notation(value)
    }
}

/// Abort on corrupted internal state.
#[cold]
#[track_caller]
pub fn invariant_violation(message: impl Into<String>) -> ! {
    let message = message.into();
    tracing::error!(%message, "board invariant violated");
    panic!("invariant violation: {message}");
}
