//! Contract between the game state machine and an external move search.
//!
//! The game never hands its live board to a search. After a ply commits and
//! the game is still running, it passes an immutable `PositionSnapshot` to a
//! `SearchScheduler` and keeps the returned handle so the search can be
//! cancelled before any undo. A finished search answers with a
//! `SearchProposal`, which the game validates through the normal move entry
//! point.

use crate::board::figure::Color;
use crate::encoding::position_encoder::PositionSnapshot;
use crate::moves::player_move::PlayerMove;

/// One search job: pick a move for `color` in `snapshot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRequest {
    pub color: Color,
    pub snapshot: PositionSnapshot,
    /// Number of plies already played when the search was requested.
    pub ply: usize,
}

/// Move chosen by a search for the position identified by `hash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchProposal {
    pub color: Color,
    pub hash: u64,
    pub player_move: PlayerMove,
}

pub trait SearchHandle: Send {
    fn color(&self) -> Color;

    /// Stop the search. A cancelled search never delivers a proposal.
    fn cancel(&mut self);

    fn is_finished(&self) -> bool;
}

pub trait SearchScheduler: Send {
    fn schedule_search(&mut self, request: SearchRequest) -> Box<dyn SearchHandle>;
}
