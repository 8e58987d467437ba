//! Incremental position identity.
//!
//! `PositionEncoder` keeps a Zobrist hash and a `PositionBitset` in lockstep.
//! Both are built once from a full position and afterwards only toggled by
//! the atomic moves of each ply plus the side, castling and en-passant
//! changes recorded in the ply's `UndoState`. Because every update is an
//! xor, `update_backward` performs the same toggles as `update_forward`.

use crate::board::board::{Board, CastlingRights};
use crate::board::figure::{Color, FigureType};
use crate::board::position::Position;
use crate::encoding::position_bitset::PositionBitset;
use crate::encoding::zobrist::{castling_key, en_passant_key, figure_square_key, side_to_move_key};
use crate::game_state::undo_state::UndoState;
use crate::moves::player_move::PlayerMove;

/// Immutable copy of the encoder state handed to search workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PositionSnapshot {
    pub hash: u64,
    pub bitset: PositionBitset,
}

impl PositionSnapshot {
    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.bitset.side_to_move()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionEncoder {
    hash: u64,
    bitset: PositionBitset,
}

impl PositionEncoder {
    /// Full computation from scratch. Only used when a game is created.
    pub fn from_position(
        board: &Board,
        side_to_move: Color,
        castling_rights: CastlingRights,
        en_passant_column: Option<u8>,
    ) -> Self {
        let mut encoder = Self {
            hash: 0,
            bitset: PositionBitset::default(),
        };

        for color in Color::BOTH {
            for figure in board.figures_of(color) {
                encoder.toggle_figure(figure.color, figure.figure_type, figure.position);
            }
        }
        if side_to_move == Color::Black {
            encoder.toggle_side_to_move();
        }
        encoder.hash ^= castling_key(castling_rights);
        encoder.bitset.toggle_castling(castling_rights);
        encoder.toggle_en_passant(en_passant_column);

        encoder
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn bitset(&self) -> &PositionBitset {
        &self.bitset
    }

    #[inline]
    pub fn snapshot(&self) -> PositionSnapshot {
        PositionSnapshot {
            hash: self.hash,
            bitset: self.bitset,
        }
    }

    pub fn update_forward(&mut self, player_move: &PlayerMove, undo: &UndoState) {
        self.toggle_ply(player_move, undo);
    }

    pub fn update_backward(&mut self, player_move: &PlayerMove, undo: &UndoState) {
        self.toggle_ply(player_move, undo);
    }

    fn toggle_ply(&mut self, player_move: &PlayerMove, undo: &UndoState) {
        for mv in player_move.atomic_moves() {
            self.toggle_figure(mv.color, mv.figure_type, mv.from);
            self.toggle_figure(mv.color, mv.figure_type, mv.to);
        }
        self.toggle_side_to_move();
        self.switch_castling(undo.castling_before, undo.castling_after);
        self.toggle_en_passant(undo.en_passant_before);
        self.toggle_en_passant(undo.en_passant_after);
    }

    #[inline]
    fn toggle_figure(&mut self, color: Color, figure_type: FigureType, position: Position) {
        // Sentinel ends of a move carry no board state.
        if let Some(square) = position.index() {
            self.hash ^= figure_square_key(color, figure_type, square);
            self.bitset.toggle_figure(color, figure_type, square);
        }
    }

    #[inline]
    fn toggle_side_to_move(&mut self) {
        self.hash ^= side_to_move_key();
        self.bitset.toggle_side_to_move();
    }

    /// Hash keys exist per full rights mask, so the hash swaps the whole
    /// mask while the bitset flips only the changed bits.
    #[inline]
    fn switch_castling(&mut self, before: CastlingRights, after: CastlingRights) {
        self.hash ^= castling_key(before) ^ castling_key(after);
        self.bitset.toggle_castling(before ^ after);
    }

    #[inline]
    fn toggle_en_passant(&mut self, column: Option<u8>) {
        self.hash ^= en_passant_key(column);
        self.bitset.toggle_en_passant(column);
    }
}
