use crate::board::board::Board;
use crate::board::figure::Color;
use crate::moves::player_move::PlayerMove;

/// Everything besides the board that move generation depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationContext {
    /// Side whose moves are generated.
    pub color: Color,
    /// Column the opponent double-stepped a pawn through on the previous ply.
    pub en_passant_column: Option<u8>,
}

impl GenerationContext {
    #[inline]
    pub const fn new(color: Color, en_passant_column: Option<u8>) -> Self {
        Self {
            color,
            en_passant_column,
        }
    }

    /// Context for the opponent after `player_move` was played.
    pub fn after(&self, player_move: &PlayerMove) -> Self {
        let en_passant_column = if player_move.is_double_step() {
            player_move.main.from.column()
        } else {
            None
        };
        Self::new(self.color.enemy(), en_passant_column)
    }
}

pub trait MoveGenerator: Send + Sync {
    /// Exact legal move set in a deterministic order.
    fn generate_legal_moves(&self, board: &Board, context: GenerationContext) -> Vec<PlayerMove>;
}
