//! Full legal move generation pipeline.
//!
//! Collects pseudo-legal moves, plays each one on a throwaway copy of the
//! board and keeps only those after which the mover's king is safe.

use crate::board::board::Board;
use crate::move_generation::legal_move_apply::{apply_player_move, revert_player_move};
use crate::move_generation::legal_move_checks::is_in_check;
use crate::move_generation::move_generator::{GenerationContext, MoveGenerator};
use crate::move_generation::pseudo_legal::generate_pseudo_legal_moves;
use crate::moves::player_move::PlayerMove;

#[derive(Debug, Clone, Copy, Default)]
pub struct LegalMoveGenerator;

impl MoveGenerator for LegalMoveGenerator {
    fn generate_legal_moves(&self, board: &Board, context: GenerationContext) -> Vec<PlayerMove> {
        let mut pseudo = Vec::<PlayerMove>::with_capacity(64);
        generate_pseudo_legal_moves(board, context, &mut pseudo);

        let mut scratch = board.clone();
        pseudo.retain(|mv| {
            apply_player_move(&mut scratch, mv);
            let safe = !is_in_check(&scratch, context.color);
            revert_player_move(&mut scratch, mv);
            safe
        });

        pseudo
    }
}
