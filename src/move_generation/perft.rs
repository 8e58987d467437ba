use std::sync::Arc;
use std::thread;

use crate::board::board::Board;
use crate::move_generation::legal_move_apply::{apply_player_move, revert_player_move};
use crate::move_generation::legal_move_checks::is_in_check;
use crate::move_generation::move_generator::{GenerationContext, MoveGenerator};
use crate::moves::player_move::PlayerMove;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerftCounts {
    pub nodes: usize,
    pub captures: usize,
    pub en_passant: usize,
    pub castles: usize,
    pub promotions: usize,
    pub checks: usize,
    pub checkmates: usize,
}

impl PerftCounts {
    fn merge(&mut self, rhs: PerftCounts) {
        self.nodes += rhs.nodes;
        self.captures += rhs.captures;
        self.en_passant += rhs.en_passant;
        self.castles += rhs.castles;
        self.promotions += rhs.promotions;
        self.checks += rhs.checks;
        self.checkmates += rhs.checkmates;
    }
}

pub fn perft<G: MoveGenerator>(generator: &G, board: &Board, context: GenerationContext, depth: u8) -> PerftCounts {
    if depth == 0 {
        return PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        };
    }

    let mut scratch = board.clone();
    let mut total = PerftCounts::default();
    for mv in generator.generate_legal_moves(board, context) {
        perft_recurse(generator, &mut scratch, context, &mv, depth, 1, &mut total);
    }
    total
}

/// Perft with one worker thread per root move.
pub fn perft_multi_threaded(
    generator: Arc<dyn MoveGenerator>,
    board: &Board,
    context: GenerationContext,
    depth: u8,
) -> PerftCounts {
    if depth == 0 {
        return PerftCounts {
            nodes: 1,
            ..PerftCounts::default()
        };
    }

    let root_moves = generator.generate_legal_moves(board, context);
    let mut handles = Vec::with_capacity(root_moves.len());
    for mv in root_moves {
        let generator_ref = Arc::clone(&generator);
        let mut scratch = board.clone();
        handles.push(thread::spawn(move || {
            let mut local = PerftCounts::default();
            perft_recurse(generator_ref.as_ref(), &mut scratch, context, &mv, depth, 1, &mut local);
            local
        }));
    }

    let mut total = PerftCounts::default();
    for handle in handles {
        match handle.join() {
            Ok(local) => total.merge(local),
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
    total
}

fn perft_recurse<G: MoveGenerator + ?Sized>(
    generator: &G,
    board: &mut Board,
    context: GenerationContext,
    mv: &PlayerMove,
    search_depth: u8,
    current_depth: u8,
    counts: &mut PerftCounts,
) {
    apply_player_move(board, mv);
    let next_context = context.after(mv);

    if current_depth == search_depth {
        counts.nodes += 1;
        counts.captures += usize::from(mv.is_strike);
        counts.en_passant += usize::from(mv.is_en_passant);
        counts.castles += usize::from(mv.is_castling);
        counts.promotions += usize::from(mv.is_promotion);
        if is_in_check(board, next_context.color) {
            counts.checks += 1;
            if generator.generate_legal_moves(board, next_context).is_empty() {
                counts.checkmates += 1;
            }
        }
    } else {
        for child in generator.generate_legal_moves(board, next_context) {
            perft_recurse(generator, board, next_context, &child, search_depth, current_depth + 1, counts);
        }
    }

    revert_player_move(board, mv);
}
