//! Board mutation for a whole ply and its exact reversal.
//!
//! Application order is capture removal, main move, castling rook, then the
//! promotion arrival; reversal runs the same steps backwards so benched and
//! promoted figures come back with their original identity.

use crate::board::board::Board;
use crate::errors::invariant_violation;
use crate::moves::chess_move::Move;
use crate::moves::player_move::PlayerMove;

fn expect_figure(board: &Board, mv: &Move) {
    match board.figure_at(mv.from) {
        Some(figure) if figure.figure_type == mv.figure_type && figure.color == mv.color => {}
        Some(figure) => invariant_violation(format!(
            "expected {} {} on {}, found {} {}",
            mv.color, mv.figure_type, mv.from, figure.color, figure.figure_type
        )),
        None => invariant_violation(format!("expected {} {} on empty {}", mv.color, mv.figure_type, mv.from)),
    }
}

pub fn apply_player_move(board: &mut Board, player_move: &PlayerMove) {
    if player_move.is_strike {
        if let Some(removal) = player_move.secondary {
            expect_figure(board, &removal);
            board.bench(removal.from);
        }
    }

    let main = player_move.main;
    expect_figure(board, &main);
    if player_move.is_promotion {
        board.retire_promoted(main.from);
    } else {
        board.relocate(main.from, main.to);
    }

    if player_move.is_castling {
        if let Some(rook) = player_move.secondary {
            expect_figure(board, &rook);
            board.relocate(rook.from, rook.to);
        }
    }

    if let Some(arrival) = player_move.promotion {
        let id = board.spawn(arrival.figure_type, arrival.color, arrival.to);
        // A promoted rook never grants castling rights.
        board.figure_mut(id).move_count = 1;
    }
}

pub fn revert_player_move(board: &mut Board, player_move: &PlayerMove) {
    if let Some(arrival) = player_move.promotion {
        board.despawn(arrival.to);
    }

    if player_move.is_castling {
        if let Some(rook) = player_move.secondary {
            board.relocate_back(rook.to, rook.from);
        }
    }

    let main = player_move.main;
    if player_move.is_promotion {
        board.restore_promoted(main.color, main.from);
    } else {
        board.relocate_back(main.to, main.from);
    }

    if player_move.is_strike {
        if let Some(removal) = player_move.secondary {
            board.unbench(removal.color, removal.figure_type, removal.from);
        }
    }
}
