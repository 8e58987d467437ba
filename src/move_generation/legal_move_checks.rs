//! Attack and check detection.
//!
//! Attacks are found by looking outward from the target square: a square is
//! attacked when a figure of the attacking color sits where its own raw
//! movement pattern would reach the target. Castling never attacks.

use crate::board::board::Board;
use crate::board::figure::{Color, FigureType, DIAGONAL_RAYS, ORTHOGONAL_RAYS};
use crate::board::position::Position;

#[inline]
fn holds(board: &Board, position: Position, color: Color, figure_type: FigureType) -> bool {
    board
        .figure_at(position)
        .is_some_and(|f| f.color == color && f.figure_type == figure_type)
}

pub fn is_square_attacked(board: &Board, square: Position, attacker: Color) -> bool {
    // A pawn attacks diagonally forward, so it sits one row behind the target.
    let pawn_row = -attacker.forward();
    for d_column in [-1, 1] {
        if let Some(origin) = square.offset(pawn_row, d_column) {
            if holds(board, origin, attacker, FigureType::Pawn) {
                return true;
            }
        }
    }

    for stepper in [FigureType::Knight, FigureType::King] {
        for &(d_row, d_column) in stepper.steps() {
            if let Some(origin) = square.offset(d_row, d_column) {
                if holds(board, origin, attacker, stepper) {
                    return true;
                }
            }
        }
    }

    let sliders = [
        (&ORTHOGONAL_RAYS, FigureType::Rook),
        (&DIAGONAL_RAYS, FigureType::Bishop),
    ];
    for (rays, line_piece) in sliders {
        for &(d_row, d_column) in rays.iter() {
            let mut current = square;
            while let Some(next) = current.offset(d_row, d_column) {
                current = next;
                let Some(figure) = board.figure_at(current) else {
                    continue;
                };
                if figure.color == attacker
                    && (figure.figure_type == line_piece || figure.figure_type == FigureType::Queen)
                {
                    return true;
                }
                break;
            }
        }
    }

    false
}

/// Whether `color`'s king is attacked. A board without that king is never in check.
#[inline]
pub fn is_in_check(board: &Board, color: Color) -> bool {
    board
        .king_position(color)
        .is_some_and(|king| is_square_attacked(board, king, color.enemy()))
}
