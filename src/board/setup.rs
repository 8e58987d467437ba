//! Standard starting layout.

use crate::board::board::Board;
use crate::board::figure::{Color, FigureType};
use crate::board::position::Position;

/// Back-rank order from column a to column h.
pub const BACK_RANK: [FigureType; 8] = [
    FigureType::Rook,
    FigureType::Knight,
    FigureType::Bishop,
    FigureType::Queen,
    FigureType::King,
    FigureType::Bishop,
    FigureType::Knight,
    FigureType::Rook,
];

pub fn standard_board() -> Board {
    let mut board = Board::new_empty();
    for color in Color::BOTH {
        for (column, figure_type) in (1u8..).zip(BACK_RANK) {
            board.spawn(figure_type, color, Position::square(color.home_row(), column));
            board.spawn(FigureType::Pawn, color, Position::square(color.pawn_start_row(), column));
        }
    }
    board
}
