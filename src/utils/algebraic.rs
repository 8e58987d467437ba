//! Square and coordinate-move text conversions.
//!
//! Converts between human-readable coordinates (e.g. `e4`, `e7e8q`) and
//! board positions. Reused by FEN setup, `GameState::find_move` and the SAN
//! token reader.

use crate::board::figure::FigureType;
use crate::board::position::Position;
use crate::errors::{ChessErrors, ChessResult};

/// File letter of a 1-based column.
#[inline]
pub fn column_to_file(column: u8) -> Option<char> {
    (1..=8).contains(&column).then(|| char::from(b'a' + column - 1))
}

/// 1-based column of a file letter.
#[inline]
pub fn file_to_column(file: char) -> Option<u8> {
    ('a'..='h').contains(&file).then(|| file as u8 - b'a' + 1)
}

/// 1-based row of a rank digit.
#[inline]
pub fn rank_to_row(rank: char) -> Option<u8> {
    ('1'..='8').contains(&rank).then(|| rank as u8 - b'0')
}

/// Convert square text (for example: "e4") to a board position.
pub fn algebraic_to_position(square: &str) -> ChessResult<Position> {
    let mut chars = square.chars();
    let (Some(file), Some(rank), None) = (chars.next(), chars.next(), chars.next()) else {
        return Err(ChessErrors::InvalidAlgebraic(format!("invalid square: {square}")));
    };
    let column =
        file_to_column(file).ok_or_else(|| ChessErrors::InvalidAlgebraic(format!("invalid file: {file}")))?;
    let row = rank_to_row(rank).ok_or_else(|| ChessErrors::InvalidAlgebraic(format!("invalid rank: {rank}")))?;
    Ok(Position::square(row, column))
}

/// Convert a board position to square text. Sentinels have no square text.
pub fn position_to_algebraic(position: Position) -> ChessResult<String> {
    match (position.row(), position.column()) {
        (Some(row), Some(column)) => Ok(format!("{}{}", char::from(b'a' + column - 1), row)),
        _ => Err(ChessErrors::InvalidAlgebraic(format!("{position} is not a board square"))),
    }
}

/// Coordinate move text split into origin, destination and promotion type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinateMove {
    pub from: Position,
    pub to: Position,
    pub promotion: Option<FigureType>,
}

/// Parse coordinate move text such as `e2e4` or `e7e8q`.
pub fn parse_coordinate_move(text: &str) -> ChessResult<CoordinateMove> {
    if !text.is_ascii() || (text.len() != 4 && text.len() != 5) {
        return Err(ChessErrors::InvalidAlgebraic(format!("invalid coordinate move: {text}")));
    }

    let from = algebraic_to_position(&text[0..2])?;
    let to = algebraic_to_position(&text[2..4])?;
    let promotion = match text[4..].chars().next() {
        None => None,
        Some(glyph) => {
            let figure_type = FigureType::from_glyph(glyph.to_ascii_uppercase())
                .filter(|figure_type| FigureType::PROMOTIONS.contains(figure_type))
                .ok_or_else(|| ChessErrors::InvalidAlgebraic(format!("invalid promotion piece: {glyph}")))?;
            Some(figure_type)
        }
    };

    Ok(CoordinateMove { from, to, promotion })
}
