//! Board coordinates plus the sentinel locations used for figures that left
//! the board.
//!
//! Rows and columns are 1-based (`a1` is row 1, column 1). The derived
//! ordering walks squares row-major from `a1` to `h8` and places every
//! sentinel after all real squares, which gives move generation and notation
//! a deterministic iteration order.

use std::fmt;

/// Number of rows/columns on the board.
pub const BOARD_SIZE: u8 = 8;

/// Location of a figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Position {
    /// A real board square.
    Square { row: u8, column: u8 },
    /// Captured figures.
    Bench,
    /// Pawns consumed by promotion.
    Promoted,
    /// Source of a figure that is being created (promotion target).
    Unknown,
}

impl Position {
    /// Construct a board square, returning `None` outside `1..=8`.
    #[inline]
    pub const fn new(row: u8, column: u8) -> Option<Self> {
        if row >= 1 && row <= BOARD_SIZE && column >= 1 && column <= BOARD_SIZE {
            Some(Position::Square { row, column })
        } else {
            None
        }
    }

    /// Construct a board square from known-good coordinates.
    #[inline]
    pub const fn square(row: u8, column: u8) -> Self {
        debug_assert!(row >= 1 && row <= BOARD_SIZE && column >= 1 && column <= BOARD_SIZE);
        Position::Square { row, column }
    }

    /// Square for a zero-based index (`0` = a1, `63` = h8).
    #[inline]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index >= 64 {
            return None;
        }
        Some(Position::Square {
            row: (index / 8) as u8 + 1,
            column: (index % 8) as u8 + 1,
        })
    }

    #[inline]
    pub const fn is_on_board(self) -> bool {
        matches!(self, Position::Square { .. })
    }

    #[inline]
    pub const fn row(self) -> Option<u8> {
        match self {
            Position::Square { row, .. } => Some(row),
            _ => None,
        }
    }

    #[inline]
    pub const fn column(self) -> Option<u8> {
        match self {
            Position::Square { column, .. } => Some(column),
            _ => None,
        }
    }

    /// Zero-based square index, `None` for sentinels.
    #[inline]
    pub const fn index(self) -> Option<usize> {
        match self {
            Position::Square { row, column } => Some((row as usize - 1) * 8 + (column as usize - 1)),
            _ => None,
        }
    }

    /// Shift a board square by `(d_row, d_column)`, `None` when leaving the board.
    #[inline]
    pub fn offset(self, d_row: i8, d_column: i8) -> Option<Self> {
        let Position::Square { row, column } = self else {
            return None;
        };
        let new_row = row as i8 + d_row;
        let new_column = column as i8 + d_column;
        if !(1..=BOARD_SIZE as i8).contains(&new_row) || !(1..=BOARD_SIZE as i8).contains(&new_column) {
            return None;
        }
        Some(Position::Square {
            row: new_row as u8,
            column: new_column as u8,
        })
    }

    /// All 64 board squares in ascending order.
    pub fn all_squares() -> impl Iterator<Item = Position> {
        (0..64).filter_map(Position::from_index)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Square { row, column } => {
                write!(f, "{}{}", char::from(b'a' + column - 1), row)
            }
            Position::Bench => write!(f, "bench"),
            Position::Promoted => write!(f, "promoted"),
            Position::Unknown => write!(f, "unknown"),
        }
    }
}
