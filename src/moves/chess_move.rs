use std::fmt;

use crate::board::figure::{Color, FigureType};
use crate::board::position::Position;

/// Atomic relocation of one figure. Either end may be a sentinel: captures
/// go to `Bench`, promoted pawns to `Promoted`, and promotion figures arrive
/// from `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Position,
    pub to: Position,
    pub figure_type: FigureType,
    pub color: Color,
}

impl Move {
    #[inline]
    pub const fn new(from: Position, to: Position, figure_type: FigureType, color: Color) -> Self {
        Self {
            from,
            to,
            figure_type,
            color,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}->{}", self.color, self.figure_type, self.from, self.to)
    }
}
