//! Compound ply representation.
//!
//! A `PlayerMove` bundles the relocations of one ply: the main move of the
//! figure the player touched, an optional secondary move (castling rook, or
//! removal of the captured figure to the bench) and an optional promotion
//! move that materializes the new figure on the destination square.

use std::fmt;

use crate::board::figure::{Color, FigureType};
use crate::board::position::Position;
use crate::moves::chess_move::Move;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerMove {
    pub main: Move,
    pub secondary: Option<Move>,
    pub promotion: Option<Move>,
    pub is_castling: bool,
    pub is_promotion: bool,
    pub is_en_passant: bool,
    pub is_strike: bool,
}

impl PlayerMove {
    /// Quiet relocation.
    pub const fn plain(main: Move) -> Self {
        Self {
            main,
            secondary: None,
            promotion: None,
            is_castling: false,
            is_promotion: false,
            is_en_passant: false,
            is_strike: false,
        }
    }

    /// Capture on the destination square.
    pub const fn strike(main: Move, victim: FigureType) -> Self {
        let removal = Move::new(main.to, Position::Bench, victim, main.color.enemy());
        Self {
            main,
            secondary: Some(removal),
            promotion: None,
            is_castling: false,
            is_promotion: false,
            is_en_passant: false,
            is_strike: true,
        }
    }

    /// En-passant capture; the victim sits beside the capturing pawn's origin.
    pub fn en_passant(main: Move) -> Self {
        let victim_square = match (main.from, main.to) {
            (Position::Square { row, .. }, Position::Square { column, .. }) => Position::square(row, column),
            _ => Position::Unknown,
        };
        let removal = Move::new(victim_square, Position::Bench, FigureType::Pawn, main.color.enemy());
        Self {
            main,
            secondary: Some(removal),
            promotion: None,
            is_castling: false,
            is_promotion: false,
            is_en_passant: true,
            is_strike: true,
        }
    }

    /// King move plus the accompanying rook move.
    pub const fn castling(king: Move, rook: Move) -> Self {
        Self {
            main: king,
            secondary: Some(rook),
            promotion: None,
            is_castling: true,
            is_promotion: false,
            is_en_passant: false,
            is_strike: false,
        }
    }

    /// Pawn promotion, optionally capturing on the destination.
    pub const fn promotion(
        from: Position,
        destination: Position,
        color: Color,
        promoted_to: FigureType,
        victim: Option<FigureType>,
    ) -> Self {
        let pawn = Move::new(from, Position::Promoted, FigureType::Pawn, color);
        let arrival = Move::new(Position::Unknown, destination, promoted_to, color);
        let (secondary, is_strike) = match victim {
            Some(victim) => (
                Some(Move::new(destination, Position::Bench, victim, color.enemy())),
                true,
            ),
            None => (None, false),
        };
        Self {
            main: pawn,
            secondary,
            promotion: Some(arrival),
            is_castling: false,
            is_promotion: true,
            is_en_passant: false,
            is_strike,
        }
    }

    #[inline]
    pub const fn color(&self) -> Color {
        self.main.color
    }

    /// Type of the figure the player moved.
    #[inline]
    pub const fn figure_type(&self) -> FigureType {
        self.main.figure_type
    }

    #[inline]
    pub const fn origin(&self) -> Position {
        self.main.from
    }

    /// Square the moved figure (or its promoted replacement) ends on.
    #[inline]
    pub fn destination(&self) -> Position {
        match self.promotion {
            Some(arrival) => arrival.to,
            None => self.main.to,
        }
    }

    #[inline]
    pub fn promoted_to(&self) -> Option<FigureType> {
        self.promotion.map(|arrival| arrival.figure_type)
    }

    /// Type of the captured figure, if any.
    #[inline]
    pub fn captured(&self) -> Option<FigureType> {
        if !self.is_strike {
            return None;
        }
        self.secondary.map(|removal| removal.figure_type)
    }

    /// Pawn advance of two rows from its start row.
    pub fn is_double_step(&self) -> bool {
        if self.main.figure_type != FigureType::Pawn {
            return false;
        }
        match (self.main.from.row(), self.main.to.row()) {
            (Some(from), Some(to)) => from.abs_diff(to) == 2,
            _ => false,
        }
    }

    /// Castling towards the h-file.
    pub fn is_kingside_castle(&self) -> bool {
        self.is_castling && self.main.to.column() == Some(7)
    }

    /// Every atomic move of this ply in application order.
    pub fn atomic_moves(&self) -> impl Iterator<Item = Move> {
        [Some(self.main), self.secondary, self.promotion].into_iter().flatten()
    }

    /// Same shape (capture/castle/promotion) as `other`.
    pub fn same_shape(&self, other: &PlayerMove) -> bool {
        self.is_strike == other.is_strike
            && self.is_castling == other.is_castling
            && self.is_promotion == other.is_promotion
    }
}

impl fmt::Display for PlayerMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.origin(), self.destination())?;
        if let Some(promoted) = self.promoted_to() {
            write!(f, "{}", promoted.glyph().to_ascii_lowercase())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(row: u8, column: u8) -> Position {
        Position::square(row, column)
    }

    #[test]
    fn en_passant_removes_pawn_beside_origin() {
        let main = Move::new(sq(5, 5), sq(6, 4), FigureType::Pawn, Color::White);
        let mv = PlayerMove::en_passant(main);
        let removal = mv.secondary.expect("en passant has a removal move");
        assert_eq!(removal.from, sq(5, 4));
        assert_eq!(removal.to, Position::Bench);
        assert_eq!(removal.color, Color::Black);
        assert!(mv.is_strike && mv.is_en_passant);
        assert_eq!(mv.captured(), Some(FigureType::Pawn));
    }

    #[test]
    fn promotion_shape() {
        let mv = PlayerMove::promotion(sq(7, 1), sq(8, 2), Color::White, FigureType::Queen, Some(FigureType::Rook));
        assert_eq!(mv.main.to, Position::Promoted);
        assert_eq!(mv.destination(), sq(8, 2));
        assert_eq!(mv.promoted_to(), Some(FigureType::Queen));
        assert_eq!(mv.captured(), Some(FigureType::Rook));
        assert_eq!(mv.atomic_moves().count(), 3);
        assert_eq!(mv.to_string(), "a7b8q");
    }

    #[test]
    fn castling_is_not_a_strike() {
        let king = Move::new(sq(1, 5), sq(1, 7), FigureType::King, Color::White);
        let rook = Move::new(sq(1, 8), sq(1, 6), FigureType::Rook, Color::White);
        let mv = PlayerMove::castling(king, rook);
        assert!(mv.is_kingside_castle());
        assert_eq!(mv.captured(), None);
    }

    #[test]
    fn double_step_detection() {
        let mv = PlayerMove::plain(Move::new(sq(2, 5), sq(4, 5), FigureType::Pawn, Color::White));
        assert!(mv.is_double_step());
        let single = PlayerMove::plain(Move::new(sq(2, 5), sq(3, 5), FigureType::Pawn, Color::White));
        assert!(!single.is_double_step());
    }
}
