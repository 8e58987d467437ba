//! Figures and their declarative movement capabilities.
//!
//! A figure knows its type, color, location and how often it has moved. It
//! never inspects the board; move generation reads the raw capabilities here
//! and applies occupancy and check rules itself.

use std::fmt;

use crate::board::position::Position;

/// Side of a figure or player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub const BOTH: [Color; 2] = [Color::White, Color::Black];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Black => 1,
        }
    }

    #[inline]
    pub const fn enemy(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// Row direction of pawn advances.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// Row holding the king and rooks at the start of the game.
    #[inline]
    pub const fn home_row(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Black => 8,
        }
    }

    #[inline]
    pub const fn pawn_start_row(self) -> u8 {
        match self {
            Color::White => 2,
            Color::Black => 7,
        }
    }

    #[inline]
    pub const fn promotion_row(self) -> u8 {
        match self {
            Color::White => 8,
            Color::Black => 1,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

pub const ORTHOGONAL_RAYS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub const DIAGONAL_RAYS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const ALL_RAYS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
pub const KNIGHT_STEPS: [(i8, i8); 8] = [
    (2, 1),
    (1, 2),
    (-1, 2),
    (-2, 1),
    (-2, -1),
    (-1, -2),
    (1, -2),
    (2, -1),
];

/// Figure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FigureType {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

impl FigureType {
    pub const ALL: [FigureType; 6] = [
        FigureType::Pawn,
        FigureType::Rook,
        FigureType::Knight,
        FigureType::Bishop,
        FigureType::Queen,
        FigureType::King,
    ];

    /// Types a pawn may promote to, strongest first.
    pub const PROMOTIONS: [FigureType; 4] = [
        FigureType::Queen,
        FigureType::Rook,
        FigureType::Bishop,
        FigureType::Knight,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            FigureType::Pawn => 0,
            FigureType::Rook => 1,
            FigureType::Knight => 2,
            FigureType::Bishop => 3,
            FigureType::Queen => 4,
            FigureType::King => 5,
        }
    }

    /// Material weight in pawns.
    #[inline]
    pub const fn weight(self) -> u32 {
        match self {
            FigureType::Pawn => 1,
            FigureType::Rook => 5,
            FigureType::Knight => 3,
            FigureType::Bishop => 3,
            FigureType::Queen => 9,
            FigureType::King => 0,
        }
    }

    /// Notation letter. Pawns use `P` here but are written without a letter in SAN.
    #[inline]
    pub const fn glyph(self) -> char {
        match self {
            FigureType::Pawn => 'P',
            FigureType::Rook => 'R',
            FigureType::Knight => 'N',
            FigureType::Bishop => 'B',
            FigureType::Queen => 'Q',
            FigureType::King => 'K',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            'P' => Some(FigureType::Pawn),
            'R' => Some(FigureType::Rook),
            'N' => Some(FigureType::Knight),
            'B' => Some(FigureType::Bishop),
            'Q' => Some(FigureType::Queen),
            'K' => Some(FigureType::King),
            _ => None,
        }
    }

    /// Directions walked until blocked. Empty for non-sliding figures.
    #[inline]
    pub const fn rays(self) -> &'static [(i8, i8)] {
        match self {
            FigureType::Rook => &ORTHOGONAL_RAYS,
            FigureType::Bishop => &DIAGONAL_RAYS,
            FigureType::Queen => &ALL_RAYS,
            _ => &[],
        }
    }

    /// Single-step offsets. Empty for sliding figures and pawns.
    #[inline]
    pub const fn steps(self) -> &'static [(i8, i8)] {
        match self {
            FigureType::Knight => &KNIGHT_STEPS,
            FigureType::King => &ALL_RAYS,
            _ => &[],
        }
    }
}

impl fmt::Display for FigureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FigureType::Pawn => "pawn",
            FigureType::Rook => "rook",
            FigureType::Knight => "knight",
            FigureType::Bishop => "bishop",
            FigureType::Queen => "queen",
            FigureType::King => "king",
        };
        write!(f, "{name}")
    }
}

/// Index of a figure inside its board's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FigureId(pub(crate) usize);

/// A game piece. Identity is stable while it moves; only promotion replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Figure {
    pub figure_type: FigureType,
    pub color: Color,
    pub position: Position,
    /// Number of committed relocations; zero means the figure never moved.
    pub move_count: u16,
}

impl Figure {
    #[inline]
    pub const fn new(figure_type: FigureType, color: Color, position: Position) -> Self {
        Self {
            figure_type,
            color,
            position,
            move_count: 0,
        }
    }

    #[inline]
    pub const fn has_moved(&self) -> bool {
        self.move_count > 0
    }
}
