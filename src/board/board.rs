//! Arena-backed board model.
//!
//! `Board` owns every figure of a game in an arena indexed by `FigureId`. The
//! square table maps board positions to arena slots; captured figures live on
//! a per-color bench (indexed by type) and pawns consumed by promotion live on
//! a per-color promoted list. Figures carry no reference back to the board.
//!
//! The mutation primitives enforce one figure per square. Violations are
//! programmer errors and abort through `invariant_violation`.

use crate::board::figure::{Color, Figure, FigureId, FigureType};
use crate::board::position::Position;
use crate::errors::invariant_violation;

/// Compact castling rights bitmask.
pub type CastlingRights = u8;

pub const CASTLE_WHITE_KINGSIDE: CastlingRights = 1 << 0;
pub const CASTLE_WHITE_QUEENSIDE: CastlingRights = 1 << 1;
pub const CASTLE_BLACK_KINGSIDE: CastlingRights = 1 << 2;
pub const CASTLE_BLACK_QUEENSIDE: CastlingRights = 1 << 3;

/// Column of the king at the start of the game.
pub const KING_HOME_COLUMN: u8 = 5;
pub const KINGSIDE_ROOK_COLUMN: u8 = 8;
pub const QUEENSIDE_ROOK_COLUMN: u8 = 1;

/// Maximum number of figures a side can ever own.
pub const FIGURES_PER_SIDE: usize = 16;
pub const PAWNS_PER_SIDE: usize = 8;

#[inline]
pub const fn kingside_right(color: Color) -> CastlingRights {
    match color {
        Color::White => CASTLE_WHITE_KINGSIDE,
        Color::Black => CASTLE_BLACK_KINGSIDE,
    }
}

#[inline]
pub const fn queenside_right(color: Color) -> CastlingRights {
    match color {
        Color::White => CASTLE_WHITE_QUEENSIDE,
        Color::Black => CASTLE_BLACK_QUEENSIDE,
    }
}

#[derive(Debug, Clone)]
pub struct Board {
    figures: Vec<Figure>,
    squares: [Option<FigureId>; 64],
    // [color][figure_type]
    bench: [[Vec<FigureId>; 6]; 2],
    promoted: [Vec<FigureId>; 2],
}

impl Default for Board {
    fn default() -> Self {
        Self::new_empty()
    }
}

impl Board {
    pub fn new_empty() -> Self {
        Self {
            figures: Vec::with_capacity(2 * FIGURES_PER_SIDE),
            squares: [None; 64],
            bench: Default::default(),
            promoted: Default::default(),
        }
    }

    // --- Queries ---

    #[inline]
    pub fn figure(&self, id: FigureId) -> &Figure {
        &self.figures[id.0]
    }

    #[inline]
    pub(crate) fn figure_mut(&mut self, id: FigureId) -> &mut Figure {
        &mut self.figures[id.0]
    }

    #[inline]
    pub fn figure_id_at(&self, position: Position) -> Option<FigureId> {
        position.index().and_then(|index| self.squares[index])
    }

    #[inline]
    pub fn figure_at(&self, position: Position) -> Option<&Figure> {
        self.figure_id_at(position).map(|id| self.figure(id))
    }

    #[inline]
    pub fn is_empty_at(&self, position: Position) -> bool {
        self.figure_id_at(position).is_none()
    }

    /// Figures of `color` currently on the board, in square order.
    pub fn figures_of(&self, color: Color) -> impl Iterator<Item = &Figure> + '_ {
        self.squares
            .iter()
            .flatten()
            .map(move |id| self.figure(*id))
            .filter(move |figure| figure.color == color)
    }

    pub fn king_position(&self, color: Color) -> Option<Position> {
        self.figures_of(color)
            .find(|figure| figure.figure_type == FigureType::King)
            .map(|figure| figure.position)
    }

    pub fn on_board_count(&self, color: Color) -> usize {
        self.figures_of(color).count()
    }

    pub fn bench_count(&self, color: Color) -> usize {
        self.bench[color.index()].iter().map(Vec::len).sum()
    }

    pub fn benched_of_type(&self, color: Color, figure_type: FigureType) -> usize {
        self.bench[color.index()][figure_type.index()].len()
    }

    pub fn promoted_count(&self, color: Color) -> usize {
        self.promoted[color.index()].len()
    }

    /// Derive castling rights from the "never moved" state of kings and rooks.
    pub fn castling_rights(&self) -> CastlingRights {
        let mut rights = 0;
        for color in Color::BOTH {
            let row = color.home_row();
            let king_unmoved = self
                .figure_at(Position::square(row, KING_HOME_COLUMN))
                .is_some_and(|f| f.color == color && f.figure_type == FigureType::King && !f.has_moved());
            if !king_unmoved {
                continue;
            }
            if self.is_unmoved_rook(color, Position::square(row, KINGSIDE_ROOK_COLUMN)) {
                rights |= kingside_right(color);
            }
            if self.is_unmoved_rook(color, Position::square(row, QUEENSIDE_ROOK_COLUMN)) {
                rights |= queenside_right(color);
            }
        }
        rights
    }

    pub fn is_unmoved_rook(&self, color: Color, position: Position) -> bool {
        self.figure_at(position)
            .is_some_and(|f| f.color == color && f.figure_type == FigureType::Rook && !f.has_moved())
    }

    /// Map external castling rights (FEN, snapshots) onto move counters:
    /// kings and corner rooks without a right are marked as having moved.
    pub fn apply_castling_rights(&mut self, rights: CastlingRights) {
        for color in Color::BOTH {
            let row = color.home_row();
            let any_right = rights & (kingside_right(color) | queenside_right(color)) != 0;
            let corners = [
                (KINGSIDE_ROOK_COLUMN, kingside_right(color)),
                (QUEENSIDE_ROOK_COLUMN, queenside_right(color)),
            ];

            if let Some(id) = self.figure_id_at(Position::square(row, KING_HOME_COLUMN)) {
                let king = self.figure_mut(id);
                if king.color == color && king.figure_type == FigureType::King {
                    king.move_count = u16::from(!any_right);
                }
            }
            for (column, right) in corners {
                if let Some(id) = self.figure_id_at(Position::square(row, column)) {
                    let rook = self.figure_mut(id);
                    if rook.color == color && rook.figure_type == FigureType::Rook {
                        rook.move_count = u16::from(rights & right == 0);
                    }
                }
            }
        }
    }

    // --- Mutation primitives ---

    /// Create a new figure at `position`.
    pub fn spawn(&mut self, figure_type: FigureType, color: Color, position: Position) -> FigureId {
        let id = FigureId(self.figures.len());
        self.figures.push(Figure::new(figure_type, color, Position::Unknown));
        self.place(id, position);
        id
    }

    /// Put an off-board figure onto an empty square.
    pub fn place(&mut self, id: FigureId, position: Position) {
        let Some(index) = position.index() else {
            invariant_violation(format!("cannot place figure {id:?} on sentinel {position}"));
        };
        if let Some(occupant) = self.squares[index] {
            invariant_violation(format!(
                "cannot place figure {id:?} on {position}: occupied by {occupant:?}"
            ));
        }
        if self.figure(id).position.is_on_board() {
            invariant_violation(format!(
                "figure {id:?} is already on {}",
                self.figure(id).position
            ));
        }
        self.squares[index] = Some(id);
        self.figure_mut(id).position = position;
    }

    /// Take the figure off `position`. Its location becomes `Unknown` until the
    /// caller places, benches or retires it.
    pub fn remove(&mut self, position: Position) -> FigureId {
        let Some(index) = position.index() else {
            invariant_violation(format!("cannot remove from sentinel {position}"));
        };
        let Some(id) = self.squares[index].take() else {
            invariant_violation(format!("cannot remove from empty square {position}"));
        };
        self.figure_mut(id).position = Position::Unknown;
        id
    }

    /// Move a figure between squares, counting the relocation.
    pub fn relocate(&mut self, from: Position, to: Position) -> FigureId {
        let id = self.remove(from);
        self.place(id, to);
        let figure = self.figure_mut(id);
        figure.move_count = figure.move_count.saturating_add(1);
        id
    }

    /// Reverse a `relocate`.
    pub fn relocate_back(&mut self, to: Position, from: Position) -> FigureId {
        let id = self.remove(to);
        self.place(id, from);
        let figure = self.figure_mut(id);
        if figure.move_count == 0 {
            invariant_violation(format!("relocating {id:?} back past its first move"));
        }
        figure.move_count -= 1;
        id
    }

    /// Capture the figure on `position`.
    pub fn bench(&mut self, position: Position) -> FigureId {
        let id = self.remove(position);
        let (color, figure_type) = {
            let figure = self.figure(id);
            (figure.color, figure.figure_type)
        };
        let slot = &mut self.bench[color.index()][figure_type.index()];
        if slot.contains(&id) {
            invariant_violation(format!("figure {id:?} benched twice"));
        }
        slot.push(id);
        self.figure_mut(id).position = Position::Bench;
        id
    }

    /// Return the most recently captured figure of the given kind to `position`.
    pub fn unbench(&mut self, color: Color, figure_type: FigureType, position: Position) -> FigureId {
        let Some(id) = self.bench[color.index()][figure_type.index()].pop() else {
            invariant_violation(format!("no benched {color} {figure_type} to restore"));
        };
        self.place(id, position);
        id
    }

    /// Retire the pawn on `position` as consumed by promotion.
    pub fn retire_promoted(&mut self, position: Position) -> FigureId {
        let id = self.remove(position);
        let color = self.figure(id).color;
        self.promoted[color.index()].push(id);
        self.figure_mut(id).position = Position::Promoted;
        id
    }

    /// Bring the most recently promoted pawn of `color` back to `position`.
    pub fn restore_promoted(&mut self, color: Color, position: Position) -> FigureId {
        let Some(id) = self.promoted[color.index()].pop() else {
            invariant_violation(format!("no promoted {color} pawn to restore"));
        };
        self.place(id, position);
        id
    }

    /// Destroy the figure on `position`. Only the newest figure can be
    /// destroyed, which holds for undoing the latest promotion.
    pub fn despawn(&mut self, position: Position) {
        let id = self.remove(position);
        if id.0 + 1 != self.figures.len() {
            invariant_violation(format!("despawning {id:?} which is not the newest figure"));
        }
        self.figures.pop();
    }

    // --- Invariants ---

    /// Describe the first broken board invariant, if any.
    pub fn invariant_report(&self, require_kings: bool) -> Option<String> {
        for (index, slot) in self.squares.iter().enumerate() {
            if let Some(id) = slot {
                let expected = Position::from_index(index);
                if Some(self.figure(*id).position) != expected {
                    return Some(format!("square index {index} and figure {id:?} disagree"));
                }
            }
        }

        for color in Color::BOTH {
            // A promoted pawn is replaced by exactly one figure, so it is not
            // counted again here.
            let total = self.on_board_count(color) + self.bench_count(color);
            if total > FIGURES_PER_SIDE {
                return Some(format!("{color} owns {total} figures"));
            }
            let pawns = self
                .figures_of(color)
                .filter(|f| f.figure_type == FigureType::Pawn)
                .count()
                + self.benched_of_type(color, FigureType::Pawn)
                + self.promoted_count(color);
            if pawns > PAWNS_PER_SIDE {
                return Some(format!("{color} accounts for {pawns} pawns"));
            }
            if require_kings {
                let kings = self
                    .figures_of(color)
                    .filter(|f| f.figure_type == FigureType::King)
                    .count();
                if kings != 1 {
                    return Some(format!("{color} has {kings} kings on the board"));
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::setup::standard_board;

    #[test]
    fn spawn_and_query() {
        let mut board = Board::new_empty();
        let e4 = Position::square(4, 5);
        let id = board.spawn(FigureType::Knight, Color::White, e4);
        assert_eq!(board.figure_id_at(e4), Some(id));
        assert!(!board.is_empty_at(e4));
        assert!(board.is_empty_at(Position::square(4, 4)));
        assert_eq!(board.figure(id).position, e4);
    }

    #[test]
    #[should_panic(expected = "occupied")]
    fn placing_on_occupied_square_panics() {
        let mut board = Board::new_empty();
        let e4 = Position::square(4, 5);
        board.spawn(FigureType::Knight, Color::White, e4);
        board.spawn(FigureType::Bishop, Color::Black, e4);
    }

    #[test]
    #[should_panic(expected = "empty square")]
    fn removing_from_empty_square_panics() {
        let mut board = Board::new_empty();
        board.remove(Position::square(4, 5));
    }

    #[test]
    fn bench_and_restore_keep_identity() {
        let mut board = Board::new_empty();
        let d5 = Position::square(5, 4);
        let id = board.spawn(FigureType::Pawn, Color::Black, d5);
        assert_eq!(board.bench(d5), id);
        assert_eq!(board.figure(id).position, Position::Bench);
        assert_eq!(board.bench_count(Color::Black), 1);
        assert_eq!(board.unbench(Color::Black, FigureType::Pawn, d5), id);
        assert_eq!(board.bench_count(Color::Black), 0);
        assert_eq!(board.figure(id).position, d5);
    }

    #[test]
    fn relocate_counts_moves() {
        let mut board = Board::new_empty();
        let a1 = Position::square(1, 1);
        let a4 = Position::square(4, 1);
        let id = board.spawn(FigureType::Rook, Color::White, a1);
        board.relocate(a1, a4);
        assert!(board.figure(id).has_moved());
        board.relocate_back(a4, a1);
        assert!(!board.figure(id).has_moved());
    }

    #[test]
    fn standard_board_has_full_castling_rights_and_is_consistent() {
        let board = standard_board();
        assert_eq!(board.castling_rights(), 0b1111);
        assert_eq!(board.invariant_report(true), None);
        assert_eq!(board.on_board_count(Color::White), 16);
    }

    #[test]
    fn promotion_with_full_army_is_consistent() {
        let mut board = standard_board();
        board.retire_promoted(Position::square(2, 1));
        board.spawn(FigureType::Queen, Color::White, Position::square(5, 4));
        assert_eq!(board.on_board_count(Color::White), 16);
        assert_eq!(board.promoted_count(Color::White), 1);
        assert_eq!(board.invariant_report(true), None);
    }

    #[test]
    fn too_many_pawns_are_reported() {
        let mut board = standard_board();
        board.spawn(FigureType::Pawn, Color::White, Position::square(4, 4));
        board.retire_promoted(Position::square(4, 4));
        let report = board.invariant_report(true).expect("a ninth pawn breaks the invariant");
        assert!(report.contains("9 pawns"), "{report}");
    }

    #[test]
    fn apply_castling_rights_marks_kings_and_rooks() {
        let mut board = standard_board();
        board.apply_castling_rights(CASTLE_WHITE_KINGSIDE | CASTLE_BLACK_QUEENSIDE);
        assert_eq!(board.castling_rights(), CASTLE_WHITE_KINGSIDE | CASTLE_BLACK_QUEENSIDE);
        board.apply_castling_rights(0);
        assert_eq!(board.castling_rights(), 0);
    }
}
