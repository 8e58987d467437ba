use crate::board::figure::Color;
use crate::moves::player_move::PlayerMove;

/// Ordered plies of a game. Grows by `push`, shrinks only through undo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveHistory {
    plies: Vec<PlayerMove>,
}

impl MoveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.plies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.plies.is_empty()
    }

    #[inline]
    pub fn last(&self) -> Option<&PlayerMove> {
        self.plies.last()
    }

    #[inline]
    pub fn push(&mut self, player_move: PlayerMove) {
        self.plies.push(player_move);
    }

    #[inline]
    pub fn pop(&mut self) -> Option<PlayerMove> {
        self.plies.pop()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlayerMove> + '_ {
        self.plies.iter()
    }

    pub fn as_slice(&self) -> &[PlayerMove] {
        &self.plies
    }

    /// Column `color` double-stepped a pawn through on the latest ply, if the
    /// latest ply was such a move by `color`.
    pub fn double_step_column(&self, color: Color) -> Option<u8> {
        let last = self.plies.last()?;
        if last.color() != color || !last.is_double_step() {
            return None;
        }
        last.main.from.column()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::figure::FigureType;
    use crate::board::position::Position;
    use crate::moves::chess_move::Move;

    #[test]
    fn double_step_only_visible_for_latest_ply() {
        let mut history = MoveHistory::new();
        let e4 = PlayerMove::plain(Move::new(
            Position::square(2, 5),
            Position::square(4, 5),
            FigureType::Pawn,
            Color::White,
        ));
        history.push(e4);
        assert_eq!(history.double_step_column(Color::White), Some(5));
        assert_eq!(history.double_step_column(Color::Black), None);

        let a6 = PlayerMove::plain(Move::new(
            Position::square(7, 1),
            Position::square(6, 1),
            FigureType::Pawn,
            Color::Black,
        ));
        history.push(a6);
        assert_eq!(history.double_step_column(Color::White), None);
        assert_eq!(history.pop(), Some(a6));
        assert_eq!(history.double_step_column(Color::White), Some(5));
    }
}
