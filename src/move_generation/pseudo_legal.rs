//! Pseudo-legal move generation, one branch per figure type.
//!
//! Moves produced here obey movement patterns and occupancy but may leave
//! the mover's own king attacked; the legal generator filters those out.
//! Castling is the exception: its check and passage conditions are tested
//! here because they are part of the move's own precondition.

use crate::board::board::{Board, KINGSIDE_ROOK_COLUMN, KING_HOME_COLUMN, QUEENSIDE_ROOK_COLUMN};
use crate::board::figure::{Color, Figure, FigureType};
use crate::board::position::Position;
use crate::move_generation::legal_move_checks::is_square_attacked;
use crate::move_generation::move_generator::GenerationContext;
use crate::moves::chess_move::Move;
use crate::moves::player_move::PlayerMove;

/// All pseudo-legal moves of `context.color`, in square order of the movers.
pub fn generate_pseudo_legal_moves(board: &Board, context: GenerationContext, out: &mut Vec<PlayerMove>) {
    for figure in board.figures_of(context.color) {
        generate_figure_moves(board, figure, context, out);
    }
}

/// Pseudo-legal moves of a single figure. Figures off the board produce none.
pub fn generate_figure_moves(board: &Board, figure: &Figure, context: GenerationContext, out: &mut Vec<PlayerMove>) {
    if !figure.position.is_on_board() || figure.color != context.color {
        return;
    }

    match figure.figure_type {
        FigureType::Pawn => generate_pawn_moves(board, figure, context, out),
        FigureType::Rook | FigureType::Bishop | FigureType::Queen => generate_slider_moves(board, figure, out),
        FigureType::Knight => generate_step_moves(board, figure, out),
        FigureType::King => {
            generate_step_moves(board, figure, out);
            generate_castling_moves(board, figure, out);
        }
    }
}

fn push_relocation(board: &Board, figure: &Figure, to: Position, out: &mut Vec<PlayerMove>) -> bool {
    let main = Move::new(figure.position, to, figure.figure_type, figure.color);
    match board.figure_at(to) {
        None => {
            out.push(PlayerMove::plain(main));
            true
        }
        Some(victim) if victim.color != figure.color => {
            out.push(PlayerMove::strike(main, victim.figure_type));
            false
        }
        Some(_) => false,
    }
}

fn generate_slider_moves(board: &Board, figure: &Figure, out: &mut Vec<PlayerMove>) {
    for &(d_row, d_column) in figure.figure_type.rays() {
        let mut current = figure.position;
        while let Some(next) = current.offset(d_row, d_column) {
            current = next;
            if !push_relocation(board, figure, current, out) {
                break;
            }
        }
    }
}

fn generate_step_moves(board: &Board, figure: &Figure, out: &mut Vec<PlayerMove>) {
    for &(d_row, d_column) in figure.figure_type.steps() {
        if let Some(to) = figure.position.offset(d_row, d_column) {
            push_relocation(board, figure, to, out);
        }
    }
}

fn push_pawn_arrival(figure: &Figure, to: Position, victim: Option<FigureType>, out: &mut Vec<PlayerMove>) {
    let color = figure.color;
    if to.row() == Some(color.promotion_row()) {
        for promoted_to in FigureType::PROMOTIONS {
            out.push(PlayerMove::promotion(figure.position, to, color, promoted_to, victim));
        }
        return;
    }

    let main = Move::new(figure.position, to, FigureType::Pawn, color);
    match victim {
        Some(victim) => out.push(PlayerMove::strike(main, victim)),
        None => out.push(PlayerMove::plain(main)),
    }
}

fn generate_pawn_moves(board: &Board, figure: &Figure, context: GenerationContext, out: &mut Vec<PlayerMove>) {
    let color = figure.color;
    let from = figure.position;
    let forward = color.forward();

    if let Some(one) = from.offset(forward, 0) {
        if board.is_empty_at(one) {
            push_pawn_arrival(figure, one, None, out);

            if from.row() == Some(color.pawn_start_row()) {
                if let Some(two) = one.offset(forward, 0) {
                    if board.is_empty_at(two) {
                        out.push(PlayerMove::plain(Move::new(from, two, FigureType::Pawn, color)));
                    }
                }
            }
        }
    }

    for d_column in [-1, 1] {
        let Some(target) = from.offset(forward, d_column) else {
            continue;
        };
        match board.figure_at(target) {
            Some(victim) if victim.color != color => {
                push_pawn_arrival(figure, target, Some(victim.figure_type), out);
            }
            Some(_) => {}
            None => {
                if is_en_passant_target(board, figure, target, context) {
                    out.push(PlayerMove::en_passant(Move::new(from, target, FigureType::Pawn, color)));
                }
            }
        }
    }
}

fn is_en_passant_target(board: &Board, figure: &Figure, target: Position, context: GenerationContext) -> bool {
    if context.en_passant_column.is_none() || target.column() != context.en_passant_column {
        return false;
    }
    let enemy = figure.color.enemy();
    // Row the enemy pawn landed on after its double step.
    let landing_row = enemy.pawn_start_row() as i8 + 2 * enemy.forward();
    let (Some(row), Some(column)) = (figure.position.row(), target.column()) else {
        return false;
    };
    if row as i8 != landing_row {
        return false;
    }
    board
        .figure_at(Position::square(row, column))
        .is_some_and(|f| f.color == enemy && f.figure_type == FigureType::Pawn)
}

fn generate_castling_moves(board: &Board, king: &Figure, out: &mut Vec<PlayerMove>) {
    let color = king.color;
    let row = color.home_row();
    if king.has_moved() || king.position != Position::square(row, KING_HOME_COLUMN) {
        return;
    }

    let enemy = color.enemy();
    if is_square_attacked(board, king.position, enemy) {
        return;
    }

    // (rook column, squares that must be empty, king passage, king target, rook target)
    let sides: [(u8, &[u8], [u8; 2], u8, u8); 2] = [
        (KINGSIDE_ROOK_COLUMN, &[6, 7], [6, 7], 7, 6),
        (QUEENSIDE_ROOK_COLUMN, &[2, 3, 4], [4, 3], 3, 4),
    ];

    for (rook_column, between, passage, king_to, rook_to) in sides {
        let rook_square = Position::square(row, rook_column);
        if !board.is_unmoved_rook(color, rook_square) {
            continue;
        }
        if !between.iter().all(|&c| board.is_empty_at(Position::square(row, c))) {
            continue;
        }
        if passage
            .iter()
            .any(|&c| is_square_attacked(board, Position::square(row, c), enemy))
        {
            continue;
        }

        let king_move = Move::new(king.position, Position::square(row, king_to), FigureType::King, color);
        let rook_move = Move::new(rook_square, Position::square(row, rook_to), FigureType::Rook, color);
        out.push(PlayerMove::castling(king_move, rook_move));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::setup::standard_board;

    fn sq(row: u8, column: u8) -> Position {
        Position::square(row, column)
    }

    fn white(en_passant_column: Option<u8>) -> GenerationContext {
        GenerationContext::new(Color::White, en_passant_column)
    }

    #[test]
    fn start_position_has_twenty_pseudo_moves() {
        let board = standard_board();
        let mut out = Vec::new();
        generate_pseudo_legal_moves(&board, white(None), &mut out);
        assert_eq!(out.len(), 20);
    }

    #[test]
    fn slider_stops_at_first_blocker() {
        let mut board = Board::new_empty();
        board.spawn(FigureType::Rook, Color::White, sq(1, 1));
        board.spawn(FigureType::Pawn, Color::White, sq(4, 1));
        board.spawn(FigureType::Knight, Color::Black, sq(1, 3));
        let mut out = Vec::new();
        generate_pseudo_legal_moves(&board, white(None), &mut out);
        let rook_moves: Vec<_> = out.iter().filter(|m| m.figure_type() == FigureType::Rook).collect();
        // a2, a3 up the file; b1 and the capture on c1 along the rank.
        assert_eq!(rook_moves.len(), 4);
        assert_eq!(rook_moves.iter().filter(|m| m.is_strike).count(), 1);
    }

    #[test]
    fn benched_figure_generates_nothing() {
        let mut board = Board::new_empty();
        let id = board.spawn(FigureType::Queen, Color::White, sq(4, 4));
        board.bench(sq(4, 4));
        let mut out = Vec::new();
        generate_figure_moves(&board, board.figure(id), white(None), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn pawn_promotion_yields_four_moves() {
        let mut board = Board::new_empty();
        board.spawn(FigureType::Pawn, Color::White, sq(7, 1));
        board.spawn(FigureType::Rook, Color::Black, sq(8, 2));
        let mut out = Vec::new();
        generate_pseudo_legal_moves(&board, white(None), &mut out);
        assert_eq!(out.len(), 8);
        assert!(out.iter().all(|m| m.is_promotion));
        assert_eq!(out.iter().filter(|m| m.is_strike).count(), 4);
    }

    #[test]
    fn en_passant_requires_matching_column_and_row() {
        let mut board = Board::new_empty();
        board.spawn(FigureType::Pawn, Color::White, sq(5, 5));
        board.spawn(FigureType::Pawn, Color::Black, sq(5, 4));

        let mut out = Vec::new();
        generate_pseudo_legal_moves(&board, white(Some(4)), &mut out);
        assert!(out.iter().any(|m| m.is_en_passant && m.destination() == sq(6, 4)));

        out.clear();
        generate_pseudo_legal_moves(&board, white(None), &mut out);
        assert!(!out.iter().any(|m| m.is_en_passant));
    }

    #[test]
    fn castling_blocked_by_attacked_passage() {
        let mut board = Board::new_empty();
        board.spawn(FigureType::King, Color::White, sq(1, 5));
        board.spawn(FigureType::Rook, Color::White, sq(1, 8));
        board.spawn(FigureType::Rook, Color::White, sq(1, 1));
        board.spawn(FigureType::Rook, Color::Black, sq(8, 6));

        let mut out = Vec::new();
        generate_pseudo_legal_moves(&board, white(None), &mut out);
        let castles: Vec<_> = out.iter().filter(|m| m.is_castling).collect();
        assert_eq!(castles.len(), 1);
        assert!(!castles[0].is_kingside_castle());
    }
}
