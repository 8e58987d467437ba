//! FEN setup and export.
//!
//! Parsing yields a `FenSetup` that `GameState` turns into a playable game.
//! Castling availability is mapped onto the "never moved" state of kings and
//! corner rooks, and the en-passant square becomes the setup double-step
//! column that applies until the first ply is played.

use crate::board::board::{
    Board, CastlingRights, CASTLE_BLACK_KINGSIDE, CASTLE_BLACK_QUEENSIDE, CASTLE_WHITE_KINGSIDE,
    CASTLE_WHITE_QUEENSIDE,
};
use crate::board::figure::{Color, FigureType};
use crate::board::position::Position;
use crate::errors::{ChessErrors, ChessResult};
use crate::game_state::game_state::GameState;
use crate::move_generation::legal_move_checks::is_in_check;
use crate::utils::algebraic::{algebraic_to_position, column_to_file};

pub const STARTING_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Position described by a FEN string.
#[derive(Debug, Clone)]
pub struct FenSetup {
    pub board: Board,
    pub side_to_move: Color,
    pub en_passant_column: Option<u8>,
    pub halfmove_clock: u16,
    pub round: u16,
}

fn invalid(message: impl Into<String>) -> ChessErrors {
    ChessErrors::InvalidFen(message.into())
}

pub fn parse_fen(fen: &str) -> ChessResult<FenSetup> {
    let mut parts = fen.split_whitespace();

    let board_part = parts.next().ok_or_else(|| invalid("missing board layout"))?;
    let side_part = parts.next().ok_or_else(|| invalid("missing side to move"))?;
    let castling_part = parts.next().ok_or_else(|| invalid("missing castling rights"))?;
    let en_passant_part = parts.next().ok_or_else(|| invalid("missing en-passant square"))?;
    // Clocks are optional; many hand-written positions omit them.
    let halfmove_part = parts.next().unwrap_or("0");
    let fullmove_part = parts.next().unwrap_or("1");

    if parts.next().is_some() {
        return Err(invalid("extra trailing fields"));
    }

    let mut board = parse_board(board_part)?;
    let side_to_move = parse_side_to_move(side_part)?;
    board.apply_castling_rights(parse_castling_rights(castling_part)?);
    let en_passant_column = parse_en_passant(en_passant_part, side_to_move)?;
    let halfmove_clock = halfmove_part
        .parse::<u16>()
        .map_err(|_| invalid(format!("invalid halfmove clock: {halfmove_part}")))?;
    // Some published positions carry a fullmove number of 0.
    let round = fullmove_part
        .parse::<u16>()
        .map(|round| round.max(1))
        .map_err(|_| invalid(format!("invalid fullmove number: {fullmove_part}")))?;

    if let Some(report) = board.invariant_report(true) {
        return Err(invalid(report));
    }
    if is_in_check(&board, side_to_move.enemy()) {
        return Err(invalid(format!("{} is in check but not to move", side_to_move.enemy())));
    }

    Ok(FenSetup {
        board,
        side_to_move,
        en_passant_column,
        halfmove_clock,
        round,
    })
}

fn figure_from_fen_char(ch: char) -> Option<(Color, FigureType)> {
    let color = if ch.is_ascii_uppercase() { Color::White } else { Color::Black };
    FigureType::from_glyph(ch.to_ascii_uppercase()).map(|figure_type| (color, figure_type))
}

fn parse_board(board_part: &str) -> ChessResult<Board> {
    let ranks: Vec<&str> = board_part.split('/').collect();
    if ranks.len() != 8 {
        return Err(invalid("board layout must contain 8 ranks"));
    }

    let mut board = Board::new_empty();
    for (rank_index, rank_str) in ranks.iter().enumerate() {
        let row = 8 - rank_index as u8;
        let mut column = 1u8;

        for ch in rank_str.chars() {
            if let Some(empty_count) = ch.to_digit(10) {
                if !(1..=8).contains(&empty_count) {
                    return Err(invalid(format!("invalid empty-square count '{ch}'")));
                }
                column += empty_count as u8;
                continue;
            }

            let (color, figure_type) =
                figure_from_fen_char(ch).ok_or_else(|| invalid(format!("invalid piece character '{ch}'")))?;
            let position = Position::new(row, column).ok_or_else(|| invalid("board rank has too many files"))?;
            if figure_type == FigureType::Pawn && (row == 1 || row == 8) {
                return Err(invalid(format!("pawn on back rank at {position}")));
            }
            board.spawn(figure_type, color, position);
            column += 1;
        }

        if column != 9 {
            return Err(invalid(format!("rank {row} does not sum to 8 files")));
        }
    }

    Ok(board)
}

fn parse_side_to_move(side_part: &str) -> ChessResult<Color> {
    match side_part {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(invalid(format!("invalid side to move: {side_part}"))),
    }
}

fn parse_castling_rights(castling_part: &str) -> ChessResult<CastlingRights> {
    if castling_part == "-" {
        return Ok(0);
    }

    let mut rights = 0;
    for ch in castling_part.chars() {
        rights |= match ch {
            'K' => CASTLE_WHITE_KINGSIDE,
            'Q' => CASTLE_WHITE_QUEENSIDE,
            'k' => CASTLE_BLACK_KINGSIDE,
            'q' => CASTLE_BLACK_QUEENSIDE,
            _ => return Err(invalid(format!("invalid castling character '{ch}'"))),
        };
    }
    Ok(rights)
}

fn parse_en_passant(en_passant_part: &str, side_to_move: Color) -> ChessResult<Option<u8>> {
    if en_passant_part == "-" {
        return Ok(None);
    }

    let target = algebraic_to_position(en_passant_part)
        .map_err(|_| invalid(format!("invalid en-passant square: {en_passant_part}")))?;
    if target.row() != Some(en_passant_row(side_to_move)) {
        return Err(invalid(format!("en-passant square {target} does not fit the side to move")));
    }
    Ok(target.column())
}

/// Row the capturing pawn of `side_to_move` lands on.
fn en_passant_row(side_to_move: Color) -> u8 {
    match side_to_move {
        Color::White => 6,
        Color::Black => 3,
    }
}

pub fn generate_fen(game: &GameState) -> String {
    let board = game.board();
    let mut out = String::with_capacity(90);

    for row in (1..=8u8).rev() {
        let mut empty = 0;
        for column in 1..=8u8 {
            match board.figure_at(Position::square(row, column)) {
                Some(figure) => {
                    if empty > 0 {
                        out.push(char::from(b'0' + empty));
                        empty = 0;
                    }
                    let glyph = figure.figure_type.glyph();
                    out.push(match figure.color {
                        Color::White => glyph,
                        Color::Black => glyph.to_ascii_lowercase(),
                    });
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push(char::from(b'0' + empty));
        }
        if row > 1 {
            out.push('/');
        }
    }

    out.push(' ');
    out.push(match game.side_to_move() {
        Color::White => 'w',
        Color::Black => 'b',
    });

    out.push(' ');
    let rights = board.castling_rights();
    if rights == 0 {
        out.push('-');
    } else {
        for (right, ch) in [
            (CASTLE_WHITE_KINGSIDE, 'K'),
            (CASTLE_WHITE_QUEENSIDE, 'Q'),
            (CASTLE_BLACK_KINGSIDE, 'k'),
            (CASTLE_BLACK_QUEENSIDE, 'q'),
        ] {
            if rights & right != 0 {
                out.push(ch);
            }
        }
    }

    out.push(' ');
    match game.generation_context().en_passant_column.and_then(column_to_file) {
        Some(file) => {
            out.push(file);
            out.push(char::from(b'0' + en_passant_row(game.side_to_move())));
        }
        None => out.push('-'),
    }

    out.push_str(&format!(" {} {}", game.halfmove_clock(), game.round()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_round_trips() {
        let setup = parse_fen(STARTING_POSITION_FEN).expect("start FEN should parse");
        assert_eq!(setup.board.castling_rights(), 0b1111);
        assert_eq!(setup.side_to_move, Color::White);
        assert_eq!(setup.round, 1);

        let game = GameState::from_fen(STARTING_POSITION_FEN).expect("start FEN should build a game");
        assert_eq!(generate_fen(&game), STARTING_POSITION_FEN);
    }

    #[test]
    fn en_passant_and_partial_castling() {
        let fen = "r3k2r/8/8/3pP3/8/8/8/R3K2R w Kq d6 0 3";
        let setup = parse_fen(fen).expect("FEN should parse");
        assert_eq!(setup.en_passant_column, Some(4));
        assert_eq!(setup.board.castling_rights(), CASTLE_WHITE_KINGSIDE | CASTLE_BLACK_QUEENSIDE);

        let game = GameState::from_fen(fen).expect("FEN should build a game");
        assert_eq!(generate_fen(&game), fen);
    }

    #[test]
    fn clocks_are_optional() {
        let setup = parse_fen("4k3/8/8/8/8/8/8/4K3 b - -").expect("FEN without clocks should parse");
        assert_eq!(setup.side_to_move, Color::Black);
        assert_eq!(setup.halfmove_clock, 0);
        assert_eq!(setup.round, 1);
    }

    #[test]
    fn side_not_to_move_may_not_be_in_check() {
        let err = GameState::from_fen("4k3/4R3/8/8/8/8/8/4K3 w - - 0 1").expect_err("black king is capturable");
        assert!(matches!(err, ChessErrors::InvalidFen(ref msg) if msg.contains("black is in check")), "{err}");
        assert!(GameState::from_fen("4k3/4R3/8/8/8/8/8/4K3 b - - 0 1").is_ok());
    }

    #[test]
    fn rejects_malformed_layouts() {
        for fen in [
            "8/8/8/8/8/8/8 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K2 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 x - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 w X - 0 1",
            "4k3/8/8/8/8/8/8/8 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K2P w - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 w - e3 0 1",
            "4k3/4R3/8/8/8/8/8/4K3 w - - 0 1",
        ] {
            assert!(
                matches!(parse_fen(fen), Err(ChessErrors::InvalidFen(_))),
                "expected {fen} to be rejected"
            );
        }
    }
}
