//! SAN token reader.
//!
//! Splits notation text into round markers, result tokens and move tokens.
//! Round prefixes glued to a move (`1.e4`) are split off and a detached
//! `e.p.` suffix is joined to the move it annotates. Check, mate and
//! annotation suffixes are stripped before a move token is interpreted.

use crate::board::figure::FigureType;
use crate::board::position::Position;
use crate::game_state::game_status::GameOutcome;
use crate::utils::algebraic::{file_to_column, rank_to_row};

const EN_PASSANT_SUFFIX: &str = "e.p.";

/// Move text reduced to the facts needed to find it among the legal moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanMove {
    Castle {
        kingside: bool,
    },
    Figure {
        figure_type: FigureType,
        from_column: Option<u8>,
        from_row: Option<u8>,
        capture: bool,
        destination: Position,
        promotion: Option<FigureType>,
        en_passant: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanToken {
    Round(u16),
    Result(GameOutcome),
    Move(SanMove),
}

/// Split notation text into raw tokens.
pub fn split_tokens(text: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for piece in text.split_whitespace() {
        if piece == EN_PASSANT_SUFFIX {
            if let Some(previous) = tokens.last_mut() {
                previous.push_str(EN_PASSANT_SUFFIX);
                continue;
            }
        }

        let digits = piece.bytes().take_while(u8::is_ascii_digit).count();
        let dots = piece[digits..].bytes().take_while(|b| *b == b'.').count();
        if digits > 0 && dots > 0 && digits + dots < piece.len() {
            tokens.push(piece[..digits + dots].to_owned());
            tokens.push(piece[digits + dots..].to_owned());
        } else {
            tokens.push(piece.to_owned());
        }
    }
    tokens
}

fn parse_round(token: &str) -> Option<u16> {
    let number = token.trim_end_matches('.');
    if number.len() == token.len() || number.is_empty() {
        return None;
    }
    number.parse().ok()
}

/// Drop check, mate and annotation suffixes.
pub fn strip_markers(token: &str) -> &str {
    token.trim_end_matches(['+', '#', '!', '?'])
}

pub fn parse_token(token: &str) -> Option<SanToken> {
    if let Some(round) = parse_round(token) {
        return Some(SanToken::Round(round));
    }
    if let Some(outcome) = GameOutcome::from_result_token(token) {
        return Some(SanToken::Result(outcome));
    }
    parse_move(token).map(SanToken::Move)
}

pub fn parse_move(token: &str) -> Option<SanMove> {
    let (core, en_passant) = match token.strip_suffix(EN_PASSANT_SUFFIX) {
        Some(core) => (core, true),
        None => (token, false),
    };
    let core = strip_markers(core);
    if !core.is_ascii() || core.is_empty() {
        return None;
    }

    match core {
        "O-O" | "0-0" if !en_passant => return Some(SanMove::Castle { kingside: true }),
        "O-O-O" | "0-0-0" if !en_passant => return Some(SanMove::Castle { kingside: false }),
        _ => {}
    }

    let mut rest = core;
    let figure_type = match rest.chars().next().and_then(FigureType::from_glyph) {
        Some(FigureType::Pawn) => return None,
        Some(figure_type) => {
            rest = &rest[1..];
            figure_type
        }
        None => FigureType::Pawn,
    };

    let mut promotion = None;
    if let Some((head, tail)) = rest.split_once('=') {
        let mut glyphs = tail.chars();
        let promoted = glyphs.next().and_then(FigureType::from_glyph)?;
        if glyphs.next().is_some() || !FigureType::PROMOTIONS.contains(&promoted) {
            return None;
        }
        promotion = Some(promoted);
        rest = head;
    }

    if rest.len() < 2 {
        return None;
    }
    let (head, square) = rest.split_at(rest.len() - 2);
    let mut square_chars = square.chars();
    let column = square_chars.next().and_then(file_to_column)?;
    let row = square_chars.next().and_then(rank_to_row)?;
    let destination = Position::new(row, column)?;

    let (head, capture) = match head.strip_suffix('x') {
        Some(head) => (head, true),
        None => (head, false),
    };

    let mut from_column = None;
    let mut from_row = None;
    let mut chars = head.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (None, _, _) => {}
        (Some(a), None, _) => {
            if let Some(column) = file_to_column(a) {
                from_column = Some(column);
            } else {
                from_row = Some(rank_to_row(a)?);
            }
        }
        (Some(a), Some(b), None) => {
            from_column = Some(file_to_column(a)?);
            from_row = Some(rank_to_row(b)?);
        }
        _ => return None,
    }

    let is_pawn = figure_type == FigureType::Pawn;
    if (promotion.is_some() || en_passant) && !is_pawn {
        return None;
    }
    // Pawn captures name their file; pawn pushes name nothing else.
    if is_pawn && (capture != from_column.is_some() || from_row.is_some()) {
        return None;
    }
    if en_passant && !capture {
        return None;
    }

    Some(SanMove::Figure {
        figure_type,
        from_column,
        from_row,
        capture,
        destination,
        promotion,
        en_passant,
    })
}
