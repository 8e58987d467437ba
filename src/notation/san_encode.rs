//! Game history to SAN text.

use crate::board::figure::{Color, FigureType};
use crate::game_state::game_state::GameState;
use crate::game_state::game_status::{GameOutcome, GameStatus};
use crate::moves::player_move::PlayerMove;
use crate::utils::algebraic::column_to_file;

/// Render the whole game: round-numbered moves followed by the result token
/// when the game is finished.
///
/// The history is replayed on a throwaway copy rewound to the first ply, so
/// games set up from FEN encode relative to their own start.
pub fn encode(game: &GameState) -> String {
    let mut scratch = game.simulation();
    while scratch.single_ply_redo().is_ok() {}
    scratch.resume();

    let mut tokens: Vec<String> = Vec::with_capacity(game.history().len() * 3 / 2 + 1);
    for (index, player_move) in game.history().iter().enumerate() {
        match player_move.color() {
            Color::White => tokens.push(format!("{}.", scratch.round())),
            Color::Black if index == 0 => tokens.push(format!("{}...", scratch.round())),
            Color::Black => {}
        }

        let mut text = san_for_move(&scratch, player_move);
        if scratch.make_move(*player_move).is_err() {
            // The history was produced by validated plies; stop rather than
            // emit text for a diverged replay.
            break;
        }
        if matches!(scratch.status(), GameStatus::Finished(GameOutcome::Won { .. })) {
            text.push('#');
        } else if scratch.is_in_check(scratch.side_to_move()) {
            text.push('+');
        }
        tokens.push(text);
    }

    if let Some(outcome) = game.status().outcome() {
        tokens.push(outcome.result_token().to_owned());
    }
    tokens.join(" ")
}

/// SAN for `player_move` in the position of `game`, without check markers.
pub fn san_for_move(game: &GameState, player_move: &PlayerMove) -> String {
    if player_move.is_castling {
        let castle = if player_move.is_kingside_castle() { "O-O" } else { "O-O-O" };
        return castle.to_owned();
    }

    let mut out = String::with_capacity(8);
    let figure_type = player_move.figure_type();
    let origin = player_move.origin();

    if figure_type == FigureType::Pawn {
        if player_move.is_strike {
            out.extend(origin.column().and_then(column_to_file));
        }
    } else {
        out.push(figure_type.glyph());
        out.push_str(&disambiguation(game, player_move));
    }

    if player_move.is_strike {
        out.push('x');
    }
    out.push_str(&player_move.destination().to_string());
    if let Some(promoted) = player_move.promoted_to() {
        out.push('=');
        out.push(promoted.glyph());
    }
    out
}

/// File, rank or full origin square, whichever first separates the move from
/// same-type moves of the same shape to the same destination.
fn disambiguation(game: &GameState, player_move: &PlayerMove) -> String {
    let origin = player_move.origin();
    let rivals: Vec<&PlayerMove> = game
        .legal_moves()
        .iter()
        .filter(|mv| {
            mv.figure_type() == player_move.figure_type()
                && mv.destination() == player_move.destination()
                && mv.origin() != origin
                && mv.same_shape(player_move)
        })
        .collect();

    if rivals.is_empty() {
        return String::new();
    }
    if rivals.iter().all(|mv| mv.origin().column() != origin.column()) {
        return origin.column().and_then(column_to_file).map(String::from).unwrap_or_default();
    }
    if rivals.iter().all(|mv| mv.origin().row() != origin.row()) {
        return origin.row().map(|row| row.to_string()).unwrap_or_default();
    }
    origin.to_string()
}
