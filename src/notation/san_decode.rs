//! SAN text to a replayed game.
//!
//! Tokens are resolved one at a time against the legal moves of a scratch
//! game, since SAN only has meaning relative to the current position. A
//! result token ends the game; once the game has ended only a matching
//! result token may follow, and nothing after it.

use crate::errors::{ChessErrors, ChessResult, NotationError, NotationErrorKind};
use crate::game_state::game_state::GameState;
use crate::moves::player_move::PlayerMove;
use crate::notation::san_token::{parse_token, split_tokens, SanMove, SanToken};

/// Replay `text` from the standard starting position.
pub fn decode(text: &str) -> ChessResult<GameState> {
    decode_from(GameState::new_game(), text)
}

/// Replay `text` on top of `game`.
pub fn decode_from(mut game: GameState, text: &str) -> ChessResult<GameState> {
    let mut result_seen = false;

    for (token_index, token) in split_tokens(text).into_iter().enumerate() {
        let fail = |kind| NotationError {
            token_index,
            token: token.clone(),
            kind,
        };
        let rejected = |err| match err {
            ChessErrors::IllegalMove(reason) => ChessErrors::from(fail(NotationErrorKind::MoveRejected(reason))),
            other => other,
        };

        let parsed = parse_token(&token).ok_or_else(|| fail(NotationErrorKind::UnreadableToken))?;
        if result_seen {
            return Err(fail(NotationErrorKind::TokenAfterGameEnd).into());
        }

        match parsed {
            SanToken::Round(_) if game.status().is_finished() => {
                return Err(fail(NotationErrorKind::TokenAfterGameEnd).into());
            }
            SanToken::Round(_) => {}
            SanToken::Result(outcome) => {
                match game.status().outcome() {
                    Some(actual) if actual == outcome => {}
                    Some(_) => return Err(fail(NotationErrorKind::ResultMismatch).into()),
                    None => game.declare_result(outcome).map_err(rejected)?,
                }
                result_seen = true;
            }
            SanToken::Move(san) => {
                if game.status().is_finished() {
                    return Err(fail(NotationErrorKind::TokenAfterGameEnd).into());
                }
                let player_move = resolve(&game, &san).map_err(fail)?;
                game.make_move(player_move).map_err(rejected)?;
            }
        }
    }

    Ok(game)
}

fn matches_ignoring_capture(mv: &PlayerMove, san: &SanMove) -> bool {
    match *san {
        SanMove::Castle { kingside } => mv.is_castling && mv.is_kingside_castle() == kingside,
        SanMove::Figure {
            figure_type,
            from_column,
            from_row,
            destination,
            promotion,
            ..
        } => {
            !mv.is_castling
                && mv.figure_type() == figure_type
                && mv.destination() == destination
                && mv.promoted_to() == promotion
                && from_column.map_or(true, |column| mv.origin().column() == Some(column))
                && from_row.map_or(true, |row| mv.origin().row() == Some(row))
        }
    }
}

/// Find the single legal move `san` names.
fn resolve(game: &GameState, san: &SanMove) -> Result<PlayerMove, NotationErrorKind> {
    let mut candidates: Vec<PlayerMove> = game
        .legal_moves()
        .iter()
        .filter(|mv| matches_ignoring_capture(mv, san))
        .copied()
        .collect();

    let (capture, en_passant) = match *san {
        SanMove::Castle { .. } => (false, false),
        SanMove::Figure { capture, en_passant, .. } => (capture, en_passant),
    };
    if candidates.len() > 1 {
        candidates.retain(|mv| mv.is_strike == capture);
    }

    match candidates.as_slice() {
        [] => Err(NotationErrorKind::NoMatchingMove),
        [mv] if mv.is_strike != capture || (en_passant && !mv.is_en_passant) => {
            Err(NotationErrorKind::InconsistentMarker)
        }
        [mv] => Ok(*mv),
        many => Err(NotationErrorKind::AmbiguousMove {
            candidates: many.len(),
        }),
    }
}
