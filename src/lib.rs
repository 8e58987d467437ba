//! Crate root module declarations for the chess rules core.
//!
//! This file exposes the board model, move generation, position encoding,
//! the game state machine, search scheduling and notation codec so the
//! binary, benches and external tooling can import stable module paths.

pub mod errors;

pub mod board {
    pub mod board;
    pub mod figure;
    pub mod position;
    pub mod setup;
}

pub mod moves {
    pub mod chess_move;
    pub mod move_history;
    pub mod player_move;
}

pub mod move_generation {
    pub mod legal_move_apply;
    pub mod legal_move_checks;
    pub mod legal_move_generator;
    pub mod move_generator;
    pub mod perft;
    pub mod pseudo_legal;
}

pub mod encoding {
    pub mod position_bitset;
    pub mod position_encoder;
    pub mod zobrist;
}

pub mod game_state {
    pub mod game_state;
    pub mod game_status;
    pub mod undo_state;
}

pub mod search {
    pub mod scheduler;
    pub mod strategy;
    pub mod threading;
}

pub mod notation {
    pub mod san_decode;
    pub mod san_encode;
    pub mod san_token;
}

pub mod utils {
    pub mod algebraic;
    pub mod fen;
}
