//! Zobrist keys for incremental position hashing.
//!
//! The keys come from a fixed-seed generator so hashes are deterministic
//! across runs, which keeps snapshots comparable between processes and
//! makes test failures reproducible.

use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::board::board::CastlingRights;
use crate::board::figure::{Color, FigureType};

const ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug)]
struct ZobristTables {
    // [color][figure_type][square]
    figure_square: [[[u64; 64]; 6]; 2],
    side_to_move: u64,
    castling: [u64; 16],
    en_passant_column: [u64; 8],
}

static TABLES: OnceLock<ZobristTables> = OnceLock::new();

#[inline]
fn tables() -> &'static ZobristTables {
    TABLES.get_or_init(build_tables)
}

fn build_tables() -> ZobristTables {
    let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);

    let mut figure_square = [[[0u64; 64]; 6]; 2];
    for color in &mut figure_square {
        for figure in color {
            for key in figure {
                *key = rng.random();
            }
        }
    }

    let side_to_move = rng.random();

    let mut castling = [0u64; 16];
    for key in &mut castling {
        *key = rng.random();
    }

    let mut en_passant_column = [0u64; 8];
    for key in &mut en_passant_column {
        *key = rng.random();
    }

    ZobristTables {
        figure_square,
        side_to_move,
        castling,
        en_passant_column,
    }
}

/// Key for a `(color, figure type, square index)` occupancy term.
#[inline]
pub fn figure_square_key(color: Color, figure_type: FigureType, square: usize) -> u64 {
    tables().figure_square[color.index()][figure_type.index()][square]
}

/// Key contribution for a castling rights mask (`0..=15`).
#[inline]
pub fn castling_key(castling_rights: CastlingRights) -> u64 {
    tables().castling[(castling_rights & 0x0F) as usize]
}

/// Key for an en-passant column (`1..=8`); `None` contributes nothing.
#[inline]
pub fn en_passant_key(column: Option<u8>) -> u64 {
    match column {
        Some(column @ 1..=8) => tables().en_passant_column[column as usize - 1],
        _ => 0,
    }
}

/// Side-to-move toggle (xor in when black is to move).
#[inline]
pub fn side_to_move_key() -> u64 {
    tables().side_to_move
}
