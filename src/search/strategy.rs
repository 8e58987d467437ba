//! Reference move-choice strategies for computer players.
//!
//! Strategies run on a scratch game rebuilt from a snapshot and only propose
//! a move; the live game validates it. `RandomStrategy` picks uniformly from
//! the legal moves, `GreedyStrategy` grabs the most material it can this ply.

use rand::prelude::IndexedRandom;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::game_state::game_state::GameState;
use crate::moves::player_move::PlayerMove;
use crate::search::threading::SharedSearchState;

pub trait SearchStrategy: Send {
    fn name(&self) -> &str;

    /// Pick a move for the side to move of `game`, `None` when it has none.
    /// Implementations return their best move so far once `state` asks them
    /// to stop.
    fn choose_move(&mut self, game: &GameState, state: &SharedSearchState) -> Option<PlayerMove>;
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    }
}

pub struct RandomStrategy {
    rng: StdRng,
}

impl RandomStrategy {
    pub fn new(seed: Option<u64>) -> Self {
        Self { rng: seeded_rng(seed) }
    }
}

impl Default for RandomStrategy {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SearchStrategy for RandomStrategy {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_move(&mut self, game: &GameState, state: &SharedSearchState) -> Option<PlayerMove> {
        let legal_moves = game.legal_moves();
        state.add_nodes(legal_moves.len() as u64);
        legal_moves.choose(&mut self.rng).copied()
    }
}

pub struct GreedyStrategy {
    rng: StdRng,
}

impl GreedyStrategy {
    pub fn new(seed: Option<u64>) -> Self {
        Self { rng: seeded_rng(seed) }
    }

    /// Material gained by the ply itself.
    #[inline]
    fn material_gain(mv: &PlayerMove) -> u32 {
        let captured = mv.captured().map_or(0, |figure_type| figure_type.weight());
        let promoted = mv
            .promoted_to()
            .map_or(0, |figure_type| figure_type.weight().saturating_sub(1));
        captured + promoted
    }
}

impl Default for GreedyStrategy {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SearchStrategy for GreedyStrategy {
    fn name(&self) -> &str {
        "greedy"
    }

    fn choose_move(&mut self, game: &GameState, state: &SharedSearchState) -> Option<PlayerMove> {
        let mut best_value = 0;
        let mut best_moves = Vec::new();

        for mv in game.legal_moves() {
            if state.should_stop() && !best_moves.is_empty() {
                break;
            }
            state.add_nodes(1);

            let value = Self::material_gain(mv);
            if best_moves.is_empty() || value > best_value {
                best_value = value;
                best_moves.clear();
                best_moves.push(*mv);
            } else if value == best_value {
                best_moves.push(*mv);
            }
        }

        best_moves.choose(&mut self.rng).copied()
    }
}
