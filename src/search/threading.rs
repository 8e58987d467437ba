//! Threaded search scheduling.
//!
//! `ThreadedSearchScheduler` runs every `SearchRequest` on its own worker
//! thread. The worker rebuilds a scratch game from the request snapshot,
//! lets a `SearchStrategy` pick a move and sends the result over an `mpsc`
//! channel as a `SearchProposal`. The game owner drains the receiver and
//! feeds proposals to `GameState::apply_search_proposal`.
//!
//! Cancellation and the time budget share one stop flag. A cancelled worker
//! never delivers: cancellation and delivery are serialized on a gate, so
//! once `cancel` returns no proposal from that search can be sent.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use tracing::{debug, error, warn};

use crate::board::figure::Color;
use crate::game_state::game_state::GameState;
use crate::search::scheduler::{SearchHandle, SearchProposal, SearchRequest, SearchScheduler};
use crate::search::strategy::{GreedyStrategy, RandomStrategy, SearchStrategy};

/// Settings shared by every search a scheduler starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchConfig {
    /// Wall-clock limit per search. `None` (or zero) means unlimited.
    pub time_budget_ms: Option<u64>,
    /// Base seed for reproducible strategies; each request derives its own.
    pub seed: Option<u64>,
}

impl SearchConfig {
    #[inline]
    pub fn normalized_time_budget_ms(self) -> Option<u64> {
        self.time_budget_ms.filter(|budget| *budget > 0)
    }

    /// Seed for the search started after `ply` plies.
    #[inline]
    pub fn seed_for_ply(self, ply: usize) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(ply as u64))
    }
}

/// Stop flag, budget and accounting shared between a worker and its handle.
#[derive(Debug)]
pub struct SharedSearchState {
    stop: AtomicBool,
    finished: AtomicBool,
    // Held while delivering; true once cancelled.
    cancel_gate: Mutex<bool>,
    nodes_visited: AtomicU64,
    time_budget_ms: AtomicU64, // 0 means unlimited
    started_at: Mutex<Option<Instant>>,
}

impl SharedSearchState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            stop: AtomicBool::new(false),
            finished: AtomicBool::new(false),
            cancel_gate: Mutex::new(false),
            nodes_visited: AtomicU64::new(0),
            time_budget_ms: AtomicU64::new(0),
            started_at: Mutex::new(None),
        })
    }

    #[inline]
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Stop requested or time budget used up.
    #[inline]
    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed) || self.time_budget_exceeded()
    }

    pub fn cancel(&self) {
        if let Ok(mut cancelled) = self.cancel_gate.lock() {
            *cancelled = true;
        }
        self.request_stop();
    }

    /// Run `deliver` unless the search was cancelled. Returns whether it ran.
    pub fn deliver_unless_cancelled(&self, deliver: impl FnOnce()) -> bool {
        let Ok(cancelled) = self.cancel_gate.lock() else {
            return false;
        };
        if *cancelled {
            return false;
        }
        deliver();
        true
    }

    #[inline]
    pub fn mark_finished(&self) {
        self.finished.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    #[inline]
    pub fn add_nodes(&self, n: u64) {
        self.nodes_visited.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn nodes_visited(&self) -> u64 {
        self.nodes_visited.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_time_budget_ms(&self, budget_ms: Option<u64>) {
        self.time_budget_ms.store(budget_ms.unwrap_or(0), Ordering::Relaxed);
    }

    #[inline]
    pub fn reset_started_at(&self) {
        if let Ok(mut guard) = self.started_at.lock() {
            *guard = Some(Instant::now());
        }
    }

    #[inline]
    pub fn time_budget_exceeded(&self) -> bool {
        let budget_ms = self.time_budget_ms.load(Ordering::Relaxed);
        if budget_ms == 0 {
            return false;
        }
        let Ok(guard) = self.started_at.lock() else {
            return false;
        };
        let Some(started) = *guard else {
            return false;
        };
        started.elapsed().as_millis() as u64 >= budget_ms
    }
}

/// Builds a fresh strategy for each request from the request's seed.
pub type StrategyFactory = Box<dyn Fn(Option<u64>) -> Box<dyn SearchStrategy> + Send>;

pub struct ThreadedSearchHandle {
    color: Color,
    state: Arc<SharedSearchState>,
}

impl SearchHandle for ThreadedSearchHandle {
    fn color(&self) -> Color {
        self.color
    }

    fn cancel(&mut self) {
        self.state.cancel();
    }

    fn is_finished(&self) -> bool {
        self.state.is_finished()
    }
}

pub struct ThreadedSearchScheduler {
    config: SearchConfig,
    sender: Sender<SearchProposal>,
    factory: StrategyFactory,
}

impl ThreadedSearchScheduler {
    pub fn new(config: SearchConfig, sender: Sender<SearchProposal>, factory: StrategyFactory) -> Self {
        Self {
            config,
            sender,
            factory,
        }
    }

    /// Scheduler backed by `RandomStrategy` plus the receiving end of its channel.
    pub fn random(config: SearchConfig) -> (Self, Receiver<SearchProposal>) {
        let (sender, receiver) = mpsc::channel();
        let factory: StrategyFactory = Box::new(|seed| Box::new(RandomStrategy::new(seed)));
        (Self::new(config, sender, factory), receiver)
    }

    /// Scheduler backed by `GreedyStrategy` plus the receiving end of its channel.
    pub fn greedy(config: SearchConfig) -> (Self, Receiver<SearchProposal>) {
        let (sender, receiver) = mpsc::channel();
        let factory: StrategyFactory = Box::new(|seed| Box::new(GreedyStrategy::new(seed)));
        (Self::new(config, sender, factory), receiver)
    }

    #[inline]
    pub fn config(&self) -> SearchConfig {
        self.config
    }
}

fn run_search(
    request: SearchRequest,
    mut strategy: Box<dyn SearchStrategy>,
    state: &SharedSearchState,
    sender: &Sender<SearchProposal>,
) {
    let game = GameState::from_snapshot(&request.snapshot);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| strategy.choose_move(&game, state)));

    match outcome {
        Ok(Some(player_move)) => {
            let proposal = SearchProposal {
                color: request.color,
                hash: request.snapshot.hash,
                player_move,
            };
            let delivered = state.deliver_unless_cancelled(|| {
                if sender.send(proposal).is_err() {
                    warn!(ply = request.ply, "search result dropped: receiver closed");
                }
            });
            debug!(
                strategy = strategy.name(),
                ply = request.ply,
                %player_move,
                nodes = state.nodes_visited(),
                delivered,
                "search finished"
            );
        }
        Ok(None) => debug!(strategy = strategy.name(), ply = request.ply, "search found no move"),
        Err(_) => error!(strategy = strategy.name(), ply = request.ply, "search worker panicked"),
    }
}

impl SearchScheduler for ThreadedSearchScheduler {
    fn schedule_search(&mut self, request: SearchRequest) -> Box<dyn SearchHandle> {
        let state = SharedSearchState::new();
        state.set_time_budget_ms(self.config.normalized_time_budget_ms());
        state.reset_started_at();

        let strategy = (self.factory)(self.config.seed_for_ply(request.ply));
        let sender = self.sender.clone();
        let worker_state = Arc::clone(&state);

        let spawned = thread::Builder::new()
            .name(format!("search-ply-{}", request.ply))
            .spawn(move || {
                run_search(request, strategy, &worker_state, &sender);
                worker_state.mark_finished();
            });
        if let Err(err) = spawned {
            error!(%err, ply = request.ply, "failed to spawn search worker");
            state.mark_finished();
        }

        Box::new(ThreadedSearchHandle {
            color: request.color,
            state,
        })
    }
}
