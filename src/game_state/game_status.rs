//! Lifecycle, outcome, players and timing of a game.

use chrono::{DateTime, Duration, Utc};

use crate::board::figure::Color;

/// Final result. Colors are absolute: `Won { winner }` names the side that
/// won regardless of who is to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOutcome {
    Won { winner: Color },
    Draw,
}

impl GameOutcome {
    #[inline]
    pub const fn loser(self) -> Option<Color> {
        match self {
            GameOutcome::Won { winner } => Some(winner.enemy()),
            GameOutcome::Draw => None,
        }
    }

    /// Result token: `1-0`, `0-1` or `1/2-1/2`.
    pub const fn result_token(self) -> &'static str {
        match self {
            GameOutcome::Won { winner: Color::White } => "1-0",
            GameOutcome::Won { winner: Color::Black } => "0-1",
            GameOutcome::Draw => "1/2-1/2",
        }
    }

    pub fn from_result_token(token: &str) -> Option<Self> {
        match token {
            "1-0" => Some(GameOutcome::Won { winner: Color::White }),
            "0-1" => Some(GameOutcome::Won { winner: Color::Black }),
            "1/2-1/2" => Some(GameOutcome::Draw),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    NotStarted,
    Running,
    Paused,
    Finished(GameOutcome),
}

impl GameStatus {
    #[inline]
    pub const fn is_finished(self) -> bool {
        matches!(self, GameStatus::Finished(_))
    }

    #[inline]
    pub const fn outcome(self) -> Option<GameOutcome> {
        match self {
            GameStatus::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerKind {
    Human,
    /// Moves are requested from the search scheduler.
    Computer,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Player {
    pub name: String,
    pub kind: PlayerKind,
}

impl Player {
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PlayerKind::Human,
        }
    }

    pub fn computer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PlayerKind::Computer,
        }
    }

    #[inline]
    pub fn is_computer(&self) -> bool {
        self.kind == PlayerKind::Computer
    }
}

/// Settings fixed when a game is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub white: Player,
    pub black: Player,
    /// Re-check board invariants after every committed ply.
    pub verify_invariants: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            white: Player::human("White"),
            black: Player::human("Black"),
            verify_invariants: cfg!(debug_assertions),
        }
    }
}

impl GameConfig {
    pub fn player(&self, color: Color) -> &Player {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }
}

/// Wall-clock play time, excluding pauses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameClock {
    started_at: Option<DateTime<Utc>>,
    paused_at: Option<DateTime<Utc>>,
    stopped_at: Option<DateTime<Utc>>,
    paused_total: Duration,
}

impl GameClock {
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
    }

    pub fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(Utc::now());
        }
    }

    pub fn resume(&mut self) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += Utc::now() - paused_at;
        }
    }

    pub fn stop(&mut self) {
        self.resume();
        if self.stopped_at.is_none() {
            self.stopped_at = Some(Utc::now());
        }
    }

    /// Undo reopens a finished game.
    pub fn reopen(&mut self) {
        if let Some(stopped_at) = self.stopped_at.take() {
            self.paused_total += Utc::now() - stopped_at;
        }
    }

    #[inline]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        let Some(started_at) = self.started_at else {
            return Duration::zero();
        };
        let until = self.stopped_at.or(self.paused_at).unwrap_or_else(Utc::now);
        (until - started_at - self.paused_total).max(Duration::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_tokens_round_trip() {
        for outcome in [
            GameOutcome::Won { winner: Color::White },
            GameOutcome::Won { winner: Color::Black },
            GameOutcome::Draw,
        ] {
            assert_eq!(GameOutcome::from_result_token(outcome.result_token()), Some(outcome));
        }
        assert_eq!(GameOutcome::Won { winner: Color::White }.loser(), Some(Color::Black));
        assert_eq!(GameOutcome::Draw.loser(), None);
    }

    #[test]
    fn clock_is_zero_before_start() {
        let clock = GameClock::default();
        assert_eq!(clock.elapsed(), Duration::zero());
        assert!(clock.started_at().is_none());
    }

    #[test]
    fn stopped_clock_does_not_advance() {
        let mut clock = GameClock::default();
        clock.start();
        clock.stop();
        let first = clock.elapsed();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(clock.elapsed(), first);
    }

    #[test]
    fn paused_time_is_excluded() {
        let before_start = Utc::now();
        let mut clock = GameClock::default();
        clock.start();
        clock.pause();
        let at_pause = clock.elapsed();
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert_eq!(clock.elapsed(), at_pause);

        clock.resume();
        let elapsed = clock.elapsed();
        let wall = Utc::now() - before_start;
        assert!(elapsed >= at_pause);
        assert!(elapsed <= wall - Duration::milliseconds(20), "{elapsed} vs {wall}");
    }

    #[test]
    fn reopened_clock_skips_the_stopped_gap_and_runs_again() {
        let before_start = Utc::now();
        let mut clock = GameClock::default();
        clock.start();
        clock.stop();
        std::thread::sleep(std::time::Duration::from_millis(20));

        clock.reopen();
        let reopened = clock.elapsed();
        assert!(reopened <= Utc::now() - before_start - Duration::milliseconds(20));

        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(clock.elapsed() > reopened);
    }
}
