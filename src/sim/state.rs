//! Game state and core simulation types
//!
//! `GameState` is the score/miss/phase state machine. Everything it mutates is
//! clamped on the way in, so no operation can leave it out of range.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::bezier::{BonusFlight, BonusPhase};
use crate::persistence::BestScoreStore;
use crate::tuning::SpawnTuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Constructed, waiting for the first start
    Ready,
    /// Active gameplay
    Playing,
    /// Simulation clock frozen
    Paused,
    /// Run ended (misses hit the limit)
    GameOver,
}

/// What kind of thing is in the air
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Regular falling item, worth points
    Standard,
    /// Falling item that pays back one miss
    Recovery,
    /// Timed bonus event; catching it is a penalty
    Bonus,
}

/// A live projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub kind: ProjectileKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Scripted path, present only for bonus projectiles
    pub flight: Option<BonusFlight>,
}

impl Projectile {
    /// A free-falling item (id assigned when it enters the live list)
    pub fn item(kind: ProjectileKind, pos: Vec2, vel: Vec2) -> Self {
        Self {
            id: 0,
            kind,
            pos,
            vel,
            flight: None,
        }
    }

    /// A bonus projectile placed at the start of its flight
    pub fn bonus(flight: BonusFlight) -> Self {
        Self {
            id: 0,
            kind: ProjectileKind::Bonus,
            pos: flight.position(),
            vel: flight.velocity(),
            flight: Some(flight),
        }
    }

    /// Flight phase for bonus projectiles
    pub fn phase(&self) -> Option<BonusPhase> {
        self.flight.as_ref().map(|f| f.phase)
    }
}

/// Discrete events for presentation/audio layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Spawned(ProjectileKind),
    Caught(ProjectileKind),
    Missed(ProjectileKind),
    /// Bonus finished its descend arc untouched
    BonusSplashed,
    /// Bonus rose past the receptacle without being caught
    BonusWindowClosed,
    /// Recovery item forced by the pity timer
    PityPayout,
    /// Spawn interval eased (milestone or mercy)
    Relaxed,
    FishUnlocked,
    NewBest(u64),
    GameOver,
    Paused,
    Resumed,
    Restarted,
}

/// Score, misses and phase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub score: u64,
    pub misses: u32,
    pub best: u64,
    /// Bonus event subsystem active
    pub fish_unlocked: bool,
    /// Standard catches left (while misses are outstanding) before a forced recovery
    pub magic_countdown: u32,
    /// Next spawn must be a recovery item
    pub force_magic: bool,
    pub phase: GamePhase,
    max_misses: u32,
    magic_countdown_reset: u32,
}

impl GameState {
    /// Fresh state in `Ready`, best score seeded from the store
    pub fn new(spawn: &SpawnTuning, best: u64) -> Self {
        Self {
            score: 0,
            misses: 0,
            best,
            fish_unlocked: false,
            magic_countdown: spawn.magic_countdown,
            force_magic: false,
            phase: GamePhase::Ready,
            max_misses: spawn.max_misses,
            magic_countdown_reset: spawn.magic_countdown,
        }
    }

    pub fn max_misses(&self) -> u32 {
        self.max_misses
    }

    /// Value the pity timer restarts from
    pub fn magic_countdown_reset(&self) -> u32 {
        self.magic_countdown_reset
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Apply a score delta (floored at zero); returns true on a new best
    pub fn add_score(&mut self, delta: i64, store: &mut impl BestScoreStore) -> bool {
        self.score = if delta >= 0 {
            self.score.saturating_add(delta as u64)
        } else {
            self.score.saturating_sub(delta.unsigned_abs())
        };
        if self.score > self.best {
            self.best = self.score;
            store.set(self.best);
            return true;
        }
        false
    }

    /// Apply a receptacle catch; returns true if it ended the run
    ///
    /// Catching the bonus is a mis-catch: it costs `penalty` points and a miss.
    pub fn register_catch(
        &mut self,
        kind: ProjectileKind,
        points: i64,
        penalty: i64,
        store: &mut impl BestScoreStore,
    ) -> bool {
        match kind {
            ProjectileKind::Standard => {
                self.add_score(points, store);
                false
            }
            ProjectileKind::Recovery => {
                self.add_score(points, store);
                self.misses = self.misses.saturating_sub(1);
                false
            }
            ProjectileKind::Bonus => {
                self.add_score(-penalty, store);
                self.register_miss()
            }
        }
    }

    /// Count a miss; returns true if this miss ended the run
    pub fn register_miss(&mut self) -> bool {
        self.misses = (self.misses + 1).min(self.max_misses);
        if self.misses >= self.max_misses && self.phase == GamePhase::Playing {
            self.phase = GamePhase::GameOver;
            log::info!("Game over: score {} (best {})", self.score, self.best);
            return true;
        }
        false
    }

    /// Playing <-> Paused; other phases are left alone
    pub fn toggle_pause(&mut self) -> GamePhase {
        self.phase = match self.phase {
            GamePhase::Playing => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Playing,
            other => other,
        };
        self.phase
    }

    /// Reset for a new run, keeping the best score
    pub fn restart(&mut self) {
        self.score = 0;
        self.misses = 0;
        self.fish_unlocked = false;
        self.magic_countdown = self.magic_countdown_reset;
        self.force_magic = false;
        self.phase = GamePhase::Playing;
    }
}

/// Read-only view for display layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Snapshot {
    pub score: u64,
    pub misses: u32,
    pub best: u64,
    pub spawn_interval_ms: f32,
    pub phase: GamePhase,
    pub fish_unlocked: bool,
    /// Passed through from input for sprite facing/tilt
    pub steering_bias: f32,
    pub live_projectiles: usize,
    pub magic_countdown: u32,
    pub force_magic: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryBestStore;

    fn playing() -> GameState {
        let mut state = GameState::new(&SpawnTuning::default(), 0);
        state.phase = GamePhase::Playing;
        state
    }

    #[test]
    fn test_new_state_is_ready() {
        let state = GameState::new(&SpawnTuning::default(), 90);
        assert_eq!(state.phase, GamePhase::Ready);
        assert_eq!(state.best, 90);
        assert_eq!(state.magic_countdown, SpawnTuning::default().magic_countdown);
    }

    #[test]
    fn test_add_score_floors_at_zero() {
        let mut store = MemoryBestStore::default();
        let mut state = playing();
        state.add_score(30, &mut store);
        state.add_score(-500, &mut store);
        assert_eq!(state.score, 0);
        assert_eq!(state.best, 30);
    }

    #[test]
    fn test_add_score_writes_best_through() {
        let mut store = MemoryBestStore::new(15);
        let mut state = GameState::new(&SpawnTuning::default(), store.get());
        state.phase = GamePhase::Playing;
        assert!(!state.add_score(10, &mut store));
        assert_eq!(store.get(), 15);
        assert!(state.add_score(10, &mut store));
        assert_eq!(store.get(), 20);
        assert_eq!(state.best, 20);
    }

    #[test]
    fn test_recovery_catch_pays_back_one_miss() {
        let mut store = MemoryBestStore::default();
        let mut state = playing();
        state.misses = 2;
        state.register_catch(ProjectileKind::Recovery, 10, 500, &mut store);
        assert_eq!(state.misses, 1);
        assert_eq!(state.score, 10);

        state.misses = 0;
        state.register_catch(ProjectileKind::Recovery, 10, 500, &mut store);
        assert_eq!(state.misses, 0);
    }

    #[test]
    fn test_bonus_catch_is_a_penalty() {
        let mut store = MemoryBestStore::default();
        let mut state = playing();
        state.add_score(700, &mut store);
        let over = state.register_catch(ProjectileKind::Bonus, 10, 500, &mut store);
        assert!(!over);
        assert_eq!(state.score, 200);
        assert_eq!(state.misses, 1);
        assert_eq!(state.best, 700);
    }

    #[test]
    fn test_miss_limit_ends_run() {
        let mut state = playing();
        for _ in 0..4 {
            assert!(!state.register_miss());
        }
        assert!(state.register_miss());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.misses, 5);

        // Further misses stay clamped
        state.register_miss();
        assert_eq!(state.misses, 5);
    }

    #[test]
    fn test_toggle_pause() {
        let mut state = playing();
        assert_eq!(state.toggle_pause(), GamePhase::Paused);
        assert_eq!(state.toggle_pause(), GamePhase::Playing);

        state.phase = GamePhase::GameOver;
        assert_eq!(state.toggle_pause(), GamePhase::GameOver);
    }

    #[test]
    fn test_restart_keeps_best() {
        let mut store = MemoryBestStore::default();
        let mut state = playing();
        state.add_score(400, &mut store);
        state.misses = 3;
        state.fish_unlocked = true;
        state.force_magic = true;
        state.magic_countdown = 0;
        state.phase = GamePhase::GameOver;

        state.restart();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.score, 0);
        assert_eq!(state.misses, 0);
        assert_eq!(state.best, 400);
        assert!(!state.fish_unlocked);
        assert!(!state.force_magic);
        assert_eq!(state.magic_countdown, state.magic_countdown_reset());
    }
}
