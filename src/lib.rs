//! Catchfall - simulation core for a catch-the-falling-item arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, physics, collisions, game state)
//! - `tuning`: Data-driven game balance
//! - `persistence`: Best score storage behind a small get/set contract
//!
//! Rendering, audio and input devices live outside this crate. Hosts drive
//! [`sim::Simulation::tick`] once per frame and read back a [`sim::Snapshot`]
//! plus a queue of [`sim::GameEvent`]s.

pub mod persistence;
pub mod sim;
pub mod tuning;

pub use persistence::{BestScoreStore, MemoryBestStore};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants (defaults for [`Tuning`])
///
/// Screen space: x grows to the right, y grows downward. Times are seconds
/// unless the name says otherwise.
pub mod consts {
    /// Fixed simulation timestep (120 Hz keeps fast items from tunnelling
    /// through the receptacle)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Largest frame step the simulation accepts (hitches are capped, not replayed)
    pub const MAX_DT: f32 = 0.1;
    /// Substeps per frame; enough to cover a full `MAX_DT` frame
    pub const MAX_SUBSTEPS: u32 = 12;

    /// Playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 480.0;
    pub const PLAYFIELD_HEIGHT: f32 = 800.0;
    /// Distance past the playfield edge before an item counts as gone
    pub const MISS_MARGIN: f32 = 40.0;

    /// Receptacle (the thing the player steers)
    pub const RECEPTACLE_Y: f32 = 720.0;
    pub const RECEPTACLE_HALF_WIDTH: f32 = 48.0;
    pub const RECEPTACLE_HALF_HEIGHT: f32 = 24.0;

    /// Falling items
    pub const GRAVITY: f32 = 900.0;
    pub const ITEM_SPAWN_Y: f32 = -30.0;
    pub const ITEM_INITIAL_FALL_SPEED: f32 = 60.0;
    pub const ITEM_MAX_DRIFT: f32 = 40.0;
    pub const SPAWN_EDGE_MARGIN: f32 = 30.0;

    /// Spawn interval bounds (milliseconds)
    pub const INITIAL_SPAWN_INTERVAL_MS: f32 = 2000.0;
    pub const MIN_SPAWN_INTERVAL_MS: f32 = 350.0;
    pub const MAX_SPAWN_INTERVAL_MS: f32 = 2000.0;
    /// Two-regime tightening: big steps while easy, tiny steps once hard
    pub const FAST_TIGHTEN_STEP_MS: f32 = 40.0;
    pub const SLOW_TIGHTEN_STEP_MS: f32 = 4.0;
    pub const TIGHTEN_REGIME_THRESHOLD_MS: f32 = 500.0;

    /// Relaxation (score milestones and mercy after penalties)
    pub const RELAX_SCORE_STEP: u64 = 150;
    pub const RELAX_EPSILON_MS: f32 = 1.0;
    /// Relaxation never undoes more than this much tightening
    pub const RELAX_HEADROOM_MS: f32 = 250.0;
    /// Score-based ceiling slides from MAX_SPAWN_INTERVAL_MS down to this floor
    pub const RELAX_FLOOR_MS: f32 = 800.0;
    /// Score at which the score-based ceiling bottoms out
    pub const RELAX_TIGHTEN_SCORE: u64 = 2000;
    /// Fraction of the gap to the ceiling covered by one relaxation
    pub const RELAX_BLEND: f32 = 0.5;

    /// Scoring
    pub const CATCH_POINTS: i64 = 10;
    pub const BONUS_PENALTY: i64 = 500;
    pub const MAX_MISSES: u32 = 5;

    /// Recovery items and the pity timer
    pub const RECOVERY_CHANCE: f64 = 0.2;
    pub const MAGIC_COUNTDOWN: u32 = 5;

    /// Bonus event ("fish")
    pub const FISH_UNLOCK_SCORE: u64 = 300;
    pub const FISH_ARRIVAL_MIN: f32 = 8.0;
    pub const FISH_ARRIVAL_MAX: f32 = 16.0;
    pub const FISH_ASCEND_SECS: f32 = 0.9;
    pub const FISH_DESCEND_SECS: f32 = 1.1;
    /// Launch x distance from the playfield edge
    pub const FISH_LAUNCH_INSET: f32 = 20.0;
    /// Launch/splash line below the playfield bottom
    pub const FISH_WATER_DEPTH: f32 = 30.0;
    /// Apex height above the receptacle opening
    pub const FISH_APEX_CLEARANCE: f32 = 90.0;
    /// Random horizontal offset of the apex around the receptacle
    pub const FISH_APEX_JITTER: f32 = 24.0;
    /// Descend arc lift above the apex and horizontal splash distance
    pub const FISH_DESCEND_LIFT: f32 = 60.0;
    pub const FISH_SPLASH_OFFSET: f32 = 160.0;
    /// Catch window geometry
    pub const FISH_HIT_RADIUS: f32 = 56.0;
    pub const FISH_CATCH_BAND: f32 = 18.0;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Evaluate a quadratic Bézier curve at `t` in [0, 1]
#[inline]
pub fn quadratic_bezier(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u) + p1 * (2.0 * u * t) + p2 * (t * t)
}

/// Derivative of a quadratic Bézier curve with respect to `t`
#[inline]
pub fn quadratic_bezier_tangent(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> Vec2 {
    (p1 - p0) * (2.0 * (1.0 - t)) + (p2 - p1) * (2.0 * t)
}

/// Sanitize a host-supplied frame step: negative or NaN becomes 0, hitches are capped
#[inline]
pub fn clamp_dt(dt: f32) -> f32 {
    if dt.is_nan() {
        return 0.0;
    }
    dt.clamp(0.0, consts::MAX_DT)
}
