//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame dt supplied by the host, clamped on entry
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies

pub mod bezier;
pub mod collision;
pub mod difficulty;
pub mod projectiles;
pub mod scheduler;
pub mod state;
pub mod tick;

pub use bezier::{BezierArc, BonusFlight, BonusPhase};
pub use collision::{Contact, ReceptacleHitbox, classify};
pub use difficulty::{DifficultyController, DifficultyState};
pub use projectiles::{ProjectileSimulator, Resolution};
pub use scheduler::EventScheduler;
pub use state::{GameEvent, GamePhase, GameState, Projectile, ProjectileKind, Snapshot};
pub use tick::{Simulation, TickInput};
