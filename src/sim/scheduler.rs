//! Spawn scheduling: when to drop an item, which kind, and when the fish jumps
//!
//! Cadence is driven by the simulation clock, never by platform timers, so a
//! change in spawn interval takes effect on the next check with no drift.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::bezier::{BezierArc, BonusFlight};
use super::collision::ReceptacleHitbox;
use super::state::{GameState, Projectile, ProjectileKind};
use crate::tuning::{BonusTuning, PlayfieldTuning, SpawnTuning};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventScheduler {
    spawn: SpawnTuning,
    bonus: BonusTuning,
    /// Clock time of the last item spawn (seconds)
    last_spawn_at: f64,
    /// Clock time the next bonus may launch; `None` while one is in the air
    /// or before unlock
    next_bonus_at: Option<f64>,
    bonus_live: bool,
}

impl EventScheduler {
    pub fn new(spawn: SpawnTuning, bonus: BonusTuning) -> Self {
        Self {
            spawn,
            bonus,
            last_spawn_at: 0.0,
            next_bonus_at: None,
            bonus_live: false,
        }
    }

    pub fn reset(&mut self) {
        self.last_spawn_at = 0.0;
        self.next_bonus_at = None;
        self.bonus_live = false;
    }

    pub fn next_bonus_at(&self) -> Option<f64> {
        self.next_bonus_at
    }

    pub fn bonus_live(&self) -> bool {
        self.bonus_live
    }

    /// Drop an item once more than `interval_ms` has passed since the last one
    pub fn maybe_spawn_standard(
        &mut self,
        now: f64,
        interval_ms: f32,
        state: &mut GameState,
        playfield: &PlayfieldTuning,
        rng: &mut impl Rng,
    ) -> Option<Projectile> {
        let elapsed_ms = (now - self.last_spawn_at) * 1000.0;
        if elapsed_ms <= f64::from(interval_ms) {
            return None;
        }
        self.last_spawn_at = now;

        let kind = self.next_spawn_kind(state, rng);
        let margin = self.spawn.edge_margin;
        let x = rng.random_range(margin..=playfield.width - margin);
        let drift = rng.random_range(-self.spawn.max_drift..=self.spawn.max_drift);
        log::debug!("Spawn {:?} at x={:.0} (t={:.2}s)", kind, x, now);
        Some(Projectile::item(
            kind,
            Vec2::new(x, self.spawn.spawn_y),
            Vec2::new(drift, self.spawn.initial_fall_speed),
        ))
    }

    /// Pick the next item kind
    ///
    /// Recovery items only appear while misses are outstanding: forced when the
    /// pity timer has run out, otherwise by chance.
    pub fn next_spawn_kind(&self, state: &mut GameState, rng: &mut impl Rng) -> ProjectileKind {
        if state.misses == 0 {
            return ProjectileKind::Standard;
        }
        if state.force_magic {
            state.force_magic = false;
            log::debug!("Pity timer payout: forcing recovery item");
            return ProjectileKind::Recovery;
        }
        if rng.random_bool(self.spawn.recovery_chance) {
            ProjectileKind::Recovery
        } else {
            ProjectileKind::Standard
        }
    }

    /// Unlock the fish at the score threshold, then launch one when due
    pub fn maybe_spawn_bonus(
        &mut self,
        now: f64,
        state: &mut GameState,
        hitbox: &ReceptacleHitbox,
        playfield: &PlayfieldTuning,
        rng: &mut impl Rng,
    ) -> Option<Projectile> {
        if !state.fish_unlocked {
            self.maybe_unlock(now, state, rng);
            return None;
        }
        if self.bonus_live {
            return None;
        }
        match self.next_bonus_at {
            Some(at) if now >= at => {
                self.next_bonus_at = None;
                self.bonus_live = true;
                Some(self.launch_bonus(hitbox, playfield, rng))
            }
            Some(_) => None,
            None => {
                // Unlocked with nothing pending: start the clock from now
                self.schedule_next_bonus(now, rng);
                None
            }
        }
    }

    /// Unlock the fish once the score reaches the threshold
    ///
    /// Returns true on the call that unlocks it; the first arrival is drawn
    /// from `now`.
    pub fn maybe_unlock(&mut self, now: f64, state: &mut GameState, rng: &mut impl Rng) -> bool {
        if state.fish_unlocked || state.score < self.bonus.unlock_score {
            return false;
        }
        state.fish_unlocked = true;
        self.schedule_next_bonus(now, rng);
        log::info!("Fish unlocked at score {}", state.score);
        true
    }

    /// Bonus caught, splashed, or cleared: schedule the next one
    pub fn on_bonus_resolved(&mut self, now: f64, rng: &mut impl Rng) {
        self.bonus_live = false;
        self.schedule_next_bonus(now, rng);
    }

    fn schedule_next_bonus(&mut self, now: f64, rng: &mut impl Rng) {
        let delay = rng.random_range(self.bonus.arrival_min..=self.bonus.arrival_max);
        self.next_bonus_at = Some(now + f64::from(delay));
        log::debug!("Next fish at t={:.2}s", now + f64::from(delay));
    }

    /// Pity timer bookkeeping for a receptacle catch
    pub fn on_catch(&mut self, kind: ProjectileKind, state: &mut GameState) {
        match kind {
            ProjectileKind::Standard => {
                if state.misses > 0 {
                    state.magic_countdown = state.magic_countdown.saturating_sub(1);
                    if state.magic_countdown == 0 {
                        state.force_magic = true;
                    }
                }
            }
            ProjectileKind::Recovery => {
                state.magic_countdown = state.magic_countdown_reset();
            }
            // A bonus catch is booked as a miss by the caller
            ProjectileKind::Bonus => {}
        }
    }

    /// Restart the pity clock after a miss
    pub fn on_miss(&mut self, state: &mut GameState) {
        if state.misses > 0 {
            state.magic_countdown = state.magic_countdown_reset();
            state.force_magic = false;
        } else {
            state.magic_countdown = 0;
        }
    }

    /// Build a two-arc bonus flight aimed just above the receptacle
    fn launch_bonus(
        &self,
        hitbox: &ReceptacleHitbox,
        playfield: &PlayfieldTuning,
        rng: &mut impl Rng,
    ) -> Projectile {
        let b = &self.bonus;
        let from_left = rng.random_bool(0.5);
        let inset = b.launch_inset;
        let water_y = playfield.height + b.water_depth;
        let launch = Vec2::new(if from_left { inset } else { playfield.width - inset }, water_y);

        let jitter = rng.random_range(-b.apex_jitter..=b.apex_jitter);
        let apex = Vec2::new(
            (hitbox.center.x + jitter).clamp(inset, playfield.width - inset),
            hitbox.top() - b.apex_clearance,
        );
        // Control point straight below the apex: the fish swings in from the
        // side and rises vertically through the opening
        let ascend = BezierArc::new(
            launch,
            Vec2::new(apex.x, (launch.y + apex.y) * 0.5),
            apex,
            b.ascend_secs,
        );

        let direction = if from_left { 1.0 } else { -1.0 };
        let splash = Vec2::new(apex.x + direction * b.splash_offset, water_y);
        let descend = BezierArc::new(
            apex,
            Vec2::new((apex.x + splash.x) * 0.5, apex.y - b.descend_lift),
            splash,
            b.descend_secs,
        );

        log::debug!(
            "Fish launched from {} toward x={:.0}",
            if from_left { "left" } else { "right" },
            apex.x
        );
        Projectile::bonus(BonusFlight::new(ascend, descend))
    }
}
