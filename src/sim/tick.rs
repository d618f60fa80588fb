//! Frame-driven simulation tick
//!
//! [`Simulation`] is the one context object hosts own. Host frame time is
//! banked and replayed in fixed `SIM_DT` substeps, each running in a fixed
//! order: spawn -> integrate -> classify -> apply score/miss effects ->
//! difficulty feedback. Nothing is global, so any number of simulations can
//! coexist.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::{self, Contact, ReceptacleHitbox};
use super::difficulty::DifficultyController;
use super::projectiles::{ProjectileSimulator, Resolution};
use super::scheduler::EventScheduler;
use super::state::{GameEvent, GamePhase, GameState, Projectile, ProjectileKind, Snapshot};
use crate::clamp_dt;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::persistence::{BestScoreStore, MemoryBestStore};
use crate::tuning::Tuning;

/// Per-frame input from the host (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Receptacle center x after steering; `None` keeps the last position
    pub receptacle_x: Option<f32>,
    /// Steering lean, passed through to the snapshot for presentation
    pub steering_bias: f32,
}

#[derive(Debug)]
pub struct Simulation<S: BestScoreStore = MemoryBestStore> {
    tuning: Tuning,
    seed: u64,
    restarts: u64,
    rng: Pcg32,
    /// Simulation clock (seconds); only advances while playing
    clock: f64,
    /// Host time not yet consumed by a fixed substep
    accumulator: f32,
    state: GameState,
    difficulty: DifficultyController,
    scheduler: EventScheduler,
    projectiles: ProjectileSimulator,
    receptacle_x: f32,
    steering_bias: f32,
    events: Vec<GameEvent>,
    store: S,
}

impl Simulation<MemoryBestStore> {
    /// Default tuning, in-memory best score
    pub fn new(seed: u64) -> Self {
        Self::with_store(seed, Tuning::default(), MemoryBestStore::default())
    }
}

impl<S: BestScoreStore> Simulation<S> {
    pub fn with_store(seed: u64, tuning: Tuning, store: S) -> Self {
        let tuning = tuning.sanitized();
        let best = store.get();
        Self {
            tuning,
            seed,
            restarts: 0,
            rng: Pcg32::seed_from_u64(seed),
            clock: 0.0,
            accumulator: 0.0,
            state: GameState::new(&tuning.spawn, best),
            difficulty: DifficultyController::new(tuning.difficulty),
            scheduler: EventScheduler::new(tuning.spawn, tuning.bonus),
            projectiles: ProjectileSimulator::new(),
            receptacle_x: tuning.playfield.width / 2.0,
            steering_bias: 0.0,
            events: Vec::new(),
            store,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn difficulty(&self) -> &DifficultyController {
        &self.difficulty
    }

    pub fn scheduler(&self) -> &EventScheduler {
        &self.scheduler
    }

    pub fn projectiles(&self) -> &[Projectile] {
        self.projectiles.live()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Receptacle hitbox at the current steering position
    pub fn hitbox(&self) -> ReceptacleHitbox {
        let pf = &self.tuning.playfield;
        ReceptacleHitbox::new(
            Vec2::new(self.receptacle_x, pf.receptacle_y),
            pf.receptacle_half_width,
            pf.receptacle_half_height,
        )
    }

    /// Take one pending difficulty relaxation (for hosts that react to easing)
    pub fn consume_relaxation(&mut self) -> bool {
        self.difficulty.consume_relaxation()
    }

    /// Events queued since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            score: self.state.score,
            misses: self.state.misses,
            best: self.state.best,
            spawn_interval_ms: self.difficulty.spawn_interval(),
            phase: self.state.phase,
            fish_unlocked: self.state.fish_unlocked,
            steering_bias: self.steering_bias,
            live_projectiles: self.projectiles.len(),
            magic_countdown: self.state.magic_countdown,
            force_magic: self.state.force_magic,
        }
    }

    /// Ready -> Playing (no-op in any other phase)
    pub fn start(&mut self) {
        if self.state.phase == GamePhase::Ready {
            self.state.phase = GamePhase::Playing;
            log::info!("Run started (seed {})", self.seed);
        }
    }

    /// Fresh run from any phase, keeping the best score
    pub fn restart(&mut self) {
        self.restarts += 1;
        self.rng = Pcg32::seed_from_u64(self.seed.wrapping_add(self.restarts));
        self.clock = 0.0;
        self.accumulator = 0.0;
        self.state.restart();
        self.difficulty.reset(self.tuning.difficulty.initial_interval_ms);
        self.scheduler.reset();
        self.projectiles.clear();
        self.events.push(GameEvent::Restarted);
        log::info!("Restarted (run {})", self.restarts + 1);
    }

    /// Playing <-> Paused
    pub fn toggle_pause(&mut self) {
        let before = self.state.phase;
        match self.state.toggle_pause() {
            GamePhase::Paused if before == GamePhase::Playing => {
                self.events.push(GameEvent::Paused);
            }
            GamePhase::Playing if before == GamePhase::Paused => {
                self.events.push(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    /// Advance the simulation by `dt` seconds of host time
    ///
    /// Leftover time below one substep carries into the next call, so the
    /// same run plays out identically at any frame rate.
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        let dt = clamp_dt(dt);

        if let Some(x) = input.receptacle_x {
            if x.is_finite() {
                self.receptacle_x = x.clamp(0.0, self.tuning.playfield.width);
            }
        }
        self.steering_bias = if input.steering_bias.is_finite() {
            input.steering_bias
        } else {
            0.0
        };

        // Paused/over/ready: the clock stays frozen so nothing piles up
        if self.state.phase != GamePhase::Playing {
            return;
        }

        self.accumulator += dt;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.step();
            self.accumulator -= SIM_DT;
            substeps += 1;

            if self.state.phase != GamePhase::Playing {
                self.accumulator = 0.0;
                break;
            }
        }
    }

    fn step(&mut self) {
        self.clock += f64::from(SIM_DT);
        self.spawn();
        self.projectiles.tick(SIM_DT, self.tuning.physics.gravity);
        self.resolve();
    }

    fn spawn(&mut self) {
        let now = self.clock;
        let playfield = self.tuning.playfield;
        let hitbox = self.hitbox();

        let was_forced = self.state.force_magic && self.state.misses > 0;
        if let Some(item) = self.scheduler.maybe_spawn_standard(
            now,
            self.difficulty.spawn_interval(),
            &mut self.state,
            &playfield,
            &mut self.rng,
        ) {
            if was_forced && item.kind == ProjectileKind::Recovery {
                self.events.push(GameEvent::PityPayout);
            }
            self.events.push(GameEvent::Spawned(item.kind));
            self.projectiles.spawn(item);
        }

        let was_unlocked = self.state.fish_unlocked;
        let fish = self.scheduler.maybe_spawn_bonus(
            now,
            &mut self.state,
            &hitbox,
            &playfield,
            &mut self.rng,
        );
        if !was_unlocked && self.state.fish_unlocked {
            self.events.push(GameEvent::FishUnlocked);
        }
        if let Some(fish) = fish {
            debug_assert_eq!(self.projectiles.bonus_count(), 0);
            self.events.push(GameEvent::Spawned(ProjectileKind::Bonus));
            self.projectiles.spawn(fish);
        }
    }

    fn resolve(&mut self) {
        let hitbox = self.hitbox();
        let playfield = self.tuning.playfield;
        let bonus = self.tuning.bonus;
        let mut windows_closed = 0;

        let resolved = self.projectiles.resolve(|p| {
            let contact = collision::classify(p, &hitbox, &playfield, &bonus);
            if contact == Contact::None && collision::bonus_window_passed(p, &hitbox, &bonus) {
                if let Some(flight) = p.flight.as_mut() {
                    if flight.catchable() {
                        flight.close_window();
                        windows_closed += 1;
                    }
                }
            }
            contact
        });

        for _ in 0..windows_closed {
            self.events.push(GameEvent::BonusWindowClosed);
        }

        for Resolution { projectile, contact } in resolved {
            if self.state.phase != GamePhase::Playing {
                break;
            }
            self.apply(projectile.kind, contact);
        }
    }

    fn apply(&mut self, kind: ProjectileKind, contact: Contact) {
        let best_before = self.state.best;
        let spawn = self.tuning.spawn;
        let now = self.clock;

        let game_over = match (kind, contact) {
            (_, Contact::None) => false,
            (ProjectileKind::Standard | ProjectileKind::Recovery, Contact::Caught) => {
                self.events.push(GameEvent::Caught(kind));
                self.state.register_catch(
                    kind,
                    spawn.catch_points,
                    self.tuning.bonus.penalty,
                    &mut self.store,
                );
                if self.difficulty.tick(self.state.score) {
                    self.events.push(GameEvent::Relaxed);
                }
                self.scheduler.on_catch(kind, &mut self.state);
                false
            }
            (ProjectileKind::Bonus, Contact::Caught) => {
                self.events.push(GameEvent::Caught(kind));
                let over = self.state.register_catch(
                    kind,
                    spawn.catch_points,
                    self.tuning.bonus.penalty,
                    &mut self.store,
                );
                if self.difficulty.apply_mercy_relaxation(self.state.score) {
                    self.events.push(GameEvent::Relaxed);
                }
                self.scheduler.on_miss(&mut self.state);
                self.scheduler.on_bonus_resolved(now, &mut self.rng);
                over
            }
            (ProjectileKind::Standard | ProjectileKind::Recovery, Contact::Missed) => {
                self.events.push(GameEvent::Missed(kind));
                let over = self.state.register_miss();
                self.scheduler.on_miss(&mut self.state);
                over
            }
            (ProjectileKind::Bonus, Contact::Missed | Contact::Escaped) => {
                self.events.push(GameEvent::BonusSplashed);
                self.scheduler.on_bonus_resolved(now, &mut self.rng);
                false
            }
            (ProjectileKind::Standard | ProjectileKind::Recovery, Contact::Escaped) => false,
        };

        if self.state.best > best_before {
            self.events.push(GameEvent::NewBest(self.state.best));
        }

        if game_over {
            self.projectiles.clear();
            self.scheduler.reset();
            self.events.push(GameEvent::GameOver);
        } else if self
            .scheduler
            .maybe_unlock(now, &mut self.state, &mut self.rng)
        {
            self.events.push(GameEvent::FishUnlocked);
        }
    }
}
