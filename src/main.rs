//! Catchfall headless runner
//!
//! Drives the simulation with a simple autopilot and logs what happens.
//! Usage: `catchfall [seconds] [tuning.json]`. Set `CATCHFALL_BEST` to a file
//! path to persist the best score between runs.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use catchfall::sim::{GameEvent, GamePhase, ProjectileKind, Simulation, TickInput};
    use catchfall::{BestScoreStore, MemoryBestStore, Tuning};

    /// Frame step of the pretend display
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Receptacle steering speed (pixels per second)
    const STEER_SPEED: f32 = 600.0;

    /// Chase the lowest falling item, keep clear of a catchable fish
    fn autopilot<S: BestScoreStore>(sim: &Simulation<S>, current_x: f32) -> TickInput {
        let hitbox = sim.hitbox();

        let fish_x = sim
            .projectiles()
            .iter()
            .filter(|p| p.kind == ProjectileKind::Bonus)
            .filter(|p| p.flight.as_ref().is_some_and(|f| f.catchable()))
            .map(|p| p.pos.x)
            .next();

        let target = match fish_x {
            Some(x) if (x - current_x).abs() < hitbox.half_width * 3.0 => {
                let width = sim.tuning().playfield.width;
                if x > width / 2.0 { 0.0 } else { width }
            }
            _ => sim
                .projectiles()
                .iter()
                .filter(|p| p.kind != ProjectileKind::Bonus && p.vel.y > 0.0)
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|p| p.pos.x)
                .unwrap_or(current_x),
        };

        let max_step = STEER_SPEED * FRAME_DT;
        let delta = (target - current_x).clamp(-max_step, max_step);
        TickInput {
            receptacle_x: Some(current_x + delta),
            steering_bias: (delta / max_step).clamp(-1.0, 1.0),
        }
    }

    fn run<S: BestScoreStore>(mut sim: Simulation<S>, seconds: f32) {
        sim.start();
        let frames = (seconds / FRAME_DT).ceil() as u32;
        let mut x = sim.hitbox().center.x;
        let mut runs = 1;

        for _ in 0..frames {
            let input = autopilot(&sim, x);
            x = input.receptacle_x.unwrap_or(x);
            sim.tick(&input, FRAME_DT);

            for event in sim.drain_events() {
                match event {
                    GameEvent::Spawned(_) | GameEvent::Caught(ProjectileKind::Standard) => {
                        log::debug!("{:?}", event)
                    }
                    GameEvent::NewBest(best) => log::info!("New best: {}", best),
                    other => log::info!("{:?} (t={:.1}s)", other, sim.clock()),
                }
            }

            if sim.phase() == GamePhase::GameOver {
                let snap = sim.snapshot();
                log::info!("Run {} over with {} points", runs, snap.score);
                runs += 1;
                sim.restart();
            }
        }

        match serde_json::to_string_pretty(&sim.snapshot()) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Could not serialize snapshot: {}", e),
        }
    }

    pub fn main() {
        env_logger::init();
        log::info!("Catchfall (native) starting...");

        let mut args = std::env::args().skip(1);
        let seconds = args
            .next()
            .and_then(|s| s.parse::<f32>().ok())
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(120.0);
        let tuning = args
            .next()
            .map(|path| Tuning::load(std::path::Path::new(&path)))
            .unwrap_or_default();

        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        log::info!("Seed {}, simulating {:.0}s", seed, seconds);

        match std::env::var("CATCHFALL_BEST") {
            Ok(path) => {
                let store = catchfall::persistence::JsonFileBestStore::open(path);
                run(Simulation::with_store(seed, tuning, store), seconds);
            }
            Err(_) => run(
                Simulation::with_store(seed, tuning, MemoryBestStore::default()),
                seconds,
            ),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::main();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly; nothing to run here
}
