//! Spawn interval controller
//!
//! Every scored catch tightens the spawn interval: quickly while the game is
//! still easy, barely once it is hard. Score milestones (and penalties) ease it
//! back up, but never past a ceiling that keeps most of the earned progress.

use serde::{Deserialize, Serialize};

use crate::lerp;
use crate::tuning::DifficultyTuning;

/// Mutable difficulty values (all intervals in milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyState {
    pub spawn_interval: f32,
    /// Historical minimum of `spawn_interval`
    pub best_interval: f32,
    pub next_relaxation_score: u64,
    pub pending_relaxations: u32,
}

#[derive(Debug, Clone)]
pub struct DifficultyController {
    tuning: DifficultyTuning,
    state: DifficultyState,
}

impl DifficultyController {
    pub fn new(tuning: DifficultyTuning) -> Self {
        let interval = tuning
            .initial_interval_ms
            .clamp(tuning.min_interval_ms, tuning.max_interval_ms);
        Self {
            tuning,
            state: DifficultyState {
                spawn_interval: interval,
                best_interval: interval,
                next_relaxation_score: tuning.relax_score_step,
                pending_relaxations: 0,
            },
        }
    }

    /// Back to a fresh run at `initial_interval` (clamped into bounds)
    pub fn reset(&mut self, initial_interval: f32) {
        let interval = self.clamp_interval(initial_interval);
        self.state = DifficultyState {
            spawn_interval: interval,
            best_interval: interval,
            next_relaxation_score: self.tuning.relax_score_step,
            pending_relaxations: 0,
        };
    }

    pub fn state(&self) -> &DifficultyState {
        &self.state
    }

    pub fn spawn_interval(&self) -> f32 {
        self.state.spawn_interval
    }

    pub fn best_interval(&self) -> f32 {
        self.state.best_interval
    }

    fn clamp_interval(&self, interval: f32) -> f32 {
        interval.clamp(self.tuning.min_interval_ms, self.tuning.max_interval_ms)
    }

    /// Tighten after a scored catch, then relax if a milestone was reached
    ///
    /// Returns true if a relaxation was applied.
    pub fn tick(&mut self, score: u64) -> bool {
        let t = &self.tuning;
        let step = if self.state.spawn_interval > t.regime_threshold_ms {
            t.fast_step_ms
        } else {
            t.slow_step_ms
        };
        self.state.spawn_interval = self.clamp_interval(self.state.spawn_interval - step);

        let mut relaxed = false;
        if score >= self.state.next_relaxation_score && self.relax(score) {
            self.state.next_relaxation_score += self.tuning.relax_score_step;
            relaxed = true;
            log::debug!(
                "Milestone relaxation at score {}: interval {:.0}ms",
                score,
                self.state.spawn_interval
            );
        }

        self.state.best_interval = self.state.best_interval.min(self.state.spawn_interval);
        relaxed
    }

    /// Highest interval a relaxation may ease toward at this score
    ///
    /// The score cap slides from the max interval down to the floor as the
    /// run matures; the progress cap keeps relaxation within a fixed headroom
    /// of the hardest interval reached.
    pub fn relaxation_ceiling(&self, score: u64) -> f32 {
        let t = &self.tuning;
        let maturity = (score as f32 / t.relax_tighten_score as f32).clamp(0.0, 1.0);
        let score_cap = lerp(t.max_interval_ms, t.relax_floor_ms, maturity);
        let progress_cap = t
            .min_interval_ms
            .max(self.state.best_interval + t.relax_headroom_ms);
        self.clamp_interval(score_cap.min(progress_cap))
    }

    /// One-off easing after a punishing event (bonus mis-catch)
    pub fn apply_mercy_relaxation(&mut self, score: u64) -> bool {
        let relaxed = self.relax(score);
        if relaxed {
            log::debug!(
                "Mercy relaxation: interval {:.0}ms",
                self.state.spawn_interval
            );
        }
        relaxed
    }

    /// Take one pending relaxation, if any
    pub fn consume_relaxation(&mut self) -> bool {
        if self.state.pending_relaxations > 0 {
            self.state.pending_relaxations -= 1;
            true
        } else {
            false
        }
    }

    /// Ease toward the ceiling; only ever makes the game easier
    fn relax(&mut self, score: u64) -> bool {
        let current = self.state.spawn_interval;
        if current > self.state.best_interval + self.tuning.relax_epsilon_ms {
            // Already eased and not yet tightened back down
            return false;
        }
        let ceiling = self.relaxation_ceiling(score);
        let target = lerp(current, ceiling, self.tuning.relax_blend);
        self.state.spawn_interval = self.clamp_interval(current.max(target));
        self.state.pending_relaxations += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn controller() -> DifficultyController {
        DifficultyController::new(DifficultyTuning::default())
    }

    #[test]
    fn test_first_catch_takes_fast_step() {
        let mut d = controller();
        assert_eq!(d.spawn_interval(), 2000.0);
        d.tick(10);
        assert_eq!(d.spawn_interval(), 2000.0 - DifficultyTuning::default().fast_step_ms);
        assert!(d.spawn_interval() > 500.0);
    }

    #[test]
    fn test_slow_regime_below_threshold() {
        let mut d = controller();
        d.reset(500.0);
        d.tick(0);
        assert_eq!(d.spawn_interval(), 500.0 - DifficultyTuning::default().slow_step_ms);
    }

    #[test]
    fn test_interval_floors_at_min() {
        let mut d = controller();
        for _ in 0..2000 {
            d.tick(0);
        }
        assert_eq!(d.spawn_interval(), DifficultyTuning::default().min_interval_ms);
    }

    #[test]
    fn test_reset_clamps() {
        let mut d = controller();
        d.reset(99_999.0);
        assert_eq!(d.spawn_interval(), DifficultyTuning::default().max_interval_ms);
        d.reset(1.0);
        assert_eq!(d.spawn_interval(), DifficultyTuning::default().min_interval_ms);
    }

    #[test]
    fn test_milestone_relaxation_advances_threshold() {
        let mut d = controller();
        d.reset(1000.0);
        assert!(d.tick(150));
        assert!(d.spawn_interval() > 1000.0 - 40.0);
        assert!(d.spawn_interval() <= d.relaxation_ceiling(150));
        assert_eq!(d.state().next_relaxation_score, 300);
        assert_eq!(d.state().pending_relaxations, 1);
        assert!(d.consume_relaxation());
        assert!(!d.consume_relaxation());
    }

    #[test]
    fn test_no_relaxation_while_already_eased() {
        let mut d = controller();
        d.reset(1000.0);
        assert!(d.tick(150));
        // Interval is now above best + epsilon; next milestone must wait
        assert!(!d.tick(300));
        assert_eq!(d.state().next_relaxation_score, 300);
    }

    #[test]
    fn test_ceiling_respects_headroom() {
        let mut d = controller();
        d.reset(600.0);
        let t = DifficultyTuning::default();
        assert_eq!(d.relaxation_ceiling(0), 600.0 + t.relax_headroom_ms);
        // Late game the score cap wins
        d.reset(t.max_interval_ms);
        assert_eq!(d.relaxation_ceiling(t.relax_tighten_score * 2), t.relax_floor_ms);
    }

    #[test]
    fn test_mercy_relaxation_never_tightens() {
        let mut d = controller();
        d.reset(400.0);
        let before = d.spawn_interval();
        assert!(d.apply_mercy_relaxation(0));
        assert!(d.spawn_interval() >= before);
        assert!(d.spawn_interval() <= d.relaxation_ceiling(0));
    }

    proptest! {
        #[test]
        fn prop_interval_stays_in_bounds(scores in proptest::collection::vec(0u64..5000, 1..300)) {
            let t = DifficultyTuning::default();
            let mut d = controller();
            let mut last_best = d.best_interval();
            for (i, score) in scores.iter().enumerate() {
                if i % 7 == 0 {
                    d.apply_mercy_relaxation(*score);
                } else {
                    d.tick(*score);
                }
                prop_assert!(d.spawn_interval() >= t.min_interval_ms);
                prop_assert!(d.spawn_interval() <= t.max_interval_ms);
                prop_assert!(d.best_interval() <= last_best);
                last_best = d.best_interval();
            }
        }

        #[test]
        fn prop_relaxation_respects_ceiling(start in 350.0f32..2000.0, score in 0u64..5000) {
            let mut d = controller();
            d.reset(start);
            let before = d.spawn_interval();
            let ceiling = d.relaxation_ceiling(score);
            d.apply_mercy_relaxation(score);
            prop_assert!(d.spawn_interval() >= before);
            prop_assert!(d.spawn_interval() <= before.max(ceiling) + 0.001);
        }

        #[test]
        fn prop_milestone_relaxation_respects_ceiling(
            start in 350.0f32..2000.0,
            warmup in 0usize..60,
            score in 150u64..5000,
        ) {
            let mut d = controller();
            d.reset(start);
            // Tighten below the first milestone so best and current diverge from start
            for _ in 0..warmup {
                d.tick(0);
            }
            let before = d.spawn_interval();
            let ceiling = d.relaxation_ceiling(score);
            let relaxed = d.tick(score);
            prop_assert!(d.spawn_interval() <= before.max(ceiling) + 0.001);
            if relaxed {
                prop_assert_eq!(d.state().pending_relaxations, 1);
            }
        }
    }
}
