//! Data-driven game balance
//!
//! Every number the simulation reads comes from a [`Tuning`]. Defaults live in
//! [`crate::consts`]; a JSON document can override any subset of fields.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Playfield and receptacle geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayfieldTuning {
    pub width: f32,
    pub height: f32,
    pub miss_margin: f32,
    pub receptacle_y: f32,
    pub receptacle_half_width: f32,
    pub receptacle_half_height: f32,
}

impl Default for PlayfieldTuning {
    fn default() -> Self {
        Self {
            width: PLAYFIELD_WIDTH,
            height: PLAYFIELD_HEIGHT,
            miss_margin: MISS_MARGIN,
            receptacle_y: RECEPTACLE_Y,
            receptacle_half_width: RECEPTACLE_HALF_WIDTH,
            receptacle_half_height: RECEPTACLE_HALF_HEIGHT,
        }
    }
}

/// Free-fall physics for standard and recovery items
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    pub gravity: f32,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self { gravity: GRAVITY }
    }
}

/// Spawn interval curve and relaxation knobs (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    pub initial_interval_ms: f32,
    pub min_interval_ms: f32,
    pub max_interval_ms: f32,
    pub fast_step_ms: f32,
    pub slow_step_ms: f32,
    pub regime_threshold_ms: f32,
    pub relax_score_step: u64,
    pub relax_epsilon_ms: f32,
    pub relax_headroom_ms: f32,
    pub relax_floor_ms: f32,
    pub relax_tighten_score: u64,
    pub relax_blend: f32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            initial_interval_ms: INITIAL_SPAWN_INTERVAL_MS,
            min_interval_ms: MIN_SPAWN_INTERVAL_MS,
            max_interval_ms: MAX_SPAWN_INTERVAL_MS,
            fast_step_ms: FAST_TIGHTEN_STEP_MS,
            slow_step_ms: SLOW_TIGHTEN_STEP_MS,
            regime_threshold_ms: TIGHTEN_REGIME_THRESHOLD_MS,
            relax_score_step: RELAX_SCORE_STEP,
            relax_epsilon_ms: RELAX_EPSILON_MS,
            relax_headroom_ms: RELAX_HEADROOM_MS,
            relax_floor_ms: RELAX_FLOOR_MS,
            relax_tighten_score: RELAX_TIGHTEN_SCORE,
            relax_blend: RELAX_BLEND,
        }
    }
}

/// Item spawning, scoring and the recovery pity timer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    pub spawn_y: f32,
    pub initial_fall_speed: f32,
    pub max_drift: f32,
    pub edge_margin: f32,
    pub catch_points: i64,
    pub max_misses: u32,
    pub recovery_chance: f64,
    pub magic_countdown: u32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            spawn_y: ITEM_SPAWN_Y,
            initial_fall_speed: ITEM_INITIAL_FALL_SPEED,
            max_drift: ITEM_MAX_DRIFT,
            edge_margin: SPAWN_EDGE_MARGIN,
            catch_points: CATCH_POINTS,
            max_misses: MAX_MISSES,
            recovery_chance: RECOVERY_CHANCE,
            magic_countdown: MAGIC_COUNTDOWN,
        }
    }
}

/// Bonus event ("fish") timing and geometry
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusTuning {
    pub unlock_score: u64,
    pub arrival_min: f32,
    pub arrival_max: f32,
    pub ascend_secs: f32,
    pub descend_secs: f32,
    pub launch_inset: f32,
    pub water_depth: f32,
    pub apex_clearance: f32,
    pub apex_jitter: f32,
    pub descend_lift: f32,
    pub splash_offset: f32,
    pub hit_radius: f32,
    pub catch_band: f32,
    pub penalty: i64,
}

impl Default for BonusTuning {
    fn default() -> Self {
        Self {
            unlock_score: FISH_UNLOCK_SCORE,
            arrival_min: FISH_ARRIVAL_MIN,
            arrival_max: FISH_ARRIVAL_MAX,
            ascend_secs: FISH_ASCEND_SECS,
            descend_secs: FISH_DESCEND_SECS,
            launch_inset: FISH_LAUNCH_INSET,
            water_depth: FISH_WATER_DEPTH,
            apex_clearance: FISH_APEX_CLEARANCE,
            apex_jitter: FISH_APEX_JITTER,
            descend_lift: FISH_DESCEND_LIFT,
            splash_offset: FISH_SPLASH_OFFSET,
            hit_radius: FISH_HIT_RADIUS,
            catch_band: FISH_CATCH_BAND,
            penalty: BONUS_PENALTY,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub playfield: PlayfieldTuning,
    pub physics: PhysicsTuning,
    pub difficulty: DifficultyTuning,
    pub spawn: SpawnTuning,
    pub bonus: BonusTuning,
}

/// Non-finite or negative values collapse to `fallback`
fn non_negative(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        fallback
    }
}

/// Non-finite or non-positive values collapse to `fallback`
fn positive(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON balance document and sanitize it
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Serialize to pretty JSON (for dumping the active table)
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load a balance file, falling back to defaults on any failure
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Bad tuning file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read tuning file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Clamp every field into a range the simulation can run with
    pub fn sanitized(mut self) -> Self {
        let defaults = Tuning::default();

        let p = &mut self.playfield;
        p.width = positive(p.width, defaults.playfield.width);
        p.height = positive(p.height, defaults.playfield.height);
        p.miss_margin = non_negative(p.miss_margin, defaults.playfield.miss_margin);
        p.receptacle_half_width =
            positive(p.receptacle_half_width, defaults.playfield.receptacle_half_width);
        p.receptacle_half_height =
            positive(p.receptacle_half_height, defaults.playfield.receptacle_half_height);
        if !p.receptacle_y.is_finite() {
            p.receptacle_y = defaults.playfield.receptacle_y;
        }

        self.physics.gravity = non_negative(self.physics.gravity, defaults.physics.gravity);

        let d = &mut self.difficulty;
        d.min_interval_ms = positive(d.min_interval_ms, defaults.difficulty.min_interval_ms);
        d.max_interval_ms =
            positive(d.max_interval_ms, defaults.difficulty.max_interval_ms).max(d.min_interval_ms);
        d.initial_interval_ms = if d.initial_interval_ms.is_finite() {
            d.initial_interval_ms.clamp(d.min_interval_ms, d.max_interval_ms)
        } else {
            d.max_interval_ms
        };
        d.fast_step_ms = non_negative(d.fast_step_ms, defaults.difficulty.fast_step_ms);
        d.slow_step_ms = non_negative(d.slow_step_ms, defaults.difficulty.slow_step_ms);
        d.relax_epsilon_ms = non_negative(d.relax_epsilon_ms, defaults.difficulty.relax_epsilon_ms);
        d.relax_headroom_ms =
            non_negative(d.relax_headroom_ms, defaults.difficulty.relax_headroom_ms);
        d.relax_floor_ms = non_negative(d.relax_floor_ms, defaults.difficulty.relax_floor_ms)
            .clamp(d.min_interval_ms, d.max_interval_ms);
        d.relax_score_step = d.relax_score_step.max(1);
        d.relax_tighten_score = d.relax_tighten_score.max(1);
        d.relax_blend = non_negative(d.relax_blend, defaults.difficulty.relax_blend).min(1.0);

        let s = &mut self.spawn;
        s.max_drift = non_negative(s.max_drift, defaults.spawn.max_drift);
        s.edge_margin = non_negative(s.edge_margin, defaults.spawn.edge_margin)
            .min(self.playfield.width / 2.0);
        if !s.spawn_y.is_finite() {
            s.spawn_y = defaults.spawn.spawn_y;
        }
        if !s.initial_fall_speed.is_finite() {
            s.initial_fall_speed = defaults.spawn.initial_fall_speed;
        }
        s.max_misses = s.max_misses.max(1);
        s.recovery_chance = if s.recovery_chance.is_finite() {
            s.recovery_chance.clamp(0.0, 1.0)
        } else {
            defaults.spawn.recovery_chance
        };
        s.magic_countdown = s.magic_countdown.max(1);

        let b = &mut self.bonus;
        b.arrival_min = non_negative(b.arrival_min, defaults.bonus.arrival_min);
        b.arrival_max = non_negative(b.arrival_max, defaults.bonus.arrival_max).max(b.arrival_min);
        b.ascend_secs = positive(b.ascend_secs, defaults.bonus.ascend_secs);
        b.descend_secs = positive(b.descend_secs, defaults.bonus.descend_secs);
        b.launch_inset = non_negative(b.launch_inset, defaults.bonus.launch_inset)
            .min(self.playfield.width / 2.0);
        b.apex_jitter = non_negative(b.apex_jitter, defaults.bonus.apex_jitter);
        b.hit_radius = non_negative(b.hit_radius, defaults.bonus.hit_radius);
        b.catch_band = non_negative(b.catch_band, defaults.bonus.catch_band);
        b.penalty = b.penalty.max(0);

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_already_sane() {
        let tuning = Tuning::default();
        assert_eq!(tuning.sanitized(), tuning);
    }

    #[test]
    fn test_partial_json_overrides_only_named_fields() {
        let json = r#"{ "spawn": { "magic_countdown": 3 }, "bonus": { "unlock_score": 100 } }"#;
        let tuning = Tuning::from_json(json).unwrap();
        assert_eq!(tuning.spawn.magic_countdown, 3);
        assert_eq!(tuning.bonus.unlock_score, 100);
        assert_eq!(tuning.difficulty, DifficultyTuning::default());
        assert_eq!(tuning.spawn.max_misses, MAX_MISSES);
    }

    #[test]
    fn test_sanitize_orders_interval_bounds() {
        let json = r#"{ "difficulty": { "min_interval_ms": 900, "max_interval_ms": 400, "initial_interval_ms": 5000 } }"#;
        let tuning = Tuning::from_json(json).unwrap();
        let d = tuning.difficulty;
        assert!(d.min_interval_ms <= d.initial_interval_ms);
        assert!(d.initial_interval_ms <= d.max_interval_ms);
        assert_eq!(d.min_interval_ms, 900.0);
    }

    #[test]
    fn test_sanitize_clamps_probabilities_and_ranges() {
        let json = r#"{
            "spawn": { "recovery_chance": 3.5, "magic_countdown": 0 },
            "bonus": { "arrival_min": 20, "arrival_max": 5, "ascend_secs": -1 }
        }"#;
        let tuning = Tuning::from_json(json).unwrap();
        assert_eq!(tuning.spawn.recovery_chance, 1.0);
        assert_eq!(tuning.spawn.magic_countdown, 1);
        assert!(tuning.bonus.arrival_max >= tuning.bonus.arrival_min);
        assert_eq!(tuning.bonus.ascend_secs, FISH_ASCEND_SECS);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_json_roundtrip_of_defaults() {
        let json = Tuning::default().to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), Tuning::default());
    }
}
