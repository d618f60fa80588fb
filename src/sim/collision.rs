//! Catch and miss detection
//!
//! Pure geometric predicates: nothing here mutates a projectile. The receptacle
//! is an axis-aligned box whose opening faces up (screen y grows downward, so
//! "descending" means positive vertical velocity).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Projectile, ProjectileKind};
use crate::tuning::{BonusTuning, PlayfieldTuning};

/// The receptacle's catch box for this tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReceptacleHitbox {
    pub center: Vec2,
    pub half_width: f32,
    pub half_height: f32,
}

impl ReceptacleHitbox {
    pub fn new(center: Vec2, half_width: f32, half_height: f32) -> Self {
        Self {
            center,
            half_width,
            half_height,
        }
    }

    /// Screen y of the opening (upper edge)
    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y - self.half_height
    }

    /// Point lies inside the half-extent window
    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        let d = (point - self.center).abs();
        d.x <= self.half_width && d.y <= self.half_height
    }
}

/// Classification of a projectile this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    None,
    /// Entered the receptacle
    Caught,
    /// Fell past the bottom of the playfield
    Missed,
    /// Left play without consequence (drifted off the side, bonus splashdown)
    Escaped,
}

/// Standard/Recovery catch: inside the box and moving down into the opening
pub fn item_caught(projectile: &Projectile, hitbox: &ReceptacleHitbox) -> bool {
    hitbox.contains(projectile.pos) && projectile.vel.y > 0.0
}

/// Fell past the bottom margin, regardless of x
pub fn item_missed(projectile: &Projectile, playfield: &PlayfieldTuning) -> bool {
    projectile.pos.y > playfield.height + playfield.miss_margin
}

/// Drifted off either side of the playfield
pub fn item_out_of_bounds(projectile: &Projectile, playfield: &PlayfieldTuning) -> bool {
    projectile.pos.x < -playfield.miss_margin
        || projectile.pos.x > playfield.width + playfield.miss_margin
}

/// Bonus catch: close to the box center, over the opening, at opening height
///
/// Only meaningful while the flight's catch window is open during ascend.
pub fn bonus_caught(projectile: &Projectile, hitbox: &ReceptacleHitbox, bonus: &BonusTuning) -> bool {
    let offset = projectile.pos - hitbox.center;
    offset.length() <= bonus.hit_radius
        && offset.x.abs() <= hitbox.half_width
        && (projectile.pos.y - hitbox.top()).abs() <= bonus.catch_band
}

/// Bonus has risen above the catch band over the opening
pub fn bonus_window_passed(projectile: &Projectile, hitbox: &ReceptacleHitbox, bonus: &BonusTuning) -> bool {
    projectile.pos.y < hitbox.top() - bonus.catch_band
}

/// Decide what happened to a projectile this tick
pub fn classify(
    projectile: &Projectile,
    hitbox: &ReceptacleHitbox,
    playfield: &PlayfieldTuning,
    bonus: &BonusTuning,
) -> Contact {
    match projectile.kind {
        ProjectileKind::Standard | ProjectileKind::Recovery => {
            if item_caught(projectile, hitbox) {
                Contact::Caught
            } else if item_missed(projectile, playfield) {
                Contact::Missed
            } else if item_out_of_bounds(projectile, playfield) {
                Contact::Escaped
            } else {
                Contact::None
            }
        }
        ProjectileKind::Bonus => match &projectile.flight {
            Some(flight) if flight.catchable() && bonus_caught(projectile, hitbox, bonus) => {
                Contact::Caught
            }
            Some(flight) if !flight.finished => Contact::None,
            // Splashed down, or a bonus without a flight (never scheduled that way)
            _ => Contact::Escaped,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bezier::{BezierArc, BonusFlight};

    fn hitbox() -> ReceptacleHitbox {
        ReceptacleHitbox::new(Vec2::new(240.0, 720.0), 48.0, 24.0)
    }

    fn item(pos: Vec2, vel: Vec2) -> Projectile {
        Projectile::item(ProjectileKind::Standard, pos, vel)
    }

    fn bonus_at(pos: Vec2) -> Projectile {
        let arc = BezierArc::new(pos, pos, pos, 1.0);
        let mut p = Projectile::bonus(BonusFlight::new(arc, arc));
        p.pos = pos;
        p
    }

    #[test]
    fn test_descending_item_inside_box_is_caught() {
        let p = item(Vec2::new(250.0, 710.0), Vec2::new(0.0, 300.0));
        assert!(item_caught(&p, &hitbox()));
        assert_eq!(
            classify(&p, &hitbox(), &PlayfieldTuning::default(), &BonusTuning::default()),
            Contact::Caught
        );
    }

    #[test]
    fn test_rising_item_cannot_be_caught() {
        let p = item(Vec2::new(250.0, 710.0), Vec2::new(0.0, -50.0));
        assert!(!item_caught(&p, &hitbox()));
    }

    #[test]
    fn test_item_outside_half_width_is_not_caught() {
        let p = item(Vec2::new(240.0 + 49.0, 720.0), Vec2::new(0.0, 300.0));
        assert!(!item_caught(&p, &hitbox()));
    }

    #[test]
    fn test_miss_ignores_x() {
        let playfield = PlayfieldTuning::default();
        let below = playfield.height + playfield.miss_margin + 1.0;
        assert!(item_missed(&item(Vec2::new(10.0, below), Vec2::Y), &playfield));
        assert!(item_missed(&item(Vec2::new(470.0, below), Vec2::Y), &playfield));
        assert!(!item_missed(&item(Vec2::new(240.0, playfield.height), Vec2::Y), &playfield));
    }

    #[test]
    fn test_sideways_exit_escapes() {
        let playfield = PlayfieldTuning::default();
        let p = item(Vec2::new(-100.0, 300.0), Vec2::new(-40.0, 100.0));
        assert_eq!(
            classify(&p, &hitbox(), &playfield, &BonusTuning::default()),
            Contact::Escaped
        );
    }

    #[test]
    fn test_bonus_catch_band() {
        let bonus = BonusTuning::default();
        let hb = hitbox();
        // At the opening, over the center
        assert!(bonus_caught(&bonus_at(Vec2::new(240.0, hb.top())), &hb, &bonus));
        // Too high above the opening
        assert!(!bonus_caught(&bonus_at(Vec2::new(240.0, hb.top() - 40.0)), &hb, &bonus));
        // Beside the box
        assert!(!bonus_caught(&bonus_at(Vec2::new(240.0 + 50.0, hb.top())), &hb, &bonus));
    }

    #[test]
    fn test_bonus_window_passed() {
        let bonus = BonusTuning::default();
        let hb = hitbox();
        assert!(!bonus_window_passed(&bonus_at(Vec2::new(240.0, hb.top())), &hb, &bonus));
        assert!(bonus_window_passed(
            &bonus_at(Vec2::new(240.0, hb.top() - bonus.catch_band - 1.0)),
            &hb,
            &bonus
        ));
    }

    #[test]
    fn test_closed_bonus_window_is_not_caught() {
        let bonus = BonusTuning::default();
        let hb = hitbox();
        let mut p = bonus_at(Vec2::new(240.0, hb.top()));
        assert_eq!(classify(&p, &hb, &PlayfieldTuning::default(), &bonus), Contact::Caught);
        if let Some(flight) = p.flight.as_mut() {
            flight.close_window();
        }
        assert_eq!(classify(&p, &hb, &PlayfieldTuning::default(), &bonus), Contact::None);
    }

    #[test]
    fn test_finished_bonus_escapes() {
        let mut p = bonus_at(Vec2::new(0.0, 0.0));
        if let Some(flight) = p.flight.as_mut() {
            flight.advance(5.0);
        }
        assert_eq!(
            classify(&p, &hitbox(), &PlayfieldTuning::default(), &BonusTuning::default()),
            Contact::Escaped
        );
    }
}
