//! Bézier arc geometry for the bonus flight
//!
//! A bonus projectile does not free-fall. Its path is two quadratic arcs:
//! - ascend: side launch point -> apex just above the receptacle
//! - descend: apex -> splash point further along the same direction
//!
//! Position is a function of time spent in the current arc, never integrated.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{quadratic_bezier, quadratic_bezier_tangent};

/// A timed quadratic Bézier segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BezierArc {
    pub start: Vec2,
    pub control: Vec2,
    pub end: Vec2,
    /// Seconds to traverse the whole arc
    pub duration: f32,
}

impl BezierArc {
    pub fn new(start: Vec2, control: Vec2, end: Vec2, duration: f32) -> Self {
        Self {
            start,
            control,
            end,
            duration: duration.max(f32::EPSILON),
        }
    }

    /// Curve parameter for a time offset into the arc, clamped to [0, 1]
    #[inline]
    pub fn progress(&self, time: f32) -> f32 {
        (time / self.duration).clamp(0.0, 1.0)
    }

    /// Position at curve parameter `t`
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec2 {
        quadratic_bezier(self.start, self.control, self.end, t)
    }

    /// Velocity (units per second) at curve parameter `t`
    #[inline]
    pub fn velocity_at(&self, t: f32) -> Vec2 {
        quadratic_bezier_tangent(self.start, self.control, self.end, t) / self.duration
    }
}

/// Which arc of the bonus flight is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusPhase {
    Ascend,
    Descend,
}

/// Flight state carried by a bonus projectile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BonusFlight {
    pub ascend: BezierArc,
    pub descend: BezierArc,
    pub phase: BonusPhase,
    /// Seconds elapsed in the current phase
    pub phase_time: f32,
    /// One-shot catch opportunity; closes for good once the apex side of the
    /// receptacle opening is crossed
    pub window_open: bool,
    /// Descend arc completed (splashed down)
    pub finished: bool,
}

impl BonusFlight {
    pub fn new(ascend: BezierArc, descend: BezierArc) -> Self {
        Self {
            ascend,
            descend,
            phase: BonusPhase::Ascend,
            phase_time: 0.0,
            window_open: true,
            finished: false,
        }
    }

    fn active_arc(&self) -> &BezierArc {
        match self.phase {
            BonusPhase::Ascend => &self.ascend,
            BonusPhase::Descend => &self.descend,
        }
    }

    /// Advance flight time, rolling over from ascend into descend
    pub fn advance(&mut self, dt: f32) {
        if self.finished {
            return;
        }
        self.phase_time += dt;
        if self.phase == BonusPhase::Ascend && self.phase_time >= self.ascend.duration {
            self.phase_time -= self.ascend.duration;
            self.phase = BonusPhase::Descend;
        }
        if self.phase == BonusPhase::Descend && self.phase_time >= self.descend.duration {
            self.phase_time = self.descend.duration;
            self.finished = true;
        }
    }

    pub fn position(&self) -> Vec2 {
        let arc = self.active_arc();
        arc.point_at(arc.progress(self.phase_time))
    }

    pub fn velocity(&self) -> Vec2 {
        let arc = self.active_arc();
        arc.velocity_at(arc.progress(self.phase_time))
    }

    pub fn close_window(&mut self) {
        self.window_open = false;
    }

    /// True while a catch is still possible
    pub fn catchable(&self) -> bool {
        self.window_open && self.phase == BonusPhase::Ascend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight() -> BonusFlight {
        let apex = Vec2::new(240.0, 600.0);
        let ascend = BezierArc::new(Vec2::new(20.0, 830.0), Vec2::new(240.0, 715.0), apex, 1.0);
        let descend = BezierArc::new(apex, Vec2::new(320.0, 540.0), Vec2::new(400.0, 830.0), 2.0);
        BonusFlight::new(ascend, descend)
    }

    #[test]
    fn test_arc_progress_clamps() {
        let arc = BezierArc::new(Vec2::ZERO, Vec2::ONE, Vec2::X, 0.5);
        assert_eq!(arc.progress(-1.0), 0.0);
        assert_eq!(arc.progress(0.25), 0.5);
        assert_eq!(arc.progress(3.0), 1.0);
    }

    #[test]
    fn test_zero_duration_is_guarded() {
        let arc = BezierArc::new(Vec2::ZERO, Vec2::ONE, Vec2::X, 0.0);
        assert!(arc.duration > 0.0);
        assert!(arc.velocity_at(0.5).is_finite());
    }

    #[test]
    fn test_arc_hits_endpoints() {
        let arc = BezierArc::new(Vec2::ZERO, Vec2::new(5.0, 10.0), Vec2::new(10.0, 0.0), 1.0);
        assert!(arc.point_at(0.0).distance(arc.start) < 0.001);
        assert!(arc.point_at(1.0).distance(arc.end) < 0.001);
    }

    #[test]
    fn test_flight_phases() {
        let mut f = flight();
        assert_eq!(f.phase, BonusPhase::Ascend);
        assert!(f.position().distance(Vec2::new(20.0, 830.0)) < 0.001);
        // Ascend moves upward (screen y decreasing)
        assert!(f.velocity().y < 0.0);

        f.advance(1.25);
        assert_eq!(f.phase, BonusPhase::Descend);
        assert!((f.phase_time - 0.25).abs() < 0.0001);
        assert!(!f.finished);

        f.advance(2.0);
        assert!(f.finished);
        assert!(f.position().distance(Vec2::new(400.0, 830.0)) < 0.001);
        // Descend ends moving downward
        assert!(f.velocity().y > 0.0);
    }

    #[test]
    fn test_catch_window_is_one_shot() {
        let mut f = flight();
        assert!(f.catchable());
        f.close_window();
        assert!(!f.catchable());
        f.advance(1.5);
        assert!(!f.catchable());
    }

    #[test]
    fn test_descend_is_never_catchable() {
        let mut f = flight();
        f.advance(1.1);
        assert_eq!(f.phase, BonusPhase::Descend);
        assert!(f.window_open);
        assert!(!f.catchable());
    }
}
