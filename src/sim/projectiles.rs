//! Live projectile list and motion integration

use serde::{Deserialize, Serialize};

use super::collision::Contact;
use super::state::{Projectile, ProjectileKind};

/// A projectile removed from play this tick, with the reason
#[derive(Debug, Clone)]
pub struct Resolution {
    pub projectile: Projectile,
    pub contact: Contact,
}

/// Owns every projectile in the air
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectileSimulator {
    live: Vec<Projectile>,
    next_id: u32,
}

impl ProjectileSimulator {
    pub fn new() -> Self {
        Self {
            live: Vec::new(),
            next_id: 1,
        }
    }

    /// Projectiles currently in play (spawn order)
    pub fn live(&self) -> &[Projectile] {
        &self.live
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn bonus_count(&self) -> usize {
        self.live
            .iter()
            .filter(|p| p.kind == ProjectileKind::Bonus)
            .count()
    }

    /// Add a projectile, assigning its id
    pub fn spawn(&mut self, mut projectile: Projectile) -> u32 {
        let id = self.next_id.max(1);
        self.next_id = id.wrapping_add(1);
        projectile.id = id;
        self.live.push(projectile);
        id
    }

    pub fn clear(&mut self) {
        self.live.clear();
    }

    /// Advance every projectile by `dt` seconds
    ///
    /// Items free-fall with semi-implicit Euler (velocity first, then
    /// position). Bonus projectiles follow their scripted flight instead.
    pub fn tick(&mut self, dt: f32, gravity: f32) {
        for p in &mut self.live {
            match p.kind {
                ProjectileKind::Standard | ProjectileKind::Recovery => {
                    p.vel.y += gravity * dt;
                    p.pos += p.vel * dt;
                }
                ProjectileKind::Bonus => {
                    if let Some(flight) = p.flight.as_mut() {
                        flight.advance(dt);
                        p.pos = flight.position();
                        p.vel = flight.velocity();
                    }
                }
            }
        }
    }

    /// Classify every projectile and pull out the ones that left play
    ///
    /// `classify` may update per-projectile state (e.g. closing a bonus
    /// catch window) before deciding.
    pub fn resolve(&mut self, mut classify: impl FnMut(&mut Projectile) -> Contact) -> Vec<Resolution> {
        let mut resolved = Vec::new();
        let mut kept = Vec::with_capacity(self.live.len());
        for mut projectile in self.live.drain(..) {
            match classify(&mut projectile) {
                Contact::None => kept.push(projectile),
                contact => resolved.push(Resolution { projectile, contact }),
            }
        }
        self.live = kept;
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_spawn_assigns_increasing_ids() {
        let mut sim = ProjectileSimulator::new();
        let a = sim.spawn(Projectile::item(ProjectileKind::Standard, Vec2::ZERO, Vec2::ZERO));
        let b = sim.spawn(Projectile::item(ProjectileKind::Recovery, Vec2::ZERO, Vec2::ZERO));
        assert!(b > a);
        assert_eq!(sim.len(), 2);
        assert_eq!(sim.live()[1].kind, ProjectileKind::Recovery);
    }

    #[test]
    fn test_semi_implicit_euler() {
        let mut sim = ProjectileSimulator::new();
        sim.spawn(Projectile::item(
            ProjectileKind::Standard,
            Vec2::new(100.0, 0.0),
            Vec2::new(10.0, 0.0),
        ));
        sim.tick(0.5, 100.0);
        let p = &sim.live()[0];
        // Velocity updated first, then position uses the new velocity
        assert!((p.vel.y - 50.0).abs() < 0.0001);
        assert!((p.pos.y - 25.0).abs() < 0.0001);
        assert!((p.pos.x - 105.0).abs() < 0.0001);
    }

    #[test]
    fn test_resolve_removes_only_resolved() {
        let mut sim = ProjectileSimulator::new();
        for y in [0.0, 500.0, 900.0] {
            sim.spawn(Projectile::item(ProjectileKind::Standard, Vec2::new(0.0, y), Vec2::Y));
        }
        let resolved = sim.resolve(|p| if p.pos.y > 800.0 { Contact::Missed } else { Contact::None });
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].contact, Contact::Missed);
        assert_eq!(sim.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut sim = ProjectileSimulator::new();
        sim.spawn(Projectile::item(ProjectileKind::Standard, Vec2::ZERO, Vec2::ZERO));
        sim.clear();
        assert!(sim.is_empty());
    }
}
