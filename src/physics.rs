//! Physics collaborator
//!
//! The game core never integrates motion itself. It talks to a rigid-body
//! world through [`PhysicsWorld`], keyed by the same ids as the registry.
//!
//! [`BasicWorld`] is a small circle-only integrator (gravity, box walls,
//! impulse resolution, collision-start detection) good enough for the demo
//! binary and tests. It makes no claim to physical accuracy.

use std::collections::HashSet;

use glam::Vec2;

use crate::sim::state::BodyId;
use crate::sim::tiers::Tier;
use crate::tuning::Tuning;

/// Surface parameters for a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub restitution: f32,
    pub friction: f32,
    pub density: f32,
}

impl Material {
    /// Tokens get heavier as they grow
    pub fn for_tier(tier: Tier) -> Self {
        Self {
            restitution: 0.2,
            friction: 0.5,
            density: 0.001 + tier as f32 * 0.0003,
        }
    }
}

/// Authoritative per-body motion state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub pos: Vec2,
    pub vel: Vec2,
    pub angle: f32,
}

/// Rigid-body simulator interface
pub trait PhysicsWorld {
    /// Advance the simulation by `dt` seconds
    fn step(&mut self, dt: f32);
    fn insert_body(&mut self, id: BodyId, pos: Vec2, radius: f32, material: Material);
    fn remove_body(&mut self, id: BodyId);
    /// Pairs that started touching since the last drain, in report order
    fn drain_collisions(&mut self) -> Vec<(BodyId, BodyId)>;
    fn kinematics(&self, id: BodyId) -> Option<Kinematics>;
    /// Make every body immovable and motionless
    fn freeze_all(&mut self);
    /// Remove every body
    fn clear(&mut self);
}

#[derive(Debug, Clone)]
struct Body {
    id: BodyId,
    pos: Vec2,
    vel: Vec2,
    angle: f32,
    radius: f32,
    inv_mass: f32,
    material: Material,
}

/// Contact slop (pixels) within which bodies count as touching
const CONTACT_SLOP: f32 = 0.5;
/// Constraint solver passes per step
const SOLVER_ITERATIONS: usize = 4;

/// Minimal circle world inside an open-topped box
#[derive(Debug, Clone)]
pub struct BasicWorld {
    width: f32,
    height: f32,
    gravity: f32,
    bodies: Vec<Body>,
    touching: HashSet<(BodyId, BodyId)>,
    pending: Vec<(BodyId, BodyId)>,
    frozen: bool,
}

impl BasicWorld {
    pub fn new(width: f32, height: f32, gravity: f32) -> Self {
        Self {
            width,
            height,
            gravity,
            bodies: Vec::new(),
            touching: HashSet::new(),
            pending: Vec::new(),
            frozen: false,
        }
    }

    pub fn from_tuning(t: &Tuning) -> Self {
        Self::new(t.arena_width, t.arena_height, t.gravity)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Override a body's velocity (tests and scripted scenarios)
    pub fn set_velocity(&mut self, id: BodyId, vel: Vec2) {
        if let Some(b) = self.bodies.iter_mut().find(|b| b.id == id) {
            b.vel = vel;
        }
    }

    fn solve_walls(&mut self) {
        let (w, h) = (self.width, self.height);
        for b in &mut self.bodies {
            let e = b.material.restitution;
            if b.pos.x < b.radius {
                b.pos.x = b.radius;
                if b.vel.x < 0.0 {
                    b.vel.x = -b.vel.x * e;
                }
            } else if b.pos.x > w - b.radius {
                b.pos.x = w - b.radius;
                if b.vel.x > 0.0 {
                    b.vel.x = -b.vel.x * e;
                }
            }
            if b.pos.y > h - b.radius {
                b.pos.y = h - b.radius;
                if b.vel.y > 0.0 {
                    b.vel.y = -b.vel.y * e;
                }
                // Floor friction
                b.vel.x *= 1.0 - b.material.friction * 0.1;
            }
        }
    }

    fn solve_pairs(&mut self) {
        let n = self.bodies.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let (left, right) = self.bodies.split_at_mut(j);
                let a = &mut left[i];
                let b = &mut right[0];

                let delta = b.pos - a.pos;
                let dist = delta.length();
                let min_dist = a.radius + b.radius;
                if dist >= min_dist {
                    continue;
                }

                let normal = if dist > f32::EPSILON {
                    delta / dist
                } else {
                    Vec2::Y
                };
                let inv_sum = a.inv_mass + b.inv_mass;
                if inv_sum <= 0.0 {
                    continue;
                }

                // Positional correction split by inverse mass
                let overlap = min_dist - dist;
                a.pos -= normal * overlap * (a.inv_mass / inv_sum);
                b.pos += normal * overlap * (b.inv_mass / inv_sum);

                // Normal impulse
                let rel = b.vel - a.vel;
                let closing = rel.dot(normal);
                if closing < 0.0 {
                    let e = a.material.restitution.min(b.material.restitution);
                    let j_imp = -(1.0 + e) * closing / inv_sum;
                    a.vel -= normal * j_imp * a.inv_mass;
                    b.vel += normal * j_imp * b.inv_mass;
                }
            }
        }
    }

    fn detect_contacts(&mut self) {
        let mut now_touching = HashSet::new();
        let n = self.bodies.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let a = &self.bodies[i];
                let b = &self.bodies[j];
                if a.pos.distance(b.pos) <= a.radius + b.radius + CONTACT_SLOP {
                    let key = (a.id.min(b.id), a.id.max(b.id));
                    if !self.touching.contains(&key) {
                        self.pending.push(key);
                    }
                    now_touching.insert(key);
                }
            }
        }
        self.touching = now_touching;
    }
}

impl PhysicsWorld for BasicWorld {
    fn step(&mut self, dt: f32) {
        if self.frozen {
            return;
        }

        for b in &mut self.bodies {
            b.vel.y += self.gravity * dt;
            b.pos += b.vel * dt;
            b.angle += b.vel.x / b.radius * dt;
        }

        for _ in 0..SOLVER_ITERATIONS {
            self.solve_pairs();
            self.solve_walls();
        }

        self.detect_contacts();
    }

    fn insert_body(&mut self, id: BodyId, pos: Vec2, radius: f32, material: Material) {
        let mass = material.density * std::f32::consts::PI * radius * radius;
        self.bodies.push(Body {
            id,
            pos,
            vel: Vec2::ZERO,
            angle: 0.0,
            radius,
            inv_mass: if mass > 0.0 { 1.0 / mass } else { 0.0 },
            material,
        });
    }

    fn remove_body(&mut self, id: BodyId) {
        self.bodies.retain(|b| b.id != id);
        self.touching.retain(|&(a, b)| a != id && b != id);
        self.pending.retain(|&(a, b)| a != id && b != id);
    }

    fn drain_collisions(&mut self) -> Vec<(BodyId, BodyId)> {
        std::mem::take(&mut self.pending)
    }

    fn kinematics(&self, id: BodyId) -> Option<Kinematics> {
        self.bodies.iter().find(|b| b.id == id).map(|b| Kinematics {
            pos: b.pos,
            vel: b.vel,
            angle: b.angle,
        })
    }

    fn freeze_all(&mut self) {
        self.frozen = true;
        for b in &mut self.bodies {
            b.vel = Vec2::ZERO;
        }
    }

    fn clear(&mut self) {
        self.bodies.clear();
        self.touching.clear();
        self.pending.clear();
        self.frozen = false;
    }
}
