//! Fixed timestep simulation tick
//!
//! Advances one session by one physics step: input, physics, kinematics sync,
//! collision dispatch, then the throttled deadline check.

use super::session::Session;
use super::state::GamePhase;
use crate::physics::PhysicsWorld;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Drop cursor in arena space (from mouse/touch position)
    pub drop_x: Option<f32>,
    /// Drop the current token (click/tap/space)
    pub drop: bool,
    /// Start a fresh round
    pub restart: bool,
}

/// Advance the session by one fixed timestep
pub fn tick<P: PhysicsWorld>(session: &mut Session<P>, input: &TickInput, dt: f32, now_ms: u64) {
    session.fire_due_timers(now_ms);

    if input.restart && session.phase != GamePhase::Loading {
        session.restart();
    }

    match session.phase {
        GamePhase::Loading => return,
        GamePhase::GameOver => {
            // Frozen board; let the last shake play out
            session.effects.update();
            return;
        }
        GamePhase::Playing => {}
    }

    if let Some(x) = input.drop_x {
        session.set_drop_x(x);
    }
    if input.drop {
        session.try_drop(now_ms);
    }

    session.time_ticks += 1;
    session.physics.step(dt);

    let ids: Vec<_> = session.registry.iter().map(|e| e.id).collect();
    for id in ids {
        if let Some(k) = session.physics.kinematics(id) {
            session.registry.sync_kinematics(id, k.pos, k.vel, k.angle);
        }
    }

    // Report order; later pairs may name bodies an earlier pair consumed
    for (a, b) in session.physics.drain_collisions() {
        session.on_collision(a, b, now_ms);
        if session.phase != GamePhase::Playing {
            break;
        }
    }

    session.effects.update();

    let every = u64::from(session.tuning.game_over_check_every.max(1));
    if session.time_ticks % every == 0 {
        session.check_deadline(now_ms);
    }
}
