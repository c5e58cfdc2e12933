//! Core simulation types
//!
//! Entities, their merge latch, session phase and the events the session
//! emits for audio/UI collaborators.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::tiers::Tier;

/// Entity identifier, shared with the physics collaborator's body handle
pub type BodyId = u32;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for assets/engine readiness
    Loading,
    /// Active gameplay
    Playing,
    /// Run ended; entities frozen until restart
    GameOver,
}

/// Merge latch for a dropped body
///
/// `Alive -> Merging` happens at most once; `Removed` is only ever observed
/// on the value handed back by the registry after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyState {
    #[default]
    Alive,
    Merging,
    Removed,
}

/// A dropped token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: BodyId,
    pub tier: Tier,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Rotation in radians (render only)
    pub angle: f32,
    pub state: BodyState,
    /// Monotonic ms timestamp of creation (drop or merge promotion)
    pub spawn_ms: u64,
}

impl Entity {
    pub fn new(id: BodyId, tier: Tier, pos: Vec2, spawn_ms: u64) -> Self {
        Self {
            id,
            tier,
            pos,
            vel: Vec2::ZERO,
            angle: 0.0,
            state: BodyState::Alive,
            spawn_ms,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state == BodyState::Alive
    }

    #[inline]
    pub fn is_merging(&self) -> bool {
        self.state == BodyState::Merging
    }

    /// Commit this entity to a merge. Returns false if it was already committed.
    pub fn begin_merge(&mut self) -> bool {
        if self.state != BodyState::Alive {
            return false;
        }
        self.state = BodyState::Merging;
        true
    }
}

/// Events emitted by the session for audio/UI collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// A new round began
    Started { run_id: u64 },
    /// Player dropped a token
    Dropped { id: BodyId, tier: Tier, x: f32 },
    /// Two equal tokens merged into `tier`
    Merged { id: BodyId, tier: Tier, pos: Vec2, points: u64 },
    /// Two max-tier tokens vanished for the bonus
    MaxMerge { pos: Vec2, points: u64 },
    /// Consecutive merges within the decay window
    Combo { count: u32, bonus: u64, pos: Vec2 },
    /// Deadline overflow ended the run
    GameOver { score: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_latch_is_one_shot() {
        let mut e = Entity::new(1, 0, Vec2::ZERO, 0);
        assert!(e.is_alive());
        assert!(e.begin_merge());
        assert!(e.is_merging());
        assert!(!e.begin_merge());

        e.state = BodyState::Removed;
        assert!(!e.begin_merge());
    }
}
