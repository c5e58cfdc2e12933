//! Body registry
//!
//! Authoritative list of live entities. Storage is a dense `Vec` plus an
//! id -> slot map so that lookup, insertion and removal are all O(1).
//! The registry also owns the deadline timer table so that removing an
//! entity can never leave a stale timer behind.

use std::collections::HashMap;

use glam::Vec2;

use super::state::{BodyId, BodyState, Entity};
use super::tiers::Tier;

#[derive(Debug, Clone)]
pub struct BodyRegistry {
    bodies: Vec<Entity>,
    index: HashMap<BodyId, usize>,
    /// Deadline timer table: id -> first-violation timestamp (ms)
    deadline_since: HashMap<BodyId, u64>,
    next_id: BodyId,
}

impl Default for BodyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            index: HashMap::new(),
            deadline_since: HashMap::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity and append it to the live list
    pub fn create(&mut self, tier: Tier, pos: Vec2, now_ms: u64) -> BodyId {
        let id = self.next_id;
        self.next_id += 1;

        self.index.insert(id, self.bodies.len());
        self.bodies.push(Entity::new(id, tier, pos, now_ms));
        id
    }

    /// Swap-remove an entity, dropping its deadline timer.
    ///
    /// The returned entity is tagged `Removed`.
    pub fn remove(&mut self, id: BodyId) -> Option<Entity> {
        let slot = self.index.remove(&id)?;
        let mut removed = self.bodies.swap_remove(slot);
        if let Some(moved) = self.bodies.get(slot) {
            self.index.insert(moved.id, slot);
        }
        self.deadline_since.remove(&id);

        removed.state = BodyState::Removed;
        Some(removed)
    }

    /// Live entities in storage order (not meaningful, do not depend on it)
    #[inline]
    pub fn all(&self) -> &[Entity] {
        &self.bodies
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.bodies.iter()
    }

    pub fn get(&self, id: BodyId) -> Option<&Entity> {
        self.index.get(&id).map(|&slot| &self.bodies[slot])
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Entity> {
        let slot = *self.index.get(&id)?;
        self.bodies.get_mut(slot)
    }

    #[inline]
    pub fn contains(&self, id: BodyId) -> bool {
        self.index.contains_key(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Copy authoritative kinematics from the physics collaborator
    pub fn sync_kinematics(&mut self, id: BodyId, pos: Vec2, vel: Vec2, angle: f32) {
        if let Some(e) = self.get_mut(id) {
            e.pos = pos;
            e.vel = vel;
            e.angle = angle;
        }
    }

    /// Zero every velocity (game over freeze)
    pub fn freeze_all(&mut self) {
        for e in &mut self.bodies {
            e.vel = Vec2::ZERO;
        }
    }

    // === Deadline timer table ===

    pub fn deadline_since(&self, id: BodyId) -> Option<u64> {
        self.deadline_since.get(&id).copied()
    }

    /// Start the overflow timer if not already running; returns its start time
    pub fn start_deadline_timer(&mut self, id: BodyId, now_ms: u64) -> u64 {
        *self.deadline_since.entry(id).or_insert(now_ms)
    }

    pub fn clear_deadline_timer(&mut self, id: BodyId) {
        self.deadline_since.remove(&id);
    }

    /// Drop timer entries whose id is no longer live
    pub fn purge_stale_timers(&mut self) {
        let index = &self.index;
        self.deadline_since.retain(|id, _| index.contains_key(id));
    }

    pub fn timer_count(&self) -> usize {
        self.deadline_since.len()
    }

    /// Check the dense list and index map agree (tests/debug only)
    pub fn check_invariants(&self) -> bool {
        self.index.len() == self.bodies.len()
            && self
                .bodies
                .iter()
                .enumerate()
                .all(|(slot, e)| self.index.get(&e.id) == Some(&slot))
            && self.deadline_since.keys().all(|id| self.index.contains_key(id))
    }
}
