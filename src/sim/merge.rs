//! Collision resolver
//!
//! Turns collision-start pairs reported by the physics collaborator into
//! merges. A body takes part in at most one merge: the first pair to claim it
//! latches it to `Merging` and removes it in the same call, so any later pair
//! in the same physics batch finds it gone.

use glam::Vec2;

use super::session::Session;
use super::state::{BodyId, GameEvent, GamePhase};
use super::tiers::{Tier, is_max_tier, tier_def};
use crate::physics::PhysicsWorld;

/// Shake for the max-tier vanish (amount, frames)
const MAX_MERGE_SHAKE: (f32, u32) = (12.0, 30);
/// Frames for big-merge shakes
const BIG_MERGE_SHAKE_FRAMES: u32 = 15;

/// Result of a resolved collision pair
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// Both inputs replaced by one body of the next tier
    Promoted {
        id: BodyId,
        tier: Tier,
        pos: Vec2,
        points: u64,
    },
    /// Two max-tier bodies vanished for the flat bonus
    MaxBonus { pos: Vec2, points: u64 },
}

impl<P: PhysicsWorld> Session<P> {
    /// Handle one collision-start pair. Returns `None` when the pair does not merge.
    pub fn on_collision(&mut self, a: BodyId, b: BodyId, now_ms: u64) -> Option<MergeOutcome> {
        self.fire_due_timers(now_ms);
        if self.phase != GamePhase::Playing || a == b {
            return None;
        }

        // Walls and stale handles are not in the registry
        let ea = self.registry.get(a)?;
        let eb = self.registry.get(b)?;
        if !ea.is_alive() || !eb.is_alive() {
            return None;
        }
        if ea.tier != eb.tier {
            return None;
        }

        let tier = ea.tier;
        tier_def(tier)?;
        let promoted = if is_max_tier(tier) {
            None
        } else {
            Some(tier_def(tier + 1)?)
        };
        let mid = (ea.pos + eb.pos) * 0.5;

        // Latch and remove together; nothing else runs in between
        for id in [a, b] {
            if let Some(e) = self.registry.get_mut(id) {
                e.begin_merge();
            }
        }
        self.despawn(a);
        self.despawn(b);

        let outcome = match promoted {
            None => {
                let points = self.tuning.max_merge_bonus;
                self.score = self.score.saturating_add(points);
                self.effects.shake(MAX_MERGE_SHAKE.0, MAX_MERGE_SHAKE.1);
                log::info!("Max-tier merge at ({:.0}, {:.0}) +{}", mid.x, mid.y, points);
                self.emit(GameEvent::MaxMerge { pos: mid, points });
                MergeOutcome::MaxBonus { pos: mid, points }
            }
            Some(next) => {
                // Fresh spawn time: the product gets its own grace window
                let id = self.spawn(next.tier, mid, next.radius, now_ms);
                self.score = self.score.saturating_add(next.score);

                if next.tier >= self.tuning.big_merge_tier {
                    let excess = (next.tier - self.tuning.big_merge_tier) as f32;
                    self.effects.shake(4.0 + excess * 2.0, BIG_MERGE_SHAKE_FRAMES);
                }

                log::debug!("Merged tier {} -> {} (body {}) +{}", tier, next.tier, id, next.score);
                self.emit(GameEvent::Merged {
                    id,
                    tier: next.tier,
                    pos: mid,
                    points: next.score,
                });
                MergeOutcome::Promoted {
                    id,
                    tier: next.tier,
                    pos: mid,
                    points: next.score,
                }
            }
        };

        // Once per resolved pair, never per consumed body
        self.register_merge_for_combo(mid, now_ms);
        Some(outcome)
    }
}
