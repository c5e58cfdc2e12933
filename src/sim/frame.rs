//! Per-frame snapshot handed to the renderer
//!
//! The renderer only ever sees this read-only view; it never touches the
//! registry or the physics world directly.

use glam::Vec2;
use serde::Serialize;

use super::effects::ComboPopup;
use super::session::Session;
use super::state::{BodyId, GamePhase};
use super::tiers::{Tier, radius_of};
use crate::physics::PhysicsWorld;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BodySprite {
    pub id: BodyId,
    pub tier: Tier,
    pub pos: Vec2,
    pub angle: f32,
    pub radius: f32,
}

/// Token hovering at the drop cursor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DropPreview {
    pub tier: Tier,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// False while the cooldown gate is closed
    pub ready: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub combo: u32,
    pub next_tier: Tier,
    pub bodies: Vec<BodySprite>,
    /// Absent outside `Playing`
    pub drop_preview: Option<DropPreview>,
    pub deadline_y: f32,
    pub shake_intensity: f32,
    pub combo_popups: Vec<ComboPopup>,
}

impl<P: PhysicsWorld> Session<P> {
    /// Build the render view of the current state
    pub fn frame(&self) -> FrameSnapshot {
        let bodies = self
            .registry
            .iter()
            .filter_map(|e| {
                Some(BodySprite {
                    id: e.id,
                    tier: e.tier,
                    pos: e.pos,
                    angle: e.angle,
                    radius: radius_of(e.tier)?,
                })
            })
            .collect();

        let drop_preview = if self.phase == GamePhase::Playing {
            radius_of(self.current_tier).map(|radius| DropPreview {
                tier: self.current_tier,
                x: self.drop_x,
                y: self.tuning.drop_y,
                radius,
                ready: self.can_drop,
            })
        } else {
            None
        };

        FrameSnapshot {
            phase: self.phase,
            score: self.score,
            combo: self.combo,
            next_tier: self.next_tier,
            bodies,
            drop_preview,
            deadline_y: self.tuning.deadline_y,
            shake_intensity: self.effects.shake_intensity(),
            combo_popups: self.effects.popups.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::BasicWorld;
    use crate::tuning::Tuning;

    fn session() -> Session<BasicWorld> {
        let tuning = Tuning::default();
        let world = BasicWorld::from_tuning(&tuning);
        Session::new(tuning, world, 7)
    }

    #[test]
    fn test_loading_frame_has_no_preview() {
        let s = session();
        let frame = s.frame();
        assert_eq!(frame.phase, GamePhase::Loading);
        assert!(frame.bodies.is_empty());
        assert!(frame.drop_preview.is_none());
    }

    #[test]
    fn test_frame_lists_bodies_and_preview() {
        let mut s = session();
        s.start();
        let tier = s.current_tier;
        let id = s.try_drop(0).expect("gate open");

        let frame = s.frame();
        assert_eq!(frame.bodies.len(), 1);
        assert_eq!(frame.bodies[0].id, id);
        assert_eq!(frame.bodies[0].tier, tier);
        assert_eq!(Some(frame.bodies[0].radius), radius_of(tier));

        let preview = frame.drop_preview.expect("preview while playing");
        assert_eq!(preview.tier, s.current_tier);
        assert!(!preview.ready);
        assert_eq!(frame.deadline_y, 80.0);
    }

    #[test]
    fn test_frame_serializes() {
        let mut s = session();
        s.start();
        let json = serde_json::to_string(&s.frame()).expect("serialize");
        assert!(json.contains("\"phase\":\"Playing\""));
    }
}
