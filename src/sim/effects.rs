//! Transient presentation state
//!
//! Screen shake and combo popups. Nothing here feeds back into gameplay;
//! the renderer reads it through the frame snapshot.

use glam::Vec2;
use serde::Serialize;

/// Maximum combo popups alive at once
pub const MAX_COMBO_POPUPS: usize = 3;

/// Popup lifetime in frames
pub const COMBO_POPUP_FRAMES: u32 = 60;

/// Frame count the shake offset is normalized against
const SHAKE_DECAY_FRAMES: f32 = 30.0;

/// Floating "xN combo" label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComboPopup {
    pub count: u32,
    pub pos: Vec2,
    pub frames_left: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Effects {
    pub shake_amount: f32,
    pub shake_frames: u32,
    pub popups: Vec<ComboPopup>,
    /// Player preference (off under reduced motion)
    #[serde(skip)]
    pub shake_enabled: bool,
}

impl Default for Effects {
    fn default() -> Self {
        Self {
            shake_amount: 0.0,
            shake_frames: 0,
            popups: Vec::new(),
            shake_enabled: true,
        }
    }
}

impl Effects {
    /// Start a shake; a weaker shake never cuts a stronger one short
    pub fn shake(&mut self, amount: f32, frames: u32) {
        if !self.shake_enabled {
            return;
        }
        if amount >= self.shake_amount || self.shake_frames == 0 {
            self.shake_amount = amount;
            self.shake_frames = frames;
        }
    }

    pub fn push_combo(&mut self, count: u32, pos: Vec2) {
        if self.popups.len() >= MAX_COMBO_POPUPS {
            self.popups.remove(0);
        }
        self.popups.push(ComboPopup {
            count,
            pos,
            frames_left: COMBO_POPUP_FRAMES,
        });
    }

    /// Advance one frame
    pub fn update(&mut self) {
        if self.shake_frames > 0 {
            self.shake_frames -= 1;
            if self.shake_frames == 0 {
                self.shake_amount = 0.0;
            }
        }

        for popup in &mut self.popups {
            popup.frames_left = popup.frames_left.saturating_sub(1);
        }
        self.popups.retain(|p| p.frames_left > 0);
    }

    /// Current shake magnitude (renderer multiplies by a random direction)
    pub fn shake_intensity(&self) -> f32 {
        if self.shake_frames == 0 {
            return 0.0;
        }
        self.shake_amount * (self.shake_frames as f32 / SHAKE_DECAY_FRAMES).min(1.0)
    }

    pub fn clear(&mut self) {
        self.shake_amount = 0.0;
        self.shake_frames = 0;
        self.popups.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shake_decays_to_zero() {
        let mut fx = Effects::default();
        fx.shake(12.0, 30);
        assert!(fx.shake_intensity() > 0.0);
        for _ in 0..30 {
            fx.update();
        }
        assert_eq!(fx.shake_intensity(), 0.0);
    }

    #[test]
    fn test_weak_shake_does_not_override_strong() {
        let mut fx = Effects::default();
        fx.shake(12.0, 30);
        fx.shake(4.0, 15);
        assert_eq!(fx.shake_amount, 12.0);
        assert_eq!(fx.shake_frames, 30);
    }

    #[test]
    fn test_disabled_shake() {
        let mut fx = Effects {
            shake_enabled: false,
            ..Default::default()
        };
        fx.shake(12.0, 30);
        assert_eq!(fx.shake_intensity(), 0.0);
    }

    #[test]
    fn test_popup_cap_and_expiry() {
        let mut fx = Effects::default();
        for n in 2..7 {
            fx.push_combo(n, Vec2::ZERO);
        }
        assert_eq!(fx.popups.len(), MAX_COMBO_POPUPS);
        assert_eq!(fx.popups[0].count, 4);

        for _ in 0..COMBO_POPUP_FRAMES {
            fx.update();
        }
        assert!(fx.popups.is_empty());
    }
}
