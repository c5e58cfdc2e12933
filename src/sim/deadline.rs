//! Deadline monitor
//!
//! Decides whether a stack has overflowed the deadline line for long enough
//! to end the run. Each call re-derives every entity's status from scratch;
//! the only state carried between calls is the timer table in the registry.
//!
//! A token only accrues overflow time when all of these hold:
//! - it is not committed to a merge
//! - its spawn grace window has elapsed
//! - its top edge is above the line
//! - it is not being launched upward (bounce in progress)
//!
//! Any interruption clears its timer, so only sustained overflow is fatal.

use super::registry::BodyRegistry;
use super::state::Entity;
use super::tiers::radius_of;
use crate::tuning::Tuning;

/// Thresholds for the overflow check (copied from `Tuning`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeadlineMonitor {
    pub deadline_y: f32,
    pub grace_ms: u64,
    pub hold_ms: u64,
    pub rising_vy: f32,
    pub rising_speed: f32,
}

impl Default for DeadlineMonitor {
    fn default() -> Self {
        Self::from_tuning(&Tuning::default())
    }
}

/// Why an entity is not accruing overflow time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exempt {
    Merging,
    Grace,
    UnknownTier,
    BelowLine,
    Rising,
}

impl DeadlineMonitor {
    pub fn from_tuning(t: &Tuning) -> Self {
        Self {
            deadline_y: t.deadline_y,
            grace_ms: t.deadline_grace_ms,
            hold_ms: t.deadline_hold_ms,
            rising_vy: t.rising_vy,
            rising_speed: t.rising_speed,
        }
    }

    fn exemption(&self, e: &Entity, now_ms: u64) -> Option<Exempt> {
        if e.is_merging() {
            return Some(Exempt::Merging);
        }
        if now_ms.saturating_sub(e.spawn_ms) < self.grace_ms {
            return Some(Exempt::Grace);
        }
        let Some(radius) = radius_of(e.tier) else {
            return Some(Exempt::UnknownTier);
        };
        if e.pos.y - radius >= self.deadline_y {
            return Some(Exempt::BelowLine);
        }
        if e.vel.y < self.rising_vy && e.vel.length() > self.rising_speed {
            return Some(Exempt::Rising);
        }
        None
    }

    /// Run one evaluation pass. Returns true when the run must end.
    pub fn evaluate(&self, registry: &mut BodyRegistry, now_ms: u64) -> bool {
        let mut verdicts = Vec::with_capacity(registry.len());
        for e in registry.iter() {
            verdicts.push((e.id, self.exemption(e, now_ms)));
        }

        for (id, exempt) in verdicts {
            match exempt {
                // Malformed entities are left alone until removed
                Some(Exempt::UnknownTier) => {}
                Some(_) => registry.clear_deadline_timer(id),
                None => {
                    let since = registry.start_deadline_timer(id, now_ms);
                    if now_ms.saturating_sub(since) >= self.hold_ms {
                        log::info!(
                            "Body {} held above deadline for {} ms",
                            id,
                            now_ms - since
                        );
                        return true;
                    }
                }
            }
        }

        registry.purge_stale_timers();
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::BodyId;
    use glam::Vec2;

    const GRACE: u64 = 1500;
    const HOLD: u64 = 900;

    /// Tier-0 token resting with its top edge above the line
    fn overflowing(reg: &mut BodyRegistry, spawn_ms: u64) -> BodyId {
        reg.create(0, Vec2::new(100.0, 60.0), spawn_ms)
    }

    #[test]
    fn test_short_overflow_never_ends_game() {
        let mon = DeadlineMonitor::default();
        let mut reg = BodyRegistry::new();
        overflowing(&mut reg, 0);

        let mut now = GRACE;
        while now < GRACE + HOLD {
            assert!(!mon.evaluate(&mut reg, now));
            now += 33;
        }
    }

    #[test]
    fn test_sustained_overflow_ends_game() {
        let mon = DeadlineMonitor::default();
        let mut reg = BodyRegistry::new();
        overflowing(&mut reg, 0);

        assert!(!mon.evaluate(&mut reg, GRACE));
        assert!(!mon.evaluate(&mut reg, GRACE + HOLD - 1));
        assert!(mon.evaluate(&mut reg, GRACE + HOLD));
    }

    #[test]
    fn test_grace_period_never_counts() {
        let mon = DeadlineMonitor::default();
        let mut reg = BodyRegistry::new();
        let id = overflowing(&mut reg, 10_000);

        for now in (10_000..10_000 + GRACE).step_by(50) {
            assert!(!mon.evaluate(&mut reg, now));
            assert!(reg.deadline_since(id).is_none());
        }
    }

    #[test]
    fn test_interruption_resets_timer() {
        let mon = DeadlineMonitor::default();
        let mut reg = BodyRegistry::new();
        let id = overflowing(&mut reg, 0);

        assert!(!mon.evaluate(&mut reg, GRACE));
        assert!(!mon.evaluate(&mut reg, GRACE + 600));

        // Settles below the line for one pass
        reg.sync_kinematics(id, Vec2::new(100.0, 300.0), Vec2::ZERO, 0.0);
        assert!(!mon.evaluate(&mut reg, GRACE + 700));
        assert!(reg.deadline_since(id).is_none());

        // Back above: hold window restarts
        reg.sync_kinematics(id, Vec2::new(100.0, 60.0), Vec2::ZERO, 0.0);
        assert!(!mon.evaluate(&mut reg, GRACE + 800));
        assert!(!mon.evaluate(&mut reg, GRACE + 800 + HOLD - 1));
        assert!(mon.evaluate(&mut reg, GRACE + 800 + HOLD));
    }

    #[test]
    fn test_rising_fast_is_exempt() {
        let mon = DeadlineMonitor::default();
        let mut reg = BodyRegistry::new();
        let id = overflowing(&mut reg, 0);
        reg.sync_kinematics(id, Vec2::new(100.0, 60.0), Vec2::new(0.0, -400.0), 0.0);

        assert!(!mon.evaluate(&mut reg, GRACE));
        assert!(!mon.evaluate(&mut reg, GRACE + HOLD * 3));
        assert!(reg.deadline_since(id).is_none());

        // Slow upward drift does not qualify as a bounce
        reg.sync_kinematics(id, Vec2::new(100.0, 60.0), Vec2::new(0.0, -50.0), 0.0);
        assert!(!mon.evaluate(&mut reg, GRACE + HOLD * 3));
        assert!(reg.deadline_since(id).is_some());
    }

    #[test]
    fn test_merging_entity_is_exempt() {
        let mon = DeadlineMonitor::default();
        let mut reg = BodyRegistry::new();
        let id = overflowing(&mut reg, 0);
        assert!(!mon.evaluate(&mut reg, GRACE));
        assert!(reg.deadline_since(id).is_some());

        if let Some(e) = reg.get_mut(id) {
            assert!(e.begin_merge());
        }
        assert!(!mon.evaluate(&mut reg, GRACE + HOLD * 2));
        assert!(reg.deadline_since(id).is_none());
    }

    #[test]
    fn test_unknown_tier_is_skipped() {
        let mon = DeadlineMonitor::default();
        let mut reg = BodyRegistry::new();
        reg.create(99, Vec2::new(100.0, -500.0), 0);
        assert!(!mon.evaluate(&mut reg, GRACE));
        assert!(!mon.evaluate(&mut reg, GRACE + HOLD * 10));
        assert_eq!(reg.timer_count(), 0);
    }

    #[test]
    fn test_top_edge_exactly_on_line_is_not_overflow() {
        let mon = DeadlineMonitor::default();
        let mut reg = BodyRegistry::new();
        // radius 17: top edge at exactly deadline_y
        reg.create(0, Vec2::new(100.0, mon.deadline_y + 17.0), 0);
        assert!(!mon.evaluate(&mut reg, GRACE));
        assert!(!mon.evaluate(&mut reg, GRACE + HOLD));
        assert_eq!(reg.timer_count(), 0);
    }
}
