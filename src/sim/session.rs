//! Session controller
//!
//! One `Session` is one game instance: phase machine, score and combo,
//! drop gate, the body registry and the physics world it mirrors. There is
//! no global state, so any number of sessions can run side by side.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::deadline::DeadlineMonitor;
use super::effects::Effects;
use super::registry::BodyRegistry;
use super::state::{BodyId, GameEvent, GamePhase};
use super::tiers::{Tier, pick_weighted_tier, radius_of};
use super::timers::{TimerKind, Timers};
use crate::input::clamp_drop_x;
use crate::physics::{Material, PhysicsWorld};
use crate::settings::Settings;
use crate::tuning::Tuning;

#[derive(Debug)]
pub struct Session<P: PhysicsWorld> {
    pub tuning: Tuning,
    pub(crate) phase: GamePhase,
    pub(crate) score: u64,
    pub(crate) combo: u32,
    /// Tier the next drop will spawn
    pub current_tier: Tier,
    /// Tier shown in the "next" preview
    pub next_tier: Tier,
    pub(crate) can_drop: bool,
    /// Horizontal drop position (already clamped for `current_tier`)
    pub drop_x: f32,
    /// Incremented on every (re)start; identifies a run for score submission
    pub run_id: u64,
    /// Fixed steps simulated this run
    pub time_ticks: u64,
    pub registry: BodyRegistry,
    pub effects: Effects,
    pub(crate) physics: P,
    pub(crate) monitor: DeadlineMonitor,
    pub(crate) timers: Timers,
    seed: u64,
    rng: Pcg32,
    events: Vec<GameEvent>,
}

impl<P: PhysicsWorld> Session<P> {
    /// Create a session in `Loading` with a seeded tier picker
    pub fn new(tuning: Tuning, physics: P, seed: u64) -> Self {
        let monitor = DeadlineMonitor::from_tuning(&tuning);
        let drop_x = tuning.arena_width / 2.0;
        Self {
            tuning,
            phase: GamePhase::Loading,
            score: 0,
            combo: 0,
            current_tier: 0,
            next_tier: 0,
            can_drop: false,
            drop_x,
            run_id: 0,
            time_ticks: 0,
            registry: BodyRegistry::new(),
            effects: Effects::default(),
            physics,
            monitor,
            timers: Timers::new(),
            seed,
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
        }
    }

    /// Create a session seeded from the thread RNG
    pub fn unseeded(tuning: Tuning, physics: P) -> Self {
        Self::new(tuning, physics, rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    /// Whether the drop gate is open
    pub fn can_drop(&self) -> bool {
        self.can_drop
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    /// Apply player preferences that affect the core
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.effects.shake_enabled = settings.effective_screen_shake();
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    // === Phase transitions ===

    /// Assets and engine are ready: `Loading -> Playing`
    pub fn start(&mut self) {
        if self.phase != GamePhase::Loading {
            log::warn!("start() ignored in phase {:?}", self.phase);
            return;
        }
        self.reset_round();
    }

    /// Full reset into a fresh `Playing` round from any phase
    pub fn restart(&mut self) {
        // Cancel before resetting so no late timer touches the new round
        self.timers.cancel_all();
        self.reset_round();
    }

    fn reset_round(&mut self) {
        self.physics.clear();
        self.registry = BodyRegistry::new();
        self.effects.clear();
        self.events.clear();

        self.score = 0;
        self.combo = 0;
        self.time_ticks = 0;
        self.can_drop = true;
        self.current_tier = pick_weighted_tier(&mut self.rng);
        self.next_tier = pick_weighted_tier(&mut self.rng);
        self.drop_x = self.clamped_drop_x(self.tuning.arena_width / 2.0);
        self.run_id += 1;
        self.phase = GamePhase::Playing;

        log::info!(
            "Run {} started (current tier {}, next tier {})",
            self.run_id,
            self.current_tier,
            self.next_tier
        );
        self.emit(GameEvent::Started {
            run_id: self.run_id,
        });
    }

    /// Evaluate the deadline; on overflow, freeze and end the run.
    /// Returns true if the run ended on this call.
    pub fn check_deadline(&mut self, now_ms: u64) -> bool {
        self.fire_due_timers(now_ms);
        if self.phase != GamePhase::Playing {
            return false;
        }
        if !self.monitor.evaluate(&mut self.registry, now_ms) {
            return false;
        }
        self.enter_game_over();
        true
    }

    fn enter_game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        self.can_drop = false;
        self.timers.cancel_all();
        self.registry.freeze_all();
        self.physics.freeze_all();

        log::info!(
            "Game over: run {} score {} ({} bodies)",
            self.run_id,
            self.score,
            self.registry.len()
        );
        self.emit(GameEvent::GameOver { score: self.score });
    }

    // === Timers ===

    /// Fire every timer due at `now_ms`
    pub fn fire_due_timers(&mut self, now_ms: u64) {
        for kind in self.timers.take_due(now_ms) {
            match kind {
                TimerKind::DropCooldown => {
                    if self.phase == GamePhase::Playing {
                        self.can_drop = true;
                    }
                }
                TimerKind::ComboDecay => {
                    if self.combo > 0 {
                        log::debug!("Combo x{} expired", self.combo);
                    }
                    self.combo = 0;
                }
            }
        }
    }

    // === Dropping ===

    fn clamped_drop_x(&self, x: f32) -> f32 {
        let radius = radius_of(self.current_tier).unwrap_or(0.0);
        clamp_drop_x(x, radius, self.tuning.arena_width)
    }

    /// Move the drop cursor (clamped so the token fits the arena)
    pub fn set_drop_x(&mut self, x: f32) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.drop_x = self.clamped_drop_x(x);
    }

    /// Drop `current_tier` at the cursor. No-op unless playing and the gate is open.
    pub fn try_drop(&mut self, now_ms: u64) -> Option<BodyId> {
        self.fire_due_timers(now_ms);
        if self.phase != GamePhase::Playing || !self.can_drop {
            return None;
        }

        let tier = self.current_tier;
        let radius = radius_of(tier)?;
        let x = self.clamped_drop_x(self.drop_x);
        let pos = Vec2::new(x, self.tuning.drop_y);

        self.can_drop = false;
        let id = self.spawn(tier, pos, radius, now_ms);

        self.current_tier = self.next_tier;
        self.next_tier = pick_weighted_tier(&mut self.rng);
        // Cursor must fit the new current token
        self.drop_x = self.clamped_drop_x(self.drop_x);

        self.timers.arm(
            TimerKind::DropCooldown,
            now_ms.saturating_add(self.tuning.drop_cooldown_ms),
        );

        log::debug!("Dropped tier {} at x={:.1} (body {})", tier, x, id);
        self.emit(GameEvent::Dropped { id, tier, x });
        Some(id)
    }

    /// Create a body in both the registry and the physics world
    pub(crate) fn spawn(&mut self, tier: Tier, pos: Vec2, radius: f32, now_ms: u64) -> BodyId {
        let id = self.registry.create(tier, pos, now_ms);
        self.physics
            .insert_body(id, pos, radius, Material::for_tier(tier));
        id
    }

    /// Remove a body from both the registry and the physics world
    pub(crate) fn despawn(&mut self, id: BodyId) {
        self.registry.remove(id);
        self.physics.remove_body(id);
    }

    // === Combo ===

    /// Count one resolved merge toward the combo
    pub(crate) fn register_merge_for_combo(&mut self, pos: Vec2, now_ms: u64) {
        self.combo = self.combo.saturating_add(1);
        self.timers.arm(
            TimerKind::ComboDecay,
            now_ms.saturating_add(self.tuning.combo_decay_ms),
        );

        if self.combo >= 2 {
            let bonus = u64::from(self.combo).saturating_mul(self.tuning.combo_multiplier);
            self.score = self.score.saturating_add(bonus);
            self.effects.push_combo(self.combo, pos);
            log::debug!("Combo x{} (+{})", self.combo, bonus);
            self.emit(GameEvent::Combo {
                count: self.combo,
                bonus,
                pos,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::BasicWorld;

    fn playing_session(seed: u64) -> Session<BasicWorld> {
        let tuning = Tuning::default();
        let world = BasicWorld::from_tuning(&tuning);
        let mut s = Session::new(tuning, world, seed);
        s.start();
        s
    }

    #[test]
    fn test_loading_to_playing() {
        let tuning = Tuning::default();
        let world = BasicWorld::from_tuning(&tuning);
        let mut s = Session::new(tuning, world, 1);
        assert_eq!(s.phase, GamePhase::Loading);
        assert!(s.try_drop(0).is_none());

        s.start();
        assert_eq!(s.phase, GamePhase::Playing);
        assert!(s.can_drop);
        assert_eq!(s.run_id, 1);
        assert_eq!(s.drain_events(), vec![GameEvent::Started { run_id: 1 }]);
    }

    #[test]
    fn test_drop_gate_cooldown() {
        let mut s = playing_session(3);
        let first_next = s.next_tier;

        let id = s.try_drop(1000).expect("gate open");
        assert!(s.registry.contains(id));
        assert_eq!(s.physics().body_count(), 1);
        assert_eq!(s.current_tier, first_next);
        assert!(!s.can_drop);

        // Rapid input is ignored
        assert!(s.try_drop(1100).is_none());
        assert!(s.try_drop(1499).is_none());
        assert_eq!(s.registry.len(), 1);

        // Gate reopens after the cooldown
        assert!(s.try_drop(1500).is_some());
        assert_eq!(s.registry.len(), 2);
    }

    #[test]
    fn test_drop_position_is_clamped() {
        let mut s = playing_session(5);
        s.set_drop_x(-100.0);
        let radius = radius_of(s.current_tier).expect("droppable tier");
        assert_eq!(s.drop_x, radius);

        let id = s.try_drop(0).expect("gate open");
        let e = s.registry.get(id).expect("live");
        assert_eq!(e.pos.x, radius);
        assert_eq!(e.pos.y, s.tuning.drop_y);
        assert_eq!(e.spawn_ms, 0);
    }

    #[test]
    fn test_restart_cancels_pending_timers() {
        let mut s = playing_session(9);
        s.try_drop(0);
        s.combo = 3;
        s.timers.arm(TimerKind::ComboDecay, 1200);

        s.restart();
        assert_eq!(s.run_id, 2);
        assert!(s.registry.is_empty());
        assert_eq!(s.physics().body_count(), 0);
        assert!(!s.timers.is_armed(TimerKind::ComboDecay));
        assert!(!s.timers.is_armed(TimerKind::DropCooldown));

        // A merge in the new round must not be reset by the old decay deadline
        s.combo = 1;
        s.fire_due_timers(1300);
        assert_eq!(s.combo, 1);
    }

    #[test]
    fn test_restart_from_game_over() {
        let mut s = playing_session(11);
        s.registry.create(0, Vec2::new(100.0, 40.0), 0);
        assert!(!s.check_deadline(1500));
        assert!(s.check_deadline(2400));
        assert_eq!(s.phase, GamePhase::GameOver);

        s.restart();
        assert_eq!(s.phase, GamePhase::Playing);
        assert!(s.can_drop);
        assert_eq!(s.registry.timer_count(), 0);
    }

    #[test]
    fn test_game_over_freezes_and_blocks_drops() {
        let mut s = playing_session(13);
        let id = s.try_drop(0).expect("gate open");
        s.registry
            .sync_kinematics(id, Vec2::new(100.0, 40.0), Vec2::new(5.0, 1.0), 0.0);
        s.drain_events();

        assert!(!s.check_deadline(1500));
        assert!(s.check_deadline(2400));
        assert_eq!(s.phase, GamePhase::GameOver);
        assert!(!s.can_drop);
        assert!(s.physics().is_frozen());
        assert_eq!(s.registry.get(id).map(|e| e.vel), Some(Vec2::ZERO));
        assert_eq!(s.drain_events(), vec![GameEvent::GameOver { score: 0 }]);

        // Cooldown timer was cancelled; drops stay disabled
        s.fire_due_timers(10_000);
        assert!(!s.can_drop);
        assert!(s.try_drop(10_000).is_none());
        // Further verdicts are not re-reported
        assert!(!s.check_deadline(20_000));
    }

    #[test]
    fn test_accessors_track_the_round() {
        let mut s = playing_session(17);
        assert_eq!(s.phase(), GamePhase::Playing);
        assert!(s.can_drop());
        assert_eq!((s.score(), s.combo()), (0, 0));

        s.try_drop(0);
        assert!(!s.can_drop());
        s.register_merge_for_combo(Vec2::new(100.0, 300.0), 0);
        s.register_merge_for_combo(Vec2::new(100.0, 300.0), 10);
        assert_eq!(s.combo(), 2);
        assert_eq!(s.score(), 2 * s.tuning.combo_multiplier);
    }

    #[test]
    fn test_combo_bonus_saturates() {
        let mut s = playing_session(19);
        s.tuning.combo_multiplier = u64::MAX;
        s.score = u64::MAX - 1;
        s.combo = 1;
        s.register_merge_for_combo(Vec2::new(100.0, 300.0), 0);
        assert_eq!(s.score(), u64::MAX);
        assert!(s.drain_events().iter().any(|e| matches!(
            e,
            GameEvent::Combo { count: 2, bonus: u64::MAX, .. }
        )));
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = playing_session(21);
        let b = playing_session(21);
        a.try_drop(0);
        assert_eq!(a.registry.len(), 1);
        assert!(b.registry.is_empty());
        assert_eq!(a.seed(), b.seed());
    }
}
