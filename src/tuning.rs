//! Data-driven game balance
//!
//! Every timing window and threshold the core uses lives here so it can be
//! tuned from a JSON file without recompiling. Missing fields fall back to
//! the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Upper bound for the per-combo bonus factor
pub const MAX_COMBO_MULTIPLIER: u64 = 10_000;
/// Upper bound for the flat max-merge award
pub const MAX_MERGE_BONUS: u64 = 1_000_000;
/// Upper bound for drop and combo timer windows
pub const MAX_TIMER_MS: u64 = 60_000;

/// Tuning load/validation errors
#[derive(thiserror::Error, Debug)]
pub enum TuningError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid tuning: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Arena ===
    pub arena_width: f32,
    pub arena_height: f32,
    /// Spawn height for dropped tokens
    pub drop_y: f32,
    /// Gravity handed to the physics collaborator (pixels/s²)
    pub gravity: f32,

    // === Deadline ===
    /// A token whose top edge is above this line is overflowing
    pub deadline_y: f32,
    /// No overflow is counted this long after a token spawns
    pub deadline_grace_ms: u64,
    /// Continuous overflow needed to end the run
    pub deadline_hold_ms: u64,
    /// Vertical velocity below which a token may count as rising (pixels/s, negative = up)
    pub rising_vy: f32,
    /// Minimum speed for the rising exception (pixels/s)
    pub rising_speed: f32,
    /// Run the deadline check every N fixed steps
    pub game_over_check_every: u32,

    // === Drop gate ===
    pub drop_cooldown_ms: u64,

    // === Scoring ===
    /// Combo resets after this long without a merge
    pub combo_decay_ms: u64,
    /// Bonus = combo * multiplier, from combo 2 onward
    pub combo_multiplier: u64,
    /// Flat award for merging two max-tier tokens
    pub max_merge_bonus: u64,
    /// Merges producing this tier or higher shake the screen
    pub big_merge_tier: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            drop_y: DROP_Y,
            gravity: GRAVITY,

            deadline_y: DEADLINE_Y,
            deadline_grace_ms: 1500,
            deadline_hold_ms: 900,
            rising_vy: -120.0,
            rising_speed: 240.0,
            game_over_check_every: 2,

            drop_cooldown_ms: 500,

            combo_decay_ms: 1200,
            combo_multiplier: 5,
            max_merge_bonus: 500,
            big_merge_tier: 5,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON (partial documents allowed)
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_pretty(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the core cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if !(self.arena_width > 0.0 && self.arena_height > 0.0) {
            return Err(TuningError::Invalid("arena must have positive size".into()));
        }
        if !(0.0..self.arena_height).contains(&self.deadline_y) {
            return Err(TuningError::Invalid(format!(
                "deadline_y {} outside arena",
                self.deadline_y
            )));
        }
        if self.deadline_hold_ms == 0 {
            return Err(TuningError::Invalid("deadline_hold_ms must be > 0".into()));
        }
        if self.game_over_check_every == 0 {
            return Err(TuningError::Invalid(
                "game_over_check_every must be >= 1".into(),
            ));
        }
        if self.rising_speed < 0.0 {
            return Err(TuningError::Invalid("rising_speed must be >= 0".into()));
        }
        if self.combo_multiplier > MAX_COMBO_MULTIPLIER {
            return Err(TuningError::Invalid(format!(
                "combo_multiplier {} above {MAX_COMBO_MULTIPLIER}",
                self.combo_multiplier
            )));
        }
        if self.max_merge_bonus > MAX_MERGE_BONUS {
            return Err(TuningError::Invalid(format!(
                "max_merge_bonus {} above {MAX_MERGE_BONUS}",
                self.max_merge_bonus
            )));
        }
        if self.drop_cooldown_ms > MAX_TIMER_MS || self.combo_decay_ms > MAX_TIMER_MS {
            return Err(TuningError::Invalid(format!(
                "drop_cooldown_ms and combo_decay_ms must be <= {MAX_TIMER_MS}"
            )));
        }
        Ok(())
    }
}
