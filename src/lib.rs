//! Tier Drop - merge/deadline core for a falling-ball merge game
//!
//! Core modules:
//! - `sim`: Deterministic game core (tiers, registry, merges, deadline, session)
//! - `physics`: Physics collaborator trait plus a small reference world
//! - `leaderboard`: Validated, rate-limited score submission
//! - `audio`: Fire-and-forget cue playback
//! - `input`: Pointer to drop-position mapping
//! - `game`: Fixed-step frame loop shared by the native and web hosts
//! - `platform`: Browser/native platform abstraction (time, logging)
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod game;
pub mod input;
pub mod leaderboard;
pub mod physics;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use leaderboard::Leaderboard;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, matches the physics engine step)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Fixed simulation timestep in milliseconds
    pub const SIM_DT_MS: u64 = 16;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Arena dimensions (logical pixels, y grows downward)
    pub const ARENA_WIDTH: f32 = 390.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Height at which new tokens are spawned
    pub const DROP_Y: f32 = 40.0;

    /// Deadline line (top edge above this is overflowing)
    pub const DEADLINE_Y: f32 = 80.0;

    /// Gravity in pixels/s²
    pub const GRAVITY: f32 = 1500.0;
}
