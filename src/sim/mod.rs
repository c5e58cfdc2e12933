//! Deterministic game core
//!
//! All gameplay logic lives here. This module must stay deterministic:
//! - Caller-supplied monotonic time only
//! - Seeded RNG only
//! - Collision pairs handled in report order
//! - No rendering or platform dependencies

pub mod deadline;
pub mod effects;
pub mod frame;
pub mod merge;
pub mod registry;
pub mod session;
pub mod state;
pub mod tick;
pub mod tiers;
pub mod timers;

pub use deadline::DeadlineMonitor;
pub use effects::{ComboPopup, Effects};
pub use frame::{BodySprite, DropPreview, FrameSnapshot};
pub use merge::MergeOutcome;
pub use registry::BodyRegistry;
pub use session::Session;
pub use state::{BodyId, BodyState, Entity, GameEvent, GamePhase};
pub use tick::{TickInput, tick};
pub use tiers::{DROP_WEIGHTS, MAX_DROP_TIER, TIERS, Tier, TierDef, max_tier, tier_def};
pub use timers::{TimerKind, Timers};
