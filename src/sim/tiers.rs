//! Tier catalog
//!
//! Static table of token sizes and score values, plus the weighted picker
//! used to choose the next droppable tier.

use rand::Rng;
use serde::Serialize;

/// Tier index (0 = smallest)
pub type Tier = usize;

/// Immutable definition of a single tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierDef {
    pub tier: Tier,
    /// Collision radius in logical pixels
    pub radius: f32,
    /// Points awarded when a merge produces this tier
    pub score: u64,
    /// Visual id used by the renderer for sprite lookup
    pub name: &'static str,
    /// Base color (RGB)
    pub color: u32,
}

/// All tiers, radius strictly increasing with tier
pub const TIERS: [TierDef; 11] = [
    TierDef { tier: 0, radius: 17.0, score: 1, name: "item_0", color: 0xFF6B9D },
    TierDef { tier: 1, radius: 25.0, score: 3, name: "item_1", color: 0xFF8A80 },
    TierDef { tier: 2, radius: 32.0, score: 6, name: "item_2", color: 0xB39DDB },
    TierDef { tier: 3, radius: 38.0, score: 10, name: "item_3", color: 0xFFB74D },
    TierDef { tier: 4, radius: 45.0, score: 15, name: "item_4", color: 0xFF8A65 },
    TierDef { tier: 5, radius: 52.0, score: 21, name: "item_5", color: 0xEF5350 },
    TierDef { tier: 6, radius: 60.0, score: 28, name: "item_6", color: 0xAED581 },
    TierDef { tier: 7, radius: 69.0, score: 36, name: "item_7", color: 0xF48FB1 },
    TierDef { tier: 8, radius: 78.0, score: 45, name: "item_8", color: 0xFFD54F },
    TierDef { tier: 9, radius: 89.0, score: 55, name: "item_9", color: 0x4DB6AC },
    TierDef { tier: 10, radius: 100.0, score: 66, name: "item_10", color: 0x42A5F5 },
];

/// Relative draw weights for the droppable tiers (index = tier)
///
/// Tiers above `DROP_WEIGHTS.len() - 1` only appear through merging.
pub const DROP_WEIGHTS: [u32; 5] = [35, 28, 20, 12, 5];

/// Highest tier that can be dropped directly
pub const MAX_DROP_TIER: Tier = DROP_WEIGHTS.len() - 1;

/// Look up a tier definition (None for unknown tiers)
#[inline]
pub fn tier_def(tier: Tier) -> Option<&'static TierDef> {
    TIERS.get(tier)
}

/// The maximum tier; merging two of these awards a bonus instead of promoting
#[inline]
pub const fn max_tier() -> Tier {
    TIERS.len() - 1
}

#[inline]
pub fn is_max_tier(tier: Tier) -> bool {
    tier == max_tier()
}

/// Radius of a tier, if it exists
#[inline]
pub fn radius_of(tier: Tier) -> Option<f32> {
    tier_def(tier).map(|d| d.radius)
}

/// Draw a tier index from `weights` using a cumulative-weight scan.
///
/// `r` is uniform in `[0, total)`; weights are subtracted in order until the
/// remainder drops to zero or below. Returns 0 for an empty or all-zero table.
pub fn pick_weighted<R: Rng>(weights: &[u32], rng: &mut R) -> Tier {
    let total: u32 = weights.iter().sum();
    if total == 0 {
        return 0;
    }

    let mut r = rng.random::<f64>() * f64::from(total);
    for (i, &w) in weights.iter().enumerate() {
        r -= f64::from(w);
        if r <= 0.0 {
            return i;
        }
    }
    0
}

/// Draw the next droppable tier (biased toward small tiers)
#[inline]
pub fn pick_weighted_tier<R: Rng>(rng: &mut R) -> Tier {
    pick_weighted(&DROP_WEIGHTS, rng)
}
