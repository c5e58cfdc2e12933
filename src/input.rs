//! Pointer/touch to drop-position mapping

/// Map a client-space pointer x to arena space.
///
/// `rect_left`/`rect_width` describe the canvas on screen. Pointers outside the
/// canvas clamp to its edges; a degenerate rect maps to the arena center.
pub fn pointer_to_arena_x(client_x: f32, rect_left: f32, rect_width: f32, arena_width: f32) -> f32 {
    if rect_width <= 0.0 || !client_x.is_finite() {
        return arena_width / 2.0;
    }
    let ratio = ((client_x - rect_left) / rect_width).clamp(0.0, 1.0);
    ratio * arena_width
}

/// Keep a token of `radius` fully inside the arena: `[radius, arena_width - radius]`
pub fn clamp_drop_x(x: f32, radius: f32, arena_width: f32) -> f32 {
    let lo = radius;
    let hi = arena_width - radius;
    if lo > hi {
        return arena_width / 2.0;
    }
    x.clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_mapping_scales_and_clamps() {
        // Canvas drawn at 2x on screen, offset by 100px
        assert_eq!(pointer_to_arena_x(100.0, 100.0, 780.0, 390.0), 0.0);
        assert_eq!(pointer_to_arena_x(490.0, 100.0, 780.0, 390.0), 195.0);
        assert_eq!(pointer_to_arena_x(5000.0, 100.0, 780.0, 390.0), 390.0);
        assert_eq!(pointer_to_arena_x(-5.0, 100.0, 780.0, 390.0), 0.0);
        assert_eq!(pointer_to_arena_x(10.0, 0.0, 0.0, 390.0), 195.0);
    }

    #[test]
    fn test_drop_x_clamped_to_radius() {
        assert_eq!(clamp_drop_x(0.0, 17.0, 390.0), 17.0);
        assert_eq!(clamp_drop_x(390.0, 17.0, 390.0), 373.0);
        assert_eq!(clamp_drop_x(200.0, 45.0, 390.0), 200.0);
        // Token wider than the arena sits in the middle
        assert_eq!(clamp_drop_x(10.0, 300.0, 390.0), 195.0);
    }
}
