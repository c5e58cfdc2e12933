//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Monotonic time
//! - Logger setup

/// Milliseconds on a monotonic clock
///
/// Only differences are meaningful. Natively the origin is the first call;
/// in the browser it is page load (`performance.now()`).
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    let origin = ORIGIN.get_or_init(Instant::now);
    origin.elapsed().as_millis() as u64
}

#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> u64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now().max(0.0) as u64)
        .unwrap_or(0)
}

/// Install the logger for this platform. Safe to call more than once.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

#[cfg(target_arch = "wasm32")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_monotonic() {
        let a = now_ms();
        let b = now_ms();
        assert!(b >= a);
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging();
        init_logging();
    }
}
