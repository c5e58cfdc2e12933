//! Tier Drop entry point
//!
//! The browser build is driven from `web::WebGame`. Natively this runs a
//! headless autoplay round and logs what happens.
//!
//! Usage: `tier-drop [tuning.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use tier_drop::Tuning;
    use tier_drop::audio::AudioManager;
    use tier_drop::consts::{SIM_DT, SIM_DT_MS};
    use tier_drop::game::Game;
    use tier_drop::leaderboard::Leaderboard;
    use tier_drop::physics::BasicWorld;
    use tier_drop::platform;
    use tier_drop::settings::Settings;
    use tier_drop::sim::{GameEvent, GamePhase, Session};

    /// Give up after this much simulated time
    const MAX_SIM_MS: u64 = 10 * 60 * 1000;

    platform::init_logging();
    log::info!("Tier Drop (native) starting headless autoplay...");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => match Tuning::load(&path) {
            Ok(t) => {
                log::info!("Loaded tuning from {path}");
                t
            }
            Err(e) => {
                log::error!("Bad tuning file {path}: {e}");
                std::process::exit(1);
            }
        },
        None => Tuning::default(),
    };
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(12345);

    let settings = Settings::load();
    let world = BasicWorld::from_tuning(&tuning);
    let mut session = Session::new(tuning, world, seed);
    session.apply_settings(&settings);
    session.start();

    let mut audio = AudioManager::new();
    audio.apply_settings(&settings);
    let mut game = Game::new(session);

    // Simulated clock so the run is reproducible
    let mut now: u64 = 0;
    let mut drops = 0u32;
    let mut merges = 0u32;
    let mut best_combo = 0u32;

    while game.session.phase() == GamePhase::Playing && now < MAX_SIM_MS {
        if game.session.can_drop() {
            // Sweep the cursor across the arena
            let width = game.session.tuning.arena_width;
            let x = (drops as f32 * 97.0) % width;
            game.set_drop_x(x);
            game.press_drop();
        }
        game.update(SIM_DT, now);
        now += SIM_DT_MS;

        for event in game.pump_events(&mut audio) {
            match event {
                GameEvent::Dropped { .. } => drops += 1,
                GameEvent::Merged { .. } | GameEvent::MaxMerge { .. } => merges += 1,
                GameEvent::Combo { count, .. } => best_combo = best_combo.max(count),
                _ => {}
            }
        }
    }

    let s = &game.session;
    log::info!(
        "Run over after {:.1}s: score {}, {} drops, {} merges, best combo x{}, {} bodies left",
        now as f64 / 1000.0,
        s.score(),
        drops,
        merges,
        best_combo,
        s.registry.len()
    );

    let Some((score, run_id)) = game.final_score() else {
        log::info!("Run did not finish, nothing to submit");
        return;
    };
    let mut leaderboard = Leaderboard::new();
    let score = i64::try_from(score).unwrap_or(i64::MAX);
    match leaderboard.submit("CPU", score, run_id, now) {
        Ok(entry) => log::info!(
            "{} ranked #{} (top {}%)",
            entry.name,
            leaderboard.rank(score, now),
            leaderboard.top_percent(score, now)
        ),
        Err(e) => log::warn!("Score not submitted: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::wasm_start, this is just to satisfy the compiler
}
