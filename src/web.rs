//! Browser entry point
//!
//! A thin wasm-bindgen wrapper the page drives from `requestAnimationFrame`.
//! The page owns the canvas and draws from the JSON frame snapshot.

use wasm_bindgen::prelude::*;

use crate::audio::AudioManager;
use crate::game::Game;
use crate::input::pointer_to_arena_x;
use crate::leaderboard::Leaderboard;
use crate::physics::BasicWorld;
use crate::platform;
use crate::settings::Settings;
use crate::sim::{GamePhase, Session};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    platform::init_logging();
    log::info!("Tier Drop starting...");
}

#[wasm_bindgen]
pub struct WebGame {
    game: Game<BasicWorld>,
    audio: AudioManager,
    leaderboard: Leaderboard,
    settings: Settings,
    last_frame_ms: Option<u64>,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WebGame {
        let tuning = Tuning::default();
        let world = BasicWorld::from_tuning(&tuning);
        let settings = Settings::load();

        let mut session = Session::unseeded(tuning, world);
        session.apply_settings(&settings);
        let mut audio = AudioManager::new();
        audio.apply_settings(&settings);

        WebGame {
            game: Game::new(session),
            audio,
            leaderboard: Leaderboard::new(),
            settings,
            last_frame_ms: None,
        }
    }

    /// Assets are loaded; begin the first round
    pub fn start(&mut self) {
        self.game.session.start();
    }

    pub fn pointer_move(&mut self, client_x: f32, rect_left: f32, rect_width: f32) {
        let x = pointer_to_arena_x(
            client_x,
            rect_left,
            rect_width,
            self.game.session.tuning.arena_width,
        );
        self.game.set_drop_x(x);
    }

    /// Click/tap: drop while playing, restart after game over
    pub fn press(&mut self) {
        self.audio.resume();
        if self.game.session.phase() == GamePhase::GameOver {
            self.game.press_restart();
        } else {
            self.game.press_drop();
        }
    }

    /// Advance to now and return the frame snapshot as JSON
    pub fn frame(&mut self) -> String {
        let now = platform::now_ms();
        let dt = self
            .last_frame_ms
            .map(|last| now.saturating_sub(last) as f32 / 1000.0)
            .unwrap_or(0.0);
        self.last_frame_ms = Some(now);

        self.game.update(dt, now);
        self.game.pump_events(&mut self.audio);

        serde_json::to_string(&self.game.session.frame()).unwrap_or_else(|e| {
            log::warn!("Frame serialization failed: {e}");
            String::from("{}")
        })
    }

    pub fn set_reduced_motion(&mut self, on: bool) {
        self.settings.reduced_motion = on;
        self.settings.save();
        self.game.session.apply_settings(&self.settings);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.settings.muted = muted;
        self.settings.save();
        self.audio.apply_settings(&self.settings);
    }

    /// Submit the finished run. Returns the achieved rank.
    pub fn submit_score(&mut self, name: &str) -> Result<u32, JsValue> {
        let Some((score, run_id)) = self.game.final_score() else {
            return Err(JsValue::from_str("run is still in progress"));
        };
        let score = i64::try_from(score).unwrap_or(i64::MAX);
        let now = platform::now_ms();
        self.leaderboard
            .submit(name, score, run_id, now)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(self.leaderboard.rank(score, now) as u32)
    }

    /// Top `n` entries as JSON
    pub fn top_scores(&mut self, n: usize) -> String {
        let top = self.leaderboard.top_n(n, platform::now_ms());
        serde_json::to_string(&top).unwrap_or_else(|_| String::from("[]"))
    }

    pub fn top_percent(&mut self) -> u32 {
        let score = i64::try_from(self.game.session.score()).unwrap_or(i64::MAX);
        self.leaderboard.top_percent(score, platform::now_ms())
    }
}

impl Default for WebGame {
    fn default() -> Self {
        Self::new()
    }
}
