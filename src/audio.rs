//! Audio cues
//!
//! The core never plays sound itself. Hosts drain `GameEvent`s, map them to
//! [`Cue`]s and hand them to a [`CueSink`]. Playback is fire-and-forget:
//! a sink that fails just stays quiet.
//!
//! On wasm32 [`AudioManager`] synthesizes every cue with Web Audio
//! oscillators, so no sound files are needed. Natively it only logs.

#[cfg(target_arch = "wasm32")]
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Named sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// Token released
    Drop,
    /// Two tokens merged
    Merge,
    /// Merge that extended a combo
    ComboMerge,
    /// Two max-tier tokens vanished
    MaxMerge,
    /// Run ended
    GameOver,
}

impl Cue {
    /// Asset-style name of the cue
    pub fn name(self) -> &'static str {
        match self {
            Cue::Drop => "drop",
            Cue::Merge => "merge",
            Cue::ComboMerge => "comboMerge",
            Cue::MaxMerge => "maxMerge",
            Cue::GameOver => "gameOver",
        }
    }

    /// Cue to play for a session event, if any
    pub fn for_event(event: &GameEvent) -> Option<Cue> {
        match event {
            GameEvent::Started { .. } => None,
            GameEvent::Dropped { .. } => Some(Cue::Drop),
            GameEvent::Merged { .. } => Some(Cue::Merge),
            GameEvent::Combo { .. } => Some(Cue::ComboMerge),
            GameEvent::MaxMerge { .. } => Some(Cue::MaxMerge),
            GameEvent::GameOver { .. } => Some(Cue::GameOver),
        }
    }
}

/// Something that can play cues
pub trait CueSink {
    fn play(&mut self, cue: Cue);

    /// Play the cue for every event that has one, in order
    fn play_events(&mut self, events: &[GameEvent]) {
        for cue in events.iter().filter_map(Cue::for_event) {
            self.play(cue);
        }
    }
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl CueSink for NullSink {
    fn play(&mut self, _cue: Cue) {}
}

/// Collects cues in order (headless hosts and tests)
impl CueSink for Vec<Cue> {
    fn play(&mut self, cue: Cue) {
        self.push(cue);
    }
}

/// Audio manager for the game
pub struct AudioManager {
    #[cfg(target_arch = "wasm32")]
    ctx: Option<AudioContext>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Take volume and mute from player settings
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Resume audio context (required after user gesture)
    #[cfg(target_arch = "wasm32")]
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn resume(&self) {}
}

impl CueSink for AudioManager {
    #[cfg(target_arch = "wasm32")]
    fn play(&mut self, cue: Cue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Browsers suspend the context until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match cue {
            Cue::Drop => play_drop(ctx, vol),
            Cue::Merge => play_merge(ctx, vol),
            Cue::ComboMerge => play_combo(ctx, vol),
            Cue::MaxMerge => play_max_merge(ctx, vol),
            Cue::GameOver => play_game_over(ctx, vol),
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn play(&mut self, cue: Cue) {
        if self.effective_volume() > 0.0 {
            log::debug!("cue: {}", cue.name());
        }
    }
}

// === Sound generators ===

/// Create an oscillator with gain envelope
#[cfg(target_arch = "wasm32")]
fn create_osc(
    ctx: &AudioContext,
    freq: f32,
    osc_type: OscillatorType,
) -> Option<(OscillatorNode, GainNode)> {
    let osc = ctx.create_oscillator().ok()?;
    let gain = ctx.create_gain().ok()?;

    osc.set_type(osc_type);
    osc.frequency().set_value(freq);
    osc.connect_with_audio_node(&gain).ok()?;
    gain.connect_with_audio_node(&ctx.destination()).ok()?;

    Some((osc, gain))
}

/// Drop - soft falling blip
#[cfg(target_arch = "wasm32")]
fn play_drop(ctx: &AudioContext, vol: f32) {
    let Some((osc, gain)) = create_osc(ctx, 320.0, OscillatorType::Triangle) else {
        return;
    };
    let t = ctx.current_time();

    gain.gain().set_value_at_time(vol * 0.3, t).ok();
    gain.gain()
        .exponential_ramp_to_value_at_time(0.01, t + 0.12)
        .ok();
    osc.frequency().set_value_at_time(320.0, t).ok();
    osc.frequency()
        .exponential_ramp_to_value_at_time(180.0, t + 0.12)
        .ok();

    osc.start().ok();
    osc.stop_with_when(t + 0.15).ok();
}

/// Merge - rising pop
#[cfg(target_arch = "wasm32")]
fn play_merge(ctx: &AudioContext, vol: f32) {
    let Some((osc, gain)) = create_osc(ctx, 300.0, OscillatorType::Sine) else {
        return;
    };
    let t = ctx.current_time();

    gain.gain().set_value_at_time(vol * 0.4, t).ok();
    gain.gain()
        .exponential_ramp_to_value_at_time(0.01, t + 0.2)
        .ok();
    osc.frequency().set_value_at_time(300.0, t).ok();
    osc.frequency()
        .exponential_ramp_to_value_at_time(700.0, t + 0.08)
        .ok();

    osc.start().ok();
    osc.stop_with_when(t + 0.25).ok();
}

/// Combo - quick ascending arpeggio
#[cfg(target_arch = "wasm32")]
fn play_combo(ctx: &AudioContext, vol: f32) {
    for (i, freq) in [600.0, 800.0, 1000.0].iter().enumerate() {
        let delay = i as f64 * 0.05;
        if let Some((osc, gain)) = create_osc(ctx, *freq, OscillatorType::Sine) {
            let t = ctx.current_time() + delay;
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.12)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.15).ok();
        }
    }
}

/// Max merge - bass boom under a bright chord
#[cfg(target_arch = "wasm32")]
fn play_max_merge(ctx: &AudioContext, vol: f32) {
    let t = ctx.current_time();

    if let Some((osc, gain)) = create_osc(ctx, 80.0, OscillatorType::Sine) {
        gain.gain().set_value_at_time(vol * 0.5, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.5)
            .ok();
        osc.frequency().set_value_at_time(80.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(40.0, t + 0.5)
            .ok();
        osc.start().ok();
        osc.stop_with_when(t + 0.55).ok();
    }

    for (i, freq) in [500.0, 600.0, 700.0, 800.0, 1000.0].iter().enumerate() {
        let delay = i as f64 * 0.08;
        if let Some((osc, gain)) = create_osc(ctx, *freq, OscillatorType::Triangle) {
            let t = t + delay;
            gain.gain().set_value_at_time(vol * 0.25, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.3).ok();
        }
    }
}

/// Game over - descending tones
#[cfg(target_arch = "wasm32")]
fn play_game_over(ctx: &AudioContext, vol: f32) {
    for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
        let delay = i as f64 * 0.2;
        if let Some((osc, gain)) = create_osc(ctx, *freq, OscillatorType::Sine) {
            let t = ctx.current_time() + delay;
            gain.gain().set_value_at_time(vol * 0.3, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                .ok();
            osc.start_with_when(t).ok();
            osc.stop_with_when(t + 0.4).ok();
        }
    }
}
