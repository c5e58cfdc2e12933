//! Host-side frame loop
//!
//! Turns variable frame times into fixed simulation steps and latches
//! one-shot input until a step consumes it. Shared by the native demo and
//! the browser entry point.

use crate::audio::CueSink;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::physics::PhysicsWorld;
use crate::sim::{GameEvent, GamePhase, Session, TickInput, tick};

/// Longest frame we try to catch up on (seconds)
const MAX_FRAME_DT: f32 = 0.1;

/// A session plus its fixed-step accumulator
pub struct Game<P: PhysicsWorld> {
    pub session: Session<P>,
    accumulator: f32,
    input: TickInput,
}

impl<P: PhysicsWorld> Game<P> {
    pub fn new(session: Session<P>) -> Self {
        Self {
            session,
            accumulator: 0.0,
            input: TickInput::default(),
        }
    }

    /// Track the pointer (arena space)
    pub fn set_drop_x(&mut self, x: f32) {
        self.input.drop_x = Some(x);
    }

    /// Request a drop on the next step
    pub fn press_drop(&mut self) {
        self.input.drop = true;
    }

    /// Request a restart on the next step
    pub fn press_restart(&mut self) {
        self.input.restart = true;
    }

    /// Run as many fixed steps as `frame_dt` covers. Returns the step count.
    pub fn update(&mut self, frame_dt: f32, now_ms: u64) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.session, &self.input, SIM_DT, now_ms);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.drop = false;
            self.input.restart = false;
        }

        // Still advance timers on frames too short for a step
        if substeps == 0 {
            self.session.fire_due_timers(now_ms);
        }
        substeps
    }

    /// Score and run id of a finished run; `None` until the run is over
    pub fn final_score(&self) -> Option<(u64, u64)> {
        (self.session.phase() == GamePhase::GameOver)
            .then(|| (self.session.score(), self.session.run_id))
    }

    /// Drain session events, forwarding their cues to `sink`
    pub fn pump_events(&mut self, sink: &mut dyn CueSink) -> Vec<GameEvent> {
        let events = self.session.drain_events();
        sink.play_events(&events);
        events
    }
}
