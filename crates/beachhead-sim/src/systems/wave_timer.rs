//! Wave countdown clock.

use beachhead_core::constants::TIME_EPSILON;
use beachhead_core::enums::TimerState;
use beachhead_core::state::TimerView;

/// Countdown that fires exactly once per start.
#[derive(Debug, Clone)]
pub struct WaveTimer {
    state: TimerState,
    remaining_secs: f64,
    /// Latched when the countdown fires; cleared by `start` and `reset`.
    fired: bool,
}

impl WaveTimer {
    pub fn new(duration_secs: f64) -> Self {
        Self {
            state: TimerState::Stopped,
            remaining_secs: duration_secs.max(0.0),
            fired: false,
        }
    }

    pub fn start(&mut self) {
        self.state = TimerState::Running;
        self.fired = false;
    }

    /// Load a new duration without changing the running state.
    pub fn reset(&mut self, duration_secs: f64) {
        self.remaining_secs = duration_secs.max(0.0);
        self.fired = false;
    }

    pub fn stop(&mut self) {
        self.state = TimerState::Stopped;
    }

    /// Count down by `dt`. Returns `true` on the tick the countdown hits zero.
    pub fn tick(&mut self, dt: f64) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        if self.remaining_secs > 0.0 {
            self.remaining_secs = (self.remaining_secs - dt).max(0.0);
            if self.remaining_secs <= TIME_EPSILON {
                self.remaining_secs = 0.0;
            }
        }
        if self.remaining_secs == 0.0 && !self.fired {
            self.fired = true;
            self.state = TimerState::Stopped;
            return true;
        }
        false
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining_secs(&self) -> f64 {
        self.remaining_secs
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// Remaining time rounded up to whole seconds.
    pub fn display_secs(&self) -> u32 {
        self.remaining_secs.ceil() as u32
    }

    pub fn view(&self) -> TimerView {
        TimerView {
            state: self.state,
            remaining_secs: self.remaining_secs,
            display_secs: self.display_secs(),
        }
    }
}
