//! Intro loading screen progress
//!
//! The slideshow shows a progress bar before the first slide. Page gestures
//! are not forwarded to the navigator until it reaches 100%.

use crate::state::LoadingConfig;
use std::time::Duration;

pub const COMPLETE: u32 = 100;

#[derive(Debug, Clone)]
pub struct LoadingProgress {
    config: LoadingConfig,
    percent: u32,
    /// Time carried over that has not yet filled a whole interval
    carry: Duration,
}

impl LoadingProgress {
    pub fn new(config: LoadingConfig) -> Self {
        Self {
            config,
            percent: 0,
            carry: Duration::ZERO,
        }
    }

    /// Advance by `dt` of elapsed time, returning the new percentage
    pub fn advance(&mut self, dt: Duration) -> u32 {
        if self.is_complete() {
            return self.percent;
        }

        let interval = self.config.interval();
        if interval.is_zero() {
            self.percent = COMPLETE;
            return self.percent;
        }

        self.carry += dt;
        while self.carry >= interval && self.percent < COMPLETE {
            self.carry -= interval;
            self.percent = (self.percent + self.config.step).min(COMPLETE);
        }
        if self.is_complete() {
            self.carry = Duration::ZERO;
        }
        self.percent
    }

    pub fn percent(&self) -> u32 {
        self.percent
    }

    /// Progress as a fraction for progress bars
    pub fn fraction(&self) -> f32 {
        self.percent as f32 / COMPLETE as f32
    }

    pub fn is_complete(&self) -> bool {
        self.percent >= COMPLETE
    }

    /// Total time the intro takes with the current settings
    pub fn total_duration(&self) -> Duration {
        let steps = COMPLETE.div_ceil(self.config.step.max(1));
        self.config.interval() * steps
    }
}
