//! Spring-driven number counter for statistic slides

use crate::state::TickerConfig;
use std::time::Duration;

/// Largest integration step; longer frames are split
const MAX_STEP: f64 = 1.0 / 120.0;
/// Remaining distance and speed under which the spring snaps to its target
const REST_DELTA: f64 = 0.5;
const REST_SPEED: f64 = 0.5;

/// Damped spring integrated with semi-implicit Euler
#[derive(Debug, Clone)]
pub struct Spring {
    mass: f64,
    stiffness: f64,
    damping: f64,
    position: f64,
    velocity: f64,
    target: f64,
}

impl Spring {
    pub fn new(config: &TickerConfig, start: f64) -> Self {
        Self {
            mass: config.mass,
            stiffness: config.stiffness,
            damping: config.damping,
            position: start,
            velocity: 0.0,
            target: start,
        }
    }

    pub fn set_target(&mut self, target: f64) {
        self.target = target;
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_at_rest(&self) -> bool {
        self.position == self.target && self.velocity == 0.0
    }

    pub fn tick(&mut self, dt: Duration) {
        let mut remaining = dt.as_secs_f64();
        while remaining > 0.0 && !self.is_at_rest() {
            let step = remaining.min(MAX_STEP);
            remaining -= step;

            let displacement = self.position - self.target;
            let force = -self.stiffness * displacement - self.damping * self.velocity;
            self.velocity += force / self.mass * step;
            self.position += self.velocity * step;

            if (self.position - self.target).abs() < REST_DELTA && self.velocity.abs() < REST_SPEED {
                self.position = self.target;
                self.velocity = 0.0;
            }
        }
    }
}

/// Counter that rolls from zero up to a value after a short delay
#[derive(Debug, Clone)]
pub struct NumberTicker {
    spring: Spring,
    value: f64,
    suffix: String,
    start_delay: Duration,
    pending_delay: Duration,
}

impl NumberTicker {
    pub fn new(config: &TickerConfig, value: f64, suffix: impl Into<String>) -> Self {
        let start_delay = Duration::from_millis(config.start_delay_ms);
        Self {
            spring: Spring::new(config, 0.0),
            value,
            suffix: suffix.into(),
            start_delay,
            pending_delay: start_delay,
        }
    }

    /// Change the value; the counter waits the start delay again before moving
    pub fn set_value(&mut self, value: f64) {
        self.value = value;
        self.pending_delay = self.start_delay;
    }

    pub fn tick(&mut self, dt: Duration) {
        let mut dt = dt;
        if !self.pending_delay.is_zero() {
            if dt < self.pending_delay {
                self.pending_delay -= dt;
                return;
            }
            dt -= self.pending_delay;
            self.pending_delay = Duration::ZERO;
            self.spring.set_target(self.value);
        }
        self.spring.tick(dt);
    }

    /// Value the counter rolls towards
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn current(&self) -> f64 {
        self.spring.position()
    }

    pub fn is_settled(&self) -> bool {
        self.pending_delay.is_zero() && self.spring.target() == self.value && self.spring.is_at_rest()
    }

    /// Text shown on screen, e.g. `1,600+`
    pub fn display(&self) -> String {
        format!("{}{}", group_thousands(self.current().floor() as i64), self.suffix)
    }
}

/// Format an integer with `,` between groups of three digits
pub fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
