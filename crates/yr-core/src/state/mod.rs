//! Tunable constants for the slideshow core

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::navigation::MediaId;

/// Settings read by the page navigator and its gesture adapters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Number of slides in the presentation
    pub total_pages: usize,

    /// Lock held after an accepted transition, in milliseconds.
    /// Independent of how long the renderer actually animates.
    pub cooldown_ms: u64,

    /// Minimum absolute wheel delta that counts as a page gesture
    pub wheel_threshold: f32,

    /// Minimum absolute vertical swipe distance that counts as a page gesture
    pub touch_threshold: f32,

    /// Media identifiers that never gate forward navigation
    pub exempt_media: Vec<MediaId>,
}

impl NavigatorConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Check the values the navigator relies on
    pub fn validate(&self) -> Result<(), String> {
        if self.total_pages == 0 {
            return Err("total_pages must be at least 1".to_string());
        }
        if !self.wheel_threshold.is_finite() || self.wheel_threshold < 0.0 {
            return Err(format!("wheel_threshold must be a non-negative number (got {})", self.wheel_threshold));
        }
        if !self.touch_threshold.is_finite() || self.touch_threshold < 0.0 {
            return Err(format!("touch_threshold must be a non-negative number (got {})", self.touch_threshold));
        }
        Ok(())
    }
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            total_pages: 26,
            cooldown_ms: 1200,
            wheel_threshold: 30.0,
            touch_threshold: 50.0,
            // The film-strip slide has no single gating image
            exempt_media: vec![MediaId(24)],
        }
    }
}

/// Intro loading screen pacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Percentage added per interval
    pub step: u32,
    pub interval_ms: u64,
}

impl LoadingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            step: 2,
            interval_ms: 50,
        }
    }
}

/// Spring parameters for statistic counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    pub mass: f64,
    pub stiffness: f64,
    pub damping: f64,
    /// Delay before the counter starts moving towards its value
    pub start_delay_ms: u64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            mass: 1.0,
            stiffness: 40.0,
            damping: 20.0,
            start_delay_ms: 500,
        }
    }
}

/// Application settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub navigation: NavigatorConfig,
    pub loading: LoadingConfig,
    pub ticker: TickerConfig,
}

impl AppSettings {
    pub fn validate(&self) -> Result<(), String> {
        self.navigation.validate()?;
        if self.loading.step == 0 {
            return Err("loading.step must be at least 1".to_string());
        }
        if self.ticker.mass <= 0.0 || self.ticker.stiffness <= 0.0 || self.ticker.damping < 0.0 {
            return Err("ticker spring needs positive mass and stiffness and non-negative damping".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = AppSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.navigation.total_pages, 26);
        assert_eq!(settings.navigation.cooldown(), Duration::from_millis(1200));
        assert_eq!(settings.navigation.exempt_media, vec![MediaId(24)]);
    }

    #[test]
    fn test_validate_rejects_empty_presentation() {
        let config = NavigatorConfig {
            total_pages: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_threshold() {
        let config = NavigatorConfig {
            wheel_threshold: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let settings = AppSettings {
            loading: LoadingConfig { step: 0, interval_ms: 50 },
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }
}
