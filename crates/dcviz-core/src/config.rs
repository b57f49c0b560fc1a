//! Clamped configuration values.
//!
//! Nothing at the configuration boundary is ever rejected: sizes, digit
//! counts and intervals are pulled into their supported range instead.
//!
//! Environment overrides (merged over explicit options by
//! [`PlaybackConfig::with_env`]):
//! - `DCVIZ_INTERVAL_MS` = `<u64>` auto-play period in milliseconds
//! - `DCVIZ_SEED` = `<u64>` seed for random input generation

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Shortest auto-play period.
pub const INTERVAL_MIN_MS: u64 = 100;
/// Longest auto-play period.
pub const INTERVAL_MAX_MS: u64 = 1500;
/// Auto-play period used when none is given.
pub const INTERVAL_DEFAULT_MS: u64 = 500;

/// Inclusive integer range with a default, e.g. an input size slider.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bounds {
    /// Smallest accepted value.
    pub min: usize,
    /// Largest accepted value.
    pub max: usize,
    /// Value used when none is given.
    pub default: usize,
}

impl Bounds {
    /// Create bounds; `default` should lie in `[min, max]`.
    #[inline]
    #[must_use]
    pub const fn new(min: usize, max: usize, default: usize) -> Self {
        Self { min, max, default }
    }

    /// Pull `v` into `[min, max]`.
    #[inline]
    #[must_use]
    pub fn clamp(&self, v: usize) -> usize {
        v.clamp(self.min, self.max)
    }

    /// Clamp `v`, using the default when absent.
    #[inline]
    #[must_use]
    pub fn clamp_or_default(&self, v: Option<usize>) -> usize {
        self.clamp(v.unwrap_or(self.default))
    }
}

/// Clamp an auto-play period into `[INTERVAL_MIN_MS, INTERVAL_MAX_MS]`.
#[inline]
#[must_use]
pub fn clamp_interval(ms: u64) -> Duration {
    Duration::from_millis(ms.clamp(INTERVAL_MIN_MS, INTERVAL_MAX_MS))
}

/// Playback options shared by every visualizer.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaybackConfig {
    /// Auto-play period in milliseconds (clamped on use).
    pub interval_ms: u64,
    /// Seed for random input generation (`None` = entropy).
    pub seed: Option<u64>,
}

impl Default for PlaybackConfig {
    #[inline]
    fn default() -> Self {
        Self {
            interval_ms: INTERVAL_DEFAULT_MS,
            seed: None,
        }
    }
}

impl PlaybackConfig {
    /// The clamped auto-play period.
    #[inline]
    #[must_use]
    pub fn interval(&self) -> Duration {
        clamp_interval(self.interval_ms)
    }

    /// Merge environment overrides into these options.
    ///
    /// Unparseable values are ignored.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_vars(|key| std::env::var(key).ok())
    }

    fn with_vars(mut self, get: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = get("DCVIZ_INTERVAL_MS").and_then(|s| s.trim().parse::<u64>().ok()) {
            self.interval_ms = v;
        }
        if let Some(v) = get("DCVIZ_SEED").and_then(|s| s.trim().parse::<u64>().ok()) {
            self.seed = Some(v);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_clamp() {
        let b = Bounds::new(2, 30, 10);
        assert_eq!(b.clamp(0), 2);
        assert_eq!(b.clamp(99), 30);
        assert_eq!(b.clamp(7), 7);
        assert_eq!(b.clamp_or_default(None), 10);
    }

    #[test]
    fn interval_is_clamped() {
        assert_eq!(clamp_interval(0), Duration::from_millis(100));
        assert_eq!(clamp_interval(10_000), Duration::from_millis(1500));
        assert_eq!(clamp_interval(700), Duration::from_millis(700));
        let cfg = PlaybackConfig { interval_ms: 5, seed: None };
        assert_eq!(cfg.interval(), Duration::from_millis(100));
    }

    #[test]
    fn env_overrides_parse_or_ignore() {
        let cfg = PlaybackConfig::default().with_vars(|k| match k {
            "DCVIZ_INTERVAL_MS" => Some("250".into()),
            "DCVIZ_SEED" => Some("not-a-number".into()),
            _ => None,
        });
        assert_eq!(cfg.interval_ms, 250);
        assert_eq!(cfg.seed, None);
    }
}
