// Strong typing over bare numbers. Newtypes for timestamps and spin ids, plus engine config.

use serde::{Deserialize, Serialize};

use crate::error::WheelError;

/// Monotonic timestamp in microseconds. Newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_micros(us: u64) -> Self {
        Timestamp(us)
    }

    /// From a `performance.now()` style reading. Negative or NaN readings clamp to zero.
    pub fn from_millis_f64(ms: f64) -> Self {
        if ms.is_finite() && ms > 0.0 {
            Timestamp((ms * 1000.0).round() as u64)
        } else {
            Timestamp(0)
        }
    }

    pub fn as_micros(&self) -> u64 {
        self.0
    }

    pub fn as_millis(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    pub fn plus_millis(&self, ms: f64) -> Self {
        Timestamp::from_millis_f64(self.as_millis() + ms)
    }

    /// Milliseconds from `earlier` to `self`, zero if `earlier` is later.
    pub fn millis_since(&self, earlier: Timestamp) -> f64 {
        self.0.saturating_sub(earlier.0) as f64 / 1000.0
    }
}

/// Identifier of one spin, unique for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpinId(u32);

impl SpinId {
    pub fn new(id: u32) -> Self {
        SpinId(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn next(&self) -> Self {
        SpinId(self.0.wrapping_add(1))
    }
}

/// Engine configuration passed from JS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WheelConfig {
    /// Fewest full turns added to every spin.
    #[serde(default = "default_min_rounds")]
    pub min_rounds: u32,
    /// Most full turns added to every spin (inclusive).
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    /// Shortest spin duration (inclusive).
    #[serde(default = "default_min_duration_ms")]
    pub min_duration_ms: f64,
    /// Longest spin duration (exclusive).
    #[serde(default = "default_max_duration_ms")]
    pub max_duration_ms: f64,
    /// How long after the nominal duration the safety timer fires.
    #[serde(default = "default_fallback_slack_ms")]
    pub fallback_slack_ms: f64,
    /// Pause between the wheel stopping and the winner reveal.
    #[serde(default = "default_announce_delay_ms")]
    pub announce_delay_ms: f64,
    /// Redraw ceiling while spinning.
    #[serde(default = "default_max_fps")]
    pub max_fps: f64,
    #[serde(default = "default_sparkle_interval_ms")]
    pub sparkle_interval_ms: u32,
    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: f64,
    /// Key of the one-shot seed entry list in the key-value store.
    #[serde(default = "default_seed_key")]
    pub seed_key: String,
    /// Fixed RNG seed for reproducible spins. `None` draws from the OS.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

fn default_min_rounds() -> u32 {
    8
}

fn default_max_rounds() -> u32 {
    11
}

fn default_min_duration_ms() -> f64 {
    7000.0
}

fn default_max_duration_ms() -> f64 {
    8000.0
}

fn default_fallback_slack_ms() -> f64 {
    100.0
}

fn default_announce_delay_ms() -> f64 {
    300.0
}

fn default_max_fps() -> f64 {
    60.0
}

fn default_sparkle_interval_ms() -> u32 {
    150
}

fn default_resize_debounce_ms() -> f64 {
    100.0
}

fn default_seed_key() -> String {
    "testNames".to_string()
}

impl Default for WheelConfig {
    fn default() -> Self {
        WheelConfig {
            min_rounds: default_min_rounds(),
            max_rounds: default_max_rounds(),
            min_duration_ms: default_min_duration_ms(),
            max_duration_ms: default_max_duration_ms(),
            fallback_slack_ms: default_fallback_slack_ms(),
            announce_delay_ms: default_announce_delay_ms(),
            max_fps: default_max_fps(),
            sparkle_interval_ms: default_sparkle_interval_ms(),
            resize_debounce_ms: default_resize_debounce_ms(),
            seed_key: default_seed_key(),
            rng_seed: None,
        }
    }
}

impl WheelConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, WheelError> {
        let config: WheelConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), WheelError> {
        if self.min_rounds == 0 {
            return Err(WheelError::InvalidConfig(
                "min_rounds must be at least 1".to_string(),
            ));
        }
        if self.max_rounds < self.min_rounds {
            return Err(WheelError::InvalidConfig(format!(
                "max_rounds ({}) is below min_rounds ({})",
                self.max_rounds, self.min_rounds
            )));
        }
        if !(self.min_duration_ms > 0.0) || !(self.max_duration_ms > self.min_duration_ms) {
            return Err(WheelError::InvalidConfig(format!(
                "duration range [{}, {}) is empty",
                self.min_duration_ms, self.max_duration_ms
            )));
        }
        if !(self.max_fps > 0.0) {
            return Err(WheelError::InvalidConfig(
                "max_fps must be positive".to_string(),
            ));
        }
        for (name, value) in [
            ("fallback_slack_ms", self.fallback_slack_ms),
            ("announce_delay_ms", self.announce_delay_ms),
            ("resize_debounce_ms", self.resize_debounce_ms),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(WheelError::InvalidConfig(format!(
                    "{} must be finite and non-negative",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Minimum gap between two rendered spin frames.
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.max_fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_conversions() {
        let ts = Timestamp::from_millis_f64(1_500.25);
        assert_eq!(ts.as_micros(), 1_500_250);
        assert!((ts.as_millis() - 1_500.25).abs() < 0.0001);
        assert_eq!(Timestamp::from_millis_f64(-3.0).as_micros(), 0);
    }

    #[test]
    fn millis_since_saturates() {
        let early = Timestamp::from_micros(1_000);
        let late = Timestamp::from_micros(3_500);
        assert!((late.millis_since(early) - 2.5).abs() < 1e-9);
        assert_eq!(early.millis_since(late), 0.0);
    }

    #[test]
    fn empty_json_yields_defaults() {
        let config = WheelConfig::from_json("{}").unwrap();
        assert_eq!(config.min_rounds, 8);
        assert_eq!(config.max_rounds, 11);
        assert_eq!(config.min_duration_ms, 7000.0);
        assert_eq!(config.announce_delay_ms, 300.0);
        assert_eq!(config.seed_key, "testNames");
        assert!((config.frame_interval_ms() - 16.666).abs() < 0.01);
    }

    #[test]
    fn inverted_rounds_rejected() {
        let err = WheelConfig::from_json(r#"{"min_rounds":5,"max_rounds":2}"#).unwrap_err();
        assert!(matches!(err, WheelError::InvalidConfig(_)));
    }

    #[test]
    fn zero_rounds_rejected() {
        assert!(WheelConfig::from_json(r#"{"min_rounds":0}"#).is_err());
    }

    #[test]
    fn empty_duration_range_rejected() {
        let json = r#"{"min_duration_ms":500,"max_duration_ms":500}"#;
        assert!(WheelConfig::from_json(json).is_err());
    }

    #[test]
    fn unbounded_delays_rejected() {
        for config in [
            WheelConfig {
                announce_delay_ms: f64::INFINITY,
                ..Default::default()
            },
            WheelConfig {
                fallback_slack_ms: f64::INFINITY,
                ..Default::default()
            },
            WheelConfig {
                resize_debounce_ms: f64::NAN,
                ..Default::default()
            },
        ] {
            assert!(matches!(
                config.validate(),
                Err(WheelError::InvalidConfig(_))
            ));
        }
    }
}
