//! Configuration management for the Vigil engine.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use vigil_common::VigilError;
use vigil_common::constants::{DEFAULT_MONITORED_FIELDS, cadence, challenge, fusion, pointer};

/// Engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Text fields to monitor for keystroke cadence
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,

    /// Pointer movement scoring
    #[serde(default)]
    pub pointer: PointerConfig,

    /// Keystroke cadence scoring
    #[serde(default)]
    pub cadence: CadenceConfig,

    /// Score fusion
    #[serde(default)]
    pub fusion: FusionConfig,

    /// Secondary text challenge
    #[serde(default)]
    pub challenge: ChallengeConfig,
}

/// Pointer-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PointerConfig {
    /// Quiet period that ends a gesture (ms)
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_ms: u64,

    /// Gestures shorter than this are ignored (px)
    #[serde(default = "default_min_distance")]
    pub min_distance_px: f64,

    /// Deviation below which a gesture counts as straight (px)
    #[serde(default = "default_sensibility")]
    pub sensibility: f64,

    /// EMA smoothing factor, (0, 1]
    #[serde(default = "default_smoothing")]
    pub smoothing: f64,

    /// Suspicious speed threshold (px/s)
    #[serde(default = "default_max_speed")]
    pub max_speed_px_per_sec: f64,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: default_idle_timeout(),
            min_distance_px: default_min_distance(),
            sensibility: default_sensibility(),
            smoothing: default_smoothing(),
            max_speed_px_per_sec: default_max_speed(),
        }
    }
}

impl PointerConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }
}

/// Cadence-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CadenceConfig {
    /// Intervals kept in the rolling history
    #[serde(default = "default_history_len")]
    pub history_len: usize,

    /// Fast-typing threshold (ms)
    #[serde(default = "default_fast_threshold")]
    pub fast_threshold_ms: f64,

    /// Uniform-cadence threshold (ms)
    #[serde(default = "default_consistency_threshold")]
    pub consistency_threshold_ms: f64,

    /// Trailing identical characters treated as a held key
    #[serde(default = "default_repeat_run")]
    pub repeat_run: usize,

    /// Divisor for fast-typing adjustments
    #[serde(default = "default_speed_tuner")]
    pub speed_tuner: f64,

    /// Divisor for uniform-cadence adjustments
    #[serde(default = "default_consistency_tuner")]
    pub consistency_tuner: f64,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            history_len: default_history_len(),
            fast_threshold_ms: default_fast_threshold(),
            consistency_threshold_ms: default_consistency_threshold(),
            repeat_run: default_repeat_run(),
            speed_tuner: default_speed_tuner(),
            consistency_tuner: default_consistency_tuner(),
        }
    }
}

/// Fusion configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FusionConfig {
    /// Pointer weight (%)
    #[serde(default = "default_pointer_weight")]
    pub pointer_weight_pct: f64,

    /// Cadence weight (%)
    #[serde(default = "default_cadence_weight")]
    pub cadence_weight_pct: f64,

    /// Composite above this is bot-like
    #[serde(default = "default_bot_threshold")]
    pub bot_like_threshold: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            pointer_weight_pct: default_pointer_weight(),
            cadence_weight_pct: default_cadence_weight(),
            bot_like_threshold: default_bot_threshold(),
        }
    }
}

/// Challenge configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChallengeConfig {
    /// Composite above this arms the gate
    #[serde(default = "default_gate_threshold")]
    pub threshold: f64,

    /// Answer length in characters
    #[serde(default = "default_answer_len")]
    pub answer_len: usize,

    /// Answer alphabet
    #[serde(default = "default_alphabet")]
    pub alphabet: String,

    /// Rotation period (ms)
    #[serde(default = "default_rotation")]
    pub rotation_ms: u64,

    /// Countdown tick resolution (ms)
    #[serde(default = "default_tick")]
    pub tick_ms: u64,

    /// Notice lifetime (ms)
    #[serde(default = "default_notice_dismiss")]
    pub notice_dismiss_ms: u64,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            threshold: default_gate_threshold(),
            answer_len: default_answer_len(),
            alphabet: default_alphabet(),
            rotation_ms: default_rotation(),
            tick_ms: default_tick(),
            notice_dismiss_ms: default_notice_dismiss(),
        }
    }
}

impl ChallengeConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn notice_dismiss(&self) -> Duration {
        Duration::from_millis(self.notice_dismiss_ms)
    }
}

// Default value functions
fn default_fields() -> Vec<String> { DEFAULT_MONITORED_FIELDS.iter().map(|f| f.to_string()).collect() }
fn default_idle_timeout() -> u64 { pointer::IDLE_TIMEOUT_MS }
fn default_min_distance() -> f64 { pointer::MIN_DISTANCE_PX }
fn default_sensibility() -> f64 { pointer::STRAIGHTNESS_SENSIBILITY }
fn default_smoothing() -> f64 { pointer::SMOOTHING }
fn default_max_speed() -> f64 { pointer::MAX_SPEED_PX_PER_SEC }
fn default_history_len() -> usize { cadence::HISTORY_LEN }
fn default_fast_threshold() -> f64 { cadence::FAST_THRESHOLD_MS }
fn default_consistency_threshold() -> f64 { cadence::CONSISTENCY_THRESHOLD_MS }
fn default_repeat_run() -> usize { cadence::REPEAT_RUN }
fn default_speed_tuner() -> f64 { cadence::SPEED_TUNER }
fn default_consistency_tuner() -> f64 { cadence::CONSISTENCY_TUNER }
fn default_pointer_weight() -> f64 { fusion::POINTER_WEIGHT_PCT }
fn default_cadence_weight() -> f64 { fusion::CADENCE_WEIGHT_PCT }
fn default_bot_threshold() -> f64 { fusion::BOT_LIKE_THRESHOLD }
fn default_gate_threshold() -> f64 { challenge::GATE_THRESHOLD }
fn default_answer_len() -> usize { challenge::ANSWER_LEN }
fn default_alphabet() -> String { challenge::ALPHABET.to_string() }
fn default_rotation() -> u64 { challenge::ROTATION_MS } // 30 seconds
fn default_tick() -> u64 { challenge::TICK_MS }
fn default_notice_dismiss() -> u64 { challenge::NOTICE_DISMISS_MS } // 3 seconds

impl EngineConfig {
    /// Load configuration from file (if present) and `VIGIL__*` environment overrides
    pub fn load(config_path: &str) -> Result<Self> {
        let mut builder = config::Config::builder();

        if Path::new(config_path).exists() {
            builder = builder.add_source(config::File::with_name(config_path));
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("VIGIL").separator("__"))
            .build()
            .context("Failed to load config sources")?;

        let config: Self = settings
            .try_deserialize()
            .context("Failed to parse config")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would break scoring invariants
    pub fn validate(&self) -> vigil_common::Result<()> {
        let weights = self.fusion.pointer_weight_pct + self.fusion.cadence_weight_pct;
        if (weights - 100.0).abs() > f64::EPSILON * 100.0 {
            return Err(VigilError::Config(format!(
                "fusion weights must add up to 100%, got {weights}%"
            )));
        }
        if self.fusion.pointer_weight_pct < 0.0 || self.fusion.cadence_weight_pct < 0.0 {
            return Err(VigilError::Config("fusion weights must not be negative".into()));
        }
        if !(self.pointer.smoothing > 0.0 && self.pointer.smoothing <= 1.0) {
            return Err(VigilError::Config(format!(
                "pointer.smoothing must be in (0, 1], got {}",
                self.pointer.smoothing
            )));
        }
        if self.pointer.idle_timeout_ms == 0 {
            return Err(VigilError::Config("pointer.idle_timeout_ms must be positive".into()));
        }
        if self.cadence.history_len == 0 {
            return Err(VigilError::Config("cadence.history_len must be positive".into()));
        }
        if self.cadence.speed_tuner <= 0.0 || self.cadence.consistency_tuner <= 0.0 {
            return Err(VigilError::Config("cadence tuners must be positive".into()));
        }
        if self.challenge.answer_len == 0 {
            return Err(VigilError::Config("challenge.answer_len must be positive".into()));
        }
        if self.challenge.alphabet.is_empty() {
            return Err(VigilError::Config("challenge.alphabet must not be empty".into()));
        }
        if self.challenge.tick_ms == 0 || self.challenge.rotation_ms == 0 {
            return Err(VigilError::Config("challenge timings must be positive".into()));
        }
        if self.challenge.rotation_ms % self.challenge.tick_ms != 0 {
            return Err(VigilError::Config(format!(
                "challenge.rotation_ms ({}) must be a multiple of tick_ms ({})",
                self.challenge.rotation_ms, self.challenge.tick_ms
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fields: default_fields(),
            pointer: PointerConfig::default(),
            cadence: CadenceConfig::default(),
            fusion: FusionConfig::default(),
            challenge: ChallengeConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        tokio_test::assert_ok!(config.validate());
        assert_eq!(config.fields, vec!["first-name", "last-name", "password"]);
        assert_eq!(config.cadence.history_len, 16);
        assert_eq!(config.challenge.rotation_ms / config.challenge.tick_ms, 600);
    }

    #[test]
    fn test_weights_must_sum_to_100() {
        let mut config = EngineConfig::default();
        config.fusion.pointer_weight_pct = 30.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, VigilError::Config(_)));
    }

    #[test]
    fn test_smoothing_range() {
        let mut config = EngineConfig::default();
        config.pointer.smoothing = 0.0;
        assert!(config.validate().is_err());
        config.pointer.smoothing = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tick_must_divide_rotation() {
        let mut config = EngineConfig::default();
        config.challenge.tick_ms = 70;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = EngineConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config.challenge.answer_len, 5);
        assert_eq!(config.pointer.idle_timeout_ms, 100);
    }
}
