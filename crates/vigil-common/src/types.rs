//! Core types shared across Vigil components.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::fusion::BOT_LIKE_THRESHOLD;
use crate::math::normalize_score;

/// Behavioral score in [0, 100], kept at two decimal places.
///
/// Higher means more automation-like. Every constructor clamps and rounds,
/// so a `Score` can never leave its range no matter what arithmetic
/// produced the raw value.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Score(f64);

impl Score {
    pub const ZERO: Score = Score(0.0);
    pub const MAX: Score = Score(100.0);

    /// Create a new Score, clamping to [0, 100] and rounding to 2 decimals
    pub fn new(value: f64) -> Self {
        Self(normalize_score(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    /// Apply a signed adjustment and renormalize
    pub fn adjusted(self, delta: f64) -> Self {
        Self::new(self.0 + delta)
    }
}

impl From<f64> for Score {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Classification of a composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskClass {
    HumanLike,
    BotLike,
}

impl RiskClass {
    /// Classify against the default bot-like threshold (strictly greater is bot-like)
    pub fn classify(composite: Score) -> Self {
        Self::classify_with(composite, BOT_LIKE_THRESHOLD)
    }

    pub fn classify_with(composite: Score, threshold: f64) -> Self {
        if composite.value() > threshold {
            Self::BotLike
        } else {
            Self::HumanLike
        }
    }

    pub fn is_bot_like(&self) -> bool {
        matches!(self, Self::BotLike)
    }
}

impl fmt::Display for RiskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HumanLike => f.write_str("Human-like"),
            Self::BotLike => f.write_str("Bot-like"),
        }
    }
}

/// Snapshot of the fused risk estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Pointer score that went into the fusion
    pub pointer: Score,

    /// Cadence score that went into the fusion
    pub cadence: Score,

    /// Weighted composite
    pub composite: Score,

    pub class: RiskClass,

    /// Unix epoch milliseconds at computation time
    pub computed_at: i64,
}

impl RiskAssessment {
    pub fn new(pointer: Score, cadence: Score, composite: Score, class: RiskClass) -> Self {
        Self {
            pointer,
            cadence,
            composite,
            class,
            computed_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Outcome of the gate at a decision point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Low risk: the primary submission may proceed
    SubmitDirectly,
    /// High risk: a text challenge must be solved first
    ChallengeRequired,
}

/// Challenge gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateState {
    /// No challenge pending, submission allowed
    #[default]
    Idle,
    /// Challenge live, submission blocked
    Armed,
    /// Countdown ran out, challenge awaiting rotation
    Expired,
    /// Challenge answered correctly, submission allowed
    Solved,
}

impl GateState {
    /// Returns true if the primary submission path is open
    pub fn allows_submission(&self) -> bool {
        matches!(self, Self::Idle | Self::Solved)
    }

    /// Returns true while a challenge blocks submission
    pub fn should_challenge(&self) -> bool {
        matches!(self, Self::Armed | Self::Expired)
    }
}

/// Pointer position in client pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        crate::math::distance(self.x, self.y, other.x, other.y)
    }
}

/// Identity of a monitored text field
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_clamps_and_rounds() {
        assert_eq!(Score::new(150.0), Score::MAX);
        assert_eq!(Score::new(-20.0), Score::ZERO);
        assert_eq!(Score::new(33.3333).value(), 33.33);
        assert_eq!(Score::new(10.0).adjusted(-12.5), Score::ZERO);
    }

    #[test]
    fn test_risk_class_boundary() {
        assert_eq!(RiskClass::classify(Score::new(25.0)), RiskClass::HumanLike);
        assert_eq!(RiskClass::classify(Score::new(25.01)), RiskClass::BotLike);
        assert_eq!(RiskClass::BotLike.to_string(), "Bot-like");
    }

    #[test]
    fn test_risk_class_serialization() {
        let json = serde_json::to_string(&RiskClass::HumanLike).unwrap();
        assert_eq!(json, "\"human-like\"");
    }

    #[test]
    fn test_gate_state_submission() {
        assert!(GateState::Idle.allows_submission());
        assert!(GateState::Solved.allows_submission());
        assert!(!GateState::Armed.allows_submission());
        assert!(GateState::Expired.should_challenge());
    }
}
