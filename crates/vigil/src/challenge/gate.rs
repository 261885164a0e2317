//! Challenge gate state machine.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use vigil_common::{Decision, GateState, Score};

use super::ChallengeGenerator;
use crate::config::ChallengeConfig;

/// The live challenge
#[derive(Debug, Clone, Serialize)]
pub struct Challenge {
    /// Expected answer
    pub answer: String,
    /// Countdown left before rotation (ms)
    pub remaining_ms: u64,
    /// Increments on every issue or rotation
    pub generation: u64,
    /// Unix epoch milliseconds
    pub issued_at: i64,
}

/// Result of a countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    /// Gate is not armed; nothing to count
    Inactive,
    Running { remaining_ms: u64 },
    /// Countdown hit zero; the caller must rotate
    Expired,
}

/// Decides between direct submission and a text challenge
pub struct ChallengeGate<R = StdRng> {
    settings: ChallengeConfig,
    generator: ChallengeGenerator,
    state: GateState,
    challenge: Option<Challenge>,
    generation: u64,
    rng: R,
}

impl ChallengeGate<StdRng> {
    pub fn new(settings: ChallengeConfig) -> Self {
        Self::with_rng(settings, StdRng::from_os_rng())
    }
}

impl<R: Rng> ChallengeGate<R> {
    pub fn with_rng(settings: ChallengeConfig, rng: R) -> Self {
        let generator = ChallengeGenerator::from_config(&settings);
        Self {
            settings,
            generator,
            state: GateState::Idle,
            challenge: None,
            generation: 0,
            rng,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn should_challenge(&self) -> bool {
        self.state.should_challenge()
    }

    pub fn challenge(&self) -> Option<&Challenge> {
        self.challenge.as_ref()
    }

    pub fn expected_answer(&self) -> Option<&str> {
        self.challenge.as_ref().map(|c| c.answer.as_str())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Decide against the configured threshold
    pub fn decide(&mut self, composite: Score) -> Decision {
        self.decide_with(composite, self.settings.threshold)
    }

    /// Arm (and issue a challenge) if `composite` exceeds `threshold`,
    /// otherwise fall back to idle.
    pub fn decide_with(&mut self, composite: Score, threshold: f64) -> Decision {
        if composite.value() > threshold {
            self.generate_challenge();
            tracing::info!(
                composite = %composite,
                threshold = threshold,
                "Bot-like behavior detected, challenge required"
            );
            Decision::ChallengeRequired
        } else {
            self.state = GateState::Idle;
            self.challenge = None;
            tracing::debug!(composite = %composite, threshold = threshold, "Direct submission allowed");
            Decision::SubmitDirectly
        }
    }

    /// Issue a fresh challenge, replacing any previous one, and restart the countdown
    pub fn generate_challenge(&mut self) -> &str {
        self.generation += 1;
        let answer = self.generator.generate(&mut self.rng);
        self.state = GateState::Armed;

        tracing::debug!(generation = self.generation, "Issued text challenge");

        let challenge = self.challenge.insert(Challenge {
            answer,
            remaining_ms: self.settings.rotation_ms,
            generation: self.generation,
            issued_at: chrono::Utc::now().timestamp_millis(),
        });
        &challenge.answer
    }

    /// Advance the countdown by one tick
    pub fn tick(&mut self) -> Countdown {
        if self.state != GateState::Armed {
            return Countdown::Inactive;
        }
        let Some(challenge) = self.challenge.as_mut() else {
            return Countdown::Inactive;
        };

        challenge.remaining_ms = challenge.remaining_ms.saturating_sub(self.settings.tick_ms);
        if challenge.remaining_ms == 0 {
            self.state = GateState::Expired;
            Countdown::Expired
        } else {
            Countdown::Running {
                remaining_ms: challenge.remaining_ms,
            }
        }
    }

    /// Replace an expired (or still armed) challenge with a new one
    pub fn rotate(&mut self) -> Option<&str> {
        if !self.should_challenge() {
            return None;
        }
        Some(self.generate_challenge())
    }

    /// Exact comparison against the live answer. Only an armed gate can be solved.
    pub fn verify(&mut self, input: &str) -> bool {
        if self.state != GateState::Armed {
            tracing::debug!(state = ?self.state, "Verification attempted without a live challenge");
            return false;
        }

        let matched = self.expected_answer() == Some(input);
        if matched {
            self.state = GateState::Solved;
            self.challenge = None;
            tracing::info!(generation = self.generation, "Text challenge solved");
        } else {
            tracing::debug!(generation = self.generation, "Text challenge failed");
        }
        matched
    }

    /// The submit control is only enabled for inputs of the answer length
    pub fn is_submittable(&self, input: &str) -> bool {
        input.chars().count() == self.generator.length()
    }

    /// Fraction of the countdown left, in [0, 1]
    pub fn progress(&self) -> f64 {
        match &self.challenge {
            Some(c) if self.settings.rotation_ms > 0 => {
                c.remaining_ms as f64 / self.settings.rotation_ms as f64
            }
            _ => 0.0,
        }
    }
}
