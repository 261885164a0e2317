//! Engine controller: owns every monitor and routes UI events through
//! scoring, fusion and the challenge gate.
//!
//! Handlers run to completion one at a time. Each returns its direct
//! outcome and queues `EngineEvent`s for the host, drained with
//! `drain_events()`.

use std::collections::BTreeMap;
use std::time::Duration;

use vigil_common::{Decision, FieldId, GateState, Result, RiskAssessment, Score, VigilError};

use crate::challenge::{ChallengeGate, Countdown};
use crate::config::EngineConfig;
use crate::event::{EngineEvent, InputEvent};
use crate::fusion::RiskFusion;
use crate::monitors::{CadenceOutcome, GestureOutcome, InputCadenceMonitor, PointerActivityMonitor};
use crate::notice::{NoticeBoard, NoticeKind};

/// Result of a text-input event
#[derive(Debug, Clone)]
pub enum InputOutcome {
    /// No monitor registered for this field
    Unmonitored,
    Cadence(CadenceOutcome),
}

/// Result of a submit request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Submission may proceed
    Proceed,
    /// A live challenge blocks submission
    Blocked,
    /// Risk too high; a challenge was just issued
    Challenged,
}

pub struct EngineController {
    config: EngineConfig,
    pointer: PointerActivityMonitor,
    fields: BTreeMap<FieldId, InputCadenceMonitor>,
    fusion: RiskFusion,
    gate: ChallengeGate,
    notices: NoticeBoard,
    outbox: Vec<EngineEvent>,
}

impl EngineController {
    /// Build the engine, registering a cadence monitor for every configured
    /// field the host reports as present.
    pub fn new(config: EngineConfig, present_fields: &[FieldId]) -> Result<Self> {
        Self::with_gate(config.clone(), present_fields, ChallengeGate::new(config.challenge))
    }

    pub fn with_gate(
        config: EngineConfig,
        present_fields: &[FieldId],
        gate: ChallengeGate,
    ) -> Result<Self> {
        config.validate()?;

        let mut fields = BTreeMap::new();
        for name in &config.fields {
            let id = FieldId::new(name.as_str());
            if !present_fields.contains(&id) {
                tracing::warn!(field = %id, "Monitored field not present, skipping");
                continue;
            }
            let monitor = InputCadenceMonitor::new(id.clone(), config.cadence.clone());
            if fields.insert(id.clone(), monitor).is_some() {
                return Err(VigilError::Config(format!("field '{id}' configured twice")));
            }
        }
        tracing::info!(fields = fields.len(), "Cadence monitors registered");

        Ok(Self {
            pointer: PointerActivityMonitor::new(config.pointer.clone()),
            fusion: RiskFusion::new(config.fusion.clone()),
            config,
            fields,
            gate,
            notices: NoticeBoard::new(),
            outbox: Vec::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn idle_timeout(&self) -> Duration {
        self.config.pointer.idle_timeout()
    }

    pub fn monitored_fields(&self) -> impl Iterator<Item = &FieldId> {
        self.fields.keys()
    }

    pub fn pointer_score(&self) -> Score {
        self.pointer.current_score()
    }

    pub fn cadence_score(&self, field: &FieldId) -> Option<Score> {
        self.fields.get(field).map(|m| m.current_score())
    }

    /// Cadence input to fusion: the riskiest field
    pub fn fused_cadence_score(&self) -> Score {
        self.fields
            .values()
            .map(|m| m.current_score())
            .fold(Score::ZERO, |acc, s| if s > acc { s } else { acc })
    }

    pub fn composite(&self) -> Score {
        self.fusion.composite()
    }

    pub fn assessment(&self) -> Option<&RiskAssessment> {
        self.fusion.last()
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    pub fn expected_answer(&self) -> Option<&str> {
        self.gate.expected_answer()
    }

    pub fn challenge_progress(&self) -> f64 {
        self.gate.progress()
    }

    pub fn is_answer_submittable(&self, input: &str) -> bool {
        self.gate.is_submittable(input)
    }

    pub fn notice_live(&self, kind: NoticeKind) -> bool {
        self.notices.is_live(kind)
    }

    /// Take the events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Dispatch a host event
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { x, y, t } => self.on_pointer_move(x, y, t),
            InputEvent::Input { field, text, t } => {
                self.on_input(&field, &text, t);
            }
            InputEvent::Submit => {
                self.on_submit();
            }
            InputEvent::Answer { text } => {
                self.on_answer(&text);
            }
        }
    }

    /// The caller must (re)arm the idle timer after every move
    pub fn on_pointer_move(&mut self, x: f64, y: f64, t: u64) {
        self.pointer.on_pointer_move(x, y, t);
    }

    pub fn on_idle_timeout(&mut self) -> Option<GestureOutcome> {
        let outcome = self.pointer.on_idle_timeout()?;
        match &outcome {
            GestureOutcome::Ignored { distance } => {
                self.outbox.push(EngineEvent::GestureIgnored { distance: *distance });
            }
            GestureOutcome::Scored(_) => self.recompute_risk(),
        }
        Some(outcome)
    }

    pub fn on_input(&mut self, field: &FieldId, text: &str, t: u64) -> InputOutcome {
        let Some(monitor) = self.fields.get_mut(field) else {
            tracing::trace!(field = %field, "Input on unmonitored field");
            return InputOutcome::Unmonitored;
        };

        let outcome = monitor.on_input(text, t);
        if matches!(outcome, CadenceOutcome::Scored(_)) {
            self.recompute_risk();
        }
        InputOutcome::Cadence(outcome)
    }

    /// Decision point: let the submission through or demand a challenge
    pub fn on_submit(&mut self) -> SubmitOutcome {
        let state = self.gate.state();
        if state.should_challenge() {
            self.outbox.push(EngineEvent::Submission { allowed: false, state });
            return SubmitOutcome::Blocked;
        }
        if state == GateState::Solved {
            self.outbox.push(EngineEvent::Submission { allowed: true, state });
            return SubmitOutcome::Proceed;
        }

        let composite = self.fusion.composite();
        let decision = self.gate.decide(composite);
        self.outbox.push(EngineEvent::Decision { decision, composite });

        match decision {
            Decision::SubmitDirectly => {
                self.outbox.push(EngineEvent::Submission {
                    allowed: true,
                    state: self.gate.state(),
                });
                SubmitOutcome::Proceed
            }
            Decision::ChallengeRequired => {
                self.push_challenge(false);
                self.raise_notice(NoticeKind::BotSuspected);
                SubmitOutcome::Challenged
            }
        }
    }

    pub fn on_answer(&mut self, text: &str) -> bool {
        let live = self.gate.should_challenge();
        let matched = self.gate.verify(text);
        if live && !matched {
            self.raise_notice(NoticeKind::ChallengeFailed);
        }
        self.outbox.push(EngineEvent::Verification {
            matched,
            state: self.gate.state(),
        });
        matched
    }

    /// Advance the challenge countdown; rotates the challenge on expiry
    pub fn on_countdown_tick(&mut self) -> Countdown {
        let countdown = self.gate.tick();
        if countdown == Countdown::Expired && self.gate.rotate().is_some() {
            tracing::debug!(generation = self.gate.generation(), "Challenge rotated");
            self.push_challenge(true);
        }
        countdown
    }

    pub fn dismiss_notice(&mut self, kind: NoticeKind) -> bool {
        let dismissed = self.notices.dismiss(kind);
        if dismissed {
            self.outbox.push(EngineEvent::NoticeDismissed { kind });
        }
        dismissed
    }

    /// Drop transient state so no stale analysis survives teardown
    pub fn teardown(&mut self) {
        self.pointer.reset();
    }

    fn recompute_risk(&mut self) {
        let assessment = self
            .fusion
            .recompute(self.pointer.current_score(), self.fused_cadence_score());
        self.outbox.push(EngineEvent::RiskUpdated(assessment));
    }

    fn push_challenge(&mut self, rotated: bool) {
        let Some(challenge) = self.gate.challenge() else {
            return;
        };
        let answer = challenge.answer.clone();
        let generation = challenge.generation;
        self.outbox.push(if rotated {
            EngineEvent::ChallengeRotated { answer, generation }
        } else {
            EngineEvent::ChallengeIssued { answer, generation }
        });
    }

    fn raise_notice(&mut self, kind: NoticeKind) {
        if self.notices.raise(kind) {
            self.outbox.push(EngineEvent::NoticeRaised {
                kind,
                message: kind.message().to_string(),
            });
        }
    }
}
