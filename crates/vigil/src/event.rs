//! Events exchanged with the host UI layer.

use serde::{Deserialize, Serialize};
use vigil_common::{Decision, FieldId, GateState, RiskAssessment, Score};

use crate::notice::NoticeKind;

/// Raw input from the host UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Pointer moved to (x, y) at `t` ms
    PointerMove { x: f64, y: f64, t: u64 },
    /// Text of `field` after an edit, at `t` ms
    Input { field: FieldId, text: String, t: u64 },
    /// User asked to submit the primary form
    Submit,
    /// User submitted a challenge answer
    Answer { text: String },
}

/// Output for the host UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    RiskUpdated(RiskAssessment),
    GestureIgnored { distance: f64 },
    Decision { decision: Decision, composite: Score },
    Submission { allowed: bool, state: GateState },
    ChallengeIssued { answer: String, generation: u64 },
    ChallengeRotated { answer: String, generation: u64 },
    Verification { matched: bool, state: GateState },
    NoticeRaised { kind: NoticeKind, message: String },
    NoticeDismissed { kind: NoticeKind },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_event_wire_format() {
        let event: InputEvent =
            serde_json::from_str(r#"{"type":"pointer_move","x":10.5,"y":3,"t":1200}"#).unwrap();
        assert_eq!(event, InputEvent::PointerMove { x: 10.5, y: 3.0, t: 1200 });

        let event: InputEvent =
            serde_json::from_str(r#"{"type":"input","field":"password","text":"hunter","t":90}"#).unwrap();
        assert_eq!(
            event,
            InputEvent::Input {
                field: FieldId::from("password"),
                text: "hunter".to_string(),
                t: 90
            }
        );

        let event: InputEvent = serde_json::from_str(r#"{"type":"submit"}"#).unwrap();
        assert_eq!(event, InputEvent::Submit);
    }

    #[test]
    fn test_engine_event_is_tagged() {
        let json = serde_json::to_value(EngineEvent::Verification {
            matched: false,
            state: GateState::Armed,
        })
        .unwrap();
        assert_eq!(json["event"], "verification");
        assert_eq!(json["state"], "armed");
    }
}
