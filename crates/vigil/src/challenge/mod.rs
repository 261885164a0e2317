//! Secondary text challenge.
//!
//! When the composite risk is too high at a decision point, the gate arms
//! and the host must show a short random string the user has to type back.
//! An unsolved challenge rotates every countdown period.
//!
//! Rotation invalidates an answer the user may be typing at that moment.
//! That timing is kept as-is; whether it is intended friction or a
//! usability problem is still open.

mod gate;
mod generator;

pub use gate::{Challenge, ChallengeGate, Countdown};
pub use generator::ChallengeGenerator;
