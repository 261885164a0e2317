//! Behavioral signal monitors.
//!
//! Each monitor turns raw UI events into its own independently maintained
//! score. Neither monitor knows about fusion or the challenge gate; the
//! controller passes their scores on explicitly.

mod cadence;
mod pointer;

pub use cadence::{CadenceHistory, CadenceOutcome, CadenceRegime, CadenceReport, InputCadenceMonitor};
pub use pointer::{GestureOutcome, GestureReport, PointerActivityMonitor};
