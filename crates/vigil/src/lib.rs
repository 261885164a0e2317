//! # Vigil - behavioral risk engine
//!
//! Watches pointer movement and keystroke timing, fuses both into a
//! composite risk score and decides, at submission time, whether the user
//! must solve a text challenge first.
//!
//! ## Architecture
//! ```text
//! pointer moves ──► PointerActivityMonitor ─┐
//!                                           ├─► RiskFusion ─► ChallengeGate
//! field input ───► InputCadenceMonitor(s) ──┘                    │
//!                                                     text challenge lifecycle
//! ```
//!
//! `EngineController` owns all of it and is driven one event at a time,
//! either directly or through `runtime::run_engine`.

pub mod challenge;
pub mod config;
pub mod controller;
pub mod event;
pub mod fusion;
pub mod monitors;
pub mod notice;
pub mod runtime;
pub mod timer;
pub mod trace;

pub use config::EngineConfig;
pub use controller::{EngineController, InputOutcome, SubmitOutcome};
pub use event::{EngineEvent, InputEvent};
pub use runtime::run_engine;
