//! # Vigil Common
//!
//! Shared types, constants, and numeric helpers used across Vigil components.
//!
//! ## Modules
//! - `types` - Core data structures (Score, RiskClass, GateState, etc.)
//! - `error` - Common error types
//! - `constants` - Default tuning constants for every scorer
//! - `math` - Clamping and fixed-precision rounding

pub mod constants;
pub mod error;
pub mod math;
pub mod types;

pub use error::{Result, VigilError};
pub use types::*;
