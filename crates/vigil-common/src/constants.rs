//! Shared constants for Vigil components.

/// Lower bound of every behavioral score
pub const SCORE_MIN: f64 = 0.0;

/// Upper bound of every behavioral score
pub const SCORE_MAX: f64 = 100.0;

/// Decimal places kept after every score update
pub const SCORE_PRECISION: u32 = 2;

/// Pointer movement scoring
pub mod pointer {
    /// Idle gap after the last move that closes a gesture (ms)
    pub const IDLE_TIMEOUT_MS: u64 = 100;

    /// Gestures shorter than this are treated as noise (px)
    pub const MIN_DISTANCE_PX: f64 = 50.0;

    /// Max path/chord deviation for a gesture to count as straight (px)
    pub const STRAIGHTNESS_SENSIBILITY: f64 = 0.25;

    /// EMA smoothing factor applied to the pointer score
    pub const SMOOTHING: f64 = 0.1;

    /// Speed above which movement is suspicious (px/s)
    pub const MAX_SPEED_PX_PER_SEC: f64 = 2000.0;

    /// Fixed penalty for a suspiciously fast gesture
    pub const FAST_BASE_PENALTY: f64 = 20.0;

    /// Speed divisor for the variable part of the fast penalty
    pub const FAST_SPEED_DIVISOR: f64 = 5000.0;

    /// Fixed penalty for a straight gesture
    pub const STRAIGHT_BASE_PENALTY: f64 = 40.0;

    /// Fixed reward for a curved gesture
    pub const CURVED_BASE_REWARD: f64 = 10.0;

    /// Cap on the deviation-dependent part of the curve reward
    pub const CURVED_DEVIATION_CAP: f64 = 5.0;
}

/// Keystroke cadence scoring
pub mod cadence {
    /// Inter-keystroke intervals kept for the rolling mean
    pub const HISTORY_LEN: usize = 16;

    /// Intervals below this are considered fast typing (ms)
    pub const FAST_THRESHOLD_MS: f64 = 50.0;

    /// Intervals within this of the mean are considered uniform (ms)
    pub const CONSISTENCY_THRESHOLD_MS: f64 = 20.0;

    /// Identical trailing characters that mark a held key
    pub const REPEAT_RUN: usize = 3;

    /// Divisor for the fast-typing penalty (lower = harsher)
    pub const SPEED_TUNER: f64 = 5.0;

    /// Divisor for the uniform-cadence penalty
    pub const CONSISTENCY_TUNER: f64 = 8.0;
}

/// Risk fusion
pub mod fusion {
    /// Weight of the pointer score (%)
    pub const POINTER_WEIGHT_PCT: f64 = 25.0;

    /// Weight of the cadence score (%)
    pub const CADENCE_WEIGHT_PCT: f64 = 75.0;

    /// Composite scores above this are classified bot-like
    pub const BOT_LIKE_THRESHOLD: f64 = 25.0;
}

/// Secondary text challenge
pub mod challenge {
    /// Composite score above which the gate arms
    pub const GATE_THRESHOLD: f64 = 50.0;

    /// Characters in a challenge answer
    pub const ANSWER_LEN: usize = 5;

    /// Characters a challenge answer is drawn from
    pub const ALPHABET: &str =
        "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!$%&?+*@#";

    /// Time before an unsolved challenge rotates (30 seconds)
    pub const ROTATION_MS: u64 = 30_000;

    /// Countdown tick resolution (ms)
    pub const TICK_MS: u64 = 50;

    /// Lifetime of a raised notice (ms)
    pub const NOTICE_DISMISS_MS: u64 = 3_000;
}

/// Fields monitored when no configuration says otherwise
pub const DEFAULT_MONITORED_FIELDS: [&str; 3] = ["first-name", "last-name", "password"];
