//! Keystroke cadence scoring for a single text field.
//!
//! Abnormally fast or suspiciously uniform typing raises the score; natural
//! variation and moderate slowdowns lower it. Deletions and held-key runs
//! are ignored entirely.

use std::collections::VecDeque;

use serde::Serialize;
use vigil_common::{FieldId, Score};

use crate::config::CadenceConfig;

/// Bounded FIFO of recent inter-keystroke intervals (ms)
#[derive(Debug, Clone)]
pub struct CadenceHistory {
    intervals: VecDeque<f64>,
    capacity: usize,
}

impl CadenceHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            intervals: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append an interval, returning the evicted oldest one if full
    pub fn push(&mut self, interval: f64) -> Option<f64> {
        self.intervals.push_back(interval);
        if self.intervals.len() > self.capacity {
            self.intervals.pop_front()
        } else {
            None
        }
    }

    pub fn mean(&self) -> Option<f64> {
        if self.intervals.is_empty() {
            return None;
        }
        Some(self.intervals.iter().sum::<f64>() / self.intervals.len() as f64)
    }

    pub fn latest(&self) -> Option<f64> {
        self.intervals.back().copied()
    }

    /// Every interval lies strictly within `threshold` of `mean`
    pub fn is_uniform(&self, mean: f64, threshold: f64) -> bool {
        self.intervals.iter().all(|i| (i - mean).abs() < threshold)
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.intervals.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CadenceRegime {
    /// Mean interval below the fast threshold
    Fast,
    /// Normal or slow typing
    Steady,
}

#[derive(Debug, Clone, Serialize)]
pub struct CadenceReport {
    pub field: FieldId,
    /// Time since the previous scored keystroke (ms)
    pub interval: f64,
    /// Rolling mean over the history (ms)
    pub mean_interval: f64,
    pub history_len: usize,
    pub regime: CadenceRegime,
    /// Signed change from the speed check
    pub speed_adjustment: f64,
    /// Penalty from the uniformity check, if it triggered
    pub consistency_adjustment: Option<f64>,
    pub score: Score,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CadenceOutcome {
    /// Text got shorter; nothing recorded
    Deletion,
    /// Trailing run of identical characters; nothing recorded
    Repeating,
    /// Reference time recorded, no interval to score yet
    Primed,
    Scored(CadenceReport),
}

/// Tracks keystroke timing on one field
#[derive(Debug)]
pub struct InputCadenceMonitor {
    field: FieldId,
    settings: CadenceConfig,
    history: CadenceHistory,
    score: Score,
    last_key_time: Option<u64>,
    last_length: usize,
}

impl InputCadenceMonitor {
    pub fn new(field: FieldId, settings: CadenceConfig) -> Self {
        let history = CadenceHistory::new(settings.history_len);
        Self {
            field,
            settings,
            history,
            score: Score::ZERO,
            last_key_time: None,
            last_length: 0,
        }
    }

    pub fn field(&self) -> &FieldId {
        &self.field
    }

    pub fn current_score(&self) -> Score {
        self.score
    }

    pub fn history(&self) -> &CadenceHistory {
        &self.history
    }

    /// Process a snapshot of the field's text taken at `now` (ms)
    pub fn on_input(&mut self, text: &str, now: u64) -> CadenceOutcome {
        let length = text.chars().count();
        if length < self.last_length {
            return CadenceOutcome::Deletion;
        }

        if has_repeating_tail(text, self.settings.repeat_run) {
            tracing::warn!(field = %self.field, "Repeating characters, input ignored");
            return CadenceOutcome::Repeating;
        }

        let interval = self
            .last_key_time
            .map(|last| now.saturating_sub(last) as f64)
            .unwrap_or(0.0);
        self.last_key_time = Some(now);
        self.last_length = length;

        if interval > 0.0 {
            self.history.push(interval);
        }
        let Some(mean) = self.history.mean() else {
            return CadenceOutcome::Primed;
        };

        let fast = self.settings.fast_threshold_ms;
        let tuner = self.settings.speed_tuner;
        let (regime, speed_adjustment) = if mean < fast {
            let added = if interval < fast { (fast - interval) / tuner } else { 0.0 };
            (CadenceRegime::Fast, added)
        } else {
            let over = interval - mean;
            let subtracted = if interval > mean && over < fast {
                over / (tuner * 2.0)
            } else {
                0.0
            };
            (CadenceRegime::Steady, -subtracted)
        };
        self.score = self.score.adjusted(speed_adjustment);

        let threshold = self.settings.consistency_threshold_ms;
        let consistency_adjustment = match self.history.latest() {
            Some(latest) if self.history.len() > 1 && self.history.is_uniform(mean, threshold) => {
                let added = (threshold - (latest - mean).abs()) / self.settings.consistency_tuner;
                self.score = self.score.adjusted(added);
                Some(added)
            }
            _ => None,
        };

        let report = CadenceReport {
            field: self.field.clone(),
            interval,
            mean_interval: mean,
            history_len: self.history.len(),
            regime,
            speed_adjustment,
            consistency_adjustment,
            score: self.score,
        };

        tracing::debug!(
            field = %report.field,
            interval = report.interval,
            mean = %format!("{:.2}", report.mean_interval),
            history = %format!("{}/{}", report.history_len, self.history.capacity()),
            regime = ?report.regime,
            adjustment = %format!("{:.2}", report.speed_adjustment),
            consistent = report.consistency_adjustment.is_some(),
            score = %report.score,
            "Typing behavior analysed"
        );

        CadenceOutcome::Scored(report)
    }
}

/// Text is longer than `run` and ends in `run` identical characters
fn has_repeating_tail(text: &str, run: usize) -> bool {
    if run == 0 || text.chars().count() <= run {
        return false;
    }
    let mut tail = text.chars().rev().take(run);
    match tail.next() {
        Some(last) => tail.all(|c| c == last),
        None => false,
    }
}
