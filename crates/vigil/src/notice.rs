//! Transient notices surfaced to the host UI.
//!
//! At most one notice of each kind is live at a time. The runtime schedules
//! dismissal; the board only tracks what is showing.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// Gate armed at a decision point
    BotSuspected,
    /// Wrong challenge answer
    ChallengeFailed,
}

impl NoticeKind {
    pub fn message(&self) -> &'static str {
        match self {
            Self::BotSuspected => "Bot-like behavior detected",
            Self::ChallengeFailed => "CAPTCHA failed!",
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Debug, Default)]
pub struct NoticeBoard {
    live: HashSet<NoticeKind>,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a notice. Returns false if one of this kind is already showing.
    pub fn raise(&mut self, kind: NoticeKind) -> bool {
        self.live.insert(kind)
    }

    /// Returns false if no notice of this kind was showing
    pub fn dismiss(&mut self, kind: NoticeKind) -> bool {
        self.live.remove(&kind)
    }

    pub fn is_live(&self, kind: NoticeKind) -> bool {
        self.live.contains(&kind)
    }
}
