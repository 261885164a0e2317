//! Single-flight cancellable deadlines.
//!
//! A `Deadline` holds at most one pending expiry. Arming an armed deadline
//! replaces the previous expiry, so timers are never stacked. The runtime
//! awaits `fired()` inside `tokio::select!`; an unarmed deadline never fires.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Default)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel any pending expiry and schedule a new one `after` from now
    pub fn arm(&mut self, after: Duration) {
        self.at = Some(Instant::now() + after);
    }

    pub fn cancel(&mut self) {
        self.at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    /// Resolve once the deadline passes, disarming it.
    ///
    /// Cancel-safe: dropping the future before it resolves leaves the
    /// deadline armed.
    pub async fn fired(&mut self) {
        match self.at {
            Some(at) => {
                tokio::time::sleep_until(at).await;
                self.at = None;
            }
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_fires_once() {
        let mut deadline = Deadline::new();
        deadline.arm(Duration::from_millis(100));
        assert!(deadline.is_armed());

        let start = Instant::now();
        deadline.fired().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert!(!deadline.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_replaces_pending_expiry() {
        let mut deadline = Deadline::new();
        deadline.arm(Duration::from_millis(100));
        tokio::time::advance(Duration::from_millis(60)).await;
        deadline.arm(Duration::from_millis(100));

        let start = Instant::now();
        deadline.fired().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_deadline_never_fires() {
        let mut deadline = Deadline::new();
        deadline.arm(Duration::from_millis(10));
        deadline.cancel();

        let outcome = tokio::time::timeout(Duration::from_secs(5), deadline.fired()).await;
        assert!(outcome.is_err());
    }
}
