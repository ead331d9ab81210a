//! Client-side request budget for openFDA.
//!
//! A sliding one-minute window: once the budget is spent, requests are
//! refused until the oldest one ages out.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::warn;

const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug)]
pub struct RateLimiter {
    max_per_window: usize,
    recent: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn per_minute(max_per_window: usize) -> Self {
        Self {
            max_per_window,
            recent: Mutex::new(VecDeque::with_capacity(max_per_window)),
        }
    }

    /// Records a request if the budget allows it.
    ///
    /// Returns false when the window is already full.
    pub async fn try_acquire(&self) -> bool {
        let now = Instant::now();
        let mut recent = self.recent.lock().await;
        while recent
            .front()
            .is_some_and(|&seen| now.duration_since(seen) >= WINDOW)
        {
            recent.pop_front();
        }

        if recent.len() >= self.max_per_window {
            warn!(
                "Rate limit reached: {}/{} requests in the last minute",
                recent.len(),
                self.max_per_window
            );
            return false;
        }

        recent.push_back(now);
        true
    }
}
