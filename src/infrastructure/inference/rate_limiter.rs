use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Sliding-window limiter over send timestamps.
///
/// At most `max_calls` sends are admitted in any trailing `window`. Callers
/// over the cap are suspended until the oldest send ages out.
pub struct SlidingWindowRateLimiter {
    max_calls: usize,
    window: Duration,
    sent_at: Mutex<VecDeque<Instant>>,
}

impl SlidingWindowRateLimiter {
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            sent_at: Mutex::new(VecDeque::new()),
        }
    }

    pub fn per_minute(max_calls: usize) -> Self {
        Self::new(max_calls, DEFAULT_WINDOW)
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    /// Waits until a send is admitted and records it.
    pub async fn acquire(&self) {
        if self.max_calls == 0 {
            return;
        }

        loop {
            let wait = {
                let mut sent_at = self.sent_at.lock().await;
                let now = Instant::now();
                while let Some(oldest) = sent_at.front() {
                    if now.duration_since(*oldest) >= self.window {
                        sent_at.pop_front();
                    } else {
                        break;
                    }
                }

                match sent_at.front() {
                    Some(oldest) if sent_at.len() >= self.max_calls => {
                        self.window - now.duration_since(*oldest)
                    }
                    _ => {
                        sent_at.push_back(now);
                        return;
                    }
                }
            };

            tracing::info!(
                wait_ms = wait.as_millis() as u64,
                max_calls = self.max_calls,
                "Rate limit reached, waiting"
            );
            tokio::time::sleep(wait).await;
        }
    }
}
