use std::time::Instant;

use reqwest::Response;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration};

/// Soft requests-per-minute budget, kept below GitHub's secondary limits.
const SOFT_BUDGET_PER_MINUTE: u32 = 30;

pub struct RateLimiter {
    state: Mutex<RateLimitState>,
}

struct RateLimitState {
    remaining: u32,
    reset_at: Option<Instant>,
    requests_this_minute: u32,
    minute_start: Instant,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RateLimitState {
                remaining: 5000,
                reset_at: None,
                requests_this_minute: 0,
                minute_start: Instant::now(),
            }),
        }
    }

    /// Blocks until a request may be sent. Honors the upstream quota when
    /// it is exhausted, and the soft per-minute budget otherwise.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;

                if state.remaining == 0 {
                    if let Some(reset_at) = state.reset_at {
                        let now = Instant::now();
                        if reset_at > now {
                            Some(reset_at - now)
                        } else {
                            state.remaining = 1;
                            None
                        }
                    } else {
                        None
                    }
                } else {
                    let elapsed = state.minute_start.elapsed();
                    if elapsed >= Duration::from_secs(60) {
                        state.requests_this_minute = 0;
                        state.minute_start = Instant::now();
                        None
                    } else if state.requests_this_minute >= SOFT_BUDGET_PER_MINUTE {
                        Some(Duration::from_secs(60) - elapsed)
                    } else {
                        None
                    }
                }
            };

            match wait {
                Some(duration) => {
                    tracing::debug!("rate limiter sleeping {:?}", duration);
                    sleep(duration).await;
                }
                None => {
                    let mut state = self.state.lock().await;
                    state.requests_this_minute += 1;
                    return;
                }
            }
        }
    }

    /// Folds the `x-ratelimit-*` headers of a response into local state.
    pub async fn observe(&self, response: &Response) {
        let remaining = header_value(response, "x-ratelimit-remaining");
        let reset = header_value(response, "x-ratelimit-reset");

        let Some(remaining) = remaining else { return };

        let mut state = self.state.lock().await;
        state.remaining = remaining as u32;

        if let Some(reset_timestamp) = reset {
            let now = unix_now_secs();
            if reset_timestamp > now {
                state.reset_at =
                    Some(Instant::now() + Duration::from_secs(reset_timestamp - now));
            }
        }
    }

    /// Seconds until the upstream quota resets, for `Error::RateLimited`.
    pub async fn reset_in_secs(&self) -> u64 {
        let state = self.state.lock().await;
        state
            .reset_at
            .map(|at| at.saturating_duration_since(Instant::now()).as_secs())
            .unwrap_or(60)
    }
}

fn header_value(response: &Response, name: &str) -> Option<u64> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

fn unix_now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
