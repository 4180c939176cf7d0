/// Fixed-window request limiter keyed by client identifier

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
}

#[derive(Debug)]
struct Window {
    count: u32,
    reset_at: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn check(&self, key: &str) -> RateLimitDecision {
        self.check_at(key, Instant::now())
    }

    /// Count one request for `key` at `now`
    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        match windows.get_mut(key) {
            Some(window) if now <= window.reset_at => {
                if window.count >= self.limit {
                    return RateLimitDecision {
                        allowed: false,
                        remaining: 0,
                    };
                }
                window.count += 1;
                RateLimitDecision {
                    allowed: true,
                    remaining: self.limit - window.count,
                }
            }
            _ => {
                windows.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                RateLimitDecision {
                    allowed: self.limit > 0,
                    remaining: self.limit.saturating_sub(1),
                }
            }
        }
    }
}
