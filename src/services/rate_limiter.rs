// Rate Limiter
// Fixed-window call budgets per provider key

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

const DEFAULT_MAX_CALLS: u32 = 100;
const DEFAULT_WINDOW_SECS: u64 = 60;

/// Call counter for one provider within the current window.
#[derive(Debug, Clone)]
pub struct RateLimitWindow {
    pub call_count: u32,
    pub reset_at: Instant,
}

/// Advisory fixed-window limiter. Callers skip a provider when acquisition
/// fails; nothing is queued and nothing ever panics out of here.
pub struct RateLimiter {
    max_calls: u32,
    window: Duration,
    windows: Mutex<HashMap<String, RateLimitWindow>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_CALLS, Duration::from_secs(DEFAULT_WINDOW_SECS))
    }

    pub fn with_limits(max_calls: u32, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record one intended call against the key's window. Returns false when
    /// the budget for the current window is exhausted.
    pub fn try_acquire(&self, provider_key: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        let entry = windows
            .entry(provider_key.to_string())
            .or_insert_with(|| RateLimitWindow {
                call_count: 0,
                reset_at: now + self.window,
            });

        if now >= entry.reset_at {
            entry.call_count = 0;
            entry.reset_at = now + self.window;
        }

        if entry.call_count >= self.max_calls {
            debug!(
                "[RATE_LIMITER] budget exhausted for {} ({} calls in window)",
                provider_key, entry.call_count
            );
            return false;
        }

        entry.call_count += 1;
        true
    }

    /// Calls left in the current window; a full budget for unseen keys.
    pub fn remaining(&self, provider_key: &str) -> u32 {
        let now = Instant::now();
        let windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());
        match windows.get(provider_key) {
            Some(entry) if now < entry.reset_at => self.max_calls.saturating_sub(entry.call_count),
            _ => self.max_calls,
        }
    }
}
