use std::time::{Duration, SystemTime};
use tokio::sync::Mutex;
use tokio::time::sleep;

/// Shared sliding-window rate limiter for outbound provider requests
///
/// Provider-side rejection is a correctness boundary, so every call to a
/// throttled provider must pass through `acquire` before sending, no matter
/// how many symbol-level tasks are in flight.
#[derive(Debug)]
pub struct RateLimiter {
    /// Timestamps of recent requests (sliding window)
    request_timestamps: Mutex<Vec<SystemTime>>,
    /// Maximum requests allowed per minute
    limit_per_minute: u32,
}

impl RateLimiter {
    pub fn new(limit_per_minute: u32) -> Self {
        Self {
            request_timestamps: Mutex::new(Vec::new()),
            limit_per_minute,
        }
    }

    /// Wait until a request slot is available, then claim it
    ///
    /// Async-safe; may be called from any number of concurrent tasks.
    pub async fn acquire(&self) {
        let now = SystemTime::now();
        let mut timestamps = self.request_timestamps.lock().await;

        timestamps.retain(|&t| {
            now.duration_since(t).unwrap_or(Duration::ZERO) < Duration::from_secs(60)
        });

        if timestamps.len() >= self.limit_per_minute as usize {
            if let Some(&oldest) = timestamps.first() {
                let elapsed = now.duration_since(oldest).unwrap_or(Duration::ZERO);
                let wait = Duration::from_secs(60).saturating_sub(elapsed);

                if !wait.is_zero() {
                    // Drop the lock before sleeping so other tasks can
                    // still inspect the window
                    drop(timestamps);
                    sleep(wait + Duration::from_millis(100)).await;
                    let mut timestamps = self.request_timestamps.lock().await;
                    timestamps.push(SystemTime::now());
                    return;
                }
            }
        }

        timestamps.push(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_under_limit_does_not_block() {
        let limiter = RateLimiter::new(10);
        for _ in 0..5 {
            limiter.acquire().await;
        }
        let timestamps = limiter.request_timestamps.lock().await;
        assert_eq!(timestamps.len(), 5);
    }
}
