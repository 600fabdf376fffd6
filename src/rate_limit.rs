use std::time::{Duration, Instant};

use dashmap::DashMap;

const MAX_FAILURES: u32 = 5;
const WINDOW_SECS: u64 = 15 * 60;
pub const WINDOW: Duration = Duration::from_secs(WINDOW_SECS);

/// Per-email login brute force limiter.
pub struct LoginRateLimiter {
    /// email -> (failed_count, window_start)
    entries: DashMap<String, (u32, Instant)>,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginRateLimiter {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Check if login attempt is allowed. 5 failures per 15 minutes.
    /// Does NOT increment the counter; call `record_failure()` on invalid password.
    pub fn check(&self, email: &str) -> Result<(), u64> {
        self.check_at(email, Instant::now())
    }

    fn check_at(&self, email: &str, now: Instant) -> Result<(), u64> {
        let window = Duration::from_secs(WINDOW_SECS);

        let Some(entry) = self.entries.get(&email.to_lowercase()) else {
            return Ok(());
        };

        let (count, start) = entry.value();

        if now.duration_since(*start) > window {
            return Ok(());
        }

        if *count >= MAX_FAILURES {
            let elapsed = now.duration_since(*start).as_secs();
            return Err(WINDOW_SECS.saturating_sub(elapsed));
        }

        Ok(())
    }

    /// Record a failed login attempt. Increments the counter for the given email.
    pub fn record_failure(&self, email: &str) {
        self.record_failure_at(email, Instant::now());
    }

    fn record_failure_at(&self, email: &str, now: Instant) {
        let window = Duration::from_secs(WINDOW_SECS);

        let mut entry = self.entries.entry(email.to_lowercase()).or_insert((0, now));
        let (count, start) = entry.value_mut();

        if now.duration_since(*start) > window {
            *count = 1;
            *start = now;
        } else {
            *count += 1;
        }
    }

    /// Forget an email after a successful login.
    pub fn reset(&self, email: &str) {
        self.entries.remove(&email.to_lowercase());
    }

    /// Drop entries whose window started more than `max_age` ago.
    pub fn cleanup(&self, max_age: Duration) {
        self.cleanup_at(max_age, Instant::now());
    }

    fn cleanup_at(&self, max_age: Duration, now: Instant) {
        self.entries
            .retain(|_, (_, start)| now.duration_since(*start) < max_age);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_until_five_failures() {
        let limiter = LoginRateLimiter::new();
        let now = Instant::now();
        for _ in 0..4 {
            limiter.record_failure_at("a@b.com", now);
        }
        assert!(limiter.check_at("a@b.com", now).is_ok());

        limiter.record_failure_at("a@b.com", now);
        assert!(limiter.check_at("a@b.com", now).is_err());
    }

    #[test]
    fn email_key_is_case_insensitive() {
        let limiter = LoginRateLimiter::new();
        let now = Instant::now();
        for _ in 0..5 {
            limiter.record_failure_at("User@Example.com", now);
        }
        assert!(limiter.check_at("user@example.com", now).is_err());
    }

    #[test]
    fn window_expiry_unlocks() {
        let limiter = LoginRateLimiter::new();
        let start = Instant::now();
        for _ in 0..5 {
            limiter.record_failure_at("a@b.com", start);
        }
        let later = start + Duration::from_secs(WINDOW_SECS + 1);
        assert!(limiter.check_at("a@b.com", later).is_ok());
    }

    #[test]
    fn reset_clears_failures() {
        let limiter = LoginRateLimiter::new();
        for _ in 0..5 {
            limiter.record_failure("a@b.com");
        }
        limiter.reset("A@B.com");
        assert!(limiter.check("a@b.com").is_ok());
    }

    #[test]
    fn cleanup_drops_stale_entries_only() {
        let limiter = LoginRateLimiter::new();
        let start = Instant::now();
        limiter.record_failure_at("old@b.com", start);
        limiter.record_failure_at("new@b.com", start + WINDOW);

        limiter.cleanup_at(WINDOW, start + WINDOW + Duration::from_secs(1));
        assert!(!limiter.entries.contains_key("old@b.com"));
        assert!(limiter.entries.contains_key("new@b.com"));
    }
}
