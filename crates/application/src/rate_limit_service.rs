//! Fixed-window rate limiting for the public auth endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use bloomconnect_core::{AppError, AppResult};
use chrono::{DateTime, Utc};

/// Configuration for a rate limit rule.
#[derive(Debug, Clone)]
pub struct RateLimitRule {
    /// The route prefix or category name (e.g. "login", "invitation_redeem").
    pub category: String,
    /// Maximum number of attempts allowed in the window.
    pub max_attempts: i32,
    /// Window duration in seconds.
    pub window_seconds: i64,
}

impl RateLimitRule {
    /// Creates a new rate limit rule.
    #[must_use]
    pub fn new(category: impl Into<String>, max_attempts: i32, window_seconds: i64) -> Self {
        Self {
            category: category.into(),
            max_attempts,
            window_seconds,
        }
    }
}

/// Information about the current rate limit window for a key.
#[derive(Debug, Clone)]
pub struct AttemptInfo {
    /// Number of attempts in the current window (including this one).
    pub attempt_count: i32,
    /// When the current window started.
    pub window_started_at: DateTime<Utc>,
}

/// Repository port for rate limit persistence.
#[async_trait]
pub trait RateLimitRepository: Send + Sync {
    /// Records an attempt for the given key.
    ///
    /// Uses an UPSERT pattern: if the current window has expired, resets the
    /// counter. Returns the updated attempt count within the active window.
    async fn record_attempt(
        &self,
        key: &str,
        window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo>;

    /// Removes expired entries older than the given cutoff.
    async fn cleanup_expired(&self, before: DateTime<Utc>) -> AppResult<u64>;
}

/// Application service for rate limiting.
#[derive(Clone)]
pub struct RateLimitService {
    repository: Arc<dyn RateLimitRepository>,
}

impl RateLimitService {
    /// Creates a new rate limit service.
    #[must_use]
    pub fn new(repository: Arc<dyn RateLimitRepository>) -> Self {
        Self { repository }
    }

    /// Checks whether the given key is within the rate limit.
    ///
    /// Records the attempt and returns `Ok(())` if allowed, or
    /// `Err(AppError::RateLimited)` if the limit has been exceeded.
    ///
    /// The key is typically an IP address or email; it is combined with the
    /// rule category so categories never share windows.
    pub async fn check_rate_limit(&self, rule: &RateLimitRule, key: &str) -> AppResult<()> {
        let composite_key = format!("{}:{key}", rule.category);
        let info = self
            .repository
            .record_attempt(&composite_key, rule.window_seconds)
            .await?;

        if info.attempt_count > rule.max_attempts {
            return Err(AppError::RateLimited(
                "too many requests, please try again later".to_owned(),
            ));
        }

        Ok(())
    }

    /// Removes expired rate limit entries. Intended for periodic cleanup.
    pub async fn cleanup(&self) -> AppResult<u64> {
        let cutoff = Utc::now() - chrono::Duration::hours(24);
        self.repository.cleanup_expired(cutoff).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct FakeRateLimitRepository {
        counts: Mutex<std::collections::HashMap<String, i32>>,
    }

    impl FakeRateLimitRepository {
        fn new() -> Self {
            Self {
                counts: Mutex::new(std::collections::HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl RateLimitRepository for FakeRateLimitRepository {
        async fn record_attempt(
            &self,
            key: &str,
            _window_duration_seconds: i64,
        ) -> AppResult<AttemptInfo> {
            let mut counts = self
                .counts
                .lock()
                .map_err(|_| AppError::Internal("lock poisoned".to_owned()))?;
            let count = counts.entry(key.to_owned()).or_insert(0);
            *count += 1;
            Ok(AttemptInfo {
                attempt_count: *count,
                window_started_at: Utc::now(),
            })
        }

        async fn cleanup_expired(&self, _before: DateTime<Utc>) -> AppResult<u64> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn attempts_within_limit_are_allowed() {
        let service = RateLimitService::new(Arc::new(FakeRateLimitRepository::new()));
        let rule = RateLimitRule::new("login", 3, 60);

        for _ in 0..3 {
            assert!(service.check_rate_limit(&rule, "10.0.0.1").await.is_ok());
        }
    }

    #[tokio::test]
    async fn attempts_over_limit_are_rejected() {
        let service = RateLimitService::new(Arc::new(FakeRateLimitRepository::new()));
        let rule = RateLimitRule::new("login", 2, 60);

        assert!(service.check_rate_limit(&rule, "10.0.0.2").await.is_ok());
        assert!(service.check_rate_limit(&rule, "10.0.0.2").await.is_ok());

        let third = service.check_rate_limit(&rule, "10.0.0.2").await;
        assert!(matches!(third, Err(AppError::RateLimited(_))));
    }

    #[tokio::test]
    async fn categories_do_not_share_windows() {
        let service = RateLimitService::new(Arc::new(FakeRateLimitRepository::new()));
        let login = RateLimitRule::new("login", 1, 60);
        let redeem = RateLimitRule::new("invitation_redeem", 1, 60);

        assert!(service.check_rate_limit(&login, "10.0.0.3").await.is_ok());
        assert!(service.check_rate_limit(&redeem, "10.0.0.3").await.is_ok());
    }
}
