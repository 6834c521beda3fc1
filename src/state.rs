use std::sync::Arc;
use tracing::debug;

use crate::error::AppError;
use crate::metrics::{ADMITTED_TOTAL, REJECTED_TOTAL, TRACKED_KEYS};
use crate::rate_limit::{RateLimitOptions, RateLimitResult, RateLimiter};
use crate::sms::SmsSender;

// app's shared state
pub struct AppState {
    pub limiter: RateLimiter,
    pub rate_options: RateLimitOptions, // quota applied to API actions
    pub sms: Arc<dyn SmsSender>,
}

impl AppState {
    pub fn new(
        limiter: RateLimiter,
        rate_options: RateLimitOptions,
        sms: Arc<dyn SmsSender>,
    ) -> Arc<Self> {
        Arc::new(Self {
            limiter,
            rate_options,
            sms,
        })
    }

    // Check `key` against the limiter and record the outcome
    pub fn check(&self, key: &str, options: RateLimitOptions) -> RateLimitResult {
        let result = self.limiter.check_with(key, options);
        TRACKED_KEYS.set(self.limiter.len() as f64);

        if result.success {
            ADMITTED_TOTAL.inc();
        } else {
            REJECTED_TOTAL.inc();
            debug!(key, "rate limit exceeded");
        }
        result
    }

    pub fn admit(&self, key: &str, options: RateLimitOptions) -> Result<(), AppError> {
        if self.check(key, options).success {
            Ok(())
        } else {
            Err(AppError::RateLimited)
        }
    }
}
