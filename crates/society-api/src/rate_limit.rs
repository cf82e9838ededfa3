//! Per-email throttling of OTP requests

use std::num::NonZeroU32;

use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

pub struct OtpRateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
}

impl OtpRateLimiter {
    pub fn per_minute(requests: u32) -> Self {
        let burst = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: RateLimiter::keyed(Quota::per_minute(burst)),
        }
    }

    /// Keys are normalized by the caller; `false` means over quota.
    pub fn allow(&self, key: &str) -> bool {
        self.limiter.check_key(&key.to_string()).is_ok()
    }

    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
    }
}
