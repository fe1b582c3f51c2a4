use std::num::NonZeroU32;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

use crate::error::{AppError, Result};
use crate::AppState;

/// Process-wide limiter allowing `per_second` requests with a burst of twice that
pub fn build_limiter(per_second: u32) -> DefaultDirectRateLimiter {
    let rate = NonZeroU32::new(per_second).unwrap_or(NonZeroU32::MIN);
    let burst = NonZeroU32::new(per_second.saturating_mul(2)).unwrap_or(NonZeroU32::MIN);

    RateLimiter::direct(Quota::per_second(rate).allow_burst(burst))
}

/// Reject requests beyond the configured rate with 429
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    if state.limiter.check().is_err() {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "Rate limit exceeded"
        );
        return Err(AppError::RateLimitExceeded);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_is_twice_rate() {
        let limiter = build_limiter(2);

        for _ in 0..4 {
            assert!(limiter.check().is_ok());
        }
        assert!(limiter.check().is_err());
    }

    #[test]
    fn test_zero_rate_still_admits_one() {
        let limiter = build_limiter(0);

        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }
}
