// src/middleware/rate_limit.rs
// DOCUMENTATION: Per-IP request rate limiting
// PURPOSE: Enforce the configured requests-per-minute ceiling on the whole API

use crate::errors::ApiError;
use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::future::{ready, Ready};
use governor::{clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota, RateLimiter};
use std::future::Future;
use std::num::NonZeroU32;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

/// Keyed limiter: one token bucket per client IP
pub type IpRateLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Build the process-wide limiter from the configured quota
pub fn build_limiter(per_minute: u32) -> Arc<IpRateLimiter> {
    let quota = Quota::per_minute(NonZeroU32::new(per_minute.max(1)).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::keyed(quota))
}

/// Start background pruning of idle IP buckets
/// DOCUMENTATION: Keeps the keyed state store from growing unbounded
pub fn start_prune_task(limiter: Arc<IpRateLimiter>, interval_seconds: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            limiter.retain_recent();
        }
    });
}

pub struct RateLimitMiddleware {
    limiter: Arc<IpRateLimiter>,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<IpRateLimiter>) -> Self {
        Self { limiter }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Arc<IpRateLimiter>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    actix_web::dev::forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let limiter = self.limiter.clone();

        Box::pin(async move {
            let ip = req
                .connection_info()
                .realip_remote_addr()
                .unwrap_or("unknown")
                .to_string();

            if limiter.check_key(&ip).is_err() {
                log::warn!("Rate limit exceeded for {}", ip);
                return Err(ApiError::RateLimitExceeded.into());
            }

            service.call(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limiter_allows_within_quota() {
        let limiter = build_limiter(10);
        for _ in 0..10 {
            assert!(limiter.check_key(&"10.0.0.1".to_string()).is_ok());
        }
    }

    #[test]
    fn test_limiter_blocks_over_quota() {
        let limiter = build_limiter(5);
        let ip = "10.0.0.2".to_string();
        for _ in 0..5 {
            let _ = limiter.check_key(&ip);
        }
        assert!(limiter.check_key(&ip).is_err());
    }

    #[test]
    fn test_limiter_keys_are_independent() {
        let limiter = build_limiter(1);
        assert!(limiter.check_key(&"10.0.0.3".to_string()).is_ok());
        assert!(limiter.check_key(&"10.0.0.4".to_string()).is_ok());
    }
}
