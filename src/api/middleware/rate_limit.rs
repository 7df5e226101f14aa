//! Per-API-key rate limiting for the management API

use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, KeyExtractor, SimpleKeyExtractionError,
};
use actix_web::dev::ServiceRequest;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{HttpResponse, HttpResponseBuilder};
use governor::clock::{Clock, DefaultClock, QuantaInstant};
use governor::middleware::NoOpMiddleware;
use governor::NotUntil;
use tracing::debug;

use crate::config::ApiConfig;
use crate::errors::{ErrorCode, ErrorEnvelope, LinkhubError, Result};
use crate::utils::hash_api_key;

/// Buckets by hashed `Authorization` header, falling back to the peer IP
#[derive(Clone, Copy)]
pub struct ApiKeyExtractor;

impl KeyExtractor for ApiKeyExtractor {
    type Key = String;
    type KeyExtractionError = SimpleKeyExtractionError<&'static str>;

    fn extract(&self, req: &ServiceRequest) -> std::result::Result<Self::Key, Self::KeyExtractionError> {
        if let Some(auth) = req.headers().get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
            return Ok(format!("key:{}", hash_api_key(auth)));
        }
        req.connection_info()
            .peer_addr()
            .map(|ip| format!("ip:{}", ip))
            .ok_or_else(|| SimpleKeyExtractionError::new("Unable to extract rate limit key"))
    }

    fn exceed_rate_limit_response(
        &self,
        negative: &NotUntil<QuantaInstant>,
        mut response: HttpResponseBuilder,
    ) -> HttpResponse {
        let wait = negative.wait_time_from(DefaultClock::default().now());
        response
            .insert_header(("Retry-After", wait.as_secs().max(1).to_string()))
            .json(ErrorEnvelope::new(
                ErrorCode::RateLimitExceeded,
                format!(
                    "Rate limit exceeded. Retry in {} seconds.",
                    wait.as_secs().max(1)
                ),
            ))
    }
}

pub type ApiRateLimitConfig = GovernorConfig<ApiKeyExtractor, NoOpMiddleware>;

/// Shared limiter state; build once and hand clones to every worker
pub fn api_rate_limit_config(config: &ApiConfig) -> Result<ApiRateLimitConfig> {
    let per_minute = u64::from(config.rate_limit_per_minute.max(1));
    let period_ms = (60_000 / per_minute).max(1);

    let governor = GovernorConfigBuilder::default()
        .milliseconds_per_request(period_ms)
        .burst_size(config.rate_limit_burst.max(1))
        .key_extractor(ApiKeyExtractor)
        .finish()
        .ok_or_else(|| LinkhubError::validation("Invalid rate limit configuration"))?;

    debug!(
        "API rate limiter: {} req/min, burst {}",
        per_minute, config.rate_limit_burst
    );
    Ok(governor)
}

pub fn api_rate_limiter(config: &ApiRateLimitConfig) -> Governor<ApiKeyExtractor, NoOpMiddleware> {
    Governor::new(config)
}
