pub mod analytics;
pub mod domains;
pub mod health;
pub mod links;
pub mod redirect;
pub mod track;

pub use analytics::analytics_routes;
pub use domains::domains_routes;
pub use health::{AppStartTime, HealthService, health_routes};
pub use links::links_routes;
pub use redirect::{RedirectHandler, redirect_routes};
pub use track::track_routes;

use actix_web::{ResponseError, web};

use crate::api::middleware::{ApiRateLimitConfig, WithWorkspace, api_rate_limiter};
use crate::errors::LinkhubError;

/// Query-string errors rendered as `bad_request` envelopes
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let message = format!("Invalid query parameters: {}", err);
        actix_web::error::InternalError::from_response(
            err,
            LinkhubError::validation(message).error_response(),
        )
        .into()
    })
}

/// JSON body errors rendered as `bad_request` envelopes
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let message = format!("Invalid request body: {}", err);
            actix_web::error::InternalError::from_response(
                err,
                LinkhubError::validation(message).error_response(),
            )
            .into()
        })
}

/// Management API mounted at the root, ahead of the redirect catch-all
///
/// Each scope runs the rate limiter first, then `WithWorkspace`. Every scope
/// shares one rate-limiter state.
pub fn api_routes(cfg: &mut web::ServiceConfig, rate_limit: &ApiRateLimitConfig) {
    cfg.service(
        domains_routes()
            .wrap(WithWorkspace::new())
            .wrap(api_rate_limiter(rate_limit)),
    )
    .service(
        links_routes()
            .wrap(WithWorkspace::new())
            .wrap(api_rate_limiter(rate_limit)),
    )
    .service(
        analytics_routes()
            .wrap(WithWorkspace::new().need_not_exceeded_clicks())
            .wrap(api_rate_limiter(rate_limit)),
    )
    .service(
        track_routes()
            .wrap(WithWorkspace::new())
            .wrap(api_rate_limiter(rate_limit)),
    );
}
