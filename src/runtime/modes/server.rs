//! Server mode
//!
//! Builds the actix application and runs it until a shutdown signal.

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{error, warn};

use crate::api::middleware::RequestIdMiddleware;
use crate::api::services::{
    AppStartTime, api_routes, health_routes, json_config, query_config, redirect_routes,
};
use crate::config::{ApiConfig, get_config};
use crate::runtime::lifetime::startup::{StartupContext, prepare_server_startup};
use crate::system::signal::listen_for_shutdown;

/// Warn about origin settings that are probably mistakes (runs once)
fn validate_cors_config(api: &ApiConfig) {
    let origins = &api.cors_allowed_origins;
    if origins.iter().any(|o| o == "*") && origins.len() > 1 {
        warn!("CORS: '*' makes the other allowed origins redundant");
    }
}

/// Empty origins keep the browser's same-origin policy
fn build_cors_middleware(api: &ApiConfig) -> Cors {
    let origins = &api.cors_allowed_origins;
    if origins.is_empty() {
        return Cors::default();
    }

    let mut cors = if origins.iter().any(|o| o == "*") {
        Cors::default().allow_any_origin()
    } else {
        origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };
    cors = cors
        .allowed_methods(["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(["Authorization", "Content-Type", "Accept"])
        .expose_headers(["Content-Disposition", "X-Request-ID"])
        .max_age(3600);
    cors
}

/// Register shared state and every route on `app`
///
/// Integration tests build their app through this as well.
pub fn configure_app(
    cfg: &mut web::ServiceConfig,
    ctx: &StartupContext,
    app_start_time: &AppStartTime,
    api: &ApiConfig,
    analytics: &crate::config::AnalyticsConfig,
) {
    cfg.app_data(web::Data::new(ctx.storage.clone()))
        .app_data(web::Data::new(ctx.auth_service.clone()))
        .app_data(web::Data::new(ctx.domain_service.clone()))
        .app_data(web::Data::new(ctx.link_service.clone()))
        .app_data(web::Data::new(ctx.event_service.clone()))
        .app_data(web::Data::new(ctx.redirect_service.clone()))
        .app_data(web::Data::new(app_start_time.clone()))
        .app_data(web::Data::new(analytics.clone()))
        .app_data(query_config())
        .app_data(json_config(api.payload_limit_bytes))
        .service(health_routes())
        .configure(|cfg| api_routes(cfg, &ctx.rate_limit))
        .service(redirect_routes());
}

/// Run the HTTP server
///
/// **Note**: logging must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime::now();
    let config = get_config();

    let ctx = prepare_server_startup(&config).await.map_err(|e| {
        error!("Server startup failed: {}", e);
        e
    })?;

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);

    validate_cors_config(&config.api);

    let db_for_shutdown = ctx.storage.get_db().clone();
    let api = config.api.clone();
    let analytics = config.analytics.clone();

    let server = HttpServer::new(move || {
        let cors = build_cors_middleware(&api);

        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(cors)
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-store")))
            .configure(|cfg| configure_app(cfg, &ctx, &app_start_time, &api, &analytics))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .client_request_timeout(std::time::Duration::from_millis(5000))
    .client_disconnect_timeout(std::time::Duration::from_millis(1000))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = listen_for_shutdown(&db_for_shutdown) => {
            warn!("Graceful shutdown: all tasks completed");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::header, test};

    #[actix_rt::test]
    async fn test_cors_allows_configured_origin() {
        let api = ApiConfig {
            cors_allowed_origins: vec!["https://app.example.com".to_string()],
            ..ApiConfig::default()
        };
        let app = test::init_service(
            App::new()
                .wrap(build_cors_middleware(&api))
                .route("/", web::get().to(|| async { "ok" })),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "https://app.example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://app.example.com"
        );
    }
}
