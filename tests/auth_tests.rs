//! Workspace authentication middleware tests

mod common;

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use actix_web::{App, HttpResponse, web};
use chrono::{Duration, Utc};
use serde_json::Value;

use common::{bearer, provision, provision_with_limit, unrestricted_key};
use linkhub::api::middleware::{WithWorkspace, api_rate_limit_config};
use linkhub::api::services::AppStartTime;
use linkhub::config::ApiConfig;
use linkhub::runtime::modes::configure_app;
use linkhub::services::WorkspaceContext;
use linkhub::storage::Plan;

async fn error_of<B: MessageBody>(resp: ServiceResponse<B>) -> (StatusCode, Value) {
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

#[actix_rt::test]
async fn test_missing_authorization_header() {
    let app = test_app!();
    let req = TestRequest::get().uri("/domains").to_request();
    let (status, body) = error_of(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");
    assert_eq!(body["error"]["message"], "Missing Authorization header.");
}

#[actix_rt::test]
async fn test_misconfigured_authorization_header() {
    let app = test_app!();
    let (_ws, key) = provision(Plan::Free).await;
    let req = TestRequest::get()
        .uri("/domains")
        .insert_header(("Authorization", key))
        .to_request();
    let (status, body) = error_of(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "Misconfigured authorization header. Did you forget to add 'Bearer '?"
    );
}

#[actix_rt::test]
async fn test_invalid_api_key() {
    let app = test_app!();
    let req = TestRequest::get()
        .uri("/domains")
        .insert_header(bearer("lh_doesnotexist000000000000"))
        .to_request();
    let (status, body) = error_of(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Unauthorized: Invalid API key.");
}

#[actix_rt::test]
async fn test_expired_api_key() {
    let app = test_app!();
    let (ws, _key) = provision(Plan::Free).await;
    let expired = unrestricted_key(&ws, Some(Utc::now() - Duration::hours(1))).await;

    let req = TestRequest::get()
        .uri(&format!("/domains?workspaceId={}", ws.id))
        .insert_header(bearer(&expired))
        .to_request();
    let (status, body) = error_of(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Unauthorized: Access token expired.");
}

#[actix_rt::test]
async fn test_workspace_id_resolution() {
    let app = test_app!();
    let (ws, _key) = provision(Plan::Free).await;
    let key = unrestricted_key(&ws, None).await;

    // Unrestricted key without a workspace id
    let req = TestRequest::get()
        .uri("/domains")
        .insert_header(bearer(&key))
        .to_request();
    let (status, body) = error_of(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["message"],
        "Workspace ID not found. Did you forget to include a `workspaceId` query parameter?"
    );

    // Prefixed and bare ids both work
    let bare = ws.id.trim_start_matches("ws_");
    for id in [ws.id.as_str(), bare] {
        let req = TestRequest::get()
            .uri(&format!("/domains?workspaceId={}", id))
            .insert_header(bearer(&key))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    // projectSlug as an alternative
    let req = TestRequest::get()
        .uri(&format!("/domains?projectSlug={}", ws.slug))
        .insert_header(bearer(&key))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_foreign_workspace_is_hidden() {
    let app = test_app!();
    let (mine, _) = provision(Plan::Free).await;
    let (theirs, their_key) = provision(Plan::Free).await;
    let key = unrestricted_key(&mine, None).await;

    // Not a member
    let req = TestRequest::get()
        .uri(&format!("/domains?workspaceId={}", theirs.id))
        .insert_header(bearer(&key))
        .to_request();
    let (status, body) = error_of(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Workspace not found.");

    // Restricted key pointed at another workspace
    let req = TestRequest::get()
        .uri(&format!("/domains?workspaceId={}", mine.id))
        .insert_header(bearer(&their_key))
        .to_request();
    let (status, body) = error_of(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "forbidden");
}

#[actix_rt::test]
async fn test_exceeded_clicks_blocks_analytics_only() {
    let app = test_app!();
    let (ws, key) = provision_with_limit(Plan::Pro, Some(0)).await;
    common::storage(common::env().await)
        .add_workspace_usage(&ws.id, 1)
        .await
        .unwrap();

    let req = TestRequest::get()
        .uri("/analytics/events")
        .insert_header(bearer(&key))
        .to_request();
    let (status, body) = error_of(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "exceeded_limit");

    // Domains do not require headroom
    let req = TestRequest::get()
        .uri("/domains")
        .insert_header(bearer(&key))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_required_plans() {
    let env = common::env().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(env.ctx.auth_service.clone()))
            .service(
                web::scope("/gated")
                    .wrap(WithWorkspace::new().required_plans(&[Plan::Business, Plan::Enterprise]))
                    .route(
                        "",
                        web::get().to(|ctx: web::ReqData<WorkspaceContext>| async move {
                            HttpResponse::Ok().body(ctx.workspace.slug.clone())
                        }),
                    ),
            ),
    )
    .await;

    let (_pro, pro_key) = provision(Plan::Pro).await;
    let req = TestRequest::get()
        .uri("/gated")
        .insert_header(bearer(&pro_key))
        .to_request();
    let (status, body) = error_of(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["message"], "Unauthorized: Need higher plan.");

    let (business, business_key) = provision(Plan::Business).await;
    let req = TestRequest::get()
        .uri("/gated")
        .insert_header(bearer(&business_key))
        .to_request();
    let body = test::call_and_read_body(&app, req).await;
    assert_eq!(body, business.slug.as_bytes());
}

#[actix_rt::test]
async fn test_unknown_link_is_not_found() {
    let app = test_app!();
    let (_ws, key) = provision(Plan::Pro).await;
    let req = TestRequest::get()
        .uri("/links/info?linkId=link_missing")
        .insert_header(bearer(&key))
        .to_request();
    let (status, body) = error_of(test::call_service(&app, req).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Link not found.");
}

#[actix_rt::test]
async fn test_health_and_request_id() {
    let app = test_app!();
    let req = TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert!(body["uptime_seconds"].is_u64());
}

#[actix_rt::test]
async fn test_rate_limit_applies_before_workspace_auth() {
    let env = common::env().await;
    let mut ctx = env.ctx.clone();
    ctx.rate_limit = api_rate_limit_config(&ApiConfig {
        rate_limit_per_minute: 1,
        rate_limit_burst: 1,
        ..ApiConfig::default()
    })
    .unwrap();
    let start = AppStartTime::now();
    let app = test::init_service(
        App::new().configure(|cfg| configure_app(cfg, &ctx, &start, &env.api, &env.analytics)),
    )
    .await;

    let req = |uri: &str| {
        TestRequest::get()
            .uri(uri)
            .insert_header(bearer("lh_limitedkey00000000000000"))
            .to_request()
    };
    let (status, _) = error_of(test::call_service(&app, req("/domains")).await).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Limiter state is shared across the API scopes
    let resp = test::call_service(&app, req("/track/lead")).await;
    assert!(resp.headers().contains_key("Retry-After"));
    let (status, body) = error_of(resp).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "rate_limit_exceeded");
}
