//! Links API integration tests
//!
//! `/links` create, list and info, with key generation, reserved and
//! duplicate keys, and cross-workspace domains.

mod common;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use chrono::Utc;
use serde_json::{Value, json};

use common::{bearer, provision, storage, unique};
use linkhub::errors::ErrorCode;
use linkhub::services::CreateDomainRequest;
use linkhub::storage::{Link, Plan, Workspace};
use linkhub::utils::generate_id;

/// A fresh domain owned by `workspace`
async fn domain_for(workspace: &Workspace) -> String {
    let env = common::env().await;
    env.ctx
        .domain_service
        .create(
            workspace,
            CreateDomainRequest {
                slug: format!("{}.example.com", unique("links")),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .slug
}

#[actix_rt::test]
async fn test_create_link_generates_key() {
    let app = test_app!();
    let (ws, key) = provision(Plan::Pro).await;
    let domain = domain_for(&ws).await;

    let req = TestRequest::post()
        .uri("/links")
        .insert_header(bearer(&key))
        .set_json(json!({ "domain": domain.to_uppercase(), "url": "https://example.com/a" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["domain"], domain);
    assert_eq!(body["url"], "https://example.com/a");
    assert_eq!(body["workspaceId"], ws.id);
    assert_eq!(body["clicks"], 0);
    assert!(body["id"].as_str().unwrap().starts_with("link_"));

    let generated = body["key"].as_str().unwrap();
    assert_eq!(generated.len(), 7);
    assert!(generated.chars().all(|c| c.is_ascii_alphanumeric()));

    // Blank key is treated like an omitted one
    let req = TestRequest::post()
        .uri("/links")
        .insert_header(bearer(&key))
        .set_json(json!({ "domain": domain, "key": "  ", "url": "https://example.com/b" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["key"].as_str().unwrap().len(), 7);
}

#[actix_rt::test]
async fn test_create_link_rejects_reserved_and_duplicate_keys() {
    let app = test_app!();
    let (ws, key) = provision(Plan::Pro).await;
    let domain = domain_for(&ws).await;

    let req = TestRequest::post()
        .uri("/links")
        .insert_header(bearer(&key))
        .set_json(json!({ "domain": domain, "key": "_root", "url": "https://example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "unprocessable_entity");

    let create = || {
        TestRequest::post()
            .uri("/links")
            .insert_header(bearer(&key))
            .set_json(json!({ "domain": domain, "key": "promo", "url": "https://example.com/p" }))
            .to_request()
    };
    assert_eq!(
        test::call_service(&app, create()).await.status(),
        StatusCode::CREATED
    );
    let resp = test::call_service(&app, create()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "conflict");
    assert_eq!(
        body["error"]["message"],
        format!("Duplicate key: {}/promo already exists.", domain)
    );

    let req = TestRequest::post()
        .uri("/links")
        .insert_header(bearer(&key))
        .set_json(json!({ "domain": domain, "key": "ok", "url": "javascript:alert(1)" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_rt::test]
async fn test_create_link_on_foreign_domain() {
    let app = test_app!();
    let (owner, _) = provision(Plan::Pro).await;
    let (_other, other_key) = provision(Plan::Pro).await;
    let domain = domain_for(&owner).await;

    let req = TestRequest::post()
        .uri("/links")
        .insert_header(bearer(&other_key))
        .set_json(json!({ "domain": domain, "key": "steal", "url": "https://example.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(body["error"]["message"], "Domain not found.");

    let req = TestRequest::post()
        .uri("/links")
        .insert_header(bearer(&other_key))
        .set_json(json!({ "domain": "nowhere.example.com", "url": "https://example.com" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_rt::test]
async fn test_list_and_info() {
    let app = test_app!();
    let (ws, key) = provision(Plan::Pro).await;
    let domain = domain_for(&ws).await;

    for (link_key, url) in [("alpha", "https://example.com/one"), ("beta", "https://example.com/two")] {
        let req = TestRequest::post()
            .uri("/links")
            .insert_header(bearer(&key))
            .set_json(json!({ "domain": domain, "key": link_key, "url": url }))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::CREATED
        );
    }

    let req = TestRequest::get()
        .uri(&format!("/links?domain={}", domain))
        .insert_header(bearer(&key))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let req = TestRequest::get()
        .uri(&format!("/links?domain={}&search=two", domain))
        .insert_header(bearer(&key))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["key"], "beta");

    let req = TestRequest::get()
        .uri(&format!("/links/info?domain={}&key=alpha", domain))
        .insert_header(bearer(&key))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["url"], "https://example.com/one");
    let link_id = body["id"].as_str().unwrap().to_string();

    let req = TestRequest::get()
        .uri(&format!("/links/info?linkId={}", link_id))
        .insert_header(bearer(&key))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["key"], "alpha");

    let req = TestRequest::get()
        .uri("/links/info")
        .insert_header(bearer(&key))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_rt::test]
async fn test_duplicate_link_insert_is_conflict() {
    let env = common::env().await;
    let (ws, _) = provision(Plan::Pro).await;
    let domain = domain_for(&ws).await;
    let link = Link {
        id: generate_id("link"),
        workspace_id: ws.id.clone(),
        domain: domain.clone(),
        key: "twice".to_string(),
        url: "https://example.com".to_string(),
        clicks: 0,
        leads: 0,
        sales: 0,
        sale_amount: 0,
        expires_at: None,
        created_at: Utc::now(),
    };
    storage(env).create_link(&link).await.unwrap();

    let err = storage(env)
        .create_link(&Link {
            id: generate_id("link"),
            ..link
        })
        .await
        .unwrap_err();
    assert_eq!(err.api_code(), ErrorCode::Conflict);
    assert_eq!(
        err.message(),
        format!("Duplicate key: {}/twice already exists.", domain)
    );
}
