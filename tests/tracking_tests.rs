//! Redirect and conversion tracking tests

mod common;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use common::{bearer, provision, unique};
use linkhub::storage::Plan;

/// Create a domain with a target and a `promo` link; evaluates to the hostname
macro_rules! seed_domain {
    ($app:expr, $key:expr, $extra:expr) => {{
        let domain = format!("{}.example.com", unique("trk"));
        let mut body = json!({ "slug": domain, "target": "https://example.com/home" });
        if let (Some(obj), Some(extra)) = (body.as_object_mut(), $extra.as_object()) {
            obj.extend(extra.clone());
        }
        let req = TestRequest::post()
            .uri("/domains")
            .insert_header(bearer($key))
            .set_json(body)
            .to_request();
        assert_eq!(test::call_service($app, req).await.status(), StatusCode::CREATED);

        let req = TestRequest::post()
            .uri("/links")
            .insert_header(bearer($key))
            .set_json(json!({ "domain": domain, "key": "promo", "url": "https://example.com/promo" }))
            .to_request();
        assert_eq!(test::call_service($app, req).await.status(), StatusCode::CREATED);
        domain
    }};
}

#[actix_rt::test]
async fn test_redirect_records_click() {
    let app = test_app!();
    let (_ws, key) = provision(Plan::Pro).await;
    let domain = seed_domain!(&app, &key, json!({}));

    let req = TestRequest::get()
        .uri("/promo?qr=1")
        .insert_header(("Host", domain.clone()))
        .insert_header(("cf-ipcountry", "DE"))
        .insert_header(("referer", "https://news.example.org/item"))
        .insert_header((
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
        ))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get("Location").unwrap(),
        "https://example.com/promo"
    );
    assert!(resp.headers().get("X-Robots-Tag").is_none());

    let req = TestRequest::get()
        .uri(&format!("/analytics/events?domain={}&key=promo", domain))
        .insert_header(bearer(&key))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let events: Value = test::read_body_json(resp).await;
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    let click = &events[0];
    assert_eq!(click["event"], "click");
    assert_eq!(click["qr"], true);
    assert_eq!(click["country"], "DE");
    assert_eq!(click["referer"], "news.example.org");
    assert_eq!(click["device"], "Desktop");
    assert!(click["click_id"].as_str().unwrap().starts_with("clk_"));

    let req = TestRequest::get()
        .uri(&format!("/links/info?domain={}&key=promo", domain))
        .insert_header(bearer(&key))
        .to_request();
    let link: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(link["clicks"], 1);

    let req = TestRequest::get()
        .uri(&format!("/domains/{}", domain))
        .insert_header(bearer(&key))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["clicks"], 1);
}

#[actix_rt::test]
async fn test_root_and_unknown_keys() {
    let app = test_app!();
    let (_ws, key) = provision(Plan::Pro).await;
    let domain = seed_domain!(&app, &key, json!({ "noindex": true }));

    let req = TestRequest::get()
        .uri("/")
        .insert_header(("Host", format!("{}:443", domain.to_uppercase())))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get("Location").unwrap(), "https://example.com/home");
    assert_eq!(resp.headers().get("X-Robots-Tag").unwrap(), "noindex");

    let req = TestRequest::get()
        .uri("/nope")
        .insert_header(("Host", domain.clone()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = TestRequest::get()
        .uri("/promo")
        .insert_header(("Host", "unknown-host.example.net"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    // Root clicks are filed under `_root`
    let req = TestRequest::get()
        .uri(&format!("/analytics/events?domain={}&key=_root", domain))
        .insert_header(bearer(&key))
        .to_request();
    let events: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(events.as_array().unwrap().len(), 1);
    assert_eq!(events[0]["key"], "_root");
}

#[actix_rt::test]
async fn test_expired_links() {
    let app = test_app!();
    let (_ws, key) = provision(Plan::Pro).await;
    let with_fallback =
        seed_domain!(&app, &key, json!({ "expiredUrl": "https://example.com/expired" }));
    let without_fallback = seed_domain!(&app, &key, json!({}));
    let past = (Utc::now() - Duration::days(1)).to_rfc3339();

    for domain in [&with_fallback, &without_fallback] {
        let req = TestRequest::post()
            .uri("/links")
            .insert_header(bearer(&key))
            .set_json(json!({
                "domain": domain,
                "key": "old",
                "url": "https://example.com/old",
                "expiresAt": past,
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = TestRequest::get()
        .uri("/old")
        .insert_header(("Host", with_fallback.clone()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        resp.headers().get("Location").unwrap(),
        "https://example.com/expired"
    );

    let req = TestRequest::get()
        .uri("/old")
        .insert_header(("Host", without_fallback.clone()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::GONE);
}

#[actix_rt::test]
async fn test_lead_and_sale_flow() {
    let app = test_app!();
    let (_ws, key) = provision(Plan::Pro).await;
    let domain = seed_domain!(&app, &key, json!({}));

    let req = TestRequest::get()
        .uri("/promo")
        .insert_header(("Host", domain.clone()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FOUND);

    let req = TestRequest::get()
        .uri(&format!("/analytics/events?domain={}&key=promo", domain))
        .insert_header(bearer(&key))
        .to_request();
    let events: Value = test::call_and_read_body_json(&app, req).await;
    let click_id = events[0]["click_id"].as_str().unwrap().to_string();

    // Lead
    let req = TestRequest::post()
        .uri("/track/lead")
        .insert_header(bearer(&key))
        .set_json(json!({
            "clickId": click_id,
            "eventName": "Sign up",
            "customerExternalId": "cus-42",
            "customerName": "Ada Lovelace",
            "customerEmail": "ada@example.com",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let lead: Value = test::read_body_json(resp).await;
    assert_eq!(lead["click"]["id"], click_id);
    assert_eq!(lead["customer"]["externalId"], "cus-42");
    assert_eq!(lead["customer"]["email"], "ada@example.com");

    // Sale, sent twice with the same invoice
    for _ in 0..2 {
        let req = TestRequest::post()
            .uri("/track/sale")
            .insert_header(bearer(&key))
            .set_json(json!({
                "customerExternalId": "cus-42",
                "amount": 4900,
                "paymentProcessor": "stripe",
                "invoiceId": "inv_001",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let sale: Value = test::read_body_json(resp).await;
        assert_eq!(sale["eventName"], "Purchase");
        assert_eq!(sale["sale"]["amount"], 4900);
        assert_eq!(sale["sale"]["currency"], "usd");
        assert_eq!(sale["sale"]["invoiceId"], "inv_001");
    }

    let req = TestRequest::get()
        .uri(&format!("/links/info?domain={}&key=promo", domain))
        .insert_header(bearer(&key))
        .to_request();
    let link: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(link["leads"], 1);
    assert_eq!(link["sales"], 1);
    assert_eq!(link["saleAmount"], 4900);

    let req = TestRequest::get()
        .uri(&format!("/analytics/events?event=sales&domain={}&key=promo", domain))
        .insert_header(bearer(&key))
        .to_request();
    let sales: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(sales.as_array().unwrap().len(), 1);
    assert_eq!(sales[0]["customer_name"], "Ada Lovelace");
}

#[actix_rt::test]
async fn test_tracking_unknown_references() {
    let app = test_app!();
    let (_ws, key) = provision(Plan::Pro).await;

    let req = TestRequest::post()
        .uri("/track/lead")
        .insert_header(bearer(&key))
        .set_json(json!({
            "clickId": "clk_unknown",
            "eventName": "Sign up",
            "customerExternalId": "cus-1",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let req = TestRequest::post()
        .uri("/track/sale")
        .insert_header(bearer(&key))
        .set_json(json!({
            "customerExternalId": "nobody",
            "amount": 100,
            "paymentProcessor": "paddle",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["customer"], Value::Null);
    assert_eq!(body["sale"], Value::Null);

    let req = TestRequest::post()
        .uri("/track/sale")
        .insert_header(bearer(&key))
        .set_json(json!({
            "customerExternalId": "nobody",
            "amount": 100,
            "paymentProcessor": "bitcoin",
        }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}
