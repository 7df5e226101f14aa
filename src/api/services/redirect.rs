use std::borrow::Cow;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, web};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, trace};
use woothee::parser::Parser;

use crate::api::constants::{DIRECT_REFERER, QR_QUERY_FLAG};
use crate::services::{EventService, RedirectOutcome, RedirectService};
use crate::storage::{ClickContext, Domain, Link, ROOT_KEY};

pub struct RedirectHandler;

impl RedirectHandler {
    pub async fn handle_root(
        req: HttpRequest,
        redirects: web::Data<Arc<RedirectService>>,
        events: web::Data<Arc<EventService>>,
    ) -> HttpResponse {
        Self::process_redirect(ROOT_KEY, req, redirects, events).await
    }

    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        redirects: web::Data<Arc<RedirectService>>,
        events: web::Data<Arc<EventService>>,
    ) -> HttpResponse {
        let key = path.into_inner();
        let key = key.trim_end_matches('/');
        let key = if key.is_empty() { ROOT_KEY } else { key };
        Self::process_redirect(key, req, redirects, events).await
    }

    async fn process_redirect(
        key: &str,
        req: HttpRequest,
        redirects: web::Data<Arc<RedirectService>>,
        events: web::Data<Arc<EventService>>,
    ) -> HttpResponse {
        let host = Self::request_host(&req);
        match redirects.resolve(&host, key, Utc::now()).await {
            Ok(RedirectOutcome::Redirect { domain, link, url }) => {
                Self::record_click(&req, &events, &domain, link.as_ref(), &url).await;
                Self::finish_redirect(&domain, &url)
            }
            Ok(RedirectOutcome::Expired { domain, url }) => {
                debug!("Expired link {}/{}, sending to expiredUrl", domain.slug, key);
                Self::finish_redirect(&domain, &url)
            }
            Ok(RedirectOutcome::Gone) => {
                debug!("Expired link {}/{}", host, key);
                Self::plain_response(StatusCode::GONE, "Gone")
            }
            Ok(RedirectOutcome::NotFound) => {
                trace!("No link for {}/{}", host, key);
                Self::plain_response(StatusCode::NOT_FOUND, "Not Found")
            }
            Err(e) => {
                error!("Redirect lookup failed for {}/{}: {}", host, key, e);
                Self::plain_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
    }

    /// `Host` header, else whatever actix resolved from the connection
    fn request_host(req: &HttpRequest) -> String {
        req.headers()
            .get("host")
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| req.connection_info().host().to_string())
    }

    fn finish_redirect(domain: &Domain, url: &str) -> HttpResponse {
        let mut resp = HttpResponse::build(StatusCode::FOUND);
        resp.insert_header(("Location", url));
        if domain.noindex {
            resp.insert_header(("X-Robots-Tag", "noindex"));
        }
        resp.finish()
    }

    #[inline]
    fn plain_response(status: StatusCode, body: &'static str) -> HttpResponse {
        HttpResponse::build(status)
            .insert_header(("Content-Type", "text/plain; charset=utf-8"))
            .body(body)
    }

    /// Click failures are logged; the visitor is redirected regardless
    async fn record_click(
        req: &HttpRequest,
        events: &EventService,
        domain: &Domain,
        link: Option<&Link>,
        url: &str,
    ) {
        let click = Self::click_context(req);
        match events.record_click(domain, link, url, click).await {
            Ok(event) => trace!("Recorded click {} on {}", event.click_id, domain.slug),
            Err(e) => error!("Failed to record click on {}: {}", domain.slug, e),
        }
    }

    fn click_context(req: &HttpRequest) -> ClickContext {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| urlencoding::decode(v).map(Cow::into_owned).unwrap_or_else(|_| v.to_string()))
        };

        let qr = req
            .uri()
            .query()
            .and_then(|q| Self::extract_query_param(q, QR_QUERY_FLAG))
            .is_some_and(|v| v == "1" || v == "true");

        let referer_url = header("referer");
        let referer = referer_url
            .as_deref()
            .and_then(Self::extract_domain)
            .map(str::to_string)
            .unwrap_or_else(|| DIRECT_REFERER.to_string());

        let (device, browser, os) = header("user-agent")
            .map(|ua| Self::parse_user_agent(&ua))
            .unwrap_or_default();

        ClickContext {
            qr,
            continent: header("cf-ipcontinent"),
            country: header("cf-ipcountry")
                .or_else(|| header("x-vercel-ip-country"))
                .map(|c| c.to_uppercase()),
            city: header("x-vercel-ip-city"),
            region: header("x-vercel-ip-country-region"),
            device,
            browser,
            os,
            referer: Some(referer),
            referer_url,
            ip: req.connection_info().realip_remote_addr().map(str::to_string),
        }
    }

    /// (device, browser, os)
    fn parse_user_agent(ua: &str) -> (Option<String>, Option<String>, Option<String>) {
        let result = Parser::new().parse(ua).unwrap_or_default();
        let known = |v: &str| (!v.is_empty() && v != "UNKNOWN").then(|| v.to_string());

        let device = match result.category {
            "pc" => Some("Desktop".to_string()),
            "smartphone" | "mobilephone" => Some("Mobile".to_string()),
            "crawler" => Some("Bot".to_string()),
            "appliance" => Some("Appliance".to_string()),
            _ => None,
        };
        (device, known(result.name), known(result.os))
    }

    #[inline]
    fn extract_query_param<'a>(query: &'a str, key: &str) -> Option<Cow<'a, str>> {
        for part in query.split('&') {
            if let Some(value) = part.strip_prefix(key).and_then(|s| s.strip_prefix('=')) {
                return urlencoding::decode(value).ok();
            }
        }
        None
    }

    #[inline]
    fn extract_domain(url: &str) -> Option<&str> {
        let without_scheme = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .unwrap_or(url);

        without_scheme
            .split(&['/', ':', '?', '#'][..])
            .next()
            .filter(|s| !s.is_empty())
    }
}

/// Catch-all redirect routes; register after every other service
pub fn redirect_routes() -> actix_web::Scope {
    web::scope("")
        .route("/", web::get().to(RedirectHandler::handle_root))
        .route("/", web::head().to(RedirectHandler::handle_root))
        .route("/{key:.*}", web::get().to(RedirectHandler::handle_redirect))
        .route("/{key:.*}", web::head().to(RedirectHandler::handle_redirect))
}
