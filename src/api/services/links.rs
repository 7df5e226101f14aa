//! Link endpoints `/links`

use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;

use crate::errors::{LinkhubError, Result};
use crate::services::{CreateLinkRequest, LinkService, WorkspaceContext};
use crate::storage::LinkFilter;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkBody {
    pub domain: String,
    pub key: Option<String>,
    pub url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListLinksQuery {
    pub domain: Option<String>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// POST /links
pub async fn create_link(
    ctx: web::ReqData<WorkspaceContext>,
    body: web::Json<CreateLinkBody>,
    service: web::Data<Arc<LinkService>>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let link = service
        .create_link(
            &ctx.workspace,
            CreateLinkRequest {
                domain: body.domain,
                key: body.key,
                url: body.url,
                expires_at: body.expires_at,
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(link))
}

/// GET /links
pub async fn list_links(
    ctx: web::ReqData<WorkspaceContext>,
    query: web::Query<ListLinksQuery>,
    service: web::Data<Arc<LinkService>>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let links = service
        .list_links(
            &ctx.workspace,
            LinkFilter {
                domain: query.domain,
                search: query.search,
            },
            query.page.unwrap_or(1),
            query.page_size,
        )
        .await?;
    Ok(HttpResponse::Ok().json(links))
}

/// GET /links/info
///
/// The link itself is resolved by the workspace middleware from `linkId`
/// or `domain` + `key`.
pub async fn link_info(ctx: web::ReqData<WorkspaceContext>) -> Result<HttpResponse> {
    match ctx.link {
        Some(ref link) => Ok(HttpResponse::Ok().json(link)),
        None => Err(LinkhubError::validation(
            "Provide either `linkId` or both `domain` and `key` query parameters.",
        )),
    }
}

pub fn links_routes() -> actix_web::Scope {
    web::scope("/links")
        .route("", web::post().to(create_link))
        .route("", web::get().to(list_links))
        .route("/info", web::get().to(link_info))
}
