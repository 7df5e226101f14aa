//! Domain endpoints `/domains`

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::errors::Result;
use crate::services::{
    CreateDomainRequest, DomainService, ListDomainsRequest, WorkspaceContext,
};
use crate::storage::{Domain, DomainType, DomainUpdate};

use crate::analytics::query::parse_bool;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDomainBody {
    pub slug: String,
    #[serde(rename = "type")]
    pub domain_type: Option<DomainType>,
    pub target: Option<String>,
    pub expired_url: Option<String>,
    pub placeholder: Option<String>,
    pub noindex: Option<bool>,
    pub archived: Option<bool>,
}

/// `null` clears a nullable field, an absent key leaves it untouched
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDomainBody {
    pub slug: Option<String>,
    #[serde(rename = "type")]
    pub domain_type: Option<DomainType>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub target: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub expired_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub placeholder: Option<Option<String>>,
    pub noindex: Option<bool>,
    pub archived: Option<bool>,
}

fn deserialize_some<'de, T, D>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl From<UpdateDomainBody> for DomainUpdate {
    fn from(body: UpdateDomainBody) -> Self {
        DomainUpdate {
            slug: body.slug,
            domain_type: body.domain_type,
            target: body.target,
            expired_url: body.expired_url,
            placeholder: body.placeholder,
            noindex: body.noindex,
            archived: body.archived,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDomainsQuery {
    pub archived: Option<String>,
    pub search: Option<String>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

/// Single-domain response, the domain plus its public `url`
#[derive(Debug, Serialize)]
pub struct DomainWithUrl {
    #[serde(flatten)]
    pub domain: Domain,
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedDomain {
    pub slug: String,
}

/// POST /domains
pub async fn create_domain(
    ctx: web::ReqData<WorkspaceContext>,
    body: web::Json<CreateDomainBody>,
    service: web::Data<Arc<DomainService>>,
) -> Result<HttpResponse> {
    let body = body.into_inner();
    let domain = service
        .create(
            &ctx.workspace,
            CreateDomainRequest {
                slug: body.slug,
                domain_type: body.domain_type,
                target: body.target,
                expired_url: body.expired_url,
                placeholder: body.placeholder,
                noindex: body.noindex,
                archived: body.archived,
            },
        )
        .await?;
    info!(
        "Domain '{}' added to workspace {}",
        domain.slug, ctx.workspace.id
    );
    Ok(HttpResponse::Created().json(domain))
}

/// GET /domains/{slug}/exists
pub async fn domain_exists(
    path: web::Path<String>,
    service: web::Data<Arc<DomainService>>,
) -> Result<HttpResponse> {
    let exists = service.exists(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(if exists { 1 } else { 0 }))
}

/// GET /domains/{slug}
pub async fn get_domain(
    ctx: web::ReqData<WorkspaceContext>,
    path: web::Path<String>,
    service: web::Data<Arc<DomainService>>,
) -> Result<HttpResponse> {
    let domain = service.get(&ctx.workspace, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(DomainWithUrl {
        url: domain.target.clone(),
        domain,
    }))
}

/// GET /domains
pub async fn list_domains(
    ctx: web::ReqData<WorkspaceContext>,
    query: web::Query<ListDomainsQuery>,
    service: web::Data<Arc<DomainService>>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    let archived = parse_bool("archived", &query.archived)?.unwrap_or(false);
    let domains = service
        .list(
            &ctx.workspace,
            ListDomainsRequest {
                archived,
                search: query.search,
                page: query.page.unwrap_or(1),
                page_size: query.page_size,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(domains))
}

/// POST /domains/{slug}/primary
pub async fn set_primary_domain(
    ctx: web::ReqData<WorkspaceContext>,
    path: web::Path<String>,
    service: web::Data<Arc<DomainService>>,
) -> Result<HttpResponse> {
    let domain = service
        .set_primary(&ctx.workspace, &path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(domain))
}

/// PATCH /domains/{slug}
pub async fn update_domain(
    ctx: web::ReqData<WorkspaceContext>,
    path: web::Path<String>,
    body: web::Json<UpdateDomainBody>,
    service: web::Data<Arc<DomainService>>,
) -> Result<HttpResponse> {
    let domain = service
        .update(&ctx.workspace, &path.into_inner(), body.into_inner().into())
        .await?;
    Ok(HttpResponse::Ok().json(domain))
}

/// DELETE /domains/{slug}
pub async fn delete_domain(
    ctx: web::ReqData<WorkspaceContext>,
    path: web::Path<String>,
    service: web::Data<Arc<DomainService>>,
) -> Result<HttpResponse> {
    let domain = service.delete(&ctx.workspace, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(DeletedDomain { slug: domain.slug }))
}

/// Domain routes `/domains`
///
/// - POST /domains
/// - GET /domains
/// - GET /domains/{slug}/exists
/// - POST /domains/{slug}/primary
/// - GET/PATCH/DELETE /domains/{slug}
pub fn domains_routes() -> actix_web::Scope {
    web::scope("/domains")
        .route("", web::post().to(create_domain))
        .route("", web::get().to(list_domains))
        .route("/{slug}/exists", web::get().to(domain_exists))
        .route("/{slug}/primary", web::post().to(set_primary_domain))
        .route("/{slug}", web::get().to(get_domain))
        .route("/{slug}", web::patch().to(update_domain))
        .route("/{slug}", web::delete().to(delete_domain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_body_distinguishes_null_from_absent() {
        let body: UpdateDomainBody =
            serde_json::from_str(r#"{"target": null, "noindex": true}"#).unwrap();
        assert_eq!(body.target, Some(None));
        assert_eq!(body.expired_url, None);
        assert_eq!(body.noindex, Some(true));

        let update: DomainUpdate = body.into();
        assert!(!update.is_empty());
    }

    #[test]
    fn test_update_body_type_field() {
        let body: UpdateDomainBody = serde_json::from_str(r#"{"type": "rewrite"}"#).unwrap();
        assert_eq!(body.domain_type, Some(DomainType::Rewrite));
    }
}
