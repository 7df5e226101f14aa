//! Conversion tracking endpoints `/track`

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use crate::errors::Result;
use crate::services::{EventService, TrackLeadRequest, TrackSaleRequest, WorkspaceContext};

/// POST /track/lead
pub async fn track_lead(
    ctx: web::ReqData<WorkspaceContext>,
    body: web::Json<TrackLeadRequest>,
    service: web::Data<Arc<EventService>>,
) -> Result<HttpResponse> {
    let tracked = service.track_lead(&ctx, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tracked))
}

/// POST /track/sale
pub async fn track_sale(
    ctx: web::ReqData<WorkspaceContext>,
    body: web::Json<TrackSaleRequest>,
    service: web::Data<Arc<EventService>>,
) -> Result<HttpResponse> {
    let tracked = service.track_sale(&ctx, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tracked))
}

pub fn track_routes() -> actix_web::Scope {
    web::scope("/track")
        .route("/lead", web::post().to(track_lead))
        .route("/sale", web::post().to(track_sale))
}
