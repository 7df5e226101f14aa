//! Analytics event endpoints `/analytics`

use actix_web::{HttpResponse, web};
use std::sync::Arc;
use tracing::debug;

use crate::analytics::{EventsQuery, create_csv_stream, parse_columns};
use crate::config::AnalyticsConfig;
use crate::errors::Result;
use crate::services::{EventService, WorkspaceContext};

/// GET /analytics/events
pub async fn get_events(
    ctx: web::ReqData<WorkspaceContext>,
    query: web::Query<EventsQuery>,
    service: web::Data<Arc<EventService>>,
    config: web::Data<AnalyticsConfig>,
) -> Result<HttpResponse> {
    let params = query.parse()?;
    let events = service.list_events(&ctx, &params, &config).await?;
    debug!(
        "Returning {} {} events for workspace {}",
        events.len(),
        params.event.as_ref(),
        ctx.workspace.id
    );
    Ok(HttpResponse::Ok().json(events))
}

/// GET /analytics/events/export
///
/// Streams CSV; the header row is always sent, even for an empty result.
pub async fn export_events(
    ctx: web::ReqData<WorkspaceContext>,
    query: web::Query<EventsQuery>,
    service: web::Data<Arc<EventService>>,
    config: web::Data<AnalyticsConfig>,
) -> Result<HttpResponse> {
    let columns = parse_columns(query.columns.as_deref())?;
    let params = query.parse()?;
    let export = service
        .export_events(&ctx, &params, columns, &config)
        .await?;

    Ok(HttpResponse::Ok()
        .content_type("application/csv")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename={}", export.filename),
        ))
        .streaming(create_csv_stream(export.batches, export.columns)))
}

pub fn analytics_routes() -> actix_web::Scope {
    web::scope("/analytics")
        .route("/events", web::get().to(get_events))
        .route("/events/export", web::get().to(export_events))
}
