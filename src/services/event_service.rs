//! Analytics events: querying, exporting and conversion tracking

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};
use tracing::info;

use super::auth_service::WorkspaceContext;
use crate::analytics::export::EventBatches;
use crate::analytics::{EventsParams, ExportColumns, valid_date_range_for_plan};
use crate::config::AnalyticsConfig;
use crate::errors::{LinkhubError, Result};
use crate::storage::{
    AnalyticsEvent, ClickContext, CustomerUpsert, Domain, EventKind, Link, ROOT_KEY,
    SeaOrmStorage,
};
use crate::utils::generate_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentProcessor {
    Stripe,
    Shopify,
    Paddle,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackLeadRequest {
    pub click_id: String,
    pub event_name: String,
    pub customer_external_id: String,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSaleRequest {
    pub customer_external_id: String,
    /// Cents
    pub amount: i64,
    pub payment_processor: PaymentProcessor,
    pub event_name: Option<String>,
    pub invoice_id: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedClick {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedCustomer {
    pub id: String,
    pub external_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackLeadResponse {
    pub click: TrackedClick,
    pub customer: TrackedCustomer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedSale {
    pub amount: i64,
    pub currency: String,
    pub payment_processor: String,
    pub invoice_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSaleResponse {
    pub event_name: String,
    pub customer: Option<TrackedCustomer>,
    pub sale: Option<TrackedSale>,
}

/// A ready-to-stream export
pub struct EventExport {
    pub batches: EventBatches,
    pub columns: ExportColumns,
    pub filename: String,
}

pub struct EventService {
    storage: Arc<SeaOrmStorage>,
}

impl EventService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// Link id the events are scoped to: the resolved link, else the
    /// domain itself for `_root` queries
    async fn scoped_link_id(
        &self,
        ctx: &WorkspaceContext,
        params: &EventsParams,
    ) -> Result<Option<String>> {
        if let Some(ref link) = ctx.link {
            return Ok(Some(link.id.clone()));
        }
        match (&params.domain, params.key.as_deref()) {
            (Some(domain), Some(ROOT_KEY)) => Ok(self
                .storage
                .get_workspace_domain(&ctx.workspace.id, domain)
                .await?
                .map(|d| d.id)),
            _ => Ok(None),
        }
    }

    pub async fn list_events(
        &self,
        ctx: &WorkspaceContext,
        params: &EventsParams,
        config: &AnalyticsConfig,
    ) -> Result<Vec<AnalyticsEvent>> {
        let now = Utc::now();
        valid_date_range_for_plan(ctx.workspace.plan, params.interval, params.start, now)?;

        let link_id = self.scoped_link_id(ctx, params).await?;
        let filter = params.to_filter(&ctx.workspace, link_id, now)?;
        let limit = params.page_limit(config);
        let offset = (params.page - 1).saturating_mul(limit);
        self.storage.query_events(&filter, offset, limit).await
    }

    pub async fn export_events(
        &self,
        ctx: &WorkspaceContext,
        params: &EventsParams,
        columns: Vec<String>,
        config: &AnalyticsConfig,
    ) -> Result<EventExport> {
        let now = Utc::now();
        valid_date_range_for_plan(ctx.workspace.plan, params.interval, params.start, now)?;

        let link_id = self.scoped_link_id(ctx, params).await?;
        let filter = params.to_filter(&ctx.workspace, link_id, now)?;

        info!(
            "EventService: exporting {} for workspace {} ({} columns)",
            params.event.as_ref(),
            ctx.workspace.id,
            columns.len()
        );

        Ok(EventExport {
            batches: self.storage.stream_events(
                filter,
                config.export_batch_size,
                config.export_row_limit,
            ),
            columns: ExportColumns::new(columns),
            filename: format!("{}_export.csv", params.event.as_ref()),
        })
    }

    /// Record a click on `link` (or the domain root) and bump the counters
    pub async fn record_click(
        &self,
        domain: &Domain,
        link: Option<&Link>,
        url: &str,
        click: ClickContext,
    ) -> Result<AnalyticsEvent> {
        let (link_id, key) = match link {
            Some(link) => (link.id.clone(), link.key.clone()),
            None => (domain.id.clone(), ROOT_KEY.to_string()),
        };

        let event = AnalyticsEvent {
            id: generate_id("evt"),
            workspace_id: domain.workspace_id.clone(),
            event: EventKind::Click.to_string(),
            timestamp: Utc::now(),
            click_id: generate_id("clk"),
            link_id,
            domain: domain.slug.clone(),
            key,
            url: url.to_string(),
            qr: click.qr,
            continent: click.continent,
            country: click.country,
            city: click.city,
            region: click.region,
            device: click.device,
            browser: click.browser,
            os: click.os,
            referer: click.referer,
            referer_url: click.referer_url,
            ip: click.ip,
            ..Default::default()
        };
        self.storage.insert_event(&event).await?;

        if let Some(link) = link {
            self.storage
                .add_link_counters(&link.id, 1, 0, 0, 0)
                .await?;
        }
        self.storage.add_domain_clicks(&domain.id, 1).await?;
        self.storage
            .add_workspace_usage(&domain.workspace_id, 1)
            .await?;
        Ok(event)
    }

    pub async fn track_lead(
        &self,
        ctx: &WorkspaceContext,
        req: TrackLeadRequest,
    ) -> Result<TrackLeadResponse> {
        if req.event_name.trim().is_empty() || req.customer_external_id.trim().is_empty() {
            return Err(LinkhubError::validation(
                "`eventName` and `customerExternalId` are required.",
            ));
        }

        let click = self
            .storage
            .find_click(&ctx.workspace.id, &req.click_id)
            .await?
            .ok_or_else(|| {
                LinkhubError::not_found(format!(
                    "Click event not found for clickId: {}",
                    req.click_id
                ))
            })?;

        let customer = self
            .storage
            .upsert_customer(CustomerUpsert {
                workspace_id: &ctx.workspace.id,
                external_id: &req.customer_external_id,
                name: req.customer_name.as_deref(),
                email: req.customer_email.as_deref(),
                link_id: &click.link_id,
                click_id: &click.click_id,
            })
            .await?;

        let lead = AnalyticsEvent {
            id: generate_id("evt"),
            event: EventKind::Lead.to_string(),
            timestamp: Utc::now(),
            event_name: Some(req.event_name.clone()),
            customer_id: Some(customer.id.clone()),
            customer_name: customer.name.clone(),
            customer_email: customer.email.clone(),
            ..click.clone()
        };
        self.storage.insert_event(&lead).await?;
        self.storage
            .add_link_counters(&click.link_id, 0, 1, 0, 0)
            .await?;

        info!(
            "EventService: lead '{}' tracked for click {}",
            req.event_name, click.click_id
        );

        Ok(TrackLeadResponse {
            click: TrackedClick { id: click.click_id },
            customer: TrackedCustomer {
                id: customer.id,
                external_id: customer.external_id,
                name: customer.name,
                email: customer.email,
            },
        })
    }

    pub async fn track_sale(
        &self,
        ctx: &WorkspaceContext,
        req: TrackSaleRequest,
    ) -> Result<TrackSaleResponse> {
        if req.amount < 0 {
            return Err(LinkhubError::validation("`amount` must not be negative."));
        }
        let event_name = req
            .event_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "Purchase".to_string());
        let currency = req
            .currency
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "usd".to_string())
            .to_lowercase();
        let invoice_id = req.invoice_id.clone().filter(|i| !i.trim().is_empty());

        let Some(customer) = self
            .storage
            .get_customer(&ctx.workspace.id, &req.customer_external_id)
            .await?
        else {
            return Ok(TrackSaleResponse {
                event_name,
                customer: None,
                sale: None,
            });
        };

        let tracked_customer = TrackedCustomer {
            id: customer.id.clone(),
            external_id: customer.external_id.clone(),
            name: customer.name.clone(),
            email: customer.email.clone(),
        };

        if let Some(ref invoice) = invoice_id
            && let Some(existing) = self
                .storage
                .find_sale_by_invoice(&ctx.workspace.id, invoice)
                .await?
        {
            info!("EventService: invoice {} already recorded", invoice);
            return Ok(TrackSaleResponse {
                event_name: existing.event_name.unwrap_or(event_name),
                customer: Some(tracked_customer),
                sale: Some(TrackedSale {
                    amount: existing.amount.unwrap_or_default(),
                    currency: existing.currency.unwrap_or(currency),
                    payment_processor: existing
                        .payment_processor
                        .unwrap_or_else(|| req.payment_processor.as_ref().to_string()),
                    invoice_id: existing.invoice_id,
                }),
            });
        }

        // Attribute to the click that produced the customer
        let click = match customer.click_id.as_deref() {
            Some(click_id) => self.storage.find_click(&ctx.workspace.id, click_id).await?,
            None => None,
        };
        let base = click.unwrap_or_else(|| AnalyticsEvent {
            workspace_id: ctx.workspace.id.clone(),
            click_id: customer.click_id.clone().unwrap_or_default(),
            link_id: customer.link_id.clone().unwrap_or_default(),
            ..Default::default()
        });

        let sale = AnalyticsEvent {
            id: generate_id("evt"),
            event: EventKind::Sale.to_string(),
            timestamp: Utc::now(),
            event_name: Some(event_name.clone()),
            customer_id: Some(customer.id.clone()),
            customer_name: customer.name.clone(),
            customer_email: customer.email.clone(),
            invoice_id: invoice_id.clone(),
            amount: Some(req.amount),
            currency: Some(currency.clone()),
            payment_processor: Some(req.payment_processor.as_ref().to_string()),
            ..base
        };
        self.storage.insert_event(&sale).await?;
        if !sale.link_id.is_empty() {
            self.storage
                .add_link_counters(&sale.link_id, 0, 0, 1, req.amount)
                .await?;
        }

        info!(
            "EventService: sale of {} {} tracked for customer {}",
            req.amount, currency, customer.external_id
        );

        Ok(TrackSaleResponse {
            event_name,
            customer: Some(tracked_customer),
            sale: Some(TrackedSale {
                amount: req.amount,
                currency,
                payment_processor: req.payment_processor.as_ref().to_string(),
                invoice_id,
            }),
        })
    }
}
