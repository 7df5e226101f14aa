//! Analytics event storage

use std::pin::Pin;

use chrono::{DateTime, Utc};
use futures_util::Stream;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::Deserialize;
use strum::{AsRefStr, EnumString};

use super::converters::{event_to_active_model, model_to_event};
use super::{SeaOrmStorage, retry};
use crate::errors::{LinkhubError, Result};
use crate::storage::models::{AnalyticsEvent, EventKind, ROOT_KEY};

use migration::entities::event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EventOrder {
    Asc,
    #[default]
    Desc,
}

/// Row filter shared by the events listing and the CSV export
#[derive(Debug, Clone)]
pub struct EventFilter {
    pub workspace_id: String,
    pub kind: EventKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub link_id: Option<String>,
    pub domain: Option<String>,
    pub key: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub device: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub referer: Option<String>,
    pub qr: Option<bool>,
    /// `Some(true)` keeps only root-domain events, `Some(false)` drops them
    pub root: Option<bool>,
    pub order: EventOrder,
}

impl EventFilter {
    pub fn new(
        workspace_id: impl Into<String>,
        kind: EventKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            kind,
            start,
            end,
            link_id: None,
            domain: None,
            key: None,
            country: None,
            city: None,
            device: None,
            browser: None,
            os: None,
            referer: None,
            qr: None,
            root: None,
            order: EventOrder::Desc,
        }
    }

    fn condition(&self) -> Condition {
        let mut cond = Condition::all()
            .add(event::Column::WorkspaceId.eq(self.workspace_id.as_str()))
            .add(event::Column::Event.eq(self.kind.as_ref()))
            .add(event::Column::Timestamp.gte(self.start))
            .add(event::Column::Timestamp.lte(self.end));

        // A resolved link wins over the raw domain/key pair
        if let Some(ref link_id) = self.link_id {
            cond = cond.add(event::Column::LinkId.eq(link_id.as_str()));
        } else {
            if let Some(ref domain) = self.domain {
                cond = cond.add(event::Column::Domain.eq(domain.as_str()));
            }
            if let Some(ref key) = self.key {
                cond = cond.add(event::Column::Key.eq(key.as_str()));
            }
        }

        let dimensions = [
            (event::Column::Country, &self.country),
            (event::Column::City, &self.city),
            (event::Column::Device, &self.device),
            (event::Column::Browser, &self.browser),
            (event::Column::Os, &self.os),
            (event::Column::Referer, &self.referer),
        ];
        for (column, value) in dimensions {
            if let Some(v) = value {
                cond = cond.add(column.eq(v.as_str()));
            }
        }

        if let Some(qr) = self.qr {
            cond = cond.add(event::Column::Qr.eq(qr));
        }
        match self.root {
            Some(true) => cond = cond.add(event::Column::Key.eq(ROOT_KEY)),
            Some(false) => cond = cond.add(event::Column::Key.ne(ROOT_KEY)),
            None => {}
        }
        cond
    }
}

impl SeaOrmStorage {
    /// One window of matching events ordered by timestamp
    pub async fn query_events(
        &self,
        filter: &EventFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<AnalyticsEvent>> {
        let db = &self.db;
        let condition = filter.condition();
        let models = retry::with_retry("query_events", self.retry_config, || async {
            let query = event::Entity::find().filter(condition.clone());
            let query = match filter.order {
                EventOrder::Asc => query
                    .order_by_asc(event::Column::Timestamp)
                    .order_by_asc(event::Column::Id),
                EventOrder::Desc => query
                    .order_by_desc(event::Column::Timestamp)
                    .order_by_desc(event::Column::Id),
            };
            query.offset(offset).limit(limit).all(db).await
        })
        .await?;

        Ok(models.into_iter().map(model_to_event).collect())
    }

    /// Matching events in batches of `batch_size`, at most `row_limit` rows in total
    pub fn stream_events(
        &self,
        filter: EventFilter,
        batch_size: u64,
        row_limit: u64,
    ) -> Pin<Box<dyn Stream<Item = std::result::Result<Vec<AnalyticsEvent>, LinkhubError>> + Send>>
    {
        use futures_util::stream;

        let storage = self.clone();
        let batch_size = batch_size.max(1);

        Box::pin(stream::unfold(0u64, move |offset| {
            let storage = storage.clone();
            let filter = filter.clone();
            async move {
                if offset >= row_limit {
                    return None;
                }
                let take = batch_size.min(row_limit - offset);
                match storage.query_events(&filter, offset, take).await {
                    Ok(batch) if batch.is_empty() => None,
                    Ok(batch) => {
                        // A short batch means the window is drained
                        let next = if (batch.len() as u64) < take {
                            row_limit
                        } else {
                            offset + take
                        };
                        Some((Ok(batch), next))
                    }
                    Err(e) => Some((Err(e), row_limit)),
                }
            }
        }))
    }

    pub async fn insert_event(&self, event: &AnalyticsEvent) -> Result<()> {
        event_to_active_model(event).insert(&self.db).await?;
        Ok(())
    }

    /// Click event by its click id, scoped to the workspace
    pub async fn find_click(
        &self,
        workspace_id: &str,
        click_id: &str,
    ) -> Result<Option<AnalyticsEvent>> {
        let db = &self.db;
        let (ws, click) = (workspace_id.to_string(), click_id.to_string());
        let model = retry::with_retry("find_click", self.retry_config, || async {
            event::Entity::find()
                .filter(event::Column::WorkspaceId.eq(ws.clone()))
                .filter(event::Column::Event.eq(EventKind::Click.as_ref()))
                .filter(event::Column::ClickId.eq(click.clone()))
                .one(db)
                .await
        })
        .await?;
        Ok(model.map(model_to_event))
    }

    pub async fn find_sale_by_invoice(
        &self,
        workspace_id: &str,
        invoice_id: &str,
    ) -> Result<Option<AnalyticsEvent>> {
        let model = event::Entity::find()
            .filter(event::Column::WorkspaceId.eq(workspace_id))
            .filter(event::Column::Event.eq(EventKind::Sale.as_ref()))
            .filter(event::Column::InvoiceId.eq(invoice_id))
            .one(&self.db)
            .await?;
        Ok(model.map(model_to_event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_parsing() {
        assert_eq!("asc".parse::<EventOrder>().unwrap(), EventOrder::Asc);
        assert_eq!(EventOrder::default(), EventOrder::Desc);
        assert!("sideways".parse::<EventOrder>().is_err());
    }
}
