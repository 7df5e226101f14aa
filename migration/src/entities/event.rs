//! Analytics event rows (click / lead / sale), one flat table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub workspace_id: String,
    /// click / lead / sale
    pub event: String,
    pub timestamp: DateTimeUtc,
    pub click_id: String,
    pub link_id: String,
    pub domain: String,
    pub key: String,
    #[sea_orm(column_type = "Text")]
    pub url: String,
    pub qr: bool,
    pub continent: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub device: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub referer: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub referer_url: Option<String>,
    pub ip: Option<String>,
    pub event_name: Option<String>,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub invoice_id: Option<String>,
    pub amount: Option<i64>,
    pub currency: Option<String>,
    pub payment_processor: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
