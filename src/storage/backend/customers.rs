use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, Set};

use super::converters::model_to_customer;
use super::{SeaOrmStorage, retry};
use crate::errors::Result;
use crate::storage::models::Customer;
use crate::utils::generate_id;

use migration::entities::customer;

/// Customer attributes reported by a lead
pub struct CustomerUpsert<'a> {
    pub workspace_id: &'a str,
    pub external_id: &'a str,
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub link_id: &'a str,
    pub click_id: &'a str,
}

impl SeaOrmStorage {
    pub async fn get_customer(
        &self,
        workspace_id: &str,
        external_id: &str,
    ) -> Result<Option<Customer>> {
        let db = &self.db;
        let (ws, ext) = (workspace_id.to_string(), external_id.to_string());
        let model = retry::with_retry("get_customer", self.retry_config, || async {
            customer::Entity::find()
                .filter(customer::Column::WorkspaceId.eq(ws.clone()))
                .filter(customer::Column::ExternalId.eq(ext.clone()))
                .one(db)
                .await
        })
        .await?;
        Ok(model.map(model_to_customer))
    }

    /// Create the customer or refresh its attribution and contact details
    pub async fn upsert_customer(&self, input: CustomerUpsert<'_>) -> Result<Customer> {
        let existing = customer::Entity::find()
            .filter(customer::Column::WorkspaceId.eq(input.workspace_id))
            .filter(customer::Column::ExternalId.eq(input.external_id))
            .one(&self.db)
            .await?;

        let model = match existing {
            Some(model) => {
                let mut active = model.into_active_model();
                if let Some(name) = input.name {
                    active.name = Set(Some(name.to_string()));
                }
                if let Some(email) = input.email {
                    active.email = Set(Some(email.to_string()));
                }
                active.link_id = Set(Some(input.link_id.to_string()));
                active.click_id = Set(Some(input.click_id.to_string()));
                active.update(&self.db).await?
            }
            None => {
                customer::ActiveModel {
                    id: Set(generate_id("cus")),
                    workspace_id: Set(input.workspace_id.to_string()),
                    external_id: Set(input.external_id.to_string()),
                    name: Set(input.name.map(str::to_string)),
                    email: Set(input.email.map(str::to_string)),
                    link_id: Set(Some(input.link_id.to_string())),
                    click_id: Set(Some(input.click_id.to_string())),
                    created_at: Set(Utc::now()),
                }
                .insert(&self.db)
                .await?
            }
        };
        Ok(model_to_customer(model))
    }
}
