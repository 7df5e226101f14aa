use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ExprTrait, PaginatorTrait, QueryFilter,
    QueryOrder, sea_query::Expr,
};
use tracing::info;

use super::converters::{link_to_active_model, model_to_link};
use super::{SeaOrmStorage, conflict_on_unique, retry};
use crate::errors::Result;
use crate::storage::models::Link;

use migration::entities::link;

#[derive(Debug, Clone, Default)]
pub struct LinkFilter {
    pub domain: Option<String>,
    /// Substring match on key or destination URL
    pub search: Option<String>,
}

impl SeaOrmStorage {
    pub async fn get_link(&self, id: &str) -> Result<Option<Link>> {
        let db = &self.db;
        let id = id.to_string();
        let model = retry::with_retry("get_link", self.retry_config, || async {
            link::Entity::find_by_id(id.clone()).one(db).await
        })
        .await?;
        Ok(model.map(model_to_link))
    }

    pub async fn get_link_by_key(&self, domain: &str, key: &str) -> Result<Option<Link>> {
        let db = &self.db;
        let (domain, key) = (domain.to_lowercase(), key.to_string());
        let model = retry::with_retry(
            &format!("get_link_by_key({}/{})", domain, key),
            self.retry_config,
            || async {
                link::Entity::find()
                    .filter(link::Column::Domain.eq(domain.clone()))
                    .filter(link::Column::Key.eq(key.clone()))
                    .one(db)
                    .await
            },
        )
        .await?;
        Ok(model.map(model_to_link))
    }

    pub async fn create_link(&self, new: &Link) -> Result<Link> {
        let db = &self.db;
        let model = retry::with_retry("create_link", self.retry_config, || async {
            link_to_active_model(new).insert(db).await
        })
        .await
        .map_err(|e| {
            conflict_on_unique(
                e,
                format!("Duplicate key: {}/{} already exists.", new.domain, new.key),
            )
        })?;
        info!("Link created: {}/{}", model.domain, model.key);
        Ok(model_to_link(model))
    }

    pub async fn list_links(
        &self,
        workspace_id: &str,
        filter: &LinkFilter,
        page: u64,
        page_size: u64,
    ) -> Result<Vec<Link>> {
        let mut condition = Condition::all().add(link::Column::WorkspaceId.eq(workspace_id));

        if let Some(ref domain) = filter.domain {
            condition = condition.add(link::Column::Domain.eq(domain.to_lowercase()));
        }
        if let Some(ref search) = filter.search {
            condition = condition.add(
                Condition::any()
                    .add(link::Column::Key.contains(search))
                    .add(link::Column::Url.contains(search)),
            );
        }

        let db = &self.db;
        let page_offset = page.saturating_sub(1);
        let models = retry::with_retry("list_links", self.retry_config, || async {
            link::Entity::find()
                .filter(condition.clone())
                .order_by_desc(link::Column::CreatedAt)
                .paginate(db, page_size)
                .fetch_page(page_offset)
                .await
        })
        .await?;

        Ok(models.into_iter().map(model_to_link).collect())
    }

    /// Bump the conversion counters of a link
    pub async fn add_link_counters(
        &self,
        link_id: &str,
        clicks: i64,
        leads: i64,
        sales: i64,
        sale_amount: i64,
    ) -> Result<()> {
        link::Entity::update_many()
            .col_expr(
                link::Column::Clicks,
                Expr::col(link::Column::Clicks).add(Expr::val(clicks)),
            )
            .col_expr(
                link::Column::Leads,
                Expr::col(link::Column::Leads).add(Expr::val(leads)),
            )
            .col_expr(
                link::Column::Sales,
                Expr::col(link::Column::Sales).add(Expr::val(sales)),
            )
            .col_expr(
                link::Column::SaleAmount,
                Expr::col(link::Column::SaleAmount).add(Expr::val(sale_amount)),
            )
            .filter(link::Column::Id.eq(link_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}
