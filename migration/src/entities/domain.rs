use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "domains")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub workspace_id: String,
    pub verified: bool,
    pub primary: bool,
    pub archived: bool,
    pub noindex: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub placeholder: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub expired_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub target: Option<String>,
    /// redirect / rewrite
    pub domain_type: String,
    pub clicks: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
