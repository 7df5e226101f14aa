//! API keys. Only the SHA-256 of the plain key is persisted.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "api_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    #[sea_orm(unique)]
    pub hashed_key: String,
    pub partial_key: String,
    pub user_id: String,
    /// When set the key can only act on this workspace
    pub workspace_id: Option<String>,
    pub expires_at: Option<DateTimeUtc>,
    pub last_used: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
