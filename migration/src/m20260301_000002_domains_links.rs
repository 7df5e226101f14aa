//! Custom domains and the links living on them

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Domains::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Domains::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Domains::Slug)
                            .string_len(191)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Domains::WorkspaceId).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Domains::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Domains::Primary)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Domains::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Domains::Noindex)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Domains::Placeholder).text().null())
                    .col(ColumnDef::new(Domains::ExpiredUrl).text().null())
                    .col(ColumnDef::new(Domains::Target).text().null())
                    .col(
                        ColumnDef::new(Domains::DomainType)
                            .string_len(16)
                            .not_null()
                            .default("redirect"),
                    )
                    .col(
                        ColumnDef::new(Domains::Clicks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Domains::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_domains_workspace")
                    .table(Domains::Table)
                    .col(Domains::WorkspaceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Links::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Links::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Links::WorkspaceId).string_len(64).not_null())
                    .col(ColumnDef::new(Links::Domain).string_len(191).not_null())
                    .col(ColumnDef::new(Links::Key).string_len(191).not_null())
                    .col(ColumnDef::new(Links::Url).text().not_null())
                    .col(
                        ColumnDef::new(Links::Clicks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Links::Leads)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Links::Sales)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Links::SaleAmount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Links::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Links::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_domain_key")
                    .table(Links::Table)
                    .col(Links::Domain)
                    .col(Links::Key)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_workspace")
                    .table(Links::Table)
                    .col(Links::WorkspaceId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_links_workspace").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_links_domain_key").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Links::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_domains_workspace").to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Domains::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Domains {
    Table,
    Id,
    Slug,
    WorkspaceId,
    Verified,
    Primary,
    Archived,
    Noindex,
    Placeholder,
    ExpiredUrl,
    Target,
    DomainType,
    Clicks,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Links {
    Table,
    Id,
    WorkspaceId,
    Domain,
    Key,
    Url,
    Clicks,
    Leads,
    Sales,
    SaleAmount,
    ExpiresAt,
    CreatedAt,
}
