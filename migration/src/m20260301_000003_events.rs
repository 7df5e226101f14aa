//! Customers and analytics events

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Customers::WorkspaceId).string_len(64).not_null())
                    .col(ColumnDef::new(Customers::ExternalId).string_len(191).not_null())
                    .col(ColumnDef::new(Customers::Name).string().null())
                    .col(ColumnDef::new(Customers::Email).string().null())
                    .col(ColumnDef::new(Customers::LinkId).string_len(64).null())
                    .col(ColumnDef::new(Customers::ClickId).string_len(64).null())
                    .col(
                        ColumnDef::new(Customers::CreatedAt)
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
                    .name("idx_customers_workspace_external")
                    .table(Customers::Table)
                    .col(Customers::WorkspaceId)
                    .col(Customers::ExternalId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Events::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Events::WorkspaceId).string_len(64).not_null())
                    .col(ColumnDef::new(Events::Event).string_len(8).not_null())
                    .col(
                        ColumnDef::new(Events::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Events::ClickId).string_len(64).not_null())
                    .col(ColumnDef::new(Events::LinkId).string_len(64).not_null())
                    .col(ColumnDef::new(Events::Domain).string_len(191).not_null())
                    .col(ColumnDef::new(Events::Key).string_len(191).not_null())
                    .col(ColumnDef::new(Events::Url).text().not_null())
                    .col(
                        ColumnDef::new(Events::Qr)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Events::Continent).string_len(2).null())
                    .col(ColumnDef::new(Events::Country).string_len(2).null())
                    .col(ColumnDef::new(Events::City).string_len(100).null())
                    .col(ColumnDef::new(Events::Region).string_len(100).null())
                    .col(ColumnDef::new(Events::Device).string_len(32).null())
                    .col(ColumnDef::new(Events::Browser).string_len(64).null())
                    .col(ColumnDef::new(Events::Os).string_len(64).null())
                    .col(ColumnDef::new(Events::Referer).string_len(191).null())
                    .col(ColumnDef::new(Events::RefererUrl).text().null())
                    .col(ColumnDef::new(Events::Ip).string_len(45).null())
                    .col(ColumnDef::new(Events::EventName).string().null())
                    .col(ColumnDef::new(Events::CustomerId).string_len(64).null())
                    .col(ColumnDef::new(Events::CustomerName).string().null())
                    .col(ColumnDef::new(Events::CustomerEmail).string().null())
                    .col(ColumnDef::new(Events::InvoiceId).string_len(191).null())
                    .col(ColumnDef::new(Events::Amount).big_integer().null())
                    .col(ColumnDef::new(Events::Currency).string_len(8).null())
                    .col(ColumnDef::new(Events::PaymentProcessor).string_len(32).null())
                    .to_owned(),
            )
            .await?;

        // Covers the export / list query: workspace + type + time window
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_events_workspace_event_time")
                    .table(Events::Table)
                    .col(Events::WorkspaceId)
                    .col(Events::Event)
                    .col(Events::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_events_link_time")
                    .table(Events::Table)
                    .col(Events::LinkId)
                    .col(Events::Timestamp)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_events_click_id")
                    .table(Events::Table)
                    .col(Events::ClickId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_events_click_id",
            "idx_events_link_time",
            "idx_events_workspace_event_time",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_customers_workspace_external")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Customers {
    Table,
    Id,
    WorkspaceId,
    ExternalId,
    Name,
    Email,
    LinkId,
    ClickId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    WorkspaceId,
    Event,
    Timestamp,
    ClickId,
    LinkId,
    Domain,
    Key,
    Url,
    Qr,
    Continent,
    Country,
    City,
    Region,
    Device,
    Browser,
    Os,
    Referer,
    RefererUrl,
    Ip,
    EventName,
    CustomerId,
    CustomerName,
    CustomerEmail,
    InvoiceId,
    Amount,
    Currency,
    PaymentProcessor,
}
