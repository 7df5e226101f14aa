pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20260301_000001_workspaces;
mod m20260301_000002_domains_links;
mod m20260301_000003_events;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_workspaces::Migration),
            Box::new(m20260301_000002_domains_links::Migration),
            Box::new(m20260301_000003_events::Migration),
        ]
    }
}
