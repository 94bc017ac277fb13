use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;

use crate::domain::Strategy;

mod m20240101_000001_views_schema;
mod m20240101_000002_expand_deprecate_schema;
mod m20240101_000003_branches_schema;
mod schema;

pub struct ViewsMigrator;

#[async_trait::async_trait]
impl MigratorTrait for ViewsMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_views_schema::Migration)]
    }
}

pub struct ExpandDeprecateMigrator;

#[async_trait::async_trait]
impl MigratorTrait for ExpandDeprecateMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000002_expand_deprecate_schema::Migration)]
    }
}

pub struct BranchesMigrator;

#[async_trait::async_trait]
impl MigratorTrait for BranchesMigrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000003_branches_schema::Migration)]
    }
}

/// Brings a strategy's database up to its current schema.
pub async fn up(strategy: Strategy, conn: &DatabaseConnection) -> Result<(), DbErr> {
    match strategy {
        Strategy::Views => ViewsMigrator::up(conn, None).await,
        Strategy::ExpandDeprecate => ExpandDeprecateMigrator::up(conn, None).await,
        Strategy::Branches => BranchesMigrator::up(conn, None).await,
    }
}
