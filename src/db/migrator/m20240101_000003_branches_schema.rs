use sea_orm_migration::prelude::*;

use super::schema::{Movie, branch_table, credit_tables, drop_tables, movie_table};
use crate::db::layout::{BRANCH_V2, BRANCH_V3, Layout};
use crate::domain::{ApiVersion, Strategy};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let layout = Layout::resolve(Strategy::Branches, ApiVersion::V5);
        let movies = layout.movies.table;

        // The base table keeps its first shape forever.
        manager
            .create_table(movie_table(movies, &[Movie::Genre]))
            .await?;
        manager
            .create_table(branch_table(
                BRANCH_V2,
                movies,
                &[Movie::Director, Movie::Runtime, Movie::Language],
            ))
            .await?;
        manager
            .create_table(branch_table(BRANCH_V3, movies, &[Movie::Genres]))
            .await?;

        for table in credit_tables(&layout.credits, movies, movies) {
            manager.create_table(table).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let layout = Layout::resolve(Strategy::Branches, ApiVersion::V5);
        let credits = layout.credits;
        let names = [
            credits.crew,
            credits.movie_actors,
            credits.people,
            credits.actors,
            BRANCH_V3,
            BRANCH_V2,
            layout.movies.table,
        ];
        for table in drop_tables(&names) {
            manager.drop_table(table).await?;
        }
        Ok(())
    }
}
