use sea_orm_migration::prelude::*;

use super::schema::{Movie, credit_tables, drop_tables, movie_table};
use crate::db::layout::Layout;
use crate::domain::{ApiVersion, Strategy};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        use Movie::{Director, Genre, Genres, Language, Runtime};

        let layout = Layout::resolve(Strategy::ExpandDeprecate, ApiVersion::V5);
        let movies = layout.movies.table;

        manager
            .create_table(movie_table(
                movies,
                &[Genre, Director, Runtime, Language, Genres],
            ))
            .await?;

        for table in credit_tables(&layout.credits, movies, movies) {
            manager.create_table(table).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let layout = Layout::resolve(Strategy::ExpandDeprecate, ApiVersion::V5);
        let credits = layout.credits;
        let names = [
            credits.crew,
            credits.movie_actors,
            credits.people,
            credits.actors,
            layout.movies.table,
        ];
        for table in drop_tables(&names) {
            manager.drop_table(table).await?;
        }
        Ok(())
    }
}
