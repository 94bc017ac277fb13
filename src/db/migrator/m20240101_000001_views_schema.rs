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

        let tables = [
            movie_table("movies_v1", &[Genre]),
            movie_table("movies_v2", &[Genre, Director, Runtime, Language]),
            movie_table("movies_v3", &[Genres, Director, Runtime, Language]),
            movie_table("movies_v4", &[Genres, Director, Runtime, Language]),
            movie_table("movies_v5", &[Genres, Runtime, Language]),
        ];
        for table in tables {
            manager.create_table(table).await?;
        }

        // Legacy casting hangs off the v4 table, crew off the v5 table.
        let credits = Layout::resolve(Strategy::Views, ApiVersion::V5).credits;
        for table in credit_tables(&credits, "movies_v4", "movies_v5") {
            manager.create_table(table).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let credits = Layout::resolve(Strategy::Views, ApiVersion::V5).credits;
        let names = [
            credits.crew,
            credits.movie_actors,
            credits.people,
            credits.actors,
            "movies_v5",
            "movies_v4",
            "movies_v3",
            "movies_v2",
            "movies_v1",
        ];
        for table in drop_tables(&names) {
            manager.drop_table(table).await?;
        }
        Ok(())
    }
}
