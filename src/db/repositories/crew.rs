use sea_orm::sea_query::{Expr, JoinType, Query, SelectStatement};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, QueryResult, TransactionTrait, Value,
};
use tracing::info;

use crate::db::guard::{Guard, conditional_update, delete_row};
use crate::db::query::{build, ident, malformed, project, qcol, returning};
use crate::db::layout::CreditTables;
use crate::db::relations;
use crate::domain::CrewType;
use crate::error::{CatalogError, CatalogResult};
use crate::models::Crew;

/// Crew associations. Writes keep the legacy movie/actor table in step
/// wherever the strategy shares it.
pub struct CrewRepository {
    conn: DatabaseConnection,
    tables: CreditTables,
    guard: Guard,
}

impl CrewRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection, tables: CreditTables, guard: Guard) -> Self {
        Self {
            conn,
            tables,
            guard,
        }
    }

    pub async fn insert(&self, crew: &mut Crew) -> CatalogResult<()> {
        self.guard
            .run("crew.insert", async {
                let txn = self.conn.begin().await?;
                insert_with(&txn, &self.tables, crew).await?;
                txn.commit().await?;
                Ok(())
            })
            .await
    }

    pub async fn get(&self, movie_id: i64, person_id: i64) -> CatalogResult<Crew> {
        if movie_id < 1 || person_id < 1 {
            return Err(CatalogError::RecordNotFound);
        }
        self.guard
            .run("crew.get", async {
                let select = select_crew(&self.tables)
                    .and_where(qcol("c", "movie_id").eq(movie_id))
                    .and_where(qcol("c", "person_id").eq(person_id))
                    .to_owned();
                let row = self
                    .conn
                    .query_one(build(&self.conn, &select))
                    .await?
                    .ok_or(CatalogError::RecordNotFound)?;
                map_row(&row)
            })
            .await
    }

    /// Full crew of a movie, including members known only through legacy
    /// movie/actor rows. An unknown movie has an empty crew.
    pub async fn get_for_movie(&self, movie_id: i64) -> CatalogResult<Vec<Crew>> {
        if movie_id < 1 {
            return Err(CatalogError::RecordNotFound);
        }
        self.guard
            .run(
                "crew.get_for_movie",
                relations::crew_for_movie(&self.conn, &self.tables, movie_id),
            )
            .await
    }

    pub async fn update(&self, crew: &mut Crew) -> CatalogResult<()> {
        self.guard
            .run("crew.update", async {
                let txn = self.conn.begin().await?;
                update_with(&txn, &self.tables, crew).await?;
                txn.commit().await?;
                Ok(())
            })
            .await
    }

    pub async fn delete(&self, movie_id: i64, person_id: i64) -> CatalogResult<()> {
        if movie_id < 1 || person_id < 1 {
            return Err(CatalogError::RecordNotFound);
        }
        self.guard
            .run("crew.delete", async {
                let txn = self.conn.begin().await?;
                delete_row(
                    &txn,
                    self.tables.crew,
                    &[("movie_id", movie_id), ("person_id", person_id)],
                )
                .await?;
                relations::unmirror_crew(&txn, &self.tables, movie_id, person_id).await?;
                txn.commit().await?;
                info!("Deleted crew {}/{}", movie_id, person_id);
                Ok(())
            })
            .await
    }

    pub async fn delete_for_movie(&self, movie_id: i64) -> CatalogResult<()> {
        if movie_id < 1 {
            return Err(CatalogError::RecordNotFound);
        }
        self.guard
            .run("crew.delete_for_movie", async {
                let txn = self.conn.begin().await?;
                relations::delete_crew_for_movie(&txn, &self.tables, movie_id).await?;
                txn.commit().await?;
                Ok(())
            })
            .await
    }
}

pub(crate) fn select_crew(tables: &CreditTables) -> SelectStatement {
    let mut select = Query::select();
    project(
        &mut select,
        &[
            ("c", "movie_id", "movie_id"),
            ("c", "person_id", "person_id"),
            ("p", "name", "person_name"),
            ("c", "crew_type", "crew_type"),
            ("c", "role", "role"),
            ("p", "old_actor_id", "legacy_actor_id"),
            ("c", "created_at", "created_at"),
            ("c", "updated_at", "updated_at"),
            ("c", "version", "version"),
        ],
    );
    select
        .from_as(ident(tables.crew), ident("c"))
        .join_as(
            JoinType::InnerJoin,
            ident(tables.people),
            ident("p"),
            qcol("p", "id").equals((ident("c"), ident("person_id"))),
        );
    select
}

pub(crate) fn map_row(row: &QueryResult) -> CatalogResult<Crew> {
    let crew_type: String = row.try_get("", "crew_type")?;
    Ok(Crew {
        movie_id: row.try_get("", "movie_id")?,
        person_id: Some(row.try_get("", "person_id")?),
        person_name: row.try_get("", "person_name")?,
        crew_type: crew_type
            .parse::<CrewType>()
            .map_err(|e| DbErr::Type(e.to_string()))?,
        role: row.try_get("", "role")?,
        legacy_actor_id: row.try_get("", "legacy_actor_id")?,
        created_at: row.try_get("", "created_at")?,
        updated_at: row.try_get("", "updated_at")?,
        version: row.try_get("", "version")?,
    })
}

/// Fills in the person-derived fields after a write.
async fn refresh_person<C>(conn: &C, tables: &CreditTables, crew: &mut Crew) -> CatalogResult<()>
where
    C: ConnectionTrait,
{
    let select = Query::select()
        .columns([ident("name"), ident("old_actor_id")])
        .from(ident(tables.people))
        .and_where(Expr::col(ident("id")).eq(crew.person_id))
        .to_owned();
    let row = conn
        .query_one(build(conn, &select))
        .await?
        .ok_or(CatalogError::RecordNotFound)?;
    crew.person_name = row.try_get("", "name")?;
    crew.legacy_actor_id = row.try_get("", "old_actor_id")?;
    Ok(())
}

/// Inserts a crew row for an existing person and mirrors it into the legacy
/// table. An unknown person is `RecordNotFound`.
pub(crate) async fn insert_with<C>(
    conn: &C,
    tables: &CreditTables,
    crew: &mut Crew,
) -> CatalogResult<()>
where
    C: ConnectionTrait,
{
    let person_id = crew.person_id.ok_or(CatalogError::RecordNotFound)?;
    // Selecting through the people table turns an unknown person into an
    // empty insert.
    let source = Query::select()
        .expr(Expr::val(crew.movie_id))
        .expr(qcol("p", "id"))
        .expr(Expr::val(crew.crew_type.as_str()))
        .expr(Expr::val(crew.role.clone()))
        .from_as(ident(tables.people), ident("p"))
        .and_where(qcol("p", "id").eq(person_id))
        .to_owned();
    let mut insert = Query::insert();
    insert
        .into_table(ident(tables.crew))
        .columns(["movie_id", "person_id", "crew_type", "role"].map(ident))
        .select_from(source)
        .map_err(malformed)?
        .returning(returning(&["created_at", "updated_at", "version"]));

    let row = conn
        .query_one(build(conn, &insert))
        .await?
        .ok_or(CatalogError::RecordNotFound)?;

    crew.created_at = row.try_get("", "created_at")?;
    crew.updated_at = row.try_get("", "updated_at")?;
    crew.version = row.try_get("", "version")?;

    relations::mirror_crew(conn, tables, crew).await?;
    refresh_person(conn, tables, crew).await?;

    info!(
        "Inserted crew {}/{} as {}",
        crew.movie_id, person_id, crew.crew_type
    );
    Ok(())
}

pub(crate) async fn update_with<C>(
    conn: &C,
    tables: &CreditTables,
    crew: &mut Crew,
) -> CatalogResult<()>
where
    C: ConnectionTrait,
{
    let person_id = crew.person_id.ok_or(CatalogError::RecordNotFound)?;
    let stamp = conditional_update(
        conn,
        tables.crew,
        vec![
            ("crew_type", Value::from(crew.crew_type.as_str())),
            ("role", Value::from(crew.role.clone())),
        ],
        &[("movie_id", crew.movie_id), ("person_id", person_id)],
        crew.version,
    )
    .await?;
    crew.version = stamp.version;
    crew.updated_at = stamp.updated_at;

    relations::mirror_crew(conn, tables, crew).await?;
    refresh_person(conn, tables, crew).await?;

    info!(
        "Updated crew {}/{} (version {})",
        crew.movie_id, person_id, crew.version
    );
    Ok(())
}
