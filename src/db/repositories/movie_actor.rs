use sea_orm::sea_query::{Expr, JoinType, Order, Query, SelectStatement};
use sea_orm::{ConnectionTrait, DatabaseConnection, QueryResult, TransactionTrait, Value};
use tracing::info;

use crate::db::guard::{Guard, conditional_update, delete_row};
use crate::db::layout::CreditTables;
use crate::db::query::{build, ident, malformed, project, qcol, returning};
use crate::db::relations;
use crate::error::{CatalogError, CatalogResult};
use crate::models::MovieActor;

/// Legacy movie/actor associations.
pub struct MovieActorRepository {
    conn: DatabaseConnection,
    tables: CreditTables,
    guard: Guard,
}

impl MovieActorRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection, tables: CreditTables, guard: Guard) -> Self {
        Self {
            conn,
            tables,
            guard,
        }
    }

    pub async fn insert(&self, movie_actor: &mut MovieActor) -> CatalogResult<()> {
        self.guard
            .run("movie_actors.insert", async {
                let txn = self.conn.begin().await?;
                insert_with(&txn, &self.tables, movie_actor).await?;
                txn.commit().await?;
                Ok(())
            })
            .await
    }

    pub async fn get(&self, movie_id: i64, actor_id: i64) -> CatalogResult<MovieActor> {
        if movie_id < 1 || actor_id < 1 {
            return Err(CatalogError::RecordNotFound);
        }
        self.guard
            .run("movie_actors.get", async {
                let select = select_movie_actors(&self.tables)
                    .and_where(qcol("ma", "movie_id").eq(movie_id))
                    .and_where(qcol("ma", "actor_id").eq(actor_id))
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

    pub async fn get_for_movie(&self, movie_id: i64) -> CatalogResult<Vec<MovieActor>> {
        if movie_id < 1 {
            return Err(CatalogError::RecordNotFound);
        }
        self.guard
            .run(
                "movie_actors.get_for_movie",
                for_movie_with(&self.conn, &self.tables, movie_id),
            )
            .await
    }

    pub async fn update(&self, movie_actor: &mut MovieActor) -> CatalogResult<()> {
        self.guard
            .run("movie_actors.update", async {
                let txn = self.conn.begin().await?;
                let stamp = conditional_update(
                    &txn,
                    self.tables.movie_actors,
                    vec![("role", Value::from(movie_actor.role.clone()))],
                    &[
                        ("movie_id", movie_actor.movie_id),
                        ("actor_id", movie_actor.actor_id),
                    ],
                    movie_actor.version,
                )
                .await?;
                relations::sync_cast_role(
                    &txn,
                    &self.tables,
                    movie_actor.movie_id,
                    movie_actor.actor_id,
                    &movie_actor.role,
                )
                .await?;
                txn.commit().await?;
                movie_actor.version = stamp.version;
                movie_actor.updated_at = stamp.updated_at;
                Ok(())
            })
            .await
    }

    pub async fn delete(&self, movie_id: i64, actor_id: i64) -> CatalogResult<()> {
        if movie_id < 1 || actor_id < 1 {
            return Err(CatalogError::RecordNotFound);
        }
        self.guard
            .run("movie_actors.delete", async {
                let txn = self.conn.begin().await?;
                delete_row(
                    &txn,
                    self.tables.movie_actors,
                    &[("movie_id", movie_id), ("actor_id", actor_id)],
                )
                .await?;
                relations::drop_cast_crew(&txn, &self.tables, movie_id, Some(actor_id)).await?;
                txn.commit().await?;
                info!("Deleted movie actor {}/{}", movie_id, actor_id);
                Ok(())
            })
            .await
    }

    /// Removes every association of the movie. None at all is fine.
    pub async fn delete_for_movie(&self, movie_id: i64) -> CatalogResult<()> {
        if movie_id < 1 {
            return Err(CatalogError::RecordNotFound);
        }
        self.guard
            .run("movie_actors.delete_for_movie", async {
                let txn = self.conn.begin().await?;
                delete_for_movie_with(&txn, &self.tables, movie_id).await?;
                txn.commit().await?;
                Ok(())
            })
            .await
    }
}

fn select_movie_actors(tables: &CreditTables) -> SelectStatement {
    let mut select = Query::select();
    project(
        &mut select,
        &[
            ("ma", "movie_id", "movie_id"),
            ("ma", "actor_id", "actor_id"),
            ("a", "name", "actor_name"),
            ("ma", "role", "role"),
            ("ma", "created_at", "created_at"),
            ("ma", "updated_at", "updated_at"),
            ("ma", "version", "version"),
        ],
    );
    select
        .from_as(ident(tables.movie_actors), ident("ma"))
        .join_as(
            JoinType::InnerJoin,
            ident(tables.actors),
            ident("a"),
            qcol("a", "id").equals((ident("ma"), ident("actor_id"))),
        );
    select
}

fn map_row(row: &QueryResult) -> CatalogResult<MovieActor> {
    Ok(MovieActor {
        movie_id: row.try_get("", "movie_id")?,
        actor_id: row.try_get("", "actor_id")?,
        actor_name: row.try_get("", "actor_name")?,
        role: row.try_get("", "role")?,
        created_at: row.try_get("", "created_at")?,
        updated_at: row.try_get("", "updated_at")?,
        version: row.try_get("", "version")?,
    })
}

pub(crate) async fn for_movie_with<C>(
    conn: &C,
    tables: &CreditTables,
    movie_id: i64,
) -> CatalogResult<Vec<MovieActor>>
where
    C: ConnectionTrait,
{
    let select = select_movie_actors(tables)
        .and_where(qcol("ma", "movie_id").eq(movie_id))
        .order_by((ident("ma"), ident("actor_id")), Order::Asc)
        .to_owned();
    let rows = conn.query_all(build(conn, &select)).await?;
    rows.iter().map(map_row).collect()
}

/// Inserts an association with an existing actor. An unknown actor is
/// `RecordNotFound`.
pub(crate) async fn insert_with<C>(
    conn: &C,
    tables: &CreditTables,
    movie_actor: &mut MovieActor,
) -> CatalogResult<()>
where
    C: ConnectionTrait,
{
    let source = Query::select()
        .expr(Expr::val(movie_actor.movie_id))
        .expr(qcol("a", "id"))
        .expr(Expr::val(movie_actor.role.clone()))
        .from_as(ident(tables.actors), ident("a"))
        .and_where(qcol("a", "id").eq(movie_actor.actor_id))
        .to_owned();
    let mut insert = Query::insert();
    insert
        .into_table(ident(tables.movie_actors))
        .columns(["movie_id", "actor_id", "role"].map(ident))
        .select_from(source)
        .map_err(malformed)?
        .returning(returning(&["created_at", "updated_at", "version"]));

    let row = conn
        .query_one(build(conn, &insert))
        .await?
        .ok_or(CatalogError::RecordNotFound)?;

    movie_actor.created_at = row.try_get("", "created_at")?;
    movie_actor.updated_at = row.try_get("", "updated_at")?;
    movie_actor.version = row.try_get("", "version")?;

    let select = Query::select()
        .column(ident("name"))
        .from(ident(tables.actors))
        .and_where(Expr::col(ident("id")).eq(movie_actor.actor_id))
        .to_owned();
    if let Some(row) = conn.query_one(build(conn, &select)).await?
    {
        movie_actor.actor_name = row.try_get("", "name")?;
    }

    info!(
        "Inserted movie actor {}/{}",
        movie_actor.movie_id, movie_actor.actor_id
    );
    Ok(())
}

/// Removes every association of the movie, together with the crew Actor rows
/// that mirror them.
pub(crate) async fn delete_for_movie_with<C>(
    conn: &C,
    tables: &CreditTables,
    movie_id: i64,
) -> CatalogResult<u64>
where
    C: ConnectionTrait,
{
    // Crew rows are matched through the legacy rows, so they go first.
    relations::drop_cast_crew(conn, tables, movie_id, None).await?;

    let delete = Query::delete()
        .from_table(ident(tables.movie_actors))
        .and_where(Expr::col(ident("movie_id")).eq(movie_id))
        .to_owned();
    Ok(conn.execute(build(conn, &delete)).await?.rows_affected())
}
