use sea_orm::sea_query::{Expr, Order, Query, SelectStatement};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, QueryResult, TransactionTrait, Value,
};
use tracing::info;

use crate::db::guard::{Guard, conditional_update};
use crate::db::layout::CreditTables;
use crate::db::query::{build, ident, insert_row, returning};
use crate::db::relations::{self, decode_birthdate, encode_birthdate};
use crate::error::{CatalogError, CatalogResult};
use crate::models::Actor;

pub struct ActorRepository {
    conn: DatabaseConnection,
    tables: CreditTables,
    guard: Guard,
}

impl ActorRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection, tables: CreditTables, guard: Guard) -> Self {
        Self {
            conn,
            tables,
            guard,
        }
    }

    pub async fn insert(&self, actor: &mut Actor) -> CatalogResult<()> {
        self.guard
            .run("actors.insert", async {
                let mut insert = insert_row(
                    self.tables.actors,
                    vec![
                        ("name", Value::from(actor.name.clone())),
                        ("birthdate", encode_birthdate(actor.birthdate)),
                    ],
                )?;
                insert.returning(returning(&["id", "created_at", "updated_at", "version"]));
                let row = self
                    .conn
                    .query_one(build(&self.conn, &insert))
                    .await?
                    .ok_or(DbErr::RecordNotInserted)?;

                actor.id = row.try_get("", "id")?;
                actor.created_at = row.try_get("", "created_at")?;
                actor.updated_at = row.try_get("", "updated_at")?;
                actor.version = row.try_get("", "version")?;

                info!("Inserted actor {} ({})", actor.id, actor.name);
                Ok(())
            })
            .await
    }

    pub async fn get(&self, id: i64) -> CatalogResult<Actor> {
        if id < 1 {
            return Err(CatalogError::RecordNotFound);
        }
        self.guard
            .run("actors.get", get_with(&self.conn, &self.tables, id))
            .await
    }

    pub async fn get_all(&self) -> CatalogResult<Vec<Actor>> {
        self.guard
            .run("actors.get_all", async {
                let select = select_actors(&self.tables)
                    .order_by(ident("id"), Order::Asc)
                    .to_owned();
                let rows = self.conn.query_all(build(&self.conn, &select)).await?;
                rows.iter().map(map_row).collect()
            })
            .await
    }

    pub async fn update(&self, actor: &mut Actor) -> CatalogResult<()> {
        self.guard
            .run("actors.update", async {
                let txn = self.conn.begin().await?;
                let stamp = conditional_update(
                    &txn,
                    self.tables.actors,
                    vec![
                        ("name", Value::from(actor.name.clone())),
                        ("birthdate", encode_birthdate(actor.birthdate)),
                    ],
                    &[("id", actor.id)],
                    actor.version,
                )
                .await?;
                txn.commit().await?;
                actor.version = stamp.version;
                actor.updated_at = stamp.updated_at;
                info!("Updated actor {} (version {})", actor.id, actor.version);
                Ok(())
            })
            .await
    }

    /// Removes the actor with its movie associations. A person whose shadow
    /// this was loses the link and gets a new shadow on its next write.
    pub async fn delete(&self, id: i64) -> CatalogResult<()> {
        if id < 1 {
            return Err(CatalogError::RecordNotFound);
        }
        self.guard
            .run("actors.delete", async {
                let txn = self.conn.begin().await?;
                relations::delete_actor(&txn, &self.tables, id).await?;
                txn.commit().await?;
                Ok(())
            })
            .await
    }
}

fn select_actors(tables: &CreditTables) -> SelectStatement {
    Query::select()
        .columns(["id", "created_at", "updated_at", "name", "birthdate", "version"].map(ident))
        .from(ident(tables.actors))
        .to_owned()
}

fn map_row(row: &QueryResult) -> CatalogResult<Actor> {
    Ok(Actor {
        id: row.try_get("", "id")?,
        created_at: row.try_get("", "created_at")?,
        updated_at: row.try_get("", "updated_at")?,
        name: row.try_get("", "name")?,
        birthdate: decode_birthdate(row.try_get("", "birthdate")?)?,
        version: row.try_get("", "version")?,
    })
}

pub(crate) async fn get_with<C>(conn: &C, tables: &CreditTables, id: i64) -> CatalogResult<Actor>
where
    C: ConnectionTrait,
{
    let select = select_actors(tables)
        .and_where(Expr::col(ident("id")).eq(id))
        .to_owned();
    let row = conn
        .query_one(build(conn, &select))
        .await?
        .ok_or(CatalogError::RecordNotFound)?;
    map_row(&row)
}
