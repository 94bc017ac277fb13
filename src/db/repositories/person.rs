use sea_orm::sea_query::{Expr, Order, Query, SelectStatement};
use sea_orm::{ConnectionTrait, DatabaseConnection, QueryResult, TransactionTrait};

use crate::db::guard::Guard;
use crate::db::layout::CreditTables;
use crate::db::query::{build, ident};
use crate::db::relations::{self, decode_birthdate};
use crate::error::{CatalogError, CatalogResult};
use crate::models::Person;

/// People carry a shadow actor wherever the legacy credit tables are shared,
/// so every write here goes through the relation helpers.
pub struct PersonRepository {
    conn: DatabaseConnection,
    tables: CreditTables,
    guard: Guard,
}

impl PersonRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection, tables: CreditTables, guard: Guard) -> Self {
        Self {
            conn,
            tables,
            guard,
        }
    }

    pub async fn insert(&self, person: &mut Person) -> CatalogResult<()> {
        self.guard
            .run("people.insert", async {
                let txn = self.conn.begin().await?;
                relations::insert_person(&txn, &self.tables, person).await?;
                txn.commit().await?;
                Ok(())
            })
            .await
    }

    pub async fn get(&self, id: i64) -> CatalogResult<Person> {
        if id < 1 {
            return Err(CatalogError::RecordNotFound);
        }
        self.guard
            .run("people.get", get_with(&self.conn, &self.tables, id))
            .await
    }

    pub async fn get_all(&self) -> CatalogResult<Vec<Person>> {
        self.guard
            .run("people.get_all", async {
                let select = select_people(&self.tables)
                    .order_by(ident("id"), Order::Asc)
                    .to_owned();
                let rows = self.conn.query_all(build(&self.conn, &select)).await?;
                rows.iter().map(map_row).collect()
            })
            .await
    }

    pub async fn update(&self, person: &mut Person) -> CatalogResult<()> {
        self.guard
            .run("people.update", async {
                let txn = self.conn.begin().await?;
                relations::update_person(&txn, &self.tables, person).await?;
                txn.commit().await?;
                Ok(())
            })
            .await
    }

    pub async fn delete(&self, id: i64) -> CatalogResult<()> {
        if id < 1 {
            return Err(CatalogError::RecordNotFound);
        }
        self.guard
            .run("people.delete", async {
                let txn = self.conn.begin().await?;
                relations::delete_person(&txn, &self.tables, id).await?;
                txn.commit().await?;
                Ok(())
            })
            .await
    }
}

fn select_people(tables: &CreditTables) -> SelectStatement {
    Query::select()
        .columns(
            [
                "id",
                "created_at",
                "updated_at",
                "name",
                "birthdate",
                "old_actor_id",
                "version",
            ]
            .map(ident),
        )
        .from(ident(tables.people))
        .to_owned()
}

fn map_row(row: &QueryResult) -> CatalogResult<Person> {
    Ok(Person {
        id: row.try_get("", "id")?,
        created_at: row.try_get("", "created_at")?,
        updated_at: row.try_get("", "updated_at")?,
        name: row.try_get("", "name")?,
        birthdate: decode_birthdate(row.try_get("", "birthdate")?)?,
        old_actor_id: row.try_get("", "old_actor_id")?,
        version: row.try_get("", "version")?,
    })
}

pub(crate) async fn get_with<C>(conn: &C, tables: &CreditTables, id: i64) -> CatalogResult<Person>
where
    C: ConnectionTrait,
{
    let select = select_people(tables)
        .and_where(Expr::col(ident("id")).eq(id))
        .to_owned();
    let row = conn
        .query_one(build(conn, &select))
        .await?
        .ok_or(CatalogError::RecordNotFound)?;
    map_row(&row)
}
