//! Per-operation time budget and the optimistic version check.

use sea_orm::sea_query::{Expr, Query, SimpleExpr};
use sea_orm::{ConnectionTrait, Value};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::db::query::{Key, build, ident, key_condition, returning};
use crate::error::{CatalogError, CatalogResult};

pub const DEFAULT_BUDGET: Duration = Duration::from_secs(3);

/// Bounds every unit of work. An expired budget drops the future, which
/// rolls back any open transaction, and is reported as a storage failure.
#[derive(Debug, Clone, Copy)]
pub struct Guard {
    budget: Duration,
}

impl Default for Guard {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET)
    }
}

impl Guard {
    #[must_use]
    pub const fn new(budget: Duration) -> Self {
        Self { budget }
    }

    #[must_use]
    pub const fn budget(&self) -> Duration {
        self.budget
    }

    pub async fn run<T, F>(&self, operation: &str, work: F) -> CatalogResult<T>
    where
        F: Future<Output = CatalogResult<T>>,
    {
        if let Ok(result) = tokio::time::timeout(self.budget, work).await {
            result
        } else {
            warn!(operation, budget = ?self.budget, "Operation timed out");
            Err(CatalogError::timed_out(operation, self.budget))
        }
    }
}

/// Server-assigned state returned by a successful versioned write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    pub version: i32,
    pub updated_at: String,
}

/// Applies `assignments` and bumps `version` in one statement, but only if
/// the row still carries `expected`. The new version is read back from the
/// same statement.
///
/// When nothing matched, the row is looked up again on the same connection:
/// a present row means someone else won the race (`EditConflict`), a missing
/// one means it was deleted first (`RecordNotFound`).
pub(crate) async fn conditional_update<C>(
    conn: &C,
    table: &str,
    assignments: Vec<(&'static str, Value)>,
    key: Key<'_>,
    expected: i32,
) -> CatalogResult<Stamp>
where
    C: ConnectionTrait,
{
    let update = Query::update()
        .table(ident(table))
        .values(
            assignments
                .into_iter()
                .map(|(col, value)| (ident(col), SimpleExpr::Value(value))),
        )
        .value(ident("version"), Expr::col(ident("version")).add(1))
        .value(ident("updated_at"), Expr::current_timestamp())
        .cond_where(key_condition(key).add(Expr::col(ident("version")).eq(expected)))
        .returning(returning(&["version", "updated_at"]))
        .to_owned();

    match conn.query_one(build(conn, &update)).await? {
        Some(row) => Ok(Stamp {
            version: row.try_get("", "version")?,
            updated_at: row.try_get("", "updated_at")?,
        }),
        None => {
            if exists(conn, table, key).await? {
                warn!(table, expected, "Stale version rejected");
                Err(CatalogError::EditConflict)
            } else {
                Err(CatalogError::RecordNotFound)
            }
        }
    }
}

pub(crate) async fn exists<C>(conn: &C, table: &str, key: Key<'_>) -> CatalogResult<bool>
where
    C: ConnectionTrait,
{
    let select = Query::select()
        .expr_as(Expr::val(1), ident("present"))
        .from(ident(table))
        .cond_where(key_condition(key))
        .to_owned();
    Ok(conn.query_one(build(conn, &select)).await?.is_some())
}

/// Deletes the keyed row; zero affected rows is `RecordNotFound`.
pub(crate) async fn delete_row<C>(conn: &C, table: &str, key: Key<'_>) -> CatalogResult<()>
where
    C: ConnectionTrait,
{
    let delete = Query::delete()
        .from_table(ident(table))
        .cond_where(key_condition(key))
        .to_owned();
    let result = conn.execute(build(conn, &delete)).await?;
    if result.rows_affected() == 0 {
        return Err(CatalogError::RecordNotFound);
    }
    Ok(())
}
