//! Statement building for tables named at runtime.
//!
//! Table and column names come from a [`Layout`](crate::db::layout::Layout),
//! so there are no entity types to hang queries on. Everything here goes
//! through `sea_query` with [`Alias`] identifiers and is rendered for the
//! backend of the connection that will run it.

use sea_orm::sea_query::{
    Alias, Condition, Expr, InsertStatement, Query, ReturningClause, SelectStatement, SimpleExpr,
};
use sea_orm::{ConnectionTrait, DbErr, Statement, StatementBuilder, Value};

use crate::error::CatalogResult;

/// Row key as `(column, value)` pairs, all of which must match.
pub(crate) type Key<'a> = &'a [(&'static str, i64)];

#[must_use]
pub(crate) fn ident(name: &str) -> Alias {
    Alias::new(name)
}

/// `alias.column`
#[must_use]
pub(crate) fn qcol(alias: &str, column: &str) -> Expr {
    Expr::col((ident(alias), ident(column)))
}

/// Adds `alias.column AS name` to `select` for each `(alias, column, name)`.
pub(crate) fn project(select: &mut SelectStatement, columns: &[(&str, &str, &str)]) {
    for (alias, column, name) in columns {
        select.expr_as(qcol(alias, column), ident(name));
    }
}

#[must_use]
pub(crate) fn build<C, S>(conn: &C, statement: &S) -> Statement
where
    C: ConnectionTrait,
    S: StatementBuilder,
{
    conn.get_database_backend().build(statement)
}

#[must_use]
pub(crate) fn key_condition(key: Key<'_>) -> Condition {
    key.iter().fold(Condition::all(), |cond, (col, value)| {
        cond.add(Expr::col(ident(col)).eq(*value))
    })
}

/// `RETURNING` clause for the server-assigned columns in `columns`.
#[must_use]
pub(crate) fn returning(columns: &[&str]) -> ReturningClause {
    Query::returning().columns(columns.iter().map(|c| ident(c)))
}

/// `INSERT INTO table (cols) VALUES (values)` from column/value pairs.
pub(crate) fn insert_row(
    table: &str,
    assignments: Vec<(&'static str, Value)>,
) -> CatalogResult<InsertStatement> {
    let (columns, values): (Vec<&str>, Vec<Value>) = assignments.into_iter().unzip();
    let mut insert = Query::insert();
    insert
        .into_table(ident(table))
        .columns(columns.into_iter().map(ident))
        .values(values.into_iter().map(SimpleExpr::Value))
        .map_err(malformed)?;
    Ok(insert)
}

/// A statement `sea_query` refused to assemble, such as a column/value count
/// mismatch.
pub(crate) fn malformed(err: sea_orm::sea_query::error::Error) -> DbErr {
    DbErr::Custom(format!("malformed statement: {err}"))
}
