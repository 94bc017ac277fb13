use sea_orm::sea_query::{JoinType, OnConflict, Order, Query, SelectStatement};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbErr, QueryResult, TransactionTrait, Value,
};
use tracing::{debug, info};

use crate::db::genres::{decode_genres, encode_genres, legacy_genre, merge_genres};
use crate::db::guard::{Guard, conditional_update};
use crate::db::layout::{Extension, Home, Layout, MovieLayout};
use crate::db::query::{build, ident, insert_row, qcol, returning};
use crate::db::relations;
use crate::error::{CatalogError, CatalogResult};
use crate::models::Movie;

/// Versioned movie repository. One value serves one `(strategy, version)`
/// pair; the layout decides every table and column it touches.
pub struct MovieRepository {
    conn: DatabaseConnection,
    layout: Layout,
    guard: Guard,
}

impl MovieRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection, layout: Layout, guard: Guard) -> Self {
        Self {
            conn,
            layout,
            guard,
        }
    }

    #[must_use]
    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    pub async fn insert(&self, movie: &mut Movie) -> CatalogResult<()> {
        self.guard
            .run("movies.insert", async {
                let txn = self.conn.begin().await?;
                insert_with(&txn, &self.layout.movies, movie).await?;
                txn.commit().await?;
                Ok(())
            })
            .await
    }

    pub async fn get(&self, id: i64) -> CatalogResult<Movie> {
        if id < 1 {
            return Err(CatalogError::RecordNotFound);
        }
        self.guard
            .run("movies.get", get_with(&self.conn, &self.layout.movies, id))
            .await
    }

    pub async fn get_all(&self) -> CatalogResult<Vec<Movie>> {
        self.guard
            .run("movies.get_all", async {
                let select = select_movies(&self.layout.movies)
                    .order_by((ident("m"), ident("id")), Order::Asc)
                    .to_owned();
                let rows = self.conn.query_all(build(&self.conn, &select)).await?;
                debug!(
                    "Read {} movies from {}",
                    rows.len(),
                    self.layout.movies.table
                );
                rows.iter()
                    .map(|row| map_row(row, &self.layout.movies))
                    .collect()
            })
            .await
    }

    /// Writes `movie` if the stored row still has `movie.version`. On success
    /// `movie.version` and `movie.updated_at` hold the stored values.
    pub async fn update(&self, movie: &mut Movie) -> CatalogResult<()> {
        self.guard
            .run("movies.update", async {
                let txn = self.conn.begin().await?;
                update_with(&txn, &self.layout.movies, movie).await?;
                txn.commit().await?;
                Ok(())
            })
            .await
    }

    /// Removes the movie together with every row that depends on it.
    pub async fn delete(&self, id: i64) -> CatalogResult<()> {
        if id < 1 {
            return Err(CatalogError::RecordNotFound);
        }
        self.guard
            .run("movies.delete", async {
                let txn = self.conn.begin().await?;
                relations::delete_movie(&txn, &self.layout.movies, id).await?;
                txn.commit().await?;
                Ok(())
            })
            .await
    }
}

fn select_movies(layout: &MovieLayout) -> SelectStatement {
    let branches = layout.branches();
    let branch_alias = |table: &str| {
        let idx = branches.iter().position(|(t, _)| *t == table).unwrap_or(0);
        format!("b{idx}")
    };

    let mut select = Query::select();
    for col in ["id", "created_at", "updated_at", "title", "release_year", "version"] {
        select.expr_as(qcol("m", col), ident(col));
    }
    if layout.legacy_genre {
        select.expr_as(qcol("m", "genre"), ident("genre"));
    }
    for (ext, home) in layout.extensions() {
        let alias = match home {
            Home::Base => "m".to_string(),
            Home::Branch(table) => branch_alias(table),
        };
        select.expr_as(qcol(&alias, ext.column()), ident(ext.column()));
    }

    // Rows written before a branch existed have no satellite row; the
    // outer join reads them as absent fields.
    select.from_as(ident(layout.table), ident("m"));
    for (idx, (table, _)) in branches.iter().enumerate() {
        let alias = format!("b{idx}");
        select.join_as(
            JoinType::LeftJoin,
            ident(table),
            ident(&alias),
            qcol(&alias, "id").equals((ident("m"), ident("id"))),
        );
    }
    select
}

fn map_row(row: &QueryResult, layout: &MovieLayout) -> CatalogResult<Movie> {
    let legacy: Option<String> = if layout.legacy_genre {
        row.try_get("", "genre")?
    } else {
        None
    };
    let list = if layout.has(Extension::Genres) {
        let raw: Option<String> = row.try_get("", "genres")?;
        decode_genres(raw.as_deref()).map_err(|e| DbErr::Json(e.to_string()))?
    } else {
        Vec::new()
    };

    let optional_text = |ext: Extension| -> CatalogResult<Option<String>> {
        if layout.has(ext) {
            Ok(row.try_get("", ext.column())?)
        } else {
            Ok(None)
        }
    };

    Ok(Movie {
        id: row.try_get("", "id")?,
        created_at: row.try_get("", "created_at")?,
        updated_at: row.try_get("", "updated_at")?,
        title: row.try_get("", "title")?,
        year: row.try_get("", "release_year")?,
        genres: merge_genres(legacy.as_deref(), list),
        director: optional_text(Extension::Director)?,
        runtime: if layout.has(Extension::Runtime) {
            row.try_get("", "runtime")?
        } else {
            None
        },
        language: optional_text(Extension::Language)?,
        version: row.try_get("", "version")?,
    })
}

fn extension_value(movie: &Movie, ext: Extension) -> CatalogResult<Value> {
    Ok(match ext {
        Extension::Genres => {
            let encoded = encode_genres(&movie.genres).map_err(|e| DbErr::Json(e.to_string()))?;
            Value::from(Some(encoded))
        }
        Extension::Director => Value::from(movie.director.clone()),
        Extension::Runtime => Value::from(movie.runtime),
        Extension::Language => Value::from(movie.language.clone()),
    })
}

/// Columns written on the movie table itself, with their values.
///
/// The legacy `genre` column always takes the first entry of `genres`. A
/// layout without the list column (v1/v2 on shared tables) therefore rewrites
/// only the scalar and leaves any stored list alone, so after such a write
/// single-genre readers see the new genre while list readers keep the old
/// list.
fn base_assignments(
    layout: &MovieLayout,
    movie: &Movie,
) -> CatalogResult<Vec<(&'static str, Value)>> {
    let mut assignments = vec![
        ("title", Value::from(movie.title.clone())),
        ("release_year", Value::from(movie.year)),
    ];
    if layout.legacy_genre {
        assignments.push(("genre", Value::from(legacy_genre(&movie.genres))));
    }
    for ext in layout.base_extensions() {
        assignments.push((ext.column(), extension_value(movie, ext)?));
    }
    Ok(assignments)
}

/// Insert-or-update of every satellite row this layout writes.
async fn upsert_branches<C>(conn: &C, layout: &MovieLayout, movie: &Movie) -> CatalogResult<()>
where
    C: ConnectionTrait,
{
    for (table, exts) in layout.branches() {
        let mut assignments = vec![("id", Value::from(movie.id))];
        for ext in &exts {
            assignments.push((ext.column(), extension_value(movie, *ext)?));
        }
        let mut insert = insert_row(table, assignments)?;
        insert.on_conflict(
            OnConflict::column(ident("id"))
                .update_columns(exts.iter().map(|ext| ident(ext.column())))
                .to_owned(),
        );
        conn.execute(build(conn, &insert)).await?;
    }
    Ok(())
}

pub(crate) async fn insert_with<C>(
    conn: &C,
    layout: &MovieLayout,
    movie: &mut Movie,
) -> CatalogResult<()>
where
    C: ConnectionTrait,
{
    let mut insert = insert_row(layout.table, base_assignments(layout, movie)?)?;
    insert.returning(returning(&["id", "created_at", "updated_at", "version"]));

    let row = conn
        .query_one(build(conn, &insert))
        .await?
        .ok_or(DbErr::RecordNotInserted)?;

    movie.id = row.try_get("", "id")?;
    movie.created_at = row.try_get("", "created_at")?;
    movie.updated_at = row.try_get("", "updated_at")?;
    movie.version = row.try_get("", "version")?;

    upsert_branches(conn, layout, movie).await?;

    info!("Inserted movie {} ({}) into {}", movie.id, movie.title, layout.table);
    Ok(())
}

pub(crate) async fn get_with<C>(conn: &C, layout: &MovieLayout, id: i64) -> CatalogResult<Movie>
where
    C: ConnectionTrait,
{
    let select = select_movies(layout)
        .and_where(qcol("m", "id").eq(id))
        .to_owned();
    let row = conn
        .query_one(build(conn, &select))
        .await?
        .ok_or(CatalogError::RecordNotFound)?;
    map_row(&row, layout)
}

pub(crate) async fn update_with<C>(
    conn: &C,
    layout: &MovieLayout,
    movie: &mut Movie,
) -> CatalogResult<()>
where
    C: ConnectionTrait,
{
    let assignments = base_assignments(layout, movie)?;
    let stamp =
        conditional_update(conn, layout.table, assignments, &[("id", movie.id)], movie.version)
            .await?;
    movie.version = stamp.version;
    movie.updated_at = stamp.updated_at;

    upsert_branches(conn, layout, movie).await?;

    info!(
        "Updated movie {} in {} (version {})",
        movie.id, layout.table, movie.version
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ApiVersion, Strategy};
    use sea_orm::DbBackend;

    fn render(layout: &MovieLayout) -> String {
        DbBackend::Sqlite.build(&select_movies(layout)).to_string()
    }

    #[test]
    fn test_views_select_reads_single_table() {
        let layout = Layout::resolve(Strategy::Views, ApiVersion::V1);
        let sql = render(&layout.movies);
        assert!(sql.contains(r#"FROM "movies_v1" AS "m""#), "{sql}");
        assert!(sql.contains(r#""m"."genre" AS "genre""#), "{sql}");
        assert!(!sql.contains("JOIN"), "{sql}");
    }

    #[test]
    fn test_branches_select_joins_satellites() {
        let layout = Layout::resolve(Strategy::Branches, ApiVersion::V4);
        let sql = render(&layout.movies);
        assert!(sql.contains(r#"LEFT JOIN "movies_branch_v3" AS "b0""#), "{sql}");
        assert!(sql.contains(r#"LEFT JOIN "movies_branch_v2" AS "b1""#), "{sql}");
        assert!(sql.contains(r#""b0"."genres" AS "genres""#), "{sql}");
        assert!(sql.contains(r#""b1"."director" AS "director""#), "{sql}");
    }

    #[test]
    fn test_legacy_column_written_from_genre_list() {
        let layout = Layout::resolve(Strategy::ExpandDeprecate, ApiVersion::V3);
        let movie = Movie {
            title: "Paths of Glory".to_string(),
            year: 1957,
            genres: vec!["Drama".to_string(), "War".to_string()],
            ..Movie::default()
        };
        let assignments = base_assignments(&layout.movies, &movie).unwrap();
        let genre = assignments
            .iter()
            .find(|(col, _)| *col == "genre")
            .map(|(_, v)| v.clone());
        assert_eq!(genre, Some(Value::from(Some("Drama".to_string()))));
        assert!(assignments.iter().any(|(col, _)| *col == "genres"));
    }
}
