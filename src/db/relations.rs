//! Cross-entity integrity.
//!
//! Every function here runs on a caller-supplied connection, normally an open
//! transaction, so the primary write and its satellite writes commit or roll
//! back together. Each unit of work starts with a write so that SQLite takes
//! the write lock up front instead of upgrading a stale read snapshot.

use chrono::NaiveDate;
use sea_orm::sea_query::{Condition, Expr, Func, JoinType, OnConflict, Order, Query, SelectStatement};
use sea_orm::{ConnectionTrait, DbErr, Value};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::db::guard::{conditional_update, delete_row};
use crate::db::layout::{CreditTables, MovieLayout};
use crate::db::query::{build, ident, insert_row, project, qcol, returning};
use crate::db::repositories::crew;
use crate::domain::CrewType;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{Crew, Person};

pub(crate) fn encode_birthdate(birthdate: Option<NaiveDate>) -> Value {
    Value::from(birthdate.map(|d| d.to_string()))
}

pub(crate) fn decode_birthdate(raw: Option<String>) -> CatalogResult<Option<NaiveDate>> {
    raw.map(|s| s.parse::<NaiveDate>())
        .transpose()
        .map_err(|e| CatalogError::Storage(DbErr::Type(e.to_string())))
}

/// Removes every dependent row, then the movie. Missing dependents are fine;
/// a missing movie is `RecordNotFound`.
pub(crate) async fn delete_movie<C>(conn: &C, layout: &MovieLayout, id: i64) -> CatalogResult<()>
where
    C: ConnectionTrait,
{
    let mut removed = 0;
    for dep in layout.dependents {
        let delete = Query::delete()
            .from_table(ident(dep.table))
            .and_where(Expr::col(ident(dep.key)).eq(id))
            .to_owned();
        removed += conn.execute(build(conn, &delete)).await?.rows_affected();
    }

    delete_row(conn, layout.table, &[("id", id)]).await?;

    info!(
        "Deleted movie {} from {} with {} dependent rows",
        id, layout.table, removed
    );
    Ok(())
}

async fn insert_shadow<C>(
    conn: &C,
    tables: &CreditTables,
    name: &str,
    birthdate: Option<NaiveDate>,
) -> CatalogResult<i64>
where
    C: ConnectionTrait,
{
    let mut insert = insert_row(
        tables.actors,
        vec![
            ("name", Value::from(name)),
            ("birthdate", encode_birthdate(birthdate)),
        ],
    )?;
    insert.returning(returning(&["id"]));
    let row = conn
        .query_one(build(conn, &insert))
        .await?
        .ok_or(DbErr::RecordNotInserted)?;
    Ok(row.try_get("", "id")?)
}

/// Creates a fresh shadow actor and points the person at it.
async fn relink_shadow<C>(
    conn: &C,
    tables: &CreditTables,
    person_id: i64,
    name: &str,
    birthdate: Option<NaiveDate>,
) -> CatalogResult<i64>
where
    C: ConnectionTrait,
{
    let actor_id = insert_shadow(conn, tables, name, birthdate).await?;
    let update = Query::update()
        .table(ident(tables.people))
        .value(ident("old_actor_id"), actor_id)
        .and_where(Expr::col(ident("id")).eq(person_id))
        .to_owned();
    conn.execute(build(conn, &update)).await?;
    info!("Recreated shadow actor {} for person {}", actor_id, person_id);
    Ok(actor_id)
}

/// Inserts the person and its shadow actor.
pub(crate) async fn insert_person<C>(
    conn: &C,
    tables: &CreditTables,
    person: &mut Person,
) -> CatalogResult<()>
where
    C: ConnectionTrait,
{
    let actor_id = insert_shadow(conn, tables, &person.name, person.birthdate).await?;

    let mut insert = insert_row(
        tables.people,
        vec![
            ("name", Value::from(person.name.clone())),
            ("birthdate", encode_birthdate(person.birthdate)),
            ("old_actor_id", Value::from(actor_id)),
        ],
    )?;
    insert.returning(returning(&["id", "created_at", "updated_at", "version"]));
    let row = conn
        .query_one(build(conn, &insert))
        .await?
        .ok_or(DbErr::RecordNotInserted)?;

    person.id = row.try_get("", "id")?;
    person.created_at = row.try_get("", "created_at")?;
    person.updated_at = row.try_get("", "updated_at")?;
    person.version = row.try_get("", "version")?;
    person.old_actor_id = Some(actor_id);

    info!(
        "Inserted person {} ({}) with shadow actor {}",
        person.id, person.name, actor_id
    );
    Ok(())
}

/// Versioned person update followed by the same change on its shadow actor.
/// A shadow that has gone missing is recreated.
pub(crate) async fn update_person<C>(
    conn: &C,
    tables: &CreditTables,
    person: &mut Person,
) -> CatalogResult<()>
where
    C: ConnectionTrait,
{
    let stamp = conditional_update(
        conn,
        tables.people,
        vec![
            ("name", Value::from(person.name.clone())),
            ("birthdate", encode_birthdate(person.birthdate)),
        ],
        &[("id", person.id)],
        person.version,
    )
    .await?;
    person.version = stamp.version;
    person.updated_at = stamp.updated_at;

    let select = Query::select()
        .column(ident("old_actor_id"))
        .from(ident(tables.people))
        .and_where(Expr::col(ident("id")).eq(person.id))
        .to_owned();
    let linked: Option<i64> = match conn.query_one(build(conn, &select)).await? {
        Some(row) => row.try_get("", "old_actor_id")?,
        None => None,
    };

    if let Some(actor_id) = linked {
        let update = Query::update()
            .table(ident(tables.actors))
            .value(ident("name"), person.name.clone())
            .value(ident("birthdate"), encode_birthdate(person.birthdate))
            .value(ident("version"), Expr::col(ident("version")).add(1))
            .value(ident("updated_at"), Expr::current_timestamp())
            .and_where(Expr::col(ident("id")).eq(actor_id))
            .to_owned();
        let result = conn.execute(build(conn, &update)).await?;
        if result.rows_affected() > 0 {
            person.old_actor_id = Some(actor_id);
            info!("Updated person {} and shadow actor {}", person.id, actor_id);
            return Ok(());
        }
    }

    let actor_id = relink_shadow(conn, tables, person.id, &person.name, person.birthdate).await?;
    person.old_actor_id = Some(actor_id);
    Ok(())
}

/// Removes the person's crew rows, the person, its shadow actor and the
/// shadow's legacy associations.
pub(crate) async fn delete_person<C>(conn: &C, tables: &CreditTables, id: i64) -> CatalogResult<()>
where
    C: ConnectionTrait,
{
    delete_where(conn, tables.crew, "person_id", id).await?;

    let delete = Query::delete()
        .from_table(ident(tables.people))
        .and_where(Expr::col(ident("id")).eq(id))
        .returning(returning(&["old_actor_id"]))
        .to_owned();
    let row = conn
        .query_one(build(conn, &delete))
        .await?
        .ok_or(CatalogError::RecordNotFound)?;
    let shadow: Option<i64> = row.try_get("", "old_actor_id")?;

    if let Some(actor_id) = shadow {
        delete_where(conn, tables.movie_actors, "actor_id", actor_id).await?;
        delete_where(conn, tables.actors, "id", actor_id).await?;
    }

    info!("Deleted person {} (shadow actor {:?})", id, shadow);
    Ok(())
}

/// Removes the actor's associations and any person link to it.
pub(crate) async fn delete_actor<C>(conn: &C, tables: &CreditTables, id: i64) -> CatalogResult<()>
where
    C: ConnectionTrait,
{
    delete_where(conn, tables.movie_actors, "actor_id", id).await?;

    let update = Query::update()
        .table(ident(tables.people))
        .value(ident("old_actor_id"), Value::BigInt(None))
        .and_where(Expr::col(ident("old_actor_id")).eq(id))
        .to_owned();
    conn.execute(build(conn, &update)).await?;

    delete_row(conn, tables.actors, &[("id", id)]).await?;
    info!("Deleted actor {}", id);
    Ok(())
}

/// The person's shadow actor id, recreating the shadow when it is gone.
pub(crate) async fn shadow_actor_id<C>(
    conn: &C,
    tables: &CreditTables,
    person_id: i64,
) -> CatalogResult<i64>
where
    C: ConnectionTrait,
{
    let mut select = Query::select();
    project(
        &mut select,
        &[
            ("p", "name", "name"),
            ("p", "birthdate", "birthdate"),
            ("a", "id", "actor_id"),
        ],
    );
    select
        .from_as(ident(tables.people), ident("p"))
        .join_as(
            JoinType::LeftJoin,
            ident(tables.actors),
            ident("a"),
            qcol("a", "id").equals((ident("p"), ident("old_actor_id"))),
        )
        .and_where(qcol("p", "id").eq(person_id));
    let row = conn
        .query_one(build(conn, &select))
        .await?
        .ok_or(CatalogError::RecordNotFound)?;

    if let Some(actor_id) = row.try_get::<Option<i64>>("", "actor_id")? {
        return Ok(actor_id);
    }

    let name: String = row.try_get("", "name")?;
    let birthdate = decode_birthdate(row.try_get("", "birthdate")?)?;
    relink_shadow(conn, tables, person_id, &name, birthdate).await
}

/// Keeps the legacy association in step with a crew row: Actor crew gets a
/// movie/actor row through the shadow actor, other crew types have none.
pub(crate) async fn mirror_crew<C>(conn: &C, tables: &CreditTables, crew: &Crew) -> CatalogResult<()>
where
    C: ConnectionTrait,
{
    if !tables.crew_mirrors_legacy {
        return Ok(());
    }
    let Some(person_id) = crew.person_id else {
        return Ok(());
    };

    if crew.crew_type != CrewType::Actor {
        return unmirror_crew(conn, tables, crew.movie_id, person_id).await;
    }

    let actor_id = shadow_actor_id(conn, tables, person_id).await?;
    let mut upsert = insert_row(
        tables.movie_actors,
        vec![
            ("movie_id", Value::from(crew.movie_id)),
            ("actor_id", Value::from(actor_id)),
            ("role", Value::from(crew.role.clone().unwrap_or_default())),
        ],
    )?;
    upsert.on_conflict(
        OnConflict::columns([ident("movie_id"), ident("actor_id")])
            .update_column(ident("role"))
            .value(ident("version"), Expr::col(ident("version")).add(1))
            .value(ident("updated_at"), Expr::current_timestamp())
            .to_owned(),
    );
    conn.execute(build(conn, &upsert)).await?;

    debug!(
        "Mirrored crew {}/{} into {} via actor {}",
        crew.movie_id, person_id, tables.movie_actors, actor_id
    );
    Ok(())
}

/// Drops the legacy association a crew row may have produced.
pub(crate) async fn unmirror_crew<C>(
    conn: &C,
    tables: &CreditTables,
    movie_id: i64,
    person_id: i64,
) -> CatalogResult<()>
where
    C: ConnectionTrait,
{
    if !tables.crew_mirrors_legacy {
        return Ok(());
    }
    let shadow = Query::select()
        .column(ident("old_actor_id"))
        .from(ident(tables.people))
        .and_where(Expr::col(ident("id")).eq(person_id))
        .to_owned();
    let delete = Query::delete()
        .from_table(ident(tables.movie_actors))
        .and_where(Expr::col(ident("movie_id")).eq(movie_id))
        .and_where(Expr::col(ident("actor_id")).in_subquery(shadow))
        .to_owned();
    conn.execute(build(conn, &delete)).await?;
    Ok(())
}

/// People whose shadow actor is `actor_id`, or, without one, whose shadow
/// appears in the movie's legacy associations.
fn shadow_people(tables: &CreditTables, movie_id: i64, actor_id: Option<i64>) -> SelectStatement {
    let mut people = Query::select();
    people.column(ident("id")).from(ident(tables.people));
    match actor_id {
        Some(actor_id) => people.and_where(Expr::col(ident("old_actor_id")).eq(actor_id)),
        None => people.and_where(
            Expr::col(ident("old_actor_id")).in_subquery(
                Query::select()
                    .column(ident("actor_id"))
                    .from(ident(tables.movie_actors))
                    .and_where(Expr::col(ident("movie_id")).eq(movie_id))
                    .to_owned(),
            ),
        ),
    };
    people
}

/// Crew Actor rows of the movie that stand for a shadow actor's legacy row.
fn cast_crew(tables: &CreditTables, movie_id: i64, actor_id: Option<i64>) -> Condition {
    Condition::all()
        .add(Expr::col(ident("movie_id")).eq(movie_id))
        .add(Expr::col(ident("crew_type")).eq(CrewType::Actor.as_str()))
        .add(Expr::col(ident("person_id")).in_subquery(shadow_people(tables, movie_id, actor_id)))
}

/// Carries a legacy role change over to the crew Actor row of the person
/// behind `actor_id`, if there is one.
pub(crate) async fn sync_cast_role<C>(
    conn: &C,
    tables: &CreditTables,
    movie_id: i64,
    actor_id: i64,
    role: &str,
) -> CatalogResult<()>
where
    C: ConnectionTrait,
{
    if !tables.crew_mirrors_legacy {
        return Ok(());
    }
    let update = Query::update()
        .table(ident(tables.crew))
        .value(ident("role"), role)
        .value(ident("version"), Expr::col(ident("version")).add(1))
        .value(ident("updated_at"), Expr::current_timestamp())
        .cond_where(cast_crew(tables, movie_id, Some(actor_id)))
        .to_owned();
    let synced = conn.execute(build(conn, &update)).await?.rows_affected();
    if synced > 0 {
        debug!("Synced role of actor {} into crew of movie {}", actor_id, movie_id);
    }
    Ok(())
}

/// Removes the crew Actor rows behind legacy associations that are going
/// away: those of `actor_id`, or all of the movie's when `None`. The `None`
/// form reads the legacy rows, so it must run before they are deleted.
pub(crate) async fn drop_cast_crew<C>(
    conn: &C,
    tables: &CreditTables,
    movie_id: i64,
    actor_id: Option<i64>,
) -> CatalogResult<u64>
where
    C: ConnectionTrait,
{
    if !tables.crew_mirrors_legacy {
        return Ok(0);
    }
    let delete = Query::delete()
        .from_table(ident(tables.crew))
        .cond_where(cast_crew(tables, movie_id, actor_id))
        .to_owned();
    let removed = conn.execute(build(conn, &delete)).await?.rows_affected();
    if removed > 0 {
        debug!("Dropped {} crew rows of movie {} with their legacy rows", removed, movie_id);
    }
    Ok(removed)
}

async fn delete_where<C>(conn: &C, table: &str, column: &str, value: i64) -> CatalogResult<u64>
where
    C: ConnectionTrait,
{
    let delete = Query::delete()
        .from_table(ident(table))
        .and_where(Expr::col(ident(column)).eq(value))
        .to_owned();
    Ok(conn.execute(build(conn, &delete)).await?.rows_affected())
}

/// Removes a movie's crew and, where mirrored, every legacy association of
/// the movie. A movie without crew is not an error.
pub(crate) async fn delete_crew_for_movie<C>(
    conn: &C,
    tables: &CreditTables,
    movie_id: i64,
) -> CatalogResult<u64>
where
    C: ConnectionTrait,
{
    let mut removed = 0;
    if tables.crew_mirrors_legacy {
        removed += delete_where(conn, tables.movie_actors, "movie_id", movie_id).await?;
    }
    removed += delete_where(conn, tables.crew, "movie_id", movie_id).await?;
    Ok(removed)
}

/// Explicit crew rows plus legacy associations presented as Actor crew,
/// without duplicates. Explicit rows come first, ordered by person; legacy
/// rows follow, ordered by actor.
pub(crate) async fn crew_for_movie<C>(
    conn: &C,
    tables: &CreditTables,
    movie_id: i64,
) -> CatalogResult<Vec<Crew>>
where
    C: ConnectionTrait,
{
    let select = crew::select_crew(tables)
        .and_where(qcol("c", "movie_id").eq(movie_id))
        .order_by((ident("c"), ident("person_id")), Order::Asc)
        .to_owned();
    let rows = conn.query_all(build(conn, &select)).await?;
    let mut members = rows
        .iter()
        .map(crew::map_row)
        .collect::<CatalogResult<Vec<_>>>()?;

    if !tables.crew_mirrors_legacy {
        return Ok(members);
    }

    let acting: Vec<&Crew> = members
        .iter()
        .filter(|c| c.crew_type == CrewType::Actor)
        .collect();
    let covered_actors: HashSet<i64> = acting.iter().filter_map(|c| c.legacy_actor_id).collect();
    let covered_people: HashSet<i64> = acting.iter().filter_map(|c| c.person_id).collect();

    let mut select = Query::select();
    project(
        &mut select,
        &[
            ("ma", "movie_id", "movie_id"),
            ("ma", "actor_id", "actor_id"),
            ("p", "id", "person_id"),
            ("ma", "role", "role"),
            ("ma", "created_at", "created_at"),
            ("ma", "updated_at", "updated_at"),
            ("ma", "version", "version"),
        ],
    );
    select
        .expr_as(
            Func::coalesce([qcol("p", "name").into(), qcol("a", "name").into()]),
            ident("person_name"),
        )
        .from_as(ident(tables.movie_actors), ident("ma"))
        .join_as(
            JoinType::InnerJoin,
            ident(tables.actors),
            ident("a"),
            qcol("a", "id").equals((ident("ma"), ident("actor_id"))),
        )
        .join_as(
            JoinType::LeftJoin,
            ident(tables.people),
            ident("p"),
            qcol("p", "old_actor_id").equals((ident("ma"), ident("actor_id"))),
        )
        .and_where(qcol("ma", "movie_id").eq(movie_id))
        .order_by((ident("ma"), ident("actor_id")), Order::Asc);
    let legacy = conn.query_all(build(conn, &select)).await?;

    let mut synthesized = Vec::new();
    for row in &legacy {
        let actor_id: i64 = row.try_get("", "actor_id")?;
        let person_id: Option<i64> = row.try_get("", "person_id")?;
        if covered_actors.contains(&actor_id)
            || person_id.is_some_and(|p| covered_people.contains(&p))
        {
            continue;
        }
        synthesized.push(Crew {
            movie_id: row.try_get("", "movie_id")?,
            person_id,
            person_name: row.try_get("", "person_name")?,
            crew_type: CrewType::Actor,
            role: Some(row.try_get("", "role")?),
            legacy_actor_id: Some(actor_id),
            created_at: row.try_get("", "created_at")?,
            updated_at: row.try_get("", "updated_at")?,
            version: row.try_get("", "version")?,
        });
    }

    debug!(
        "Crew for movie {}: {} explicit, {} from legacy associations",
        movie_id,
        members.len(),
        synthesized.len()
    );
    members.extend(synthesized);
    Ok(members)
}
