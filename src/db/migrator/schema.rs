//! Column definitions shared by the per-strategy schemas.

use sea_orm_migration::prelude::*;

use crate::db::layout::CreditTables;

#[derive(DeriveIden, Clone, Copy)]
pub enum Movie {
    Id,
    CreatedAt,
    UpdatedAt,
    Title,
    ReleaseYear,
    Genre,
    Genres,
    Director,
    Runtime,
    Language,
    Version,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum Actor {
    Id,
    CreatedAt,
    UpdatedAt,
    Name,
    Birthdate,
    Version,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum Person {
    Id,
    CreatedAt,
    UpdatedAt,
    Name,
    Birthdate,
    OldActorId,
    Version,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum MovieActor {
    MovieId,
    ActorId,
    Role,
    CreatedAt,
    UpdatedAt,
    Version,
}

#[derive(DeriveIden, Clone, Copy)]
pub enum Crew {
    MovieId,
    PersonId,
    CrewType,
    Role,
    CreatedAt,
    UpdatedAt,
    Version,
}

fn id<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn timestamp<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .text()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

fn version<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col).integer().not_null().default(1).to_owned()
}

fn extension(col: Movie) -> ColumnDef {
    let mut def = ColumnDef::new(col);
    match col {
        Movie::Runtime => def.integer(),
        Movie::Genres => def.text(),
        _ => def.string(),
    };
    def.null().to_owned()
}

fn cascade(name: &str, from: (&str, impl IntoIden), to: (&str, impl IntoIden)) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(Alias::new(from.0), from.1)
        .to(Alias::new(to.0), to.1)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

/// Movie table with the always-present columns plus `extras`.
pub fn movie_table(name: &str, extras: &[Movie]) -> TableCreateStatement {
    let mut table = Table::create();
    table
        .table(Alias::new(name))
        .if_not_exists()
        .col(id(Movie::Id))
        .col(timestamp(Movie::CreatedAt))
        .col(timestamp(Movie::UpdatedAt))
        .col(ColumnDef::new(Movie::Title).string().not_null())
        .col(ColumnDef::new(Movie::ReleaseYear).integer().not_null());
    for col in extras {
        table.col(extension(*col));
    }
    table.col(version(Movie::Version));
    table.to_owned()
}

/// Satellite table keyed by the movie id it extends.
pub fn branch_table(name: &str, movies: &str, extras: &[Movie]) -> TableCreateStatement {
    let mut table = Table::create();
    table
        .table(Alias::new(name))
        .if_not_exists()
        .col(ColumnDef::new(Movie::Id).integer().not_null().primary_key());
    for col in extras {
        table.col(extension(*col));
    }
    table.foreign_key(&mut cascade(
        &format!("fk_{name}_id"),
        (name, Movie::Id),
        (movies, Movie::Id),
    ));
    table.to_owned()
}

/// Actor, person and association tables. `cast_movies` and `crew_movies`
/// are the movie tables the two association tables reference.
pub fn credit_tables(
    tables: &CreditTables,
    cast_movies: &str,
    crew_movies: &str,
) -> Vec<TableCreateStatement> {
    let actors = Table::create()
        .table(Alias::new(tables.actors))
        .if_not_exists()
        .col(id(Actor::Id))
        .col(timestamp(Actor::CreatedAt))
        .col(timestamp(Actor::UpdatedAt))
        .col(ColumnDef::new(Actor::Name).string().not_null())
        .col(ColumnDef::new(Actor::Birthdate).text().null())
        .col(version(Actor::Version))
        .to_owned();

    let people = Table::create()
        .table(Alias::new(tables.people))
        .if_not_exists()
        .col(id(Person::Id))
        .col(timestamp(Person::CreatedAt))
        .col(timestamp(Person::UpdatedAt))
        .col(ColumnDef::new(Person::Name).string().not_null())
        .col(ColumnDef::new(Person::Birthdate).text().null())
        .col(ColumnDef::new(Person::OldActorId).integer().null())
        .col(version(Person::Version))
        .foreign_key(
            ForeignKey::create()
                .name(format!("fk_{}_old_actor_id", tables.people))
                .from(Alias::new(tables.people), Person::OldActorId)
                .to(Alias::new(tables.actors), Actor::Id)
                .on_delete(ForeignKeyAction::SetNull),
        )
        .to_owned();

    let movie_actors = Table::create()
        .table(Alias::new(tables.movie_actors))
        .if_not_exists()
        .col(ColumnDef::new(MovieActor::MovieId).integer().not_null())
        .col(ColumnDef::new(MovieActor::ActorId).integer().not_null())
        .col(ColumnDef::new(MovieActor::Role).string().not_null())
        .col(timestamp(MovieActor::CreatedAt))
        .col(timestamp(MovieActor::UpdatedAt))
        .col(version(MovieActor::Version))
        .primary_key(
            Index::create()
                .col(MovieActor::MovieId)
                .col(MovieActor::ActorId),
        )
        .foreign_key(&mut cascade(
            &format!("fk_{}_movie_id", tables.movie_actors),
            (tables.movie_actors, MovieActor::MovieId),
            (cast_movies, Movie::Id),
        ))
        .foreign_key(&mut cascade(
            &format!("fk_{}_actor_id", tables.movie_actors),
            (tables.movie_actors, MovieActor::ActorId),
            (tables.actors, Actor::Id),
        ))
        .to_owned();

    let crew = Table::create()
        .table(Alias::new(tables.crew))
        .if_not_exists()
        .col(ColumnDef::new(Crew::MovieId).integer().not_null())
        .col(ColumnDef::new(Crew::PersonId).integer().not_null())
        .col(ColumnDef::new(Crew::CrewType).string().not_null())
        .col(ColumnDef::new(Crew::Role).string().null())
        .col(timestamp(Crew::CreatedAt))
        .col(timestamp(Crew::UpdatedAt))
        .col(version(Crew::Version))
        .primary_key(Index::create().col(Crew::MovieId).col(Crew::PersonId))
        .foreign_key(&mut cascade(
            &format!("fk_{}_movie_id", tables.crew),
            (tables.crew, Crew::MovieId),
            (crew_movies, Movie::Id),
        ))
        .foreign_key(&mut cascade(
            &format!("fk_{}_person_id", tables.crew),
            (tables.crew, Crew::PersonId),
            (tables.people, Person::Id),
        ))
        .to_owned();

    vec![actors, people, movie_actors, crew]
}

/// Drop statements for `names`, in the given order.
pub fn drop_tables(names: &[&str]) -> Vec<TableDropStatement> {
    names
        .iter()
        .map(|name| Table::drop().table(Alias::new(*name)).if_exists().to_owned())
        .collect()
}
