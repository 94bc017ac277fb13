//! `SeaORM` implementation of [`MovieService`].

use sea_orm::TransactionTrait;
use tracing::{info, warn};

use crate::db::Store;
use crate::db::layout::Layout;
use crate::db::relations;
use crate::db::repositories::{crew, movie, movie_actor};
use crate::domain::ApiVersion;
use crate::error::{CatalogError, CatalogResult};
use crate::models::{Crew, Movie, MovieActor};
use crate::services::movie_service::{
    Associations, MovieDetails, MovieInput, MovieService, apply_input, first_director,
    validate_payload,
};

pub struct SeaOrmMovieService {
    store: Store,
    version: ApiVersion,
    layout: Layout,
}

impl SeaOrmMovieService {
    #[must_use]
    pub fn new(store: Store, version: ApiVersion) -> Self {
        let layout = store.layout(version);
        Self {
            store,
            version,
            layout,
        }
    }

    /// The director column of a derived-director layout follows the first
    /// Director crew member. Without one the stored value stays.
    async fn derive_director(&self, movie: &mut Movie, assoc: &Associations) -> CatalogResult<()> {
        if !self.layout.derives_director() {
            return Ok(());
        }
        if let Some(person_id) = assoc.crew.as_deref().and_then(first_director) {
            let person = self.store.people().get(person_id).await?;
            movie.director = Some(person.name);
        }
        Ok(())
    }

    /// Writes the association lists of `assoc` for `movie_id`, replacing the
    /// stored ones when `replace` is set.
    async fn write_associations<C>(
        &self,
        conn: &C,
        movie_id: i64,
        assoc: Associations,
        replace: bool,
    ) -> CatalogResult<(Vec<MovieActor>, Vec<Crew>)>
    where
        C: sea_orm::ConnectionTrait,
    {
        let credits = self.layout.credits;
        let mut actors = Vec::new();
        let mut members = Vec::new();

        if let Some(cast) = assoc.cast {
            if replace {
                movie_actor::delete_for_movie_with(conn, &credits, movie_id).await?;
            }
            for entry in cast {
                let mut movie_actor = MovieActor {
                    movie_id,
                    actor_id: entry.actor_id,
                    role: entry.role,
                    ..MovieActor::default()
                };
                movie_actor::insert_with(conn, &credits, &mut movie_actor).await?;
                actors.push(movie_actor);
            }
        }

        if let Some(drafted) = assoc.crew {
            if replace {
                relations::delete_crew_for_movie(conn, &credits, movie_id).await?;
            }
            for mut member in drafted {
                member.movie_id = movie_id;
                crew::insert_with(conn, &credits, &mut member).await?;
                members.push(member);
            }
        }

        Ok((actors, members))
    }

    async fn details(&self, movie: Movie) -> CatalogResult<MovieDetails> {
        let mut details = MovieDetails {
            movie,
            ..MovieDetails::default()
        };
        if self.version.has_actors() {
            details.actors = self.actors(details.movie.id).await?;
        }
        if self.version.has_people() {
            details.crew = self.crew(details.movie.id).await?;
        }
        Ok(details)
    }
}

#[async_trait::async_trait]
impl MovieService for SeaOrmMovieService {
    fn version(&self) -> ApiVersion {
        self.version
    }

    async fn list(&self) -> CatalogResult<Vec<Movie>> {
        self.store.movies(self.version).get_all().await
    }

    async fn get(&self, id: i64) -> CatalogResult<MovieDetails> {
        let movie = self.store.movies(self.version).get(id).await?;
        self.details(movie).await
    }

    async fn create(&self, input: MovieInput) -> CatalogResult<MovieDetails> {
        let mut movie = Movie::default();
        apply_input(&mut movie, &input, self.version);
        let assoc = validate_payload(&movie, &input, self.version)?;
        self.derive_director(&mut movie, &assoc).await?;

        let (movie, actors, crew) = self
            .store
            .guard()
            .run("movies.create", async {
                let txn = self.store.conn.begin().await?;
                movie::insert_with(&txn, &self.layout.movies, &mut movie).await?;
                let (actors, crew) = self.write_associations(&txn, movie.id, assoc, false).await?;
                txn.commit().await?;
                Ok((movie, actors, crew))
            })
            .await?;

        info!(
            "Created movie {} through {}/{}",
            movie.id,
            self.store.strategy(),
            self.version
        );

        if self.version.has_people() {
            // Crew reads include legacy associations; re-read for the full view.
            return self.details(movie).await;
        }
        Ok(MovieDetails {
            movie,
            actors,
            crew,
        })
    }

    async fn update(&self, id: i64, input: MovieInput) -> CatalogResult<MovieDetails> {
        let repo = self.store.movies(self.version);
        let mut movie = repo.get(id).await?;
        let expected = input.version.unwrap_or(movie.version);

        apply_input(&mut movie, &input, self.version);
        movie.version = expected;
        let assoc = validate_payload(&movie, &input, self.version)?;
        self.derive_director(&mut movie, &assoc).await?;

        let result = self
            .store
            .guard()
            .run("movies.update", async {
                let txn = self.store.conn.begin().await?;
                movie::update_with(&txn, &self.layout.movies, &mut movie).await?;
                self.write_associations(&txn, movie.id, assoc, true).await?;
                txn.commit().await?;
                Ok(movie)
            })
            .await;

        match result {
            Ok(movie) => self.details(movie).await,
            Err(CatalogError::EditConflict) => {
                warn!(
                    "Edit conflict on movie {} through {}/{} (expected version {})",
                    id,
                    self.store.strategy(),
                    self.version,
                    expected
                );
                Err(CatalogError::EditConflict)
            }
            Err(e) => Err(e),
        }
    }

    async fn delete(&self, id: i64) -> CatalogResult<()> {
        self.store.movies(self.version).delete(id).await
    }

    async fn actors(&self, id: i64) -> CatalogResult<Vec<MovieActor>> {
        self.store.movie_actors().get_for_movie(id).await
    }

    async fn crew(&self, id: i64) -> CatalogResult<Vec<Crew>> {
        self.store.crew().get_for_movie(id).await
    }
}
