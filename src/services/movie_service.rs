//! Movie operations for one `(strategy, version)` pair.
//!
//! A service validates the version-shaped payload, resolves it onto the
//! logical [`Movie`] and runs the movie write plus any association writes as
//! one unit of work.

use serde::Deserialize;

use crate::domain::validation::{Validator, unique, validate_cast, validate_crew, validate_movie};
use crate::domain::{ApiVersion, CrewType};
use crate::error::CatalogResult;
use crate::models::{CastDraft, Crew, CrewDraft, Movie, MovieActor};

/// Movie payload of every version. Fields a version does not speak are
/// ignored; absent fields keep their stored value on update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MovieInput {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub genres: Option<Vec<String>>,
    pub director: Option<String>,
    pub runtime: Option<i32>,
    pub language: Option<String>,
    pub actors: Option<Vec<CastDraft>>,
    pub crew: Option<Vec<CrewDraft>>,
    /// Version the client last saw. Defaults to the stored one.
    pub version: Option<i32>,
}

/// A movie with the associations its version exposes.
#[derive(Debug, Clone, Default)]
pub struct MovieDetails {
    pub movie: Movie,
    pub actors: Vec<MovieActor>,
    pub crew: Vec<Crew>,
}

#[async_trait::async_trait]
pub trait MovieService: Send + Sync {
    fn version(&self) -> ApiVersion;

    async fn list(&self) -> CatalogResult<Vec<Movie>>;

    async fn get(&self, id: i64) -> CatalogResult<MovieDetails>;

    async fn create(&self, input: MovieInput) -> CatalogResult<MovieDetails>;

    /// Partial update guarded by the expected version.
    async fn update(&self, id: i64, input: MovieInput) -> CatalogResult<MovieDetails>;

    async fn delete(&self, id: i64) -> CatalogResult<()>;

    async fn actors(&self, id: i64) -> CatalogResult<Vec<MovieActor>>;

    async fn crew(&self, id: i64) -> CatalogResult<Vec<Crew>>;
}

/// Copies the fields `version` speaks from `input` onto `movie`.
pub fn apply_input(movie: &mut Movie, input: &MovieInput, version: ApiVersion) {
    if let Some(title) = &input.title {
        movie.title.clone_from(title);
    }
    if let Some(year) = input.year {
        movie.year = year;
    }

    if version.has_genre_list() {
        if let Some(genres) = &input.genres {
            movie.genres.clone_from(genres);
        }
    } else if let Some(genre) = &input.genre {
        movie.genres = vec![genre.clone()];
    }

    if version.has_director() {
        if let Some(director) = &input.director {
            movie.director = Some(director.clone());
        }
    }

    if version.has_details() {
        if let Some(runtime) = input.runtime {
            movie.runtime = Some(runtime);
        }
        if let Some(language) = &input.language {
            movie.language = Some(language.clone());
        }
    }
}

/// Validated association lists of a payload. `None` leaves the stored
/// associations alone.
#[derive(Debug, Default)]
pub struct Associations {
    pub cast: Option<Vec<CastDraft>>,
    pub crew: Option<Vec<Crew>>,
}

/// Validates `movie` and the association lists of `input` that `version`
/// accepts, and resolves crew drafts into typed crew members.
pub fn validate_payload(
    movie: &Movie,
    input: &MovieInput,
    version: ApiVersion,
) -> CatalogResult<Associations> {
    let mut v = Validator::new();
    validate_movie(&mut v, movie, version);

    let cast = if version.has_actors() {
        input.actors.clone()
    } else {
        None
    };
    if let Some(cast) = &cast {
        for entry in cast {
            validate_cast(&mut v, entry);
        }
        let ids: Vec<i64> = cast.iter().map(|c| c.actor_id).collect();
        v.check(unique(&ids), "actors", "must not contain duplicate actors");
    }

    let mut crew = None;
    if version.has_people() {
        if let Some(drafts) = &input.crew {
            let mut members = Vec::with_capacity(drafts.len());
            for draft in drafts {
                validate_crew(&mut v, draft);
                if let Ok(crew_type) = draft.crew_type.parse::<CrewType>() {
                    members.push(Crew {
                        movie_id: movie.id,
                        person_id: Some(draft.person_id),
                        person_name: String::new(),
                        crew_type,
                        role: draft.role.clone().filter(|r| !r.is_empty()),
                        legacy_actor_id: None,
                        created_at: String::new(),
                        updated_at: String::new(),
                        version: 1,
                    });
                }
            }
            let ids: Vec<i64> = drafts.iter().map(|d| d.person_id).collect();
            v.check(unique(&ids), "crew", "must not contain the same person twice");
            crew = Some(members);
        }
    }

    v.finish()?;
    Ok(Associations { cast, crew })
}

/// First director of a crew list.
#[must_use]
pub fn first_director(crew: &[Crew]) -> Option<i64> {
    crew.iter()
        .find(|c| c.crew_type == CrewType::Director)
        .and_then(|c| c.person_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;

    fn v1_input() -> MovieInput {
        MovieInput {
            title: Some("Moana".to_string()),
            year: Some(2016),
            genre: Some("Animation".to_string()),
            genres: Some(vec!["ignored".to_string()]),
            director: Some("ignored".to_string()),
            ..MovieInput::default()
        }
    }

    #[test]
    fn test_apply_input_uses_version_shape() {
        let mut movie = Movie::default();
        apply_input(&mut movie, &v1_input(), ApiVersion::V1);
        assert_eq!(movie.title, "Moana");
        assert_eq!(movie.genres, vec!["Animation".to_string()]);
        assert_eq!(movie.director, None);
    }

    #[test]
    fn test_apply_input_keeps_absent_fields() {
        let mut movie = Movie {
            title: "Black Panther".to_string(),
            year: 2018,
            genres: vec!["Action".to_string(), "Adventure".to_string()],
            runtime: Some(134),
            language: Some("English".to_string()),
            director: Some("Ryan Coogler".to_string()),
            ..Movie::default()
        };
        let input = MovieInput {
            runtime: Some(135),
            ..MovieInput::default()
        };
        apply_input(&mut movie, &input, ApiVersion::V3);
        assert_eq!(movie.runtime, Some(135));
        assert_eq!(movie.genres.len(), 2);
        assert_eq!(movie.director.as_deref(), Some("Ryan Coogler"));
    }

    #[test]
    fn test_validate_payload_reports_field_errors() {
        let movie = Movie {
            title: String::new(),
            year: 2016,
            genres: vec!["Animation".to_string()],
            ..Movie::default()
        };
        let err = validate_payload(&movie, &MovieInput::default(), ApiVersion::V1).unwrap_err();
        let CatalogError::ValidationFailed(errors) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.get("title"), Some("must be provided"));
        assert!(errors.get("genre").is_none());
    }

    #[test]
    fn test_validate_payload_resolves_crew() {
        let movie = Movie {
            title: "Dune".to_string(),
            year: 2021,
            genres: vec!["Sci-Fi".to_string()],
            runtime: Some(155),
            language: Some("English".to_string()),
            ..Movie::default()
        };
        let input = MovieInput {
            crew: Some(vec![
                CrewDraft {
                    person_id: 3,
                    crew_type: "Actor".to_string(),
                    role: Some("Paul Atreides".to_string()),
                },
                CrewDraft {
                    person_id: 7,
                    crew_type: "Director".to_string(),
                    role: None,
                },
            ]),
            ..MovieInput::default()
        };
        let assoc = validate_payload(&movie, &input, ApiVersion::V5).unwrap();
        let crew = assoc.crew.unwrap();
        assert_eq!(crew.len(), 2);
        assert_eq!(first_director(&crew), Some(7));
        assert!(assoc.cast.is_none());
    }

    #[test]
    fn test_validate_payload_rejects_duplicate_cast() {
        let movie = Movie {
            title: "Heat".to_string(),
            year: 1995,
            genres: vec!["Crime".to_string()],
            director: Some("Michael Mann".to_string()),
            runtime: Some(170),
            language: Some("English".to_string()),
            ..Movie::default()
        };
        let input = MovieInput {
            actors: Some(vec![
                CastDraft {
                    actor_id: 1,
                    role: "McCauley".to_string(),
                },
                CastDraft {
                    actor_id: 1,
                    role: "Hanna".to_string(),
                },
            ]),
            ..MovieInput::default()
        };
        let err = validate_payload(&movie, &input, ApiVersion::V4).unwrap_err();
        let CatalogError::ValidationFailed(errors) = err else {
            panic!("expected validation failure");
        };
        assert_eq!(errors.get("actors"), Some("must not contain duplicate actors"));
    }
}
