use serde::{Deserialize, Serialize};

use crate::domain::ApiVersion;
use crate::domain::validation::ValidationErrors;
use crate::models::{Actor, Crew, Movie, MovieActor, Person};
use crate::services::MovieDetails;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<ValidationErrors>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            fields: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            fields: None,
        }
    }

    pub fn invalid(message: impl Into<String>, fields: ValidationErrors) -> Self {
        Self {
            fields: Some(fields),
            ..Self::error(message)
        }
    }
}

/// Path prefix shared by every versioned route.
#[derive(Debug, Deserialize)]
pub struct ScopePath {
    pub strategy: String,
    pub version: String,
}

#[derive(Debug, Deserialize)]
pub struct ScopedIdPath {
    pub strategy: String,
    pub version: String,
    pub id: String,
}

/// Movie in the shape of one API version.
#[derive(Debug, Serialize)]
pub struct MovieDto {
    pub id: i64,
    pub title: String,
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actors: Option<Vec<MovieActorDto>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crew: Option<Vec<CrewDto>>,
    pub version: i32,
}

impl MovieDto {
    #[must_use]
    pub fn from_movie(movie: Movie, version: ApiVersion) -> Self {
        let (genre, genres) = if version.has_genre_list() {
            (None, Some(movie.genres))
        } else {
            (movie.genres.into_iter().next(), None)
        };
        let details = version.has_details();
        Self {
            id: movie.id,
            title: movie.title,
            year: movie.year,
            genre,
            genres,
            director: movie.director.filter(|_| version.has_director()),
            runtime: movie.runtime.filter(|_| details),
            language: movie.language.filter(|_| details),
            actors: None,
            crew: None,
            version: movie.version,
        }
    }

    #[must_use]
    pub fn from_details(details: MovieDetails, version: ApiVersion) -> Self {
        let mut dto = Self::from_movie(details.movie, version);
        if version.has_actors() {
            dto.actors = Some(details.actors.into_iter().map(MovieActorDto::from).collect());
        }
        if version.has_people() {
            dto.crew = Some(details.crew.into_iter().map(CrewDto::from).collect());
        }
        dto
    }
}

#[derive(Debug, Serialize)]
pub struct MovieActorDto {
    pub actor_id: i64,
    pub actor_name: String,
    pub role: String,
}

impl From<MovieActor> for MovieActorDto {
    fn from(movie_actor: MovieActor) -> Self {
        Self {
            actor_id: movie_actor.actor_id,
            actor_name: movie_actor.actor_name,
            role: movie_actor.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CrewDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person_id: Option<i64>,
    pub person_name: String,
    pub crew_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl From<Crew> for CrewDto {
    fn from(crew: Crew) -> Self {
        Self {
            person_id: crew.person_id,
            person_name: crew.person_name,
            crew_type: crew.crew_type.to_string(),
            role: crew.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActorDto {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthdate: Option<chrono::NaiveDate>,
    pub version: i32,
}

impl From<Actor> for ActorDto {
    fn from(actor: Actor) -> Self {
        Self {
            id: actor.id,
            name: actor.name,
            birthdate: actor.birthdate,
            version: actor.version,
        }
    }
}

impl From<Person> for ActorDto {
    fn from(person: Person) -> Self {
        Self {
            id: person.id,
            name: person.name,
            birthdate: person.birthdate,
            version: person.version,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
    pub uptime_seconds: u64,
    pub strategies: Vec<&'static str>,
}
