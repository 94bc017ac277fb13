//! Attribute-level rules shared by every strategy.
//!
//! Validation never touches storage. A non-empty error map means the write
//! must not be attempted.

use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::domain::{ApiVersion, CrewType};
use crate::error::CatalogError;
use crate::models::{Actor, CastDraft, CrewDraft, Movie, Person};

pub const EARLIEST_RELEASE_YEAR: i32 = 1888;
pub const MAX_GENRES: usize = 5;

/// Field name to message, ordered by field for stable responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, String>);

impl ValidationErrors {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|(k, v)| format!("{k} {v}"))
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&joined)
    }
}

/// Collects rule violations. The first message recorded for a field wins.
#[derive(Debug, Default)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, key: &str, message: &str) {
        self.errors
            .entry(key.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn check(&mut self, ok: bool, key: &str, message: &str) {
        if !ok {
            self.add_error(key, message);
        }
    }

    #[must_use]
    pub fn into_errors(self) -> ValidationErrors {
        ValidationErrors(self.errors)
    }

    pub fn finish(self) -> Result<(), CatalogError> {
        if self.valid() {
            Ok(())
        } else {
            Err(CatalogError::ValidationFailed(self.into_errors()))
        }
    }
}

#[must_use]
pub fn permitted_value(value: &str, permitted: &[&str]) -> bool {
    permitted.contains(&value)
}

#[must_use]
pub fn unique<T: std::hash::Hash + Eq>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|v| seen.insert(v))
}

/// Movie rules for the shape spoken by `version`.
pub fn validate_movie(v: &mut Validator, movie: &Movie, version: ApiVersion) {
    v.check(!movie.title.is_empty(), "title", "must be provided");
    v.check(
        movie.title.len() <= 500,
        "title",
        "must not be more than 500 bytes long",
    );

    v.check(movie.year != 0, "year", "must be provided");
    v.check(
        movie.year >= EARLIEST_RELEASE_YEAR,
        "year",
        "must be greater than 1888",
    );
    v.check(
        movie.year <= Utc::now().year(),
        "year",
        "must not be in the future",
    );

    if version.has_genre_list() {
        v.check(!movie.genres.is_empty(), "genres", "must be provided");
        v.check(
            !movie.genres.is_empty(),
            "genres",
            "must contain at least 1 genre",
        );
        v.check(
            movie.genres.len() <= MAX_GENRES,
            "genres",
            "must not contain more than 5 genres",
        );
        v.check(
            unique(&movie.genres),
            "genres",
            "must not contain duplicate values",
        );
    } else {
        let genre = movie.genres.first().map_or("", String::as_str);
        v.check(!genre.is_empty(), "genre", "must be provided");
        v.check(
            genre.len() <= 50,
            "genre",
            "must not be more than 50 bytes long",
        );
    }

    if version.has_director() {
        let director = movie.director.as_deref().unwrap_or_default();
        v.check(!director.is_empty(), "director", "must be provided");
        v.check(
            director.len() <= 100,
            "director",
            "must not be more than 100 bytes long",
        );
    }

    if version.has_details() {
        let runtime = movie.runtime.unwrap_or_default();
        v.check(runtime != 0, "runtime", "must be provided");
        v.check(runtime > 0, "runtime", "must be a positive integer");

        let language = movie.language.as_deref().unwrap_or_default();
        v.check(!language.is_empty(), "language", "must be provided");
        v.check(
            language.len() <= 50,
            "language",
            "must not be more than 50 bytes long",
        );
    }
}

fn validate_name_and_birthdate(v: &mut Validator, name: &str, birthdate: Option<NaiveDate>) {
    v.check(!name.is_empty(), "name", "must be provided");
    v.check(
        name.len() <= 500,
        "name",
        "must not be more than 500 bytes long",
    );

    if let Some(birthdate) = birthdate {
        v.check(
            birthdate < Utc::now().date_naive(),
            "birthdate",
            "must not be in the future",
        );
    }
}

pub fn validate_actor(v: &mut Validator, actor: &Actor) {
    validate_name_and_birthdate(v, &actor.name, actor.birthdate);
}

pub fn validate_person(v: &mut Validator, person: &Person) {
    validate_name_and_birthdate(v, &person.name, person.birthdate);
}

/// One entry of a movie's cast list. The movie id is assigned by the write
/// that carries the list.
pub fn validate_cast(v: &mut Validator, cast: &CastDraft) {
    v.check(cast.actor_id > 0, "actor_id", "must be a positive integer");
    v.check(!cast.role.is_empty(), "role", "must be provided");
    v.check(
        cast.role.len() <= 500,
        "role",
        "must not be more than 500 bytes long",
    );
}

pub fn validate_crew(v: &mut Validator, crew: &CrewDraft) {
    v.check(crew.person_id > 0, "person_id", "must be a positive integer");

    v.check(!crew.crew_type.is_empty(), "crew_type", "must be provided");
    v.check(
        permitted_value(&crew.crew_type, &CrewType::NAMES),
        "crew_type",
        "must be either 'Actor', 'Director', or 'Producer'",
    );

    if crew.crew_type == CrewType::Actor.as_str() {
        let role = crew.role.as_deref().unwrap_or_default();
        v.check(
            !role.is_empty(),
            "role",
            "must be provided if crew_type is 'Actor'",
        );
        v.check(
            role.len() <= 500,
            "role",
            "must not be more than 500 bytes long",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(version: ApiVersion) -> Movie {
        Movie {
            title: "Dune".to_string(),
            year: 1984,
            genres: if version.has_genre_list() {
                vec!["Sci-Fi".to_string(), "Adventure".to_string()]
            } else {
                vec!["Sci-Fi".to_string()]
            },
            director: version.has_director().then(|| "David Lynch".to_string()),
            runtime: version.has_details().then_some(137),
            language: version.has_details().then(|| "English".to_string()),
            ..Movie::default()
        }
    }

    fn errors_for(movie: &Movie, version: ApiVersion) -> ValidationErrors {
        let mut v = Validator::new();
        validate_movie(&mut v, movie, version);
        v.into_errors()
    }

    #[test]
    fn test_valid_movie_for_every_version() {
        for version in ApiVersion::ALL {
            let errors = errors_for(&movie(version), version);
            assert!(errors.is_empty(), "{version}: {errors}");
        }
    }

    #[test]
    fn test_first_message_per_field_wins() {
        let mut v = Validator::new();
        v.check(false, "title", "must be provided");
        v.check(false, "title", "must not be more than 500 bytes long");
        let errors = v.into_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("title"), Some("must be provided"));
    }

    #[test]
    fn test_year_bounds() {
        let mut m = movie(ApiVersion::V1);
        m.year = 0;
        assert_eq!(errors_for(&m, ApiVersion::V1).get("year"), Some("must be provided"));

        m.year = 1800;
        assert_eq!(
            errors_for(&m, ApiVersion::V1).get("year"),
            Some("must be greater than 1888")
        );

        m.year = 9999;
        assert_eq!(
            errors_for(&m, ApiVersion::V1).get("year"),
            Some("must not be in the future")
        );
    }

    #[test]
    fn test_genre_list_rules() {
        let mut m = movie(ApiVersion::V3);
        m.genres = vec!["Drama".to_string(), "Drama".to_string()];
        assert_eq!(
            errors_for(&m, ApiVersion::V3).get("genres"),
            Some("must not contain duplicate values")
        );

        m.genres = (0..6).map(|i| format!("g{i}")).collect();
        assert_eq!(
            errors_for(&m, ApiVersion::V3).get("genres"),
            Some("must not contain more than 5 genres")
        );

        m.genres.clear();
        assert_eq!(
            errors_for(&m, ApiVersion::V3).get("genres"),
            Some("must be provided")
        );
    }

    #[test]
    fn test_legacy_genre_required_before_v3() {
        let mut m = movie(ApiVersion::V2);
        m.genres = vec![String::new()];
        let errors = errors_for(&m, ApiVersion::V2);
        assert_eq!(errors.get("genre"), Some("must be provided"));
        assert!(errors.get("genres").is_none());
    }

    #[test]
    fn test_director_only_checked_where_writable() {
        let mut m = movie(ApiVersion::V4);
        m.director = None;
        assert_eq!(
            errors_for(&m, ApiVersion::V4).get("director"),
            Some("must be provided")
        );
        assert!(errors_for(&m, ApiVersion::V5).get("director").is_none());
    }

    #[test]
    fn test_runtime_must_be_positive() {
        let mut m = movie(ApiVersion::V2);
        m.runtime = Some(-3);
        assert_eq!(
            errors_for(&m, ApiVersion::V2).get("runtime"),
            Some("must be a positive integer")
        );
    }

    #[test]
    fn test_person_birthdate_in_future() {
        let person = Person {
            name: "Frank Herbert".to_string(),
            birthdate: NaiveDate::from_ymd_opt(3000, 1, 1),
            ..Person::default()
        };
        let mut v = Validator::new();
        validate_person(&mut v, &person);
        assert_eq!(
            v.into_errors().get("birthdate"),
            Some("must not be in the future")
        );
    }

    #[test]
    fn test_crew_rules() {
        let mut draft = CrewDraft {
            person_id: 1,
            crew_type: "Actor".to_string(),
            role: None,
        };
        let mut v = Validator::new();
        validate_crew(&mut v, &draft);
        assert_eq!(
            v.into_errors().get("role"),
            Some("must be provided if crew_type is 'Actor'")
        );

        draft.crew_type = "Gaffer".to_string();
        let mut v = Validator::new();
        validate_crew(&mut v, &draft);
        assert!(v.into_errors().get("crew_type").is_some());

        draft.crew_type = "Director".to_string();
        let mut v = Validator::new();
        validate_crew(&mut v, &draft);
        assert!(v.valid());
    }

    #[test]
    fn test_cast_rules() {
        let mut cast = CastDraft {
            actor_id: 0,
            role: String::new(),
        };
        let mut v = Validator::new();
        validate_cast(&mut v, &cast);
        let errors = v.into_errors();
        assert_eq!(errors.get("actor_id"), Some("must be a positive integer"));
        assert_eq!(errors.get("role"), Some("must be provided"));

        cast.actor_id = 4;
        cast.role = "x".repeat(501);
        let mut v = Validator::new();
        validate_cast(&mut v, &cast);
        let errors = v.into_errors();
        assert!(errors.get("actor_id").is_none());
        assert_eq!(errors.get("role"), Some("must not be more than 500 bytes long"));

        cast.role = "Neil McCauley".to_string();
        let mut v = Validator::new();
        validate_cast(&mut v, &cast);
        assert!(v.valid());
    }
}
