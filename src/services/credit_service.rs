//! Actors (v4) and people (v5).

use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::CatalogResult;
use crate::models::{Actor, Person};

/// Actor or person payload. Absent fields keep their stored value on update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PersonInput {
    pub name: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub version: Option<i32>,
}

impl PersonInput {
    /// Applies the payload onto stored `name`/`birthdate` and returns the
    /// version the write must find.
    pub fn apply(&self, name: &mut String, birthdate: &mut Option<NaiveDate>, stored: i32) -> i32 {
        if let Some(new_name) = &self.name {
            name.clone_from(new_name);
        }
        if self.birthdate.is_some() {
            *birthdate = self.birthdate;
        }
        self.version.unwrap_or(stored)
    }
}

#[async_trait::async_trait]
pub trait ActorService: Send + Sync {
    async fn list(&self) -> CatalogResult<Vec<Actor>>;

    async fn get(&self, id: i64) -> CatalogResult<Actor>;

    async fn create(&self, input: PersonInput) -> CatalogResult<Actor>;

    async fn update(&self, id: i64, input: PersonInput) -> CatalogResult<Actor>;

    async fn delete(&self, id: i64) -> CatalogResult<()>;
}

/// People keep a shadow actor for legacy readers; the service never exposes it.
#[async_trait::async_trait]
pub trait PersonService: Send + Sync {
    async fn list(&self) -> CatalogResult<Vec<Person>>;

    async fn get(&self, id: i64) -> CatalogResult<Person>;

    async fn create(&self, input: PersonInput) -> CatalogResult<Person>;

    async fn update(&self, id: i64, input: PersonInput) -> CatalogResult<Person>;

    async fn delete(&self, id: i64) -> CatalogResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_keeps_absent_fields() {
        let mut name = "Zendaya".to_string();
        let mut birthdate = NaiveDate::from_ymd_opt(1996, 9, 1);
        let input = PersonInput {
            name: Some("Zendaya Coleman".to_string()),
            ..PersonInput::default()
        };
        let expected = input.apply(&mut name, &mut birthdate, 4);
        assert_eq!(name, "Zendaya Coleman");
        assert_eq!(birthdate, NaiveDate::from_ymd_opt(1996, 9, 1));
        assert_eq!(expected, 4);
    }

    #[test]
    fn test_apply_prefers_client_version() {
        let mut name = String::new();
        let mut birthdate = None;
        let input: PersonInput =
            serde_json::from_str(r#"{"name":"Timothée Chalamet","birthdate":"1995-12-27","version":2}"#)
                .unwrap();
        assert_eq!(input.apply(&mut name, &mut birthdate, 5), 2);
        assert_eq!(birthdate, NaiveDate::from_ymd_opt(1995, 12, 27));
    }
}
