use serde::{Deserialize, Serialize};

use crate::domain::CrewType;

/// Legacy movie/actor association.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieActor {
    pub movie_id: i64,
    pub actor_id: i64,
    pub actor_name: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
    pub version: i32,
}

/// Movie/person association with a crew role.
///
/// Rows synthesized from legacy movie/actor associations have no explicit
/// crew row behind them: `person_id` is absent when the actor was never
/// linked to a person, and `legacy_actor_id` names the actor they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crew {
    pub movie_id: i64,
    pub person_id: Option<i64>,
    pub person_name: String,
    pub crew_type: CrewType,
    pub role: Option<String>,
    pub legacy_actor_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
    pub version: i32,
}

/// Actor entry of a v4 movie payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastDraft {
    #[serde(default)]
    pub actor_id: i64,
    #[serde(default)]
    pub role: String,
}

/// Crew entry of a v5 movie payload. `crew_type` stays a string until it
/// has passed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewDraft {
    #[serde(default)]
    pub person_id: i64,
    #[serde(default)]
    pub crew_type: String,
    #[serde(default)]
    pub role: Option<String>,
}
