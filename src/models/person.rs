use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Legacy cast member, served through v4 and kept alive as the shadow of a
/// [`Person`] from v5 on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub created_at: String,
    pub updated_at: String,
    pub name: String,
    pub birthdate: Option<NaiveDate>,
    pub version: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub created_at: String,
    pub updated_at: String,
    pub name: String,
    pub birthdate: Option<NaiveDate>,
    /// Shadow actor carrying this person's legacy identity.
    pub old_actor_id: Option<i64>,
    pub version: i32,
}
