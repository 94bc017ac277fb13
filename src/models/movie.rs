use serde::{Deserialize, Serialize};

/// Logical movie, independent of the physical layout that stores it.
///
/// `genres` is always the merged set; for layouts that only know the legacy
/// scalar it holds at most one entry. Server-assigned fields (`id`,
/// timestamps, `version`) are filled in by the repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub created_at: String,
    pub updated_at: String,
    pub title: String,
    pub year: i32,
    pub genres: Vec<String>,
    pub director: Option<String>,
    pub runtime: Option<i32>,
    pub language: Option<String>,
    pub version: i32,
}
