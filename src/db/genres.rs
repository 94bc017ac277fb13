//! Reconciles the legacy single `genre` column with the `genres` list column.

/// Merged genre set for a row: the list when it has entries, otherwise the
/// legacy value as a singleton, otherwise nothing.
#[must_use]
pub fn merge_genres(legacy: Option<&str>, list: Vec<String>) -> Vec<String> {
    if !list.is_empty() {
        return list;
    }
    match legacy {
        Some(genre) if !genre.is_empty() => vec![genre.to_string()],
        _ => Vec::new(),
    }
}

/// Value written to the legacy column so that single-genre readers keep
/// seeing the primary genre.
#[must_use]
pub fn legacy_genre(genres: &[String]) -> Option<String> {
    genres.first().cloned()
}

/// Decodes the list column. `NULL`, empty text and `[]` all mean no genres.
pub fn decode_genres(raw: Option<&str>) -> Result<Vec<String>, serde_json::Error> {
    match raw {
        None => Ok(Vec::new()),
        Some(text) if text.trim().is_empty() => Ok(Vec::new()),
        Some(text) => serde_json::from_str(text),
    }
}

pub fn encode_genres(genres: &[String]) -> Result<String, serde_json::Error> {
    serde_json::to_string(genres)
}
