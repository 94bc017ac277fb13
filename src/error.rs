use thiserror::Error;

use crate::domain::validation::ValidationErrors;

/// Failure kinds surfaced by repositories and services.
///
/// Only `RecordNotFound` and `EditConflict` are classified by the data layer.
/// Everything else the store reports passes through as `Storage` unchanged,
/// including timeouts and pool exhaustion.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("record not found")]
    RecordNotFound,

    #[error("edit conflict")]
    EditConflict,

    #[error("validation failed: {0}")]
    ValidationFailed(ValidationErrors),

    #[error(transparent)]
    Storage(#[from] sea_orm::DbErr),
}

impl CatalogError {
    pub(crate) fn timed_out(operation: &str, budget: std::time::Duration) -> Self {
        Self::Storage(sea_orm::DbErr::Custom(format!(
            "{operation} exceeded its {}ms budget",
            budget.as_millis()
        )))
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
