use axum::{
    Router,
    http::HeaderValue,
    routing::get,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::domain::{ApiVersion, Strategy};
use crate::state::SharedState;

mod credits;
mod error;
mod movies;
mod system;
mod types;

pub use error::ApiError;
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }
}

pub async fn create_app_state_from_config(config: Config) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(Arc::new(AppState { shared }))
}

/// Unknown strategies and versions are plain 404s, like any unknown route.
pub(crate) fn parse_scope(strategy: &str, version: &str) -> Result<(Strategy, ApiVersion), ApiError> {
    let strategy = strategy.parse::<Strategy>().map_err(|_| ApiError::not_found())?;
    let version = version.parse::<ApiVersion>().map_err(|_| ApiError::not_found())?;
    Ok((strategy, version))
}

pub(crate) fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id >= 1)
        .ok_or_else(ApiError::not_found)
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .route("/healthcheck", get(system::healthcheck))
        .merge(versioned_routes())
        .fallback(fallback)
        .with_state(state)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

fn versioned_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/{strategy}/{version}/movies",
            get(movies::list_movies).post(movies::create_movie),
        )
        .route(
            "/{strategy}/{version}/movies/{id}",
            get(movies::get_movie)
                .patch(movies::update_movie)
                .delete(movies::delete_movie),
        )
        .route(
            "/{strategy}/{version}/movies/{id}/actors",
            get(movies::list_movie_actors),
        )
        .route(
            "/{strategy}/{version}/movies/{id}/crew",
            get(movies::list_movie_crew),
        )
        .route(
            "/{strategy}/{version}/actors",
            get(credits::list_actors).post(credits::create_actor),
        )
        .route(
            "/{strategy}/{version}/actors/{id}",
            get(credits::get_actor)
                .patch(credits::update_actor)
                .delete(credits::delete_actor),
        )
        .route(
            "/{strategy}/{version}/people",
            get(credits::list_people).post(credits::create_person),
        )
        .route(
            "/{strategy}/{version}/people/{id}",
            get(credits::get_person)
                .patch(credits::update_person)
                .delete(credits::delete_person),
        )
}

async fn fallback() -> ApiError {
    ApiError::not_found()
}
