use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
};
use std::sync::Arc;

use super::{
    ApiError, ApiResponse, AppState, CrewDto, MovieActorDto, MovieDto, ScopePath, ScopedIdPath,
    parse_id, parse_scope,
};
use crate::domain::ApiVersion;
use crate::services::{MovieInput, MovieService};

fn movie_service(
    state: &AppState,
    strategy: &str,
    version: &str,
) -> Result<(Arc<dyn MovieService>, ApiVersion), ApiError> {
    let (strategy, version) = parse_scope(strategy, version)?;
    let service = state
        .shared
        .movies(strategy, version)
        .cloned()
        .ok_or_else(ApiError::not_found)?;
    Ok((service, version))
}

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ScopePath>,
) -> Result<Json<ApiResponse<Vec<MovieDto>>>, ApiError> {
    let (service, version) = movie_service(&state, &path.strategy, &path.version)?;
    let movies = service.list().await?;
    Ok(Json(ApiResponse::success(
        movies
            .into_iter()
            .map(|m| MovieDto::from_movie(m, version))
            .collect(),
    )))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ScopedIdPath>,
) -> Result<Json<ApiResponse<MovieDto>>, ApiError> {
    let (service, version) = movie_service(&state, &path.strategy, &path.version)?;
    let id = parse_id(&path.id)?;
    let details = service.get(id).await?;
    Ok(Json(ApiResponse::success(MovieDto::from_details(
        details, version,
    ))))
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ScopePath>,
    payload: Result<Json<MovieInput>, JsonRejection>,
) -> Result<(StatusCode, HeaderMap, Json<ApiResponse<MovieDto>>), ApiError> {
    let (service, version) = movie_service(&state, &path.strategy, &path.version)?;
    let Json(input) = payload?;
    let details = service.create(input).await?;

    let mut headers = HeaderMap::new();
    let location = format!(
        "/{}/{}/movies/{}",
        path.strategy, version, details.movie.id
    );
    if let Ok(value) = HeaderValue::from_str(&location) {
        headers.insert(header::LOCATION, value);
    }

    Ok((
        StatusCode::CREATED,
        headers,
        Json(ApiResponse::success(MovieDto::from_details(details, version))),
    ))
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ScopedIdPath>,
    payload: Result<Json<MovieInput>, JsonRejection>,
) -> Result<Json<ApiResponse<MovieDto>>, ApiError> {
    let (service, version) = movie_service(&state, &path.strategy, &path.version)?;
    let id = parse_id(&path.id)?;
    let Json(input) = payload?;
    let details = service.update(id, input).await?;
    Ok(Json(ApiResponse::success(MovieDto::from_details(
        details, version,
    ))))
}

pub async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ScopedIdPath>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let (service, _) = movie_service(&state, &path.strategy, &path.version)?;
    let id = parse_id(&path.id)?;
    service.delete(id).await?;
    Ok(Json(ApiResponse::success(
        "movie successfully deleted".to_string(),
    )))
}

pub async fn list_movie_actors(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ScopedIdPath>,
) -> Result<Json<ApiResponse<Vec<MovieActorDto>>>, ApiError> {
    let (service, version) = movie_service(&state, &path.strategy, &path.version)?;
    if !version.has_actors() {
        return Err(ApiError::not_found());
    }
    let id = parse_id(&path.id)?;
    let actors = service.actors(id).await?;
    Ok(Json(ApiResponse::success(
        actors.into_iter().map(MovieActorDto::from).collect(),
    )))
}

pub async fn list_movie_crew(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ScopedIdPath>,
) -> Result<Json<ApiResponse<Vec<CrewDto>>>, ApiError> {
    let (service, version) = movie_service(&state, &path.strategy, &path.version)?;
    if !version.has_people() {
        return Err(ApiError::not_found());
    }
    let id = parse_id(&path.id)?;
    let crew = service.crew(id).await?;
    Ok(Json(ApiResponse::success(
        crew.into_iter().map(CrewDto::from).collect(),
    )))
}
