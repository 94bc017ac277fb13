//! `/actors` (v4) and `/people` (v5) endpoints. Both answer with the same
//! shape; the shadow actor behind a person stays internal.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode, header},
};
use std::sync::Arc;

use super::{
    ActorDto, ApiError, ApiResponse, AppState, ScopePath, ScopedIdPath, parse_id, parse_scope,
};
use crate::services::{ActorService, PersonInput, PersonService};

type Created = (StatusCode, HeaderMap, Json<ApiResponse<ActorDto>>);

fn actor_service(state: &AppState, strategy: &str, version: &str) -> Result<Arc<dyn ActorService>, ApiError> {
    let (strategy, version) = parse_scope(strategy, version)?;
    state
        .shared
        .actors(strategy, version)
        .cloned()
        .ok_or_else(ApiError::not_found)
}

fn person_service(state: &AppState, strategy: &str, version: &str) -> Result<Arc<dyn PersonService>, ApiError> {
    let (strategy, version) = parse_scope(strategy, version)?;
    state
        .shared
        .people(strategy, version)
        .cloned()
        .ok_or_else(ApiError::not_found)
}

fn created(path: &ScopePath, resource: &str, dto: ActorDto) -> Created {
    let mut headers = HeaderMap::new();
    let location = format!("/{}/{}/{}/{}", path.strategy, path.version, resource, dto.id);
    if let Ok(value) = HeaderValue::from_str(&location) {
        headers.insert(header::LOCATION, value);
    }
    (StatusCode::CREATED, headers, Json(ApiResponse::success(dto)))
}

pub async fn list_actors(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ScopePath>,
) -> Result<Json<ApiResponse<Vec<ActorDto>>>, ApiError> {
    let service = actor_service(&state, &path.strategy, &path.version)?;
    let actors = service.list().await?;
    Ok(Json(ApiResponse::success(
        actors.into_iter().map(ActorDto::from).collect(),
    )))
}

pub async fn get_actor(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ScopedIdPath>,
) -> Result<Json<ApiResponse<ActorDto>>, ApiError> {
    let service = actor_service(&state, &path.strategy, &path.version)?;
    let actor = service.get(parse_id(&path.id)?).await?;
    Ok(Json(ApiResponse::success(actor.into())))
}

pub async fn create_actor(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ScopePath>,
    payload: Result<Json<PersonInput>, JsonRejection>,
) -> Result<Created, ApiError> {
    let service = actor_service(&state, &path.strategy, &path.version)?;
    let Json(input) = payload?;
    let actor = service.create(input).await?;
    Ok(created(&path, "actors", actor.into()))
}

pub async fn update_actor(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ScopedIdPath>,
    payload: Result<Json<PersonInput>, JsonRejection>,
) -> Result<Json<ApiResponse<ActorDto>>, ApiError> {
    let service = actor_service(&state, &path.strategy, &path.version)?;
    let id = parse_id(&path.id)?;
    let Json(input) = payload?;
    let actor = service.update(id, input).await?;
    Ok(Json(ApiResponse::success(actor.into())))
}

pub async fn delete_actor(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ScopedIdPath>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let service = actor_service(&state, &path.strategy, &path.version)?;
    service.delete(parse_id(&path.id)?).await?;
    Ok(Json(ApiResponse::success(
        "actor successfully deleted".to_string(),
    )))
}

pub async fn list_people(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ScopePath>,
) -> Result<Json<ApiResponse<Vec<ActorDto>>>, ApiError> {
    let service = person_service(&state, &path.strategy, &path.version)?;
    let people = service.list().await?;
    Ok(Json(ApiResponse::success(
        people.into_iter().map(ActorDto::from).collect(),
    )))
}

pub async fn get_person(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ScopedIdPath>,
) -> Result<Json<ApiResponse<ActorDto>>, ApiError> {
    let service = person_service(&state, &path.strategy, &path.version)?;
    let person = service.get(parse_id(&path.id)?).await?;
    Ok(Json(ApiResponse::success(person.into())))
}

pub async fn create_person(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ScopePath>,
    payload: Result<Json<PersonInput>, JsonRejection>,
) -> Result<Created, ApiError> {
    let service = person_service(&state, &path.strategy, &path.version)?;
    let Json(input) = payload?;
    let person = service.create(input).await?;
    Ok(created(&path, "people", person.into()))
}

pub async fn update_person(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ScopedIdPath>,
    payload: Result<Json<PersonInput>, JsonRejection>,
) -> Result<Json<ApiResponse<ActorDto>>, ApiError> {
    let service = person_service(&state, &path.strategy, &path.version)?;
    let id = parse_id(&path.id)?;
    let Json(input) = payload?;
    let person = service.update(id, input).await?;
    Ok(Json(ApiResponse::success(person.into())))
}

pub async fn delete_person(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ScopedIdPath>,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let service = person_service(&state, &path.strategy, &path.version)?;
    service.delete(parse_id(&path.id)?).await?;
    Ok(Json(ApiResponse::success(
        "person successfully deleted".to_string(),
    )))
}
