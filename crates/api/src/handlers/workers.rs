use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    Json,
};
use uuid::Uuid;

use application::{CreateWorker, DeleteWorker, GetWorker, ListWorkers, UpdateWorker};
use domain::Entity;

use super::AppState;
use crate::contracts::{CreateWorkerRequest, UpdateWorkerRequest, WorkerResponse};
use crate::error::ApiError;

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkerRequest>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<WorkerResponse>), ApiError> {
    let request = CreateWorker {
        first_name: payload.first_name,
        last_name: payload.last_name,
        role: payload.role.into(),
    };
    let cancel = state.request_token();
    let worker = state.dispatcher.send(request, &cancel).await?;

    let location = format!("/administrator/worker/{}", worker.id());
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(WorkerResponse::from(&worker)),
    ))
}

pub async fn get(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<WorkerResponse>, ApiError> {
    let cancel = state.request_token();
    let worker = state.dispatcher.send(GetWorker { id: id.into() }, &cancel).await?;
    Ok(Json(WorkerResponse::from(&worker)))
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<WorkerResponse>>, ApiError> {
    let cancel = state.request_token();
    let workers = state.dispatcher.send(ListWorkers, &cancel).await?;
    Ok(Json(workers.iter().map(WorkerResponse::from).collect()))
}

pub async fn update(
    State(state): State<AppState>,
    Json(payload): Json<UpdateWorkerRequest>,
) -> Result<Json<WorkerResponse>, ApiError> {
    let request = UpdateWorker {
        id: payload.id.into(),
        first_name: payload.first_name,
        last_name: payload.last_name,
        role: payload.role.into(),
    };
    let cancel = state.request_token();
    let worker = state.dispatcher.send(request, &cancel).await?;
    Ok(Json(WorkerResponse::from(&worker)))
}

pub async fn delete(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let cancel = state.request_token();
    state.dispatcher.send(DeleteWorker { id: id.into() }, &cancel).await?;
    Ok(StatusCode::NO_CONTENT)
}
