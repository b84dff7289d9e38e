use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    Json,
};
use uuid::Uuid;

use application::{
    CreateWarehouseSize, DeleteWarehouseSize, GetWarehouseSize, ListWarehouseSizes,
    UpdateWarehouseSize,
};
use domain::Entity;

use super::AppState;
use crate::contracts::{
    CreateWarehouseSizeRequest, UpdateWarehouseSizeRequest, WarehouseSizeResponse,
};
use crate::error::ApiError;

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateWarehouseSizeRequest>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<WarehouseSizeResponse>), ApiError>
{
    let request = CreateWarehouseSize {
        name: payload.name,
        sector_number: payload.sector_number,
        rack_quantity: payload.rack_quantity,
    };
    let cancel = state.request_token();
    let size = state.dispatcher.send(request, &cancel).await?;

    let location = format!("/administrator/warehouse-size/{}", size.id());
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(WarehouseSizeResponse::from(&size)),
    ))
}

pub async fn get(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<WarehouseSizeResponse>, ApiError> {
    let cancel = state.request_token();
    let size = state
        .dispatcher
        .send(GetWarehouseSize { id: id.into() }, &cancel)
        .await?;
    Ok(Json(WarehouseSizeResponse::from(&size)))
}

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<WarehouseSizeResponse>>, ApiError> {
    let cancel = state.request_token();
    let sizes = state.dispatcher.send(ListWarehouseSizes, &cancel).await?;
    Ok(Json(sizes.iter().map(WarehouseSizeResponse::from).collect()))
}

pub async fn update(
    State(state): State<AppState>,
    Json(payload): Json<UpdateWarehouseSizeRequest>,
) -> Result<Json<WarehouseSizeResponse>, ApiError> {
    let request = UpdateWarehouseSize {
        id: payload.id.into(),
        name: payload.name,
        sector_number: payload.sector_number,
        rack_quantity: payload.rack_quantity,
    };
    let cancel = state.request_token();
    let size = state.dispatcher.send(request, &cancel).await?;
    Ok(Json(WarehouseSizeResponse::from(&size)))
}

pub async fn delete(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let cancel = state.request_token();
    state
        .dispatcher
        .send(DeleteWarehouseSize { id: id.into() }, &cancel)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
