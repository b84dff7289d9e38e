//! Warehouse size requests and their handlers.
//!
//! `name` is a label only; two sizes may share it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use db::Store;
use domain::{Entity, WarehouseSize, WarehouseSizeId};

use super::Deleted;
use crate::{AppError, Request, RequestHandler};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CreateWarehouseSize {
    pub name: String,
    pub sector_number: u32,
    pub rack_quantity: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct GetWarehouseSize {
    pub id: WarehouseSizeId,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListWarehouseSizes;

#[derive(Debug, Clone)]
pub struct UpdateWarehouseSize {
    pub id: WarehouseSizeId,
    pub name: String,
    pub sector_number: u32,
    pub rack_quantity: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteWarehouseSize {
    pub id: WarehouseSizeId,
}

impl Request for CreateWarehouseSize {
    type Response = WarehouseSize;
    const NAME: &'static str = "CreateWarehouseSize";
}

impl Request for GetWarehouseSize {
    type Response = WarehouseSize;
    const NAME: &'static str = "GetWarehouseSize";
}

impl Request for ListWarehouseSizes {
    type Response = Vec<WarehouseSize>;
    const NAME: &'static str = "ListWarehouseSizes";
}

impl Request for UpdateWarehouseSize {
    type Response = WarehouseSize;
    const NAME: &'static str = "UpdateWarehouseSize";
}

impl Request for DeleteWarehouseSize {
    type Response = Deleted;
    const NAME: &'static str = "DeleteWarehouseSize";
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct WarehouseSizeHandler {
    store: Arc<dyn Store>,
}

impl WarehouseSizeHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestHandler<CreateWarehouseSize> for WarehouseSizeHandler {
    #[instrument(skip(self, cancel))]
    async fn handle(
        &self,
        request: CreateWarehouseSize,
        cancel: &CancellationToken,
    ) -> Result<WarehouseSize, AppError> {
        let size = WarehouseSize::new(request.name, request.sector_number, request.rack_quantity)?;

        let uow = self.store.begin();
        uow.warehouse_sizes().add(size.clone(), cancel).await?;
        uow.commit_changes(cancel).await?;

        info!(warehouse_size_id = %size.id(), "warehouse size created");
        Ok(size)
    }
}

#[async_trait]
impl RequestHandler<GetWarehouseSize> for WarehouseSizeHandler {
    #[instrument(skip(self, cancel))]
    async fn handle(
        &self,
        request: GetWarehouseSize,
        cancel: &CancellationToken,
    ) -> Result<WarehouseSize, AppError> {
        self.store
            .begin()
            .warehouse_sizes()
            .get_by_id(request.id, cancel)
            .await?
            .ok_or_else(AppError::not_found::<WarehouseSize>)
    }
}

#[async_trait]
impl RequestHandler<ListWarehouseSizes> for WarehouseSizeHandler {
    #[instrument(skip(self, cancel))]
    async fn handle(
        &self,
        _request: ListWarehouseSizes,
        cancel: &CancellationToken,
    ) -> Result<Vec<WarehouseSize>, AppError> {
        Ok(self.store.begin().warehouse_sizes().list_all(cancel).await?)
    }
}

#[async_trait]
impl RequestHandler<UpdateWarehouseSize> for WarehouseSizeHandler {
    #[instrument(skip(self, cancel))]
    async fn handle(
        &self,
        request: UpdateWarehouseSize,
        cancel: &CancellationToken,
    ) -> Result<WarehouseSize, AppError> {
        let uow = self.store.begin();
        let current = uow
            .warehouse_sizes()
            .get_by_id(request.id, cancel)
            .await?
            .ok_or_else(AppError::not_found::<WarehouseSize>)?;

        let updated = WarehouseSize::with_id(
            current.id(),
            request.name,
            request.sector_number,
            request.rack_quantity,
        )?;
        uow.warehouse_sizes().replace(updated.clone(), cancel).await?;
        uow.commit_changes(cancel).await?;

        info!(warehouse_size_id = %updated.id(), "warehouse size updated");
        Ok(updated)
    }
}

#[async_trait]
impl RequestHandler<DeleteWarehouseSize> for WarehouseSizeHandler {
    #[instrument(skip(self, cancel))]
    async fn handle(
        &self,
        request: DeleteWarehouseSize,
        cancel: &CancellationToken,
    ) -> Result<Deleted, AppError> {
        let uow = self.store.begin();
        let size = uow
            .warehouse_sizes()
            .get_by_id(request.id, cancel)
            .await?
            .ok_or_else(AppError::not_found::<WarehouseSize>)?;

        uow.warehouse_sizes().remove(&size, cancel).await?;
        uow.commit_changes(cancel).await?;

        info!(warehouse_size_id = %size.id(), "warehouse size deleted");
        Ok(Deleted)
    }
}
