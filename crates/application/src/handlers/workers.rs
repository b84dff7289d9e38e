//! Worker requests and their handlers.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use db::Store;
use domain::{Entity, Worker, WorkerId, WorkerRole};

use super::Deleted;
use crate::{AppError, Request, RequestHandler};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CreateWorker {
    pub first_name: String,
    pub last_name: String,
    pub role: WorkerRole,
}

#[derive(Debug, Clone, Copy)]
pub struct GetWorker {
    pub id: WorkerId,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListWorkers;

/// Full replace: every field is taken from the request.
#[derive(Debug, Clone)]
pub struct UpdateWorker {
    pub id: WorkerId,
    pub first_name: String,
    pub last_name: String,
    pub role: WorkerRole,
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteWorker {
    pub id: WorkerId,
}

impl Request for CreateWorker {
    type Response = Worker;
    const NAME: &'static str = "CreateWorker";
}

impl Request for GetWorker {
    type Response = Worker;
    const NAME: &'static str = "GetWorker";
}

impl Request for ListWorkers {
    type Response = Vec<Worker>;
    const NAME: &'static str = "ListWorkers";
}

impl Request for UpdateWorker {
    type Response = Worker;
    const NAME: &'static str = "UpdateWorker";
}

impl Request for DeleteWorker {
    type Response = Deleted;
    const NAME: &'static str = "DeleteWorker";
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// Handles the five worker requests.
#[derive(Clone)]
pub struct WorkerHandler {
    store: Arc<dyn Store>,
}

impl WorkerHandler {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RequestHandler<CreateWorker> for WorkerHandler {
    #[instrument(skip(self, cancel))]
    async fn handle(
        &self,
        request: CreateWorker,
        cancel: &CancellationToken,
    ) -> Result<Worker, AppError> {
        let worker = Worker::new(request.first_name, request.last_name, request.role)?;

        let uow = self.store.begin();
        uow.workers().add(worker.clone(), cancel).await?;
        uow.commit_changes(cancel).await?;

        info!(worker_id = %worker.id(), "worker created");
        Ok(worker)
    }
}

#[async_trait]
impl RequestHandler<GetWorker> for WorkerHandler {
    #[instrument(skip(self, cancel))]
    async fn handle(&self, request: GetWorker, cancel: &CancellationToken) -> Result<Worker, AppError> {
        self.store
            .begin()
            .workers()
            .get_by_id(request.id, cancel)
            .await?
            .ok_or_else(AppError::not_found::<Worker>)
    }
}

#[async_trait]
impl RequestHandler<ListWorkers> for WorkerHandler {
    #[instrument(skip(self, cancel))]
    async fn handle(
        &self,
        _request: ListWorkers,
        cancel: &CancellationToken,
    ) -> Result<Vec<Worker>, AppError> {
        Ok(self.store.begin().workers().list_all(cancel).await?)
    }
}

#[async_trait]
impl RequestHandler<UpdateWorker> for WorkerHandler {
    #[instrument(skip(self, cancel))]
    async fn handle(
        &self,
        request: UpdateWorker,
        cancel: &CancellationToken,
    ) -> Result<Worker, AppError> {
        let uow = self.store.begin();
        let current = uow
            .workers()
            .get_by_id(request.id, cancel)
            .await?
            .ok_or_else(AppError::not_found::<Worker>)?;

        let updated = Worker::with_id(
            current.id(),
            request.first_name,
            request.last_name,
            request.role,
        )?;
        uow.workers().replace(updated.clone(), cancel).await?;
        uow.commit_changes(cancel).await?;

        info!(worker_id = %updated.id(), "worker updated");
        Ok(updated)
    }
}

#[async_trait]
impl RequestHandler<DeleteWorker> for WorkerHandler {
    #[instrument(skip(self, cancel))]
    async fn handle(
        &self,
        request: DeleteWorker,
        cancel: &CancellationToken,
    ) -> Result<Deleted, AppError> {
        let uow = self.store.begin();
        let worker = uow
            .workers()
            .get_by_id(request.id, cancel)
            .await?
            .ok_or_else(AppError::not_found::<Worker>)?;

        uow.workers().remove(&worker, cancel).await?;
        uow.commit_changes(cancel).await?;

        info!(worker_id = %worker.id(), "worker deleted");
        Ok(Deleted)
    }
}
