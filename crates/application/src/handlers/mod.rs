//! Command and query handlers, one per (aggregate × operation).
//!
//! Every handler follows the same single-shot shape: open a unit of work,
//! read through the repository, short-circuit on the first failure, stage
//! the mutation, commit once, return.  Not-found and validation failures
//! return before anything is staged, so they never reach the commit.

use std::sync::Arc;

use db::Store;

use crate::{DispatchError, Dispatcher};

pub mod warehouse_sizes;
pub mod workers;

use warehouse_sizes::{
    CreateWarehouseSize, DeleteWarehouseSize, GetWarehouseSize, ListWarehouseSizes,
    UpdateWarehouseSize, WarehouseSizeHandler,
};
use workers::{CreateWorker, DeleteWorker, GetWorker, ListWorkers, UpdateWorker, WorkerHandler};

/// Success marker of the delete requests.  Carries no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deleted;

/// Build the process-wide dispatcher with all ten handlers over `store`.
///
/// # Errors
/// A [`DispatchError`] if the registry is inconsistent; callers treat this
/// as a startup failure.
pub fn warehouse_dispatcher(store: Arc<dyn Store>) -> Result<Dispatcher, DispatchError> {
    let workers = WorkerHandler::new(Arc::clone(&store));
    let warehouse_sizes = WarehouseSizeHandler::new(store);

    Dispatcher::builder()
        .expect::<CreateWorker>()
        .expect::<GetWorker>()
        .expect::<ListWorkers>()
        .expect::<UpdateWorker>()
        .expect::<DeleteWorker>()
        .expect::<CreateWarehouseSize>()
        .expect::<GetWarehouseSize>()
        .expect::<ListWarehouseSizes>()
        .expect::<UpdateWarehouseSize>()
        .expect::<DeleteWarehouseSize>()
        .register::<CreateWorker, _>(workers.clone())
        .register::<GetWorker, _>(workers.clone())
        .register::<ListWorkers, _>(workers.clone())
        .register::<UpdateWorker, _>(workers.clone())
        .register::<DeleteWorker, _>(workers)
        .register::<CreateWarehouseSize, _>(warehouse_sizes.clone())
        .register::<GetWarehouseSize, _>(warehouse_sizes.clone())
        .register::<ListWarehouseSizes, _>(warehouse_sizes.clone())
        .register::<UpdateWarehouseSize, _>(warehouse_sizes.clone())
        .register::<DeleteWarehouseSize, _>(warehouse_sizes)
        .build()
}
