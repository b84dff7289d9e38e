//! `application` crate — request handlers and the dispatcher that routes to
//! them.
//!
//! Each request type has exactly one handler.  Handlers orchestrate a unit
//! of work from the [`db::Store`] and return `Result<_, AppError>`; they
//! hold no state of their own beyond the store handle.

pub mod dispatcher;
pub mod error;
pub mod handlers;

pub use dispatcher::{Dispatcher, DispatcherBuilder, Request, RequestHandler};
pub use error::{AppError, DispatchError, ErrorKind};
pub use handlers::warehouse_sizes::{
    CreateWarehouseSize, DeleteWarehouseSize, GetWarehouseSize, ListWarehouseSizes,
    UpdateWarehouseSize, WarehouseSizeHandler,
};
pub use handlers::workers::{
    CreateWorker, DeleteWorker, GetWorker, ListWorkers, UpdateWorker, WorkerHandler,
};
pub use handlers::{warehouse_dispatcher, Deleted};

#[cfg(test)]
mod handler_tests;
