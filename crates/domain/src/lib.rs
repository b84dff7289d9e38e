//! `domain` crate — the warehouse aggregates and their invariants.
//!
//! Nothing here touches storage or transport.  Both aggregates are
//! disconnected: no cross-entity references, no cascading deletes.

pub mod error;
pub mod models;

pub use error::DomainError;
pub use models::{Entity, WarehouseSize, WarehouseSizeId, Worker, WorkerId, WorkerRole};
