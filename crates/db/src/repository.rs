//! Persistence contracts: repositories, unit of work, store.
//!
//! A [`Store`] hands out one [`UnitOfWork`] per request.  The unit of work
//! exposes one [`Repository`] per aggregate; repository mutations are only
//! *staged* and become durable when [`UnitOfWork::commit_changes`] runs.
//!
//! Every call takes the request's [`CancellationToken`].

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use domain::{Entity, WarehouseSize, Worker};

use crate::DbError;

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

/// Storage abstraction for one aggregate type.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Fetch a committed record.  A miss is `Ok(None)`, not an error.
    async fn get_by_id(&self, id: T::Id, cancel: &CancellationToken)
        -> Result<Option<T>, DbError>;

    /// Every committed record, in a stable order.
    async fn list_all(&self, cancel: &CancellationToken) -> Result<Vec<T>, DbError>;

    /// Stage a new record.
    async fn add(&self, entity: T, cancel: &CancellationToken) -> Result<(), DbError>;

    /// Stage a full replacement of the record sharing `entity`'s id.
    async fn replace(&self, entity: T, cancel: &CancellationToken) -> Result<(), DbError>;

    /// Stage removal of `entity`.
    async fn remove(&self, entity: &T, cancel: &CancellationToken) -> Result<(), DbError>;
}

/// One request's transactional boundary.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn workers(&self) -> &dyn Repository<Worker>;

    fn warehouse_sizes(&self) -> &dyn Repository<WarehouseSize>;

    /// Apply every staged change atomically and return the number of
    /// affected records.  Either all changes land or none do.
    async fn commit_changes(&self, cancel: &CancellationToken) -> Result<u64, DbError>;
}

/// Factory of per-request units of work over one backend.
pub trait Store: Send + Sync {
    fn begin(&self) -> Box<dyn UnitOfWork>;
}

// ---------------------------------------------------------------------------
// Change tracking shared by the backends
// ---------------------------------------------------------------------------

/// A single staged mutation of one aggregate.
#[derive(Debug, Clone)]
pub(crate) enum Staged<T: Entity> {
    Add(T),
    Replace(T),
    Remove(T::Id),
}

/// A staged mutation of any aggregate, in staging order.
#[derive(Debug, Clone)]
pub(crate) enum Change {
    Worker(Staged<Worker>),
    WarehouseSize(Staged<WarehouseSize>),
}

/// Aggregates a unit of work can track.
pub(crate) trait Tracked: Entity {
    fn change(staged: Staged<Self>) -> Change;
}

impl Tracked for Worker {
    fn change(staged: Staged<Self>) -> Change {
        Change::Worker(staged)
    }
}

impl Tracked for WarehouseSize {
    fn change(staged: Staged<Self>) -> Change {
        Change::WarehouseSize(staged)
    }
}

/// The pending changes of one unit of work.
#[derive(Debug, Default)]
pub(crate) struct ChangeSet {
    pending: Mutex<Vec<Change>>,
}

impl ChangeSet {
    pub(crate) async fn stage<T: Tracked>(
        &self,
        staged: Staged<T>,
        cancel: &CancellationToken,
    ) -> Result<(), DbError> {
        ensure_live(cancel)?;
        self.pending.lock().await.push(T::change(staged));
        Ok(())
    }

    /// Drain the pending changes.  A unit of work commits what it drained;
    /// nothing is left behind for a second commit.
    pub(crate) async fn take(&self) -> Vec<Change> {
        std::mem::take(&mut *self.pending.lock().await)
    }
}

/// Fail fast with [`DbError::Cancelled`] once the token has fired.
pub(crate) fn ensure_live(cancel: &CancellationToken) -> Result<(), DbError> {
    if cancel.is_cancelled() {
        return Err(DbError::Cancelled);
    }
    Ok(())
}
