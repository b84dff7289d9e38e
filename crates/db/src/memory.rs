//! In-memory [`Store`] backend.
//!
//! Committed state lives in two `BTreeMap`s behind a `tokio::sync::RwLock`,
//! so `list_all` is ordered by id and therefore stable.  A commit replays
//! the staged changes onto a copy of the tables and swaps it in only if
//! every change applied, which makes the commit all-or-nothing.
//!
//! The store also counts commit calls and can be told to reject commits;
//! tests use both to observe the persistence boundary.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use domain::{Entity, WarehouseSize, WarehouseSizeId, Worker, WorkerId};

use crate::repository::{ensure_live, Change, ChangeSet, Staged, Tracked};
use crate::{DbError, Repository, Store, UnitOfWork};

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
struct Tables {
    workers: BTreeMap<WorkerId, Worker>,
    warehouse_sizes: BTreeMap<WarehouseSizeId, WarehouseSize>,
}

/// Maps an aggregate type onto its table.
trait Table: Tracked {
    fn rows(tables: &Tables) -> &BTreeMap<Self::Id, Self>;
    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<Self::Id, Self>;
}

impl Table for Worker {
    fn rows(tables: &Tables) -> &BTreeMap<WorkerId, Self> {
        &tables.workers
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<WorkerId, Self> {
        &mut tables.workers
    }
}

impl Table for WarehouseSize {
    fn rows(tables: &Tables) -> &BTreeMap<WarehouseSizeId, Self> {
        &tables.warehouse_sizes
    }

    fn rows_mut(tables: &mut Tables) -> &mut BTreeMap<WarehouseSizeId, Self> {
        &mut tables.warehouse_sizes
    }
}

fn apply<T: Table>(tables: &mut Tables, staged: Staged<T>) -> Result<(), DbError> {
    let rows = T::rows_mut(tables);
    match staged {
        Staged::Add(entity) => {
            let id = entity.id();
            if rows.contains_key(&id) {
                return Err(DbError::conflict::<T>(id, "already exists"));
            }
            rows.insert(id, entity);
        }
        Staged::Replace(entity) => match rows.get_mut(&entity.id()) {
            Some(slot) => *slot = entity,
            None => return Err(DbError::conflict::<T>(entity.id(), "no longer exists")),
        },
        Staged::Remove(id) => {
            if rows.remove(&id).is_none() {
                return Err(DbError::conflict::<T>(id, "no longer exists"));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// InMemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct Shared {
    tables: RwLock<Tables>,
    commits: AtomicUsize,
    fail_commits: AtomicBool,
}

/// Process-local store.  Cloning shares the same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    shared: Arc<Shared>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `commit_changes` has been called on any unit of work
    /// opened from this store, including rejected commits.
    pub fn commit_count(&self) -> usize {
        self.shared.commits.load(Ordering::SeqCst)
    }

    /// Make every subsequent commit fail with [`DbError::Unavailable`].
    pub fn set_fail_commits(&self, fail: bool) {
        self.shared.fail_commits.store(fail, Ordering::SeqCst);
    }
}

impl Store for InMemoryStore {
    fn begin(&self) -> Box<dyn UnitOfWork> {
        Box::new(InMemoryUnitOfWork {
            shared: Arc::clone(&self.shared),
            changes: ChangeSet::default(),
        })
    }
}

// ---------------------------------------------------------------------------
// InMemoryUnitOfWork
// ---------------------------------------------------------------------------

struct InMemoryUnitOfWork {
    shared: Arc<Shared>,
    changes: ChangeSet,
}

#[async_trait]
impl<T: Table> Repository<T> for InMemoryUnitOfWork {
    async fn get_by_id(
        &self,
        id: T::Id,
        cancel: &CancellationToken,
    ) -> Result<Option<T>, DbError> {
        ensure_live(cancel)?;
        let tables = self.shared.tables.read().await;
        Ok(T::rows(&tables).get(&id).cloned())
    }

    async fn list_all(&self, cancel: &CancellationToken) -> Result<Vec<T>, DbError> {
        ensure_live(cancel)?;
        let tables = self.shared.tables.read().await;
        Ok(T::rows(&tables).values().cloned().collect())
    }

    async fn add(&self, entity: T, cancel: &CancellationToken) -> Result<(), DbError> {
        self.changes.stage(Staged::Add(entity), cancel).await
    }

    async fn replace(&self, entity: T, cancel: &CancellationToken) -> Result<(), DbError> {
        self.changes.stage(Staged::Replace(entity), cancel).await
    }

    async fn remove(&self, entity: &T, cancel: &CancellationToken) -> Result<(), DbError> {
        self.changes.stage(Staged::<T>::Remove(entity.id()), cancel).await
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn workers(&self) -> &dyn Repository<Worker> {
        self
    }

    fn warehouse_sizes(&self) -> &dyn Repository<WarehouseSize> {
        self
    }

    async fn commit_changes(&self, cancel: &CancellationToken) -> Result<u64, DbError> {
        self.shared.commits.fetch_add(1, Ordering::SeqCst);
        ensure_live(cancel)?;

        let changes = self.changes.take().await;
        if self.shared.fail_commits.load(Ordering::SeqCst) {
            warn!("in-memory store rejected commit of {} change(s)", changes.len());
            return Err(DbError::Unavailable);
        }

        let mut tables = self.shared.tables.write().await;
        let mut next = tables.clone();
        let affected = changes.len() as u64;
        for change in changes {
            match change {
                Change::Worker(staged) => apply(&mut next, staged)?,
                Change::WarehouseSize(staged) => apply(&mut next, staged)?,
            }
        }
        *tables = next;

        debug!("in-memory commit applied {} change(s)", affected);
        Ok(affected)
    }
}
