//! Postgres [`Store`] backend.
//!
//! Reads go straight to the pool.  Staged changes are held by the unit of
//! work and replayed inside a single transaction on commit; a replace or
//! remove that touches zero rows aborts the transaction with
//! [`DbError::Conflict`].
//!
//! Every query races the request's cancellation token.  Dropping a pending
//! transaction rolls it back, so a commit cancelled during replay leaves
//! nothing behind.  Once `COMMIT` is sent it runs to completion and its real
//! outcome is reported.

use std::future::Future;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Postgres, Transaction};
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use domain::{Entity, WarehouseSize, WarehouseSizeId, Worker, WorkerId};

use crate::models::{WarehouseSizeRow, WorkerRow};
use crate::repository::{ensure_live, Change, ChangeSet, Staged};
use crate::{DbError, DbPool, Repository, Store, UnitOfWork};

/// Await `fut` unless `cancel` fires first.
async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, DbError>
where
    F: Future<Output = Result<T, DbError>>,
{
    ensure_live(cancel)?;
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DbError::Cancelled),
        result = fut => result,
    }
}

/// Race `prepare` against `cancel`, then drive `finish` to completion with
/// its output.  Cancellation after `prepare` resolves has no effect.
async fn prepare_then_finish<S, T, P, C, CF>(
    cancel: &CancellationToken,
    prepare: P,
    finish: C,
) -> Result<T, DbError>
where
    P: Future<Output = Result<S, DbError>>,
    C: FnOnce(S) -> CF,
    CF: Future<Output = Result<T, DbError>>,
{
    let prepared = cancellable(cancel, prepare).await?;
    finish(prepared).await
}

// ---------------------------------------------------------------------------
// PgStore
// ---------------------------------------------------------------------------

/// Store backed by the `workers` and `warehouse_sizes` tables.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl Store for PgStore {
    fn begin(&self) -> Box<dyn UnitOfWork> {
        Box::new(PgUnitOfWork {
            pool: self.pool.clone(),
            changes: ChangeSet::default(),
        })
    }
}

struct PgUnitOfWork {
    pool: DbPool,
    changes: ChangeSet,
}

// ---------------------------------------------------------------------------
// workers
// ---------------------------------------------------------------------------

#[async_trait]
impl Repository<Worker> for PgUnitOfWork {
    async fn get_by_id(
        &self,
        id: WorkerId,
        cancel: &CancellationToken,
    ) -> Result<Option<Worker>, DbError> {
        let row = cancellable(cancel, async {
            Ok::<_, DbError>(sqlx::query_as::<_, WorkerRow>(
                r#"SELECT id, first_name, last_name, role, created_at FROM workers WHERE id = $1"#,
            )
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?)
        })
        .await?;

        row.map(WorkerRow::into_domain).transpose()
    }

    async fn list_all(&self, cancel: &CancellationToken) -> Result<Vec<Worker>, DbError> {
        let rows = cancellable(cancel, async {
            Ok::<_, DbError>(sqlx::query_as::<_, WorkerRow>(
                r#"
                SELECT id, first_name, last_name, role, created_at
                FROM workers
                ORDER BY created_at ASC, id ASC
                "#,
            )
            .fetch_all(&self.pool)
            .await?)
        })
        .await?;

        rows.into_iter().map(WorkerRow::into_domain).collect()
    }

    async fn add(&self, entity: Worker, cancel: &CancellationToken) -> Result<(), DbError> {
        self.changes.stage(Staged::Add(entity), cancel).await
    }

    async fn replace(&self, entity: Worker, cancel: &CancellationToken) -> Result<(), DbError> {
        self.changes.stage(Staged::Replace(entity), cancel).await
    }

    async fn remove(&self, entity: &Worker, cancel: &CancellationToken) -> Result<(), DbError> {
        self.changes.stage(Staged::<Worker>::Remove(entity.id()), cancel).await
    }
}

async fn write_worker(
    tx: &mut Transaction<'static, Postgres>,
    staged: Staged<Worker>,
) -> Result<(), DbError> {
    match staged {
        Staged::Add(worker) => {
            sqlx::query(
                r#"
                INSERT INTO workers (id, first_name, last_name, role, created_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(worker.id().as_uuid())
            .bind(worker.first_name())
            .bind(worker.last_name())
            .bind(worker.role().as_str())
            .bind(Utc::now())
            .execute(&mut **tx)
            .await?;
        }
        Staged::Replace(worker) => {
            let result = sqlx::query(
                r#"
                UPDATE workers
                SET first_name = $2, last_name = $3, role = $4
                WHERE id = $1
                "#,
            )
            .bind(worker.id().as_uuid())
            .bind(worker.first_name())
            .bind(worker.last_name())
            .bind(worker.role().as_str())
            .execute(&mut **tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(DbError::conflict::<Worker>(worker.id(), "no longer exists"));
            }
        }
        Staged::Remove(id) => {
            let result = sqlx::query("DELETE FROM workers WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&mut **tx)
                .await?;
            if result.rows_affected() == 0 {
                return Err(DbError::conflict::<Worker>(id, "no longer exists"));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// warehouse_sizes
// ---------------------------------------------------------------------------

#[async_trait]
impl Repository<WarehouseSize> for PgUnitOfWork {
    async fn get_by_id(
        &self,
        id: WarehouseSizeId,
        cancel: &CancellationToken,
    ) -> Result<Option<WarehouseSize>, DbError> {
        let row = cancellable(cancel, async {
            Ok::<_, DbError>(sqlx::query_as::<_, WarehouseSizeRow>(
                r#"
                SELECT id, name, sector_number, rack_quantity, created_at
                FROM warehouse_sizes
                WHERE id = $1
                "#,
            )
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?)
        })
        .await?;

        row.map(WarehouseSizeRow::into_domain).transpose()
    }

    async fn list_all(&self, cancel: &CancellationToken) -> Result<Vec<WarehouseSize>, DbError> {
        let rows = cancellable(cancel, async {
            Ok::<_, DbError>(sqlx::query_as::<_, WarehouseSizeRow>(
                r#"
                SELECT id, name, sector_number, rack_quantity, created_at
                FROM warehouse_sizes
                ORDER BY created_at ASC, id ASC
                "#,
            )
            .fetch_all(&self.pool)
            .await?)
        })
        .await?;

        rows.into_iter().map(WarehouseSizeRow::into_domain).collect()
    }

    async fn add(&self, entity: WarehouseSize, cancel: &CancellationToken) -> Result<(), DbError> {
        self.changes.stage(Staged::Add(entity), cancel).await
    }

    async fn replace(
        &self,
        entity: WarehouseSize,
        cancel: &CancellationToken,
    ) -> Result<(), DbError> {
        self.changes.stage(Staged::Replace(entity), cancel).await
    }

    async fn remove(
        &self,
        entity: &WarehouseSize,
        cancel: &CancellationToken,
    ) -> Result<(), DbError> {
        self.changes
            .stage(Staged::<WarehouseSize>::Remove(entity.id()), cancel)
            .await
    }
}

async fn write_warehouse_size(
    tx: &mut Transaction<'static, Postgres>,
    staged: Staged<WarehouseSize>,
) -> Result<(), DbError> {
    match staged {
        Staged::Add(size) => {
            sqlx::query(
                r#"
                INSERT INTO warehouse_sizes (id, name, sector_number, rack_quantity, created_at)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(size.id().as_uuid())
            .bind(size.name())
            .bind(i64::from(size.sector_number()))
            .bind(i64::from(size.rack_quantity()))
            .bind(Utc::now())
            .execute(&mut **tx)
            .await?;
        }
        Staged::Replace(size) => {
            let result = sqlx::query(
                r#"
                UPDATE warehouse_sizes
                SET name = $2, sector_number = $3, rack_quantity = $4
                WHERE id = $1
                "#,
            )
            .bind(size.id().as_uuid())
            .bind(size.name())
            .bind(i64::from(size.sector_number()))
            .bind(i64::from(size.rack_quantity()))
            .execute(&mut **tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(DbError::conflict::<WarehouseSize>(size.id(), "no longer exists"));
            }
        }
        Staged::Remove(id) => {
            let result = sqlx::query("DELETE FROM warehouse_sizes WHERE id = $1")
                .bind(id.as_uuid())
                .execute(&mut **tx)
                .await?;
            if result.rows_affected() == 0 {
                return Err(DbError::conflict::<WarehouseSize>(id, "no longer exists"));
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// commit
// ---------------------------------------------------------------------------

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    fn workers(&self) -> &dyn Repository<Worker> {
        self
    }

    fn warehouse_sizes(&self) -> &dyn Repository<WarehouseSize> {
        self
    }

    #[instrument(skip_all)]
    async fn commit_changes(&self, cancel: &CancellationToken) -> Result<u64, DbError> {
        let changes = self.changes.take().await;
        let affected = changes.len() as u64;

        prepare_then_finish(
            cancel,
            async {
                let mut tx = self.pool.begin().await?;
                for change in changes {
                    match change {
                        Change::Worker(staged) => write_worker(&mut tx, staged).await?,
                        Change::WarehouseSize(staged) => {
                            write_warehouse_size(&mut tx, staged).await?
                        }
                    }
                }
                Ok::<_, DbError>(tx)
            },
            |tx| async move { tx.commit().await.map_err(DbError::from) },
        )
        .await?;

        debug!("postgres commit applied {} change(s)", affected);
        Ok(affected)
    }
}
