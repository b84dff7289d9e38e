//! Row structs that map 1-to-1 onto database tables.
//!
//! These are *persistence* models.  Converting a row back into a domain
//! aggregate re-runs the domain validation, so a corrupt row surfaces as a
//! [`DbError`] instead of leaking into the handlers.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::{WarehouseSize, Worker, WorkerId, WorkerRole};

use crate::DbError;

// ---------------------------------------------------------------------------
// workers
// ---------------------------------------------------------------------------

/// A persisted worker row.
#[derive(Debug, Clone, FromRow)]
pub struct WorkerRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// `"Admin"` or `"Regular"`.
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl WorkerRow {
    /// Rebuild the aggregate.  An unknown `role` text fails closed.
    pub fn into_domain(self) -> Result<Worker, DbError> {
        let role: WorkerRole = self.role.parse()?;
        Ok(Worker::with_id(
            WorkerId::from(self.id),
            self.first_name,
            self.last_name,
            role,
        )?)
    }
}

// ---------------------------------------------------------------------------
// warehouse_sizes
// ---------------------------------------------------------------------------

/// A persisted warehouse size row.  Counts are `BIGINT` so every `u32`
/// fits.
#[derive(Debug, Clone, FromRow)]
pub struct WarehouseSizeRow {
    pub id: Uuid,
    pub name: String,
    pub sector_number: i64,
    pub rack_quantity: i64,
    pub created_at: DateTime<Utc>,
}

impl WarehouseSizeRow {
    pub fn into_domain(self) -> Result<WarehouseSize, DbError> {
        let sector_number = u32::try_from(self.sector_number)
            .map_err(|_| DbError::OutOfRange("sector_number"))?;
        let rack_quantity = u32::try_from(self.rack_quantity)
            .map_err(|_| DbError::OutOfRange("rack_quantity"))?;
        Ok(WarehouseSize::with_id(
            self.id.into(),
            self.name,
            sector_number,
            rack_quantity,
        )?)
    }
}

// ============================================================
// Unit tests
// ============================================================
#[cfg(test)]
mod tests {
    use super::*;
    use domain::{DomainError, Entity};

    fn worker_row(role: &str) -> WorkerRow {
        WorkerRow {
            id: Uuid::new_v4(),
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            role: role.into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn worker_row_maps_known_roles() {
        let row = worker_row("Admin");
        let id = row.id;
        let worker = row.into_domain().expect("valid row");
        assert_eq!(worker.id().as_uuid(), id);
        assert_eq!(worker.role(), WorkerRole::Admin);
    }

    #[test]
    fn worker_row_with_unknown_role_fails_closed() {
        let err = worker_row("Supervisor").into_domain().unwrap_err();
        assert!(matches!(
            err,
            DbError::InvalidRow(DomainError::UnknownRole(role)) if role == "Supervisor"
        ));
    }

    #[test]
    fn warehouse_size_row_rejects_negative_counts() {
        let row = WarehouseSizeRow {
            id: Uuid::new_v4(),
            name: "Small".into(),
            sector_number: -1,
            rack_quantity: 10,
            created_at: Utc::now(),
        };
        assert!(matches!(
            row.into_domain(),
            Err(DbError::OutOfRange("sector_number"))
        ));
    }

    #[test]
    fn warehouse_size_row_rejects_zero_counts() {
        let row = WarehouseSizeRow {
            id: Uuid::new_v4(),
            name: "Small".into(),
            sector_number: 2,
            rack_quantity: 0,
            created_at: Utc::now(),
        };
        assert!(matches!(
            row.into_domain(),
            Err(DbError::InvalidRow(DomainError::NotPositive("rack_quantity")))
        ));
    }
}
