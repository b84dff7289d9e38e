//! Wire-level payload shapes.
//!
//! These mirror the JSON the administrator endpoints accept and return.
//! They never reach the handlers: every request DTO is converted into an
//! application request first.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain::{Entity, WarehouseSize, Worker, WorkerRole};

// ---------------------------------------------------------------------------
// Workers
// ---------------------------------------------------------------------------

/// Role as clients send it.  Unknown strings are rejected by `serde`
/// before a handler is ever involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerRoleDto {
    Admin,
    Regular,
}

impl From<WorkerRoleDto> for WorkerRole {
    fn from(role: WorkerRoleDto) -> Self {
        match role {
            WorkerRoleDto::Admin   => WorkerRole::Admin,
            WorkerRoleDto::Regular => WorkerRole::Regular,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkerRequest {
    pub first_name: String,
    pub last_name: String,
    pub role: WorkerRoleDto,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkerRequest {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub role: WorkerRoleDto,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

impl From<&Worker> for WorkerResponse {
    fn from(worker: &Worker) -> Self {
        Self {
            id: worker.id().as_uuid(),
            first_name: worker.first_name().to_owned(),
            last_name: worker.last_name().to_owned(),
            role: worker.role().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Warehouse sizes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWarehouseSizeRequest {
    pub name: String,
    pub sector_number: u32,
    pub rack_quantity: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWarehouseSizeRequest {
    pub id: Uuid,
    pub name: String,
    pub sector_number: u32,
    pub rack_quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseSizeResponse {
    pub id: Uuid,
    pub name: String,
    pub sector_number: u32,
    pub rack_quantity: u32,
}

impl From<&WarehouseSize> for WarehouseSizeResponse {
    fn from(size: &WarehouseSize) -> Self {
        Self {
            id: size.id().as_uuid(),
            name: size.name().to_owned(),
            sector_number: size.sector_number(),
            rack_quantity: size.rack_quantity(),
        }
    }
}
