//! Core domain models for the warehouse administration backend.
//!
//! Fields are private: identity is fixed at construction and every other
//! field is only ever replaced wholesale by building a new value through
//! [`Worker::with_id`] / [`WarehouseSize::with_id`].

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::DomainError;

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// Shape shared by every aggregate the repositories store.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Copy + Eq + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// Human-readable aggregate name, used in "not found" descriptions.
    const NAME: &'static str;

    fn id(&self) -> Self::Id;
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Allocate a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`Worker`].
    WorkerId
);

entity_id!(
    /// Identifier of a [`WarehouseSize`].
    WarehouseSizeId
);

// ---------------------------------------------------------------------------
// WorkerRole
// ---------------------------------------------------------------------------

/// The role a worker holds.  A data attribute only; it grants nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkerRole {
    Admin,
    Regular,
}

impl WorkerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Regular => "Regular",
        }
    }
}

impl fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps an external role representation onto the domain enumeration.
///
/// Matching ignores ASCII case.  Anything else fails closed with
/// [`DomainError::UnknownRole`]; there is no fallback role.
impl FromStr for WorkerRole {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "admin"   => Ok(Self::Admin),
            "regular" => Ok(Self::Regular),
            _         => Err(DomainError::UnknownRole(s.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

/// A staff record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worker {
    id: WorkerId,
    first_name: String,
    last_name: String,
    role: WorkerRole,
}

impl Worker {
    /// Build a new worker with a freshly assigned id.
    ///
    /// # Errors
    /// [`DomainError::EmptyField`] if either name is blank.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: WorkerRole,
    ) -> Result<Self, DomainError> {
        Self::with_id(WorkerId::new(), first_name, last_name, role)
    }

    /// Build a worker for an existing id, e.g. the full-replace value of an
    /// update or a row read back from storage.
    pub fn with_id(
        id: WorkerId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        role: WorkerRole,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id,
            first_name: non_empty("first_name", first_name.into())?,
            last_name: non_empty("last_name", last_name.into())?,
            role,
        })
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn role(&self) -> WorkerRole {
        self.role
    }
}

impl Entity for Worker {
    type Id = WorkerId;
    const NAME: &'static str = "Worker";

    fn id(&self) -> WorkerId {
        self.id
    }
}

// ---------------------------------------------------------------------------
// WarehouseSize
// ---------------------------------------------------------------------------

/// A named storage-capacity template.  `name` is a label, not a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseSize {
    id: WarehouseSizeId,
    name: String,
    sector_number: u32,
    rack_quantity: u32,
}

impl WarehouseSize {
    /// Build a new warehouse size with a freshly assigned id.
    ///
    /// # Errors
    /// - [`DomainError::EmptyField`] if `name` is blank.
    /// - [`DomainError::NotPositive`] if either count is zero.
    pub fn new(
        name: impl Into<String>,
        sector_number: u32,
        rack_quantity: u32,
    ) -> Result<Self, DomainError> {
        Self::with_id(WarehouseSizeId::new(), name, sector_number, rack_quantity)
    }

    pub fn with_id(
        id: WarehouseSizeId,
        name: impl Into<String>,
        sector_number: u32,
        rack_quantity: u32,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            id,
            name: non_empty("name", name.into())?,
            sector_number: positive("sector_number", sector_number)?,
            rack_quantity: positive("rack_quantity", rack_quantity)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sector_number(&self) -> u32 {
        self.sector_number
    }

    pub fn rack_quantity(&self) -> u32 {
        self.rack_quantity
    }
}

impl Entity for WarehouseSize {
    type Id = WarehouseSizeId;
    const NAME: &'static str = "WarehouseSize";

    fn id(&self) -> WarehouseSizeId {
        self.id
    }
}

// ---------------------------------------------------------------------------
// Field checks
// ---------------------------------------------------------------------------

fn non_empty(field: &'static str, value: String) -> Result<String, DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::EmptyField(field));
    }
    Ok(value)
}

fn positive(field: &'static str, value: u32) -> Result<u32, DomainError> {
    if value == 0 {
        return Err(DomainError::NotPositive(field));
    }
    Ok(value)
}
