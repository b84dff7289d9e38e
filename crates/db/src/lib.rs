//! `db` crate — the persistence boundary.
//!
//! Defines the [`Repository`] / [`UnitOfWork`] / [`Store`] contracts the
//! handlers program against, and two backends for them: an in-memory store
//! and a Postgres store.  No business logic lives here.

pub mod error;
pub mod memory;
pub mod models;
pub mod pool;
pub mod postgres;
pub mod repository;

pub use error::DbError;
pub use memory::InMemoryStore;
pub use pool::DbPool;
pub use postgres::PgStore;
pub use repository::{Repository, Store, UnitOfWork};
