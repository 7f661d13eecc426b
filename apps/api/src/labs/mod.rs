//! Lab directory: the row store holding every research lab record.
//!
//! The match pipeline reads the whole table on every run; there is no filtering
//! and no pagination. `AppState` holds an `Arc<dyn LabStore>` chosen at startup.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::lab::Lab;

pub mod handlers;
pub mod postgres;
pub mod rest;

pub use postgres::PgLabStore;
pub use rest::RestLabStore;

/// Read access to the lab table.
#[async_trait]
pub trait LabStore: Send + Sync {
    /// Unconditional "select all rows".
    async fn fetch_all(&self) -> Result<Vec<Lab>, AppError>;

    /// A single lab by id, for the detail view.
    async fn fetch_one(&self, id: i64) -> Result<Option<Lab>, AppError>;
}
