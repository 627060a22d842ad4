//! Durable CRUD for todos with optimistic concurrency.
//!
//! # Design
//! [`TodoStore`] is the only seam between request handling and persistence.
//! Handlers hold an `Arc<dyn TodoStore>` injected at startup, so the SQLite
//! backend and the in-memory backend are interchangeable.
//!
//! Updates are conditional on the version the caller read. The store computes
//! `version + 1` for the write but never mutates the caller's record: the
//! bumped version only ever reaches the caller inside the record returned
//! after the write was confirmed.

mod memory;
mod sqlite;

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::filter::TodoFilter;
use crate::hierarchy;
use crate::types::{NewTodo, Todo};

pub use memory::MemoryStore;
pub use sqlx::Error as DatabaseError;
pub use sqlite::{SqliteStore, SqliteStoreOptions};

/// Version assigned to every newly created record.
pub const INITIAL_VERSION: i64 = 0;

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Persist a validated record, assigning its id and initial version.
    async fn create(&self, todo: NewTodo) -> StoreResult<Todo>;

    async fn get(&self, id: i64) -> StoreResult<Todo>;

    /// Flat records matching `filter`, ascending by id.
    async fn list(&self, filter: &TodoFilter) -> StoreResult<Vec<Todo>>;

    /// Write every mutable field of `todo` if the stored row still carries
    /// `todo.version`. Returns the committed record with the bumped version.
    async fn update(&self, todo: &Todo) -> StoreResult<Todo>;

    /// Hard delete. Deleting an absent id is not an error, and children of
    /// the deleted record are left in place.
    async fn delete(&self, id: i64) -> StoreResult<()>;

    /// [`list`](Self::list) assembled into a forest.
    async fn list_forest(&self, filter: &TodoFilter) -> StoreResult<Vec<Todo>> {
        let flat = self.list(filter).await?;
        Ok(hierarchy::assemble(flat))
    }
}
