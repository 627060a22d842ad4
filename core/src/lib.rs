//! Persistence and hierarchy engine for the todo service.
//!
//! # Overview
//! Holds everything with a business rule attached: record validation,
//! the completion filter, flat-to-forest assembly, and the [`TodoStore`]
//! repository with optimistic concurrency on updates.
//!
//! # Design
//! - Record construction is pure. Candidates are validated before any store
//!   call and nothing is mutated in place.
//! - [`TodoStore`] is object safe so the HTTP layer can hold
//!   `Arc<dyn TodoStore>` and tests can swap in [`MemoryStore`].
//! - Stores return records flat and ascending by id; [`hierarchy::assemble`]
//!   turns that into the nested shape clients see.

pub mod error;
pub mod filter;
pub mod hierarchy;
pub mod store;
pub mod types;
pub mod validator;

pub use error::{StoreError, StoreResult};
pub use filter::TodoFilter;
pub use store::{MemoryStore, SqliteStore, SqliteStoreOptions, TodoStore};
pub use types::{
    CreateChildTodoParams, CreateTodoParams, NewTodo, Todo, UpdateTodoParams, TASK_MIN_LEN,
};
pub use validator::{FieldErrors, Validator};
