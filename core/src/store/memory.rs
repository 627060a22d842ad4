use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{TodoStore, INITIAL_VERSION};
use crate::error::{StoreError, StoreResult};
use crate::filter::TodoFilter;
use crate::types::{NewTodo, Todo};

#[derive(Debug)]
struct Inner {
    todos: BTreeMap<i64, Todo>,
    next_id: i64,
}

/// Process-local store. Ids start at 1 and are never reused, even after a
/// delete.
#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                todos: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn create(&self, todo: NewTodo) -> StoreResult<Todo> {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let stored = Todo {
            id,
            task: todo.task,
            deadline: todo.deadline,
            is_completed: false,
            parent_id: todo.parent_id,
            version: INITIAL_VERSION,
            children: Vec::new(),
        };
        inner.todos.insert(id, stored.clone());
        debug!(id, "todo created");
        Ok(stored)
    }

    async fn get(&self, id: i64) -> StoreResult<Todo> {
        let inner = self.inner.read().await;
        inner.todos.get(&id).cloned().ok_or(StoreError::NotFound(id))
    }

    async fn list(&self, filter: &TodoFilter) -> StoreResult<Vec<Todo>> {
        let inner = self.inner.read().await;
        // BTreeMap iteration is already ascending by id.
        Ok(filter.apply(inner.todos.values()))
    }

    async fn update(&self, todo: &Todo) -> StoreResult<Todo> {
        let mut inner = self.inner.write().await;
        let conflict = StoreError::EditConflict {
            id: todo.id,
            version: todo.version,
        };
        let Some(row) = inner.todos.get_mut(&todo.id) else {
            return Err(conflict);
        };
        if row.version != todo.version {
            return Err(conflict);
        }

        row.task.clone_from(&todo.task);
        row.deadline = todo.deadline;
        row.is_completed = todo.is_completed;
        row.parent_id = todo.parent_id;
        row.version = todo.version + 1;
        debug!(id = todo.id, version = row.version, "todo updated");
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let removed = self.inner.write().await.todos.remove(&id);
        debug!(id, existed = removed.is_some(), "todo deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_todo(task: &str, parent_id: Option<i64>) -> NewTodo {
        NewTodo {
            task: task.to_string(),
            deadline: None,
            parent_id,
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids_and_initial_version() {
        let store = MemoryStore::new();
        let a = store.create(new_todo("buy milk", None)).await.unwrap();
        let b = store.create(new_todo("2% milk", Some(a.id))).await.unwrap();
        assert_eq!((a.id, a.version), (1, 0));
        assert_eq!((b.id, b.parent_id), (2, Some(1)));
        assert!(!b.is_completed);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get(99).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(99)));
    }

    #[tokio::test]
    async fn stale_update_conflicts_without_mutation() {
        let store = MemoryStore::new();
        let created = store.create(new_todo("buy milk", None)).await.unwrap();

        let mut first = created.clone();
        first.is_completed = true;
        let committed = store.update(&first).await.unwrap();
        assert_eq!(committed.version, 1);
        assert_eq!(first.version, 0);

        let mut stale = created.clone();
        stale.task = "buy oat milk".to_string();
        let err = store.update(&stale).await.unwrap_err();
        assert!(matches!(err, StoreError::EditConflict { id: 1, version: 0 }));
        assert_eq!(stale.version, 0);

        let current = store.get(1).await.unwrap();
        assert_eq!(current.task, "buy milk");
        assert!(current.is_completed);
        assert_eq!(current.version, 1);
    }

    #[tokio::test]
    async fn update_of_missing_id_conflicts() {
        let store = MemoryStore::new();
        let ghost = Todo {
            id: 5,
            task: "phantom".to_string(),
            deadline: None,
            is_completed: false,
            parent_id: None,
            version: 0,
            children: Vec::new(),
        };
        assert!(matches!(
            store.update(&ghost).await,
            Err(StoreError::EditConflict { .. })
        ));
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_ids_are_not_reused() {
        let store = MemoryStore::new();
        let a = store.create(new_todo("buy milk", None)).await.unwrap();
        store.delete(a.id).await.unwrap();
        store.delete(a.id).await.unwrap();
        let b = store.create(new_todo("buy bread", None)).await.unwrap();
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn list_forest_drops_orphans_after_parent_delete() {
        let store = MemoryStore::new();
        let parent = store.create(new_todo("buy milk", None)).await.unwrap();
        let child = store.create(new_todo("2% milk", Some(parent.id))).await.unwrap();

        let forest = store.list_forest(&TodoFilter::all()).await.unwrap();
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].children[0].id, child.id);

        store.delete(parent.id).await.unwrap();
        let orphan = store.get(child.id).await.unwrap();
        assert_eq!(orphan.parent_id, Some(parent.id));
        assert!(store.list_forest(&TodoFilter::all()).await.unwrap().is_empty());
    }
}
