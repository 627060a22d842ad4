//! Todo records and the parameter types used to build them.
//!
//! # Design
//! Construction never mutates an existing record. Each `from_*` constructor
//! and [`Todo::merged_with`] produce a fresh candidate, validate it, and only
//! hand it back when every rule passes. The caller decides whether to commit
//! the candidate to a store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validator::{FieldErrors, Validator};

/// `task` must be strictly longer than this many characters.
pub const TASK_MIN_LEN: usize = 5;

/// A stored todo item.
///
/// `children` is transient: stores never persist it and only the hierarchy
/// assembler fills it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub task: String,
    pub deadline: Option<DateTime<Utc>>,
    pub is_completed: bool,
    #[serde(rename = "todoParent")]
    pub parent_id: Option<i64>,
    pub version: i64,
    #[serde(default)]
    pub children: Vec<Todo>,
}

/// A validated record that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub task: String,
    pub deadline: Option<DateTime<Utc>>,
    pub parent_id: Option<i64>,
}

/// Payload for creating a top-level todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTodoParams {
    pub task: String,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

/// Payload for creating a todo nested under an existing one. A missing
/// `todoParent` decodes as 0 and is rejected by validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CreateChildTodoParams {
    pub task: String,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub todo_parent: i64,
}

/// Partial update. Only the fields present overwrite the stored record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct UpdateTodoParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

fn check_task(v: &mut Validator, task: &str) {
    v.check_field(
        task.chars().count() > TASK_MIN_LEN,
        "task",
        "task must be longer than 5 characters",
    );
}

impl NewTodo {
    pub fn from_create(params: CreateTodoParams) -> Result<Self, FieldErrors> {
        let mut v = Validator::new();
        check_task(&mut v, &params.task);
        v.finish()?;
        Ok(Self {
            task: params.task,
            deadline: params.deadline,
            parent_id: None,
        })
    }

    pub fn from_create_child(params: CreateChildTodoParams) -> Result<Self, FieldErrors> {
        let mut v = Validator::new();
        check_task(&mut v, &params.task);
        v.check_field(
            params.todo_parent > 0,
            "todoParent",
            "todoParent must be a positive id",
        );
        v.finish()?;
        Ok(Self {
            task: params.task,
            deadline: params.deadline,
            parent_id: Some(params.todo_parent),
        })
    }
}

impl Todo {
    /// Build the record an update would store: `self` with the provided
    /// fields replaced. `id`, `parent_id` and `version` carry over, so the
    /// candidate still holds the version the caller read.
    pub fn merged_with(&self, params: &UpdateTodoParams) -> Result<Self, FieldErrors> {
        let candidate = Self {
            id: self.id,
            task: params.task.clone().unwrap_or_else(|| self.task.clone()),
            deadline: params.deadline.or(self.deadline),
            is_completed: params.is_completed.unwrap_or(self.is_completed),
            parent_id: self.parent_id,
            version: self.version,
            children: Vec::new(),
        };

        let mut v = Validator::new();
        check_task(&mut v, &candidate.task);
        v.finish()?;
        Ok(candidate)
    }
}
