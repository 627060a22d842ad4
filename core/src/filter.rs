//! Completion filter for list queries.

use serde::{Deserialize, Serialize};

use crate::types::Todo;
use crate::validator::FieldErrors;

/// Name of the query parameter carrying the completion filter.
pub const COMPLETED_PARAM: &str = "get_completed";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoFilter {
    /// `None` matches every record.
    pub completed: Option<bool>,
}

impl TodoFilter {
    pub fn all() -> Self {
        Self { completed: None }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
        }
    }

    /// Parse the raw `get_completed` query value. Absent and empty both mean
    /// "no filter"; only the literals `true` and `false` are accepted.
    pub fn from_query(raw: Option<&str>) -> Result<Self, FieldErrors> {
        match raw.unwrap_or("") {
            "" => Ok(Self::all()),
            "true" => Ok(Self::completed(true)),
            "false" => Ok(Self::completed(false)),
            _ => Err(FieldErrors::single(COMPLETED_PARAM, "type should be boolean")),
        }
    }

    pub fn matches(&self, todo: &Todo) -> bool {
        match self.completed {
            Some(completed) => todo.is_completed == completed,
            None => true,
        }
    }

    /// Matching records in input order, as a new vector.
    pub fn apply<'a, I>(&self, todos: I) -> Vec<Todo>
    where
        I: IntoIterator<Item = &'a Todo>,
    {
        todos
            .into_iter()
            .filter(|todo| self.matches(todo))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: i64, is_completed: bool) -> Todo {
        Todo {
            id,
            task: format!("task number {id}"),
            deadline: None,
            is_completed,
            parent_id: None,
            version: 0,
            children: Vec::new(),
        }
    }

    #[test]
    fn parses_accepted_literals() {
        assert_eq!(TodoFilter::from_query(None).unwrap(), TodoFilter::all());
        assert_eq!(TodoFilter::from_query(Some("")).unwrap(), TodoFilter::all());
        assert_eq!(
            TodoFilter::from_query(Some("true")).unwrap(),
            TodoFilter::completed(true)
        );
        assert_eq!(
            TodoFilter::from_query(Some("false")).unwrap(),
            TodoFilter::completed(false)
        );
    }

    #[test]
    fn rejects_other_literals() {
        for raw in ["yes", "1", "TRUE", "null"] {
            let err = TodoFilter::from_query(Some(raw)).unwrap_err();
            assert!(err.contains("get_completed"), "{raw}");
        }
    }

    #[test]
    fn apply_keeps_order_and_restricts_state() {
        let todos = vec![todo(1, true), todo(2, false), todo(3, true)];

        let done = TodoFilter::completed(true).apply(&todos);
        assert_eq!(done.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 3]);

        let open = TodoFilter::completed(false).apply(&todos);
        assert_eq!(open.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);

        let all = TodoFilter::all().apply(&todos);
        assert_eq!(all, todos);
    }
}
