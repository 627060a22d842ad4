//! Verify hierarchy assembly against JSON test vectors stored in `test-vectors/`.
//!
//! Each case lists flat `(id, todoParent)` pairs in storage order and the
//! expected forest as nested ids. Comparing the id skeleton keeps the vectors
//! independent of the other record fields.

use serde_json::{json, Value};
use todo_core::hierarchy::assemble;
use todo_core::Todo;

fn record(case: &str, raw: &Value) -> Todo {
    Todo {
        id: raw["id"].as_i64().unwrap_or_else(|| panic!("{case}: id")),
        task: "vector task".to_string(),
        deadline: None,
        is_completed: false,
        parent_id: raw["todoParent"].as_i64(),
        version: 0,
        children: Vec::new(),
    }
}

fn skeleton(todos: &[Todo]) -> Value {
    Value::Array(
        todos
            .iter()
            .map(|t| json!({ "id": t.id, "children": skeleton(&t.children) }))
            .collect(),
    )
}

#[test]
fn hierarchy_test_vectors() {
    let raw = include_str!("../../test-vectors/hierarchy.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: Vec<Todo> = case["input"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| record(name, r))
            .collect();

        let forest = assemble(input);
        assert_eq!(skeleton(&forest), case["expected"], "{name}: forest");
    }
}
