//! Flat-to-forest reconstruction of todo records.
//!
//! # Design
//! The assembler trusts ascending-id order as "parent created before child"
//! and makes a single left-to-right pass with no lookahead. A record can only
//! be attached to a parent that has already been visited. Anything else is
//! dropped, including children whose parent was excluded by a filter or has
//! been deleted. Callers that list with a completion filter rely on exactly
//! this behaviour, so it must not grow a second pass.
//!
//! Attachment is tracked by input position first and materialised afterwards
//! in reverse order, which lets owned records move into their parent's
//! `children` without reference counting.

use std::collections::HashMap;

use crate::types::Todo;

#[derive(Debug, Clone, Copy)]
enum Slot {
    Root,
    ChildOf(usize),
    Dropped,
}

/// Turn records ordered by ascending id into top-level records with their
/// `children` populated. Every input record appears at most once in the
/// output. Sibling order follows input order.
pub fn assemble(todos: Vec<Todo>) -> Vec<Todo> {
    let mut position: HashMap<i64, usize> = HashMap::with_capacity(todos.len());
    let mut slots = Vec::with_capacity(todos.len());

    for (index, todo) in todos.iter().enumerate() {
        position.insert(todo.id, index);
        let slot = match todo.parent_id {
            None => Slot::Root,
            Some(parent) => match position.get(&parent) {
                Some(&p) if p != index => Slot::ChildOf(p),
                _ => Slot::Dropped,
            },
        };
        slots.push(slot);
    }

    let mut pending: Vec<Vec<Todo>> = (0..todos.len()).map(|_| Vec::new()).collect();
    let mut roots = Vec::new();

    // Children always sit at a higher index than their parent, so walking
    // backwards finishes every subtree before its parent is moved.
    for (index, mut todo) in todos.into_iter().enumerate().rev() {
        let mut children = std::mem::take(&mut pending[index]);
        children.reverse();
        todo.children = children;

        match slots[index] {
            Slot::Root => roots.push(todo),
            Slot::ChildOf(parent) => pending[parent].push(todo),
            Slot::Dropped => {}
        }
    }

    roots.reverse();
    roots
}

/// Roots followed by their descendants, depth-first. Inverse of
/// [`assemble`] for well-formed input.
pub fn flatten(forest: &[Todo]) -> Vec<&Todo> {
    let mut out = Vec::new();
    let mut stack: Vec<&Todo> = forest.iter().rev().collect();
    while let Some(todo) = stack.pop() {
        out.push(todo);
        stack.extend(todo.children.iter().rev());
    }
    out
}
