//! Field-level validation that reports every problem at once.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Field name → human-readable message, ordered by field name.
///
/// Returned whenever a candidate record or query fails validation. The map
/// is never empty when this value is produced by [`Validator::finish`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// A single-field error, for checks that happen outside a [`Validator`].
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), message.to_string());
        Self(errors)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Accumulates field errors. Not fail-fast: every check runs.
#[derive(Debug, Default)]
pub struct Validator {
    errors: BTreeMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` unless `ok` holds. The first message
    /// recorded for a field wins.
    pub fn check_field(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.errors
                .entry(field.to_string())
                .or_insert_with(|| message.to_string());
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(FieldErrors(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passing_checks_produce_no_errors() {
        let mut v = Validator::new();
        v.check_field(true, "task", "too short");
        assert!(!v.has_errors());
        assert!(v.finish().is_ok());
    }

    #[test]
    fn all_failures_are_collected() {
        let mut v = Validator::new();
        v.check_field(false, "task", "too short");
        v.check_field(false, "todoParent", "must be positive");
        assert!(v.has_errors());

        let errors = v.finish().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("task"), Some("too short"));
        assert_eq!(errors.get("todoParent"), Some("must be positive"));
    }

    #[test]
    fn first_message_for_a_field_wins() {
        let mut v = Validator::new();
        v.check_field(false, "task", "first");
        v.check_field(false, "task", "second");
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.get("task"), Some("first"));
    }

    #[test]
    fn field_errors_serialize_as_flat_object() {
        let errors = FieldErrors::single("get_completed", "type should be boolean");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({"get_completed": "type should be boolean"}));
    }

    #[test]
    fn display_lists_fields_in_order() {
        let mut v = Validator::new();
        v.check_field(false, "todoParent", "b");
        v.check_field(false, "task", "a");
        let errors = v.finish().unwrap_err();
        assert_eq!(errors.to_string(), "task: a; todoParent: b");
    }
}
