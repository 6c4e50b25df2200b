//! Query filters
//!
//! Filters are conjunctions of simple conditions on top-level fields,
//! which is all the billing and discharge queries require.

use serde_json::{Map, Value};

/// A single filter condition
#[derive(Debug, Clone, PartialEq)]
enum Condition {
    /// Field is present and equal to the value
    Eq(String, Value),
    /// Field is absent or different from the value
    Ne(String, Value),
    /// Field is present and one of the values
    In(String, Vec<Value>),
}

/// A conjunction of field conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Creates an empty filter matching every document
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `field == value`
    pub fn field_eq(mut self, field: impl Into<String>, value: Value) -> Self {
        self.conditions.push(Condition::Eq(field.into(), value));
        self
    }

    /// Requires `field != value`; absent fields match
    pub fn field_ne(mut self, field: impl Into<String>, value: Value) -> Self {
        self.conditions.push(Condition::Ne(field.into(), value));
        self
    }

    /// Requires `field` to be one of `values`
    pub fn field_in(mut self, field: impl Into<String>, values: Vec<Value>) -> Self {
        self.conditions.push(Condition::In(field.into(), values));
        self
    }

    /// Evaluates the filter against a raw document field map
    pub fn matches(&self, data: &Map<String, Value>) -> bool {
        self.conditions.iter().all(|condition| match condition {
            Condition::Eq(field, value) => data.get(field) == Some(value),
            Condition::Ne(field, value) => data.get(field) != Some(value),
            Condition::In(field, values) => data
                .get(field)
                .map(|v| values.contains(v))
                .unwrap_or(false),
        })
    }
}
