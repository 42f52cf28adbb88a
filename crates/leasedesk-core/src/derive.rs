//! Derived field engine.
//!
//! A derived field is a pure function of named siblings in the same record.
//! Each derivation declares its inputs; a change to one of them recomputes
//! exactly the derived fields that read it, in that record only.

use crate::{record::Record, schema::RecordSchema, value::Value};
use serde::{Deserialize, Serialize};

///
/// Derivation
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Derivation {
    /// `max(0, total - used)`, both read as non-negative integers.
    Remaining { total: String, used: String },
}

impl Derivation {
    #[must_use]
    pub fn remaining(total: impl Into<String>, used: impl Into<String>) -> Self {
        Self::Remaining {
            total: total.into(),
            used: used.into(),
        }
    }

    #[must_use]
    pub fn inputs(&self) -> [&str; 2] {
        match self {
            Self::Remaining { total, used } => [total.as_str(), used.as_str()],
        }
    }

    #[must_use]
    pub fn depends_on(&self, field: &str) -> bool {
        self.inputs().contains(&field)
    }

    #[must_use]
    pub fn compute(&self, record: &Record) -> Value {
        match self {
            Self::Remaining { total, used } => {
                Value::Text(remaining(record.value(total), record.value(used)).to_string())
            }
        }
    }
}

/// Rooms (or anything else) left over: blank and non-numeric input count as
/// zero and negatives are floored at zero on both sides.
#[must_use]
pub fn remaining(total: &Value, used: &Value) -> i64 {
    let total = total.to_int().max(0);
    let used = used.to_int().max(0);

    total.saturating_sub(used).max(0)
}

/// Recompute the derived fields that read `changed`.
/// Returns the names of fields whose value actually moved.
pub(crate) fn recompute_after(
    schema: &RecordSchema,
    record: &mut Record,
    changed: &str,
) -> Vec<String> {
    let mut updated = Vec::new();

    for spec in schema.dependents_of(changed) {
        if let Some(derivation) = &spec.derived {
            let next = derivation.compute(record);
            if record.value(&spec.name) != &next {
                tracing::trace!(field = %spec.name, value = %next, "derived field recomputed");
                record.put(&spec.name, next);
                updated.push(spec.name.clone());
            }
        }
    }

    updated
}

/// Bring every derived field of a record in line with its inputs.
pub(crate) fn recompute_all(schema: &RecordSchema, record: &mut Record) {
    for spec in &schema.fields {
        if let Some(derivation) = &spec.derived {
            let next = derivation.compute(record);
            record.put(&spec.name, next);
        }
    }
}

///
/// TESTS
///
