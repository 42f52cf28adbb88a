//! Validator.
//!
//! Validation walks the whole record and reports every violation at once,
//! keyed by field path. It never mutates the record; a failed validation
//! leaves it exactly as the user left it.

mod context;
pub(crate) mod rules;

pub use context::*;

use crate::{
    path::PathSegment,
    record::Record,
    schema::{FieldSpec, RecordSchema},
};
use thiserror::Error as ThisError;

///
/// ValidateError
///

#[derive(Debug, ThisError)]
pub enum ValidateError {
    #[error("validation failed: {}", .0)]
    ValidationFailed(Issues),
}

impl ValidateError {
    #[must_use]
    pub const fn issues(&self) -> &Issues {
        match self {
            Self::ValidationFailed(issues) => issues,
        }
    }
}

///
/// validate
/// Check every field of every row and collect issues by path.
///
pub fn validate(schema: &RecordSchema, record: &Record) -> Result<(), ValidateError> {
    let issues = collect(schema, record);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::ValidationFailed(issues))
    }
}

/// Run the walk and return whatever it found, possibly nothing.
#[must_use]
pub fn collect(schema: &RecordSchema, record: &Record) -> Issues {
    let mut ctx = ValidateContext::new();
    validate_record(schema, record, false, &mut ctx);

    ctx.finish()
}

/// Messages for a single field, as used for on-change checks.
#[must_use]
pub fn check_field(spec: &FieldSpec, record: &Record, counted: bool) -> Vec<String> {
    rules::field_messages(spec, record, counted)
}

fn validate_record(
    schema: &RecordSchema,
    record: &Record,
    counted: bool,
    ctx: &mut ValidateContext,
) {
    for spec in &schema.fields {
        for message in rules::field_messages(spec, record, counted) {
            ctx.issue_at(&spec.name, message);
        }
    }

    for spec in &schema.groups {
        let Some(group) = record.group(&spec.name) else {
            continue;
        };

        ctx.push(PathSegment::Field(spec.name.clone()));
        if group.len() < spec.min_len() {
            ctx.issue(format!(
                "{} needs at least {} entries",
                spec.label,
                spec.min_len()
            ));
        }
        for (i, row) in group.rows().iter().enumerate() {
            ctx.push(PathSegment::Index(i));
            validate_record(&spec.row, row.record(), spec.is_count_driven(), ctx);
            ctx.pop();
        }
        ctx.pop();
    }
}
