//! Declarative description of a form: fields, repeated groups, rules and
//! derivations. One schema replaces a hand-written screen.

mod check;
mod field;
mod group;

pub use field::*;
pub use group::*;

use crate::validate::Issues;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// SchemaError
///

#[derive(Debug, ThisError)]
pub enum SchemaError {
    #[error("invalid form schema '{form}': {issues}")]
    Invalid { form: String, issues: Issues },
}

///
/// RecordSchema
///
/// Fields and groups of one record. Group rows are records too, so a row
/// schema may declare nested groups of its own.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RecordSchema {
    #[serde(default)]
    pub fields: Vec<FieldSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupSpec>,
}

impl RecordSchema {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: Vec::new(),
            groups: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_group(mut self, group: GroupSpec) -> Self {
        self.groups.push(group);
        self
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn group(&self, name: &str) -> Option<&GroupSpec> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Groups whose length follows the given count field.
    pub fn groups_driven_by<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a GroupSpec> {
        self.groups
            .iter()
            .filter(move |g| g.count_field() == Some(field))
    }

    /// Derived fields that read the given field.
    pub fn dependents_of<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldSpec> {
        self.fields.iter().filter(move |f| {
            f.derived
                .as_ref()
                .is_some_and(|d| d.depends_on(field))
        })
    }
}

///
/// FormSchema
///
/// A named, checked root record schema.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FormSchema {
    pub name: String,
    pub root: RecordSchema,
}

impl FormSchema {
    /// Build a schema, rejecting structural mistakes up front.
    pub fn new(name: impl Into<String>, root: RecordSchema) -> Result<Self, SchemaError> {
        let schema = Self {
            name: name.into(),
            root,
        };
        schema.check()?;

        Ok(schema)
    }

    /// Re-run the structural checks, e.g. after deserializing.
    pub fn check(&self) -> Result<(), SchemaError> {
        let issues = check::check_schema(&self.root);

        if issues.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Invalid {
                form: self.name.clone(),
                issues,
            })
        }
    }
}
