use crate::{
    derive,
    id::{IdGenerator, RowId},
    obs::{self, FormEvent},
    path::{FieldPath, PathError},
    record::{Group, Record},
    schema::{FieldKind, FieldSpec, FormSchema, GroupSpec, RecordSchema},
    submit::{self, Payload, Receipt, SubmitError, SubmitTransport},
    sync::{self, Removal},
    validate::{self, ValidateError},
    value::Value,
};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// EditError
///
/// Rejected edits. The record is untouched whenever one of these is returned.
///

#[derive(Debug, ThisError)]
pub enum EditError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("unknown field '{path}'")]
    UnknownField { path: String },

    #[error("unknown group '{path}'")]
    UnknownGroup { path: String },

    #[error("row {index} is out of range for '{path}' ({len} rows)")]
    RowOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("field '{path}' is derived and cannot be edited")]
    ReadOnly { path: String },

    #[error("field '{path}' does not accept a {found} value")]
    KindMismatch { path: String, found: &'static str },

    #[error("field '{path}' expects a date as YYYY-MM-DD")]
    InvalidDate { path: String },

    #[error("group '{path}' follows '{count_field}'; change the count instead")]
    CountDriven { path: String, count_field: String },
}

///
/// GroupResize
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GroupResize {
    pub group: FieldPath,
    pub from: usize,
    pub to: usize,
}

///
/// ChangeSet
///
/// Everything an edit caused, already applied by the time it is returned.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct ChangeSet {
    pub resized: Vec<GroupResize>,
    pub derived: Vec<FieldPath>,

    /// On-change messages for live fields. Informational; the edit stands.
    pub issues: Vec<String>,
}

impl ChangeSet {
    #[must_use]
    pub const fn is_quiet(&self) -> bool {
        self.resized.is_empty() && self.derived.is_empty() && self.issues.is_empty()
    }
}

///
/// Form
///
/// One screen's editable state: a checked schema, the record being edited
/// and the id source for its rows. Every edit runs to completion,
/// synchronization and derivation included, before it returns.
///

pub struct Form {
    schema: FormSchema,
    record: Record,
    ids: IdGenerator,
}

impl Form {
    #[must_use]
    pub fn new(schema: FormSchema) -> Self {
        Self::with_ids(schema, IdGenerator::new())
    }

    #[must_use]
    pub fn with_ids(schema: FormSchema, mut ids: IdGenerator) -> Self {
        let record = Record::blank(&schema.root, &mut ids);
        tracing::debug!(form = %schema.name, "form opened");

        Self {
            schema,
            record,
            ids,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    #[must_use]
    pub const fn schema(&self) -> &FormSchema {
        &self.schema
    }

    #[must_use]
    pub const fn record(&self) -> &Record {
        &self.record
    }

    /// Discard every edit and start from a blank record.
    pub fn reset(&mut self) {
        self.record = Record::blank(&self.schema.root, &mut self.ids);
    }

    pub fn get(&self, path: &str) -> Result<&Value, EditError> {
        let path = FieldPath::parse(path)?;
        let (steps, leaf) = path.steps()?;
        let scope = locate(&self.schema.root, &self.record, &steps)?;

        if scope.schema.field(leaf).is_none() {
            return Err(EditError::UnknownField {
                path: path.to_string(),
            });
        }

        Ok(scope.record.value(leaf))
    }

    pub fn group(&self, path: &str) -> Result<&Group, EditError> {
        let path = FieldPath::parse(path)?;
        let (steps, leaf) = path.steps()?;
        let scope = locate(&self.schema.root, &self.record, &steps)?;

        scope
            .record
            .group(leaf)
            .filter(|_| scope.schema.group(leaf).is_some())
            .ok_or_else(|| EditError::UnknownGroup {
                path: path.to_string(),
            })
    }

    pub fn group_len(&self, path: &str) -> Result<usize, EditError> {
        self.group(path).map(Group::len)
    }

    /// Store a value and run the synchronizer and derived engine for it.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<ChangeSet, EditError> {
        let path = FieldPath::parse(path)?;
        self.set_at(&path, value.into())
    }

    /// Like `set`, but takes raw input text and reads it according to the
    /// field's kind (dates as `YYYY-MM-DD`, flags as `true`/`false`).
    pub fn set_input(&mut self, path: &str, input: &str) -> Result<ChangeSet, EditError> {
        let path = FieldPath::parse(path)?;
        let spec = self.field_spec(&path)?;

        let value = match spec.kind {
            FieldKind::Date => {
                Value::parse_date(input).map_err(|_| EditError::InvalidDate {
                    path: path.to_string(),
                })?
            }
            FieldKind::Flag => match input.trim() {
                "true" | "on" | "1" => Value::Flag(true),
                "false" | "off" | "0" | "" => Value::Flag(false),
                _ => {
                    return Err(EditError::KindMismatch {
                        path: path.to_string(),
                        found: "text",
                    });
                }
            },
            _ => Value::text(input),
        };

        self.set_at(&path, value)
    }

    fn set_at(&mut self, path: &FieldPath, value: Value) -> Result<ChangeSet, EditError> {
        let (steps, leaf) = path.steps()?;
        let Self {
            schema,
            record,
            ids,
        } = self;
        let scope = locate_mut(&schema.root, record, &steps)?;
        let spec = scope
            .schema
            .field(leaf)
            .ok_or_else(|| EditError::UnknownField {
                path: path.to_string(),
            })?;

        if spec.is_derived() {
            return Err(EditError::ReadOnly {
                path: path.to_string(),
            });
        }
        if !spec.kind.accepts(&value) {
            return Err(EditError::KindMismatch {
                path: path.to_string(),
                found: value_shape(&value),
            });
        }

        scope.record.put(leaf, value);

        let mut changes = ChangeSet::default();

        // count -> group shape
        for group in scope.schema.groups_driven_by(leaf) {
            let len = sync::target_len(scope.record.value(leaf));
            let Some(rows) = scope.record.group_mut(&group.name) else {
                continue;
            };
            if let Some(resize) = sync::resize(rows, len, &group.row, ids) {
                report_resize(resize.from, resize.to);
                tracing::debug!(
                    group = %scope.prefix.child(&group.name),
                    from = resize.from,
                    to = resize.to,
                    "group resized to follow count"
                );
                changes.resized.push(GroupResize {
                    group: scope.prefix.child(&group.name),
                    from: resize.from,
                    to: resize.to,
                });
            }
        }

        // inputs -> derived fields
        let derived = derive::recompute_after(scope.schema, scope.record, leaf);
        if !derived.is_empty() {
            obs::record(FormEvent::DerivedRecomputed {
                fields: derived.len(),
            });
        }
        changes.derived = derived
            .iter()
            .map(|name| scope.prefix.child(name))
            .collect();

        if spec.live {
            changes.issues = validate::check_field(spec, scope.record, scope.counted);
        }

        Ok(changes)
    }

    /// Append a blank row to an action-driven group.
    /// Returns `None` when the group is already at its row cap.
    pub fn add_row(&mut self, path: &str) -> Result<Option<RowId>, EditError> {
        let path = FieldPath::parse(path)?;
        let (steps, leaf) = path.steps()?;
        let Self {
            schema,
            record,
            ids,
        } = self;
        let scope = locate_mut(&schema.root, record, &steps)?;
        let spec = action_group(&scope, leaf, &path)?;
        let Some(group_rows) = scope.record.group_mut(leaf) else {
            return Err(EditError::UnknownGroup {
                path: path.to_string(),
            });
        };

        let added = sync::push(group_rows, &spec.row, ids);
        if added.is_some() {
            report_resize(group_rows.len() - 1, group_rows.len());
        }

        Ok(added)
    }

    /// Remove the row at `index` from an action-driven group.
    /// Removing below the group's minimum is a no-op and returns `None`.
    pub fn remove_row(&mut self, path: &str, index: usize) -> Result<Option<RowId>, EditError> {
        let path = FieldPath::parse(path)?;
        let (steps, leaf) = path.steps()?;
        let scope = locate_mut(&self.schema.root, &mut self.record, &steps)?;
        let spec = action_group(&scope, leaf, &path)?;
        let min_len = spec.min_len();
        let Some(group) = scope.record.group_mut(leaf) else {
            return Err(EditError::UnknownGroup {
                path: path.to_string(),
            });
        };

        match sync::remove(group, index, min_len) {
            Removal::Removed(row) => {
                report_resize(group.len() + 1, group.len());
                Ok(Some(row.id()))
            }
            Removal::AtMinimum => Ok(None),
            Removal::OutOfRange => Err(EditError::RowOutOfRange {
                path: path.to_string(),
                index,
                len: group.len(),
            }),
        }
    }

    /// On-change messages for one field, without touching the record.
    pub fn check(&self, path: &str) -> Result<Vec<String>, EditError> {
        let path = FieldPath::parse(path)?;
        let (steps, leaf) = path.steps()?;
        let scope = locate(&self.schema.root, &self.record, &steps)?;
        let spec = scope
            .schema
            .field(leaf)
            .ok_or_else(|| EditError::UnknownField {
                path: path.to_string(),
            })?;

        Ok(validate::check_field(spec, scope.record, scope.counted))
    }

    /// Full submit-time validation.
    pub fn validate(&self) -> Result<(), ValidateError> {
        let result = validate::validate(&self.schema.root, &self.record);
        let issues = result.as_ref().err().map_or(0, |err| err.issues().total());
        obs::record(FormEvent::Validated { issues });

        if issues > 0 {
            tracing::debug!(form = %self.schema.name, issues, "validation failed");
        }

        result
    }

    /// Flatten the record into `path -> text` pairs.
    #[must_use]
    pub fn flatten(&self) -> Payload {
        let mut fields = BTreeMap::new();
        flatten_into(
            &self.schema.root,
            &self.record,
            &FieldPath::root(),
            &mut fields,
        );

        Payload {
            form: self.schema.name.clone(),
            fields,
        }
    }

    /// Validate, then hand the flattened record to the transport.
    pub fn submit(&self, transport: &mut dyn SubmitTransport) -> Result<Receipt, SubmitError> {
        submit::submit(self, transport)
    }

    fn field_spec(&self, path: &FieldPath) -> Result<&FieldSpec, EditError> {
        let (steps, leaf) = path.steps()?;
        let scope = locate(&self.schema.root, &self.record, &steps)?;

        scope
            .schema
            .field(leaf)
            .ok_or_else(|| EditError::UnknownField {
                path: path.to_string(),
            })
    }
}

///
/// Scope
/// A record reached by walking `(group, row)` steps, with its schema.
///

struct Scope<'s, R> {
    schema: &'s RecordSchema,
    record: R,
    prefix: FieldPath,
    // rows of a count-driven group
    counted: bool,
}

fn locate<'s, 'r>(
    mut schema: &'s RecordSchema,
    mut record: &'r Record,
    steps: &[(&str, usize)],
) -> Result<Scope<'s, &'r Record>, EditError> {
    let mut prefix = FieldPath::root();
    let mut counted = false;

    for &(name, index) in steps {
        let group_path = prefix.child(name);
        let (spec, group) = match (schema.group(name), record.group(name)) {
            (Some(spec), Some(group)) => (spec, group),
            _ => {
                return Err(EditError::UnknownGroup {
                    path: group_path.to_string(),
                });
            }
        };
        let row = group.row(index).ok_or_else(|| EditError::RowOutOfRange {
            path: group_path.to_string(),
            index,
            len: group.len(),
        })?;

        prefix = group_path.index(index);
        counted = spec.is_count_driven();
        schema = &spec.row;
        record = row.record();
    }

    Ok(Scope {
        schema,
        record,
        prefix,
        counted,
    })
}

fn locate_mut<'s, 'r>(
    mut schema: &'s RecordSchema,
    mut record: &'r mut Record,
    steps: &[(&str, usize)],
) -> Result<Scope<'s, &'r mut Record>, EditError> {
    let mut prefix = FieldPath::root();
    let mut counted = false;

    for &(name, index) in steps {
        let group_path = prefix.child(name);
        let Some(spec) = schema.group(name) else {
            return Err(EditError::UnknownGroup {
                path: group_path.to_string(),
            });
        };
        let Some(group) = record.group_mut(name) else {
            return Err(EditError::UnknownGroup {
                path: group_path.to_string(),
            });
        };
        let len = group.len();
        let Some(row) = group.row_mut(index) else {
            return Err(EditError::RowOutOfRange {
                path: group_path.to_string(),
                index,
                len,
            });
        };

        prefix = group_path.index(index);
        counted = spec.is_count_driven();
        schema = &spec.row;
        record = row.record_mut();
    }

    Ok(Scope {
        schema,
        record,
        prefix,
        counted,
    })
}

// Explicit add/remove only applies to action-driven groups.
fn action_group<'s, R>(
    scope: &Scope<'s, R>,
    leaf: &str,
    path: &FieldPath,
) -> Result<&'s GroupSpec, EditError> {
    let spec = scope
        .schema
        .group(leaf)
        .ok_or_else(|| EditError::UnknownGroup {
            path: path.to_string(),
        })?;

    if let Some(count_field) = spec.count_field() {
        return Err(EditError::CountDriven {
            path: path.to_string(),
            count_field: count_field.to_string(),
        });
    }

    Ok(spec)
}

fn report_resize(from: usize, to: usize) {
    if to > from {
        obs::record(FormEvent::RowsAdded { count: to - from });
    } else if from > to {
        obs::record(FormEvent::RowsRemoved { count: from - to });
    }
}

const fn value_shape(value: &Value) -> &'static str {
    match value {
        Value::Empty => "empty",
        Value::Text(_) => "text",
        Value::Flag(_) => "flag",
        Value::Date(_) => "date",
    }
}

fn flatten_into(
    schema: &RecordSchema,
    record: &Record,
    prefix: &FieldPath,
    out: &mut BTreeMap<String, String>,
) {
    for spec in &schema.fields {
        out.insert(
            prefix.child(&spec.name).to_string(),
            record.value(&spec.name).to_string(),
        );
    }

    for spec in &schema.groups {
        let Some(group) = record.group(&spec.name) else {
            continue;
        };
        let group_path = prefix.child(&spec.name);
        for (i, row) in group.rows().iter().enumerate() {
            flatten_into(&spec.row, row.record(), &group_path.index(i), out);
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        derive::Derivation,
        pattern::Pattern,
        schema::{FieldSpec, GroupSpec},
        submit::TransportError,
    };

    fn properties_schema() -> FormSchema {
        let row = RecordSchema::new()
            .with_field(FieldSpec::text("address", "Address"))
            .with_field(FieldSpec::digits("totalRooms", "Total Rooms").pattern(Pattern::Integer))
            .with_field(
                FieldSpec::digits("filledRooms", "Filled Rooms")
                    .pattern(Pattern::Integer)
                    .at_most("totalRooms", "occupied cannot exceed total"),
            )
            .with_field(FieldSpec::derived(
                "emptyRooms",
                "Empty Rooms",
                Derivation::remaining("totalRooms", "filledRooms"),
            ));
        let contact = RecordSchema::new().with_field(
            FieldSpec::text("number", "Contact Number")
                .required()
                .pattern(Pattern::PhoneNumber),
        );
        let root = RecordSchema::new()
            .with_field(FieldSpec::text("name", "Name").required())
            .with_field(
                FieldSpec::text("contactNumber", "Contact Number")
                    .required()
                    .pattern(Pattern::PhoneNumber)
                    .live(),
            )
            .with_field(FieldSpec::count("numProperties", "Number of Properties"))
            .with_group(GroupSpec::count_driven(
                "properties",
                "Properties",
                "numProperties",
                row,
            ))
            .with_group(GroupSpec::action_driven("contacts", "Contacts", 1, contact));

        FormSchema::new("owner", root).expect("schema should be valid")
    }

    fn form() -> Form {
        Form::with_ids(properties_schema(), IdGenerator::seeded(42))
    }

    fn fill_valid(form: &mut Form) {
        form.set("name", "Asha").expect("set name");
        form.set("contactNumber", "9876543210").expect("set contact");
        form.set("numProperties", "1").expect("set count");
        form.set("properties.0.address", "12 Lake Rd").expect("set address");
        form.set("properties.0.totalRooms", "10").expect("set total");
        form.set("properties.0.filledRooms", "4").expect("set filled");
        form.set("contacts.0.number", "9123456780").expect("set contact row");
    }

    #[test]
    fn count_grows_then_shrinks_keeping_first_row() {
        let mut form = form();
        assert_eq!(form.group_len("properties").expect("group"), 0);

        let changes = form.set("numProperties", "3").expect("set count");
        assert_eq!(
            changes.resized,
            vec![GroupResize {
                group: FieldPath::field("properties"),
                from: 0,
                to: 3,
            }]
        );
        form.set("properties.0.address", "First").expect("set address");
        let grown = form.group("properties").expect("group").clone();
        let ids = grown.ids();
        assert_eq!(ids.len(), 3);
        assert!(ids[0] != ids[1] && ids[1] != ids[2] && ids[0] != ids[2]);

        form.set("numProperties", "1").expect("shrink");
        let shrunk = form.group("properties").expect("group");
        assert_eq!(shrunk.len(), 1);
        assert_eq!(shrunk.rows()[0], grown.rows()[0]);
    }

    #[test]
    fn non_numeric_count_empties_the_group() {
        let mut form = form();
        form.set("numProperties", "2").expect("set count");
        form.set("numProperties", "two").expect("set count");

        assert_eq!(form.group_len("properties").expect("group"), 0);
    }

    #[test]
    fn derived_field_follows_inputs_and_is_read_only() {
        let mut form = form();
        form.set("numProperties", "1").expect("set count");
        assert_eq!(form.get("properties.0.emptyRooms").expect("get"), &Value::text("0"));

        form.set("properties.0.totalRooms", "10").expect("set total");
        let changes = form.set("properties.0.filledRooms", "4").expect("set filled");
        assert_eq!(
            changes.derived,
            vec![FieldPath::parse("properties.0.emptyRooms").expect("path")]
        );
        assert_eq!(form.get("properties.0.emptyRooms").expect("get"), &Value::text("6"));

        form.set("properties.0.filledRooms", "").expect("clear filled");
        assert_eq!(form.get("properties.0.emptyRooms").expect("get"), &Value::text("10"));

        assert!(matches!(
            form.set("properties.0.emptyRooms", "3"),
            Err(EditError::ReadOnly { .. })
        ));
    }

    #[test]
    fn derivation_stays_within_its_row() {
        let mut form = form();
        form.set("numProperties", "2").expect("set count");
        form.set("properties.0.totalRooms", "9").expect("set total");

        assert_eq!(form.get("properties.0.emptyRooms").expect("get"), &Value::text("9"));
        assert_eq!(form.get("properties.1.emptyRooms").expect("get"), &Value::text("0"));
    }

    #[test]
    fn live_fields_report_on_change() {
        let mut form = form();
        let changes = form.set("contactNumber", "12345").expect("edit stands");

        assert_eq!(changes.issues, vec!["Enter a valid 10-digit phone number".to_string()]);
        assert_eq!(form.get("contactNumber").expect("get"), &Value::text("12345"));
    }

    #[test]
    fn validation_reports_everything_at_once() {
        let mut form = form();
        form.set("contactNumber", "12345").expect("set contact");
        form.set("numProperties", "1").expect("set count");
        form.set("properties.0.totalRooms", "8").expect("set total");
        form.set("properties.0.filledRooms", "20").expect("set filled");

        let err = form.validate().expect_err("form is invalid");
        let issues = err.issues();

        assert_eq!(issues.get("name"), ["Name is required".to_string()]);
        assert_eq!(
            issues.get("contactNumber"),
            ["Enter a valid 10-digit phone number".to_string()]
        );
        assert_eq!(
            issues.get("properties.0.filledRooms"),
            ["occupied cannot exceed total".to_string()]
        );
        assert!(!issues.contains("properties.0.totalRooms"));
        assert_eq!(
            issues.get("properties.0.address"),
            ["Address is required".to_string()]
        );
        assert_eq!(
            issues.get("contacts.0.number"),
            ["Contact Number is required".to_string()]
        );
    }

    #[test]
    fn form_validation_matches_record_validation() {
        let mut form = form();
        form.set("numProperties", "2").expect("set count");

        let from_form = form.validate().expect_err("form is invalid");
        let from_record = validate::validate(&form.schema().root, form.record())
            .expect_err("record is invalid");
        assert_eq!(from_form.issues(), from_record.issues());

        fill_valid(&mut form);
        assert!(form.validate().is_ok());
        assert!(validate::validate(&form.schema().root, form.record()).is_ok());
    }

    #[test]
    fn complete_record_validates_and_submits() {
        let mut form = form();
        fill_valid(&mut form);
        form.validate().expect("form should be valid");

        let mut sent = Vec::new();
        let receipt = form
            .submit(&mut |payload: &Payload| -> Result<(), TransportError> {
                sent.push(payload.clone());
                Ok(())
            })
            .expect("submission accepted");

        assert_eq!(receipt.form, "owner");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].get("properties.0.emptyRooms"), Some("6"));
        assert_eq!(sent[0].get("contacts.0.number"), Some("9123456780"));
    }

    #[test]
    fn invalid_record_never_reaches_transport() {
        let form = form();
        let mut calls = 0;

        let result = form.submit(&mut |_: &Payload| -> Result<(), TransportError> {
            calls += 1;
            Ok(())
        });

        assert!(matches!(result, Err(SubmitError::Invalid(_))));
        assert_eq!(calls, 0);
    }

    #[test]
    fn rejected_submission_leaves_record_intact() {
        let mut form = form();
        fill_valid(&mut form);
        let before = form.record().clone();

        let result = form.submit(&mut |_: &Payload| -> Result<(), TransportError> {
            Err(TransportError::Unreachable("connection refused".to_string()))
        });

        assert!(matches!(result, Err(SubmitError::Transport(_))));
        assert_eq!(form.record(), &before);
    }

    #[test]
    fn action_groups_add_and_remove_by_position() {
        let mut form = form();
        assert_eq!(form.group_len("contacts").expect("group"), 1);

        form.add_row("contacts").expect("add").expect("below cap");
        form.add_row("contacts").expect("add").expect("below cap");
        form.set("contacts.2.number", "9000000002").expect("set third");
        let ids = form.group("contacts").expect("group").ids();

        let removed = form.remove_row("contacts", 1).expect("remove");
        assert_eq!(removed, Some(ids[1]));
        assert_eq!(form.group("contacts").expect("group").ids(), vec![ids[0], ids[2]]);
        assert_eq!(form.get("contacts.1.number").expect("get"), &Value::text("9000000002"));
    }

    #[test]
    fn last_row_of_action_group_is_kept() {
        let mut form = form();

        assert_eq!(form.remove_row("contacts", 0).expect("no-op"), None);
        assert_eq!(form.group_len("contacts").expect("group"), 1);
        assert!(matches!(
            form.remove_row("contacts", 5),
            Err(EditError::RowOutOfRange { .. })
        ));
    }

    #[test]
    fn count_groups_refuse_explicit_actions() {
        let mut form = form();

        assert!(matches!(
            form.add_row("properties"),
            Err(EditError::CountDriven { .. })
        ));
    }

    #[test]
    fn bad_addresses_are_rejected() {
        let mut form = form();

        assert!(matches!(form.set("nope", "x"), Err(EditError::UnknownField { .. })));
        assert!(matches!(
            form.set("properties.0.address", "x"),
            Err(EditError::RowOutOfRange { .. })
        ));
        assert!(matches!(
            form.set("name", true),
            Err(EditError::KindMismatch { .. })
        ));
        assert!(matches!(form.set("name.0", "x"), Err(EditError::Path(_))));
    }

    #[test]
    fn reset_starts_over() {
        let mut form = form();
        fill_valid(&mut form);
        form.reset();

        assert!(form.get("name").expect("get").is_blank());
        assert_eq!(form.group_len("properties").expect("group"), 0);
    }
}
