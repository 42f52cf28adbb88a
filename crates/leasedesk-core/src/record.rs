use crate::{
    derive,
    id::{IdGenerator, RowId},
    schema::{Membership, RecordSchema},
    sync,
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

static EMPTY: Value = Value::Empty;

///
/// Record
///
/// Field values plus named repeated groups. Used both for the form root
/// and for every group row.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Record {
    fields: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    groups: BTreeMap<String, Group>,
}

impl Record {
    /// A fresh record: defaults applied, derived fields computed, count
    /// groups sized from their count default and action groups seeded to
    /// their minimum.
    pub(crate) fn blank(schema: &RecordSchema, ids: &mut IdGenerator) -> Self {
        let mut record = Self::default();

        for field in &schema.fields {
            record.put(&field.name, field.initial_value());
        }
        derive::recompute_all(schema, &mut record);

        for spec in &schema.groups {
            let len = match &spec.membership {
                Membership::CountDriven { count_field } => {
                    sync::target_len(record.value(count_field))
                }
                Membership::ActionDriven { min_len } => *min_len,
            };

            let mut group = Group::default();
            sync::resize(&mut group, len, &spec.row, ids);
            record.groups.insert(spec.name.clone(), group);
        }

        record
    }

    /// Current value of a field; unknown names read as `Empty`.
    #[must_use]
    pub fn value(&self, name: &str) -> &Value {
        self.fields.get(name).unwrap_or(&EMPTY)
    }

    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &Group)> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn put(&mut self, name: &str, value: Value) {
        match self.fields.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }

    pub(crate) fn group_mut(&mut self, name: &str) -> Option<&mut Group> {
        self.groups.get_mut(name)
    }
}

///
/// Group
///
/// Ordered rows of one repeated group.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Group {
    rows: Vec<Row>,
}

impl Group {
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    #[must_use]
    pub fn ids(&self) -> Vec<RowId> {
        self.rows.iter().map(Row::id).collect()
    }

    pub(crate) fn row_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    pub(crate) const fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }
}

///
/// Row
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Row {
    id: RowId,
    record: Record,
}

impl Row {
    pub(crate) const fn new(id: RowId, record: Record) -> Self {
        Self { id, record }
    }

    #[must_use]
    pub const fn id(&self) -> RowId {
        self.id
    }

    #[must_use]
    pub const fn record(&self) -> &Record {
        &self.record
    }

    #[must_use]
    pub fn value(&self, name: &str) -> &Value {
        self.record.value(name)
    }

    pub(crate) const fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}
