//! List synchronizer.
//!
//! Keeps a group's length in line with its count field, or applies explicit
//! add/remove actions. Growth appends blank rows with fresh ids; shrinking
//! drops rows from the tail; a positional removal shifts later rows up
//! without touching their ids or values.

use crate::{
    MAX_GROUP_ROWS,
    id::{IdGenerator, RowId},
    record::{Group, Record, Row},
    schema::RecordSchema,
    value::Value,
};
use serde::Serialize;
use std::cmp::Ordering;

///
/// Resize
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct Resize {
    pub from: usize,
    pub to: usize,
}

///
/// Removal
///

#[derive(Debug)]
pub enum Removal {
    Removed(Row),
    AtMinimum,
    OutOfRange,
}

/// Group length a count value asks for.
///
/// Blank, non-numeric and negative input all mean zero; anything above
/// `MAX_GROUP_ROWS` is held at the cap.
#[must_use]
pub fn target_len(count: &Value) -> usize {
    let n = count.parse_int().unwrap_or(0).max(0);

    usize::try_from(n).map_or(MAX_GROUP_ROWS, |n| n.min(MAX_GROUP_ROWS))
}

/// Resize `group` to `len` rows. Returns `None` when nothing changed.
pub(crate) fn resize(
    group: &mut Group,
    len: usize,
    row_schema: &RecordSchema,
    ids: &mut IdGenerator,
) -> Option<Resize> {
    let from = group.len();
    let to = len.min(MAX_GROUP_ROWS);

    match to.cmp(&from) {
        Ordering::Equal => return None,
        Ordering::Greater => {
            let rows = group.rows_mut();
            rows.reserve(to - from);
            for _ in from..to {
                rows.push(blank_row(row_schema, ids));
            }
        }
        Ordering::Less => group.rows_mut().truncate(to),
    }

    Some(Resize { from, to })
}

/// Append one blank row, unless the group is already at the cap.
pub(crate) fn push(
    group: &mut Group,
    row_schema: &RecordSchema,
    ids: &mut IdGenerator,
) -> Option<RowId> {
    if group.len() >= MAX_GROUP_ROWS {
        return None;
    }

    let row = blank_row(row_schema, ids);
    let id = row.id();
    group.rows_mut().push(row);

    Some(id)
}

/// Remove the row at `index`, keeping at least `min_len` rows.
pub(crate) fn remove(group: &mut Group, index: usize, min_len: usize) -> Removal {
    if index >= group.len() {
        return Removal::OutOfRange;
    }
    if group.len() <= min_len {
        return Removal::AtMinimum;
    }

    Removal::Removed(group.rows_mut().remove(index))
}

fn blank_row(row_schema: &RecordSchema, ids: &mut IdGenerator) -> Row {
    let id = ids.generate();

    Row::new(id, Record::blank(row_schema, ids))
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;
    use proptest::prelude::*;

    fn row_schema() -> RecordSchema {
        RecordSchema::new()
            .with_field(FieldSpec::text("name", "Name"))
            .with_field(FieldSpec::text("relationship", "Relationship"))
    }

    fn group_of(len: usize, ids: &mut IdGenerator) -> Group {
        let mut group = Group::default();
        resize(&mut group, len, &row_schema(), ids);
        group
    }

    #[test]
    fn count_input_is_clamped() {
        assert_eq!(target_len(&Value::text("3")), 3);
        assert_eq!(target_len(&Value::text(" 2 ")), 2);
        assert_eq!(target_len(&Value::text("-4")), 0);
        assert_eq!(target_len(&Value::text("three")), 0);
        assert_eq!(target_len(&Value::Empty), 0);
        assert_eq!(target_len(&Value::text("99999999999")), MAX_GROUP_ROWS);
    }

    #[test]
    fn resize_to_same_length_is_a_no_op() {
        let mut ids = IdGenerator::seeded(3);
        let mut group = group_of(2, &mut ids);
        let before = group.clone();

        assert_eq!(resize(&mut group, 2, &row_schema(), &mut ids), None);
        assert_eq!(group, before);
    }

    #[test]
    fn positional_remove_keeps_survivor_ids() {
        let mut ids = IdGenerator::seeded(4);
        let mut group = group_of(3, &mut ids);
        let original = group.ids();

        let Removal::Removed(row) = remove(&mut group, 1, 1) else {
            panic!("middle row should be removed");
        };

        assert_eq!(row.id(), original[1]);
        assert_eq!(group.ids(), vec![original[0], original[2]]);
    }

    #[test]
    fn remove_respects_minimum_and_bounds() {
        let mut ids = IdGenerator::seeded(5);
        let mut group = group_of(1, &mut ids);

        assert!(matches!(remove(&mut group, 0, 1), Removal::AtMinimum));
        assert!(matches!(remove(&mut group, 4, 1), Removal::OutOfRange));
        assert_eq!(group.len(), 1);
    }

    #[test]
    fn push_stops_at_cap() {
        let mut ids = IdGenerator::seeded(6);
        let mut group = group_of(MAX_GROUP_ROWS, &mut ids);

        assert_eq!(push(&mut group, &row_schema(), &mut ids), None);
        assert_eq!(group.len(), MAX_GROUP_ROWS);
    }

    proptest! {
        #[test]
        fn resize_is_idempotent(start in 0usize..20, n in 0usize..20) {
            let mut ids = IdGenerator::seeded(8);
            let mut group = group_of(start, &mut ids);

            resize(&mut group, n, &row_schema(), &mut ids);
            let once = group.clone();
            resize(&mut group, n, &row_schema(), &mut ids);

            prop_assert_eq!(group.len(), n);
            prop_assert_eq!(group, once);
        }

        #[test]
        fn growth_preserves_prefix(k in 0usize..15, extra in 1usize..15) {
            let mut ids = IdGenerator::seeded(9);
            let mut group = group_of(k, &mut ids);
            let before = group.rows().to_vec();

            resize(&mut group, k + extra, &row_schema(), &mut ids);

            prop_assert_eq!(&group.rows()[..k], &before[..]);
            let all = group.ids();
            let distinct: std::collections::BTreeSet<_> = all.iter().collect();
            prop_assert_eq!(distinct.len(), all.len());
            for row in &group.rows()[k..] {
                prop_assert!(row.value("name").is_blank());
                prop_assert!(row.value("relationship").is_blank());
            }
        }

        #[test]
        fn shrink_keeps_leading_rows(m in 1usize..20, cut in 1usize..20) {
            let k = m.saturating_sub(cut);
            let mut ids = IdGenerator::seeded(10);
            let mut group = group_of(m, &mut ids);
            let before = group.rows().to_vec();

            resize(&mut group, k, &row_schema(), &mut ids);

            prop_assert_eq!(group.rows(), &before[..k]);
        }
    }
}
