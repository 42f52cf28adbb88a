use crate::schema::RecordSchema;
use serde::{Deserialize, Serialize};

///
/// Membership
///
/// How a group's length is governed.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum Membership {
    /// Length mirrors a `Count` field in the same record.
    CountDriven { count_field: String },

    /// Length changes only through add/remove; never drops below `min_len`.
    ActionDriven { min_len: usize },
}

///
/// GroupSpec
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GroupSpec {
    pub name: String,
    pub label: String,
    pub membership: Membership,
    pub row: RecordSchema,
}

impl GroupSpec {
    #[must_use]
    pub fn count_driven(
        name: impl Into<String>,
        label: impl Into<String>,
        count_field: impl Into<String>,
        row: RecordSchema,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            membership: Membership::CountDriven {
                count_field: count_field.into(),
            },
            row,
        }
    }

    #[must_use]
    pub fn action_driven(
        name: impl Into<String>,
        label: impl Into<String>,
        min_len: usize,
        row: RecordSchema,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            membership: Membership::ActionDriven { min_len },
            row,
        }
    }

    #[must_use]
    pub fn count_field(&self) -> Option<&str> {
        match &self.membership {
            Membership::CountDriven { count_field } => Some(count_field),
            Membership::ActionDriven { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_count_driven(&self) -> bool {
        matches!(self.membership, Membership::CountDriven { .. })
    }

    /// Floor for explicit removals. Count-driven groups have none.
    #[must_use]
    pub const fn min_len(&self) -> usize {
        match self.membership {
            Membership::ActionDriven { min_len } => min_len,
            Membership::CountDriven { .. } => 0,
        }
    }
}
