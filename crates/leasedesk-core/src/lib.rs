//! Form engine for LeaseDesk: schemas, records, the list synchronizer, the
//! derived field engine, the validator and the submission boundary.
#![warn(unreachable_pub)]

pub mod derive;
pub mod error;
pub mod form;
pub mod id;
pub mod obs;
pub mod path;
pub mod pattern;
pub mod record;
pub mod schema;
pub mod submit;
pub mod sync;
pub mod validate;
pub mod value;

///
/// CONSTANTS
///

/// Upper bound on the number of rows a single group may hold.
///
/// Count fields are typed by users; anything above this is clamped by the
/// synchronizer and reported by the validator.
pub const MAX_GROUP_ROWS: usize = 256;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, transports, or sinks are re-exported here.
///

pub mod prelude {
    pub use crate::{
        derive::Derivation,
        form::{ChangeSet, Form},
        id::RowId,
        path::FieldPath,
        pattern::Pattern,
        record::{Group, Record, Row},
        schema::{
            Comparison, FieldKind, FieldSpec, FormSchema, GroupSpec, Membership, RecordSchema,
            Rule,
        },
        value::Value,
    };
}
