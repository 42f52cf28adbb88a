use crate::{form::EditError, schema::SchemaError, submit::SubmitError, validate::ValidateError};
use thiserror::Error as ThisError;

///
/// Error
///
/// Umbrella over the engine's per-module errors.
/// Callers that only need to bubble a failure up can `?` into this.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Validate(#[from] ValidateError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}
