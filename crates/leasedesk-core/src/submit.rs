//! Submission boundary.
//!
//! A record leaves the engine only after it validates. The transport gets a
//! flattened copy; the form itself is never modified here, so a failed
//! submission leaves everything in place for the user to retry.

use crate::{
    form::Form,
    obs::{self, FormEvent},
    validate::ValidateError,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// TransportError
///
/// Failure reported by any backend transport.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
pub enum TransportError {
    #[error("backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("backend unreachable: {0}")]
    Unreachable(String),
}

///
/// SubmitError
///

#[derive(Debug, ThisError)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ValidateError),

    #[error("submission failed: {0}")]
    Transport(#[from] TransportError),
}

///
/// Payload
///
/// Flattened record: every field under its dotted path, rendered as text.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Payload {
    pub form: String,
    pub fields: BTreeMap<String, String>,
}

impl Payload {
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&str> {
        self.fields.get(path).map(String::as_str)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

///
/// Receipt
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Receipt {
    pub form: String,
    pub fields: usize,
}

///
/// SubmitTransport
///
/// Delivers a payload to the backend. At most one attempt per call; any
/// retry is the user's decision.
///

pub trait SubmitTransport {
    fn send(&mut self, payload: &Payload) -> Result<(), TransportError>;
}

impl<F> SubmitTransport for F
where
    F: FnMut(&Payload) -> Result<(), TransportError>,
{
    fn send(&mut self, payload: &Payload) -> Result<(), TransportError> {
        self(payload)
    }
}

pub(crate) fn submit(
    form: &Form,
    transport: &mut dyn SubmitTransport,
) -> Result<Receipt, SubmitError> {
    if let Err(err) = form.validate() {
        obs::record(FormEvent::SubmitBlocked {
            issues: err.issues().total(),
        });

        return Err(err.into());
    }

    let payload = form.flatten();
    let fields = payload.fields.len();

    match transport.send(&payload) {
        Ok(()) => {
            obs::record(FormEvent::SubmitAccepted);
            tracing::info!(form = %payload.form, fields, "record submitted");

            Ok(Receipt {
                form: payload.form,
                fields,
            })
        }
        Err(err) => {
            obs::record(FormEvent::SubmitFailed);
            tracing::warn!(form = %payload.form, error = %err, "record submission failed");

            Err(err.into())
        }
    }
}
