use crate::{auth::AuthError, config::ConfigError, dashboard::DashboardError};
use derive_more::Display;
use leasedesk_core::{
    error::Error as CoreError, form::EditError, schema::SchemaError, submit::SubmitError,
    validate::ValidateError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// Whether the user can simply try the same action again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Transport | ErrorKind::Busy)
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Self::new(ErrorKind::Internal, ErrorOrigin::Schema, err.to_string())
    }
}

impl From<EditError> for Error {
    fn from(err: EditError) -> Self {
        Self::new(
            ErrorKind::Input(InputErrorKind::Edit),
            ErrorOrigin::Form,
            err.to_string(),
        )
    }
}

impl From<ValidateError> for Error {
    fn from(err: ValidateError) -> Self {
        Self::new(
            ErrorKind::Input(InputErrorKind::Validation),
            ErrorOrigin::Form,
            err.to_string(),
        )
    }
}

impl From<SubmitError> for Error {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Invalid(err) => err.into(),
            SubmitError::Transport(inner) => Self::new(
                ErrorKind::Transport,
                ErrorOrigin::Submit,
                format!("submission failed: {inner}"),
            ),
        }
    }
}

impl From<CoreError> for Error {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Schema(err) => err.into(),
            CoreError::Edit(err) => err.into(),
            CoreError::Validate(err) => err.into(),
            CoreError::Submit(err) => err.into(),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string())
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        let kind = match &err {
            AuthError::InvalidPhone | AuthError::InvalidOtp { .. } | AuthError::OtpNotRequested => {
                ErrorKind::Input(InputErrorKind::Auth)
            }
            AuthError::Busy(_) => ErrorKind::Busy,
            AuthError::SendFailed(_) | AuthError::VerifyFailed(_) | AuthError::EmptyToken => {
                ErrorKind::Transport
            }
            AuthError::Abandoned => ErrorKind::Internal,
        };

        Self::new(kind, ErrorOrigin::Auth, err.to_string())
    }
}

impl From<DashboardError> for Error {
    fn from(err: DashboardError) -> Self {
        Self::new(ErrorKind::Transport, ErrorOrigin::Dashboard, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Something the user typed; fix it and try again.
    Input(InputErrorKind),

    /// Backend rejected the call or could not be reached.
    Transport,

    /// The control already has a request in flight.
    Busy,

    Config,

    /// The caller cannot remediate this.
    Internal,
}

///
/// InputErrorKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum InputErrorKind {
    /// Edit addressed a missing or read-only field, or had the wrong shape.
    Edit,

    /// Submit-time validation found violations.
    Validation,

    /// Phone number or OTP failed the local checks.
    Auth,
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    #[display("auth")]
    Auth,
    #[display("config")]
    Config,
    #[display("dashboard")]
    Dashboard,
    #[display("form")]
    Form,
    #[display("schema")]
    Schema,
    #[display("submit")]
    Submit,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use leasedesk_core::submit::TransportError;

    #[test]
    fn transport_failures_are_retryable() {
        let err: Error = SubmitError::Transport(TransportError::Unreachable(
            "timed out".to_string(),
        ))
        .into();

        assert_eq!(err.kind, ErrorKind::Transport);
        assert_eq!(err.origin, ErrorOrigin::Submit);
        assert!(err.is_retryable());
        assert_eq!(err.origin.to_string(), "submit");
    }

    #[test]
    fn auth_input_errors_are_not_retryable() {
        let err: Error = AuthError::InvalidPhone.into();

        assert_eq!(err.kind, ErrorKind::Input(InputErrorKind::Auth));
        assert!(!err.is_retryable());
        assert_eq!(err.message, "Please enter a valid phone number");
    }
}
