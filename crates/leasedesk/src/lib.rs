//! ## Crate layout
//! - `core`: the form engine (schemas, records, synchronizer, derived
//!   fields, validator, submission boundary, observability).
//! - `auth`: phone/OTP login flow over an `AuthTransport`.
//! - `catalog`: the console's built-in form schemas.
//! - `config`: console configuration loaded from TOML.
//! - `dashboard`: revenue and rent-status reads with sample-data fallback.
//! - `error`: public error taxonomy for everything above.
//! - `pending`: single in-flight request guard for UI controls.
//! - `session`: the explicit bearer-token session.

pub use leasedesk_core as core;

pub mod auth;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod pending;
pub mod session;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::Error;

///
/// Console Prelude
///

pub mod prelude {
    pub use crate::{
        auth::{AuthTransport, LoginFlow, LoginStage},
        catalog,
        config::ConsoleConfig,
        core::{
            prelude::*,
            submit::{Payload, SubmitTransport, TransportError},
            validate::Issues,
        },
        dashboard::{Dashboard, DashboardTransport, DataSource},
        session::Session,
    };
}
