//! Console configuration.
//!
//! Everything environment-specific lives here: where the backend is, which
//! paths it serves, and the local checks the login screen applies. Unknown
//! keys are rejected so a typo never silently falls back to a default.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// Endpoint
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Endpoint {
    #[display("send-otp")]
    SendOtp,
    #[display("verify-otp")]
    VerifyOtp,
    #[display("revenue")]
    Revenue,
    #[display("rent-status")]
    RentStatus,
}

///
/// ConsoleConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConsoleConfig {
    /// Scheme and host of the backend, without a trailing slash.
    pub backend_url: String,
    pub auth: AuthConfig,
    pub dashboard: DashboardConfig,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8000".to_string(),
            auth: AuthConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

impl ConsoleConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.check()?;

        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        let url = self.backend_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "backend_url '{url}' must start with http:// or https://"
            )));
        }
        if url.ends_with('/') {
            return Err(ConfigError::Invalid(format!(
                "backend_url '{url}' must not end with '/'"
            )));
        }

        if self.auth.phone_min_len == 0 {
            return Err(ConfigError::Invalid(
                "auth.phone_min_len must be greater than zero".to_string(),
            ));
        }
        if self.auth.otp_len == 0 {
            return Err(ConfigError::Invalid(
                "auth.otp_len must be greater than zero".to_string(),
            ));
        }

        for path in [
            &self.auth.send_otp_path,
            &self.auth.verify_otp_path,
            &self.dashboard.revenue_path,
            &self.dashboard.rent_status_path,
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "endpoint path '{path}' must start with '/'"
                )));
            }
        }

        Ok(())
    }

    /// Absolute URL for one backend endpoint.
    #[must_use]
    pub fn endpoint(&self, endpoint: Endpoint) -> String {
        let path = match endpoint {
            Endpoint::SendOtp => &self.auth.send_otp_path,
            Endpoint::VerifyOtp => &self.auth.verify_otp_path,
            Endpoint::Revenue => &self.dashboard.revenue_path,
            Endpoint::RentStatus => &self.dashboard.rent_status_path,
        };

        format!("{}{path}", self.backend_url)
    }
}

///
/// AuthConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    pub send_otp_path: String,
    pub verify_otp_path: String,
    pub phone_min_len: usize,
    pub otp_len: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            send_otp_path: "/api/auth/send-otp".to_string(),
            verify_otp_path: "/api/auth/verify-otp".to_string(),
            phone_min_len: 10,
            otp_len: 6,
        }
    }
}

///
/// DashboardConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub revenue_path: String,
    pub rent_status_path: String,

    /// Show bundled sample data when the backend cannot be read.
    pub sample_fallback: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            revenue_path: "/api/dashboard/revenue".to_string(),
            rent_status_path: "/api/dashboard/rent-status".to_string(),
            sample_fallback: true,
        }
    }
}

///
/// TESTS
///
