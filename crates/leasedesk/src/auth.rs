//! Phone/OTP login.
//!
//! The flow is a small state machine: collect a phone number, ask the
//! backend to send a one-time code, then verify the code and start a
//! session with the token the backend returns. Every backend call goes
//! through a `Pending` guard so a double tap never sends twice.

use crate::{
    config::AuthConfig,
    pending::{Busy, Pending, Ticket},
    session::Session,
};
use leasedesk_core::submit::TransportError;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// AuthError
///

#[derive(Debug, ThisError)]
pub enum AuthError {
    #[error("Please enter a valid phone number")]
    InvalidPhone,

    #[error("Please enter a valid {len}-digit OTP")]
    InvalidOtp { len: usize },

    #[error("request an OTP before verifying")]
    OtpNotRequested,

    #[error(transparent)]
    Busy(#[from] Busy),

    #[error("Failed to send OTP. Please try again.")]
    SendFailed(#[source] TransportError),

    #[error("Invalid OTP. Please try again.")]
    VerifyFailed(#[source] TransportError),

    #[error("backend returned an empty session token")]
    EmptyToken,

    #[error("request was abandoned")]
    Abandoned,
}

///
/// AuthTransport
///

pub trait AuthTransport {
    fn send_otp(&mut self, phone: &str) -> Result<OtpDispatch, TransportError>;

    fn verify_otp(&mut self, phone: &str, otp: &str) -> Result<OtpVerified, TransportError>;
}

///
/// OtpDispatch
///
/// Backend reply to a send request. Development backends echo the code
/// back so it can be shown on screen.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct OtpDispatch {
    #[serde(default)]
    pub otp: Option<String>,
}

impl OtpDispatch {
    pub fn decode(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }
}

///
/// OtpVerified
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct OtpVerified {
    pub token: String,
}

impl OtpVerified {
    pub fn decode(body: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(body)
    }
}

///
/// LoginStage
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LoginStage {
    EnterPhone,
    AwaitingOtp {
        phone: String,
        demo_otp: Option<String>,
    },
    Authenticated,
}

///
/// SendRequest
/// A validated send-OTP call waiting on the transport.
///

#[derive(Debug)]
pub struct SendRequest {
    ticket: Ticket,
    pub phone: String,
}

///
/// VerifyRequest
///

#[derive(Debug)]
pub struct VerifyRequest {
    ticket: Ticket,
    pub phone: String,
    pub otp: String,
}

///
/// LoginFlow
///

#[derive(Debug)]
pub struct LoginFlow {
    config: AuthConfig,
    stage: LoginStage,
    pending: Pending,
}

impl LoginFlow {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            config: config.clone(),
            stage: LoginStage::EnterPhone,
            pending: Pending::new(),
        }
    }

    #[must_use]
    pub const fn stage(&self) -> &LoginStage {
        &self.stage
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.pending.is_busy()
    }

    /// Code echoed by a development backend, if any.
    #[must_use]
    pub fn demo_otp(&self) -> Option<&str> {
        match &self.stage {
            LoginStage::AwaitingOtp { demo_otp, .. } => demo_otp.as_deref(),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Send
    // ------------------------------------------------------------------

    /// Validate the phone number and claim the in-flight slot.
    pub fn begin_send(&mut self, phone: &str) -> Result<SendRequest, AuthError> {
        let phone = phone.trim();
        if !self.phone_ok(phone) {
            return Err(AuthError::InvalidPhone);
        }

        let ticket = self.pending.begin()?;

        Ok(SendRequest {
            ticket,
            phone: phone.to_string(),
        })
    }

    pub fn complete_send(
        &mut self,
        request: SendRequest,
        result: Result<OtpDispatch, TransportError>,
    ) -> Result<(), AuthError> {
        let result = self
            .pending
            .finish(request.ticket, result)
            .ok_or(AuthError::Abandoned)?;

        match result {
            Ok(dispatch) => {
                tracing::info!(demo = dispatch.otp.is_some(), "otp sent");
                self.stage = LoginStage::AwaitingOtp {
                    phone: request.phone,
                    demo_otp: dispatch.otp,
                };

                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "otp send failed");
                Err(AuthError::SendFailed(err))
            }
        }
    }

    pub fn send_otp(
        &mut self,
        phone: &str,
        transport: &mut dyn AuthTransport,
    ) -> Result<(), AuthError> {
        let request = self.begin_send(phone)?;
        let result = transport.send_otp(&request.phone);

        self.complete_send(request, result)
    }

    // ------------------------------------------------------------------
    // Verify
    // ------------------------------------------------------------------

    pub fn begin_verify(&mut self, otp: &str) -> Result<VerifyRequest, AuthError> {
        let LoginStage::AwaitingOtp { phone, .. } = &self.stage else {
            return Err(AuthError::OtpNotRequested);
        };

        let otp = otp.trim();
        if otp.len() != self.config.otp_len || !otp.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AuthError::InvalidOtp {
                len: self.config.otp_len,
            });
        }

        let phone = phone.clone();
        let ticket = self.pending.begin()?;

        Ok(VerifyRequest {
            ticket,
            phone,
            otp: otp.to_string(),
        })
    }

    /// Apply a verify result; on success the session is started.
    pub fn complete_verify(
        &mut self,
        request: VerifyRequest,
        result: Result<OtpVerified, TransportError>,
        session: &mut Session,
    ) -> Result<(), AuthError> {
        let result = self
            .pending
            .finish(request.ticket, result)
            .ok_or(AuthError::Abandoned)?;

        match result {
            Ok(verified) if verified.token.trim().is_empty() => Err(AuthError::EmptyToken),
            Ok(verified) => {
                session.login(verified.token);
                self.stage = LoginStage::Authenticated;
                tracing::info!("login complete");

                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "otp verification failed");
                Err(AuthError::VerifyFailed(err))
            }
        }
    }

    pub fn verify_otp(
        &mut self,
        otp: &str,
        transport: &mut dyn AuthTransport,
        session: &mut Session,
    ) -> Result<(), AuthError> {
        let request = self.begin_verify(otp)?;
        let result = transport.verify_otp(&request.phone, &request.otp);

        self.complete_verify(request, result, session)
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Go back to phone entry, dropping any outstanding request.
    pub fn change_number(&mut self) {
        self.pending.abandon();
        self.stage = LoginStage::EnterPhone;
    }

    pub fn logout(&mut self, session: &mut Session) {
        self.change_number();
        session.logout();
    }

    fn phone_ok(&self, phone: &str) -> bool {
        let digits = phone.strip_prefix('+').unwrap_or(phone);

        digits.len() >= self.config.phone_min_len && digits.bytes().all(|b| b.is_ascii_digit())
    }
}

///
/// TESTS
///
