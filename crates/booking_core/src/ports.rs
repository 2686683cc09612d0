//! crates/booking_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the booking flow.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to stay independent of the concrete HTTP backends.

use async_trait::async_trait;
use crate::domain::{BookingForm, BookingId};

//=========================================================================================
// Generic Gateway Error and Result Types
//=========================================================================================

/// A generic error type for all gateway operations.
///
/// Network failures and non-2xx responses are treated uniformly as request
/// failures; the only distinction the wizard needs is whether the backend
/// supplied a human-readable detail message.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The backend rejected the call and supplied a detail message.
    #[error("{0}")]
    Rejected(String),
    /// The call failed without a usable detail message (transport error,
    /// malformed body, or a detail-less non-2xx response).
    #[error("request failed: {0}")]
    Unavailable(String),
}

/// A convenience type alias for `Result<T, GatewayError>`.
pub type GatewayResult<T> = Result<T, GatewayError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait BookingGateway: Send + Sync {
    /// Submits a booking request so the backend issues and delivers an OTP.
    ///
    /// `resend_of` carries the existing booking identifier when the user asks
    /// for a fresh OTP, so the backend associates it with the same session.
    /// Returns the booking identifier for the session.
    async fn request_otp(
        &self,
        form: &BookingForm,
        resend_of: Option<&BookingId>,
    ) -> GatewayResult<BookingId>;

    /// Confirms the booking with the OTP the user entered.
    async fn verify_otp(&self, booking_id: &BookingId, otp: &str) -> GatewayResult<()>;
}

#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Forwards one visitor message to the chat backend and returns its reply.
    async fn send_message(&self, message: &str) -> GatewayResult<String>;
}
