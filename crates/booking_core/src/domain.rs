//! crates/booking_core/src/domain.rs
//!
//! Defines the pure, core data structures for the booking flow.
//! These structs are independent of any transport or serialization format.

use chrono::NaiveDate;
use std::fmt;

/// Seconds a user must wait before requesting a fresh OTP.
pub const RESEND_COOLDOWN_SECS: u32 = 30;

/// Exact number of digits in a one-time password.
pub const OTP_LENGTH: usize = 6;

/// Opaque identifier issued by the booking backend. It correlates a booking
/// request, its OTP delivery, and the verification call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingId(pub String);

impl BookingId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The user-entered booking form.
///
/// `phone_digits` holds the national number only; the full phone value sent
/// to the backend is the country's calling code concatenated with these
/// digits. An empty `message` means the user left the free-text field blank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingForm {
    pub service: String,
    pub package: String,
    pub name: String,
    pub email: String,
    /// ISO code of an entry in the catalog's phone-country list.
    pub phone_country: String,
    pub phone_digits: String,
    pub service_country: String,
    pub address: String,
    pub pincode: String,
    pub preferred_date: Option<NaiveDate>,
    pub message: String,
}

/// Transient state tied to one in-flight booking attempt.
///
/// Created when the OTP request succeeds and destroyed when verification
/// succeeds or the user abandons the OTP step.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingSession {
    pub booking_id: BookingId,
    /// OTP code as typed so far: 0 to [`OTP_LENGTH`] digits, numeric only.
    pub otp_input: String,
    /// Present only after a failed verification or resend.
    pub error: Option<String>,
    pub cooldown_secs: u32,
    /// True exactly once the cooldown has reached zero.
    pub resend_allowed: bool,
}

impl BookingSession {
    /// Opens a fresh session with the cooldown running.
    pub fn new(booking_id: BookingId) -> Self {
        Self {
            booking_id,
            otp_input: String::new(),
            error: None,
            cooldown_secs: RESEND_COOLDOWN_SECS,
            resend_allowed: false,
        }
    }
}

/// Where the booking wizard currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardPhase {
    /// Editing the form; no request sent.
    Idle,
    /// The OTP request succeeded; the OTP step is open and the cooldown runs.
    AwaitingOtp,
    /// A verification call is in flight.
    Verifying,
    /// Verification confirmed; auto-returns to `Idle` after a fixed delay.
    Succeeded,
}
