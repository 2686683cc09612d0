//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the site UI and the
//! gateway for the booking wizard. One connection drives one wizard.

use booking_core::BookingForm;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The booking form exactly as the UI submits it. Sanitization (digit
/// stripping, stale-package clearing) happens in the wizard, not here.
#[derive(Deserialize, Debug, Clone)]
pub struct BookingFormPayload {
    pub service: String,
    pub package: String,
    pub name: String,
    pub email: String,
    /// ISO code of an entry in the phone-country list.
    pub phone_country: String,
    pub phone_number: String,
    pub service_country: String,
    pub address: String,
    pub pincode: String,
    /// ISO `YYYY-MM-DD`; absent while the user has not picked a date.
    pub preferred_date: Option<NaiveDate>,
    #[serde(default)]
    pub message: String,
}

impl From<BookingFormPayload> for BookingForm {
    fn from(payload: BookingFormPayload) -> Self {
        BookingForm {
            service: payload.service,
            package: payload.package,
            name: payload.name,
            email: payload.email,
            phone_country: payload.phone_country,
            phone_digits: payload.phone_number,
            service_country: payload.service_country,
            address: payload.address,
            pincode: payload.pincode,
            preferred_date: payload.preferred_date,
            message: payload.message,
        }
    }
}

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Submits the completed form; on success the OTP step opens.
    SubmitBooking { form: BookingFormPayload },

    /// Mirrors the OTP field as the user types.
    OtpInput { value: String },

    /// Asks to verify the entered six-digit code.
    SubmitOtp,

    /// Requests a fresh OTP once the resend cooldown has elapsed.
    ResendOtp,

    /// The user closed the OTP step without verifying.
    CloseOtp,
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The booking request succeeded; the UI should open the OTP step.
    OtpRequired { booking_id: String },

    /// The wizard is (back) in the editing state with an error to display
    /// on the form: a failed booking request or an abandoned OTP step.
    BookingFailed { message: String },

    /// Verification or resend failed; the OTP step stays open and shows
    /// this message.
    OtpRejected { message: String },

    /// One second of the resend cooldown elapsed.
    CooldownTick { seconds_left: u32 },

    /// The cooldown reached zero; the resend button may be enabled.
    ResendReady,

    /// A fresh OTP was issued for the same booking session.
    OtpResent,

    /// The OTP was verified; the booking is confirmed.
    BookingConfirmed,

    /// The wizard returned to its empty initial state.
    FormReset,

    /// A malformed or out-of-place client message.
    Error { message: String },
}
