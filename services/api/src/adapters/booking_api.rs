//! services/api/src/adapters/booking_api.rs
//!
//! This module contains the adapter for the external booking backend.
//! It implements the `BookingGateway` port from the `core` crate over
//! JSON/HTTPS.

use async_trait::async_trait;
use booking_core::{
    BookingForm, BookingGateway, BookingId, GatewayError, GatewayResult, ServiceCatalog,
};
use chrono::NaiveDate;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

//=========================================================================================
// Wire Payloads
//=========================================================================================

/// The booking-request body, as the backend expects it. `phone` is the
/// computed full number: calling code concatenated with the national digits.
#[derive(Serialize)]
struct BookingRequestPayload<'a> {
    service: &'a str,
    package: &'a str,
    name: &'a str,
    email: &'a str,
    phone_country: &'a str,
    phone: String,
    country: &'a str,
    address: &'a str,
    pincode: &'a str,
    preferred_date: Option<NaiveDate>,
    message: &'a str,
    /// Present only on resend, so the backend refreshes the same session.
    #[serde(skip_serializing_if = "Option::is_none")]
    booking_id: Option<&'a str>,
}

#[derive(Serialize)]
struct VerifyOtpPayload<'a> {
    booking_id: &'a str,
    otp: &'a str,
}

#[derive(Deserialize)]
struct BookingRequestResponse {
    booking_id: String,
}

/// Shape of an error body; the backend may or may not include `detail`.
#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

/// Maps a non-2xx response to a gateway error, preferring the backend's
/// `detail` message when the body carries one.
pub(crate) async fn rejection_from(response: Response) -> GatewayError {
    let status = response.status();
    match response.json::<ErrorBody>().await {
        Ok(ErrorBody {
            detail: Some(detail),
        }) => GatewayError::Rejected(detail),
        _ => GatewayError::Unavailable(format!("backend answered {}", status)),
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `BookingGateway` port against the studio's
/// booking backend.
#[derive(Clone)]
pub struct HttpBookingGateway {
    client: Client,
    base_url: String,
    catalog: Arc<ServiceCatalog>,
}

impl HttpBookingGateway {
    /// Creates a new `HttpBookingGateway`. The catalog is needed to resolve
    /// the phone country into its calling code.
    pub fn new(client: Client, base_url: &str, catalog: Arc<ServiceCatalog>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            catalog,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn full_phone(&self, form: &BookingForm) -> String {
        let code = self.catalog.calling_code(&form.phone_country).unwrap_or("");
        format!("{}{}", code, form.phone_digits)
    }
}

//=========================================================================================
// `BookingGateway` Trait Implementation
//=========================================================================================

#[async_trait]
impl BookingGateway for HttpBookingGateway {
    async fn request_otp(
        &self,
        form: &BookingForm,
        resend_of: Option<&BookingId>,
    ) -> GatewayResult<BookingId> {
        let payload = BookingRequestPayload {
            service: &form.service,
            package: &form.package,
            name: &form.name,
            email: &form.email,
            phone_country: &form.phone_country,
            phone: self.full_phone(form),
            country: &form.service_country,
            address: &form.address,
            pincode: &form.pincode,
            preferred_date: form.preferred_date,
            message: &form.message,
            booking_id: resend_of.map(|id| id.as_str()),
        };

        debug!(resend = resend_of.is_some(), "Submitting booking request");
        let response = self
            .client
            .post(self.url("/bookings/request"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(rejection_from(response).await);
        }

        let body: BookingRequestResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;
        Ok(BookingId(body.booking_id))
    }

    async fn verify_otp(&self, booking_id: &BookingId, otp: &str) -> GatewayResult<()> {
        let payload = VerifyOtpPayload {
            booking_id: booking_id.as_str(),
            otp,
        };

        debug!(%booking_id, "Verifying OTP");
        let response = self
            .client
            .post(self.url("/bookings/verify-otp"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(rejection_from(response).await);
        }
        // The success body carries nothing the wizard needs.
        Ok(())
    }
}
