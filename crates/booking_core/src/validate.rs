//! crates/booking_core/src/validate.rs
//!
//! Client-side input policy for the booking form. Validation here blocks a
//! submission before any network call is made; free-form inputs like the
//! phone number are sanitized as typed rather than rejected with an error.

use crate::catalog::ServiceCatalog;
use crate::domain::{BookingForm, OTP_LENGTH};
use regex::Regex;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Why a form cannot be submitted yet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("email address looks invalid")]
    BadEmail,
    #[error("unknown service")]
    UnknownService,
    #[error("selected package does not belong to the selected service")]
    PackageMismatch,
    #[error("unknown phone country")]
    UnknownPhoneCountry,
}

/// Keeps only ASCII digits, in order. Applied to the phone number as the
/// user types it.
pub fn digits_only(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Keeps only ASCII digits and caps the result at the OTP length.
pub fn sanitize_otp(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(OTP_LENGTH)
        .collect()
}

/// Structural shape check for an email address.
pub fn email_shape_ok(email: &str) -> bool {
    Regex::new(EMAIL_PATTERN).unwrap().is_match(email)
}

/// Checks the required-field and format preconditions for submitting the
/// form. The free-text message is the only optional field.
pub fn validate_form(form: &BookingForm, catalog: &ServiceCatalog) -> Result<(), FormError> {
    if form.service.trim().is_empty() {
        return Err(FormError::Missing("service"));
    }
    if form.package.trim().is_empty() {
        return Err(FormError::Missing("package"));
    }
    if form.name.trim().is_empty() {
        return Err(FormError::Missing("name"));
    }
    if form.email.trim().is_empty() {
        return Err(FormError::Missing("email"));
    }
    if form.phone_digits.is_empty() {
        return Err(FormError::Missing("phone number"));
    }
    if form.service_country.trim().is_empty() {
        return Err(FormError::Missing("service country"));
    }
    if form.address.trim().is_empty() {
        return Err(FormError::Missing("address"));
    }
    if form.pincode.trim().is_empty() {
        return Err(FormError::Missing("pincode"));
    }
    if form.preferred_date.is_none() {
        return Err(FormError::Missing("preferred date"));
    }

    if !email_shape_ok(&form.email) {
        return Err(FormError::BadEmail);
    }
    if catalog.packages_for(&form.service).is_none() {
        return Err(FormError::UnknownService);
    }
    if !catalog.is_valid_package(&form.service, &form.package) {
        return Err(FormError::PackageMismatch);
    }
    if catalog.calling_code(&form.phone_country).is_none() {
        return Err(FormError::UnknownPhoneCountry);
    }

    Ok(())
}
