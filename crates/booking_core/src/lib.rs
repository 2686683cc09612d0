pub mod catalog;
pub mod domain;
pub mod ports;
pub mod validate;
pub mod wizard;

pub use catalog::{CatalogError, PhoneCountry, ServiceCatalog, ServiceEntry};
pub use domain::{
    BookingForm, BookingId, BookingSession, WizardPhase, OTP_LENGTH, RESEND_COOLDOWN_SECS,
};
pub use ports::{BookingGateway, ChatGateway, GatewayError, GatewayResult};
pub use wizard::{BookingWizard, ResendOutcome, SubmitOutcome, TickOutcome, VerifyOutcome};
