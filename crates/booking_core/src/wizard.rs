//! crates/booking_core/src/wizard.rs
//!
//! The booking wizard state machine: form submission, OTP entry with a
//! resend cooldown, verification, and the success/abandon exits. The gateway
//! is injected behind the [`BookingGateway`] port so the whole flow can be
//! driven against a fake backend in tests.

use std::sync::Arc;

use crate::catalog::ServiceCatalog;
use crate::domain::{
    BookingForm, BookingId, BookingSession, WizardPhase, OTP_LENGTH, RESEND_COOLDOWN_SECS,
};
use crate::ports::{BookingGateway, GatewayError};
use crate::validate::{self, digits_only, sanitize_otp};

/// Shown when a booking request fails without a server detail message.
pub const REQUEST_FAILED_FALLBACK: &str =
    "Could not submit your booking request. Please try again.";

/// Shown when verification fails without a server detail message.
pub const INVALID_OTP_FALLBACK: &str = "Invalid OTP";

/// Standing error left behind when the user closes the OTP step.
pub const ABANDONED_MESSAGE: &str = "Booking request was not completed.";

/// What happened to a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The request succeeded; the OTP step is now open.
    OtpRequired(BookingId),
    /// Validation or the request failed; the wizard stays in `Idle`.
    Failed(String),
    /// The wizard was not in `Idle`; nothing was done.
    Ignored,
}

/// What happened to an OTP submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The booking is confirmed; the wizard is now in `Succeeded`.
    Confirmed,
    /// The backend rejected the code; input cleared, still awaiting an OTP.
    Rejected(String),
    /// No call was made: wrong code length, no session, or an attempt was
    /// already in flight.
    Ignored,
}

/// What happened on a one-second cooldown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting down; the remaining seconds after the decrement.
    Counting(u32),
    /// The cooldown just reached zero; resend is now allowed.
    ResendReady,
    /// The timer has no business running (no open OTP step, or resend is
    /// already allowed).
    Stopped,
}

/// What happened to a resend request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResendOutcome {
    /// A fresh OTP was issued for the existing session.
    Sent,
    /// The backend refused; the cooldown was still restarted.
    Failed(String),
    /// Resend was not allowed yet, or there is no open OTP step.
    Ignored,
}

/// The booking wizard. One instance models one user's flow; it holds at most
/// one booking session at a time.
pub struct BookingWizard {
    gateway: Arc<dyn BookingGateway>,
    catalog: Arc<ServiceCatalog>,
    phase: WizardPhase,
    form: BookingForm,
    session: Option<BookingSession>,
    /// Error shown on the form itself while in `Idle` (failed request or
    /// abandoned OTP step).
    form_error: Option<String>,
}

impl BookingWizard {
    pub fn new(gateway: Arc<dyn BookingGateway>, catalog: Arc<ServiceCatalog>) -> Self {
        Self {
            gateway,
            catalog,
            phase: WizardPhase::Idle,
            form: BookingForm::default(),
            session: None,
            form_error: None,
        }
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn form(&self) -> &BookingForm {
        &self.form
    }

    pub fn session(&self) -> Option<&BookingSession> {
        self.session.as_ref()
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    //=====================================================================================
    // Form editing
    //=====================================================================================

    /// Replaces the whole form, applying the input policy: phone digits are
    /// stripped of non-digits and a package that does not belong to the new
    /// service is cleared.
    pub fn set_form(&mut self, mut form: BookingForm) {
        form.phone_digits = digits_only(&form.phone_digits);
        if !self.catalog.is_valid_package(&form.service, &form.package) {
            form.package.clear();
        }
        self.form = form;
    }

    /// Selects a service; a previously selected package that is not in the
    /// new service's list is cleared.
    pub fn set_service(&mut self, service: &str) {
        self.form.service = service.to_string();
        if !self.catalog.is_valid_package(service, &self.form.package) {
            self.form.package.clear();
        }
    }

    /// Stores the phone number as typed, keeping digits only.
    pub fn set_phone_digits(&mut self, raw: &str) {
        self.form.phone_digits = digits_only(raw);
    }

    //=====================================================================================
    // Idle -> AwaitingOtp
    //=====================================================================================

    /// Submits the form. On success the OTP step opens with the cooldown
    /// running; on failure the wizard stays in `Idle` and the server's
    /// detail message (or a fixed fallback) becomes the form error.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.phase != WizardPhase::Idle {
            return SubmitOutcome::Ignored;
        }

        if let Err(reason) = validate::validate_form(&self.form, &self.catalog) {
            let message = reason.to_string();
            self.form_error = Some(message.clone());
            return SubmitOutcome::Failed(message);
        }

        match self.gateway.request_otp(&self.form, None).await {
            Ok(booking_id) => {
                self.session = Some(BookingSession::new(booking_id.clone()));
                self.phase = WizardPhase::AwaitingOtp;
                self.form_error = None;
                SubmitOutcome::OtpRequired(booking_id)
            }
            Err(err) => {
                let message = display_error(err, REQUEST_FAILED_FALLBACK);
                self.form_error = Some(message.clone());
                SubmitOutcome::Failed(message)
            }
        }
    }

    //=====================================================================================
    // OTP entry and verification
    //=====================================================================================

    /// Updates the OTP input while the OTP step is open. Non-digits are
    /// stripped and the value is capped at six characters.
    pub fn set_otp_input(&mut self, raw: &str) {
        if self.phase != WizardPhase::AwaitingOtp {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.otp_input = sanitize_otp(raw);
        }
    }

    /// Whether the entered code is complete enough to verify.
    pub fn otp_ready(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.otp_input.len() == OTP_LENGTH)
            .unwrap_or(false)
    }

    /// Verifies the entered code. A submission with anything other than six
    /// digits, or while another attempt is in flight, is a no-op.
    pub async fn submit_otp(&mut self) -> VerifyOutcome {
        if self.phase != WizardPhase::AwaitingOtp || !self.otp_ready() {
            return VerifyOutcome::Ignored;
        }
        let (booking_id, otp) = match self.session.as_ref() {
            Some(session) => (session.booking_id.clone(), session.otp_input.clone()),
            None => return VerifyOutcome::Ignored,
        };

        self.phase = WizardPhase::Verifying;
        match self.gateway.verify_otp(&booking_id, &otp).await {
            Ok(()) => {
                // Session state is dropped on success; only the phase keeps
                // the confirmation visible until the reset delay elapses.
                self.session = None;
                self.phase = WizardPhase::Succeeded;
                VerifyOutcome::Confirmed
            }
            Err(err) => {
                self.phase = WizardPhase::AwaitingOtp;
                let message = display_error(err, INVALID_OTP_FALLBACK);
                if let Some(session) = self.session.as_mut() {
                    session.otp_input.clear();
                    session.error = Some(message.clone());
                }
                VerifyOutcome::Rejected(message)
            }
        }
    }

    //=====================================================================================
    // Cooldown and resend
    //=====================================================================================

    /// One-second cooldown tick. Decrements only while the OTP step is open
    /// and resend is not yet allowed; the counter never goes negative.
    pub fn tick(&mut self) -> TickOutcome {
        let step_open = matches!(
            self.phase,
            WizardPhase::AwaitingOtp | WizardPhase::Verifying
        );
        let Some(session) = self.session.as_mut() else {
            return TickOutcome::Stopped;
        };
        if !step_open || session.resend_allowed {
            return TickOutcome::Stopped;
        }

        session.cooldown_secs = session.cooldown_secs.saturating_sub(1);
        if session.cooldown_secs == 0 {
            session.resend_allowed = true;
            TickOutcome::ResendReady
        } else {
            TickOutcome::Counting(session.cooldown_secs)
        }
    }

    /// Asks the backend for a fresh OTP on the existing session. Restarts
    /// the cooldown and clears the OTP input and error before the call; the
    /// wizard stays in `AwaitingOtp` either way.
    pub async fn resend(&mut self) -> ResendOutcome {
        if self.phase != WizardPhase::AwaitingOtp {
            return ResendOutcome::Ignored;
        }
        let previous_id = {
            let Some(session) = self.session.as_mut() else {
                return ResendOutcome::Ignored;
            };
            if !session.resend_allowed {
                return ResendOutcome::Ignored;
            }
            session.cooldown_secs = RESEND_COOLDOWN_SECS;
            session.resend_allowed = false;
            session.otp_input.clear();
            session.error = None;
            session.booking_id.clone()
        };

        match self.gateway.request_otp(&self.form, Some(&previous_id)).await {
            Ok(booking_id) => {
                if let Some(session) = self.session.as_mut() {
                    session.booking_id = booking_id;
                }
                ResendOutcome::Sent
            }
            Err(err) => {
                let message = display_error(err, REQUEST_FAILED_FALLBACK);
                if let Some(session) = self.session.as_mut() {
                    session.error = Some(message.clone());
                }
                ResendOutcome::Failed(message)
            }
        }
    }

    //=====================================================================================
    // Exits
    //=====================================================================================

    /// Abandons the OTP step: the session is discarded and a standing error
    /// is left on the form. Returns false when there is nothing to close.
    pub fn close_otp(&mut self) -> bool {
        if self.phase != WizardPhase::AwaitingOtp {
            return false;
        }
        self.session = None;
        self.phase = WizardPhase::Idle;
        self.form_error = Some(ABANDONED_MESSAGE.to_string());
        true
    }

    /// Returns the wizard to an empty form after the success display delay.
    /// The delay itself is owned by the driver. Returns false outside of
    /// `Succeeded`.
    pub fn reset_after_success(&mut self) -> bool {
        if self.phase != WizardPhase::Succeeded {
            return false;
        }
        self.form = BookingForm::default();
        self.form_error = None;
        self.phase = WizardPhase::Idle;
        true
    }
}

/// Prefers the backend's detail message, falling back to fixed copy.
fn display_error(err: GatewayError, fallback: &str) -> String {
    match err {
        GatewayError::Rejected(detail) => detail,
        GatewayError::Unavailable(_) => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{BookingGateway, GatewayResult};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A scripted fake backend. Outcomes are popped in order; every
    /// `request_otp` call records the `resend_of` argument it saw.
    #[derive(Default)]
    struct FakeGateway {
        request_outcomes: Mutex<VecDeque<GatewayResult<BookingId>>>,
        verify_outcomes: Mutex<VecDeque<GatewayResult<()>>>,
        requests_seen: Mutex<Vec<Option<String>>>,
        verifies_seen: Mutex<Vec<(String, String)>>,
    }

    impl FakeGateway {
        fn queue_request(&self, outcome: GatewayResult<BookingId>) {
            self.request_outcomes.lock().unwrap().push_back(outcome);
        }

        fn queue_verify(&self, outcome: GatewayResult<()>) {
            self.verify_outcomes.lock().unwrap().push_back(outcome);
        }

        fn request_count(&self) -> usize {
            self.requests_seen.lock().unwrap().len()
        }

        fn verify_count(&self) -> usize {
            self.verifies_seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl BookingGateway for FakeGateway {
        async fn request_otp(
            &self,
            _form: &BookingForm,
            resend_of: Option<&BookingId>,
        ) -> GatewayResult<BookingId> {
            self.requests_seen
                .lock()
                .unwrap()
                .push(resend_of.map(|id| id.0.clone()));
            self.request_outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GatewayError::Unavailable("unscripted".to_string())))
        }

        async fn verify_otp(&self, booking_id: &BookingId, otp: &str) -> GatewayResult<()> {
            self.verifies_seen
                .lock()
                .unwrap()
                .push((booking_id.0.clone(), otp.to_string()));
            self.verify_outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GatewayError::Unavailable("unscripted".to_string())))
        }
    }

    fn filled_form() -> BookingForm {
        BookingForm {
            service: "Bridal Makeup Services".to_string(),
            package: "HD Bridal".to_string(),
            name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            phone_country: "IN".to_string(),
            phone_digits: "9876543210".to_string(),
            service_country: "India".to_string(),
            address: "12 MG Road, Bengaluru".to_string(),
            pincode: "560001".to_string(),
            preferred_date: NaiveDate::from_ymd_opt(2026, 11, 14),
            message: String::new(),
        }
    }

    fn wizard_with(gateway: Arc<FakeGateway>) -> BookingWizard {
        let catalog = Arc::new(ServiceCatalog::load().unwrap());
        BookingWizard::new(gateway, catalog)
    }

    async fn wizard_awaiting_otp(gateway: Arc<FakeGateway>) -> BookingWizard {
        gateway.queue_request(Ok(BookingId("bk-1".to_string())));
        let mut wizard = wizard_with(gateway);
        wizard.set_form(filled_form());
        assert_eq!(
            wizard.submit().await,
            SubmitOutcome::OtpRequired(BookingId("bk-1".to_string()))
        );
        wizard
    }

    #[tokio::test]
    async fn successful_submit_opens_otp_step() {
        let gateway = Arc::new(FakeGateway::default());
        let wizard = wizard_awaiting_otp(gateway.clone()).await;

        assert_eq!(wizard.phase(), WizardPhase::AwaitingOtp);
        let session = wizard.session().unwrap();
        assert!(!session.booking_id.as_str().is_empty());
        assert_eq!(session.cooldown_secs, RESEND_COOLDOWN_SECS);
        assert!(!session.resend_allowed);
        assert_eq!(gateway.request_count(), 1);
    }

    #[tokio::test]
    async fn incomplete_form_never_reaches_the_backend() {
        let gateway = Arc::new(FakeGateway::default());
        let mut wizard = wizard_with(gateway.clone());
        let mut form = filled_form();
        form.name.clear();
        wizard.set_form(form);

        assert!(matches!(wizard.submit().await, SubmitOutcome::Failed(_)));
        assert_eq!(wizard.phase(), WizardPhase::Idle);
        assert_eq!(gateway.request_count(), 0);
    }

    #[tokio::test]
    async fn request_rejection_surfaces_the_detail_message() {
        let gateway = Arc::new(FakeGateway::default());
        gateway.queue_request(Err(GatewayError::Rejected("Date unavailable".to_string())));
        let mut wizard = wizard_with(gateway);
        wizard.set_form(filled_form());

        assert_eq!(
            wizard.submit().await,
            SubmitOutcome::Failed("Date unavailable".to_string())
        );
        assert_eq!(wizard.phase(), WizardPhase::Idle);
        assert_eq!(wizard.form_error(), Some("Date unavailable"));
        assert!(wizard.session().is_none());
    }

    #[tokio::test]
    async fn transport_failure_uses_the_fallback_message() {
        let gateway = Arc::new(FakeGateway::default());
        gateway.queue_request(Err(GatewayError::Unavailable("timed out".to_string())));
        let mut wizard = wizard_with(gateway);
        wizard.set_form(filled_form());

        assert_eq!(
            wizard.submit().await,
            SubmitOutcome::Failed(REQUEST_FAILED_FALLBACK.to_string())
        );
    }

    #[tokio::test]
    async fn otp_input_is_digits_only_capped_at_six() {
        let gateway = Arc::new(FakeGateway::default());
        let mut wizard = wizard_awaiting_otp(gateway).await;

        wizard.set_otp_input("12ab34-56789");
        assert_eq!(wizard.session().unwrap().otp_input, "123456");
        assert!(wizard.otp_ready());
    }

    #[tokio::test]
    async fn short_otp_does_not_trigger_a_verify_call() {
        let gateway = Arc::new(FakeGateway::default());
        let mut wizard = wizard_awaiting_otp(gateway.clone()).await;

        wizard.set_otp_input("12345");
        assert_eq!(wizard.submit_otp().await, VerifyOutcome::Ignored);
        assert_eq!(wizard.phase(), WizardPhase::AwaitingOtp);
        assert_eq!(gateway.verify_count(), 0);
    }

    #[tokio::test]
    async fn rejected_otp_clears_input_and_stays_in_the_otp_step() {
        let gateway = Arc::new(FakeGateway::default());
        gateway.queue_verify(Err(GatewayError::Rejected("Invalid OTP".to_string())));
        let mut wizard = wizard_awaiting_otp(gateway).await;

        wizard.set_otp_input("123456");
        assert_eq!(
            wizard.submit_otp().await,
            VerifyOutcome::Rejected("Invalid OTP".to_string())
        );
        assert_eq!(wizard.phase(), WizardPhase::AwaitingOtp);
        let session = wizard.session().unwrap();
        assert_eq!(session.otp_input, "");
        assert_eq!(session.error.as_deref(), Some("Invalid OTP"));
    }

    #[tokio::test]
    async fn confirmed_otp_succeeds_and_reset_restores_the_empty_form() {
        let gateway = Arc::new(FakeGateway::default());
        gateway.queue_verify(Ok(()));
        let mut wizard = wizard_awaiting_otp(gateway).await;

        wizard.set_otp_input("123456");
        assert_eq!(wizard.submit_otp().await, VerifyOutcome::Confirmed);
        assert_eq!(wizard.phase(), WizardPhase::Succeeded);
        assert!(wizard.session().is_none());

        assert!(wizard.reset_after_success());
        assert_eq!(wizard.phase(), WizardPhase::Idle);
        assert_eq!(wizard.form(), &BookingForm::default());
        assert_eq!(wizard.form_error(), None);
    }

    #[tokio::test]
    async fn cooldown_counts_to_zero_and_never_goes_negative() {
        let gateway = Arc::new(FakeGateway::default());
        let mut wizard = wizard_awaiting_otp(gateway).await;

        for expected in (1..RESEND_COOLDOWN_SECS).rev() {
            assert_eq!(wizard.tick(), TickOutcome::Counting(expected));
        }
        assert_eq!(wizard.tick(), TickOutcome::ResendReady);
        let session = wizard.session().unwrap();
        assert!(session.resend_allowed);
        assert_eq!(session.cooldown_secs, 0);

        // Once resend is allowed the timer must stop decrementing.
        assert_eq!(wizard.tick(), TickOutcome::Stopped);
        assert_eq!(wizard.session().unwrap().cooldown_secs, 0);
    }

    #[tokio::test]
    async fn resend_before_the_cooldown_elapses_is_ignored() {
        let gateway = Arc::new(FakeGateway::default());
        let mut wizard = wizard_awaiting_otp(gateway.clone()).await;

        assert_eq!(wizard.resend().await, ResendOutcome::Ignored);
        assert_eq!(gateway.request_count(), 1); // only the original submit
    }

    #[tokio::test]
    async fn resend_restarts_the_cooldown_and_reuses_the_booking_id() {
        let gateway = Arc::new(FakeGateway::default());
        let mut wizard = wizard_awaiting_otp(gateway.clone()).await;
        gateway.queue_request(Ok(BookingId("bk-1".to_string())));

        while wizard.tick() != TickOutcome::ResendReady {}
        wizard.set_otp_input("99");
        assert!(wizard.session().unwrap().resend_allowed);

        assert_eq!(wizard.resend().await, ResendOutcome::Sent);
        let session = wizard.session().unwrap();
        assert_eq!(session.cooldown_secs, RESEND_COOLDOWN_SECS);
        assert!(!session.resend_allowed);
        assert_eq!(session.otp_input, "");
        assert_eq!(session.error, None);

        // The resend call carried the existing booking identifier.
        let seen = gateway.requests_seen.lock().unwrap();
        assert_eq!(*seen, vec![None, Some("bk-1".to_string())]);
    }

    #[tokio::test]
    async fn failed_resend_shows_an_error_but_keeps_the_otp_step_open() {
        let gateway = Arc::new(FakeGateway::default());
        let mut wizard = wizard_awaiting_otp(gateway.clone()).await;
        gateway.queue_request(Err(GatewayError::Rejected("Too many OTPs".to_string())));

        while wizard.tick() != TickOutcome::ResendReady {}
        assert_eq!(
            wizard.resend().await,
            ResendOutcome::Failed("Too many OTPs".to_string())
        );
        assert_eq!(wizard.phase(), WizardPhase::AwaitingOtp);
        let session = wizard.session().unwrap();
        assert_eq!(session.error.as_deref(), Some("Too many OTPs"));
        assert_eq!(session.cooldown_secs, RESEND_COOLDOWN_SECS);
    }

    #[tokio::test]
    async fn closing_the_otp_step_abandons_the_session() {
        let gateway = Arc::new(FakeGateway::default());
        let mut wizard = wizard_awaiting_otp(gateway).await;
        wizard.set_otp_input("1234");

        assert!(wizard.close_otp());
        assert_eq!(wizard.phase(), WizardPhase::Idle);
        assert!(wizard.session().is_none());
        assert_eq!(wizard.form_error(), Some(ABANDONED_MESSAGE));

        // Closing again has nothing to do.
        assert!(!wizard.close_otp());
    }

    #[tokio::test]
    async fn changing_service_clears_a_stale_package() {
        let gateway = Arc::new(FakeGateway::default());
        let mut wizard = wizard_with(gateway);
        wizard.set_form(filled_form());
        assert_eq!(wizard.form().package, "HD Bridal");

        wizard.set_service("Party Makeup Services");
        assert_eq!(wizard.form().package, "");

        // A package valid for the new service survives the switch.
        wizard.set_form(BookingForm {
            service: "Party Makeup Services".to_string(),
            package: "Full Glam".to_string(),
            ..filled_form()
        });
        wizard.set_service("Party Makeup Services");
        assert_eq!(wizard.form().package, "Full Glam");
    }

    #[tokio::test]
    async fn phone_input_strips_non_digits() {
        let gateway = Arc::new(FakeGateway::default());
        let mut wizard = wizard_with(gateway);
        wizard.set_phone_digits("+91 98765-43210");
        assert_eq!(wizard.form().phone_digits, "919876543210");
    }
}
