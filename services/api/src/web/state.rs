//! services/api/src/web/state.rs
//!
//! Defines the gateway's shared and per-connection states.

use crate::config::Config;
use booking_core::{BookingGateway, BookingWizard, ChatGateway, ServiceCatalog};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all
/// handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<ServiceCatalog>,
    pub booking_gateway: Arc<dyn BookingGateway>,
    pub chat_gateway: Arc<dyn ChatGateway>,
}

//=========================================================================================
// WizardSession (Specific to One WebSocket Connection)
//=========================================================================================

/// The state for a single, active WebSocket connection: one booking wizard
/// and the token guarding its countdown task. At most one booking session
/// exists per connection at any time, inside the wizard.
pub struct WizardSession {
    pub connection_id: Uuid,
    pub wizard: BookingWizard,
    /// Cancels the running countdown task; replaced whenever a new countdown
    /// starts, cancelled whenever the OTP step closes.
    pub countdown_token: CancellationToken,
}

impl WizardSession {
    /// Creates the per-connection state with a fresh wizard.
    pub fn new(app_state: &AppState, connection_id: Uuid) -> Self {
        Self {
            connection_id,
            wizard: BookingWizard::new(
                app_state.booking_gateway.clone(),
                app_state.catalog.clone(),
            ),
            countdown_token: CancellationToken::new(),
        }
    }
}
