//! services/api/src/web/countdown_task.rs
//!
//! This module contains the asynchronous "worker" function driving the
//! resend cooldown.

use crate::web::{protocol::ServerMessage, state::WizardSession};
use axum::extract::ws::{Message, WebSocket};
use booking_core::TickOutcome;
use futures::{stream::SplitSink, SinkExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// The cooldown ticker for one open OTP step.
///
/// Ticks the wizard once per second and streams the remaining time to the
/// client. The task ends on its own when the cooldown reaches zero or the
/// wizard leaves the OTP step; the `CancellationToken` tears it down when
/// the step is closed from the outside (abandonment, disconnect, success).
pub async fn countdown_process(
    session_lock: Arc<Mutex<WizardSession>>,
    ws_sender: Arc<Mutex<SplitSink<WebSocket, Message>>>,
    cancellation_token: CancellationToken,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // The first tick of a tokio interval completes immediately; the cooldown
    // must not lose a second to it.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                info!("Countdown task cancelled.");
                return;
            }
            _ = interval.tick() => {}
        }

        let outcome = {
            let mut session = session_lock.lock().await;
            session.wizard.tick()
        };

        let message = match outcome {
            TickOutcome::Counting(seconds_left) => ServerMessage::CooldownTick { seconds_left },
            TickOutcome::ResendReady => ServerMessage::ResendReady,
            TickOutcome::Stopped => return,
        };

        let json = serde_json::to_string(&message).unwrap();
        if ws_sender
            .lock()
            .await
            .send(Message::Text(json.into()))
            .await
            .is_err()
        {
            info!("Countdown task ending; client is gone.");
            return;
        }

        if outcome == TickOutcome::ResendReady {
            // Done until a resend restarts the cooldown with a new task.
            return;
        }
    }
}
