//! services/api/src/web/ws_handler.rs
//!
//! This is the main entry point and control loop for a WebSocket connection.
//! It drives one booking wizard per connection and owns the lifecycles of
//! the countdown and form-reset tasks.

use crate::web::{
    countdown_task::countdown_process,
    protocol::{ClientMessage, ServerMessage},
    state::{AppState, WizardSession},
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use booking_core::wizard::ABANDONED_MESSAGE;
use booking_core::{ResendOutcome, SubmitOutcome, VerifyOutcome};
use futures::{
    stream::{SplitSink, StreamExt},
    SinkExt,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

/// How long the confirmation stays on screen before the form resets.
const SUCCESS_RESET_DELAY: Duration = Duration::from_secs(3);

type WsSender = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let connection_id = Uuid::new_v4();
    info!("New booking wizard connection: {}", connection_id);

    // The sender is wrapped in an Arc<Mutex<>> so the countdown and reset
    // tasks can share it with this loop.
    let (sender, mut receiver) = socket.split();
    let ws_sender: WsSender = Arc::new(Mutex::new(sender));

    let session_lock = Arc::new(Mutex::new(WizardSession::new(&app_state, connection_id)));

    // Cancels in-flight backend calls when the connection goes away, so an
    // abandoned wizard does not leave a request running.
    let connection_token = CancellationToken::new();

    // --- Main Message Loop ---
    loop {
        if let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    handle_text_message(
                        text.to_string(),
                        &session_lock,
                        &ws_sender,
                        &connection_token,
                    )
                    .await;
                }
                Message::Close(_) => {
                    info!("Client sent close message.");
                    break;
                }
                _ => {}
            }
        } else {
            info!("Client disconnected.");
            break;
        }
    }

    // --- Cleanup ---
    connection_token.cancel();
    session_lock.lock().await.countdown_token.cancel();
    info!("Booking wizard connection closed: {}", connection_id);
}

/// Helper function to handle the logic for different `ClientMessage`
/// variants.
async fn handle_text_message(
    text: String,
    session_lock: &Arc<Mutex<WizardSession>>,
    ws_sender: &WsSender,
    connection_token: &CancellationToken,
) {
    let client_msg = match serde_json::from_str::<ClientMessage>(&text) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("Failed to deserialize client message: {}", e);
            send_to_client(
                ws_sender,
                &ServerMessage::Error {
                    message: "Malformed message.".to_string(),
                },
            )
            .await;
            return;
        }
    };

    match client_msg {
        ClientMessage::SubmitBooking { form } => {
            let outcome = {
                let mut session = session_lock.lock().await;
                session.wizard.set_form(form.into());
                run_cancellable(session.wizard.submit(), connection_token).await
            };
            match outcome {
                Some(SubmitOutcome::OtpRequired(booking_id)) => {
                    send_to_client(
                        ws_sender,
                        &ServerMessage::OtpRequired {
                            booking_id: booking_id.to_string(),
                        },
                    )
                    .await;
                    start_countdown(session_lock, ws_sender).await;
                }
                Some(SubmitOutcome::Failed(message)) => {
                    send_to_client(ws_sender, &ServerMessage::BookingFailed { message }).await;
                }
                Some(SubmitOutcome::Ignored) => {
                    warn!("SubmitBooking received outside of the editing state.");
                }
                None => {}
            }
        }
        ClientMessage::OtpInput { value } => {
            let mut session = session_lock.lock().await;
            session.wizard.set_otp_input(&value);
        }
        ClientMessage::SubmitOtp => {
            let outcome = {
                let mut session = session_lock.lock().await;
                run_cancellable(session.wizard.submit_otp(), connection_token).await
            };
            match outcome {
                Some(VerifyOutcome::Confirmed) => {
                    session_lock.lock().await.countdown_token.cancel();
                    send_to_client(ws_sender, &ServerMessage::BookingConfirmed).await;
                    schedule_form_reset(
                        session_lock.clone(),
                        ws_sender.clone(),
                        connection_token.clone(),
                    );
                }
                Some(VerifyOutcome::Rejected(message)) => {
                    send_to_client(ws_sender, &ServerMessage::OtpRejected { message }).await;
                }
                Some(VerifyOutcome::Ignored) => {
                    // The verify button is disabled until six digits are in;
                    // nothing to report back.
                }
                None => {}
            }
        }
        ClientMessage::ResendOtp => {
            let outcome = {
                let mut session = session_lock.lock().await;
                run_cancellable(session.wizard.resend(), connection_token).await
            };
            match outcome {
                Some(ResendOutcome::Sent) => {
                    send_to_client(ws_sender, &ServerMessage::OtpResent).await;
                    start_countdown(session_lock, ws_sender).await;
                }
                Some(ResendOutcome::Failed(message)) => {
                    send_to_client(ws_sender, &ServerMessage::OtpRejected { message }).await;
                    // The cooldown restarted even though the backend refused.
                    start_countdown(session_lock, ws_sender).await;
                }
                Some(ResendOutcome::Ignored) => {
                    warn!("ResendOtp received before the cooldown elapsed.");
                }
                None => {}
            }
        }
        ClientMessage::CloseOtp => {
            let closed = {
                let mut session = session_lock.lock().await;
                let closed = session.wizard.close_otp();
                if closed {
                    session.countdown_token.cancel();
                }
                closed
            };
            if closed {
                send_to_client(
                    ws_sender,
                    &ServerMessage::BookingFailed {
                        message: ABANDONED_MESSAGE.to_string(),
                    },
                )
                .await;
            }
        }
    }
}

/// Serializes and sends one server message; false when the client is gone.
async fn send_to_client(ws_sender: &WsSender, message: &ServerMessage) -> bool {
    let json = serde_json::to_string(message).unwrap();
    ws_sender
        .lock()
        .await
        .send(Message::Text(json.into()))
        .await
        .is_ok()
}

/// Races a wizard call against the connection token so a dropped connection
/// does not leave a backend call in flight.
async fn run_cancellable<F: Future>(future: F, token: &CancellationToken) -> Option<F::Output> {
    tokio::select! {
        _ = token.cancelled() => None,
        output = future => Some(output),
    }
}

/// Replaces the countdown token and spawns a fresh ticker for the newly
/// (re)started cooldown.
async fn start_countdown(session_lock: &Arc<Mutex<WizardSession>>, ws_sender: &WsSender) {
    let token = CancellationToken::new();
    {
        let mut session = session_lock.lock().await;
        session.countdown_token.cancel();
        session.countdown_token = token.clone();
    }
    tokio::spawn(countdown_process(
        session_lock.clone(),
        ws_sender.clone(),
        token,
    ));
}

/// After the fixed confirmation delay, returns the wizard to its empty
/// initial state and tells the client.
fn schedule_form_reset(
    session_lock: Arc<Mutex<WizardSession>>,
    ws_sender: WsSender,
    connection_token: CancellationToken,
) {
    tokio::spawn(async move {
        tokio::select! {
            _ = connection_token.cancelled() => return,
            _ = tokio::time::sleep(SUCCESS_RESET_DELAY) => {}
        }
        let did_reset = {
            let mut session = session_lock.lock().await;
            session.wizard.reset_after_success()
        };
        if did_reset {
            send_to_client(&ws_sender, &ServerMessage::FormReset).await;
        }
    });
}
