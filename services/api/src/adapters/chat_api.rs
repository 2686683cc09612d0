//! services/api/src/adapters/chat_api.rs
//!
//! This module contains the adapter for the external chat backend.
//! It implements the `ChatGateway` port from the `core` crate.

use async_trait::async_trait;
use booking_core::{ChatGateway, GatewayError, GatewayResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::booking_api::rejection_from;

#[derive(Serialize)]
struct ChatPayload<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatReply {
    reply: String,
}

/// An adapter that forwards visitor messages to the chat backend.
#[derive(Clone)]
pub struct HttpChatGateway {
    client: Client,
    base_url: String,
}

impl HttpChatGateway {
    /// Creates a new `HttpChatGateway`.
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

//=========================================================================================
// `ChatGateway` Trait Implementation
//=========================================================================================

#[async_trait]
impl ChatGateway for HttpChatGateway {
    async fn send_message(&self, message: &str) -> GatewayResult<String> {
        let response = self
            .client
            .post(format!("{}/chat", self.base_url))
            .json(&ChatPayload { message })
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(rejection_from(response).await);
        }

        let body: ChatReply = response
            .json()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;
        Ok(body.reply)
    }
}
