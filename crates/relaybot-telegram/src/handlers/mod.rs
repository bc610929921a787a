//! Telegram update handlers.
//!
//! Every message is converted into a transport-neutral `InboundEvent` and
//! handed to the relay pipeline; all gating and routing happens there.

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use relaybot_core::relay::Outcome;

use crate::router::AppState;

mod event;

pub use event::inbound_event;

pub async fn handle_message(msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(event) = inbound_event(&msg) else {
        tracing::debug!(chat_id = msg.chat.id.0, "ignoring message without sender or content");
        return Ok(());
    };

    let chat_id = event.chat.id.0;
    let user_id = event.sender.id.0;

    // Delivery failures are per-event: log them and keep serving.
    match state.service.handle(event).await {
        Ok(Outcome::Forwarded(receipt)) => {
            tracing::info!(chat_id, user_id, link = %receipt.link, "forwarded");
        }
        Ok(outcome) => {
            tracing::debug!(chat_id, user_id, ?outcome, "handled");
        }
        Err(e) => {
            tracing::warn!(chat_id, user_id, "relay failed: {e}");
        }
    }

    Ok(())
}
