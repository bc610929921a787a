//! Telegram adapter (teloxide).
//!
//! This crate implements the `relaybot-core` MessagingPort over the Telegram
//! Bot API and feeds inbound messages into the relay pipeline.

use async_trait::async_trait;

use teloxide::{prelude::*, types::ParseMode};

pub mod handlers;
pub mod router;

use relaybot_core::{
    config::Config,
    domain::{ChatId, MessageId, MessageRef, SentMessage},
    errors::Error,
    messaging::port::MessagingPort,
    Result,
};

/// Bot client honouring the configured request timeout and the standard
/// proxy environment variables.
pub fn build_bot(cfg: &Config) -> Result<Bot> {
    let client = teloxide::net::default_reqwest_settings()
        .timeout(cfg.request_timeout)
        .build()
        .map_err(|e| Error::Config(format!("telegram http client: {e}")))?;
    Ok(Bot::with_client(cfg.telegram_bot_token.clone(), client))
}

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    fn sent(msg: &Message) -> SentMessage {
        SentMessage {
            msg: MessageRef {
                chat_id: ChatId(msg.chat.id.0),
                message_id: MessageId(msg.id.0),
            },
            chat_username: msg.chat.username().map(str::to_string),
        }
    }
}

// Single attempt per call: a failed forward is reported, never retried.
#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<SentMessage> {
        let msg = self
            .bot
            .send_message(Self::tg_chat(chat_id), text.to_string())
            .await
            .map_err(Self::map_err)?;
        Ok(Self::sent(&msg))
    }

    async fn send_markdown(&self, chat_id: ChatId, markdown: &str) -> Result<SentMessage> {
        let msg = self
            .bot
            .send_message(Self::tg_chat(chat_id), markdown.to_string())
            .parse_mode(ParseMode::MarkdownV2)
            .await
            .map_err(Self::map_err)?;
        Ok(Self::sent(&msg))
    }
}
