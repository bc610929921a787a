use async_trait::async_trait;

use crate::{
    domain::{ChatId, SentMessage},
    Result,
};

/// Outbound side of the chat transport.
///
/// Implementations perform exactly one attempt per call; callers decide what
/// a failure means.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    /// Plain text, no parse mode.
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<SentMessage>;

    /// Text formatted as MarkdownV2.
    async fn send_markdown(&self, chat_id: ChatId, markdown: &str) -> Result<SentMessage>;
}
