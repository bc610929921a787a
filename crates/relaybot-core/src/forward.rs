use std::sync::Arc;

use crate::{
    classify::Content,
    domain::{ChatId, SentMessage, TargetDestination},
    errors::{DeliveryStage, Error},
    messaging::{
        port::MessagingPort,
        types::{escape_markdown_v2, escape_markdown_v2_url},
    },
    Result,
};

/// Appended in place of binary attachments, which are never re-uploaded.
pub const MEDIA_PLACEHOLDER: &str = "(attachment could not be sent)";

const CONFIRMATION_LABEL: &str = "Forward success!";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForwardReceipt {
    /// The copy that landed in the target destination.
    pub forwarded: SentMessage,
    pub link: String,
    pub confirmation: SentMessage,
}

/// Text actually sent to the destination, or `None` when there is nothing to send.
pub fn compose_body(content: &Content) -> Option<String> {
    let text = content.text.trim_end();
    match (content.has_media, text.trim().is_empty()) {
        (true, true) => Some(MEDIA_PLACEHOLDER.to_string()),
        (true, false) => Some(format!("{text}\n\n{MEDIA_PLACEHOLDER}")),
        (false, true) => None,
        (false, false) => Some(content.text.clone()),
    }
}

/// `t.me` link to a sent message.
///
/// Chats without a public username only have the `t.me/c/<id>` form, where
/// the id drops the `-100` prefix of supergroup/channel ids.
pub fn deep_link(sent: &SentMessage) -> String {
    let message_id = sent.msg.message_id.0;
    match sent.chat_username.as_deref().map(str::trim) {
        Some(username) if !username.is_empty() => {
            format!("https://t.me/{username}/{message_id}")
        }
        _ => {
            let raw = sent.msg.chat_id.0.to_string();
            let internal = raw
                .strip_prefix("-100")
                .unwrap_or_else(|| raw.trim_start_matches('-'));
            format!("https://t.me/c/{internal}/{message_id}")
        }
    }
}

pub fn confirmation_markdown(link: &str) -> String {
    format!(
        "[{}]({})",
        escape_markdown_v2(CONFIRMATION_LABEL),
        escape_markdown_v2_url(link)
    )
}

/// Forward-then-confirm against the messaging port. One attempt, no retries.
#[derive(Clone)]
pub struct Forwarder {
    messenger: Arc<dyn MessagingPort>,
    target: TargetDestination,
}

impl Forwarder {
    pub fn new(messenger: Arc<dyn MessagingPort>, target: TargetDestination) -> Self {
        Self { messenger, target }
    }

    pub async fn forward(&self, origin: ChatId, content: &Content) -> Result<ForwardReceipt> {
        let Some(body) = compose_body(content) else {
            return Err(Error::delivery(DeliveryStage::Forward, "empty message"));
        };

        let forwarded = self
            .messenger
            .send_text(self.target.chat_id, &body)
            .await
            .map_err(|e| {
                tracing::warn!(target_chat = self.target.chat_id.0, "forwardMessage error: {e}");
                Error::delivery(DeliveryStage::Forward, e.to_string())
            })?;

        let link = deep_link(&forwarded);
        let confirmation = self
            .messenger
            .send_markdown(origin, &confirmation_markdown(&link))
            .await
            .map_err(|e| {
                tracing::warn!(chat_id = origin.0, "replyMessage error: {e}");
                Error::delivery(DeliveryStage::Confirm, e.to_string())
            })?;

        Ok(ForwardReceipt {
            forwarded,
            link,
            confirmation,
        })
    }
}
