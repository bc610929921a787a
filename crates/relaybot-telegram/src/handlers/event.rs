use teloxide::types::Message;

use relaybot_core::domain::{Chat, ChatId, ChatKind, InboundEvent, Sender, UserId};

fn chat_kind(chat: &teloxide::types::Chat) -> ChatKind {
    if chat.is_private() {
        ChatKind::Private
    } else {
        ChatKind::Group
    }
}

/// Attachments are never relayed; the flag only drives the placeholder text.
fn has_media(msg: &Message) -> bool {
    msg.photo().is_some()
        || msg.document().is_some()
        || msg.sticker().is_some()
        || msg.animation().is_some()
        || msg.venue().is_some()
        || msg.video().is_some()
        || msg.audio().is_some()
        || msg.voice().is_some()
        || msg.video_note().is_some()
}

/// `None` for messages the relay has nothing to do with: no sender
/// (anonymous/channel posts) or neither text nor media (service messages).
pub fn inbound_event(msg: &Message) -> Option<InboundEvent> {
    let user = msg.from()?;
    let has_media = has_media(msg);
    if msg.text().is_none() && !has_media {
        return None;
    }

    let text = msg.text().or_else(|| msg.caption()).unwrap_or("").to_string();

    Some(InboundEvent {
        sender: Sender {
            id: UserId(user.id.0 as i64),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        },
        chat: Chat {
            id: ChatId(msg.chat.id.0),
            title: msg.chat.title().map(str::to_string),
            kind: chat_kind(&msg.chat),
        },
        text,
        has_media,
    })
}
