use std::fmt;

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatKind {
    Private,
    /// Groups, supergroups and channels.
    Group,
}

impl ChatKind {
    /// Lenient parse used for the configured destination kind.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "private" => Some(ChatKind::Private),
            "group" | "supergroup" | "channel" => Some(ChatKind::Group),
            _ => None,
        }
    }
}

impl fmt::Display for ChatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatKind::Private => write!(f, "private"),
            ChatKind::Group => write!(f, "group"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sender {
    pub id: UserId,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl Sender {
    /// "first last", without a trailing space when the last name is missing.
    pub fn display_name(&self) -> String {
        match self.last_name.as_deref().map(str::trim) {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chat {
    pub id: ChatId,
    pub title: Option<String>,
    pub kind: ChatKind,
}

/// One inbound message, as handed over by the transport adapter.
///
/// `text` is the message text or the media caption and may be empty for
/// pure-media messages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundEvent {
    pub sender: Sender,
    pub chat: Chat,
    pub text: String,
    pub has_media: bool,
}

impl InboundEvent {
    pub fn is_private(&self) -> bool {
        self.chat.kind == ChatKind::Private
    }
}

/// The single chat every eligible message is relayed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetDestination {
    pub chat_id: ChatId,
    pub kind: ChatKind,
}

/// Result of a successful outbound send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentMessage {
    pub msg: MessageRef,
    /// Public username of the chat the message landed in, if it has one.
    pub chat_username: Option<String>,
}
