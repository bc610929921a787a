//! In-crate fakes for the messaging and audit ports.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::{
    audit::{AuditRecord, AuditSink},
    domain::{
        Chat, ChatId, ChatKind, InboundEvent, MessageId, MessageRef, Sender, SentMessage, UserId,
    },
    errors::Error,
    messaging::port::MessagingPort,
    Result,
};

pub fn private_text(user_id: i64, text: &str) -> InboundEvent {
    InboundEvent {
        sender: Sender {
            id: UserId(user_id),
            first_name: "Ada".to_string(),
            last_name: Some("Lovelace".to_string()),
        },
        chat: Chat {
            id: ChatId(user_id),
            title: None,
            kind: ChatKind::Private,
        },
        text: text.to_string(),
        has_media: false,
    }
}

pub fn group_text(user_id: i64, text: &str) -> InboundEvent {
    let mut ev = private_text(user_id, text);
    ev.chat = Chat {
        id: ChatId(-100_555),
        title: Some("Lounge".to_string()),
        kind: ChatKind::Group,
    };
    ev
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sent {
    pub chat_id: ChatId,
    pub text: String,
    pub markdown: bool,
}

/// Records every send; can be told to fail the n-th call (0-based).
#[derive(Default)]
pub struct RecordingMessenger {
    pub sent: Mutex<Vec<Sent>>,
    pub fail_on_call: Option<usize>,
    pub chat_username: Option<String>,
    calls: Mutex<usize>,
}

impl RecordingMessenger {
    pub fn with_username(username: &str) -> Self {
        Self {
            chat_username: Some(username.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            chat_username: Some("relay_target".to_string()),
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    fn record(&self, chat_id: ChatId, text: &str, markdown: bool) -> Result<SentMessage> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            let n = *calls;
            *calls += 1;
            n
        };
        if self.fail_on_call == Some(call) {
            return Err(Error::External("telegram error: network down".to_string()));
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(Sent {
            chat_id,
            text: text.to_string(),
            markdown,
        });
        Ok(SentMessage {
            msg: MessageRef {
                chat_id,
                message_id: MessageId(100 + sent.len() as i32),
            },
            chat_username: self.chat_username.clone(),
        })
    }
}

#[async_trait]
impl MessagingPort for RecordingMessenger {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<SentMessage> {
        self.record(chat_id, text, false)
    }

    async fn send_markdown(&self, chat_id: ChatId, markdown: &str) -> Result<SentMessage> {
        self.record(chat_id, markdown, true)
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub records: Mutex<Vec<AuditRecord>>,
    pub fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn record(&self, record: &AuditRecord) -> Result<()> {
        if self.fail {
            return Err(Error::Storage("disk full".to_string()));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}
