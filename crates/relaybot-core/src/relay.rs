//! The forwarding-and-logging pipeline: gate, classify, dispatch, audit.

use std::sync::Arc;

use crate::{
    admin::{AdminCommand, AdminController, AdminReply, RelayState},
    audit::AuditLog,
    classify::{classify, Classification, Command},
    config::Config,
    domain::{ChatId, InboundEvent},
    errors::{DeliveryStage, Error},
    forward::{ForwardReceipt, Forwarder},
    gate::{Admission, Gate, RejectReason},
    messaging::port::MessagingPort,
    Result,
};

pub const REPLY_NO_LOOKUP: &str = "This bot does not provide a lookup service.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CannedReplies {
    pub start: String,
    pub help: String,
    pub health: String,
    pub group: String,
}

impl CannedReplies {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            start: cfg.start_message.clone(),
            help: cfg.help_message.clone(),
            health: cfg.health_message.clone(),
            group: cfg.group_message.clone(),
        }
    }

    /// `None` for the admin-control commands, which have no canned text.
    pub fn text_for(&self, cmd: Command) -> Option<String> {
        match cmd {
            Command::Start => Some(format!("{}\n{}", self.start, self.help)),
            Command::Help => Some(self.help.clone()),
            Command::Health => Some(self.health.clone()),
            Command::Group => Some(self.group.clone()),
            Command::Enable | Command::Disable => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Admin(AdminReply),
    Canned(Command),
    NoLookup,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Dropped(RejectReason),
    Replied(Reply),
    Forwarded(ForwardReceipt),
}

/// Handles one inbound event end to end.
///
/// Shared behind an `Arc` by every concurrently running handler; it holds no
/// per-event state, only the atomic relay switch.
pub struct RelayService {
    gate: Gate,
    admin: AdminController,
    forwarder: Forwarder,
    audit: AuditLog,
    replies: CannedReplies,
    messenger: Arc<dyn MessagingPort>,
}

impl RelayService {
    pub fn new(
        cfg: &Config,
        state: Arc<RelayState>,
        messenger: Arc<dyn MessagingPort>,
        audit: AuditLog,
    ) -> Self {
        Self {
            gate: Gate::new(state.clone()),
            admin: AdminController::new(cfg.admin_id.clone(), state),
            forwarder: Forwarder::new(messenger.clone(), cfg.target),
            audit,
            replies: CannedReplies::from_config(cfg),
            messenger,
        }
    }

    pub fn state(&self) -> &Arc<RelayState> {
        self.admin.state()
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub async fn handle(&self, event: InboundEvent) -> Result<Outcome> {
        if let Admission::Reject(reason) = self.gate.admit(&event) {
            tracing::debug!(
                user_id = event.sender.id.0,
                chat_id = event.chat.id.0,
                reason = reason.as_str(),
                "skip message"
            );
            return Ok(Outcome::Dropped(reason));
        }

        let classification = classify(&event);
        tracing::info!(
            "{} request from user:{{{} {}}} in chat:[{}]",
            classification.label(),
            event.sender.display_name(),
            event.sender.id,
            event.text
        );

        let chat = event.chat.id;
        match classification {
            Classification::Command(Command::Enable) => {
                self.handle_admin(&event, AdminCommand::Enable).await
            }
            Classification::Command(Command::Disable) => {
                self.handle_admin(&event, AdminCommand::Disable).await
            }
            Classification::Command(cmd) => {
                self.audit.record(&event).await;
                let text = self.replies.text_for(cmd).unwrap_or_default();
                self.reply(chat, &text).await?;
                Ok(Outcome::Replied(Reply::Canned(cmd)))
            }
            Classification::NumericQuery(_) => {
                self.audit.record(&event).await;
                self.reply(chat, REPLY_NO_LOOKUP).await?;
                Ok(Outcome::Replied(Reply::NoLookup))
            }
            Classification::Content(content) => {
                let result = self.forwarder.forward(chat, &content).await;
                self.audit.record(&event).await;
                result.map(Outcome::Forwarded)
            }
        }
    }

    /// Admin-control traffic is not audited, whoever sends it.
    async fn handle_admin(&self, event: &InboundEvent, cmd: AdminCommand) -> Result<Outcome> {
        let reply = self.admin.handle(event.sender.id, cmd);
        self.reply(event.chat.id, reply.text()).await?;
        Ok(Outcome::Replied(Reply::Admin(reply)))
    }

    async fn reply(&self, chat: ChatId, text: &str) -> Result<()> {
        self.messenger
            .send_text(chat, text)
            .await
            .map(|_| ())
            .map_err(|e| {
                tracing::warn!(chat_id = chat.0, "reply error: {e}");
                Error::delivery(DeliveryStage::Reply, e.to_string())
            })
    }
}
