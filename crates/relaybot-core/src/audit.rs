use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    admin::is_admin,
    domain::{ChatKind, InboundEvent},
    Result,
};

/// Upper bound on the stored message text, in characters.
pub const AUDIT_MAX_MESSAGE: usize = 5000;

/// One row of the interaction log. Built fresh for every event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditRecord {
    pub created_at: DateTime<Utc>,
    pub user_name: String,
    pub user_id: i64,
    /// Only set when the message came from a group chat.
    pub group_id: Option<i64>,
    pub group_name: Option<String>,
    pub message: String,
}

impl AuditRecord {
    pub fn from_event(event: &InboundEvent, now: DateTime<Utc>) -> Self {
        let (group_id, group_name) = match event.chat.kind {
            ChatKind::Group => (Some(event.chat.id.0), event.chat.title.clone()),
            ChatKind::Private => (None, None),
        };

        Self {
            created_at: now,
            user_name: event.sender.display_name(),
            user_id: event.sender.id.0,
            group_id,
            group_name,
            message: truncate_chars(&event.text, AUDIT_MAX_MESSAGE),
        }
    }
}

/// Cut at a char boundary; unlike log previews no ellipsis is added so the
/// stored value always fits the column.
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Append-only destination for audit records.
#[async_trait]
pub trait AuditSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn record(&self, record: &AuditRecord) -> Result<()>;
}

/// Fans a record out to every configured sink.
///
/// An empty sink list is the "no storage" configuration. Sink failures are
/// logged and swallowed; auditing never stops the relay.
#[derive(Clone)]
pub struct AuditLog {
    sinks: Vec<Arc<dyn AuditSink>>,
    admin_id: Option<String>,
    write_timeout: Duration,
}

/// What happened to a single `AuditLog::record` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuditOutcome {
    SkippedAdmin,
    Written { ok: usize, failed: usize },
}

impl AuditLog {
    pub fn new(
        sinks: Vec<Arc<dyn AuditSink>>,
        admin_id: Option<String>,
        write_timeout: Duration,
    ) -> Self {
        Self {
            sinks,
            admin_id,
            write_timeout,
        }
    }

    pub fn disabled() -> Self {
        Self::new(Vec::new(), None, Duration::from_secs(5))
    }

    pub fn sink_names(&self) -> Vec<&'static str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    pub async fn record(&self, event: &InboundEvent) -> AuditOutcome {
        if is_admin(self.admin_id.as_deref(), event.sender.id) {
            tracing::debug!(user_id = event.sender.id.0, "admin skip");
            return AuditOutcome::SkippedAdmin;
        }

        let record = AuditRecord::from_event(event, Utc::now());
        let mut ok = 0;
        let mut failed = 0;
        for sink in &self.sinks {
            match tokio::time::timeout(self.write_timeout, sink.record(&record)).await {
                Ok(Ok(())) => ok += 1,
                Ok(Err(e)) => {
                    failed += 1;
                    tracing::error!(
                        sink = sink.name(),
                        user_id = record.user_id,
                        "audit write failed: {e}"
                    );
                }
                Err(_) => {
                    failed += 1;
                    tracing::error!(
                        sink = sink.name(),
                        user_id = record.user_id,
                        timeout_ms = self.write_timeout.as_millis() as u64,
                        "audit write timed out"
                    );
                }
            }
        }

        AuditOutcome::Written { ok, failed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::UserId,
        errors::Error,
        testing::{group_text, private_text, RecordingSink},
    };

    struct StuckSink;

    #[async_trait]
    impl AuditSink for StuckSink {
        fn name(&self) -> &'static str {
            "stuck"
        }

        async fn record(&self, _record: &AuditRecord) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Err(Error::Storage("unreachable".to_string()))
        }
    }

    #[test]
    fn record_from_private_event() {
        let now = Utc::now();
        let rec = AuditRecord::from_event(&private_text(7, "hello"), now);
        assert_eq!(rec.created_at, now);
        assert_eq!(rec.user_name, "Ada Lovelace");
        assert_eq!(rec.user_id, 7);
        assert_eq!(rec.group_id, None);
        assert_eq!(rec.group_name, None);
        assert_eq!(rec.message, "hello");
    }

    #[test]
    fn record_from_group_event_carries_group_fields() {
        let mut ev = group_text(7, "hi all");
        ev.sender.last_name = None;
        let rec = AuditRecord::from_event(&ev, Utc::now());
        assert_eq!(rec.user_name, "Ada");
        assert_eq!(rec.group_id, Some(-100_555));
        assert_eq!(rec.group_name.as_deref(), Some("Lounge"));
    }

    #[test]
    fn message_is_bounded() {
        let long = "é".repeat(AUDIT_MAX_MESSAGE + 10);
        let rec = AuditRecord::from_event(&private_text(7, &long), Utc::now());
        assert_eq!(rec.message.chars().count(), AUDIT_MAX_MESSAGE);
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[tokio::test]
    async fn admin_is_never_recorded() {
        let sink = Arc::new(RecordingSink::default());
        let sinks: Vec<Arc<dyn AuditSink>> = vec![sink.clone()];
        let log = AuditLog::new(sinks, Some("42".to_string()), Duration::from_secs(1));

        assert_eq!(log.record(&private_text(42, "x")).await, AuditOutcome::SkippedAdmin);
        assert!(sink.records().is_empty());

        assert_eq!(
            log.record(&private_text(43, "x")).await,
            AuditOutcome::Written { ok: 1, failed: 0 }
        );
        assert_eq!(sink.records()[0].user_id, 43);
    }

    #[tokio::test]
    async fn every_sink_is_attempted_even_after_a_failure() {
        let bad = Arc::new(RecordingSink::failing());
        let good = Arc::new(RecordingSink::default());
        let sinks: Vec<Arc<dyn AuditSink>> = vec![bad, good.clone()];
        let log = AuditLog::new(sinks, None, Duration::from_secs(1));

        let outcome = log.record(&private_text(7, "hello")).await;
        assert_eq!(outcome, AuditOutcome::Written { ok: 1, failed: 1 });
        assert_eq!(good.records().len(), 1);
        assert!(!is_admin(None, UserId(7)));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_sink_is_cut_off() {
        let good = Arc::new(RecordingSink::default());
        let sinks: Vec<Arc<dyn AuditSink>> = vec![Arc::new(StuckSink), good.clone()];
        let log = AuditLog::new(sinks, None, Duration::from_millis(50));

        let outcome = log.record(&private_text(7, "hello")).await;
        assert_eq!(outcome, AuditOutcome::Written { ok: 1, failed: 1 });
        assert_eq!(good.records().len(), 1);
    }

    #[tokio::test]
    async fn disabled_log_writes_nothing() {
        let log = AuditLog::disabled();
        assert!(log.sink_names().is_empty());
        assert_eq!(
            log.record(&private_text(7, "hello")).await,
            AuditOutcome::Written { ok: 0, failed: 0 }
        );
    }
}
