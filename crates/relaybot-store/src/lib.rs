//! Audit storage adapters.
//!
//! Implements the `relaybot-core` `AuditSink` port for a local SQLite file and
//! for a hosted Deta Base collection.

use std::sync::Arc;

use relaybot_core::{audit::AuditSink, config::Config, Result};

pub mod deta;
pub mod sqlite;

pub use deta::DetaBaseSink;
pub use sqlite::SqliteAuditSink;

/// Open every sink enabled in the config.
///
/// Errors here are startup errors: a sink that cannot be provisioned stops
/// the process before any message is served.
pub fn build_sinks(cfg: &Config) -> Result<Vec<Arc<dyn AuditSink>>> {
    let mut sinks: Vec<Arc<dyn AuditSink>> = Vec::new();

    if let Some(sql) = &cfg.sqlite {
        tracing::info!("SQLite audit sink enabled: {}", sql.path.display());
        sinks.push(Arc::new(SqliteAuditSink::open(&sql.path)?));
    }

    if let Some(deta) = &cfg.deta_base {
        tracing::info!("Deta Base audit sink enabled: {}", deta.base_name);
        sinks.push(Arc::new(DetaBaseSink::new(deta, cfg.audit_write_timeout)?));
    }

    Ok(sinks)
}
