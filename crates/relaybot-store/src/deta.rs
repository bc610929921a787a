//! Deta Base adapter (hosted key-value store).
//!
//! Each record is inserted as one item via `POST /{project_id}/{base}/items`.

use std::time::Duration;

use async_trait::async_trait;

use relaybot_core::{
    audit::{AuditRecord, AuditSink},
    config::DetaBaseConfig,
    errors::Error,
    Result,
};

pub const DEFAULT_ENDPOINT: &str = "https://database.deta.sh/v1";

#[derive(Clone)]
pub struct DetaBaseSink {
    http: reqwest::Client,
    items_url: String,
    project_key: String,
}

impl DetaBaseSink {
    pub fn new(cfg: &DetaBaseConfig, timeout: Duration) -> Result<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT, cfg, timeout)
    }

    pub fn with_endpoint(endpoint: &str, cfg: &DetaBaseConfig, timeout: Duration) -> Result<Self> {
        let project_id = project_id(&cfg.project_key).ok_or_else(|| {
            Error::Config("DETA_BASE_KEY must look like <project_id>_<secret>".to_string())
        })?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("deta http client: {e}")))?;

        Ok(Self {
            http,
            items_url: format!(
                "{}/{}/{}/items",
                endpoint.trim_end_matches('/'),
                project_id,
                cfg.base_name
            ),
            project_key: cfg.project_key.clone(),
        })
    }
}

/// The project id is the part of a project key before the first underscore.
fn project_id(key: &str) -> Option<&str> {
    let (id, secret) = key.split_once('_')?;
    if id.is_empty() || secret.is_empty() {
        return None;
    }
    Some(id)
}

fn item_json(record: &AuditRecord) -> serde_json::Value {
    serde_json::json!({
        "created_at": record.created_at.to_rfc3339(),
        "user_name": record.user_name,
        "user_id": record.user_id,
        "group_id": record.group_id,
        "group_name": record.group_name,
        "message": record.message,
    })
}

#[async_trait]
impl AuditSink for DetaBaseSink {
    fn name(&self) -> &'static str {
        "deta-base"
    }

    async fn record(&self, record: &AuditRecord) -> Result<()> {
        let resp = self
            .http
            .post(&self.items_url)
            .header("X-API-Key", &self.project_key)
            .json(&serde_json::json!({ "item": item_json(record) }))
            .send()
            .await
            .map_err(|e| Error::Storage(format!("deta request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Storage(format!(
                "deta insert failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        Ok(())
    }
}
