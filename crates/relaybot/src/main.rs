use std::sync::Arc;

use relaybot_core::{admin::RelayState, audit::AuditLog, config::Config, relay::RelayService};
use relaybot_telegram::TelegramMessenger;

#[tokio::main]
async fn main() -> Result<(), relaybot_core::Error> {
    relaybot_core::logging::init("relaybot")?;

    let cfg = Arc::new(Config::load()?);
    for (key, value) in &cfg.proxy_env {
        tracing::info!("{key}: {value}");
    }

    let bot = relaybot_telegram::build_bot(&cfg)?;
    let messenger = Arc::new(TelegramMessenger::new(bot.clone()));

    let sinks = relaybot_store::build_sinks(&cfg)?;
    let audit = AuditLog::new(sinks, cfg.admin_id.clone(), cfg.audit_write_timeout);

    let service = Arc::new(RelayService::new(
        &cfg,
        Arc::new(RelayState::default()),
        messenger,
        audit,
    ));

    relaybot_telegram::router::run_polling(bot, cfg, service)
        .await
        .map_err(|e| relaybot_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
