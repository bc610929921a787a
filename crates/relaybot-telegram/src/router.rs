use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use relaybot_core::{config::Config, relay::RelayService};

use crate::handlers;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RelayService>,
}

/// Long-poll Telegram until the process is terminated.
pub async fn run_polling(
    bot: Bot,
    cfg: Arc<Config>,
    service: Arc<RelayService>,
) -> anyhow::Result<()> {
    match bot.get_me().await {
        Ok(me) => tracing::info!("relaybot started: @{}", me.username()),
        Err(e) => tracing::warn!("get_me failed: {e}"),
    }
    tracing::info!(
        "Relaying to chat {} ({})",
        cfg.target.chat_id.0,
        cfg.target.kind
    );
    match &cfg.admin_id {
        Some(admin) => tracing::info!("Admin: {admin}"),
        None => tracing::info!("Admin: none (enable/disable open to everyone)"),
    }
    tracing::info!("Audit sinks: {:?}", service.audit().sink_names());

    let state = Arc::new(AppState { service });

    let handler = Update::filter_message().endpoint(handlers::handle_message);

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            tracing::debug!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .build()
        .dispatch()
        .await;

    Ok(())
}
