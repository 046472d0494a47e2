use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use tlb_core::{
    config::Config, messaging::port::MessagingPort, service::BoardService, store::Store,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub service: Arc<BoardService>,
    pub messenger: Arc<dyn MessagingPort>,
}

/// Long-polling loop. The store is expected to be migrated already; nothing
/// here touches legacy records.
pub async fn run_polling(cfg: Arc<Config>, store: Arc<Store>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        tracing::info!("topic-list bot started: @{}", me.username());
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let service = Arc::new(BoardService::new(
        store,
        messenger.clone(),
        cfg.temp_dir.clone(),
    ));

    let state = Arc::new(AppState {
        cfg,
        service,
        messenger,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
