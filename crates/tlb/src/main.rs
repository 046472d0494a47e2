use std::sync::Arc;

use tlb_core::{config::Config, migrate, store::Store};

#[tokio::main]
async fn main() -> Result<(), tlb_core::Error> {
    tlb_core::logging::init("tlb");

    let cfg = Arc::new(Config::load()?);
    let store = Arc::new(Store::open(&cfg.store_file)?);

    // Legacy records must be gone before the first command is served.
    migrate::run(&store)?;

    tlb_telegram::router::run_polling(cfg, store)
        .await
        .map_err(|e| tlb_core::Error::Transport(format!("telegram bot failed: {e}")))?;

    Ok(())
}
