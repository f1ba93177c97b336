use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use tgr_core::{
    auth::{AuthFlow, AuthMode},
    config::Config,
    forwarder::MessageForwarder,
    ports::MessengerPort,
    resolver::SenderResolver,
    router::EventRouter,
    session_store::FileSessionStore,
};
use tgr_telegram::MtprotoConnector;

mod prompt;

use prompt::TerminalPrompt;

#[tokio::main]
async fn main() -> Result<(), tgr_core::Error> {
    tgr_core::logging::init("tgr")?;

    let cfg = Arc::new(Config::load()?);
    for (source, target) in cfg.group_map.iter() {
        info!(source = %source, target_chat = target, "route");
    }

    let connector = MtprotoConnector::new(&cfg);
    let store = FileSessionStore::new(cfg.session_file.clone());
    let established = AuthFlow::new(&connector, &store, &TerminalPrompt)
        .establish()
        .await?;
    match established.mode {
        AuthMode::Resumed => info!("connected with saved session"),
        AuthMode::Fresh => info!(path = %store.path().display(), "logged in, session saved"),
    }

    let client = established.client;
    tgr_telegram::warm_up(&client).await;

    let messenger: Arc<dyn MessengerPort> = Arc::new(client.clone());
    let router = Arc::new(EventRouter::new(
        cfg.group_map.clone(),
        SenderResolver::new(messenger.clone()),
        MessageForwarder::new(messenger),
    ));

    let (tx, rx) = mpsc::channel(cfg.event_buffer);
    let router_task = tokio::spawn(router.run(rx));
    info!("relay is running");

    tokio::select! {
        res = client.pump_updates(tx) => {
            res.map_err(|e| tgr_core::Error::External(format!("{e:#}")))?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, shutting down");
        }
    }

    // In-flight forwards are not drained.
    router_task.abort();
    if let Err(e) = router_task.await {
        if !e.is_cancelled() {
            warn!("router task ended abnormally: {e}");
        }
    }

    Ok(())
}
