mod config;
mod counter;
mod interval;
mod logger;

use config::DemoConfig;
use draft_store::{bind_action_with, Action};
use interval::{IntervalHandler, INTERVAL_HANDLER};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init();

    log::info!("Starting draft-store-demo");

    let config = DemoConfig::load();
    let store = counter::create_store(&config);
    store.register_handler(INTERVAL_HANDLER, IntervalHandler);

    // The listener holds a store handle, which keeps the store alive through
    // its own listener list until `subscription.unsubscribe()` below
    let handle = store.clone();
    let subscription = store.subscribe_fn(move |action, previous| {
        let current = handle.get_state();
        log::info!(
            "{} {}: {} -> {} (history {:?})",
            handle,
            action,
            previous.count,
            current.count,
            current.history
        );
    });

    let increment = bind_action_with(&store, "increment");
    increment(json!(config.step)).await?;

    store.dispatch_with("tick", json!(config.step)).await?;

    // Sync "record" commits right away while "slowDouble" is still waiting
    let slow = store.dispatch_with("slowDouble", json!(200));
    store.dispatch("record").await?;
    slow.await?;

    // Unknown names are tolerated (logged, per config)
    if let Err(e) = store.dispatch("incremnet").await {
        log::warn!("{}", e);
    }

    if let Err(e) = store.dispatch_with("decrement", json!(i64::MAX)).await {
        log::warn!("Expected failure: {}", e);
    }

    store
        .dispatch(Action::new(|draft: &mut counter::Counter, _| draft.count = 0))
        .await?;

    subscription.unsubscribe();

    let state = store.get_state();
    log::info!(
        "Exiting draft-store-demo: count {}, recorded {:?}",
        state.count,
        state.history
    );
    Ok(())
}
