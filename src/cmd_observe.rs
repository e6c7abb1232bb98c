//! `observe` subcommand: the observer context process.

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use augmenter_config::Config;
use augmenter_observer::{ObserverContext, PageFileBridge, load_page, serve};
use augmenter_protocols::SharedStore;
use augmenter_store::FileStore;

pub(crate) async fn run_observer(
    config: &Config,
    page_path: &Path,
    no_server: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting Augmenter observer v{}", env!("CARGO_PKG_VERSION"));

    let store_path = config.store.resolved_path();
    let store: SharedStore = Arc::new(FileStore::open(&store_path).await?);
    info!("Store: {}", store_path.display());

    let page = load_page(page_path)?;
    let bridge = PageFileBridge::new(page_path, Arc::clone(&page));
    bridge.watch()?;

    let ctx = ObserverContext::from_config(page, store, &config.observer)?;
    let handle = ctx.handle();
    let metrics = ctx.metrics();
    let cancel = CancellationToken::new();

    let server = if no_server {
        None
    } else {
        let addr = config.refresh.bind_addr();
        let token = cancel.clone();
        Some(tokio::spawn(async move {
            if let Err(e) = serve(&addr, handle, token).await {
                error!("Refresh endpoint stopped: {}", e);
            }
        }))
    };

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
        }
        shutdown.cancel();
    });

    ctx.run(cancel.clone()).await?;
    cancel.cancel();
    if let Some(server) = server {
        let _ = server.await;
    }
    bridge.unwatch();

    let snapshot = metrics.snapshot();
    info!(
        cycles = snapshot.cycles,
        writes = snapshot.writes,
        suppressed = snapshot.suppressed,
        relocations = snapshot.relocations,
        uptime_secs = snapshot.uptime_secs,
        "Observer finished"
    );
    Ok(())
}
