//! Presentation subcommands: `popup`, `status`, `refresh`.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use augmenter_config::Config;
use augmenter_presentation::{
    HttpRefreshClient, PopupView, PresentationContext, PresentationOptions,
};
use augmenter_protocols::SharedStore;
use augmenter_store::FileStore;

async fn open_store(config: &Config) -> Result<Arc<FileStore>, Box<dyn std::error::Error>> {
    let store = FileStore::open(config.store.resolved_path()).await?;
    Ok(Arc::new(store))
}

fn presentation(config: &Config, store: SharedStore) -> PresentationContext {
    let refresh = HttpRefreshClient::from_config(
        &config.refresh,
        Duration::from_millis(config.observer.refresh_timeout_ms),
    );
    PresentationContext::new(store, PresentationOptions::from(&config.presentation))
        .with_refresh(Arc::new(refresh))
}

fn print_view(view: &PopupView) {
    println!("{}", view);
    println!("{}", "-".repeat(40));
}

/// Long-running surface. Any line on stdin requests a manual refresh.
pub(crate) async fn run_popup(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config).await?;
    store.watch()?;

    let ctx = presentation(config, store.clone());
    let mut renders = ctx.subscribe();
    let trigger = ctx.refresh_trigger();
    let cancel = CancellationToken::new();
    let task = tokio::spawn(ctx.run(cancel.clone()));

    info!("Popup running; press Enter to refresh, Ctrl+C to quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            view = renders.recv() => match view {
                Ok(view) => print_view(&view),
                Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {}
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            },
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(_)) => {
                    if trigger.send(()).await.is_err() {
                        warn!("Presentation context is gone");
                    }
                }
                _ => stdin_open = false,
            },
        }
    }

    cancel.cancel();
    let _ = task.await;
    store.unwatch();
    Ok(())
}

pub(crate) async fn show_status(config: &Config, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config).await?;
    let mut ctx = presentation(config, store);
    ctx.reload().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&ctx.record())?);
        return Ok(());
    }
    ctx.check_host().await;
    if let Some(view) = ctx.view() {
        println!("{}", view);
    }
    Ok(())
}

pub(crate) async fn refresh_once(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(config).await?;
    let mut ctx = presentation(config, store);

    if let Err(e) = ctx.manual_refresh().await {
        warn!("Refresh failed: {}", e);
    }
    if let Some(view) = ctx.view() {
        println!("{}", view);
    }
    Ok(())
}
