//! Search and ingestion subcommands: `search`, `upload`, `forget`, `health`.

use std::path::Path;

use augmenter_config::Config;
use augmenter_presentation::{IngestionClient, SearchClient, SessionIdentity};
use augmenter_protocols::{ServiceError, SyncStore};
use augmenter_store::FileStore;

async fn session(config: &Config) -> Result<SessionIdentity, Box<dyn std::error::Error>> {
    let path = SessionIdentity::path_beside(&config.store.resolved_path());
    Ok(SessionIdentity::load_or_create(&path).await?)
}

fn report(err: ServiceError) -> Box<dyn std::error::Error> {
    eprintln!("{}", err.user_message());
    Box::new(err)
}

pub(crate) async fn search(
    config: &Config,
    query: Option<String>,
    top_k: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = match query {
        Some(query) => query,
        None => {
            let store = FileStore::open(config.store.resolved_path()).await?;
            store.read().await?.text
        }
    };
    let identity = session(config).await?;

    let mut service = config.service.clone();
    if let Some(top_k) = top_k {
        service.top_k = top_k;
    }
    let client = SearchClient::from_config(&service);
    let response = client
        .search(&text, Some(&identity.uuid))
        .await
        .map_err(report)?;

    if response.results.is_empty() {
        println!("No results found.");
        return Ok(());
    }
    println!("{} result(s) for \"{}\"", response.total_results, response.query);
    for (rank, hit) in response.results.iter().enumerate() {
        println!("{}. [{:.2}] {}", rank + 1, hit.similarity, hit.key);
        println!("   {}", hit.content);
    }
    Ok(())
}

pub(crate) async fn upload(config: &Config, file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let identity = session(config).await?;
    let client = IngestionClient::from_config(&config.service);
    let result = client.upload(file, &identity.uuid).await.map_err(report)?;

    println!(
        "{}",
        result
            .message
            .unwrap_or_else(|| "Conversations uploaded.".to_string())
    );
    if let Some(total) = result.total_documents {
        println!("Documents indexed: {}", total);
    }
    Ok(())
}

pub(crate) async fn forget(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let identity = session(config).await?;
    let client = IngestionClient::from_config(&config.service);
    let result = client.delete(&identity.uuid).await.map_err(report)?;
    println!(
        "{}",
        result.message.unwrap_or_else(|| "Session data deleted.".to_string())
    );
    Ok(())
}

pub(crate) async fn health(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let client = IngestionClient::from_config(&config.service);
    let health = client.health().await.map_err(report)?;
    println!("Status: {}", health.status);
    println!("Documents: {}", health.total_documents);
    println!(
        "Ready for search: {}",
        if health.ready_for_search { "yes" } else { "no" }
    );
    Ok(())
}
