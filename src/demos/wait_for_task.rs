//! Batched Indexing Example
//!
//! Creates an index, adds documents in batches, waits for every task and
//! issues a tenant token scoped to the new index.
//!
//! Run with: SIFTLY_API_KEY=masterKey cargo run --example wait_for_task

use serde::Serialize;
use serde_json::json;
use siftly_rs::{Client, ClientConfig, TenantTokenOptions, WaitParams};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct Movie {
    id: u32,
    title: String,
    genre: &'static str,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("siftly_rs=debug")),
        )
        .with_target(false)
        .init();

    let client = Client::new(ClientConfig::from_env())?;
    if !client.is_healthy().await {
        anyhow::bail!("search service at {} is not reachable", client.config().host);
    }

    let uid = format!("movies-{}", uuid::Uuid::new_v4().simple());
    let created = client.create_index(&uid, Some("id")).await?;
    client.wait_for_task(&created, None).await?;
    println!("✅ Created index {}\n", uid);

    let movies: Vec<Movie> = (1..=25)
        .map(|id| Movie {
            id,
            title: format!("Movie #{}", id),
            genre: if id % 2 == 0 { "comedy" } else { "drama" },
        })
        .collect();

    let index = client.index(&uid);
    let handles = index.add_documents_in_batches(&movies, 10, None).await?;
    println!("📝 Submitted {} batches", handles.len());

    let params = WaitParams::new(Duration::from_secs(30), Duration::from_millis(100));
    for task in client.wait_for_tasks(&handles, Some(params)).await? {
        match task.error {
            Some(error) => println!("   task {} failed: {}", task.uid, error),
            None => println!("   task {} {}", task.uid, task.status),
        }
    }

    let token = client.generate_tenant_token(
        json!({ uid.as_str(): { "filter": "genre = comedy" } }),
        &TenantTokenOptions::new().with_expires_at(chrono::Utc::now() + chrono::Duration::hours(1)),
    )?;
    println!("\n🔑 Tenant token: {}", token);

    let deleted = index.delete().await?;
    client.wait_for_task(deleted, None).await?;

    Ok(())
}
