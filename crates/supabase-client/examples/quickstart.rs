//! Query, storage and functions through one async client.
//!
//! Run with: cargo run --example quickstart -p supabase-client
//!
//! Requires `SUPABASE_URL` and `SUPABASE_KEY`, e.g. from `supabase start`.
//! Set `RUST_LOG=supabase_client=debug` to watch services being built.

use serde_json::json;
use supabase_client::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let client = create_async_client_from_env(None).await?;
    println!("REST endpoint: {}", client.rest_url());

    // ── SELECT ──
    let resp = client
        .from("cities")?
        .select("name, population")
        .gt("population", 1_000_000)
        .order("population", OrderDirection::Descending)
        .limit(5)
        .count()
        .execute()
        .await?;
    println!("{} large cities (total {:?})", resp.rows::<serde_json::Value>()?.len(), resp.count);

    // ── RPC ──
    let sum = client
        .rpc("add_numbers", &json!({"a": 2, "b": 3}))?
        .execute()
        .await?
        .into_data::<i64>()?;
    println!("add_numbers(2, 3) = {sum}");

    // ── Storage ──
    for bucket in client.storage()?.list_buckets().await? {
        println!("bucket {} (public: {})", bucket.name, bucket.public);
    }

    // ── Functions ──
    match client
        .functions()?
        .invoke("hello", InvokeOptions::new().body(json!({"name": "World"})))
        .await
    {
        Ok(response) => println!("hello -> {}", response.text()?),
        Err(e) => println!("hello failed: {e}"),
    }

    Ok(())
}
