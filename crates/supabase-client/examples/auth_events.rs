//! Watch services being rebuilt as the auth state changes, with a blocking client.
//!
//! Run with: cargo run --example auth_events -p supabase-client
//!
//! Requires `SUPABASE_URL`, `SUPABASE_KEY`, `SUPABASE_EMAIL` and `SUPABASE_PASSWORD`.

use std::sync::Arc;

use supabase_client::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("supabase_client=debug")),
        )
        .init();

    let client = create_client_from_env(None)?;
    let _listener = client.auth().on_auth_state_change(|event, session| {
        println!("auth event {event}, signed in: {}", session.is_some());
    });

    let anonymous = client.storage()?;
    println!("anonymous bearer: {}", client.auth_header()["Authorization"]);

    let email = std::env::var("SUPABASE_EMAIL")?;
    let password = std::env::var("SUPABASE_PASSWORD")?;
    let session = client.auth().sign_in_with_password(&email, &password)?;
    println!("signed in as {:?}", session.user.as_ref().and_then(|u| u.email.as_deref()));

    let signed_in = client.storage()?;
    println!("storage client rebuilt: {}", !Arc::ptr_eq(&anonymous, &signed_in));

    client.auth().sign_out()?;
    println!("bearer after sign out: {}", client.auth_header()["Authorization"]);

    Ok(())
}
