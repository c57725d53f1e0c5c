//! Supabase Auth (GoTrue) HTTP client.
//!
//! Talks to the GoTrue REST endpoints at `/auth/v1/...`, keeps the current
//! session (persisted through the configured session storage) and notifies
//! listeners of auth state transitions.
//!
//! # Usage
//!
//! ```ignore
//! use supabase_client_auth::{AuthChangeEvent, AuthClient};
//!
//! let _sub = auth.on_auth_state_change(|event, _session| {
//!     if event == AuthChangeEvent::SignedOut {
//!         println!("bye");
//!     }
//! });
//! let session = auth.sign_in_with_password("user@example.com", "pass").await?;
//! let user = auth.get_user(Some(&session.access_token)).await?;
//! ```

pub mod client;
pub mod error;
pub mod pkce;
pub mod subscription;
pub mod types;

pub use client::{AuthClient, AuthClientConfig};
pub use error::{AuthError, GoTrueErrorResponse};
pub use subscription::{AuthStateCallback, AuthSubscription};
pub use types::*;
