//! Supabase Edge Functions HTTP client.
//!
//! Invokes functions deployed at `/functions/v1/{function_name}`. Errors raised
//! by the Supabase relay (`x-relay-error: true`) are reported separately from
//! errors returned by the function itself.
//!
//! # Usage
//!
//! ```ignore
//! use serde_json::json;
//!
//! let response = functions.invoke("hello", InvokeOptions::new()
//!     .body(json!({"name": "World"}))
//!     .region(FunctionRegion::EuWest1)
//! ).await?;
//! let data: serde_json::Value = response.json()?;
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::FunctionsClient;
pub use error::{FunctionsApiErrorResponse, FunctionsError};
pub use types::*;
