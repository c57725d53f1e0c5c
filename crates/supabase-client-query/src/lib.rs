//! PostgREST query builder and HTTP client.
//!
//! ```ignore
//! use supabase_client_query::{Filterable, Modifiable, OrderDirection};
//!
//! let resp = postgrest
//!     .from("cities")
//!     .select("id,name")
//!     .eq("country", "FR")
//!     .order("name", OrderDirection::Ascending)
//!     .limit(10)
//!     .execute()
//!     .await?;
//! ```

pub mod builder;
pub mod client;
pub mod error;
pub mod filter;
pub mod modifier;
pub mod parts;
pub mod render;
pub mod response;

pub use builder::{FilterBuilder, QueryBuilder};
pub use client::{PostgrestClient, PostgrestConfig};
pub use error::{PostgrestError, PostgrestErrorBody};
pub use filter::Filterable;
pub use modifier::Modifiable;
pub use parts::{CountOption, FilterOperator, IsValue, NullsPosition, OrderDirection};
pub use response::PostgrestResponse;
