pub mod config;
pub mod endpoints;
pub mod error;
pub mod headers;
pub mod http;
pub mod mode;
pub mod persistence;
pub mod validate;

pub use config::{ClientOptions, ClientOptionsOverrides, FlowType};
pub use endpoints::{Endpoints, Service};
pub use error::{ConfigurationError, SupabaseError, SupabaseResult};
pub use http::{ApiRequest, ApiResponse};
pub use mode::{Blocking, ExecutionMode, Mode, NonBlocking};
pub use persistence::{
    AsyncMemoryStorage, AsyncSupportedStorage, SessionStorage, SyncMemoryStorage,
    SyncSupportedStorage,
};
pub use validate::{validate_api_key, validate_credentials, validate_url};
