//! Execution modes.
//!
//! A client runs either blocking (every call completes on the calling thread)
//! or non-blocking (network-bound calls are `async`). The choice is made once,
//! when the client is built, and is carried by a [`Mode`] type parameter that
//! every collaborator shares. Request construction is written once per
//! collaborator; only the final send step is specialised per mode.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::persistence::{AsyncSupportedStorage, SessionStorage, SyncSupportedStorage};

/// Runtime tag for the two calling conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Blocking calls on the calling thread.
    #[default]
    Sync,
    /// Suspending `async` calls.
    Async,
}

impl ExecutionMode {
    pub fn is_async(self) -> bool {
        matches!(self, Self::Async)
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => write!(f, "sync"),
            Self::Async => write!(f, "async"),
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Blocking {}
    impl Sealed for super::NonBlocking {}
}

/// The family of collaborator variants belonging to one execution mode.
pub trait Mode: sealed::Sealed + fmt::Debug + Clone + Copy + Send + Sync + 'static {
    /// The runtime tag of this family.
    const EXECUTION: ExecutionMode;

    /// HTTP transport used by every collaborator in this mode.
    type Http: Clone + fmt::Debug + Send + Sync + 'static;

    /// Session persistence capability the auth collaborator needs in this mode.
    type SessionStore: ?Sized + Send + Sync + 'static;

    /// Build a transport with the given default headers and request timeout.
    fn build_http(
        headers: HeaderMap,
        timeout: Option<Duration>,
    ) -> Result<Self::Http, reqwest::Error>;

    /// Pick the persistence store out of `storage`, failing if it is the
    /// other mode's variant.
    fn session_store(
        storage: &SessionStorage,
    ) -> Result<Arc<Self::SessionStore>, ConfigurationError>;
}

/// Blocking execution: `reqwest::blocking` transport, synchronous storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blocking;

/// Non-blocking execution: async `reqwest` transport, async storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonBlocking;

impl Mode for Blocking {
    const EXECUTION: ExecutionMode = ExecutionMode::Sync;
    type Http = reqwest::blocking::Client;
    type SessionStore = dyn SyncSupportedStorage;

    fn build_http(
        headers: HeaderMap,
        timeout: Option<Duration>,
    ) -> Result<Self::Http, reqwest::Error> {
        let mut builder = reqwest::blocking::Client::builder().default_headers(headers);
        // The blocking builder applies a 30s default unless told otherwise.
        builder = builder.timeout(timeout);
        builder.build()
    }

    fn session_store(
        storage: &SessionStorage,
    ) -> Result<Arc<Self::SessionStore>, ConfigurationError> {
        match storage {
            SessionStorage::Sync(store) => Ok(Arc::clone(store)),
            SessionStorage::Async(_) => Err(ConfigurationError::StorageMismatch {
                mode: ExecutionMode::Sync,
                found: ExecutionMode::Async,
            }),
        }
    }
}

impl Mode for NonBlocking {
    const EXECUTION: ExecutionMode = ExecutionMode::Async;
    type Http = reqwest::Client;
    type SessionStore = dyn AsyncSupportedStorage;

    fn build_http(
        headers: HeaderMap,
        timeout: Option<Duration>,
    ) -> Result<Self::Http, reqwest::Error> {
        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    fn session_store(
        storage: &SessionStorage,
    ) -> Result<Arc<Self::SessionStore>, ConfigurationError> {
        match storage {
            SessionStorage::Async(store) => Ok(Arc::clone(store)),
            SessionStorage::Sync(_) => Err(ConfigurationError::StorageMismatch {
                mode: ExecutionMode::Async,
                found: ExecutionMode::Sync,
            }),
        }
    }
}
