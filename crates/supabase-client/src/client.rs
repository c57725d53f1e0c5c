use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use supabase_client_auth::{AuthChangeEvent, AuthClient, AuthSubscription, Session};
use supabase_client_core::headers::{auth_header, identity_headers, to_header_map};
use supabase_client_core::{
    validate_credentials, Blocking, ClientOptions, ConfigurationError, Endpoints, Mode,
    NonBlocking, Service,
};
use supabase_client_functions::FunctionsClient;
use supabase_client_query::{FilterBuilder, PostgrestClient, QueryBuilder};
use supabase_client_storage::StorageClient;
use tracing::debug;

use crate::cache::LazyService;
use crate::realtime::RealtimeClient;
use crate::services;

/// One configured entry point to a Supabase project.
///
/// `SupabaseClient<Blocking>` ([`SyncClient`](crate::SyncClient)) hands out
/// collaborators whose network calls block; `SupabaseClient<NonBlocking>`
/// ([`AsyncClient`](crate::AsyncClient)) hands out `async` ones. Everything
/// else behaves identically in both modes.
///
/// The auth client is built eagerly. The database, storage and functions
/// clients are built on first access with the current `Authorization` header
/// and rebuilt after every sign-in, token refresh or sign-out.
pub struct SupabaseClient<M: Mode> {
    supabase_url: String,
    supabase_key: String,
    options: ClientOptions,
    endpoints: Endpoints,
    auth: AuthClient<M>,
    state: Arc<SharedState<M>>,
    realtime: Option<RealtimeClient>,
    subscription: AuthSubscription,
}

/// State the auth listener mutates: the bearer header and the service slots.
struct SharedState<M: Mode> {
    supabase_key: String,
    base_headers: HashMap<String, String>,
    auth_header: RwLock<HashMap<String, String>>,
    postgrest: LazyService<PostgrestClient<M>>,
    storage: LazyService<StorageClient<M>>,
    functions: LazyService<FunctionsClient<M>>,
}

impl<M: Mode> SharedState<M> {
    fn new(supabase_key: &str, base_headers: HashMap<String, String>) -> Self {
        Self {
            supabase_key: supabase_key.to_string(),
            base_headers,
            auth_header: RwLock::new(auth_header(supabase_key)),
            postgrest: LazyService::new(),
            storage: LazyService::new(),
            functions: LazyService::new(),
        }
    }

    /// Configured headers overlaid with the current bearer header.
    fn service_headers(&self) -> HashMap<String, String> {
        let mut headers = self.base_headers.clone();
        headers.extend(
            self.auth_header
                .read()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        headers
    }

    fn set_token(&self, token: &str) {
        *self.auth_header.write() = auth_header(token);
    }

    fn on_auth_event(&self, event: AuthChangeEvent, session: Option<&Session>) {
        if !matches!(
            event,
            AuthChangeEvent::SignedIn | AuthChangeEvent::TokenRefreshed | AuthChangeEvent::SignedOut
        ) {
            return;
        }

        let token = session.map_or(self.supabase_key.as_str(), |s| s.access_token.as_str());
        self.set_token(token);

        // Header first: a build racing with this sees the new token or is dropped below.
        let dropped = [
            self.postgrest.invalidate(),
            self.storage.invalidate(),
            self.functions.invalidate(),
        ]
        .into_iter()
        .filter(|held| *held)
        .count();
        debug!(%event, has_session = session.is_some(), dropped, "auth state changed, service cache reset");
    }
}

impl<M: Mode> SupabaseClient<M> {
    /// Validate the inputs and build the client without looking up a session.
    ///
    /// The bearer token starts out as `supabase_key`. Use `create` to also
    /// pick up a persisted session.
    ///
    /// Only the shape of `supabase_url` is checked here. A URL that passes
    /// but does not parse as a host (`https://exa mple.co`) is reported later:
    /// the first `storage` or `functions` access returns
    /// `ConfigurationError::Client`, and database and auth calls fail when sent.
    pub fn new(
        supabase_url: &str,
        supabase_key: &str,
        options: ClientOptions,
    ) -> Result<Self, ConfigurationError> {
        validate_credentials(supabase_url, supabase_key)?;

        if options.execution_mode != M::EXECUTION {
            return Err(ConfigurationError::ModeMismatch {
                requested: options.execution_mode,
                actual: M::EXECUTION,
            });
        }

        let mut options = options;
        options.headers.extend(identity_headers(supabase_key));
        to_header_map(&options.headers)?;

        let storage = options.resolve_storage()?;
        options.storage = Some(storage.clone());

        let endpoints = Endpoints::new(supabase_url);
        let auth =
            services::create_auth::<M>(&endpoints.auth, options.headers.clone(), &options, &storage)?;

        let state = Arc::new(SharedState::new(supabase_key, options.headers.clone()));
        let listener = Arc::clone(&state);
        let subscription =
            auth.on_auth_state_change(move |event, session| listener.on_auth_event(event, session));

        debug!(url = %supabase_url, mode = %M::EXECUTION, schema = %options.schema, "created supabase client");

        Ok(Self {
            supabase_url: supabase_url.to_string(),
            supabase_key: supabase_key.to_string(),
            options,
            endpoints,
            auth,
            state,
            realtime: None,
            subscription,
        })
    }

    /// The project URL the client was built with.
    pub fn supabase_url(&self) -> &str {
        &self.supabase_url
    }

    pub fn supabase_key(&self) -> &str {
        &self.supabase_key
    }

    /// Options in effect, with identity headers merged and the session store resolved.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn endpoint(&self, service: Service) -> &str {
        self.endpoints.get(service)
    }

    pub fn rest_url(&self) -> &str {
        &self.endpoints.rest
    }

    pub fn realtime_url(&self) -> &str {
        &self.endpoints.realtime
    }

    pub fn auth_url(&self) -> &str {
        &self.endpoints.auth
    }

    pub fn storage_url(&self) -> &str {
        &self.endpoints.storage
    }

    pub fn functions_url(&self) -> &str {
        &self.endpoints.functions
    }

    /// Snapshot of the current `Authorization` header.
    pub fn auth_header(&self) -> HashMap<String, String> {
        self.state.auth_header.read().clone()
    }

    /// The auth client. Built at construction and never replaced.
    pub fn auth(&self) -> &AuthClient<M> {
        &self.auth
    }

    /// Always `None`: realtime subscriptions are not provided.
    pub fn realtime(&self) -> Option<&RealtimeClient> {
        self.realtime.as_ref()
    }

    /// The database client, built on first use.
    pub fn postgrest(&self) -> Result<Arc<PostgrestClient<M>>, ConfigurationError> {
        self.state.postgrest.get_or_try_init(|| {
            debug!(service = "database", url = %self.endpoints.rest, "building service client");
            services::create_postgrest(
                &self.endpoints.rest,
                self.state.service_headers(),
                &self.options.schema,
                self.options.postgrest_client_timeout,
            )
        })
    }

    /// The storage client, built on first use.
    pub fn storage(&self) -> Result<Arc<StorageClient<M>>, ConfigurationError> {
        self.state.storage.get_or_try_init(|| {
            debug!(service = "storage", url = %self.endpoints.storage, "building service client");
            services::create_storage(
                &self.endpoints.storage,
                &self.state.service_headers(),
                self.options.storage_client_timeout,
            )
        })
    }

    /// The edge functions client, built on first use.
    pub fn functions(&self) -> Result<Arc<FunctionsClient<M>>, ConfigurationError> {
        self.state.functions.get_or_try_init(|| {
            debug!(service = "functions", url = %self.endpoints.functions, "building service client");
            services::create_functions(
                &self.endpoints.functions,
                &self.state.service_headers(),
                self.options.function_client_timeout,
            )
        })
    }

    /// Start a query on a table. Same as [`from`](Self::from).
    pub fn table(&self, table: &str) -> Result<QueryBuilder<M>, ConfigurationError> {
        self.from(table)
    }

    /// Start a query on a table or view.
    pub fn from(&self, table: &str) -> Result<QueryBuilder<M>, ConfigurationError> {
        Ok(self.postgrest()?.from(table))
    }

    /// Call a stored function; the returned builder accepts filters.
    pub fn rpc<T: Serialize + ?Sized>(
        &self,
        function: &str,
        params: &T,
    ) -> Result<FilterBuilder<M>, ConfigurationError> {
        Ok(self.postgrest()?.rpc(function, params))
    }

    /// A database client for another schema, sharing the cached one's transport.
    pub fn schema(&self, schema: &str) -> Result<PostgrestClient<M>, ConfigurationError> {
        Ok(self.postgrest()?.schema(schema))
    }

    fn adopt_session_token(&self, lookup: Result<Option<Session>, supabase_client_auth::AuthError>) {
        let token = match lookup {
            Ok(Some(session)) => session.access_token,
            Ok(None) => self.supabase_key.clone(),
            Err(e) => {
                debug!(error = %e, "session lookup failed, using the api key");
                self.supabase_key.clone()
            }
        };
        self.state.set_token(&token);
    }
}

impl SupabaseClient<Blocking> {
    /// Build the client, then use the persisted session's access token, if
    /// any, as the bearer. Lookup failures fall back to the API key.
    pub fn create(
        supabase_url: &str,
        supabase_key: &str,
        options: ClientOptions,
    ) -> Result<Self, ConfigurationError> {
        let client = Self::new(supabase_url, supabase_key, options)?;
        let lookup = client.auth.get_session();
        client.adopt_session_token(lookup);
        Ok(client)
    }
}

impl SupabaseClient<NonBlocking> {
    /// Build the client, then use the persisted session's access token, if
    /// any, as the bearer. Lookup failures fall back to the API key.
    pub async fn create(
        supabase_url: &str,
        supabase_key: &str,
        options: ClientOptions,
    ) -> Result<Self, ConfigurationError> {
        let client = Self::new(supabase_url, supabase_key, options)?;
        let lookup = client.auth.get_session().await;
        client.adopt_session_token(lookup);
        Ok(client)
    }
}

impl<M: Mode> Drop for SupabaseClient<M> {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

impl<M: Mode> fmt::Debug for SupabaseClient<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("mode", &M::EXECUTION)
            .field("supabase_url", &self.supabase_url)
            .field("schema", &self.options.schema)
            .field("postgrest", &self.state.postgrest)
            .field("storage", &self.state.storage)
            .field("functions", &self.state.functions)
            .finish_non_exhaustive()
    }
}
