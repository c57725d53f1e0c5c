use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::json;
use supabase_client_core::headers::{bearer, to_header_map};
use supabase_client_core::{
    ApiRequest, ApiResponse, Blocking, ConfigurationError, FlowType, Mode, NonBlocking,
};
use tracing::debug;
use url::Url;

use crate::error::AuthError;
use crate::pkce;
use crate::subscription::{AuthSubscription, SubscriberRegistry};
use crate::types::*;

/// Settings the auth client is built from.
#[derive(Debug, Clone)]
pub struct AuthClientConfig {
    /// The auth endpoint, e.g. `https://your-project.supabase.co/auth/v1`.
    pub url: String,
    /// Headers sent with every request (API key, client info, ...).
    pub headers: HashMap<String, String>,
    /// Key under which the session is persisted.
    pub storage_key: String,
    pub auto_refresh_token: bool,
    pub persist_session: bool,
    pub flow_type: FlowType,
}

/// HTTP client for the Supabase GoTrue auth API.
///
/// One type serves both execution modes: `AuthClient<Blocking>` exposes plain
/// methods, `AuthClient<NonBlocking>` the same methods as `async fn`. Clones
/// share the session and the listener list.
///
/// # Example
/// ```ignore
/// let auth = client.auth();
/// let _sub = auth.on_auth_state_change(|event, session| {
///     println!("{event}: {:?}", session.map(|s| &s.user));
/// });
/// let session = auth.sign_in_with_password("user@example.com", "password").await?;
/// ```
pub struct AuthClient<M: Mode> {
    inner: Arc<AuthInner<M>>,
}

struct AuthInner<M: Mode> {
    http: M::Http,
    base_url: String,
    storage_key: String,
    auto_refresh_token: bool,
    persist_session: bool,
    flow_type: FlowType,
    store: Arc<M::SessionStore>,
    current: RwLock<Option<Session>>,
    subscribers: Arc<SubscriberRegistry>,
}

impl<M: Mode> Clone for AuthClient<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: Mode> fmt::Debug for AuthClient<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthClient")
            .field("mode", &M::EXECUTION)
            .field("base_url", &self.inner.base_url)
            .field("flow_type", &self.inner.flow_type)
            .finish()
    }
}

impl<M: Mode> AuthClient<M> {
    /// Create a new auth client persisting sessions in `store`.
    pub fn new(config: AuthClientConfig, store: Arc<M::SessionStore>) -> Result<Self, AuthError> {
        let mut headers = to_header_map(&config.headers)?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = M::build_http(headers, None)?;

        Ok(Self {
            inner: Arc::new(AuthInner {
                http,
                base_url: config.url.trim_end_matches('/').to_string(),
                storage_key: config.storage_key,
                auto_refresh_token: config.auto_refresh_token,
                persist_session: config.persist_session,
                flow_type: config.flow_type,
                store,
                current: RwLock::new(None),
                subscribers: Arc::new(SubscriberRegistry::default()),
            }),
        })
    }

    /// The auth endpoint this client talks to.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn flow_type(&self) -> FlowType {
        self.inner.flow_type
    }

    /// Register a listener for auth state transitions.
    ///
    /// Listeners run synchronously on the thread that caused the transition.
    pub fn on_auth_state_change<F>(&self, callback: F) -> AuthSubscription
    where
        F: Fn(AuthChangeEvent, Option<&Session>) + Send + Sync + 'static,
    {
        self.inner.subscribers.subscribe(callback)
    }

    /// Number of registered listeners.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    /// The in-memory session, without consulting storage or the network.
    pub fn current_session(&self) -> Option<Session> {
        self.inner.current.read().clone()
    }

    // ─── Internal Helpers ──────────────────────────────────────

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    fn code_verifier_key(&self) -> String {
        format!("{}{}", self.inner.storage_key, pkce::CODE_VERIFIER_SUFFIX)
    }

    fn emit(&self, event: AuthChangeEvent, session: Option<&Session>) {
        debug!(%event, has_session = session.is_some(), "auth state change");
        self.inner.subscribers.notify(event, session);
    }

    fn password_request(&self, email: &str, password: &str) -> Result<ApiRequest, AuthError> {
        Ok(ApiRequest::post(self.url("/token?grant_type=password"))
            .json(&json!({ "email": email, "password": password }))?)
    }

    fn refresh_request(&self, refresh_token: &str) -> Result<ApiRequest, AuthError> {
        Ok(ApiRequest::post(self.url("/token?grant_type=refresh_token"))
            .json(&json!({ "refresh_token": refresh_token }))?)
    }

    fn exchange_request(&self, code: &str, verifier: &str) -> Result<ApiRequest, AuthError> {
        Ok(ApiRequest::post(self.url("/token?grant_type=pkce"))
            .json(&json!({ "auth_code": code, "code_verifier": verifier }))?)
    }

    fn logout_request(&self, jwt: &str, scope: SignOutScope) -> Result<ApiRequest, AuthError> {
        Ok(ApiRequest::post(self.url(&format!("/logout?scope={scope}")))
            .header(AUTHORIZATION, bearer_value(jwt)?))
    }

    fn user_request(&self, jwt: &str) -> Result<ApiRequest, AuthError> {
        Ok(ApiRequest::get(self.url("/user")).header(AUTHORIZATION, bearer_value(jwt)?))
    }

    fn jwt_or_current(&self, jwt: Option<&str>) -> Result<String, AuthError> {
        match jwt {
            Some(jwt) => Ok(jwt.to_string()),
            None => self
                .current_session()
                .map(|s| s.access_token)
                .ok_or(AuthError::NoSession),
        }
    }

    /// Build the `/authorize` URL, with a code challenge for PKCE.
    fn authorize_url(
        &self,
        provider: &OAuthProvider,
        redirect_to: Option<&str>,
        scopes: Option<&str>,
        code_challenge: Option<&str>,
    ) -> Result<String, AuthError> {
        let mut url = Url::parse(&self.url("/authorize"))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("provider", &provider.to_string());
            if let Some(redirect) = redirect_to {
                query.append_pair("redirect_to", redirect);
            }
            if let Some(scopes) = scopes {
                query.append_pair("scopes", scopes);
            }
            if let Some(challenge) = code_challenge {
                query.append_pair("code_challenge", challenge);
                query.append_pair("code_challenge_method", pkce::CODE_CHALLENGE_METHOD);
            }
        }
        Ok(url.to_string())
    }

    /// Make `session` current and return the write that persists it.
    fn remember(&self, session: &Session) -> Result<StoreWrite, AuthError> {
        *self.inner.current.write() = Some(session.clone());
        if !self.inner.persist_session {
            return Ok(StoreWrite::Nothing);
        }
        let raw = serde_json::to_string(session)?;
        Ok(StoreWrite::Set(self.inner.storage_key.clone(), raw))
    }

    /// Drop the current session and return the write that unpersists it.
    fn forget(&self) -> StoreWrite {
        *self.inner.current.write() = None;
        if self.inner.persist_session {
            StoreWrite::Remove(self.inner.storage_key.clone())
        } else {
            StoreWrite::Nothing
        }
    }

    fn cached(&self) -> Cached {
        match self.current_session() {
            Some(session) => Cached::Hit(session),
            None if self.inner.persist_session => Cached::Load(self.inner.storage_key.clone()),
            None => Cached::Miss,
        }
    }

    /// Decode a persisted session. Anything unreadable is removed from the store.
    fn decode_persisted(&self, raw: Option<String>) -> (Option<Session>, StoreWrite) {
        let session = raw.and_then(|raw| match serde_json::from_str::<Session>(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                debug!(error = %e, "discarding unreadable persisted session");
                None
            }
        });
        match session {
            Some(session) => (Some(session), StoreWrite::Nothing),
            None => (None, StoreWrite::Remove(self.inner.storage_key.clone())),
        }
    }

    fn check(&self, session: Session) -> Freshness {
        if !session.is_expired() {
            *self.inner.current.write() = Some(session.clone());
            Freshness::Valid(session)
        } else if self.inner.auto_refresh_token {
            Freshness::Refresh(session.refresh_token)
        } else {
            Freshness::Expired
        }
    }

    /// Code challenge for the configured flow, with the write that keeps its verifier.
    fn challenge(&self) -> (Option<String>, StoreWrite) {
        match self.inner.flow_type {
            FlowType::Implicit => (None, StoreWrite::Nothing),
            FlowType::Pkce => {
                let verifier = pkce::generate_code_verifier();
                let challenge = pkce::code_challenge(&verifier);
                (
                    Some(challenge),
                    StoreWrite::Set(self.code_verifier_key(), verifier),
                )
            }
        }
    }
}

/// A pending change to the session store.
#[must_use]
enum StoreWrite {
    Nothing,
    Set(String, String),
    Remove(String),
}

enum Cached {
    Hit(Session),
    Miss,
    Load(String),
}

enum Freshness {
    Valid(Session),
    Refresh(String),
    Expired,
}

fn bearer_value(token: &str) -> Result<HeaderValue, AuthError> {
    HeaderValue::from_str(&bearer(token)).map_err(|e| {
        AuthError::InvalidConfig(ConfigurationError::InvalidHeader {
            name: AUTHORIZATION.to_string(),
            reason: e.to_string(),
        })
    })
}

fn session_from(resp: ApiResponse) -> Result<Session, AuthError> {
    if !resp.is_success() {
        return Err(AuthError::from_response(&resp));
    }
    Ok(resp.json::<Session>()?.stamped())
}

fn user_from(resp: ApiResponse) -> Result<User, AuthError> {
    if !resp.is_success() {
        return Err(AuthError::from_response(&resp));
    }
    Ok(resp.json()?)
}

/// Logout failures from the API mean the session is already gone server-side.
fn ignore_api_error(result: Result<ApiResponse, AuthError>) -> Result<(), AuthError> {
    match result {
        Ok(resp) if !resp.is_success() => {
            debug!(status = resp.status, "ignoring logout API error");
            Ok(())
        }
        Ok(_) => Ok(()),
        Err(e) => Err(e),
    }
}

// ─── Blocking ──────────────────────────────────────────────────

impl AuthClient<Blocking> {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse, AuthError> {
        Ok(request.send_blocking(&self.inner.http)?)
    }

    fn apply(&self, write: StoreWrite) {
        match write {
            StoreWrite::Nothing => {}
            StoreWrite::Set(key, value) => self.inner.store.set_item(&key, &value),
            StoreWrite::Remove(key) => self.inner.store.remove_item(&key),
        }
    }

    fn stored_session(&self) -> Option<Session> {
        match self.cached() {
            Cached::Hit(session) => Some(session),
            Cached::Miss => None,
            Cached::Load(key) => {
                let (session, write) = self.decode_persisted(self.inner.store.get_item(&key));
                self.apply(write);
                session
            }
        }
    }

    fn commit(&self, event: AuthChangeEvent, session: Session) -> Result<Session, AuthError> {
        self.apply(self.remember(&session)?);
        self.emit(event, Some(&session));
        Ok(session)
    }

    /// The current session, loading it from storage and refreshing it when
    /// expired (if auto refresh is on). `None` when signed out.
    pub fn get_session(&self) -> Result<Option<Session>, AuthError> {
        match self.stored_session().map(|s| self.check(s)) {
            Some(Freshness::Valid(session)) => Ok(Some(session)),
            Some(Freshness::Refresh(token)) => self.refresh_with(&token).map(Some),
            Some(Freshness::Expired) | None => Ok(None),
        }
    }

    /// Sign in with email and password.
    pub fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let resp = self.send(self.password_request(email, password)?)?;
        self.commit(AuthChangeEvent::SignedIn, session_from(resp)?)
    }

    /// Adopt an externally obtained session.
    pub fn set_session(&self, session: Session) -> Result<(), AuthError> {
        self.commit(AuthChangeEvent::SignedIn, session.stamped())?;
        Ok(())
    }

    /// Exchange the current refresh token for a new session.
    pub fn refresh_session(&self) -> Result<Session, AuthError> {
        let session = self.stored_session().ok_or(AuthError::NoSession)?;
        self.refresh_with(&session.refresh_token)
    }

    fn refresh_with(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let resp = self.send(self.refresh_request(refresh_token)?)?;
        self.commit(AuthChangeEvent::TokenRefreshed, session_from(resp)?)
    }

    /// Sign out (global scope).
    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_out_with_scope(SignOutScope::Global)
    }

    /// Sign out with a specific scope. The local session is cleared unless
    /// `scope` is [`SignOutScope::Others`].
    pub fn sign_out_with_scope(&self, scope: SignOutScope) -> Result<(), AuthError> {
        if let Some(session) = self.stored_session() {
            ignore_api_error(self.send(self.logout_request(&session.access_token, scope)?))?;
        }
        if scope != SignOutScope::Others {
            self.apply(self.forget());
            self.emit(AuthChangeEvent::SignedOut, None);
        }
        Ok(())
    }

    /// Fetch the user for `jwt`, or for the current session.
    pub fn get_user(&self, jwt: Option<&str>) -> Result<User, AuthError> {
        let jwt = self.jwt_or_current(jwt)?;
        user_from(self.send(self.user_request(&jwt)?)?)
    }

    /// URL to send the user to for OAuth sign-in. Under PKCE a code verifier
    /// is generated and persisted for [`exchange_code_for_session`](Self::exchange_code_for_session).
    pub fn get_oauth_sign_in_url(
        &self,
        provider: OAuthProvider,
        redirect_to: Option<&str>,
        scopes: Option<&str>,
    ) -> Result<String, AuthError> {
        let (challenge, write) = self.challenge();
        self.apply(write);
        self.authorize_url(&provider, redirect_to, scopes, challenge.as_deref())
    }

    /// Complete a PKCE sign-in with the auth code from the redirect.
    pub fn exchange_code_for_session(&self, auth_code: &str) -> Result<Session, AuthError> {
        let key = self.code_verifier_key();
        let verifier = self
            .inner
            .store
            .get_item(&key)
            .ok_or(AuthError::MissingCodeVerifier)?;
        let resp = self.send(self.exchange_request(auth_code, &verifier)?)?;
        self.apply(StoreWrite::Remove(key));
        self.commit(AuthChangeEvent::SignedIn, session_from(resp)?)
    }
}

// ─── Non-blocking ──────────────────────────────────────────────

impl AuthClient<NonBlocking> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, AuthError> {
        Ok(request.send(&self.inner.http).await?)
    }

    async fn apply(&self, write: StoreWrite) {
        match write {
            StoreWrite::Nothing => {}
            StoreWrite::Set(key, value) => self.inner.store.set_item(&key, &value).await,
            StoreWrite::Remove(key) => self.inner.store.remove_item(&key).await,
        }
    }

    async fn stored_session(&self) -> Option<Session> {
        match self.cached() {
            Cached::Hit(session) => Some(session),
            Cached::Miss => None,
            Cached::Load(key) => {
                let raw = self.inner.store.get_item(&key).await;
                let (session, write) = self.decode_persisted(raw);
                self.apply(write).await;
                session
            }
        }
    }

    async fn commit(&self, event: AuthChangeEvent, session: Session) -> Result<Session, AuthError> {
        self.apply(self.remember(&session)?).await;
        self.emit(event, Some(&session));
        Ok(session)
    }

    /// The current session, loading it from storage and refreshing it when
    /// expired (if auto refresh is on). `None` when signed out.
    pub async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        match self.stored_session().await.map(|s| self.check(s)) {
            Some(Freshness::Valid(session)) => Ok(Some(session)),
            Some(Freshness::Refresh(token)) => self.refresh_with(&token).await.map(Some),
            Some(Freshness::Expired) | None => Ok(None),
        }
    }

    /// Sign in with email and password.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let resp = self.send(self.password_request(email, password)?).await?;
        self.commit(AuthChangeEvent::SignedIn, session_from(resp)?).await
    }

    /// Adopt an externally obtained session.
    pub async fn set_session(&self, session: Session) -> Result<(), AuthError> {
        self.commit(AuthChangeEvent::SignedIn, session.stamped()).await?;
        Ok(())
    }

    /// Exchange the current refresh token for a new session.
    pub async fn refresh_session(&self) -> Result<Session, AuthError> {
        let session = self.stored_session().await.ok_or(AuthError::NoSession)?;
        self.refresh_with(&session.refresh_token).await
    }

    async fn refresh_with(&self, refresh_token: &str) -> Result<Session, AuthError> {
        let resp = self.send(self.refresh_request(refresh_token)?).await?;
        self.commit(AuthChangeEvent::TokenRefreshed, session_from(resp)?).await
    }

    /// Sign out (global scope).
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.sign_out_with_scope(SignOutScope::Global).await
    }

    /// Sign out with a specific scope. The local session is cleared unless
    /// `scope` is [`SignOutScope::Others`].
    pub async fn sign_out_with_scope(&self, scope: SignOutScope) -> Result<(), AuthError> {
        if let Some(session) = self.stored_session().await {
            let request = self.logout_request(&session.access_token, scope)?;
            ignore_api_error(self.send(request).await)?;
        }
        if scope != SignOutScope::Others {
            self.apply(self.forget()).await;
            self.emit(AuthChangeEvent::SignedOut, None);
        }
        Ok(())
    }

    /// Fetch the user for `jwt`, or for the current session.
    pub async fn get_user(&self, jwt: Option<&str>) -> Result<User, AuthError> {
        let jwt = self.jwt_or_current(jwt)?;
        user_from(self.send(self.user_request(&jwt)?).await?)
    }

    /// URL to send the user to for OAuth sign-in. Under PKCE a code verifier
    /// is generated and persisted for [`exchange_code_for_session`](Self::exchange_code_for_session).
    pub async fn get_oauth_sign_in_url(
        &self,
        provider: OAuthProvider,
        redirect_to: Option<&str>,
        scopes: Option<&str>,
    ) -> Result<String, AuthError> {
        let (challenge, write) = self.challenge();
        self.apply(write).await;
        self.authorize_url(&provider, redirect_to, scopes, challenge.as_deref())
    }

    /// Complete a PKCE sign-in with the auth code from the redirect.
    pub async fn exchange_code_for_session(&self, auth_code: &str) -> Result<Session, AuthError> {
        let key = self.code_verifier_key();
        let verifier = self
            .inner
            .store
            .get_item(&key)
            .await
            .ok_or(AuthError::MissingCodeVerifier)?;
        let resp = self.send(self.exchange_request(auth_code, &verifier)?).await?;
        self.apply(StoreWrite::Remove(key)).await;
        self.commit(AuthChangeEvent::SignedIn, session_from(resp)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supabase_client_core::{AsyncMemoryStorage, SyncMemoryStorage, SyncSupportedStorage};

    fn config(flow_type: FlowType) -> AuthClientConfig {
        AuthClientConfig {
            url: "https://example.supabase.co/auth/v1".into(),
            headers: HashMap::from([("apiKey".to_string(), "test-key".to_string())]),
            storage_key: "supabase.auth.token".into(),
            auto_refresh_token: true,
            persist_session: true,
            flow_type,
        }
    }

    fn session(token: &str) -> Session {
        Session {
            access_token: token.into(),
            refresh_token: "refresh".into(),
            expires_in: 3600,
            expires_at: None,
            token_type: "bearer".into(),
            user: None,
        }
    }

    #[test]
    fn url_building() {
        let store: Arc<dyn SyncSupportedStorage> = Arc::new(SyncMemoryStorage::new());
        let mut cfg = config(FlowType::Implicit);
        cfg.url.push('/');
        let client = AuthClient::<Blocking>::new(cfg, store).unwrap();
        assert_eq!(client.base_url(), "https://example.supabase.co/auth/v1");
        assert_eq!(
            client.url("/token?grant_type=password"),
            "https://example.supabase.co/auth/v1/token?grant_type=password"
        );
    }

    #[test]
    fn invalid_header_is_rejected() {
        let store: Arc<dyn SyncSupportedStorage> = Arc::new(SyncMemoryStorage::new());
        let mut cfg = config(FlowType::Implicit);
        cfg.headers.insert("x-bad".into(), "a\nb".into());
        assert!(matches!(
            AuthClient::<Blocking>::new(cfg, store),
            Err(AuthError::InvalidConfig(ConfigurationError::InvalidHeader { .. }))
        ));
    }

    #[test]
    fn implicit_oauth_url_has_no_challenge() {
        let store: Arc<dyn SyncSupportedStorage> = Arc::new(SyncMemoryStorage::new());
        let client = AuthClient::<Blocking>::new(config(FlowType::Implicit), store.clone()).unwrap();
        let url = client
            .get_oauth_sign_in_url(OAuthProvider::GitHub, Some("https://app/cb"), None)
            .unwrap();
        assert!(url.starts_with("https://example.supabase.co/auth/v1/authorize?"));
        assert!(url.contains("provider=github"));
        assert!(url.contains("redirect_to="));
        assert!(!url.contains("code_challenge"));
        assert!(store.get_item("supabase.auth.token-code-verifier").is_none());
    }

    #[test]
    fn pkce_oauth_url_persists_verifier() {
        let store: Arc<dyn SyncSupportedStorage> = Arc::new(SyncMemoryStorage::new());
        let client = AuthClient::<Blocking>::new(config(FlowType::Pkce), store.clone()).unwrap();
        let url = client
            .get_oauth_sign_in_url(OAuthProvider::Google, None, Some("email"))
            .unwrap();
        let verifier = store
            .get_item("supabase.auth.token-code-verifier")
            .expect("verifier stored");
        let challenge = pkce::code_challenge(&verifier);
        assert!(url.contains(&format!("code_challenge={challenge}")));
        assert!(url.contains("code_challenge_method=s256"));
    }

    #[test]
    fn exchange_without_verifier_fails_before_network() {
        let store: Arc<dyn SyncSupportedStorage> = Arc::new(SyncMemoryStorage::new());
        let client = AuthClient::<Blocking>::new(config(FlowType::Pkce), store).unwrap();
        assert!(matches!(
            client.exchange_code_for_session("code"),
            Err(AuthError::MissingCodeVerifier)
        ));
    }

    #[test]
    fn set_session_persists_and_notifies() {
        let store: Arc<dyn SyncSupportedStorage> = Arc::new(SyncMemoryStorage::new());
        let client = AuthClient::<Blocking>::new(config(FlowType::Implicit), store.clone()).unwrap();
        let events = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        client.on_auth_state_change(move |event, session| {
            sink.lock()
                .push((event, session.map(|s| s.access_token.clone())));
        });

        client.set_session(session("user-token")).unwrap();

        assert_eq!(
            *events.lock(),
            vec![(AuthChangeEvent::SignedIn, Some("user-token".to_string()))]
        );
        let persisted = store.get_item("supabase.auth.token").unwrap();
        assert!(persisted.contains("user-token"));
        assert_eq!(
            client.get_session().unwrap().map(|s| s.access_token),
            Some("user-token".to_string())
        );
    }

    #[test]
    fn get_session_recovers_persisted_session() {
        let store: Arc<dyn SyncSupportedStorage> = Arc::new(SyncMemoryStorage::new());
        let stored = session("persisted").stamped();
        store.set_item("supabase.auth.token", &serde_json::to_string(&stored).unwrap());

        let client = AuthClient::<Blocking>::new(config(FlowType::Implicit), store).unwrap();
        assert!(client.current_session().is_none());
        let found = client.get_session().unwrap().unwrap();
        assert_eq!(found.access_token, "persisted");
        assert!(client.current_session().is_some());
    }

    #[test]
    fn get_session_discards_garbage() {
        let store: Arc<dyn SyncSupportedStorage> = Arc::new(SyncMemoryStorage::new());
        store.set_item("supabase.auth.token", "not json");
        let client = AuthClient::<Blocking>::new(config(FlowType::Implicit), store.clone()).unwrap();
        assert!(client.get_session().unwrap().is_none());
        assert!(store.get_item("supabase.auth.token").is_none());
    }

    #[test]
    fn expired_session_without_auto_refresh_is_none() {
        let store: Arc<dyn SyncSupportedStorage> = Arc::new(SyncMemoryStorage::new());
        let mut expired = session("old");
        expired.expires_at = Some(chrono::Utc::now().timestamp() - 60);
        store.set_item("supabase.auth.token", &serde_json::to_string(&expired).unwrap());

        let mut cfg = config(FlowType::Implicit);
        cfg.auto_refresh_token = false;
        let client = AuthClient::<Blocking>::new(cfg, store).unwrap();
        assert!(client.get_session().unwrap().is_none());
    }

    #[test]
    fn sign_out_without_session_skips_network() {
        let store: Arc<dyn SyncSupportedStorage> = Arc::new(SyncMemoryStorage::new());
        let client = AuthClient::<Blocking>::new(config(FlowType::Implicit), store).unwrap();
        let events = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        client.on_auth_state_change(move |event, session| {
            sink.lock().push((event, session.is_some()));
        });

        client.sign_out().unwrap();
        assert_eq!(*events.lock(), vec![(AuthChangeEvent::SignedOut, false)]);
    }

    #[test]
    fn get_user_without_session_is_no_session() {
        let store: Arc<dyn SyncSupportedStorage> = Arc::new(SyncMemoryStorage::new());
        let client = AuthClient::<Blocking>::new(config(FlowType::Implicit), store).unwrap();
        assert!(matches!(client.get_user(None), Err(AuthError::NoSession)));
    }

    #[tokio::test]
    async fn async_set_session_then_get_session() {
        let store = Arc::new(AsyncMemoryStorage::new());
        let client = AuthClient::<NonBlocking>::new(config(FlowType::Implicit), store).unwrap();
        assert!(client.get_session().await.unwrap().is_none());

        client.set_session(session("async-token")).await.unwrap();
        let found = client.get_session().await.unwrap().unwrap();
        assert_eq!(found.access_token, "async-token");
        assert_eq!(client.current_session(), Some(found));
    }

    #[tokio::test]
    async fn async_store_follows_the_session_flow() {
        use supabase_client_core::AsyncSupportedStorage;

        let store = Arc::new(AsyncMemoryStorage::new());
        store.set_item("supabase.auth.token", "not json").await;
        let client =
            AuthClient::<NonBlocking>::new(config(FlowType::Implicit), store.clone()).unwrap();
        assert!(client.get_session().await.unwrap().is_none());
        assert!(store.get_item("supabase.auth.token").await.is_none());

        client.set_session(session("user-token")).await.unwrap();
        let persisted = store.get_item("supabase.auth.token").await.unwrap();
        assert!(persisted.contains("user-token"));

        let mut cfg = config(FlowType::Implicit);
        cfg.persist_session = false;
        let local = AuthClient::<NonBlocking>::new(cfg, store.clone()).unwrap();
        local.set_session(session("memory-only")).await.unwrap();
        let persisted = store.get_item("supabase.auth.token").await.unwrap();
        assert!(persisted.contains("user-token"));
        assert_eq!(
            local.get_session().await.unwrap().map(|s| s.access_token),
            Some("memory-only".to_string())
        );
    }

    #[tokio::test]
    async fn async_sign_out_without_session_clears_storage() {
        use supabase_client_core::AsyncSupportedStorage;

        let store = Arc::new(AsyncMemoryStorage::new());
        store.set_item("supabase.auth.token", "{\"truncated\":").await;
        let client =
            AuthClient::<NonBlocking>::new(config(FlowType::Implicit), store.clone()).unwrap();
        let events = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        client.on_auth_state_change(move |event, _| sink.lock().push(event));

        client.sign_out().await.unwrap();
        assert_eq!(*events.lock(), vec![AuthChangeEvent::SignedOut]);
        assert!(store.get_item("supabase.auth.token").await.is_none());
    }

    #[tokio::test]
    async fn async_pkce_url_persists_verifier() {
        use supabase_client_core::AsyncSupportedStorage;

        let store = Arc::new(AsyncMemoryStorage::new());
        let client =
            AuthClient::<NonBlocking>::new(config(FlowType::Pkce), store.clone()).unwrap();
        let url = client
            .get_oauth_sign_in_url(OAuthProvider::GitHub, None, None)
            .await
            .unwrap();
        let verifier = store
            .get_item("supabase.auth.token-code-verifier")
            .await
            .unwrap();
        assert!(url.contains(&pkce::code_challenge(&verifier)));
    }
}
