use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// Seconds before `expires_at` at which a session already counts as expired.
pub const EXPIRY_MARGIN_SECS: i64 = 10;

/// A user session returned from sign-in or token refresh.
///
/// Matches the GoTrue session object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub token_type: String,
    #[serde(default)]
    pub user: Option<User>,
}

impl Session {
    /// Fill in `expires_at` from `expires_in` when the server omitted it.
    pub(crate) fn stamped(mut self) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = Some(Utc::now().timestamp() + self.expires_in);
        }
        self
    }

    /// Whether the access token is expired, or about to be.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => at - EXPIRY_MARGIN_SECS <= Utc::now().timestamp(),
            None => false,
        }
    }
}

/// A GoTrue user object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_metadata: Option<JsonValue>,
    #[serde(default)]
    pub app_metadata: Option<JsonValue>,
    #[serde(default)]
    pub is_anonymous: Option<bool>,
}

/// Auth state transitions reported to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthChangeEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
    PasswordRecovery,
    MfaChallengeVerified,
}

impl fmt::Display for AuthChangeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitialSession => write!(f, "INITIAL_SESSION"),
            Self::SignedIn => write!(f, "SIGNED_IN"),
            Self::SignedOut => write!(f, "SIGNED_OUT"),
            Self::TokenRefreshed => write!(f, "TOKEN_REFRESHED"),
            Self::UserUpdated => write!(f, "USER_UPDATED"),
            Self::PasswordRecovery => write!(f, "PASSWORD_RECOVERY"),
            Self::MfaChallengeVerified => write!(f, "MFA_CHALLENGE_VERIFIED"),
        }
    }
}

/// OAuth providers supported by GoTrue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OAuthProvider {
    Apple,
    Azure,
    Discord,
    Facebook,
    GitHub,
    GitLab,
    Google,
    Slack,
    Twitter,
    Custom(String),
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apple => write!(f, "apple"),
            Self::Azure => write!(f, "azure"),
            Self::Discord => write!(f, "discord"),
            Self::Facebook => write!(f, "facebook"),
            Self::GitHub => write!(f, "github"),
            Self::GitLab => write!(f, "gitlab"),
            Self::Google => write!(f, "google"),
            Self::Slack => write!(f, "slack"),
            Self::Twitter => write!(f, "twitter"),
            Self::Custom(s) => write!(f, "{}", s),
        }
    }
}

/// Sign-out scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignOutScope {
    /// All sessions of the user.
    #[default]
    Global,
    /// Only this session.
    Local,
    /// Every session except this one.
    Others,
}

impl fmt::Display for SignOutScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => write!(f, "global"),
            Self::Local => write!(f, "local"),
            Self::Others => write!(f, "others"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(expires_at: Option<i64>) -> Session {
        Session {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_in: 3600,
            expires_at,
            token_type: "bearer".into(),
            user: None,
        }
    }

    #[test]
    fn expiry_respects_margin() {
        let now = Utc::now().timestamp();
        assert!(!session(Some(now + 3600)).is_expired());
        assert!(session(Some(now + 5)).is_expired());
        assert!(session(Some(now - 1)).is_expired());
        assert!(!session(None).is_expired());
    }

    #[test]
    fn stamped_fills_expires_at() {
        let s = session(None).stamped();
        let at = s.expires_at.unwrap();
        assert!(at >= Utc::now().timestamp() + 3590);
        assert_eq!(session(Some(42)).stamped().expires_at, Some(42));
    }

    #[test]
    fn event_names_match_gotrue() {
        assert_eq!(AuthChangeEvent::SignedIn.to_string(), "SIGNED_IN");
        assert_eq!(
            serde_json::to_string(&AuthChangeEvent::TokenRefreshed).unwrap(),
            "\"TOKEN_REFRESHED\""
        );
    }

    #[test]
    fn session_deserializes_without_user() {
        let json = r#"{"access_token":"a","refresh_token":"r","expires_in":60,"token_type":"bearer"}"#;
        let s: Session = serde_json::from_str(json).unwrap();
        assert!(s.user.is_none());
        assert!(s.expires_at.is_none());
    }
}
