use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::types::{AuthChangeEvent, Session};

/// Callback invoked on every auth state transition.
pub type AuthStateCallback = Arc<dyn Fn(AuthChangeEvent, Option<&Session>) + Send + Sync + 'static>;

/// Registered auth state listeners.
///
/// Listeners are called in registration order, one at a time, with no
/// internal lock held, so a listener may itself subscribe or unsubscribe.
#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, AuthStateCallback)>>,
}

impl SubscriberRegistry {
    pub(crate) fn subscribe<F>(self: &Arc<Self>, callback: F) -> AuthSubscription
    where
        F: Fn(AuthChangeEvent, Option<&Session>) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let callback: AuthStateCallback = Arc::new(callback);
        self.listeners.lock().push((id, callback));
        AuthSubscription {
            id,
            registry: Arc::downgrade(self),
        }
    }

    fn unsubscribe(&self, id: u64) {
        self.listeners.lock().retain(|(existing, _)| *existing != id);
    }

    pub(crate) fn notify(&self, event: AuthChangeEvent, session: Option<&Session>) {
        let listeners: Vec<AuthStateCallback> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();
        for listener in listeners {
            listener(event, session);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.lock().len()
    }
}

/// Handle for one registered auth state listener.
///
/// Dropping the handle keeps the listener registered; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
pub struct AuthSubscription {
    id: u64,
    registry: Weak<SubscriberRegistry>,
}

impl AuthSubscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remove the listener. A no-op if the auth client is gone.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unsubscribe(self.id);
        }
    }
}

impl fmt::Debug for AuthSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSubscription")
            .field("id", &self.id)
            .finish()
    }
}
