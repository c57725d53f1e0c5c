use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// A service handle built on first access and dropped on invalidation.
///
/// Construction runs with the slot locked, so an invalidation can never be
/// overwritten by a build that started before it.
pub(crate) struct LazyService<T> {
    slot: Mutex<Option<Arc<T>>>,
}

impl<T> LazyService<T> {
    pub(crate) fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// The cached instance, building it with `init` if the slot is empty.
    ///
    /// A failed build leaves the slot empty.
    pub(crate) fn get_or_try_init<E>(
        &self,
        init: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        let mut slot = self.slot.lock();
        if let Some(service) = slot.as_ref() {
            return Ok(Arc::clone(service));
        }
        let service = Arc::new(init()?);
        *slot = Some(Arc::clone(&service));
        Ok(service)
    }

    /// Drop the cached instance. Returns whether one was held.
    pub(crate) fn invalidate(&self) -> bool {
        self.slot.lock().take().is_some()
    }

    pub(crate) fn is_set(&self) -> bool {
        self.slot.lock().is_some()
    }
}

impl<T> fmt::Debug for LazyService<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyService")
            .field("set", &self.is_set())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn builds_once_until_invalidated() {
        let cache = LazyService::new();
        let builds = Cell::new(0);
        let build = || {
            builds.set(builds.get() + 1);
            Ok::<_, ()>(builds.get())
        };

        let first = cache.get_or_try_init(build).unwrap();
        let second = cache.get_or_try_init(build).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds.get(), 1);

        assert!(cache.invalidate());
        assert!(!cache.is_set());
        let third = cache.get_or_try_init(build).unwrap();
        assert_eq!(*third, 2);
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn failed_build_leaves_slot_empty() {
        let cache: LazyService<u8> = LazyService::new();
        assert_eq!(cache.get_or_try_init(|| Err("boom")), Err("boom"));
        assert!(!cache.is_set());
        assert!(!cache.invalidate());
        assert_eq!(*cache.get_or_try_init(|| Ok::<_, ()>(7)).unwrap(), 7);
    }
}
