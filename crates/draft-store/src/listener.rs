//! Change listeners and their subscriptions

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Called after a committed state change with the action name and the
/// state as it was before the commit. The new state is available through
/// [`Store::get_state`](crate::Store::get_state).
///
/// Listener identity is `Arc` identity: keep a clone of the `Arc` to
/// remove it later with [`Store::un_subscribe`](crate::Store::un_subscribe).
pub type Listener<S> = Arc<dyn Fn(&str, &Arc<S>) + Send + Sync>;

/// Ordered listener sequence
///
/// Every registration gets its own id so a [`Subscription`] removes exactly
/// the registration it was created for, even when the same listener was
/// subscribed more than once.
pub(crate) struct ListenerRegistry<S> {
    next_id: u64,
    entries: Vec<(u64, Listener<S>)>,
}

impl<S> ListenerRegistry<S> {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, listener: Listener<S>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    fn remove_id(&mut self, id: u64) -> bool {
        match self.entries.iter().position(|(entry_id, _)| *entry_id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes the first registration of `listener`
    pub(crate) fn remove_listener(&mut self, listener: &Listener<S>) -> bool {
        match self
            .entries
            .iter()
            .position(|(_, entry)| Arc::ptr_eq(entry, listener))
        {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Copy of the sequence, so notification is unaffected by
    /// subscribe/unsubscribe calls made by the listeners themselves
    pub(crate) fn snapshot(&self) -> Vec<Listener<S>> {
        self.entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

pub(crate) fn lock<S>(registry: &Mutex<ListenerRegistry<S>>) -> MutexGuard<'_, ListenerRegistry<S>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle returned by [`Store::subscribe`](crate::Store::subscribe)
///
/// Dropping it keeps the listener subscribed. It holds the store weakly.
pub struct Subscription<S> {
    registry: Weak<Mutex<ListenerRegistry<S>>>,
    id: u64,
}

impl<S> Subscription<S> {
    pub(crate) fn new(registry: &Arc<Mutex<ListenerRegistry<S>>>, id: u64) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            id,
        }
    }

    /// Remove the listener registered by this subscription.
    ///
    /// No-op when it is already gone or the store has been dropped.
    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            if lock(&registry).remove_id(self.id) {
                log::trace!("listener {} unsubscribed", self.id);
            }
        }
    }
}

impl<S> fmt::Debug for Subscription<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listener() -> Listener<i32> {
        Arc::new(|_action: &str, _previous: &Arc<i32>| {})
    }

    #[test]
    fn test_registry_keeps_insertion_order() {
        let mut registry = ListenerRegistry::new();
        let first = listener();
        let second = listener();
        registry.add(Arc::clone(&first));
        registry.add(Arc::clone(&second));

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(Arc::ptr_eq(&snapshot[0], &first));
        assert!(Arc::ptr_eq(&snapshot[1], &second));
    }

    #[test]
    fn test_remove_listener_removes_first_match_only() {
        let mut registry = ListenerRegistry::new();
        let twice = listener();
        let other = listener();
        registry.add(Arc::clone(&twice));
        registry.add(Arc::clone(&other));
        registry.add(Arc::clone(&twice));

        assert!(registry.remove_listener(&twice));
        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(Arc::ptr_eq(&snapshot[0], &other));
        assert!(Arc::ptr_eq(&snapshot[1], &twice));

        assert!(!registry.remove_listener(&listener()));
    }

    #[test]
    fn test_subscription_removes_its_own_registration() {
        let registry = Arc::new(Mutex::new(ListenerRegistry::new()));
        let shared = listener();
        let first = Subscription::new(&registry, lock(&registry).add(Arc::clone(&shared)));
        let _second = Subscription::new(&registry, lock(&registry).add(Arc::clone(&shared)));

        first.unsubscribe();
        first.unsubscribe();

        assert_eq!(lock(&registry).len(), 1);
    }

    #[test]
    fn test_unsubscribe_after_registry_dropped() {
        let registry = Arc::new(Mutex::new(ListenerRegistry::new()));
        let subscription = Subscription::new(&registry, lock(&registry).add(listener()));
        drop(registry);

        subscription.unsubscribe();
    }
}
