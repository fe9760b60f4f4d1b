use crate::action::{Action, ActionEntry, ActionKind, ActionMap, DispatchTarget, Params, PluginAction};
use crate::config::{StoreConfig, UnknownActionPolicy};
use crate::draft::{CloneProducer, Producer};
use crate::error::{Result, StoreError};
use crate::handler::{ActionHandler, BoxFuture};
use crate::listener::{self, Listener, ListenerRegistry, Subscription};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Action name reported to listeners for actions dispatched directly
pub const NO_TYPE: &str = "NO_TYPE";

static NEXT_UNNAMED_STORE: AtomicU64 = AtomicU64::new(0);

fn generate_name() -> String {
    format!(
        "NO_NAME_STORE_{}",
        NEXT_UNNAMED_STORE.fetch_add(1, Ordering::Relaxed)
    )
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

struct StoreInner<S> {
    name: String,
    config: StoreConfig,
    state: RwLock<Arc<S>>,
    actions: ActionMap<S>,
    handlers: RwLock<HashMap<String, Arc<dyn ActionHandler<S>>>>,
    listeners: Arc<Mutex<ListenerRegistry<S>>>,
    producer: Box<dyn Producer<S>>,
}

/// Store - holds the state and runs the dispatch → draft → commit → notify loop
///
/// The store follows an immutable-state pattern:
/// - The committed state is never mutated; actions work on a draft
/// - A commit replaces the state `Arc` only when the draft changed
/// - Listeners are notified, in subscription order, after each commit
///
/// `Store` is a cheap handle; clones share the same state. Plugin handlers
/// and listeners receive or capture a handle to dispatch back into it.
///
/// # Dispatch timing
///
/// Everything synchronous happens inside [`dispatch`](Self::dispatch): a
/// sync action has committed and notified by the time it returns. The
/// returned future carries only what is still pending (async actions,
/// the async tail of a plugin handler) and resolves once all of it is done.
pub struct Store<S> {
    inner: Arc<StoreInner<S>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> Store<S>
where
    S: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create a store with a generated name
    pub fn new(initial_state: impl Into<Arc<S>>, actions: ActionMap<S>) -> Self {
        Self::with_config(initial_state, actions, StoreConfig::default())
    }

    pub fn with_name(
        initial_state: impl Into<Arc<S>>,
        actions: ActionMap<S>,
        name: impl Into<String>,
    ) -> Self {
        Self::with_config(initial_state, actions, StoreConfig::named(name))
    }

    pub fn with_config(
        initial_state: impl Into<Arc<S>>,
        actions: ActionMap<S>,
        config: StoreConfig,
    ) -> Self {
        Self::with_producer(initial_state, actions, config, CloneProducer)
    }
}

impl<S> Store<S>
where
    S: Send + Sync + 'static,
{
    /// Create a store that derives drafts with a custom [`Producer`]
    pub fn with_producer<P>(
        initial_state: impl Into<Arc<S>>,
        actions: ActionMap<S>,
        config: StoreConfig,
        producer: P,
    ) -> Self
    where
        P: Producer<S> + 'static,
    {
        let name = config.name.clone().unwrap_or_else(generate_name);
        log::debug!("Store[{}]: created with {} actions", name, actions.len());
        Self {
            inner: Arc::new(StoreInner {
                name,
                config,
                state: RwLock::new(initial_state.into()),
                actions,
                handlers: RwLock::new(HashMap::new()),
                listeners: Arc::new(Mutex::new(ListenerRegistry::new())),
                producer: Box::new(producer),
            }),
        }
    }

    /// Name without the `Store[..]` decoration
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The current state (the committed `Arc`, not a copy)
    pub fn get_state(&self) -> Arc<S> {
        Arc::clone(&read(&self.inner.state))
    }

    /// Dispatch without params
    pub fn dispatch(
        &self,
        target: impl Into<DispatchTarget<S>>,
    ) -> BoxFuture<'static, Result<()>> {
        self.dispatch_with(target, Value::Null)
    }

    /// Dispatch an action by name or directly
    ///
    /// - `Named`: looked up in the action map. Unknown names follow the
    ///   configured [`UnknownActionPolicy`]; plugin actions go to their
    ///   handler, which must be registered at this point.
    /// - `Direct`: runs the action; listeners see [`NO_TYPE`] as its name.
    ///
    /// The returned future resolves when the dispatch and everything it
    /// triggered has finished, or fails with the first error on the way.
    /// Failed dispatches leave the state unchanged.
    pub fn dispatch_with(
        &self,
        target: impl Into<DispatchTarget<S>>,
        params: Params,
    ) -> BoxFuture<'static, Result<()>> {
        match target.into() {
            DispatchTarget::Direct(action) => self.run_action(NO_TYPE, &action, params),
            DispatchTarget::Named(name) => match self.inner.actions.get(&name) {
                Some(ActionEntry::Plain(action)) => self.run_action(&name, action, params),
                Some(ActionEntry::Plugin(plugin)) => self.run_plugin(&name, plugin, params),
                None => self.unknown_action(name),
            },
        }
    }

    /// Register (or replace) the handler for plugin actions naming `name`
    pub fn register_action_handler<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&Store<S>, &PluginAction, Params) -> BoxFuture<'static, anyhow::Result<()>>
            + Send
            + Sync
            + 'static,
    {
        self.register_handler(name, handler);
    }

    /// Register (or replace) an [`ActionHandler`] implementation
    pub fn register_handler<H>(&self, name: impl Into<String>, handler: H)
    where
        H: ActionHandler<S> + 'static,
    {
        let name = name.into();
        let handler: Arc<dyn ActionHandler<S>> = Arc::new(handler);
        if write(&self.inner.handlers)
            .insert(name.clone(), handler)
            .is_some()
        {
            log::debug!("{}: replaced action handler \"{}\"", self, name);
        } else {
            log::debug!("{}: registered action handler \"{}\"", self, name);
        }
    }

    /// Append a listener; the returned subscription removes this registration
    pub fn subscribe(&self, listener: Listener<S>) -> Subscription<S> {
        let id = listener::lock(&self.inner.listeners).add(listener);
        Subscription::new(&self.inner.listeners, id)
    }

    /// Subscribe a closure
    pub fn subscribe_fn<F>(&self, listener: F) -> Subscription<S>
    where
        F: Fn(&str, &Arc<S>) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(listener))
    }

    /// Remove the first registration of `listener`; no-op if absent
    pub fn un_subscribe(&self, listener: &Listener<S>) {
        listener::lock(&self.inner.listeners).remove_listener(listener);
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.inner.actions.contains(name)
    }

    /// Names of all actions in the action map, sorted
    pub fn action_names(&self) -> Vec<&str> {
        self.inner.actions.names()
    }

    pub fn has_handler(&self, name: &str) -> bool {
        read(&self.inner.handlers).contains_key(name)
    }

    pub fn listener_count(&self) -> usize {
        listener::lock(&self.inner.listeners).len()
    }

    fn run_action(
        &self,
        name: &str,
        action: &Action<S>,
        params: Params,
    ) -> BoxFuture<'static, Result<()>> {
        if self.inner.config.log_dispatches {
            log::debug!("{}: dispatching \"{}\"", self, name);
        }

        // The draft is taken from the state as it is now, not when the future is polled
        let base = self.get_state();
        match action.kind() {
            ActionKind::Sync(mutate) => {
                let result = self
                    .inner
                    .producer
                    .produce(&base, &mut |draft: &mut S| mutate(draft, &params))
                    .map(|next| self.commit(name, &base, next))
                    .map_err(|source| self.action_failed(name, source));
                Box::pin(future::ready(result))
            }
            ActionKind::Async(mutate) => {
                let pending = mutate(self.inner.producer.create_draft(&base), params);
                let store = self.clone();
                let name = name.to_string();
                Box::pin(async move {
                    match pending.await {
                        Ok(draft) => {
                            let next = store.inner.producer.finish_draft(&base, draft);
                            store.commit(&name, &base, next);
                            Ok(())
                        }
                        Err(source) => Err(store.action_failed(&name, source)),
                    }
                })
            }
        }
    }

    fn run_plugin(
        &self,
        name: &str,
        plugin: &PluginAction,
        params: Params,
    ) -> BoxFuture<'static, Result<()>> {
        let handler = read(&self.inner.handlers).get(plugin.handler()).cloned();
        let Some(handler) = handler else {
            let err = StoreError::HandlerNotRegistered {
                store: self.to_string(),
                handler: plugin.handler().to_string(),
                action: name.to_string(),
            };
            log::error!("{}", err);
            return Box::pin(future::ready(Err(err)));
        };

        if self.inner.config.log_dispatches {
            log::debug!(
                "{}: dispatching \"{}\" through handler \"{}\"",
                self,
                name,
                plugin.handler()
            );
        }

        let pending = handler.handle(self, plugin, params);
        let store = self.clone();
        let name = name.to_string();
        Box::pin(async move {
            // Store errors from nested dispatches are passed through as they are
            pending.await.map_err(|source| match source.downcast::<StoreError>() {
                Ok(err) => err,
                Err(source) => store.action_failed(&name, source),
            })
        })
    }

    fn unknown_action(&self, name: String) -> BoxFuture<'static, Result<()>> {
        let result = match self.inner.config.unknown_action {
            UnknownActionPolicy::Ignore => Ok(()),
            UnknownActionPolicy::Warn => {
                log::warn!("{}: unknown action \"{}\", ignoring", self, name);
                Ok(())
            }
            UnknownActionPolicy::Error => {
                let err = StoreError::UnknownAction {
                    store: self.to_string(),
                    action: name,
                };
                log::error!("{}", err);
                Err(err)
            }
        };
        Box::pin(future::ready(result))
    }

    fn action_failed(&self, name: &str, source: anyhow::Error) -> StoreError {
        let err = StoreError::ActionFailed {
            store: self.to_string(),
            action: name.to_string(),
            source,
        };
        log::error!("{}", err);
        err
    }

    /// Replace the state with `next` and notify, unless nothing changed
    ///
    /// `next` is compared with the `base` it was produced from as well as
    /// with the current state. An async action that returns its draft
    /// unchanged therefore never overwrites a state committed while it was
    /// suspended.
    fn commit(&self, name: &str, base: &Arc<S>, next: Arc<S>) {
        if Arc::ptr_eq(base, &next) {
            log::trace!("{}: \"{}\" left the state unchanged", self, name);
            return;
        }

        let previous = {
            let mut current = write(&self.inner.state);
            if Arc::ptr_eq(&current, &next) {
                return;
            }
            std::mem::replace(&mut *current, next)
        };
        log::debug!("{}: \"{}\" committed a new state", self, name);

        let listeners = listener::lock(&self.inner.listeners).snapshot();
        for listener in listeners {
            listener(name, &previous);
        }
    }
}

impl<S> fmt::Display for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Store[{}]", self.inner.name)
    }
}

impl<S> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.inner.name)
            .field("actions", &self.inner.actions.names())
            .field("handlers", &read(&self.inner.handlers).len())
            .field("listeners", &listener::lock(&self.inner.listeners).len())
            .finish()
    }
}
