//! Action model
//!
//! An action name maps to either a plain mutator that works on a draft of
//! the state, or a plugin action whose payload is interpreted by a
//! registered [`ActionHandler`](crate::ActionHandler).
//!
//! ```text
//! dispatch(target) ─┬─ Direct(Action) ──────────────────────┐
//!                   └─ Named(name) → ActionMap ─┬─ Plain ────┤→ draft → commit
//!                                               └─ Plugin ───→ handler → dispatch ...
//! ```

use crate::handler::BoxFuture;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Parameters forwarded unchanged from `dispatch` to the action.
///
/// An absent parameter is `Value::Null`.
pub type Params = Value;

type SyncMutator<S> = dyn Fn(&mut S, &Params) -> anyhow::Result<()> + Send + Sync;
type AsyncMutator<S> = dyn Fn(S, Params) -> BoxFuture<'static, anyhow::Result<S>> + Send + Sync;

pub(crate) enum ActionKind<S> {
    Sync(Arc<SyncMutator<S>>),
    /// Owns the draft while suspended and hands it back once mutated
    Async(Arc<AsyncMutator<S>>),
}

/// A plain action: mutates a draft of the state
pub struct Action<S> {
    kind: ActionKind<S>,
}

impl<S: 'static> Action<S> {
    /// Infallible synchronous mutator
    pub fn new<F>(mutate: F) -> Self
    where
        F: Fn(&mut S, &Params) + Send + Sync + 'static,
    {
        Self::try_new(move |draft: &mut S, params: &Params| {
            mutate(draft, params);
            Ok(())
        })
    }

    /// Synchronous mutator that may fail. A failure discards the draft.
    pub fn try_new<F>(mutate: F) -> Self
    where
        F: Fn(&mut S, &Params) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            kind: ActionKind::Sync(Arc::new(mutate)),
        }
    }

    /// Asynchronous mutator
    ///
    /// The draft is moved into the future and must be returned from it.
    /// The store commits whatever draft comes back once the future resolves.
    pub fn from_async<F, Fut>(mutate: F) -> Self
    where
        F: Fn(S, Params) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<S>> + Send + 'static,
    {
        Self {
            kind: ActionKind::Async(Arc::new(
                move |draft: S, params: Params| -> BoxFuture<'static, anyhow::Result<S>> {
                    Box::pin(mutate(draft, params))
                },
            )),
        }
    }
}

impl<S> Action<S> {
    pub fn is_async(&self) -> bool {
        matches!(self.kind, ActionKind::Async(_))
    }

    pub(crate) fn kind(&self) -> &ActionKind<S> {
        &self.kind
    }
}

impl<S> Clone for Action<S> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            ActionKind::Sync(mutate) => ActionKind::Sync(Arc::clone(mutate)),
            ActionKind::Async(mutate) => ActionKind::Async(Arc::clone(mutate)),
        };
        Self { kind }
    }
}

impl<S> fmt::Debug for Action<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("async", &self.is_async())
            .finish()
    }
}

/// Action stored under a name whose semantics belong to a plugin handler
///
/// The payload is opaque to the store; the handler registered under
/// [`handler`](Self::handler) downcasts it to the type it expects.
#[derive(Clone)]
pub struct PluginAction {
    handler: String,
    payload: Arc<dyn Any + Send + Sync>,
}

impl PluginAction {
    pub fn new<T>(handler: impl Into<String>, payload: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            handler: handler.into(),
            payload: Arc::new(payload),
        }
    }

    /// Name of the handler that interprets this action
    pub fn handler(&self) -> &str {
        &self.handler
    }

    /// Payload as `T`, if it is one
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }
}

impl fmt::Debug for PluginAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginAction")
            .field("handler", &self.handler)
            .finish_non_exhaustive()
    }
}

/// Value stored in an [`ActionMap`]
pub enum ActionEntry<S> {
    Plain(Action<S>),
    Plugin(PluginAction),
}

impl<S> Clone for ActionEntry<S> {
    fn clone(&self) -> Self {
        match self {
            ActionEntry::Plain(action) => ActionEntry::Plain(action.clone()),
            ActionEntry::Plugin(plugin) => ActionEntry::Plugin(plugin.clone()),
        }
    }
}

impl<S> fmt::Debug for ActionEntry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionEntry::Plain(action) => f.debug_tuple("Plain").field(action).finish(),
            ActionEntry::Plugin(plugin) => f.debug_tuple("Plugin").field(plugin).finish(),
        }
    }
}

impl<S> From<Action<S>> for ActionEntry<S> {
    fn from(action: Action<S>) -> Self {
        ActionEntry::Plain(action)
    }
}

impl<S> From<PluginAction> for ActionEntry<S> {
    fn from(plugin: PluginAction) -> Self {
        ActionEntry::Plugin(plugin)
    }
}

/// Named actions known to a store, fixed once the store is created
pub struct ActionMap<S> {
    entries: HashMap<String, ActionEntry<S>>,
}

impl<S> ActionMap<S> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add a plain action. A later entry under the same name replaces the earlier one.
    pub fn with_action(mut self, name: impl Into<String>, action: Action<S>) -> Self {
        self.entries.insert(name.into(), ActionEntry::Plain(action));
        self
    }

    /// Add a plugin action
    pub fn with_plugin(mut self, name: impl Into<String>, plugin: PluginAction) -> Self {
        self.entries.insert(name.into(), ActionEntry::Plugin(plugin));
        self
    }

    pub fn get(&self, name: &str) -> Option<&ActionEntry<S>> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Action names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S> Default for ActionMap<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Clone for ActionMap<S> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<S> fmt::Debug for ActionMap<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<S, N, E> FromIterator<(N, E)> for ActionMap<S>
where
    N: Into<String>,
    E: Into<ActionEntry<S>>,
{
    fn from_iter<I: IntoIterator<Item = (N, E)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, entry)| (name.into(), entry.into()))
                .collect(),
        }
    }
}

/// What `dispatch` should run: a named entry or an ad-hoc action
pub enum DispatchTarget<S> {
    Named(String),
    Direct(Action<S>),
}

impl<S> Clone for DispatchTarget<S> {
    fn clone(&self) -> Self {
        match self {
            DispatchTarget::Named(name) => DispatchTarget::Named(name.clone()),
            DispatchTarget::Direct(action) => DispatchTarget::Direct(action.clone()),
        }
    }
}

impl<S> fmt::Debug for DispatchTarget<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchTarget::Named(name) => f.debug_tuple("Named").field(name).finish(),
            DispatchTarget::Direct(action) => f.debug_tuple("Direct").field(action).finish(),
        }
    }
}

impl<S> From<&str> for DispatchTarget<S> {
    fn from(name: &str) -> Self {
        DispatchTarget::Named(name.to_string())
    }
}

impl<S> From<String> for DispatchTarget<S> {
    fn from(name: String) -> Self {
        DispatchTarget::Named(name)
    }
}

impl<S> From<Action<S>> for DispatchTarget<S> {
    fn from(action: Action<S>) -> Self {
        DispatchTarget::Direct(action)
    }
}
