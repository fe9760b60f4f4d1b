//! Plugin action handlers
//!
//! A handler gives a [`PluginAction`] its meaning. The store does not
//! interpret the plugin payload itself; it looks up the handler named by the
//! action at dispatch time and hands over the action, the dispatch params
//! and a handle to the store.
//!
//! ## Design
//!
//! ```text
//! dispatch("tick") → PluginAction { handler: "interval" } → handler.handle()
//!                                                             │
//!                              store.dispatch("increment") ←──┘ (now and later)
//! ```
//!
//! The handler runs its synchronous part inside `dispatch` and returns a
//! future for the rest. The dispatch that triggered it completes when that
//! future does, and fails if it fails.
//!
//! ## Example
//!
//! ```rust
//! use draft_store::{Action, ActionMap, BoxFuture, PluginAction, Params, Store};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Counter { a: i64 }
//!
//! let actions = ActionMap::new()
//!     .with_action("increaseA", Action::new(|draft: &mut Counter, params| {
//!         draft.a += params.as_i64().unwrap_or(1)
//!     }))
//!     .with_plugin("twice", PluginAction::new("repeat", 2_usize));
//! let store = Store::new(Counter { a: 0 }, actions);
//!
//! store.register_action_handler("repeat", |store: &Store<Counter>, action: &PluginAction, params: Params| -> BoxFuture<'static, anyhow::Result<()>> {
//!     let times = action.payload::<usize>().copied().unwrap_or(1);
//!     for _ in 0..times {
//!         let _ = store.dispatch_with("increaseA", params.clone());
//!     }
//!     Box::pin(async { Ok(()) })
//! });
//!
//! let _ = store.dispatch_with("twice", serde_json::json!(5));
//! assert_eq!(store.get_state().a, 10);
//! ```

use crate::action::{Params, PluginAction};
use crate::store::Store;
use std::future::Future;
use std::pin::Pin;

/// BoxFuture type alias for dispatch completion signals and handler work
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Interprets plugin actions registered under a handler name
///
/// # Parameters
/// - `store`: The store the action was dispatched on; dispatch back into it
///   to change state
/// - `action`: The plugin action, carrying the handler-specific payload
/// - `params`: Params passed to `dispatch`, unchanged
///
/// # Returns
/// A future that completes when all work caused by the action is done. A
/// failure fails the originating dispatch.
pub trait ActionHandler<S>: Send + Sync {
    fn handle(
        &self,
        store: &Store<S>,
        action: &PluginAction,
        params: Params,
    ) -> BoxFuture<'static, anyhow::Result<()>>;
}

impl<S, F> ActionHandler<S> for F
where
    F: Fn(&Store<S>, &PluginAction, Params) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync,
{
    fn handle(
        &self,
        store: &Store<S>,
        action: &PluginAction,
        params: Params,
    ) -> BoxFuture<'static, anyhow::Result<()>> {
        self(store, action, params)
    }
}
