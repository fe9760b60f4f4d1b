//! Binding helpers
//!
//! Bind a store and an action into a callable, e.g. to hand to UI code
//! that only knows "call this when clicked".

use crate::action::{DispatchTarget, Params};
use crate::error::Result;
use crate::handler::BoxFuture;
use crate::store::Store;

/// Zero-argument callable dispatching `target` without params
pub fn bind_action<S>(
    store: &Store<S>,
    target: impl Into<DispatchTarget<S>>,
) -> impl Fn() -> BoxFuture<'static, Result<()>>
where
    S: Send + Sync + 'static,
{
    let store = store.clone();
    let target = target.into();
    move || store.dispatch(target.clone())
}

/// One-argument callable dispatching `target` with the given params
pub fn bind_action_with<S>(
    store: &Store<S>,
    target: impl Into<DispatchTarget<S>>,
) -> impl Fn(Params) -> BoxFuture<'static, Result<()>>
where
    S: Send + Sync + 'static,
{
    let store = store.clone();
    let target = target.into();
    move |params| store.dispatch_with(target.clone(), params)
}
