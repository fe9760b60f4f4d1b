//! Interval plugin handler
//!
//! Drives a named action repeatedly on a timer: the first dispatch happens
//! right away with the params of the triggering dispatch, the remaining
//! ones follow every `period` without params. The triggering dispatch
//! completes after the last tick.

use draft_store::{ActionHandler, BoxFuture, Params, PluginAction, Store};
use std::time::Duration;

/// Name the handler is registered under
pub const INTERVAL_HANDLER: &str = "interval";

/// Payload of plugin actions handled by [`IntervalHandler`]
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalPlan {
    pub action: String,
    pub ticks: u32,
    pub period: Duration,
}

pub struct IntervalHandler;

impl<S> ActionHandler<S> for IntervalHandler
where
    S: Send + Sync + 'static,
{
    fn handle(
        &self,
        store: &Store<S>,
        action: &PluginAction,
        params: Params,
    ) -> BoxFuture<'static, anyhow::Result<()>> {
        let Some(plan) = action.payload::<IntervalPlan>().cloned() else {
            let err = anyhow::anyhow!("{} handler expects an IntervalPlan payload", INTERVAL_HANDLER);
            return Box::pin(async move { Err(err) });
        };
        if plan.ticks == 0 {
            return Box::pin(async { Ok(()) });
        }

        let first = store.dispatch_with(plan.action.as_str(), params);
        let store = store.clone();
        Box::pin(async move {
            first.await?;
            for tick in 2..=plan.ticks {
                tokio::time::sleep(plan.period).await;
                log::debug!("{}: \"{}\" tick {}/{}", store, plan.action, tick, plan.ticks);
                store.dispatch(plan.action.as_str()).await?;
            }
            anyhow::Ok(())
        })
    }
}
