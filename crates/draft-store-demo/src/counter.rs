//! Counter state and its actions

use crate::config::DemoConfig;
use crate::interval::{IntervalPlan, INTERVAL_HANDLER};
use anyhow::Context;
use draft_store::{Action, ActionMap, PluginAction, Store};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct Counter {
    pub count: i64,
    /// Values captured by the "record" action
    pub history: Arc<Vec<i64>>,
}

impl Counter {
    pub fn new(count: i64) -> Self {
        Self {
            count,
            history: Arc::new(Vec::new()),
        }
    }
}

pub fn actions(config: &DemoConfig) -> ActionMap<Counter> {
    ActionMap::<Counter>::new()
        .with_action(
            "increment",
            Action::try_new(|draft: &mut Counter, params| {
                let by = params.as_i64().unwrap_or(1);
                draft.count = draft
                    .count
                    .checked_add(by)
                    .with_context(|| format!("cannot increment {} by {}", draft.count, by))?;
                Ok(())
            }),
        )
        .with_action(
            "decrement",
            Action::try_new(|draft: &mut Counter, params| {
                let by = params.as_i64().unwrap_or(1);
                let next = draft
                    .count
                    .checked_sub(by)
                    .with_context(|| format!("cannot decrement {} by {}", draft.count, by))?;
                anyhow::ensure!(next >= 0, "cannot decrement {} by {}", draft.count, by);
                draft.count = next;
                Ok(())
            }),
        )
        .with_action(
            "record",
            Action::new(|draft: &mut Counter, _| {
                let count = draft.count;
                Arc::make_mut(&mut draft.history).push(count);
            }),
        )
        .with_action(
            "slowDouble",
            Action::from_async(|mut draft: Counter, params| async move {
                let delay = params.as_u64().unwrap_or(100);
                tokio::time::sleep(Duration::from_millis(delay)).await;
                draft.count *= 2;
                Ok(draft)
            }),
        )
        .with_plugin(
            "tick",
            PluginAction::new(
                INTERVAL_HANDLER,
                IntervalPlan {
                    action: "increment".to_string(),
                    ticks: config.ticks,
                    period: Duration::from_millis(config.tick_interval_ms),
                },
            ),
        )
}

pub fn create_store(config: &DemoConfig) -> Store<Counter> {
    Store::with_config(
        Counter::new(config.initial_count),
        actions(config),
        config.store.clone(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::IntervalHandler;
    use draft_store::StoreError;
    use serde_json::json;

    fn config() -> DemoConfig {
        DemoConfig {
            ticks: 3,
            tick_interval_ms: 5,
            ..DemoConfig::default()
        }
    }

    #[tokio::test]
    async fn test_increment_and_decrement() {
        let store = create_store(&config());

        store.dispatch_with("increment", json!(5)).await.unwrap();
        store.dispatch("decrement").await.unwrap();

        assert_eq!(store.get_state().count, 4);
    }

    #[tokio::test]
    async fn test_decrement_below_zero_fails() {
        let store = create_store(&config());

        let err = store.dispatch_with("decrement", json!(3)).await.unwrap_err();

        assert!(matches!(err, StoreError::ActionFailed { .. }));
        assert_eq!(store.get_state().count, 0);
    }

    #[tokio::test]
    async fn test_overflowing_params_fail_instead_of_panicking() {
        let store = create_store(&config());
        store.dispatch_with("increment", json!(5)).await.unwrap();

        let err = store
            .dispatch_with("decrement", json!(i64::MIN))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ActionFailed { ref action, .. } if action == "decrement"));

        let err = store
            .dispatch_with("increment", json!(i64::MAX))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ActionFailed { ref action, .. } if action == "increment"));

        assert_eq!(store.get_state().count, 5);
    }

    #[tokio::test]
    async fn test_record_keeps_previous_history_untouched() {
        let store = create_store(&config());
        store.dispatch_with("increment", json!(2)).await.unwrap();
        let before = store.get_state();

        store.dispatch("record").await.unwrap();

        assert!(before.history.is_empty());
        assert_eq!(*store.get_state().history, vec![2]);
    }

    #[tokio::test]
    async fn test_slow_double() {
        let store = create_store(&config());
        store.dispatch_with("increment", json!(21)).await.unwrap();

        store.dispatch_with("slowDouble", json!(1)).await.unwrap();

        assert_eq!(store.get_state().count, 42);
    }

    #[tokio::test]
    async fn test_tick_runs_configured_number_of_increments() {
        let store = create_store(&config());
        store.register_handler(INTERVAL_HANDLER, IntervalHandler);

        store.dispatch_with("tick", json!(10)).await.unwrap();

        assert_eq!(store.get_state().count, 12);
    }
}
