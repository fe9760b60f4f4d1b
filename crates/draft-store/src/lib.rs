//! Draft store
//!
//! A minimal state container. The store holds one state value; actions
//! produce the next state by mutating a draft copy of the current one, and
//! subscribed listeners are notified whenever the state reference actually
//! changes.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   name / action   ┌──────────────────────────────┐
//! │   caller     │ ────────────────► │ Store::dispatch              │
//! └──────────────┘                   │  ├─ ActionMap lookup         │
//!                                    │  ├─ plugin → ActionHandler ──┼──┐
//!                                    │  └─ plain  → Producer draft  │  │ dispatch again
//!                                    │       └─ commit → listeners  │◄─┘
//!                                    └──────────────────────────────┘
//! ```
//!
//! - [`Store`] - state, action map, handler registry and listeners
//! - [`Action`] / [`PluginAction`] / [`ActionMap`] - what can be dispatched
//! - [`ActionHandler`] - gives plugin actions their meaning
//! - [`Producer`] - draft primitive, [`CloneProducer`] by default
//! - [`StoreConfig`] - name and unknown-action behavior
//!
//! # Example
//!
//! ```rust
//! use draft_store::{Action, ActionMap, Store};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Counter { a: i64 }
//!
//! let actions = ActionMap::new().with_action(
//!     "increaseA",
//!     Action::new(|draft: &mut Counter, params| draft.a += params.as_i64().unwrap_or(1)),
//! );
//! let store = Store::with_name(Counter { a: 1 }, actions, "counter");
//! assert_eq!(store.to_string(), "Store[counter]");
//!
//! let _subscription = store.subscribe_fn(|action, previous| {
//!     println!("{action}: a was {}", previous.a);
//! });
//!
//! // Sync actions are committed by the time dispatch returns
//! let _ = store.dispatch("increaseA");
//! let _ = store.dispatch_with("increaseA", serde_json::json!(10));
//! assert_eq!(store.get_state().a, 12);
//! ```

mod action;
mod config;
mod draft;
mod error;
mod handler;
mod helpers;
mod listener;
mod store;

pub use action::{Action, ActionEntry, ActionMap, DispatchTarget, Params, PluginAction};
pub use config::{StoreConfig, UnknownActionPolicy};
pub use draft::{CloneProducer, Producer};
pub use error::{Result, StoreError};
pub use handler::{ActionHandler, BoxFuture};
pub use helpers::{bind_action, bind_action_with};
pub use listener::{Listener, Subscription};
pub use store::{Store, NO_TYPE};
