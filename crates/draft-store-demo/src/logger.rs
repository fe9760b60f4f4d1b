//! Logging setup
//!
//! Logs go to stderr. The level comes from `RUST_LOG` and defaults to `info`,
//! so `RUST_LOG=debug` shows every dispatch and commit of the store.

use env_logger::Env;

pub fn init() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format_target(false)
        .init();
}
