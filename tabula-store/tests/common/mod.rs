//! Shared test helpers for store tests.

#![allow(dead_code)]

use tracing_subscriber::EnvFilter;

/// Routes reducer logs to the test writer. Set `RUST_LOG=tabula_store=debug`
/// to watch selection settling.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
