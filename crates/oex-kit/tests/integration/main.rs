//! Integration tests for oex-kit.
//!
//! Wire-format and assembly tests are fully offline. RPC tests run against a
//! minimal HTTP server bound to a local port.
//!
//! Run with: `cargo test --test integration`

mod assembly_integration;
mod rpc_integration;
mod wire_format_integration;

/// Install a test subscriber once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
