//! Shared tracing setup for integration tests.
//!
//! `TestTracing::init` installs a thread-local fmt subscriber for the
//! duration of one test, so `RUST_LOG=waymark=debug cargo test` interleaves
//! resolver decisions with test output.

use tracing_subscriber::EnvFilter;

pub struct TestTracing {
    _guard: tracing::subscriber::DefaultGuard,
}

impl TestTracing {
    pub fn init() -> Self {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .finish();
        Self {
            _guard: tracing::subscriber::set_default(subscriber),
        }
    }
}
