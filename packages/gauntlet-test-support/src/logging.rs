//! Unified test logging initialization
//!
//! Both the unit tests of the bot crate and its integration tests call
//! [`init`] from a `#[ctor::ctor]` hook.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Initialize structured logging for tests.
///
/// Idempotent and race-safe. The level is taken from, in order:
///
/// 1. `TEST_LOG`
/// 2. `RUST_LOG`
/// 3. `"warn"`
///
/// An unparsable filter falls back to `"warn"`. Output goes through
/// `with_test_writer()` so cargo/nextest capture it, without timestamps.
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = ["TEST_LOG", "RUST_LOG"]
            .into_iter()
            .find_map(|var| std::env::var(var).ok())
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new("warn"));

        // engine events carry round/player fields; the target only adds noise
        fmt()
            .compact()
            .with_target(false)
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}
