//! Tracing output for `pong-engine` tests.
//!
//! Both the engine's unit tests (via a `ctor` hook in its `lib.rs`) and each
//! integration binary under `apps/engine/tests` (via `support/mod.rs`) call
//! [`init`] before any test runs, so tick passes, CAS retries and bot
//! failures show up next to the failing assertion. Quiet unless asked:
//!
//! ```text
//! TEST_LOG=pong_engine=debug cargo test -p pong-engine -- --nocapture
//! ```

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Route engine events to the libtest capture buffer.
///
/// `TEST_LOG` wins over `RUST_LOG`; with neither set only warnings from
/// failed games get through.
pub fn init() {
    INSTALLED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        // Module paths tell orchestrator events apart from repo retries
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .without_time()
            .try_init();
    });
}
