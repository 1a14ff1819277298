use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install the global fmt subscriber. `RUST_LOG` overrides `level`.
/// Later calls are no-ops.
pub fn init_logging(level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        if let Err(e) = fmt().with_env_filter(filter).with_target(true).try_init() {
            eprintln!("Failed to initialize logging: {e}");
        }
    });
}
