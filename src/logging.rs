//! Tracing setup for the `lotmatch` binary.
//!
//! Logs go to stderr so reports on stdout stay machine readable.  Filtering follows
//! `RUST_LOG` (e.g. `RUST_LOG=lotmatch=debug` shows every lot split), defaulting to `info`.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber, JSON lines when `json` is set, compact text otherwise.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(json: bool) -> Result<(), TryInitError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if json {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true);
        registry.with(json_layer).try_init()
    } else {
        let text_layer = tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(false);
        registry.with(text_layer).try_init()
    }
}
