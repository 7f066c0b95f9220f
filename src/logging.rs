use tracing::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Initializes stdout logging filtered by `RUST_LOG`.
///
/// Safe to call more than once; only the first call installs the subscriber.
pub fn init() {
    let filt = tracing_subscriber::EnvFilter::from_default_env();

    let stdout_sub = tracing_subscriber::fmt::layer()
        .compact()
        .with_test_writer()
        .with_filter(filt);

    if tracing_subscriber::registry().with(stdout_sub).try_init().is_ok() {
        info!("logging started");
    }
}
