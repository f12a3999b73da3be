use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

// Static to ensure we only initialize logging once
static INIT_LOGGER: Once = Once::new();

/// Initialize the logger
///
/// `verbose` lowers the default level for the brewform crates to debug.
/// A `RUST_LOG` value replaces the default entirely.
pub fn init_logger(verbose: bool) {
    INIT_LOGGER.call_once(|| {
        let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        let filter = build_filter(rust_log.as_deref(), verbose);

        let result = tracing_subscriber::registry()
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .with(filter)
            .try_init();

        match result {
            Ok(()) => tracing::debug!("Logging initialized at level: {}", default_level(verbose)),
            Err(e) => eprintln!("Warning: Could not set global default tracing subscriber: {}", e),
        }
    });
}

fn default_level(verbose: bool) -> Level {
    if verbose { Level::DEBUG } else { Level::INFO }
}

/// Filter from `RUST_LOG` when it holds valid directives, otherwise the
/// default level for the brewform crates
pub fn build_filter(rust_log: Option<&str>, verbose: bool) -> EnvFilter {
    if let Some(directives) = rust_log.map(str::trim).filter(|d| !d.is_empty()) {
        match EnvFilter::try_new(directives) {
            Ok(filter) => return filter,
            Err(e) => eprintln!("Warning: Ignoring invalid {}: {}", EnvFilter::DEFAULT_ENV, e),
        }
    }

    let level = default_level(verbose);
    EnvFilter::new(format!("brewform={level},brewform_core={level}"))
}
