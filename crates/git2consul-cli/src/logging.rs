//! Log output setup

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::error::{CliError, Result};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (the configured log
/// level) is used.
pub fn init(default_filter: &str) -> Result<()> {
    let fmt_layer = fmt::layer().with_target(true).with_level(true).compact();

    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| CliError::Logging {
            message: format!("invalid log level '{}': {}", default_filter, e),
        })?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| CliError::Logging {
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{error, info, warn};

    #[test]
    fn test_logging_init() {
        // Only the first init in a process succeeds
        let _ = init("debug");

        info!(revision = "abc1234", "This is an info message");
        warn!("This is a warning message");
        error!("This is an error message");
    }
}
