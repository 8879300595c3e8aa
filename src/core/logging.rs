

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use super::error::{Result, UndeletableError};

/// Installs a stderr `fmt` subscriber. `RUST_LOG` wins over `default_directive`.
pub fn init_tracing(default_directive: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .map_err(|e| UndeletableError::Configuration(e.to_string()))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .map_err(|e| UndeletableError::Configuration(e.to_string()))
}
