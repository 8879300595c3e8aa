

pub mod config;
pub mod debug;
pub mod error;
pub mod logging;

pub use config::UndeletableConfig;
pub use debug::{configure, debug_enabled, set_debug};
pub use error::{Result, UndeletableError};
pub use logging::init_tracing;
