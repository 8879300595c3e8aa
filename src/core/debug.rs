

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::info;

use super::config::UndeletableConfig;


static DEBUG: AtomicBool = AtomicBool::new(false);


pub fn debug_enabled() -> bool {
    DEBUG.load(Ordering::Relaxed)
}


pub fn set_debug(enabled: bool) {
    DEBUG.store(enabled, Ordering::Relaxed);
}

/// Applies the process-wide settings from `config`. Intended to run once at startup.
pub fn configure(config: &UndeletableConfig) {
    set_debug(config.debug);
    info!("Undeletable configured (debug={})", config.debug);
}

// Serializes tests that write the process-wide flag.
#[cfg(test)]
pub(crate) static TEST_FLAG_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
