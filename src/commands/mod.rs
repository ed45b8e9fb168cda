//! Command handlers for the CLI application.
//!
//! - `surface`: run and dump against the configured surface
//! - `utility`: color inspection and config init

pub mod surface;
pub mod utility;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rgbscape::config::SurfaceConfig;

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Load `path`, or the default config when none is given
pub fn load_config(path: Option<&Path>) -> anyhow::Result<SurfaceConfig> {
    Ok(match path {
        Some(path) => SurfaceConfig::load(path)?,
        None => SurfaceConfig::load_default()?,
    })
}

/// Set up Ctrl-C handler, returns running flag
pub fn setup_interrupt_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .ok();

    running
}
