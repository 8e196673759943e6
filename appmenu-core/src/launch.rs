//! Handing locations to the operating system.

use std::path::Path;

use tracing::{debug, warn};

pub trait Launcher: Send + Sync {
    /// Fire-and-forget; failures are logged, never returned
    fn launch(&self, location: &Path);
}

/// Opens locations with the platform's default handler
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, location: &Path) {
        if !location.exists() {
            warn!("Cannot launch {}: no such file", location.display());
            return;
        }
        debug!("Launching {}", location.display());
        if let Err(e) = open::that_detached(location) {
            warn!("Failed to launch {}: {}", location.display(), e);
        }
    }
}
