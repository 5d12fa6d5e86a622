//! BLE discovery.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 ScanService                   │
//! │  (worker thread, ScanCommand in, AppEvent out)│
//! └──────────────────────┬───────────────────────┘
//!                        │ Box<dyn DiscoveryBackend>
//!             ┌──────────┴──────────┐
//!             ▼                     ▼
//!     ┌───────────────┐    ┌──────────────────┐
//!     │  BleScanner   │    │ SimulatedScanner │
//!     │ (WinRT watcher│    │ (fixed catalog,  │
//!     │  Windows only)│    │  tokio interval) │
//!     └───────────────┘    └──────────────────┘
//! ```

#[cfg(windows)]
pub mod scanner;
pub mod service;
pub mod simulated;

use crate::domain::models::AppEvent;
use anyhow::{bail, Result};
use tokio::sync::mpsc;

pub use service::{spawn_scan_worker, ScanService};

/// A source of BLE advertisements.
pub trait DiscoveryBackend {
    fn name(&self) -> &'static str;

    /// Starts reporting devices, restarting any session already running.
    /// `service_uuid` limits results to advertisers of that service.
    fn start(&mut self, service_uuid: Option<&str>) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    fn is_scanning(&self) -> bool;
}

/// Parses a 128-bit service UUID, with or without dashes.
pub fn parse_service_uuid(uuid_str: &str) -> Result<u128> {
    let hex = uuid_str.trim().replace('-', "");

    if !hex.is_ascii() || hex.len() != 32 {
        bail!("Invalid UUID format: {:?}", uuid_str);
    }
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("UUID contains non-hex characters: {:?}", uuid_str);
    }

    Ok(u128::from_str_radix(&hex, 16)?)
}

#[cfg(windows)]
pub fn default_backend(
    simulate: bool,
    event_sender: mpsc::UnboundedSender<AppEvent>,
) -> Box<dyn DiscoveryBackend> {
    if simulate {
        Box::new(simulated::SimulatedScanner::new(event_sender))
    } else {
        Box::new(scanner::BleScanner::new(event_sender))
    }
}

#[cfg(not(windows))]
pub fn default_backend(
    _simulate: bool,
    event_sender: mpsc::UnboundedSender<AppEvent>,
) -> Box<dyn DiscoveryBackend> {
    Box::new(simulated::SimulatedScanner::new(event_sender))
}
