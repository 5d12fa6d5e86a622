//! Platform adapter used by the desktop build.
//!
//! Permissions and adapter power come from the simulated Android runtime,
//! scans go to the discovery worker.

pub mod simulated;

use crate::domain::models::{RequestCode, ScanCommand};
use crate::domain::permissions::{ApiLevel, Permission};
use crate::domain::platform::{PermissionOracle, RadioController, ScanLauncher};
use crate::domain::settings::ScanSettings;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::error;

pub use simulated::{PermissionStatus, PromptAnswer, SimulatedAndroid, SystemPrompt};

pub struct DesktopPlatform {
    runtime: SimulatedAndroid,
    scan_tx: mpsc::UnboundedSender<ScanCommand>,
    scan_settings: ScanSettings,
    /// Id of the most recent scan session handed to the worker.
    scan_session: u64,
}

impl DesktopPlatform {
    pub fn new(
        runtime: SimulatedAndroid,
        scan_tx: mpsc::UnboundedSender<ScanCommand>,
        scan_settings: ScanSettings,
    ) -> Self {
        Self {
            runtime,
            scan_tx,
            scan_settings,
            scan_session: 0,
        }
    }

    pub fn set_scan_settings(&mut self, scan_settings: ScanSettings) {
        self.scan_settings = scan_settings;
    }

    pub fn stop_scan(&self) {
        if self.scan_tx.send(ScanCommand::Stop).is_err() {
            error!("Scan worker is not running");
        }
    }

    /// Whether a `ScanFinished` for `session` ends the latest scan rather
    /// than one that was already superseded.
    pub fn is_current_session(&self, session: u64) -> bool {
        session == self.scan_session
    }
}

impl PermissionOracle for DesktopPlatform {
    fn api_level(&self) -> ApiLevel {
        self.runtime.api_level()
    }

    fn is_granted(&self, permission: Permission) -> bool {
        self.runtime.is_granted(permission)
    }

    fn should_show_rationale(&self, permission: Permission) -> bool {
        self.runtime.should_show_rationale(permission)
    }

    fn request_permissions(&mut self, permissions: &[Permission], code: RequestCode) {
        self.runtime.request_permissions(permissions, code);
    }

    fn open_app_settings(&mut self) {
        self.runtime.open_app_settings();
    }
}

impl RadioController for DesktopPlatform {
    fn is_enabled(&self) -> bool {
        self.runtime.is_enabled()
    }

    fn request_enable(&mut self, code: RequestCode) {
        self.runtime.request_enable(code);
    }
}

impl ScanLauncher for DesktopPlatform {
    fn start_scan(&mut self) {
        let service_uuid = self
            .scan_settings
            .service_uuid
            .clone()
            .filter(|uuid| !uuid.trim().is_empty());
        self.scan_session += 1;
        let command = ScanCommand::Start {
            session: self.scan_session,
            duration: Duration::from_secs(self.scan_settings.duration_secs.max(1)),
            service_uuid,
        };
        if self.scan_tx.send(command).is_err() {
            error!("Scan worker is not running");
        }
    }
}
