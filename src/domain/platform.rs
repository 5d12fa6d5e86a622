//! Seams between the scan gate and the operating system.
//!
//! The gate never talks to a concrete platform. Each service it depends on
//! is a trait, so the desktop build can plug in the simulated runtime and the
//! tests can plug in a recording fake.

use crate::domain::models::RequestCode;
use crate::domain::permissions::{ApiLevel, Permission};

/// The platform permission service.
pub trait PermissionOracle {
    fn api_level(&self) -> ApiLevel;

    fn is_granted(&self, permission: Permission) -> bool;

    /// Advisory flag: `false` after a denial means "don't ask again" was chosen.
    fn should_show_rationale(&self, permission: Permission) -> bool;

    /// Issues a batched request. Returns immediately; the result arrives later
    /// as an event carrying `code`.
    fn request_permissions(&mut self, permissions: &[Permission], code: RequestCode);

    /// Sends the user to the app's settings page to grant permissions by hand.
    fn open_app_settings(&mut self);
}

/// The platform Bluetooth service.
pub trait RadioController {
    fn is_enabled(&self) -> bool;

    /// Asks the user to power on the adapter. The outcome arrives later as an
    /// event carrying `code`.
    fn request_enable(&mut self, code: RequestCode);
}

/// Entry point of BLE discovery.
pub trait ScanLauncher {
    fn start_scan(&mut self);
}

/// Everything the gate needs from its host.
pub trait Platform: PermissionOracle + RadioController + ScanLauncher {}

impl<T: PermissionOracle + RadioController + ScanLauncher> Platform for T {}
