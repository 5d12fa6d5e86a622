use crate::domain::permissions::{GrantResult, Permission};
use std::fmt;
use std::time::Duration;

/// Correlator pairing an asynchronous request with its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestCode(pub i32);

impl fmt::Display for RequestCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of an "enable Bluetooth" prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioOutcome {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScannedDevice {
    pub name: String,
    pub address: u64,
    pub signal_strength: i16,
}

impl ScannedDevice {
    /// Address in the usual colon-separated form.
    pub fn address_string(&self) -> String {
        let bytes = self.address.to_be_bytes();
        bytes[2..]
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect::<Vec<_>>()
            .join(":")
    }
}

/// Events delivered to the UI thread from the platform and the scan worker.
#[derive(Debug, Clone)]
pub enum AppEvent {
    PermissionResult {
        code: RequestCode,
        permissions: Vec<Permission>,
        grants: Vec<GrantResult>,
    },
    RadioResult {
        code: RequestCode,
        outcome: RadioOutcome,
    },
    DeviceFound(ScannedDevice),
    /// The worker ended the session with this id.
    ScanFinished { session: u64 },
    LogMessage(StatusMessage),
}

/// Commands for the discovery worker.
#[derive(Debug, Clone)]
pub enum ScanCommand {
    Start {
        session: u64,
        duration: Duration,
        service_uuid: Option<String>,
    },
    Stop,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub message: String,
    pub severity: MessageSeverity,
}

impl StatusMessage {
    pub fn new(severity: MessageSeverity, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSeverity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Settings,
    Debug,
}
