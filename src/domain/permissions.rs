//! Runtime permission model and the OS-version policy that decides which
//! permissions a BLE scan needs.

use crate::domain::errors::ParsePermissionError;
use crate::domain::platform::PermissionOracle;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A runtime permission relevant to BLE discovery.
///
/// Serialized as the Android manifest identifier so settings files stay
/// readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Permission {
    FineLocation,
    BluetoothScan,
    BluetoothConnect,
}

impl Permission {
    pub const ALL: [Permission; 3] = [
        Permission::FineLocation,
        Permission::BluetoothScan,
        Permission::BluetoothConnect,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::FineLocation => "android.permission.ACCESS_FINE_LOCATION",
            Permission::BluetoothScan => "android.permission.BLUETOOTH_SCAN",
            Permission::BluetoothConnect => "android.permission.BLUETOOTH_CONNECT",
        }
    }

    /// Short name shown in dialogs.
    pub fn label(&self) -> &'static str {
        match self {
            Permission::FineLocation => "Precise location",
            Permission::BluetoothScan => "Nearby devices (scan)",
            Permission::BluetoothConnect => "Nearby devices (connect)",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = ParsePermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| ParsePermissionError(s.to_string()))
    }
}

impl TryFrom<String> for Permission {
    type Error = ParsePermissionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Permission> for String {
    fn from(value: Permission) -> Self {
        value.as_str().to_string()
    }
}

/// Platform API level as reported by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiLevel(pub u32);

impl ApiLevel {
    /// Android 6.0, where location became a runtime permission.
    pub const M: ApiLevel = ApiLevel(23);
    /// Android 12, the Bluetooth permission overhaul.
    pub const S: ApiLevel = ApiLevel(31);

    pub fn has_bluetooth_permissions(self) -> bool {
        self >= Self::S
    }
}

impl fmt::Display for ApiLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API {}", self.0)
    }
}

/// Outcome of a single permission in a request result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantResult {
    Granted,
    Denied,
}

impl GrantResult {
    pub fn from_granted(granted: bool) -> Self {
        if granted {
            GrantResult::Granted
        } else {
            GrantResult::Denied
        }
    }
}

/// Which explanatory dialog precedes a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RationaleKind {
    Location,
    Bluetooth,
}

impl RationaleKind {
    pub fn for_level(level: ApiLevel) -> Self {
        if level.has_bluetooth_permissions() {
            RationaleKind::Bluetooth
        } else {
            RationaleKind::Location
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            RationaleKind::Location => "Location permission required",
            RationaleKind::Bluetooth => "Bluetooth permissions required",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RationaleKind::Location => {
                "Starting from Android M (6.0), the system requires apps to be granted \
                 location access in order to scan for BLE devices."
            }
            RationaleKind::Bluetooth => {
                "Starting from Android 12, the system requires apps to be granted \
                 Bluetooth access in order to scan for and connect to BLE devices."
            }
        }
    }
}

/// Permissions a BLE scan needs at the given API level.
pub fn required_permissions(level: ApiLevel) -> &'static [Permission] {
    if level.has_bluetooth_permissions() {
        &[Permission::BluetoothScan, Permission::BluetoothConnect]
    } else {
        &[Permission::FineLocation]
    }
}

/// True when every permission required at the oracle's API level is granted.
pub fn has_required_permissions<O: PermissionOracle + ?Sized>(oracle: &O) -> bool {
    required_permissions(oracle.api_level())
        .iter()
        .all(|p| oracle.is_granted(*p))
}
