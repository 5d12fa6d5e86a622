use crate::domain::permissions::{ApiLevel, Permission};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_level")]
    pub level: String, // "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_true")]
    pub file_logging_enabled: bool,
    #[serde(default = "default_true")]
    pub console_logging_enabled: bool,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_prefix")]
    pub file_name_prefix: String,
    #[serde(default = "default_true")]
    pub show_file_line: bool,
    #[serde(default = "default_false")]
    pub show_thread_ids: bool,
    #[serde(default = "default_true")]
    pub show_target: bool,
    #[serde(default = "default_true")]
    pub ansi_colors: bool,
    #[serde(default = "default_rotation")]
    pub rotation: String, // "daily", "hourly", "minutely", "never"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_level(),
            file_logging_enabled: default_true(),
            console_logging_enabled: default_true(),
            log_dir: default_log_dir(),
            file_name_prefix: default_prefix(),
            show_file_line: default_true(),
            show_thread_ids: default_false(),
            show_target: default_true(),
            ansi_colors: default_true(),
            rotation: default_rotation(),
        }
    }
}

/// Retry and ordering policy of the scan gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSettings {
    /// `null` re-prompts without limit.
    #[serde(default = "default_max_enable_retries")]
    pub max_enable_retries: Option<u32>,
    #[serde(default = "default_true")]
    pub permissions_before_radio: bool,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            max_enable_retries: default_max_enable_retries(),
            permissions_before_radio: default_true(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSettings {
    #[serde(default = "default_scan_duration_secs")]
    pub duration_secs: u64,
    /// Only report advertisers of this service. Empty or absent shows everything.
    #[serde(default)]
    pub service_uuid: Option<String>,
    /// Use the simulated advertisement source even where a real one exists.
    #[serde(default = "default_false")]
    pub simulate: bool,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            duration_secs: default_scan_duration_secs(),
            service_uuid: None,
            simulate: false,
        }
    }
}

/// Initial state of the simulated Android runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSettings {
    #[serde(default = "default_api_level")]
    pub api_level: ApiLevel,
    #[serde(default = "default_false")]
    pub adapter_enabled: bool,
    #[serde(default)]
    pub granted_permissions: Vec<Permission>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            api_level: default_api_level(),
            adapter_enabled: false,
            granted_permissions: Vec::new(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}
fn default_false() -> bool {
    false
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_prefix() -> String {
    "ble_scan_gate".to_string()
}
fn default_rotation() -> String {
    "daily".to_string()
}
fn default_max_enable_retries() -> Option<u32> {
    Some(3)
}
fn default_scan_duration_secs() -> u64 {
    10
}
fn default_api_level() -> ApiLevel {
    ApiLevel(34)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub log_settings: LogSettings,
    #[serde(default)]
    pub gate: GateSettings,
    #[serde(default)]
    pub scan: ScanSettings,
    #[serde(default)]
    pub simulation: SimulationSettings,
}

pub struct SettingsService {
    settings: Settings,
    settings_path: PathBuf,
}

impl SettingsService {
    pub fn new() -> anyhow::Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Ok(Self::with_path(settings_path))
    }

    /// Loads from `path`, falling back to defaults when the file is missing
    /// or unreadable.
    pub fn with_path(settings_path: PathBuf) -> Self {
        let settings = match Self::load_from_file(&settings_path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::debug!("Using default settings ({}): {}", settings_path.display(), e);
                Settings::default()
            }
        };
        Self {
            settings,
            settings_path,
        }
    }

    fn get_settings_path() -> anyhow::Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        path.push("BleScanGate");
        fs::create_dir_all(&path)?;
        path.push("settings.json");
        Ok(path)
    }

    fn load_from_file(path: &Path) -> anyhow::Result<Settings> {
        let contents = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(&self.settings)?;
        fs::write(&self.settings_path, json)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.settings_path
    }

    pub fn get(&self) -> &Settings {
        &self.settings
    }

    pub fn get_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }
}
