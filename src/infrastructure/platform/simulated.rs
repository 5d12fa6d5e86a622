//! Simulated Android runtime.
//!
//! Models the pieces of the OS the scan gate depends on: API level, adapter
//! power, per-permission grant state with the "don't ask again" advisory,
//! and the system dialogs. Requests are queued as [`SystemPrompt`]s that the
//! UI renders; answering one posts the corresponding result event, the same
//! way the real platform calls back into an activity.

use crate::domain::models::{AppEvent, RadioOutcome, RequestCode};
use crate::domain::permissions::{ApiLevel, GrantResult, Permission};
use crate::domain::platform::{PermissionOracle, RadioController};
use crate::domain::settings::SimulationSettings;
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct PermissionRecord {
    granted: bool,
    denied_once: bool,
    never_ask_again: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    NotRequested,
    Granted,
    Denied,
    DeniedPermanently,
}

impl PermissionRecord {
    fn status(&self) -> PermissionStatus {
        if self.granted {
            PermissionStatus::Granted
        } else if self.never_ask_again {
            PermissionStatus::DeniedPermanently
        } else if self.denied_once {
            PermissionStatus::Denied
        } else {
            PermissionStatus::NotRequested
        }
    }
}

/// A system dialog waiting for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemPrompt {
    Permissions {
        code: RequestCode,
        /// Everything that was requested; the result covers all of them.
        requested: Vec<Permission>,
        /// The subset the dialog actually asks about.
        askable: Vec<Permission>,
    },
    EnableRadio {
        code: RequestCode,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAnswer {
    Allow,
    Deny,
    DenyAndDontAskAgain,
}

struct DeviceState {
    api_level: ApiLevel,
    adapter_enabled: bool,
    records: BTreeMap<Permission, PermissionRecord>,
    prompts: VecDeque<SystemPrompt>,
    settings_open: bool,
}

impl DeviceState {
    fn record(&self, permission: Permission) -> PermissionRecord {
        self.records.get(&permission).copied().unwrap_or_default()
    }

    fn grants_for(&self, permissions: &[Permission]) -> Vec<GrantResult> {
        permissions
            .iter()
            .map(|p| GrantResult::from_granted(self.record(*p).granted))
            .collect()
    }
}

/// Handle to the simulated device. Clones share the same state.
#[derive(Clone)]
pub struct SimulatedAndroid {
    state: Arc<Mutex<DeviceState>>,
    events: mpsc::UnboundedSender<AppEvent>,
}

impl SimulatedAndroid {
    pub fn new(settings: &SimulationSettings, events: mpsc::UnboundedSender<AppEvent>) -> Self {
        let records = settings
            .granted_permissions
            .iter()
            .map(|p| {
                (
                    *p,
                    PermissionRecord {
                        granted: true,
                        ..Default::default()
                    },
                )
            })
            .collect();

        Self {
            state: Arc::new(Mutex::new(DeviceState {
                api_level: settings.api_level,
                adapter_enabled: settings.adapter_enabled,
                records,
                prompts: VecDeque::new(),
                settings_open: false,
            })),
            events,
        }
    }

    fn device(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_api_level(&self, level: ApiLevel) {
        self.device().api_level = level;
    }

    pub fn set_adapter_enabled(&self, enabled: bool) {
        info!(enabled, "Simulated adapter power changed");
        self.device().adapter_enabled = enabled;
    }

    pub fn permission_status(&self, permission: Permission) -> PermissionStatus {
        self.device().record(permission).status()
    }

    /// Grants or revokes a permission the way the app settings page does.
    pub fn set_granted(&self, permission: Permission, granted: bool) {
        let mut device = self.device();
        let record = device.records.entry(permission).or_default();
        record.granted = granted;
        record.never_ask_again = false;
        record.denied_once = !granted;
    }

    pub fn current_prompt(&self) -> Option<SystemPrompt> {
        self.device().prompts.front().cloned()
    }

    pub fn pending_prompts(&self) -> usize {
        self.device().prompts.len()
    }

    pub fn is_settings_open(&self) -> bool {
        self.device().settings_open
    }

    pub fn close_settings(&self) {
        self.device().settings_open = false;
    }

    /// Resolves the permission dialog at the front of the queue.
    pub fn answer_permission_prompt(&self, answer: PromptAnswer) -> bool {
        let mut device = self.device();
        let Some(SystemPrompt::Permissions {
            code,
            requested,
            askable,
        }) = device.prompts.front().cloned()
        else {
            return false;
        };
        device.prompts.pop_front();

        for permission in &askable {
            let record = device.records.entry(*permission).or_default();
            match answer {
                PromptAnswer::Allow => record.granted = true,
                PromptAnswer::Deny => {
                    record.granted = false;
                    record.denied_once = true;
                }
                PromptAnswer::DenyAndDontAskAgain => {
                    record.granted = false;
                    record.denied_once = true;
                    record.never_ask_again = true;
                }
            }
        }

        let grants = device.grants_for(&requested);
        drop(device);
        info!(%code, ?answer, "Permission dialog answered");
        let _ = self.events.send(AppEvent::PermissionResult {
            code,
            permissions: requested,
            grants,
        });
        true
    }

    /// Resolves the enable-Bluetooth dialog at the front of the queue.
    pub fn answer_radio_prompt(&self, accept: bool) -> bool {
        let mut device = self.device();
        let Some(SystemPrompt::EnableRadio { code }) = device.prompts.front().cloned() else {
            return false;
        };
        device.prompts.pop_front();
        if accept {
            device.adapter_enabled = true;
        }
        drop(device);

        let outcome = if accept {
            RadioOutcome::Accepted
        } else {
            RadioOutcome::Rejected
        };
        info!(%code, ?outcome, "Enable Bluetooth dialog answered");
        let _ = self.events.send(AppEvent::RadioResult { code, outcome });
        true
    }
}

impl PermissionOracle for SimulatedAndroid {
    fn api_level(&self) -> ApiLevel {
        self.device().api_level
    }

    fn is_granted(&self, permission: Permission) -> bool {
        self.device().record(permission).granted
    }

    fn should_show_rationale(&self, permission: Permission) -> bool {
        let record = self.device().record(permission);
        record.denied_once && !record.never_ask_again && !record.granted
    }

    fn request_permissions(&mut self, permissions: &[Permission], code: RequestCode) {
        let mut device = self.device();
        let askable: Vec<Permission> = permissions
            .iter()
            .copied()
            .filter(|p| {
                let record = device.record(*p);
                !record.granted && !record.never_ask_again
            })
            .collect();

        if askable.is_empty() {
            // Nothing to ask: the platform answers straight away.
            let grants = device.grants_for(permissions);
            drop(device);
            debug!(%code, "Permission request resolved without a dialog");
            let _ = self.events.send(AppEvent::PermissionResult {
                code,
                permissions: permissions.to_vec(),
                grants,
            });
            return;
        }

        device.prompts.push_back(SystemPrompt::Permissions {
            code,
            requested: permissions.to_vec(),
            askable,
        });
    }

    fn open_app_settings(&mut self) {
        self.device().settings_open = true;
    }
}

impl RadioController for SimulatedAndroid {
    fn is_enabled(&self) -> bool {
        self.device().adapter_enabled
    }

    fn request_enable(&mut self, code: RequestCode) {
        let mut device = self.device();
        if device.adapter_enabled {
            drop(device);
            let _ = self.events.send(AppEvent::RadioResult {
                code,
                outcome: RadioOutcome::Accepted,
            });
            return;
        }
        device.prompts.push_back(SystemPrompt::EnableRadio { code });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime(level: u32) -> (SimulatedAndroid, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let settings = SimulationSettings {
            api_level: ApiLevel(level),
            adapter_enabled: false,
            granted_permissions: Vec::new(),
        };
        (SimulatedAndroid::new(&settings, tx), rx)
    }

    fn expect_permission_result(
        rx: &mut mpsc::UnboundedReceiver<AppEvent>,
    ) -> (RequestCode, Vec<Permission>, Vec<GrantResult>) {
        match rx.try_recv() {
            Ok(AppEvent::PermissionResult {
                code,
                permissions,
                grants,
            }) => (code, permissions, grants),
            other => panic!("expected permission result, got {:?}", other),
        }
    }

    #[test]
    fn test_request_queues_prompt_and_allow_grants() {
        let (mut android, mut rx) = runtime(30);
        android.request_permissions(&[Permission::FineLocation], RequestCode(2));

        assert!(matches!(
            android.current_prompt(),
            Some(SystemPrompt::Permissions { .. })
        ));
        assert!(rx.try_recv().is_err());

        assert!(android.answer_permission_prompt(PromptAnswer::Allow));
        let (code, permissions, grants) = expect_permission_result(&mut rx);
        assert_eq!(code, RequestCode(2));
        assert_eq!(permissions, vec![Permission::FineLocation]);
        assert_eq!(grants, vec![GrantResult::Granted]);
        assert!(android.is_granted(Permission::FineLocation));
        assert!(android.current_prompt().is_none());
    }

    #[test]
    fn test_rationale_advisory_follows_denials() {
        let (mut android, mut rx) = runtime(30);
        assert!(!android.should_show_rationale(Permission::FineLocation));

        android.request_permissions(&[Permission::FineLocation], RequestCode(2));
        android.answer_permission_prompt(PromptAnswer::Deny);
        let _ = expect_permission_result(&mut rx);
        assert!(android.should_show_rationale(Permission::FineLocation));
        assert_eq!(
            android.permission_status(Permission::FineLocation),
            PermissionStatus::Denied
        );

        android.request_permissions(&[Permission::FineLocation], RequestCode(2));
        android.answer_permission_prompt(PromptAnswer::DenyAndDontAskAgain);
        let _ = expect_permission_result(&mut rx);
        assert!(!android.should_show_rationale(Permission::FineLocation));
        assert_eq!(
            android.permission_status(Permission::FineLocation),
            PermissionStatus::DeniedPermanently
        );
    }

    #[test]
    fn test_permanently_denied_resolves_without_dialog() {
        let (mut android, mut rx) = runtime(30);
        android.request_permissions(&[Permission::FineLocation], RequestCode(2));
        android.answer_permission_prompt(PromptAnswer::DenyAndDontAskAgain);
        let _ = expect_permission_result(&mut rx);

        android.request_permissions(&[Permission::FineLocation], RequestCode(2));
        assert!(android.current_prompt().is_none());
        let (_, _, grants) = expect_permission_result(&mut rx);
        assert_eq!(grants, vec![GrantResult::Denied]);
    }

    #[test]
    fn test_settings_page_clears_dont_ask_again() {
        let (mut android, mut rx) = runtime(31);
        let both = [Permission::BluetoothScan, Permission::BluetoothConnect];
        android.request_permissions(&both, RequestCode(2));
        android.answer_permission_prompt(PromptAnswer::DenyAndDontAskAgain);
        let _ = expect_permission_result(&mut rx);

        android.open_app_settings();
        assert!(android.is_settings_open());
        android.set_granted(Permission::BluetoothScan, true);
        android.set_granted(Permission::BluetoothConnect, true);
        android.close_settings();

        assert!(both.iter().all(|p| android.is_granted(*p)));
        assert!(!android.is_settings_open());
    }

    #[test]
    fn test_radio_prompt_outcomes() {
        let (mut android, mut rx) = runtime(30);
        android.request_enable(RequestCode(1));
        assert_eq!(
            android.current_prompt(),
            Some(SystemPrompt::EnableRadio {
                code: RequestCode(1)
            })
        );

        // Wrong prompt kind is left alone.
        assert!(!android.answer_permission_prompt(PromptAnswer::Allow));

        assert!(android.answer_radio_prompt(false));
        assert!(matches!(
            rx.try_recv(),
            Ok(AppEvent::RadioResult {
                outcome: RadioOutcome::Rejected,
                ..
            })
        ));
        assert!(!android.is_enabled());

        android.request_enable(RequestCode(1));
        android.answer_radio_prompt(true);
        assert!(android.is_enabled());

        // Already on: accepted immediately.
        android.request_enable(RequestCode(1));
        assert!(android.current_prompt().is_none());
        assert_eq!(android.pending_prompts(), 0);
    }
}
