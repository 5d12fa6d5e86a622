//! Scan-start gate.
//!
//! Before a BLE scan may run, the adapter has to be powered on and the
//! process must hold the permissions the running API level requires. The
//! gate owns the platform handle and the request correlators, and is driven
//! entirely by UI events: resume, scan taps, dialog acknowledgements and the
//! two asynchronous result callbacks.

use crate::domain::errors::GateError;
use crate::domain::models::{RadioOutcome, RequestCode};
use crate::domain::permissions::{
    has_required_permissions, required_permissions, GrantResult, Permission, RationaleKind,
};
use crate::domain::platform::Platform;
use crate::domain::settings::GateSettings;
use tracing::{debug, info, warn};

/// Correlators for the two kinds of asynchronous request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestCodes {
    pub enable_bluetooth: RequestCode,
    pub runtime_permission: RequestCode,
}

impl Default for RequestCodes {
    fn default() -> Self {
        Self {
            enable_bluetooth: RequestCode(1),
            runtime_permission: RequestCode(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatePolicy {
    /// Automatic re-prompts after the user declines to enable Bluetooth.
    /// `None` keeps asking forever.
    pub max_enable_retries: Option<u32>,
    /// On API 31+ the enable prompt needs BLUETOOTH_CONNECT, so hold it back
    /// until the permission is granted.
    pub permissions_before_radio: bool,
}

impl Default for GatePolicy {
    fn default() -> Self {
        Self {
            max_enable_retries: Some(3),
            permissions_before_radio: true,
        }
    }
}

impl From<&GateSettings> for GatePolicy {
    fn from(settings: &GateSettings) -> Self {
        Self {
            max_enable_retries: settings.max_enable_retries,
            permissions_before_radio: settings.permissions_before_radio,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    /// Denied with "don't ask again"; only the settings page can fix it.
    PermissionsDenied(Vec<Permission>),
    /// The user kept declining the enable prompt.
    RadioDeclined,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateState {
    Idle,
    /// Explanatory dialog is up; acknowledging it issues the request.
    ShowingRationale(RationaleKind),
    AwaitingPermission,
    /// A scan was requested while the adapter was off.
    AwaitingRadio,
    Ready,
    Blocked(BlockReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Started,
    PermissionsRequested,
    AwaitingRadio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionOutcome {
    Ignored,
    Blocked,
    Retried,
    Proceeded(ScanOutcome),
    /// The result made no sense; the screen must be rebuilt from scratch.
    ResetRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioFlow {
    Ignored,
    Enabled(Option<ScanOutcome>),
    Retried { attempt: u32 },
    /// Declined, but the enable prompt now needs BLUETOOTH_CONNECT first.
    NeedsPermissions,
    Blocked,
}

pub struct ScanGate<P: Platform> {
    platform: P,
    codes: RequestCodes,
    policy: GatePolicy,
    state: GateState,
    last_issue: Option<GateError>,
    permission_pending: bool,
    radio_pending: bool,
    radio_declines: u32,
    scan_pending: bool,
    /// "Not now" on the radio-declined dialog: stay blocked, hide the dialog.
    block_dismissed: bool,
}

impl<P: Platform> ScanGate<P> {
    pub fn new(platform: P, codes: RequestCodes, policy: GatePolicy) -> Self {
        Self {
            platform,
            codes,
            policy,
            state: GateState::Idle,
            last_issue: None,
            permission_pending: false,
            radio_pending: false,
            radio_declines: 0,
            scan_pending: false,
            block_dismissed: false,
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn last_issue(&self) -> Option<&GateError> {
        self.last_issue.as_ref()
    }

    pub fn codes(&self) -> RequestCodes {
        self.codes
    }

    pub fn policy(&self) -> GatePolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: GatePolicy) {
        self.policy = policy;
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Drops all transient state, as if the screen had just been created.
    /// Requests already handed to the platform are not withdrawn.
    pub fn reset(&mut self) {
        info!("Resetting scan gate");
        self.state = GateState::Idle;
        self.last_issue = None;
        self.permission_pending = false;
        self.radio_pending = false;
        self.radio_declines = 0;
        self.scan_pending = false;
        self.block_dismissed = false;
    }

    pub fn is_permission_pending(&self) -> bool {
        self.permission_pending
    }

    pub fn is_radio_pending(&self) -> bool {
        self.radio_pending
    }

    pub fn is_scan_pending(&self) -> bool {
        self.scan_pending
    }

    pub fn radio_declines(&self) -> u32 {
        self.radio_declines
    }

    pub fn has_required_permissions(&self) -> bool {
        has_required_permissions(&self.platform)
    }

    /// Blocked and the user has not put the dialog away.
    pub fn shows_block_dialog(&self) -> bool {
        matches!(self.state, GateState::Blocked(_)) && !self.block_dismissed
    }

    /// Screen came to the foreground.
    pub fn on_resume(&mut self) {
        if self.platform.is_enabled() {
            if self.state == GateState::Blocked(BlockReason::RadioDeclined) {
                self.leave_block();
            }
            self.radio_declines = 0;
            return;
        }
        if matches!(self.state, GateState::Blocked(BlockReason::RadioDeclined)) {
            debug!("Bluetooth declined, waiting for the user before prompting again");
            return;
        }
        self.prompt_enable_bluetooth();
    }

    /// The "start scan" action.
    pub fn request_scan(&mut self) -> ScanOutcome {
        if !self.has_required_permissions() {
            info!("Starting BLE scan is missing permissions");
            self.request_relevant_permissions();
            return ScanOutcome::PermissionsRequested;
        }

        if !self.platform.is_enabled() {
            info!("Bluetooth is off, scan deferred until the adapter is enabled");
            if self.state == GateState::Blocked(BlockReason::RadioDeclined) {
                self.radio_declines = 0;
                self.leave_block();
            }
            self.scan_pending = true;
            self.state = GateState::AwaitingRadio;
            self.prompt_enable_bluetooth();
            return ScanOutcome::AwaitingRadio;
        }

        info!("Starting BLE scan");
        self.state = GateState::Ready;
        self.scan_pending = false;
        self.platform.start_scan();
        ScanOutcome::Started
    }

    /// Shows the rationale for whatever the current API level needs.
    /// Returns `false` when nothing is missing.
    pub fn request_relevant_permissions(&mut self) -> bool {
        if self.has_required_permissions() {
            return false;
        }
        let kind = RationaleKind::for_level(self.platform.api_level());
        debug!(?kind, "Showing permission rationale");
        self.state = GateState::ShowingRationale(kind);
        true
    }

    /// The user pressed OK on the rationale dialog.
    pub fn acknowledge_rationale(&mut self) -> bool {
        if !matches!(self.state, GateState::ShowingRationale(_)) {
            return false;
        }
        if self.has_required_permissions() {
            self.state = GateState::Idle;
            return false;
        }

        let required = required_permissions(self.platform.api_level());
        info!(
            code = %self.codes.runtime_permission,
            "Requesting permissions: {:?}",
            required
        );
        self.platform
            .request_permissions(required, self.codes.runtime_permission);
        self.permission_pending = true;
        self.state = GateState::AwaitingPermission;
        true
    }

    pub fn on_permission_result(
        &mut self,
        code: RequestCode,
        permissions: &[Permission],
        grants: &[GrantResult],
    ) -> PermissionOutcome {
        if code != self.codes.runtime_permission {
            debug!(%code, "Ignoring permission result with unknown code");
            return PermissionOutcome::Ignored;
        }
        info!("Handling permission result");
        self.permission_pending = false;

        let denied: Vec<Permission> = permissions
            .iter()
            .zip(grants)
            .filter(|(_, grant)| **grant == GrantResult::Denied)
            .map(|(permission, _)| *permission)
            .collect();
        let permanently_denied: Vec<Permission> = denied
            .iter()
            .copied()
            .filter(|p| !self.platform.should_show_rationale(*p))
            .collect();
        let contains_denial = grants.contains(&GrantResult::Denied);
        let all_granted = !grants.is_empty()
            && grants.len() == permissions.len()
            && grants.iter().all(|g| *g == GrantResult::Granted);

        if !permanently_denied.is_empty() {
            let issue = GateError::PermissionDeniedPermanent(permanently_denied.clone());
            warn!(error = %issue, "Permission permanently denied");
            self.last_issue = Some(issue);
            self.scan_pending = false;
            self.block_dismissed = false;
            self.state = GateState::Blocked(BlockReason::PermissionsDenied(permanently_denied));
            PermissionOutcome::Blocked
        } else if contains_denial {
            let issue = GateError::PermissionDeniedRecoverable(denied);
            info!(error = %issue, "Permission denied, asking again");
            self.last_issue = Some(issue);
            self.state = GateState::Idle;
            self.request_relevant_permissions();
            PermissionOutcome::Retried
        } else if all_granted && self.has_required_permissions() {
            self.last_issue = None;
            PermissionOutcome::Proceeded(self.request_scan())
        } else {
            let issue = GateError::unexpected(permissions, grants);
            warn!(error = %issue, "Unexpected permission state, resetting screen");
            self.last_issue = Some(issue);
            self.state = GateState::Idle;
            PermissionOutcome::ResetRequired
        }
    }

    pub fn on_radio_result(&mut self, code: RequestCode, outcome: RadioOutcome) -> RadioFlow {
        if code != self.codes.enable_bluetooth {
            debug!(%code, "Ignoring radio result with unknown code");
            return RadioFlow::Ignored;
        }
        self.radio_pending = false;

        match outcome {
            RadioOutcome::Accepted => {
                info!("Bluetooth enabled");
                self.radio_enabled()
            }
            RadioOutcome::Rejected => {
                self.radio_declines += 1;
                let attempts = self.radio_declines;
                self.last_issue = Some(GateError::RadioDisabled { attempts });

                let may_retry = self
                    .policy
                    .max_enable_retries
                    .map_or(true, |max| attempts <= max);
                if !may_retry {
                    warn!(attempts, "Bluetooth enable declined too often, giving up");
                    self.scan_pending = false;
                    self.block_dismissed = false;
                    self.state = GateState::Blocked(BlockReason::RadioDeclined);
                    return RadioFlow::Blocked;
                }

                if self.prompt_enable_bluetooth() {
                    info!(attempts, "Bluetooth enable declined, prompting again");
                    return RadioFlow::Retried { attempt: attempts };
                }
                if self.platform.is_enabled() {
                    info!("Bluetooth came on while the prompt was declined");
                    return self.radio_enabled();
                }

                info!("Enable prompt needs BLUETOOTH_CONNECT, switching to the permission flow");
                let scan_pending = std::mem::take(&mut self.scan_pending);
                if self.state == GateState::AwaitingRadio {
                    self.state = GateState::Idle;
                }
                if scan_pending {
                    self.request_relevant_permissions();
                }
                RadioFlow::NeedsPermissions
            }
        }
    }

    /// "Try again" from the radio-declined dialog.
    pub fn retry_radio(&mut self) -> bool {
        self.radio_declines = 0;
        if matches!(self.state, GateState::Blocked(BlockReason::RadioDeclined)) {
            self.leave_block();
        }
        self.prompt_enable_bluetooth()
    }

    /// "Open settings" from the permanent-denial dialog.
    pub fn open_settings(&mut self) {
        info!("Sending user to app settings");
        self.platform.open_app_settings();
        self.dismiss_block();
    }

    /// "Not now" on a blocking dialog. A permission block is left, since the
    /// next scan tap re-checks it. A radio block stays until a scan tap,
    /// "Try again" or the adapter coming on.
    pub fn dismiss_block(&mut self) {
        match self.state {
            GateState::Blocked(BlockReason::RadioDeclined) => {
                debug!("Radio-declined dialog dismissed, staying blocked");
                self.block_dismissed = true;
            }
            GateState::Blocked(BlockReason::PermissionsDenied(_)) => self.leave_block(),
            _ => {}
        }
    }

    fn leave_block(&mut self) {
        self.block_dismissed = false;
        self.state = GateState::Idle;
    }

    fn radio_enabled(&mut self) -> RadioFlow {
        self.radio_declines = 0;
        if matches!(self.last_issue, Some(GateError::RadioDisabled { .. })) {
            self.last_issue = None;
        }
        if self.scan_pending {
            self.scan_pending = false;
            RadioFlow::Enabled(Some(self.request_scan()))
        } else {
            if matches!(
                self.state,
                GateState::AwaitingRadio | GateState::Blocked(BlockReason::RadioDeclined)
            ) {
                self.leave_block();
            }
            RadioFlow::Enabled(None)
        }
    }

    fn radio_needs_permissions(&self) -> bool {
        self.policy.permissions_before_radio
            && self.platform.api_level().has_bluetooth_permissions()
            && !self.platform.is_granted(Permission::BluetoothConnect)
    }

    fn prompt_enable_bluetooth(&mut self) -> bool {
        if self.platform.is_enabled() || self.radio_pending {
            return false;
        }
        if self.radio_needs_permissions() {
            debug!("BLUETOOTH_CONNECT not granted yet, holding back the enable prompt");
            return false;
        }
        info!(code = %self.codes.enable_bluetooth, "Prompting to enable Bluetooth");
        self.radio_pending = true;
        self.platform.request_enable(self.codes.enable_bluetooth);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::permissions::ApiLevel;
    use crate::domain::platform::{PermissionOracle, RadioController, ScanLauncher};
    use std::collections::HashSet;

    #[derive(Default)]
    struct FakePlatform {
        level: u32,
        granted: HashSet<Permission>,
        rationale: HashSet<Permission>,
        enabled: bool,
        permission_requests: Vec<(Vec<Permission>, RequestCode)>,
        enable_requests: Vec<RequestCode>,
        scans: usize,
        settings_opened: usize,
    }

    impl PermissionOracle for FakePlatform {
        fn api_level(&self) -> ApiLevel {
            ApiLevel(self.level)
        }
        fn is_granted(&self, permission: Permission) -> bool {
            self.granted.contains(&permission)
        }
        fn should_show_rationale(&self, permission: Permission) -> bool {
            self.rationale.contains(&permission)
        }
        fn request_permissions(&mut self, permissions: &[Permission], code: RequestCode) {
            self.permission_requests.push((permissions.to_vec(), code));
        }
        fn open_app_settings(&mut self) {
            self.settings_opened += 1;
        }
    }

    impl RadioController for FakePlatform {
        fn is_enabled(&self) -> bool {
            self.enabled
        }
        fn request_enable(&mut self, code: RequestCode) {
            self.enable_requests.push(code);
        }
    }

    impl ScanLauncher for FakePlatform {
        fn start_scan(&mut self) {
            self.scans += 1;
        }
    }

    fn gate(level: u32, enabled: bool) -> ScanGate<FakePlatform> {
        let platform = FakePlatform {
            level,
            enabled,
            ..Default::default()
        };
        ScanGate::new(platform, RequestCodes::default(), GatePolicy::default())
    }

    fn location_result(
        gate: &mut ScanGate<FakePlatform>,
        grant: GrantResult,
    ) -> PermissionOutcome {
        let code = gate.codes().runtime_permission;
        gate.on_permission_result(code, &[Permission::FineLocation], &[grant])
    }

    #[test]
    fn test_tap_without_location_shows_rationale_once() {
        let mut gate = gate(30, true);

        assert_eq!(gate.request_scan(), ScanOutcome::PermissionsRequested);
        assert_eq!(
            gate.state(),
            &GateState::ShowingRationale(RationaleKind::Location)
        );
        assert!(gate.platform().permission_requests.is_empty());

        assert!(gate.acknowledge_rationale());
        assert_eq!(gate.state(), &GateState::AwaitingPermission);
        assert_eq!(
            gate.platform().permission_requests,
            vec![(vec![Permission::FineLocation], RequestCode(2))]
        );

        // A second acknowledgement has no dialog to act on.
        assert!(!gate.acknowledge_rationale());
        assert_eq!(gate.platform().permission_requests.len(), 1);
    }

    #[test]
    fn test_bluetooth_rationale_on_new_platforms() {
        let mut gate = gate(33, true);
        gate.request_scan();
        assert_eq!(
            gate.state(),
            &GateState::ShowingRationale(RationaleKind::Bluetooth)
        );
        gate.acknowledge_rationale();
        assert_eq!(
            gate.platform().permission_requests[0].0,
            vec![Permission::BluetoothScan, Permission::BluetoothConnect]
        );
    }

    #[test]
    fn test_granted_result_starts_scan_once() {
        let mut gate = gate(30, true);
        gate.request_scan();
        gate.acknowledge_rationale();

        gate.platform_mut().granted.insert(Permission::FineLocation);
        let outcome = location_result(&mut gate, GrantResult::Granted);

        assert_eq!(outcome, PermissionOutcome::Proceeded(ScanOutcome::Started));
        assert_eq!(gate.state(), &GateState::Ready);
        assert_eq!(gate.platform().scans, 1);
        assert!(gate.last_issue().is_none());
        assert!(!gate.is_permission_pending());
    }

    #[test]
    fn test_permanent_denial_blocks_without_reprompt() {
        let mut gate = gate(30, true);
        gate.request_scan();
        gate.acknowledge_rationale();

        let outcome = location_result(&mut gate, GrantResult::Denied);

        assert_eq!(outcome, PermissionOutcome::Blocked);
        assert_eq!(
            gate.state(),
            &GateState::Blocked(BlockReason::PermissionsDenied(vec![
                Permission::FineLocation
            ]))
        );
        assert!(!gate.acknowledge_rationale());
        assert_eq!(gate.platform().permission_requests.len(), 1);
        assert!(matches!(
            gate.last_issue(),
            Some(GateError::PermissionDeniedPermanent(_))
        ));
        assert_eq!(gate.platform().scans, 0);
    }

    #[test]
    fn test_recoverable_denial_reissues_same_request() {
        let mut gate = gate(30, true);
        gate.request_scan();
        gate.acknowledge_rationale();

        gate.platform_mut().rationale.insert(Permission::FineLocation);
        let outcome = location_result(&mut gate, GrantResult::Denied);

        assert_eq!(outcome, PermissionOutcome::Retried);
        assert_eq!(
            gate.state(),
            &GateState::ShowingRationale(RationaleKind::Location)
        );
        assert!(gate.acknowledge_rationale());

        let requests = &gate.platform().permission_requests;
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], requests[1]);
    }

    #[test]
    fn test_mixed_denial_prefers_permanent() {
        let mut gate = gate(31, true);
        gate.request_scan();
        gate.acknowledge_rationale();
        gate.platform_mut().rationale.insert(Permission::BluetoothScan);

        let code = gate.codes().runtime_permission;
        let outcome = gate.on_permission_result(
            code,
            &[Permission::BluetoothScan, Permission::BluetoothConnect],
            &[GrantResult::Denied, GrantResult::Denied],
        );

        assert_eq!(outcome, PermissionOutcome::Blocked);
        assert_eq!(
            gate.state(),
            &GateState::Blocked(BlockReason::PermissionsDenied(vec![
                Permission::BluetoothConnect
            ]))
        );
    }

    #[test]
    fn test_empty_or_inconsistent_result_requires_reset() {
        let mut gate = gate(30, true);
        let code = gate.codes().runtime_permission;

        assert_eq!(
            gate.on_permission_result(code, &[], &[]),
            PermissionOutcome::ResetRequired
        );
        assert_eq!(gate.state(), &GateState::Idle);

        // Granted according to the callback, but the platform disagrees.
        assert_eq!(
            location_result(&mut gate, GrantResult::Granted),
            PermissionOutcome::ResetRequired
        );
        assert!(matches!(
            gate.last_issue(),
            Some(GateError::UnexpectedGrantState { .. })
        ));
        assert_eq!(gate.platform().scans, 0);
    }

    #[test]
    fn test_unmatched_codes_are_ignored() {
        let mut gate = gate(30, false);
        gate.request_scan();
        gate.acknowledge_rationale();

        assert_eq!(
            gate.on_permission_result(
                RequestCode(99),
                &[Permission::FineLocation],
                &[GrantResult::Denied]
            ),
            PermissionOutcome::Ignored
        );
        assert_eq!(gate.state(), &GateState::AwaitingPermission);
        assert_eq!(
            gate.on_radio_result(RequestCode(99), RadioOutcome::Rejected),
            RadioFlow::Ignored
        );
        assert!(gate.platform().enable_requests.is_empty());
    }

    #[test]
    fn test_request_flow_is_noop_when_granted() {
        let mut gate = gate(30, true);
        gate.platform_mut().granted.insert(Permission::FineLocation);

        assert!(!gate.request_relevant_permissions());
        assert!(!gate.acknowledge_rationale());
        assert_eq!(gate.state(), &GateState::Idle);
        assert!(gate.platform().permission_requests.is_empty());
        assert!(gate.platform().enable_requests.is_empty());
    }

    #[test]
    fn test_resume_with_radio_off_prompts_and_retries() {
        let mut gate = gate(30, false);
        gate.on_resume();
        assert_eq!(gate.platform().enable_requests, vec![RequestCode(1)]);

        let flow = gate.on_radio_result(RequestCode(1), RadioOutcome::Rejected);
        assert_eq!(flow, RadioFlow::Retried { attempt: 1 });
        assert_eq!(gate.platform().enable_requests.len(), 2);
    }

    #[test]
    fn test_resume_does_not_duplicate_pending_prompt() {
        let mut gate = gate(30, false);
        gate.on_resume();
        gate.on_resume();
        assert_eq!(gate.platform().enable_requests.len(), 1);
        assert!(gate.is_radio_pending());
    }

    #[test]
    fn test_radio_retries_stop_at_cap() {
        let mut gate = gate(30, false);
        gate.set_policy(GatePolicy {
            max_enable_retries: Some(2),
            permissions_before_radio: true,
        });
        gate.on_resume();

        let code = gate.codes().enable_bluetooth;
        assert_eq!(
            gate.on_radio_result(code, RadioOutcome::Rejected),
            RadioFlow::Retried { attempt: 1 }
        );
        assert_eq!(
            gate.on_radio_result(code, RadioOutcome::Rejected),
            RadioFlow::Retried { attempt: 2 }
        );
        assert_eq!(
            gate.on_radio_result(code, RadioOutcome::Rejected),
            RadioFlow::Blocked
        );
        assert_eq!(gate.platform().enable_requests.len(), 3);
        assert_eq!(
            gate.state(),
            &GateState::Blocked(BlockReason::RadioDeclined)
        );
        assert_eq!(
            gate.last_issue(),
            Some(&GateError::RadioDisabled { attempts: 3 })
        );

        // Resuming while blocked waits for the user.
        gate.on_resume();
        assert_eq!(gate.platform().enable_requests.len(), 3);

        assert!(gate.retry_radio());
        assert_eq!(gate.state(), &GateState::Idle);
        assert_eq!(gate.platform().enable_requests.len(), 4);
    }

    #[test]
    fn test_not_now_keeps_radio_block_across_resume() {
        let mut gate = gate(30, false);
        gate.set_policy(GatePolicy {
            max_enable_retries: Some(0),
            permissions_before_radio: true,
        });
        gate.on_resume();
        assert_eq!(
            gate.on_radio_result(RequestCode(1), RadioOutcome::Rejected),
            RadioFlow::Blocked
        );
        assert!(gate.shows_block_dialog());

        gate.dismiss_block();
        assert_eq!(
            gate.state(),
            &GateState::Blocked(BlockReason::RadioDeclined)
        );
        assert!(!gate.shows_block_dialog());

        gate.on_resume();
        gate.on_resume();
        assert_eq!(gate.platform().enable_requests.len(), 1);

        // A scan tap is an explicit request, so it prompts again.
        gate.platform_mut().granted.insert(Permission::FineLocation);
        assert_eq!(gate.request_scan(), ScanOutcome::AwaitingRadio);
        assert_eq!(gate.state(), &GateState::AwaitingRadio);
        assert_eq!(gate.platform().enable_requests.len(), 2);
    }

    #[test]
    fn test_adapter_on_clears_dismissed_radio_block() {
        let mut gate = gate(30, false);
        gate.set_policy(GatePolicy {
            max_enable_retries: Some(0),
            permissions_before_radio: true,
        });
        gate.on_resume();
        gate.on_radio_result(RequestCode(1), RadioOutcome::Rejected);
        gate.dismiss_block();

        gate.platform_mut().enabled = true;
        gate.on_resume();
        assert_eq!(gate.state(), &GateState::Idle);
        assert!(!gate.shows_block_dialog());
    }

    #[test]
    fn test_declined_radio_with_revoked_connect_routes_to_permissions() {
        let mut gate = gate(31, false);
        gate.platform_mut().granted.extend([
            Permission::BluetoothScan,
            Permission::BluetoothConnect,
        ]);
        assert_eq!(gate.request_scan(), ScanOutcome::AwaitingRadio);
        assert_eq!(gate.platform().enable_requests.len(), 1);

        gate.platform_mut()
            .granted
            .remove(&Permission::BluetoothConnect);
        let flow = gate.on_radio_result(RequestCode(1), RadioOutcome::Rejected);

        assert_eq!(flow, RadioFlow::NeedsPermissions);
        assert_eq!(gate.platform().enable_requests.len(), 1);
        assert!(!gate.is_radio_pending());
        assert!(!gate.is_scan_pending());
        assert_eq!(
            gate.state(),
            &GateState::ShowingRationale(RationaleKind::Bluetooth)
        );
    }

    #[test]
    fn test_declined_radio_that_came_on_starts_pending_scan() {
        let mut gate = gate(30, false);
        gate.platform_mut().granted.insert(Permission::FineLocation);
        gate.request_scan();

        gate.platform_mut().enabled = true;
        let flow = gate.on_radio_result(RequestCode(1), RadioOutcome::Rejected);

        assert_eq!(flow, RadioFlow::Enabled(Some(ScanOutcome::Started)));
        assert_eq!(gate.platform().enable_requests.len(), 1);
        assert_eq!(gate.platform().scans, 1);
        assert_eq!(gate.radio_declines(), 0);
        assert!(gate.last_issue().is_none());
    }

    #[test]
    fn test_unbounded_radio_retries() {
        let mut gate = gate(30, false);
        gate.set_policy(GatePolicy {
            max_enable_retries: None,
            permissions_before_radio: true,
        });
        gate.on_resume();
        for attempt in 1..=20 {
            assert_eq!(
                gate.on_radio_result(RequestCode(1), RadioOutcome::Rejected),
                RadioFlow::Retried { attempt }
            );
        }
        assert_eq!(gate.platform().enable_requests.len(), 21);
    }

    #[test]
    fn test_new_platform_defers_radio_until_connect_granted() {
        let mut gate = gate(31, false);
        gate.on_resume();
        assert!(gate.platform().enable_requests.is_empty());

        gate.set_policy(GatePolicy {
            max_enable_retries: Some(3),
            permissions_before_radio: false,
        });
        gate.on_resume();
        assert_eq!(gate.platform().enable_requests.len(), 1);
    }

    #[test]
    fn test_scan_waits_for_radio_then_starts() {
        let mut gate = gate(31, false);
        gate.platform_mut().granted.extend([
            Permission::BluetoothScan,
            Permission::BluetoothConnect,
        ]);

        assert_eq!(gate.request_scan(), ScanOutcome::AwaitingRadio);
        assert_eq!(gate.state(), &GateState::AwaitingRadio);
        assert!(gate.is_scan_pending());
        assert_eq!(gate.platform().enable_requests.len(), 1);
        assert_eq!(gate.platform().scans, 0);

        gate.platform_mut().enabled = true;
        let flow = gate.on_radio_result(RequestCode(1), RadioOutcome::Accepted);

        assert_eq!(flow, RadioFlow::Enabled(Some(ScanOutcome::Started)));
        assert_eq!(gate.state(), &GateState::Ready);
        assert_eq!(gate.platform().scans, 1);
    }

    #[test]
    fn test_each_tap_reevaluates() {
        let mut gate = gate(30, true);
        gate.platform_mut().granted.insert(Permission::FineLocation);
        gate.request_scan();
        gate.request_scan();
        assert_eq!(gate.platform().scans, 2);
    }

    #[test]
    fn test_reset_clears_transient_state() {
        let mut gate = gate(30, false);
        gate.on_resume();
        gate.on_radio_result(RequestCode(1), RadioOutcome::Rejected);
        gate.request_scan();

        gate.reset();
        assert_eq!(gate.state(), &GateState::Idle);
        assert!(gate.last_issue().is_none());
        assert!(!gate.is_radio_pending());
        assert_eq!(gate.radio_declines(), 0);

        gate.on_resume();
        assert_eq!(gate.platform().enable_requests.len(), 3);
    }

    #[test]
    fn test_open_settings_leaves_blocked_state() {
        let mut gate = gate(30, true);
        gate.request_scan();
        gate.acknowledge_rationale();
        location_result(&mut gate, GrantResult::Denied);

        gate.open_settings();
        assert_eq!(gate.platform().settings_opened, 1);
        assert_eq!(gate.state(), &GateState::Idle);
    }
}
