use crate::domain::gate::{
    BlockReason, GatePolicy, GateState, PermissionOutcome, RadioFlow, RequestCodes, ScanGate,
    ScanOutcome,
};
use crate::domain::models::{AppEvent, MessageSeverity, ScannedDevice, StatusMessage, Tab};
use crate::domain::settings::SettingsService;
use crate::infrastructure::bluetooth::spawn_scan_worker;
use crate::infrastructure::logging::{init_logger, LoggingGuard};
use crate::infrastructure::platform::{DesktopPlatform, SimulatedAndroid};
use crate::presentation::{dialogs, tabs, theme};
use eframe::egui;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

const EVENT_LOG_CAPACITY: usize = 100;

pub struct ScanGateApp {
    // Services
    pub(crate) settings: SettingsService,
    pub(crate) gate: ScanGate<DesktopPlatform>,
    pub(crate) runtime: SimulatedAndroid,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,

    // State
    pub(crate) status_message: Option<StatusMessage>,
    pub(crate) is_scanning: bool,
    pub(crate) scanned_devices: Vec<ScannedDevice>,
    pub(crate) event_log: VecDeque<String>,
    pub(crate) screen_resets: u32,

    // UI State
    pub(crate) selected_tab: Tab,
    pub(crate) is_dark_mode: bool,
    pub(crate) service_uuid_input: String,
    was_focused: bool,
    resumed_once: bool,

    _logging_guard: Option<LoggingGuard>,
}

impl ScanGateApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        theme::configure_theme(&cc.egui_ctx, false);

        let settings = SettingsService::new().unwrap_or_else(|e| {
            eprintln!("Failed to locate settings directory, using ./settings.json: {}", e);
            SettingsService::with_path(PathBuf::from("settings.json"))
        });

        let logging_guard = init_logger(&settings.get().log_settings)
            .map_err(|e| eprintln!("Failed to initialize logging: {}", e))
            .ok();

        info!("Starting BLE Scan Gate");
        info!("Settings file: {}", settings.path().display());

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let scan_tx = spawn_scan_worker(&settings.get().scan, event_tx.clone());
        let runtime = SimulatedAndroid::new(&settings.get().simulation, event_tx);
        let platform =
            DesktopPlatform::new(runtime.clone(), scan_tx, settings.get().scan.clone());
        let gate = ScanGate::new(
            platform,
            RequestCodes::default(),
            GatePolicy::from(&settings.get().gate),
        );

        let service_uuid_input = settings.get().scan.service_uuid.clone().unwrap_or_default();

        Self {
            settings,
            gate,
            runtime,
            event_rx,
            status_message: None,
            is_scanning: false,
            scanned_devices: Vec::new(),
            event_log: VecDeque::new(),
            screen_resets: 0,
            selected_tab: Tab::Home,
            is_dark_mode: false,
            service_uuid_input,
            was_focused: true,
            resumed_once: false,
            _logging_guard: logging_guard,
        }
    }

    pub(crate) fn log_event(&mut self, entry: impl Into<String>) {
        self.event_log.push_front(entry.into());
        self.event_log.truncate(EVENT_LOG_CAPACITY);
    }

    fn set_status(&mut self, severity: MessageSeverity, message: impl Into<String>) {
        self.status_message = Some(StatusMessage::new(severity, message));
    }

    pub(crate) fn resume(&mut self) {
        self.log_event("Screen resumed");
        self.gate.on_resume();
    }

    /// The "Start scan" button.
    pub(crate) fn start_scan(&mut self) {
        self.log_event("Start scan tapped");
        let outcome = self.gate.request_scan();
        self.note_scan_outcome(outcome);
    }

    pub(crate) fn stop_scan(&mut self) {
        self.gate.platform().stop_scan();
    }

    fn note_scan_outcome(&mut self, outcome: ScanOutcome) {
        self.log_event(format!("Scan request: {:?}", outcome));
        match outcome {
            ScanOutcome::Started => {
                self.is_scanning = true;
                self.scanned_devices.clear();
            }
            ScanOutcome::PermissionsRequested => {
                self.set_status(MessageSeverity::Info, "Permissions are needed to scan");
            }
            ScanOutcome::AwaitingRadio => {
                self.set_status(MessageSeverity::Info, "Waiting for Bluetooth to be enabled");
            }
        }
    }

    /// Discards screen state and starts over, like an activity being recreated.
    pub(crate) fn reset_screen(&mut self) {
        warn!("Rebuilding screen state");
        self.screen_resets += 1;
        self.gate.reset();
        self.stop_scan();
        self.is_scanning = false;
        self.scanned_devices.clear();
        self.status_message = None;
        self.log_event("Screen reset");
        self.resume();
    }

    fn process_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                AppEvent::PermissionResult {
                    code,
                    permissions,
                    grants,
                } => {
                    self.log_event(format!(
                        "Permission result {}: {:?} -> {:?}",
                        code, permissions, grants
                    ));
                    let outcome = self.gate.on_permission_result(code, &permissions, &grants);
                    self.handle_permission_outcome(outcome);
                }
                AppEvent::RadioResult { code, outcome } => {
                    self.log_event(format!("Radio result {}: {:?}", code, outcome));
                    let flow = self.gate.on_radio_result(code, outcome);
                    self.handle_radio_flow(flow);
                }
                AppEvent::DeviceFound(device) => {
                    if let Some(existing) = self
                        .scanned_devices
                        .iter_mut()
                        .find(|d| d.address == device.address)
                    {
                        existing.signal_strength = device.signal_strength;
                    } else {
                        self.log_event(format!("Found {} ({})", device.name, device.address_string()));
                        self.scanned_devices.push(device);
                    }
                }
                AppEvent::ScanFinished { session } => {
                    if !self.gate.platform().is_current_session(session) {
                        debug!(session, "Ignoring finish of a superseded scan");
                        continue;
                    }
                    self.is_scanning = false;
                    let found = self.scanned_devices.len();
                    self.set_status(
                        MessageSeverity::Success,
                        format!("Scan finished, {} device(s) found", found),
                    );
                }
                AppEvent::LogMessage(msg) => self.status_message = Some(msg),
            }
        }
    }

    fn handle_permission_outcome(&mut self, outcome: PermissionOutcome) {
        match outcome {
            PermissionOutcome::Ignored => {}
            PermissionOutcome::Blocked | PermissionOutcome::Retried => {
                if let Some(issue) = self.gate.last_issue() {
                    let message = issue.to_string();
                    self.set_status(MessageSeverity::Warning, message);
                }
            }
            PermissionOutcome::Proceeded(scan) => self.note_scan_outcome(scan),
            PermissionOutcome::ResetRequired => self.reset_screen(),
        }
    }

    fn handle_radio_flow(&mut self, flow: RadioFlow) {
        match flow {
            RadioFlow::Ignored => {}
            RadioFlow::Enabled(scan) => {
                self.set_status(MessageSeverity::Success, "Bluetooth enabled");
                if let Some(scan) = scan {
                    self.note_scan_outcome(scan);
                }
            }
            RadioFlow::Retried { attempt } => {
                self.set_status(
                    MessageSeverity::Warning,
                    format!("Bluetooth is required to scan (asked {} time(s))", attempt + 1),
                );
            }
            RadioFlow::NeedsPermissions => {
                self.set_status(
                    MessageSeverity::Warning,
                    "Bluetooth permissions are needed before Bluetooth can be enabled",
                );
            }
            RadioFlow::Blocked => {
                if let Some(issue) = self.gate.last_issue() {
                    let message = issue.to_string();
                    self.set_status(MessageSeverity::Error, message);
                }
            }
        }
    }

    /// True while a dialog owns the screen.
    pub(crate) fn is_modal_open(&self) -> bool {
        matches!(self.gate.state(), GateState::ShowingRationale(_))
            || self.gate.shows_block_dialog()
            || self.runtime.current_prompt().is_some()
            || self.runtime.is_settings_open()
    }

    pub(crate) fn gate_summary(&self) -> (&'static str, MessageSeverity) {
        match self.gate.state() {
            GateState::Idle => ("IDLE", MessageSeverity::Info),
            GateState::ShowingRationale(_) | GateState::AwaitingPermission => {
                ("WAITING FOR PERMISSION", MessageSeverity::Warning)
            }
            GateState::AwaitingRadio => ("WAITING FOR BLUETOOTH", MessageSeverity::Warning),
            GateState::Ready if self.is_scanning => ("SCANNING", MessageSeverity::Success),
            GateState::Ready => ("READY", MessageSeverity::Success),
            GateState::Blocked(BlockReason::PermissionsDenied(_)) => {
                ("BLOCKED: PERMISSION DENIED", MessageSeverity::Error)
            }
            GateState::Blocked(BlockReason::RadioDeclined) => {
                ("BLOCKED: BLUETOOTH OFF", MessageSeverity::Error)
            }
        }
    }
}

impl eframe::App for ScanGateApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Window focus stands in for activity resume.
        let focused = ctx.input(|i| i.focused);
        if !self.resumed_once || (focused && !self.was_focused) {
            self.resumed_once = true;
            self.resume();
        }
        self.was_focused = focused;

        self.process_events();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.selectable_value(&mut self.selected_tab, Tab::Home, "Home");
                ui.selectable_value(&mut self.selected_tab, Tab::Settings, "Settings");
                ui.selectable_value(&mut self.selected_tab, Tab::Debug, "Debug");

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let switch_icon = if self.is_dark_mode {
                        "☀ Light"
                    } else {
                        "🌙 Dark"
                    };
                    if ui.button(switch_icon).clicked() {
                        self.is_dark_mode = !self.is_dark_mode;
                        theme::configure_theme(ctx, self.is_dark_mode);
                    }
                });
            });
        });

        let modal_open = self.is_modal_open();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!modal_open, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.set_max_width(700.0);
                        ui.add_space(20.0);

                        match self.selected_tab {
                            Tab::Home => tabs::home::render(self, ui),
                            Tab::Settings => tabs::settings::render(self, ui),
                            Tab::Debug => tabs::debug::render(self, ui),
                        }

                        ui.add_space(40.0);
                    });
                });
            });
        });

        dialogs::render(self, ctx);

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
