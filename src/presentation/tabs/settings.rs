use crate::domain::gate::GatePolicy;
use crate::domain::models::MessageSeverity;
use crate::domain::permissions::ApiLevel;
use crate::infrastructure::bluetooth::parse_service_uuid;
use crate::presentation::app::ScanGateApp;
use crate::presentation::components::Components;
use eframe::egui;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub fn render(app: &mut ScanGateApp, ui: &mut egui::Ui) {
    Components::heading(ui, "Settings");
    ui.add_space(20.0);

    let settings = app.settings.get_mut();

    Components::card(ui, "Permission & Bluetooth Gate", |ui| {
        let mut limited = settings.gate.max_enable_retries.is_some();
        if ui
            .checkbox(&mut limited, "Limit automatic Bluetooth prompts")
            .changed()
        {
            settings.gate.max_enable_retries = limited.then_some(3);
        }
        if let Some(retries) = settings.gate.max_enable_retries.as_mut() {
            ui.indent("retries_indent", |ui| {
                ui.horizontal(|ui| {
                    ui.label("Re-prompts after a decline:");
                    ui.add(egui::Slider::new(retries, 0..=10));
                });
            });
        }
        ui.checkbox(
            &mut settings.gate.permissions_before_radio,
            "Ask for Bluetooth permissions before enabling Bluetooth (API 31+)",
        );
    });

    ui.add_space(10.0);

    Components::card(ui, "Scanning", |ui| {
        ui.horizontal(|ui| {
            ui.label("Scan duration (s):");
            ui.add(egui::Slider::new(&mut settings.scan.duration_secs, 1..=60));
        });
        ui.horizontal(|ui| {
            ui.label("Service UUID filter:");
            ui.text_edit_singleline(&mut app.service_uuid_input);
        });
        ui.checkbox(
            &mut settings.scan.simulate,
            "Use simulated advertisements (applies after restart)",
        );
    });

    ui.add_space(10.0);

    Components::card(ui, "Simulated Device", |ui| {
        let mut level = settings.simulation.api_level.0;
        ui.horizontal(|ui| {
            ui.label("API level:");
            if ui.add(egui::Slider::new(&mut level, ApiLevel::M.0..=35)).changed() {
                settings.simulation.api_level = ApiLevel(level);
                app.runtime.set_api_level(ApiLevel(level));
            }
        });
        ui.checkbox(
            &mut settings.simulation.adapter_enabled,
            "Bluetooth on at startup",
        );
    });

    ui.add_space(10.0);

    Components::card(ui, "Logging", |ui| {
        let log = &mut settings.log_settings;
        egui::ComboBox::from_label("Level")
            .selected_text(log.level.clone())
            .show_ui(ui, |ui| {
                for level in LOG_LEVELS {
                    ui.selectable_value(&mut log.level, level.to_string(), level);
                }
            });
        ui.checkbox(&mut log.file_logging_enabled, "Write log files");
        ui.checkbox(&mut log.console_logging_enabled, "Log to console");
        ui.label(egui::RichText::new("Logging changes apply after restart.").italics());
    });

    ui.add_space(10.0);

    if ui.button("Apply & Save").clicked() {
        apply(app);
    }
}

fn apply(app: &mut ScanGateApp) {
    let uuid = app.service_uuid_input.trim().to_string();
    if !uuid.is_empty() {
        if let Err(e) = parse_service_uuid(&uuid) {
            tracing::warn!("Rejected service UUID filter: {}", e);
            app.status_message = Some(crate::domain::models::StatusMessage::new(
                MessageSeverity::Error,
                format!("Service UUID filter not saved: {}", e),
            ));
            return;
        }
    }

    let settings = app.settings.get_mut();
    settings.scan.service_uuid = (!uuid.is_empty()).then_some(uuid);

    let policy = GatePolicy::from(&settings.gate);
    let scan = settings.scan.clone();
    app.gate.set_policy(policy);
    app.gate.platform_mut().set_scan_settings(scan);

    match app.settings.save() {
        Ok(()) => {
            tracing::info!("Settings saved");
            app.status_message = Some(crate::domain::models::StatusMessage::new(
                MessageSeverity::Success,
                "Settings saved",
            ));
        }
        Err(e) => {
            tracing::error!("Failed to save settings: {}", e);
            app.status_message = Some(crate::domain::models::StatusMessage::new(
                MessageSeverity::Error,
                format!("Failed to save settings: {}", e),
            ));
        }
    }
}
