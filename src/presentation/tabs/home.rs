use crate::domain::models::MessageSeverity;
use crate::domain::permissions::required_permissions;
use crate::domain::platform::{PermissionOracle, RadioController};
use crate::presentation::app::ScanGateApp;
use crate::presentation::components::Components;
use crate::presentation::theme::Palette;
use eframe::egui;

pub fn render(app: &mut ScanGateApp, ui: &mut egui::Ui) {
    Components::heading(ui, "BLE Scan Gate");
    ui.add_space(20.0);

    ui_scan_panel(app, ui);
    ui.add_space(15.0);

    ui_preconditions_panel(app, ui);
    ui.add_space(15.0);

    ui_devices_panel(app, ui);
}

fn ui_scan_panel(app: &mut ScanGateApp, ui: &mut egui::Ui) {
    Components::card(ui, "Scanner", |ui| {
        let palette = Palette::new(ui.visuals().dark_mode);
        let (text, severity) = app.gate_summary();
        let (bg_color, text_color) = match severity {
            MessageSeverity::Success => (palette.ok, egui::Color32::WHITE),
            MessageSeverity::Warning => (palette.warn, egui::Color32::BLACK),
            MessageSeverity::Error => (palette.bad, egui::Color32::WHITE),
            MessageSeverity::Info => (palette.muted, egui::Color32::WHITE),
        };
        Components::status_banner(ui, text, bg_color, text_color);

        ui.add_space(10.0);

        ui.horizontal(|ui| {
            if ui.button("Start scan").clicked() {
                app.start_scan();
            }
            if app.is_scanning {
                if ui.button("Stop scan").clicked() {
                    app.stop_scan();
                }
                ui.spinner();
            }
        });

        if let Some(msg) = &app.status_message {
            let color = Components::severity_color(ui, msg.severity);
            ui.label(egui::RichText::new(&msg.message).color(color));
        }
    });
}

fn ui_preconditions_panel(app: &mut ScanGateApp, ui: &mut egui::Ui) {
    Components::card(ui, "Preconditions", |ui| {
        let platform = app.gate.platform();
        let level = platform.api_level();
        ui.label(format!("Platform: {}", level));

        Components::indicator(ui, "Bluetooth", platform.is_enabled(), "ON", "OFF");

        for permission in required_permissions(level) {
            Components::indicator(
                ui,
                permission.label(),
                platform.is_granted(*permission),
                "GRANTED",
                "MISSING",
            );
        }
    });
}

fn ui_devices_panel(app: &mut ScanGateApp, ui: &mut egui::Ui) {
    Components::card(ui, "Discovered devices", |ui| {
        if app.scanned_devices.is_empty() {
            ui.label(if app.is_scanning {
                "Listening for advertisements..."
            } else {
                "No devices yet. Start a scan."
            });
            return;
        }

        let mut devices: Vec<_> = app.scanned_devices.iter().collect();
        devices.sort_by(|a, b| b.signal_strength.cmp(&a.signal_strength));

        egui::Grid::new("devices_grid")
            .striped(true)
            .spacing([30.0, 6.0])
            .show(ui, |ui| {
                ui.label(egui::RichText::new("Name").strong());
                ui.label(egui::RichText::new("Address").strong());
                ui.label(egui::RichText::new("RSSI").strong());
                ui.end_row();

                for device in devices {
                    ui.label(&device.name);
                    ui.monospace(device.address_string());
                    ui.label(format!("{} dBm", device.signal_strength));
                    ui.end_row();
                }
            });
    });
}
