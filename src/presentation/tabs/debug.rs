use crate::domain::permissions::Permission;
use crate::domain::platform::{PermissionOracle, RadioController};
use crate::infrastructure::platform::PermissionStatus;
use crate::presentation::app::ScanGateApp;
use crate::presentation::components::Components;
use eframe::egui;

pub fn render(app: &mut ScanGateApp, ui: &mut egui::Ui) {
    Components::heading(ui, "Debug & Internal State");
    ui.add_space(20.0);

    Components::card(ui, "Gate", |ui| {
        let codes = app.gate.codes();
        egui::Grid::new("gate_grid")
            .spacing([20.0, 5.0])
            .show(ui, |ui| {
                ui.label("State:");
                ui.monospace(format!("{:?}", app.gate.state()));
                ui.end_row();
                ui.label("Last issue:");
                ui.label(
                    app.gate
                        .last_issue()
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                );
                ui.end_row();
                ui.label("Pending:");
                ui.label(format!(
                    "permission={} radio={} scan={}",
                    app.gate.is_permission_pending(),
                    app.gate.is_radio_pending(),
                    app.gate.is_scan_pending()
                ));
                ui.end_row();
                ui.label("Radio declines:");
                ui.label(app.gate.radio_declines().to_string());
                ui.end_row();
                ui.label("Request codes:");
                ui.label(format!(
                    "enable={} permission={}",
                    codes.enable_bluetooth, codes.runtime_permission
                ));
                ui.end_row();
                ui.label("Policy:");
                ui.monospace(format!("{:?}", app.gate.policy()));
                ui.end_row();
                ui.label("Screen resets:");
                ui.label(app.screen_resets.to_string());
                ui.end_row();
            });

        ui.horizontal(|ui| {
            if ui.button("Simulate resume").clicked() {
                app.resume();
            }
            if ui.button("Reset screen").clicked() {
                app.reset_screen();
            }
        });
    });

    ui.add_space(10.0);

    Components::card(ui, "Simulated Device", |ui| {
        let runtime = app.runtime.clone();
        ui.label(format!(
            "{} · {} pending system prompt(s)",
            runtime.api_level(),
            runtime.pending_prompts()
        ));

        let mut enabled = runtime.is_enabled();
        if ui.checkbox(&mut enabled, "Bluetooth adapter on").changed() {
            runtime.set_adapter_enabled(enabled);
        }

        for permission in Permission::ALL {
            let status = runtime.permission_status(permission);
            ui.horizontal(|ui| {
                ui.label(permission.as_str());
                ui.label(egui::RichText::new(status_text(status)).strong());
            });
        }
    });

    ui.add_space(10.0);

    Components::card(ui, "Event Log", |ui| {
        egui::ScrollArea::vertical()
            .max_height(220.0)
            .show(ui, |ui| {
                for entry in &app.event_log {
                    ui.monospace(entry.as_str());
                }
            });
    });
}

fn status_text(status: PermissionStatus) -> &'static str {
    match status {
        PermissionStatus::NotRequested => "not requested",
        PermissionStatus::Granted => "granted",
        PermissionStatus::Denied => "denied",
        PermissionStatus::DeniedPermanently => "denied (don't ask again)",
    }
}
