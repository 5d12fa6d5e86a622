//! Modal dialogs. System prompts from the simulated runtime sit on top of the
//! app's own dialogs, the same way OS dialogs cover an activity.

use crate::domain::gate::{BlockReason, GateState};
use crate::domain::permissions::Permission;
use crate::infrastructure::platform::{PermissionStatus, PromptAnswer, SystemPrompt};
use crate::presentation::app::ScanGateApp;
use crate::presentation::components::Components;
use eframe::egui;

pub fn render(app: &mut ScanGateApp, ctx: &egui::Context) {
    if let Some(prompt) = app.runtime.current_prompt() {
        system_prompt(app, ctx, prompt);
        return;
    }

    if app.runtime.is_settings_open() {
        app_settings_page(app, ctx);
        return;
    }

    match app.gate.state().clone() {
        GateState::ShowingRationale(kind) => {
            let acknowledged = Components::modal(ctx, "rationale", kind.title(), |ui| {
                ui.label(kind.message());
                ui.add_space(10.0);
                ui.vertical_centered(|ui| ui.button("OK").clicked()).inner
            });
            if acknowledged == Some(true) {
                app.log_event("Rationale acknowledged");
                app.gate.acknowledge_rationale();
            }
        }
        GateState::Blocked(_) if !app.gate.shows_block_dialog() => {}
        GateState::Blocked(BlockReason::PermissionsDenied(permissions)) => {
            permanent_denial(app, ctx, &permissions)
        }
        GateState::Blocked(BlockReason::RadioDeclined) => radio_declined(app, ctx),
        _ => {}
    }
}

#[derive(PartialEq)]
enum Choice {
    Primary,
    Secondary,
}

fn two_buttons(ui: &mut egui::Ui, primary: &str, secondary: &str) -> Option<Choice> {
    ui.horizontal(|ui| {
        if ui.button(primary).clicked() {
            Some(Choice::Primary)
        } else if ui.button(secondary).clicked() {
            Some(Choice::Secondary)
        } else {
            None
        }
    })
    .inner
}

fn permanent_denial(app: &mut ScanGateApp, ctx: &egui::Context, permissions: &[Permission]) {
    let choice = Components::modal(ctx, "permanent_denial", "Permission needed", |ui| {
        ui.label(
            "Scanning for BLE devices needs the following permission(s), which were \
             denied with \"Don't ask again\":",
        );
        for permission in permissions {
            ui.label(format!("• {}", permission.label()));
        }
        ui.label("Open the app settings and allow them under Permissions to continue.");
        ui.add_space(10.0);
        two_buttons(ui, "Open settings", "Not now")
    })
    .flatten();

    match choice {
        Some(Choice::Primary) => {
            app.log_event("Opening app settings");
            app.gate.open_settings();
        }
        Some(Choice::Secondary) => app.gate.dismiss_block(),
        None => {}
    }
}

fn radio_declined(app: &mut ScanGateApp, ctx: &egui::Context) {
    let attempts = app.gate.radio_declines();
    let choice = Components::modal(ctx, "radio_declined", "Bluetooth is off", |ui| {
        ui.label(format!(
            "Bluetooth must be on to scan for devices. The request was declined {} time(s).",
            attempts
        ));
        ui.add_space(10.0);
        two_buttons(ui, "Try again", "Not now")
    })
    .flatten();

    match choice {
        Some(Choice::Primary) => {
            app.gate.retry_radio();
        }
        Some(Choice::Secondary) => app.gate.dismiss_block(),
        None => {}
    }
}

fn system_prompt(app: &mut ScanGateApp, ctx: &egui::Context, prompt: SystemPrompt) {
    match prompt {
        SystemPrompt::Permissions { askable, .. } => {
            let answer = Components::modal(ctx, "system_permissions", "System", |ui| {
                ui.label("Allow BLE Scan Gate to access:");
                for permission in &askable {
                    ui.label(egui::RichText::new(permission.label()).strong());
                }
                ui.add_space(10.0);
                let mut answer = None;
                ui.vertical_centered_justified(|ui| {
                    if ui.button("Allow").clicked() {
                        answer = Some(PromptAnswer::Allow);
                    }
                    if ui.button("Don't allow").clicked() {
                        answer = Some(PromptAnswer::Deny);
                    }
                    if ui.button("Don't allow & don't ask again").clicked() {
                        answer = Some(PromptAnswer::DenyAndDontAskAgain);
                    }
                });
                answer
            })
            .flatten();

            if let Some(answer) = answer {
                app.runtime.answer_permission_prompt(answer);
            }
        }
        SystemPrompt::EnableRadio { .. } => {
            let choice = Components::modal(ctx, "system_radio", "System", |ui| {
                ui.label("An app wants to turn on Bluetooth.");
                ui.add_space(10.0);
                two_buttons(ui, "Allow", "Deny")
            })
            .flatten();

            if let Some(choice) = choice {
                app.runtime.answer_radio_prompt(choice == Choice::Primary);
            }
        }
    }
}

/// The platform's per-app permission page.
fn app_settings_page(app: &mut ScanGateApp, ctx: &egui::Context) {
    let runtime = app.runtime.clone();
    let done = Components::modal(ctx, "app_settings", "App info › Permissions", |ui| {
        for permission in Permission::ALL {
            let status = runtime.permission_status(permission);
            let mut granted = status == PermissionStatus::Granted;
            if ui.checkbox(&mut granted, permission.label()).changed() {
                runtime.set_granted(permission, granted);
            }
        }
        ui.add_space(10.0);
        ui.button("Done").clicked()
    });

    if done == Some(true) {
        runtime.close_settings();
        // Coming back from settings resumes the screen.
        app.resume();
    }
}
