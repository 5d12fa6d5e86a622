use crate::domain::models::MessageSeverity;
use crate::presentation::theme::Palette;
use eframe::egui;

pub struct Components;

impl Components {
    pub fn heading(ui: &mut egui::Ui, text: &str) {
        ui.label(egui::RichText::new(text).heading().strong());
    }

    pub fn card<R>(
        ui: &mut egui::Ui,
        title: &str,
        add_contents: impl FnOnce(&mut egui::Ui) -> R,
    ) -> R {
        let stroke = ui.style().visuals.widgets.noninteractive.bg_stroke;
        let bg = ui.style().visuals.widgets.noninteractive.bg_fill;

        egui::Frame::none()
            .inner_margin(egui::Margin::same(15.0))
            .stroke(stroke)
            .fill(bg)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(title).strong().size(18.0));
                    ui.add_space(8.0);
                    add_contents(ui)
                })
                .inner
            })
            .inner
    }

    pub fn status_banner(
        ui: &mut egui::Ui,
        text: &str,
        bg_color: egui::Color32,
        text_color: egui::Color32,
    ) {
        ui.add_sized(
            [ui.available_width(), 35.0],
            egui::Label::new(
                egui::RichText::new(text)
                    .color(text_color)
                    .background_color(bg_color)
                    .size(16.0)
                    .strong(),
            )
            .wrap_mode(egui::TextWrapMode::Extend),
        );
    }

    /// A yes/no style indicator, e.g. "Bluetooth: ON".
    pub fn indicator(ui: &mut egui::Ui, label: &str, ok: bool, ok_text: &str, bad_text: &str) {
        let palette = Palette::new(ui.visuals().dark_mode);
        ui.horizontal(|ui| {
            ui.label(format!("{}:", label));
            let (text, color) = if ok {
                (ok_text, palette.ok)
            } else {
                (bad_text, palette.bad)
            };
            ui.label(egui::RichText::new(text).color(color).strong());
        });
    }

    pub fn severity_color(ui: &egui::Ui, severity: MessageSeverity) -> egui::Color32 {
        let palette = Palette::new(ui.visuals().dark_mode);
        match severity {
            MessageSeverity::Info => palette.fg,
            MessageSeverity::Success => palette.ok,
            MessageSeverity::Warning => palette.warn,
            MessageSeverity::Error => palette.bad,
        }
    }

    /// Centered, non-collapsible window without a close button.
    pub fn modal<R>(
        ctx: &egui::Context,
        id: &str,
        title: &str,
        add_contents: impl FnOnce(&mut egui::Ui) -> R,
    ) -> Option<R> {
        egui::Window::new(title)
            .id(egui::Id::new(id))
            .collapsible(false)
            .resizable(false)
            .default_width(420.0)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, add_contents)
            .and_then(|response| response.inner)
    }
}
