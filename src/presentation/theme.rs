use eframe::egui;

pub struct Palette {
    pub bg: egui::Color32,
    pub fg: egui::Color32,
    pub stroke: egui::Color32,
    pub accent: egui::Color32,
    pub ok: egui::Color32,
    pub warn: egui::Color32,
    pub bad: egui::Color32,
    pub muted: egui::Color32,
}

impl Palette {
    pub fn new(is_dark: bool) -> Self {
        if is_dark {
            Self {
                bg: egui::Color32::from_rgb(24, 26, 31),
                fg: egui::Color32::from_gray(230),
                stroke: egui::Color32::from_gray(90),
                accent: egui::Color32::from_rgb(66, 133, 244),
                ok: egui::Color32::from_rgb(80, 200, 120),
                warn: egui::Color32::from_rgb(240, 180, 40),
                bad: egui::Color32::from_rgb(240, 90, 90),
                muted: egui::Color32::from_gray(120),
            }
        } else {
            Self {
                bg: egui::Color32::from_rgb(248, 249, 251),
                fg: egui::Color32::from_gray(20),
                stroke: egui::Color32::from_gray(190),
                accent: egui::Color32::from_rgb(26, 115, 232),
                ok: egui::Color32::from_rgb(24, 128, 56),
                warn: egui::Color32::from_rgb(176, 96, 0),
                bad: egui::Color32::from_rgb(197, 34, 31),
                muted: egui::Color32::from_gray(110),
            }
        }
    }
}

pub fn configure_theme(ctx: &egui::Context, is_dark: bool) {
    let palette = Palette::new(is_dark);
    let mut style = (*ctx.style()).clone();
    style.visuals = if is_dark {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };

    style
        .text_styles
        .iter_mut()
        .for_each(|(text_style, font_id)| {
            font_id.size = match text_style {
                egui::TextStyle::Heading => 24.0,
                egui::TextStyle::Body | egui::TextStyle::Button => 15.0,
                _ => font_id.size,
            };
        });

    style.spacing.item_spacing = egui::vec2(10.0, 10.0);
    style.spacing.button_padding = egui::vec2(14.0, 8.0);

    let rounding = egui::Rounding::same(4.0);
    for widget in [
        &mut style.visuals.widgets.noninteractive,
        &mut style.visuals.widgets.inactive,
        &mut style.visuals.widgets.hovered,
        &mut style.visuals.widgets.active,
    ] {
        widget.rounding = rounding;
    }
    style.visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, palette.stroke);
    style.visuals.widgets.noninteractive.bg_fill = palette.bg;
    style.visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.5, palette.accent);
    style.visuals.widgets.active.bg_fill = palette.accent;

    style.visuals.selection.bg_fill = palette.accent;
    style.visuals.window_rounding = egui::Rounding::same(8.0);
    style.visuals.window_stroke = egui::Stroke::new(1.0, palette.stroke);
    style.visuals.window_fill = palette.bg;
    style.visuals.panel_fill = palette.bg;

    ctx.set_style(style);
}
