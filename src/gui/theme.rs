//! Colors, spacing and styled widget factories for the tip jar window.

use eframe::egui;

#[derive(Clone, Copy)]
pub struct AppTheme {
    // Base colors
    pub background: egui::Color32,
    pub surface: egui::Color32,
    pub surface_hover: egui::Color32,
    pub surface_active: egui::Color32,
    pub panel_fill: egui::Color32,
    pub text_primary: egui::Color32,
    pub text_secondary: egui::Color32,

    // Semantic colors
    pub primary: egui::Color32,
    pub secondary: egui::Color32,
    pub success: egui::Color32,
    pub warning: egui::Color32,
    pub error: egui::Color32,
    pub info: egui::Color32,

    pub accent_cream: egui::Color32,
    pub accent_blue: egui::Color32,

    pub spacing_xs: f32,
    pub spacing_sm: f32,
    pub spacing_md: f32,
    pub spacing_lg: f32,

    pub button_small: egui::Vec2,
    pub button_medium: egui::Vec2,
}

impl Default for AppTheme {
    fn default() -> Self {
        Self {
            // Dark roast background with crema highlights
            background: egui::Color32::from_rgb(20, 14, 10),
            surface: egui::Color32::from_rgb(34, 24, 18),
            surface_hover: egui::Color32::from_rgb(48, 34, 25),
            surface_active: egui::Color32::from_rgb(62, 44, 32),
            panel_fill: egui::Color32::from_rgb(27, 19, 14),
            text_primary: egui::Color32::from_rgb(240, 226, 206),
            text_secondary: egui::Color32::from_rgb(168, 150, 132),

            primary: egui::Color32::from_rgb(212, 146, 74),
            secondary: egui::Color32::from_rgb(90, 70, 55),
            success: egui::Color32::from_rgb(120, 200, 120),
            warning: egui::Color32::from_rgb(255, 190, 80),
            error: egui::Color32::from_rgb(240, 96, 86),
            info: egui::Color32::from_rgb(140, 180, 230),

            accent_cream: egui::Color32::from_rgb(246, 215, 170),
            accent_blue: egui::Color32::from_rgb(110, 170, 255),

            spacing_xs: 4.0,
            spacing_sm: 8.0,
            spacing_md: 16.0,
            spacing_lg: 24.0,

            button_small: egui::vec2(90.0, 26.0),
            button_medium: egui::vec2(140.0, 34.0),
        }
    }
}

impl AppTheme {
    /// Filled call-to-action button
    pub fn button_primary(&self, text: &str) -> egui::Button<'_> {
        egui::Button::new(egui::RichText::new(text).color(self.background).strong())
            .fill(self.primary)
            .rounding(6.0)
            .min_size(self.button_medium)
    }

    /// Outlined button for secondary actions
    pub fn button_secondary(&self, text: &str) -> egui::Button<'_> {
        egui::Button::new(egui::RichText::new(text).color(self.text_primary))
            .fill(self.surface)
            .stroke(egui::Stroke::new(1.5, self.secondary))
            .rounding(6.0)
            .min_size(self.button_small)
    }

    /// Frame for the stat cards
    pub fn frame_card(&self) -> egui::Frame {
        egui::Frame::none()
            .fill(self.surface)
            .rounding(8.0)
            .inner_margin(self.spacing_md)
            .stroke(egui::Stroke::new(1.0, self.secondary))
    }

    /// Frame for the larger panels (form, history)
    pub fn frame_panel(&self) -> egui::Frame {
        egui::Frame::none()
            .fill(self.panel_fill)
            .rounding(8.0)
            .inner_margin(self.spacing_md)
            .stroke(egui::Stroke::new(1.0, self.surface_active))
    }

    pub fn notification_color(&self, kind: super::notifications::NotificationKind) -> egui::Color32 {
        use super::notifications::NotificationKind;
        match kind {
            NotificationKind::Success => self.success,
            NotificationKind::Error => self.error,
            NotificationKind::Info => self.info,
        }
    }
}

/// Configure the egui context style with the given theme
pub fn configure_style(ctx: &egui::Context, theme: &AppTheme) {
    let mut visuals = egui::Visuals::dark();
    visuals.window_fill = theme.background;
    visuals.panel_fill = theme.panel_fill;
    visuals.override_text_color = Some(theme.text_primary);

    visuals.widgets.noninteractive.bg_fill = theme.surface;
    visuals.widgets.inactive.bg_fill = theme.surface;
    visuals.widgets.hovered.bg_fill = theme.surface_hover;
    visuals.widgets.active.bg_fill = theme.surface_active;
    visuals.widgets.open.bg_fill = theme.surface_active;

    visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, theme.secondary);
    visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.5, theme.primary);
    visuals.widgets.active.bg_stroke = egui::Stroke::new(2.0, theme.primary);
    visuals.selection.bg_fill = theme.surface_active;
    visuals.selection.stroke = egui::Stroke::new(1.0, theme.accent_cream);

    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(12.0, 6.0);
    style.spacing.menu_margin = egui::Margin::same(8.0);

    style.text_styles.insert(
        egui::TextStyle::Heading,
        egui::FontId::new(22.0, egui::FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Body,
        egui::FontId::new(14.0, egui::FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Button,
        egui::FontId::new(14.0, egui::FontFamily::Proportional),
    );
    style.text_styles.insert(
        egui::TextStyle::Monospace,
        egui::FontId::new(12.0, egui::FontFamily::Monospace),
    );

    ctx.set_style(style);
}
