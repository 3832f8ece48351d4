use crate::gui::app::GuiApp;
use crate::types::Tip;
use crate::view_model::LoadState;
use eframe::egui::{self, RichText};

impl GuiApp {
    /// Most recent tips, newest first
    pub(crate) fn view_history(&mut self, ui: &mut egui::Ui) {
        self.theme.frame_panel().show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(RichText::new("Recent Tips").size(18.0).strong());
            ui.add_space(self.theme.spacing_sm);

            match self.history.state() {
                LoadState::Loading => {
                    ui.spinner();
                }
                LoadState::Unavailable => {
                    ui.label(RichText::new("Unable to load tip history.").color(self.theme.error));
                }
                LoadState::Ready(tips) if tips.is_empty() => {
                    ui.label(RichText::new("No tips yet").color(self.theme.text_secondary));
                }
                LoadState::Ready(tips) => {
                    egui::ScrollArea::vertical()
                        .id_source("tip_history")
                        .max_height(360.0)
                        .auto_shrink([false, true])
                        .show(ui, |ui| {
                            for tip in &tips {
                                self.render_tip(ui, tip);
                                ui.add_space(self.theme.spacing_xs);
                            }
                        });
                }
            }
        });
    }

    fn render_tip(&self, ui: &mut egui::Ui, tip: &Tip) {
        self.theme.frame_card().show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(RichText::new(tip.sender_display()).monospace().color(self.theme.text_secondary));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(RichText::new(tip.amount_display()).strong().color(self.theme.accent_cream));
                });
            });
            if !tip.message.is_empty() {
                ui.label(&tip.message);
            }
            ui.label(RichText::new(tip.time_display()).small().color(self.theme.text_secondary));
        });
    }
}
