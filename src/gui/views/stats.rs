//! Aggregate ledger statistics and the configuration warning banner.

use crate::config::get_object_explorer_url;
use crate::gui::app::GuiApp;
use crate::types::TipLedgerSnapshot;
use crate::view_model::LoadState;
use eframe::egui::{self, RichText};

impl GuiApp {
    pub(crate) fn view_stats(&mut self, ui: &mut egui::Ui) {
        match self.stats.state() {
            LoadState::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(RichText::new("Loading tip jar...").color(self.theme.text_secondary));
                });
            }
            LoadState::Unavailable => {
                self.theme.frame_panel().show(ui, |ui| {
                    ui.label(
                        RichText::new("Unable to load tip jar data. Please check your configuration.")
                            .color(self.theme.error),
                    );
                    if let Some(err) = self.stats.last_error() {
                        ui.label(RichText::new(err.to_string()).small().color(self.theme.text_secondary));
                    }
                });
            }
            LoadState::Ready(snapshot) => self.render_stat_cards(ui, &snapshot),
        }
    }

    fn render_stat_cards(&mut self, ui: &mut egui::Ui, snapshot: &TipLedgerSnapshot) {
        let cards = [
            ("Total Tips", snapshot.total_tips_display()),
            ("Supporters", snapshot.total_tippers.to_string()),
            ("Coffees", snapshot.tip_count.to_string()),
        ];

        ui.columns(cards.len(), |columns| {
            for (column, (title, value)) in columns.iter_mut().zip(cards.iter()) {
                self.theme.frame_card().show(column, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.vertical_centered(|ui| {
                        ui.label(RichText::new(*title).size(12.0).color(self.theme.text_secondary));
                        ui.label(RichText::new(value).size(22.0).strong().color(self.theme.accent_cream));
                    });
                });
            }
        });

        ui.add_space(self.theme.spacing_xs);
        ui.horizontal(|ui| {
            if !snapshot.creator.is_empty() {
                ui.label(
                    RichText::new(format!("Creator {}", crate::utils::short_address(&snapshot.creator)))
                        .small()
                        .color(self.theme.text_secondary),
                );
                ui.separator();
            }
            if ui
                .link(RichText::new("View ledger in explorer").small().color(self.theme.accent_blue))
                .clicked()
            {
                let url = get_object_explorer_url(self.config.network, &self.config.ledger_object_id);
                self.open_link(&url);
            }
        });
    }

    pub(crate) fn render_config_warning(&self, ui: &mut egui::Ui) {
        egui::Frame::none()
            .fill(self.theme.surface)
            .rounding(6.0)
            .inner_margin(self.theme.spacing_sm)
            .stroke(egui::Stroke::new(1.0, self.theme.warning))
            .show(ui, |ui| {
                ui.label(RichText::new("⚠ Configuration incomplete").strong().color(self.theme.warning));
                for issue in &self.config_issues {
                    ui.label(RichText::new(format!("• {}", issue)).small().color(self.theme.text_secondary));
                }
            });
    }
}
