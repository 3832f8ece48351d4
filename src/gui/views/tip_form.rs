//! Tip form view
//!
//! Amount and message inputs with the send button. The message box is capped
//! at the submission limit and shows a live character counter.

use crate::gui::app::GuiApp;
use crate::submission::{MAX_MESSAGE_CHARS, MIN_TIP_SUI};
use eframe::egui::{self, RichText};

impl GuiApp {
    pub(crate) fn view_tip_form(&mut self, ui: &mut egui::Ui) {
        let sending = self.is_sending();

        self.theme.frame_panel().show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(RichText::new("Buy me a coffee").size(18.0).strong());
            ui.add_space(self.theme.spacing_sm);

            ui.label(RichText::new("Amount (SUI)").color(self.theme.text_secondary));
            ui.horizontal(|ui| {
                ui.add_enabled(
                    !sending,
                    egui::TextEdit::singleline(&mut self.form.amount)
                        .hint_text("0.1")
                        .desired_width(160.0),
                );
                ui.label(
                    RichText::new(format!("Minimum: {} SUI", MIN_TIP_SUI))
                        .small()
                        .color(self.theme.text_secondary),
                );
            });

            ui.add_space(self.theme.spacing_sm);
            ui.label(RichText::new("Message (optional)").color(self.theme.text_secondary));
            ui.add_enabled(
                !sending,
                egui::TextEdit::multiline(&mut self.form.message)
                    .hint_text("Say something nice...")
                    .char_limit(MAX_MESSAGE_CHARS)
                    .desired_rows(3)
                    .desired_width(f32::INFINITY),
            );
            ui.label(
                RichText::new(format!("{}/{}", self.form.message.chars().count(), MAX_MESSAGE_CHARS))
                    .small()
                    .color(self.theme.text_secondary),
            );

            ui.add_space(self.theme.spacing_sm);
            ui.horizontal(|ui| {
                let can_send = !sending && !self.form.amount.trim().is_empty();
                let label = if sending { "Sending..." } else { "Send Tip ☕" };
                if ui.add_enabled(can_send, self.theme.button_primary(label)).clicked() {
                    self.submit_tip();
                }
                if sending {
                    ui.spinner();
                }
            });

            ui.add_space(self.theme.spacing_xs);
            match self.wallet.current_account() {
                Some(account) => {
                    ui.label(
                        RichText::new(format!("From: {}", account.short_address()))
                            .small()
                            .color(self.theme.text_secondary),
                    );
                }
                None => {
                    ui.label(
                        RichText::new("Connect your wallet to send a tip")
                            .small()
                            .color(self.theme.warning),
                    );
                }
            }

            if let Some(receipt) = self.last_receipt.clone() {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(format!("Last request: {}", receipt.reference))
                            .small()
                            .color(self.theme.text_secondary),
                    );
                    if ui.small_button("Open folder").clicked() {
                        let dir = self.config.export_directory.display().to_string();
                        self.open_link(&dir);
                    }
                });
            }
        });
    }
}
