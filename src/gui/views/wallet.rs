//! Top bar: title, network badge and the wallet connect/switch/disconnect controls.

use crate::config::get_account_explorer_url;
use crate::gui::app::GuiApp;
use crate::gui::notifications::NotificationEntry;
use eframe::egui::{self, RichText};

impl GuiApp {
    pub(crate) fn render_wallet_header(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            ui.heading(RichText::new("☕ Buy Me a Coffee").color(self.theme.accent_cream).strong());
            ui.label(
                RichText::new(format!("v{}", env!("CARGO_PKG_VERSION")))
                    .size(11.0)
                    .color(self.theme.text_secondary),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(
                    RichText::new(self.config.network_label())
                        .size(12.0)
                        .color(self.theme.primary),
                );
                ui.separator();

                if self.wallet.is_connected() {
                    self.render_connected_controls(ui);
                } else {
                    let connect = ui.add_enabled(
                        self.wallet.has_accounts(),
                        self.theme.button_primary("Connect Wallet"),
                    );
                    let connect = if self.wallet.has_accounts() {
                        connect
                    } else {
                        connect.on_disabled_hover_text("No accounts configured (TIPJAR_ACCOUNTS)")
                    };
                    if connect.clicked() && self.wallet.connect() {
                        if let Some(account) = self.wallet.current_account() {
                            tracing::info!("Connected {}", account.address);
                            let message = format!("Connected {}", account.short_address());
                            self.notifications.push(NotificationEntry::info(message));
                        }
                    }
                }
            });
        });
    }

    fn render_connected_controls(&mut self, ui: &mut egui::Ui) {
        if ui.add(self.theme.button_secondary("Disconnect")).clicked() {
            self.wallet.disconnect();
            self.notifications.push(NotificationEntry::info("Wallet disconnected"));
            return;
        }

        let Some(current) = self.wallet.current_account().cloned() else {
            return;
        };

        if ui
            .small_button("↗")
            .on_hover_text("View account in explorer")
            .clicked()
        {
            let url = get_account_explorer_url(self.config.network, &current.address);
            self.open_link(&url);
        }

        let mut selected = current.address.clone();
        egui::ComboBox::from_id_source("account_selector")
            .selected_text(current.short_address())
            .width(160.0)
            .show_ui(ui, |ui| {
                for account in self.wallet.accounts() {
                    ui.selectable_value(&mut selected, account.address.clone(), account.short_address());
                }
            });
        if selected != current.address && self.wallet.switch_account(&selected) {
            tracing::info!("Switched account to {}", selected);
        }
    }
}
