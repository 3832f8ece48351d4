//! Main GUI application module
//!
//! Owns the tokio runtime, both polling view-models, the submission flow and
//! the wallet session. Everything the frame loop renders is read from them.

use crate::{
    config::Config,
    error::TipJarError,
    gateway::ChainGateway,
    submission::SubmissionFlow,
    types::PendingTip,
    view_model::{ChangeListener, HistorySource, PollingViewModel, SnapshotSource},
    wallet::{ExecutionReceipt, FileHandoffExecutor, TransactionExecutor, WalletSession},
};
use anyhow::{anyhow, Result};
use eframe::{egui, egui::RichText, App, Frame, NativeOptions};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

use super::async_job::AsyncJob;
use super::notifications::{NotificationEntry, Notifications};
use super::theme::{configure_style, AppTheme};

pub struct GuiApp {
    pub(crate) config: Config,
    pub(crate) theme: AppTheme,
    pub(crate) stats: PollingViewModel<SnapshotSource>,
    pub(crate) history: PollingViewModel<HistorySource>,
    pub(crate) flow: Arc<SubmissionFlow>,
    pub(crate) wallet: WalletSession,
    pub(crate) form: PendingTip,
    pub(crate) submit_job: Option<AsyncJob<ExecutionReceipt>>,
    pub(crate) last_receipt: Option<ExecutionReceipt>,
    pub(crate) notifications: Notifications,
    pub(crate) show_notifications_popup: bool,
    pub(crate) config_issues: Vec<String>,
    // Declared last: view-models above abort their tasks on drop and need the runtime alive.
    runtime: Runtime,
}

impl GuiApp {
    fn new(
        config: Config,
        ctx: &egui::Context,
        runtime: Runtime,
        gateway: Arc<ChainGateway>,
        executor: Arc<dyn TransactionExecutor>,
    ) -> Self {
        let theme = AppTheme::default();
        configure_style(ctx, &theme);

        let repaint_ctx = ctx.clone();
        let listener: ChangeListener = Arc::new(move || repaint_ctx.request_repaint());

        let stats = PollingViewModel::mount(
            SnapshotSource(gateway.clone()),
            config.poll_interval,
            runtime.handle().clone(),
            Some(listener.clone()),
        );
        let history = PollingViewModel::mount(
            HistorySource(gateway.clone()),
            config.poll_interval,
            runtime.handle().clone(),
            Some(listener),
        );

        let flow = SubmissionFlow::new(gateway.target().clone(), executor, config.refresh_delay)
            .with_refresher(stats.refresher())
            .with_refresher(history.refresher());

        let wallet = WalletSession::from_addresses(&config.accounts);
        let config_issues = config.validate();

        Self {
            config,
            theme,
            stats,
            history,
            flow: Arc::new(flow),
            wallet,
            form: PendingTip::default(),
            submit_job: None,
            last_receipt: None,
            notifications: Notifications::default(),
            show_notifications_popup: false,
            config_issues,
            runtime,
        }
    }

    pub(crate) fn is_sending(&self) -> bool {
        self.submit_job.as_ref().map(|j| j.is_running()).unwrap_or(false)
    }

    /// Start a submission job for the current form contents.
    pub(crate) fn submit_tip(&mut self) {
        if self.is_sending() {
            return;
        }
        let flow = Arc::clone(&self.flow);
        let account = self.wallet.current_account().cloned();
        let pending = self.form.clone();
        self.submit_job = Some(AsyncJob::spawn(self.runtime.handle(), async move {
            flow.submit(account.as_ref(), &pending).await
        }));
    }

    fn poll_jobs(&mut self) {
        let Some(job) = self.submit_job.as_mut() else {
            return;
        };
        let Some(result) = job.poll() else {
            return;
        };
        self.submit_job = None;
        if let Some(receipt) = finish_submission(result, &mut self.form, &mut self.notifications) {
            self.last_receipt = Some(receipt);
        }
    }

    pub(crate) fn open_link(&mut self, url: &str) {
        if let Err(e) = open::that(url) {
            tracing::warn!("Failed to open {}: {}", url, e);
            self.notifications
                .push(NotificationEntry::error(format!("Failed to open URL: {}", e)));
        }
    }

    fn render_notification_overlay(&mut self, ctx: &egui::Context) {
        let count = self.notifications.len();
        let toast = self.notifications.active_toast().cloned();

        egui::Area::new(egui::Id::new("notification_overlay"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -12.0])
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                let stroke_color = toast
                    .as_ref()
                    .map(|t| self.theme.notification_color(t.kind))
                    .unwrap_or(self.theme.secondary);
                egui::Frame::none()
                    .fill(self.theme.surface)
                    .rounding(6.0)
                    .stroke(egui::Stroke::new(1.0, stroke_color))
                    .inner_margin(egui::Margin::symmetric(10.0, 6.0))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            let bell = egui::Button::new(RichText::new("🔔").size(14.0))
                                .fill(egui::Color32::TRANSPARENT)
                                .stroke(egui::Stroke::NONE);
                            if ui.add(bell).on_hover_text("Notification history").clicked() {
                                self.show_notifications_popup = !self.show_notifications_popup;
                            }

                            match &toast {
                                Some(entry) => {
                                    ui.label(
                                        RichText::new(&entry.message)
                                            .color(self.theme.notification_color(entry.kind)),
                                    );
                                    if ui.small_button("✕").clicked() {
                                        self.notifications.dismiss_toast();
                                    }
                                }
                                None if count > 0 => {
                                    ui.label(
                                        RichText::new(count.to_string())
                                            .size(11.0)
                                            .color(self.theme.text_secondary),
                                    );
                                }
                                None => {}
                            }
                        });
                    });
            });

        if !self.show_notifications_popup {
            return;
        }
        let mut open = true;
        egui::Window::new("Notifications")
            .open(&mut open)
            .collapsible(false)
            .resizable(true)
            .default_width(380.0)
            .anchor(egui::Align2::RIGHT_BOTTOM, [-12.0, -52.0])
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().max_height(280.0).show(ui, |ui| {
                    if self.notifications.is_empty() {
                        ui.label(RichText::new("No notifications yet.").color(self.theme.text_secondary));
                    }
                    for entry in self.notifications.entries().rev() {
                        ui.horizontal(|ui| {
                            ui.label(
                                RichText::new(format!("[{}]", entry.time_ago()))
                                    .size(11.0)
                                    .color(self.theme.text_secondary),
                            );
                            ui.label(RichText::new(&entry.message).color(self.theme.notification_color(entry.kind)));
                        });
                    }
                });
            });
        self.show_notifications_popup = open;
    }
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_jobs();

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(self.theme.spacing_sm);
            self.render_wallet_header(ui);
            ui.add_space(self.theme.spacing_sm);
        });

        self.render_notification_overlay(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.set_max_width(720.0);
                if !self.config_issues.is_empty() {
                    self.render_config_warning(ui);
                    ui.add_space(self.theme.spacing_md);
                }
                self.view_stats(ui);
                ui.add_space(self.theme.spacing_lg);
                self.view_tip_form(ui);
                ui.add_space(self.theme.spacing_lg);
                self.view_history(ui);
            });
        });

        // keeps toast expiry and relative times moving
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

/// Report a finished submission. The form is cleared only on success, so a
/// failed tip can be retried without retyping it.
pub(crate) fn finish_submission(
    result: Result<ExecutionReceipt, TipJarError>,
    form: &mut PendingTip,
    notifications: &mut Notifications,
) -> Option<ExecutionReceipt> {
    notifications.push(NotificationEntry::from_submission(&result));
    match result {
        Ok(receipt) => {
            form.clear();
            Some(receipt)
        }
        Err(_) => None,
    }
}

/// Build the runtime and gateway, then run the native window until it closes.
pub fn launch(config: Config) -> Result<()> {
    let runtime = Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("tipjar-worker")
        .enable_all()
        .build()
        .map_err(|e| anyhow!("Failed to create async runtime: {}", e))?;

    let gateway = Arc::new(ChainGateway::connect(&config)?);
    let executor: Arc<dyn TransactionExecutor> =
        Arc::new(FileHandoffExecutor::new(config.export_directory.clone(), config.network));
    tracing::info!("Tip requests will be handed off in {}", config.export_directory.display());

    let app_creator = move |cc: &eframe::CreationContext<'_>| {
        Box::new(GuiApp::new(config, &cc.egui_ctx, runtime, gateway, executor)) as Box<dyn App>
    };

    let viewport = egui::ViewportBuilder::default()
        .with_inner_size([760.0, 820.0])
        .with_min_inner_size([480.0, 560.0]);

    let native_options = NativeOptions {
        viewport,
        persist_window: true,
        ..Default::default()
    };

    eframe::run_native("Buy Me a Coffee", native_options, Box::new(app_creator))
        .map_err(|e| anyhow!("Failed to start GUI: {}", e))
}
