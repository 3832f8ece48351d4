//! GUI module for the tip jar
//!
//! A single eframe window rendering state owned by the polling view-models
//! and the submission flow.
//!
//! ## Module Structure
//!
//! - `app` - GuiApp struct, job polling and `launch`
//! - `async_job` - One-shot background jobs polled from the frame loop
//! - `theme` - Colors, spacing and styled widgets (AppTheme)
//! - `notifications` - Toasts and notification history
//! - `views` - Rendering for the header, stats, form and history
//!
//! ## Usage
//!
//! ```no_run
//! use tipjar::config::Config;
//! use tipjar::gui;
//!
//! let config = Config::from_env();
//! gui::launch(config).expect("Failed to launch GUI");
//! ```

mod app;
pub mod async_job;
pub mod notifications;
pub mod theme;
pub mod views;

pub use app::{launch, GuiApp};
pub use async_job::AsyncJob;
pub use notifications::{NotificationEntry, NotificationKind, Notifications};
pub use theme::{configure_style, AppTheme};
