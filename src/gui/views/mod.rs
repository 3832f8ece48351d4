//! View modules for the GUI
//!
//! Each submodule adds rendering methods to `GuiApp` for one area of the
//! window. They are called from `App::update` in `app.rs`.
//!
//! - `wallet` - Title bar with network badge and wallet controls
//! - `stats` - Aggregate ledger totals and the configuration warning
//! - `tip_form` - Amount/message form and the send button
//! - `history` - Recent tips list

pub mod history;
pub mod stats;
pub mod tip_form;
pub mod wallet;
