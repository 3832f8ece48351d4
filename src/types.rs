//! Records read from the tip ledger object and the transient form input.

use crate::utils;

/// Maximum number of tips shown in the history list.
pub const HISTORY_LIMIT: usize = 10;

/// Aggregate totals of the shared tip ledger at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipLedgerSnapshot {
    /// Sum of all tips, in MIST
    pub total_tips_received: u64,
    pub total_tippers: u64,
    pub tip_count: u64,
    pub creator: String,
}

impl TipLedgerSnapshot {
    pub fn total_tips_display(&self) -> String {
        format!("{} SUI", utils::format_sui(self.total_tips_received))
    }
}

/// One tip entry of the ledger's tip sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tip {
    pub sender: String,
    /// Amount in MIST
    pub amount: u64,
    pub message: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}

impl Tip {
    pub fn amount_display(&self) -> String {
        format!("{} SUI", utils::format_sui(self.amount))
    }

    pub fn sender_display(&self) -> String {
        utils::short_address(&self.sender)
    }

    pub fn time_display(&self) -> String {
        utils::format_timestamp_ms(self.timestamp)
    }
}

/// Tip form input waiting to be validated and submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingTip {
    /// Decimal SUI amount as typed
    pub amount: String,
    pub message: String,
}

impl PendingTip {
    pub fn new(amount: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            message: message.into(),
        }
    }

    pub fn clear(&mut self) {
        self.amount.clear();
        self.message.clear();
    }
}
