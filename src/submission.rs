//! Tip submission: validate, build, hand off, reconcile.

use crate::error::TipJarError;
use crate::gateway::TipTarget;
use crate::types::PendingTip;
use crate::utils;
use crate::view_model::Refresher;
use crate::wallet::{Account, ExecutionReceipt, TransactionExecutor};
use std::sync::Arc;
use std::time::Duration;

/// Longest message the form accepts, in characters.
pub const MAX_MESSAGE_CHARS: usize = 200;

/// Smallest tip accepted, as shown to the user.
pub const MIN_TIP_SUI: &str = "0.0001";

/// `MIN_TIP_SUI` in MIST.
pub const MIN_TIP_MIST: u64 = 100_000;

pub struct SubmissionFlow {
    target: TipTarget,
    executor: Arc<dyn TransactionExecutor>,
    refreshers: Vec<Refresher>,
    refresh_delay: Duration,
}

impl SubmissionFlow {
    pub fn new(target: TipTarget, executor: Arc<dyn TransactionExecutor>, refresh_delay: Duration) -> Self {
        Self {
            target,
            executor,
            refreshers: Vec::new(),
            refresh_delay,
        }
    }

    /// Register a view-model to re-read once after each successful submission.
    pub fn with_refresher(mut self, refresher: Refresher) -> Self {
        self.refreshers.push(refresher);
        self
    }

    /// Check the preconditions in order and return the amount in MIST.
    ///
    /// Amounts are parsed strictly; values that are positive but smaller than
    /// one MIST are rejected rather than sent as a zero tip, and anything under
    /// the minimum tip is refused.
    pub fn validate(account: Option<&Account>, pending: &PendingTip) -> Result<u64, TipJarError> {
        if account.is_none() {
            return Err(TipJarError::NotConnected);
        }
        let mist = match utils::sui_str_to_mist(&pending.amount) {
            Some(mist) if mist > 0 => mist,
            _ => return Err(TipJarError::InvalidAmount),
        };
        if mist < MIN_TIP_MIST {
            return Err(TipJarError::BelowMinimum { min: MIN_TIP_SUI });
        }
        if pending.message.chars().count() > MAX_MESSAGE_CHARS {
            return Err(TipJarError::MessageTooLong { max: MAX_MESSAGE_CHARS });
        }
        if utils::has_sub_mist_precision(&pending.amount) {
            tracing::debug!("Amount '{}' truncated to {} MIST", pending.amount.trim(), mist);
        }
        Ok(mist)
    }

    /// Submit one tip. On success every registered view-model re-reads once
    /// after the refresh delay.
    pub async fn submit(
        &self,
        account: Option<&Account>,
        pending: &PendingTip,
    ) -> Result<ExecutionReceipt, TipJarError> {
        let mist = Self::validate(account, pending)?;
        let sender = account.ok_or(TipJarError::NotConnected)?;

        let tx = self.target.build_tip_transaction(&pending.amount, &pending.message);
        tracing::info!(
            "Submitting tip of {} SUI from {}",
            utils::format_sui(mist),
            sender.short_address()
        );

        match self.executor.sign_and_execute(sender, &tx).await {
            Ok(receipt) => {
                tracing::info!("Tip sent: {}", receipt.reference);
                for refresher in &self.refreshers {
                    refresher.refresh_after(self.refresh_delay);
                }
                Ok(receipt)
            }
            Err(e) => {
                tracing::error!("Error sending tip: {}", e);
                Err(TipJarError::SubmissionFailed(e.message))
            }
        }
    }
}
