//! Error kinds surfaced by the gateway, the view-models and the submission flow.

use thiserror::Error;

/// Generic fallback shown when the signer gives no reason for a failure.
pub const GENERIC_SUBMIT_FAILURE: &str = "Failed to send tip";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TipJarError {
    /// The ledger object response had no field-bearing content body
    /// (object missing, deleted, or of an unexpected type).
    #[error("Invalid object data")]
    InvalidObjectData,

    #[error("Please connect your wallet first")]
    NotConnected,

    #[error("Please enter a valid amount")]
    InvalidAmount,

    #[error("Minimum tip is {min} SUI")]
    BelowMinimum { min: &'static str },

    #[error("Message is longer than {max} characters")]
    MessageTooLong { max: usize },

    #[error("{}", .0.as_deref().unwrap_or(GENERIC_SUBMIT_FAILURE))]
    SubmissionFailed(Option<String>),

    #[error("RPC request failed: {0}")]
    Rpc(String),

    #[error("configuration error: {0}")]
    Config(String),
}
