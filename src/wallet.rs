//! Connected-account session and the signer/executor seam.
//!
//! Signing is not done here. A [`TransactionExecutor`] receives the unsigned
//! descriptor and is responsible for signing and broadcasting it.

use crate::config::{normalize_sui_id, Network};
use crate::transaction::TipTransaction;
use crate::utils;
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: String,
}

impl Account {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    pub fn short_address(&self) -> String {
        utils::short_address(&self.address)
    }
}

/// Accounts exposed by the wallet and the one currently selected.
#[derive(Debug, Clone, Default)]
pub struct WalletSession {
    accounts: Vec<Account>,
    current: Option<usize>,
}

impl WalletSession {
    /// Session offering the given addresses; invalid ones are skipped.
    pub fn from_addresses(addresses: &[String]) -> Self {
        let accounts = addresses
            .iter()
            .filter_map(|a| match normalize_sui_id(a) {
                Some(normalized) => Some(Account::new(normalized)),
                None => {
                    tracing::warn!("Ignoring invalid account address '{}'", a);
                    None
                }
            })
            .collect();
        Self {
            accounts,
            current: None,
        }
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn has_accounts(&self) -> bool {
        !self.accounts.is_empty()
    }

    /// Select the first available account. Returns false when there is none.
    pub fn connect(&mut self) -> bool {
        if self.accounts.is_empty() {
            return false;
        }
        self.current = Some(0);
        true
    }

    pub fn switch_account(&mut self, address: &str) -> bool {
        match self.accounts.iter().position(|a| a.address == address) {
            Some(idx) => {
                self.current = Some(idx);
                true
            }
            None => false,
        }
    }

    pub fn disconnect(&mut self) {
        self.current = None;
    }

    pub fn current_account(&self) -> Option<&Account> {
        self.current.and_then(|idx| self.accounts.get(idx))
    }

    pub fn is_connected(&self) -> bool {
        self.current_account().is_some()
    }
}

/// What the executor reports back on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReceipt {
    /// Transaction digest, or where the request was handed off
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .message.as_deref().unwrap_or("executor failed"))]
pub struct ExecutorError {
    pub message: Option<String>,
}

impl ExecutorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    pub fn silent() -> Self {
        Self { message: None }
    }
}

#[async_trait]
pub trait TransactionExecutor: Send + Sync {
    async fn sign_and_execute(
        &self,
        sender: &Account,
        tx: &TipTransaction,
    ) -> Result<ExecutionReceipt, ExecutorError>;
}

#[derive(Serialize)]
struct HandoffRequest<'a> {
    sender: &'a str,
    network: &'a str,
    created_at: String,
    transaction: &'a TipTransaction,
}

/// Executor that writes each unsigned request as JSON into a directory watched
/// by an external signer.
pub struct FileHandoffExecutor {
    directory: PathBuf,
    network: Network,
}

impl FileHandoffExecutor {
    pub fn new(directory: impl Into<PathBuf>, network: Network) -> Self {
        Self {
            directory: directory.into(),
            network,
        }
    }
}

#[async_trait]
impl TransactionExecutor for FileHandoffExecutor {
    async fn sign_and_execute(
        &self,
        sender: &Account,
        tx: &TipTransaction,
    ) -> Result<ExecutionReceipt, ExecutorError> {
        let now = chrono::Utc::now();
        let request = HandoffRequest {
            sender: &sender.address,
            network: self.network.as_str(),
            created_at: now.to_rfc3339(),
            transaction: tx,
        };
        let body = serde_json::to_string_pretty(&request)
            .map_err(|e| ExecutorError::new(format!("Failed to encode transaction: {}", e)))?;

        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| ExecutorError::new(format!("Cannot create {}: {}", self.directory.display(), e)))?;

        let path = self
            .directory
            .join(format!("tip-{}.json", now.format("%Y%m%dT%H%M%S%.3fZ")));
        tokio::fs::write(&path, body)
            .await
            .map_err(|e| ExecutorError::new(format!("Cannot write {}: {}", path.display(), e)))?;

        tracing::info!("Handed tip request to signer at {}", path.display());
        Ok(ExecutionReceipt {
            reference: path.display().to_string(),
        })
    }
}
