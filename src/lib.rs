//! TipJar: desktop client for a Sui "buy me a coffee" contract.
//!
//! Reads aggregate totals and recent tips from the shared ledger object,
//! keeps them fresh with polling view-models, and builds tip transactions
//! that an external signer executes.

pub mod config;
pub mod error;
pub mod gateway;
pub mod gui;
pub mod submission;
pub mod transaction;
pub mod types;
pub mod utils;
pub mod view_model;
pub mod wallet;

pub use error::TipJarError;
