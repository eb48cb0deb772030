//! Error types for the activityscan library.
//!
//! This module provides strongly-typed errors for all public APIs in activityscan.
//! It follows a hybrid approach:
//!
//! - **Module-specific errors** for fine-grained error handling (`BudgetError`,
//!   `EventProcessingError`, `ConfigError`)
//! - **Unified error type** (`ScanError`) for convenience when you don't need
//!   to distinguish between error sources
//!
//! Additionally, [`RpcError`] provides shared error variants for blockchain RPC operations.
//!
//! The two entry points, [`ActivityAggregator::get_recent_activity`] and
//! [`DonationHistoryAssembler::get_donation_history`], do not return errors for
//! expected conditions. Transient RPC failures shrink the work, decode failures
//! drop single entries, and budget exhaustion ends the run with a partial
//! result flagged in the diagnostics.
//!
//! [`ActivityAggregator::get_recent_activity`]: crate::ActivityAggregator::get_recent_activity
//! [`DonationHistoryAssembler::get_donation_history`]: crate::DonationHistoryAssembler::get_donation_history
//!
//! # Examples
//!
//! ```rust,ignore
//! use activityscan::{ScanError, DeploymentConfig};
//!
//! fn load(json: &str) -> Result<DeploymentConfig, ScanError> {
//!     // ConfigError converts to ScanError via From
//!     Ok(DeploymentConfig::from_json_str(json)?)
//! }
//! ```

mod budget;
mod config;
mod events;
mod rpc;

pub use budget::BudgetError;
pub use config::ConfigError;
pub use events::EventProcessingError;
pub use rpc::RpcError;

/// Unified error type for all activityscan operations.
///
/// All module-specific error types automatically convert to `ScanError` via
/// `From` implementations, so you can use `?` to propagate errors naturally.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Error from a blockchain RPC call.
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// Budget exhaustion or per-call timeout.
    #[error("Budget error: {0}")]
    Budget(#[from] BudgetError),

    /// Error from event processing operations.
    #[error("Event processing error: {0}")]
    Events(#[from] EventProcessingError),

    /// Error from configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
