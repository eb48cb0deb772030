// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Wall-clock budget shared by every loop in a single discovery run.
//!
//! A [`TimeBudget`] captures a deadline when it is created. Every loop that
//! issues RPC calls checks [`TimeBudget::expired`] before starting new work, and
//! every individual call is raced against `min(per_call_timeout, remaining())`.
//! A slow call is simply no longer awaited once its limit passes; a result that
//! arrives later is discarded with the dropped future.
//!
//! The budget uses [`tokio::time::Instant`], so tests running with paused time
//! observe deadlines deterministically.
//!
//! # Examples
//!
//! ```rust
//! use activityscan::{BudgetError, TimeBudget};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let budget = TimeBudget::new(Duration::from_secs(20), Duration::from_secs(4));
//! let value = budget.with_timeout(async { 7 }).await;
//! assert_eq!(value, Ok(7));
//!
//! let expired = TimeBudget::new(Duration::ZERO, Duration::from_secs(4));
//! assert_eq!(expired.with_timeout(async { 7 }).await, Err(BudgetError::Exhausted));
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::errors::BudgetError;

/// Default total budget for one discovery run (20 s).
pub const DEFAULT_TOTAL_BUDGET: Duration = Duration::from_millis(20_000);

/// Default per-call timeout (4 s), so one slow call cannot consume the whole budget.
pub const DEFAULT_PER_CALL_TIMEOUT: Duration = Duration::from_millis(4_000);

/// A deadline plus a per-operation timeout.
#[derive(Debug, Clone, Copy)]
pub struct TimeBudget {
    deadline: Instant,
    per_call: Duration,
}

impl TimeBudget {
    /// Start a budget of `total` from now, racing each call against `per_call`.
    pub fn new(total: Duration, per_call: Duration) -> Self {
        Self {
            deadline: Instant::now() + total,
            per_call,
        }
    }

    /// Start a budget of `total_ms` milliseconds with the default per-call timeout.
    pub fn from_millis(total_ms: u64) -> Self {
        Self::new(Duration::from_millis(total_ms), DEFAULT_PER_CALL_TIMEOUT)
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    /// Whether the deadline has passed. No new operation may start once this is true.
    pub fn expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// The configured per-call timeout.
    pub fn per_call_timeout(&self) -> Duration {
        self.per_call
    }

    /// Race `op` against `min(per_call_timeout, remaining())`.
    pub async fn with_timeout<F>(&self, op: F) -> Result<F::Output, BudgetError>
    where
        F: Future,
    {
        self.with_timeout_of(op, self.per_call).await
    }

    /// Race `op` against `min(per_call, remaining())`.
    ///
    /// Returns [`BudgetError::Exhausted`] without polling `op` when the deadline
    /// has already passed.
    pub async fn with_timeout_of<F>(&self, op: F, per_call: Duration) -> Result<F::Output, BudgetError>
    where
        F: Future,
    {
        let remaining = self.remaining();
        if remaining.is_zero() {
            return Err(BudgetError::Exhausted);
        }

        let limit = per_call.min(remaining);
        tokio::time::timeout(limit, op)
            .await
            .map_err(|_| BudgetError::TimedOut { limit })
    }
}

impl Default for TimeBudget {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_BUDGET, DEFAULT_PER_CALL_TIMEOUT)
    }
}
