// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for wall-clock budget enforcement.

use std::time::Duration;

/// Why a budget-guarded operation did not produce a value.
///
/// Neither variant is a hard failure for callers: exhaustion ends the current
/// loop, a timeout is handled like any other transient RPC failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BudgetError {
    /// The overall deadline had already passed, so the operation was not started.
    #[error("Time budget exhausted")]
    Exhausted,

    /// The operation did not finish within its per-call limit.
    ///
    /// The limit is the smaller of the per-call timeout and the budget remaining
    /// when the call started.
    #[error("Operation timed out after {}ms", limit.as_millis())]
    TimedOut {
        /// Effective limit that was applied
        limit: Duration,
    },
}
