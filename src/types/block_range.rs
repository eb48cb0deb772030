// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Inclusive block ranges

use alloy_primitives::BlockNumber;
use serde::{Deserialize, Serialize};

use crate::errors::EventProcessingError;

/// An inclusive `[from, to]` block range with `from <= to`.
///
/// # Examples
///
/// ```
/// use activityscan::BlockRange;
///
/// let range = BlockRange::new(100, 199).unwrap();
/// assert_eq!(range.block_count(), 100);
/// assert!(BlockRange::new(200, 100).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRange {
    from: BlockNumber,
    to: BlockNumber,
}

impl BlockRange {
    /// Create a range, rejecting `from > to`.
    pub fn new(from: BlockNumber, to: BlockNumber) -> Result<Self, EventProcessingError> {
        if from > to {
            return Err(EventProcessingError::invalid_input(format!(
                "block range start {from} is after end {to}"
            )));
        }
        Ok(Self { from, to })
    }

    /// The span of `span` blocks ending at `head`, clamped to `floor`.
    ///
    /// A zero span is treated as a single block.
    pub fn ending_at(head: BlockNumber, span: u64, floor: BlockNumber) -> Self {
        let from = head.saturating_sub(span.saturating_sub(1)).max(floor);
        Self {
            from: from.min(head),
            to: head,
        }
    }

    /// First block (inclusive)
    pub const fn from(&self) -> BlockNumber {
        self.from
    }

    /// Last block (inclusive)
    pub const fn to(&self) -> BlockNumber {
        self.to
    }

    /// Number of blocks in the range
    pub const fn block_count(&self) -> u64 {
        self.to - self.from + 1
    }

    /// Whether `block` lies inside the range
    pub const fn contains(&self, block: BlockNumber) -> bool {
        block >= self.from && block <= self.to
    }
}

impl std::fmt::Display for BlockRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}
