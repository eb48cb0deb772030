// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Error types for event processing.
//!
//! This module provides error types for operations in the `events` module,
//! particularly for classifying and decoding pair Swap/Mint/Burn logs.

use alloy_primitives::B256;

/// Errors that can occur during event processing.
///
/// Decode errors are per-entry: the decoder drops the malformed entry, logs a
/// warning, and keeps processing the rest of the batch.
///
/// # Examples
///
/// ```rust
/// use activityscan::EventProcessingError;
///
/// let err = EventProcessingError::decode_failed("data too short for Swap");
/// assert_eq!(err.to_string(), "Failed to decode event: data too short for Swap");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum EventProcessingError {
    /// Failed to decode an event from log data.
    ///
    /// This occurs when a log entry carries a known topic-0 but its remaining
    /// topics or data do not match the event's schema.
    #[error("Failed to decode event: {details}")]
    DecodeFailed {
        /// Details about why the decode failed
        details: String,
    },

    /// The log's topic-0 is not one of the known pair events.
    #[error("Unknown event topic: {topic}")]
    UnknownTopic {
        /// The unrecognized topic-0, or zero for anonymous logs
        topic: B256,
    },

    /// Invalid input provided to an operation.
    ///
    /// This occurs when function arguments don't meet requirements,
    /// such as an inverted block range.
    #[error("Invalid input: {details}")]
    InvalidInput {
        /// Details about what was invalid
        details: String,
    },
}

impl EventProcessingError {
    /// Create a `DecodeFailed` error with details.
    pub fn decode_failed(details: impl Into<String>) -> Self {
        EventProcessingError::DecodeFailed {
            details: details.into(),
        }
    }

    /// Create an `InvalidInput` error with details.
    pub fn invalid_input(details: impl Into<String>) -> Self {
        EventProcessingError::InvalidInput {
            details: details.into(),
        }
    }
}
