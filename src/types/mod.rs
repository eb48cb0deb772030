// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Strong types for type safety across activityscan.
//!
//! This module provides the data model shared by the scanner, decoder, prober
//! and assemblers:
//! - Block ranges and raw log entries
//! - Candidate addresses with provenance
//! - Activity and donation records
//! - Token amounts and decimals

pub mod activity;
pub mod block_range;
pub mod candidate;
pub mod donation;
pub mod log;
pub mod tokens;

// Note: Public types are re-exported from lib.rs, not here
