// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Donation history reconstruction from an event-less, id-addressed mapping
//!
//! The ledger emits no events and exposes no count, so its history is rebuilt
//! in two steps:
//!
//! 1. [`RecordProber`] finds the highest populated id with an
//!    exponential-then-binary search
//! 2. [`BatchReader`] reads ids `1..=max` through multicall in fixed-size chunks
//!
//! [`DonationHistoryAssembler`] runs both under one [`TimeBudget`](crate::TimeBudget)
//! and enriches the receipts with token decimals and symbols.
//!
//! # Examples
//!
//! ```rust,ignore
//! use activityscan::{DonationHistoryAssembler, ScanConfig};
//!
//! let assembler = DonationHistoryAssembler::new(reader, deployment, ScanConfig::default());
//! let history = assembler.get_donation_history(ledger).await;
//! for receipt in &history.records {
//!     println!("#{} {} {}", receipt.id, receipt.amount, receipt.symbol);
//! }
//! ```

pub mod assembler;
pub mod ledger;
pub mod prober;
pub mod reader;

pub use assembler::{DonationHistory, DonationHistoryAssembler};
pub use ledger::DonationLedger;
pub use prober::{Probe, ProbeBounds, ProbeOutcome, RecordProber};
pub use reader::{BatchOutcome, BatchReader, SparseMapping};
