// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Pair activity discovery: event definitions, backward range scanning and decoding
//!
//! - [`definitions`]: `sol!` event types and [`EventSchema`](definitions::EventSchema)
//! - [`scanner`]: [`RangeScanner`](scanner::RangeScanner), the budget-bounded backward scan
//! - [`decoder`]: [`EventDecoder`](decoder::EventDecoder), topic-0 classification and decoding

pub mod decoder;
pub mod definitions;
pub mod scanner;
