//! Span creation helpers for activityscan operations.
//!
//! Telemetry is kept apart from business logic: instead of `#[instrument]`
//! attributes, each instrumented operation has a span helper here. Async
//! operations attach the span with [`tracing::Instrument`] so it stays current
//! across `.await` points.
//!
//! Usage pattern:
//! ```rust,ignore
//! pub async fn my_operation(&self, param: Type) -> Output {
//!     let span = spans::my_operation(param_value);
//!     async move {
//!         // Business logic here
//!     }
//!     .instrument(span)
//!     .await
//! }
//! ```

use alloy_chains::NamedChain;
use alloy_primitives::{Address, BlockNumber};
use tracing::Span;

use crate::types::candidate::CandidateAddress;

/// Create span for a whole recent-activity request.
///
/// Parent: None (root span for this operation)
/// Children: resolve_candidates, scan_candidate, backfill_timestamps
#[inline]
pub(crate) fn get_recent_activity(chain: NamedChain, has_override: bool) -> Span {
    tracing::info_span!(
        "activityscan.get_recent_activity",
        chain = %chain,
        has_override = has_override,
    )
}

/// Create span for resolving candidate addresses.
///
/// Parent: get_recent_activity span
/// Children: factory `getPair` reads
#[inline]
pub(crate) fn resolve_candidates(chain: NamedChain) -> Span {
    tracing::debug_span!("activityscan.resolve_candidates", chain = %chain)
}

/// Create span for scanning one candidate over one span of the ladder.
///
/// Parent: get_recent_activity span
/// Children: scan_window spans (one per attempted window)
#[inline]
pub(crate) fn scan_candidate(candidate: &CandidateAddress, span_blocks: u64, fallback: bool) -> Span {
    tracing::info_span!(
        "activityscan.scan_candidate",
        candidate = %candidate.address,
        source = candidate.source.name(),
        span_blocks = span_blocks,
        fallback = fallback,
    )
}

/// Create span for one backward scan over a block range.
///
/// Parent: scan_candidate span
/// Children: None (individual log queries)
#[inline]
pub(crate) fn range_scan(address: Address, floor: BlockNumber, head: BlockNumber) -> Span {
    tracing::debug_span!(
        "activityscan.range_scan",
        address = %address,
        floor = floor,
        head = head,
    )
}

/// Create span for back-filling block timestamps.
///
/// Parent: get_recent_activity span
#[inline]
pub(crate) fn backfill_timestamps(blocks: usize) -> Span {
    tracing::debug_span!("activityscan.backfill_timestamps", blocks = blocks)
}

/// Create span for a whole donation-history request.
///
/// Parent: None (root span for this operation)
/// Children: probe_max_id, read_range
#[inline]
pub(crate) fn get_donation_history(chain: NamedChain, ledger: Address) -> Span {
    tracing::info_span!(
        "activityscan.get_donation_history",
        chain = %chain,
        ledger = %ledger,
    )
}

/// Create span for the highest-id probe of a sparse mapping.
///
/// Parent: get_donation_history span
#[inline]
pub(crate) fn probe_max_id(cap: u64) -> Span {
    tracing::debug_span!("activityscan.probe_max_id", cap = cap)
}

/// Create span for reading an id range in batches.
///
/// Parent: get_donation_history span
#[inline]
pub(crate) fn read_range(first_id: u64, last_id: u64, batch_size: u64) -> Span {
    tracing::debug_span!(
        "activityscan.read_range",
        first_id = first_id,
        last_id = last_id,
        batch_size = batch_size,
    )
}
