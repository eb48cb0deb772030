// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Highest-id discovery for sparse, id-addressed mappings
//!
//! A public mapping without events or an enumerable index can only be explored
//! by asking "does id `n` exist?". [`RecordProber`] answers "what is the highest
//! populated id?" with an exponential phase (`1, 2, 4, 8, ...`) followed by a
//! binary search between the last id known to exist and the first known to be
//! absent.
//!
//! Existence reads are three-valued ([`Probe`]). An inconclusive read is
//! retried, and only treated as absent once the retries are used up. After the
//! boundary is found, a few ids past it are probed as well so that a short gap
//! in the mapping (ids `{1, 2, 3, 5}`) does not hide the records after it.
//!
//! ```rust
//! use activityscan::{Probe, RecordProber, TimeBudget};
//!
//! # tokio_test_block_on(async {
//! let prober = RecordProber::new(1 << 20, 2);
//! let outcome = prober
//!     .find_max_existing_id(|id| async move {
//!         if id <= 37 { Probe::Exists } else { Probe::Absent }
//!     }, &TimeBudget::default())
//!     .await;
//! assert_eq!(outcome.max_id, 37);
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(f)
//! # }
//! ```

use std::future::Future;

use tracing::{debug, warn, Instrument};

use crate::budget::TimeBudget;
use crate::config::constants::mapping::{PROBE_CAP, PROBE_GAP_TOLERANCE, PROBE_RETRIES};
use crate::config::ScanConfig;
use crate::errors::BudgetError;
use crate::tracing::spans;

/// Answer of one existence read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// The id is populated
    Exists,
    /// The id is empty
    Absent,
    /// The read failed, so existence is not known
    Unknown,
}

/// Search interval: `lo` is known to exist (or is 0), `hi` is known absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeBounds {
    /// Highest id known to exist, 0 if none
    pub lo: u64,
    /// Lowest id known to be absent above `lo`
    pub hi: u64,
}

/// Result of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// Highest id found to exist, 0 for an empty mapping
    pub max_id: u64,
    /// Existence reads issued, retries included
    pub calls: u64,
    /// Ids whose reads stayed inconclusive and were treated as absent
    pub unresolved: u64,
    /// Whether the budget ran out before the search converged
    pub truncated: bool,
}

/// The budget ran out mid-search.
struct Truncated;

/// Exponential-then-binary search for the highest populated id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordProber {
    cap: u64,
    retries: u32,
    gap_tolerance: u64,
}

impl Default for RecordProber {
    fn default() -> Self {
        Self {
            cap: PROBE_CAP,
            retries: PROBE_RETRIES,
            gap_tolerance: PROBE_GAP_TOLERANCE,
        }
    }
}

impl RecordProber {
    /// Prober reaching at most `cap`, retrying inconclusive reads `retries` times
    pub fn new(cap: u64, retries: u32) -> Self {
        Self {
            cap: cap.max(1),
            retries,
            gap_tolerance: PROBE_GAP_TOLERANCE,
        }
    }

    /// Prober using the configured cap, retries and gap tolerance
    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.probe_cap, config.probe_retries).with_gap_tolerance(config.probe_gap_tolerance)
    }

    /// Absent ids past a boundary that are still probed (0 disables the lookahead)
    pub fn with_gap_tolerance(mut self, ids: u64) -> Self {
        self.gap_tolerance = ids;
        self
    }

    /// Highest id for which `exists` answers [`Probe::Exists`].
    ///
    /// If id 1 is absent the mapping is empty and exactly one read is made.
    /// Each read is bounded by the per-call timeout; a timed-out read counts as
    /// [`Probe::Unknown`]. When the budget runs out the best id found so far is
    /// returned with `truncated` set.
    pub async fn find_max_existing_id<F, Fut>(&self, exists: F, budget: &TimeBudget) -> ProbeOutcome
    where
        F: FnMut(u64) -> Fut,
        Fut: Future<Output = Probe>,
    {
        let span = spans::probe_max_id(self.cap);
        let mut run = ProbeRun {
            exists,
            budget,
            retries: self.retries,
            calls: 0,
            unresolved: 0,
        };

        let result = self.search(&mut run).instrument(span).await;
        let (max_id, truncated) = match result {
            Ok(max_id) => (max_id, false),
            Err((max_id, Truncated)) => (max_id, true),
        };

        debug!(max_id, calls = run.calls, unresolved = run.unresolved, truncated, "Probe finished");
        ProbeOutcome {
            max_id,
            calls: run.calls,
            unresolved: run.unresolved,
            truncated,
        }
    }

    async fn search<F, Fut>(&self, run: &mut ProbeRun<'_, F>) -> Result<u64, (u64, Truncated)>
    where
        F: FnMut(u64) -> Fut,
        Fut: Future<Output = Probe>,
    {
        if !run.check(1).await.map_err(|t| (0, t))? {
            return Ok(0);
        }

        let mut lo = 1;
        loop {
            let bounds = self.gallop(run, lo).await?;
            let bounds = bisect(run, bounds).await?;
            lo = bounds.lo;

            match self.look_past_gap(run, bounds).await? {
                Some(next) => {
                    debug!(from = lo, to = next, "Found records past a gap");
                    lo = next;
                }
                None => return Ok(lo),
            }
        }
    }

    /// Double the step from `lo` until an absent id or the cap is reached.
    async fn gallop<F, Fut>(&self, run: &mut ProbeRun<'_, F>, mut lo: u64) -> Result<ProbeBounds, (u64, Truncated)>
    where
        F: FnMut(u64) -> Fut,
        Fut: Future<Output = Probe>,
    {
        let mut step: u64 = 1;
        loop {
            let hi = lo.saturating_add(step);
            if hi > self.cap {
                // Ids above the cap are assumed absent
                return Ok(ProbeBounds {
                    lo,
                    hi: self.cap.max(lo).saturating_add(1),
                });
            }
            if !run.check(hi).await.map_err(|t| (lo, t))? {
                return Ok(ProbeBounds { lo, hi });
            }
            lo = hi;
            step = step.saturating_mul(2);
        }
    }

    /// First existing id within `gap_tolerance` ids past `bounds.hi`.
    async fn look_past_gap<F, Fut>(
        &self,
        run: &mut ProbeRun<'_, F>,
        bounds: ProbeBounds,
    ) -> Result<Option<u64>, (u64, Truncated)>
    where
        F: FnMut(u64) -> Fut,
        Fut: Future<Output = Probe>,
    {
        let last = bounds.hi.saturating_add(self.gap_tolerance).min(self.cap);
        for id in bounds.hi.saturating_add(1)..=last {
            if run.check(id).await.map_err(|t| (bounds.lo, t))? {
                return Ok(Some(id));
            }
        }
        Ok(None)
    }
}

async fn bisect<F, Fut>(run: &mut ProbeRun<'_, F>, mut bounds: ProbeBounds) -> Result<ProbeBounds, (u64, Truncated)>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Probe>,
{
    while bounds.lo + 1 < bounds.hi {
        let mid = bounds.lo + (bounds.hi - bounds.lo) / 2;
        if run.check(mid).await.map_err(|t| (bounds.lo, t))? {
            bounds.lo = mid;
        } else {
            bounds.hi = mid;
        }
    }
    Ok(bounds)
}

struct ProbeRun<'a, F> {
    exists: F,
    budget: &'a TimeBudget,
    retries: u32,
    calls: u64,
    unresolved: u64,
}

impl<F, Fut> ProbeRun<'_, F>
where
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = Probe>,
{
    /// Resolve existence of `id`, retrying inconclusive reads.
    async fn check(&mut self, id: u64) -> Result<bool, Truncated> {
        for attempt in 0..=self.retries {
            if self.budget.expired() {
                return Err(Truncated);
            }
            self.calls += 1;
            let answer = match self.budget.with_timeout((self.exists)(id)).await {
                Ok(answer) => answer,
                Err(BudgetError::Exhausted) => return Err(Truncated),
                Err(BudgetError::TimedOut { .. }) => Probe::Unknown,
            };

            match answer {
                Probe::Exists => return Ok(true),
                Probe::Absent => return Ok(false),
                Probe::Unknown => debug!(id, attempt, "Inconclusive existence read"),
            }
        }

        warn!(id, retries = self.retries, "Existence unknown after retries, treating as absent");
        self.unresolved += 1;
        Ok(false)
    }
}
