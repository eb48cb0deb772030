//! Integration tests for recent activity discovery

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use activityscan::{
    ActivityAggregator, ActivityKind, BlockTimestampCache, CandidateSource, ChainDeployment, EmptyReason,
    ScanConfig, ScanConfigBuilder,
};
use alloy_chains::NamedChain;
use alloy_primitives::Address;
use helpers::{block_timestamp, burn_entry, mint_entry, shared, swap_entry, Contracts, MockChainReader};

const HEAD: u64 = 3_000_000;
const PAIR: Address = Address::repeat_byte(0xaa);
const OTHER_PAIR: Address = Address::repeat_byte(0xab);
const FACTORY: Address = Address::repeat_byte(0xfa);
const WETH: Address = Address::repeat_byte(0x11);
const USDC: Address = Address::repeat_byte(0x22);

fn deployment() -> ChainDeployment {
    ChainDeployment::new(NamedChain::Mainnet)
}

fn contracts() -> Contracts {
    let mut contracts = Contracts::default();
    contracts.factory_pairs.insert((FACTORY, WETH, USDC), PAIR);
    contracts.pair_tokens.insert(PAIR, (WETH, USDC));
    contracts.tokens.insert(WETH, (18, "WETH".to_string()));
    contracts.tokens.insert(USDC, (6, "USDC".to_string()));
    contracts
}

fn aggregator(mock: MockChainReader, deployment: ChainDeployment) -> (Arc<MockChainReader>, ActivityAggregator) {
    let (mock, reader) = shared(mock);
    (mock, ActivityAggregator::new(reader, deployment, ScanConfig::minimal()))
}

/// Test that a valid override is the only address scanned
#[tokio::test]
async fn test_override_wins_over_configuration() {
    let mock = MockChainReader::new(HEAD).with_logs(vec![
        swap_entry(OTHER_PAIR, HEAD - 10, 0),
        swap_entry(PAIR, HEAD - 10, 1),
    ]);
    let (mock, aggregator) = aggregator(
        mock,
        deployment()
            .with_pair(PAIR)
            .with_factory(FACTORY)
            .with_token_pair(WETH, USDC),
    );

    let report = aggregator
        .get_recent_activity(Some(&OTHER_PAIR.to_checksum(None)))
        .await;

    let used = report.diagnostics.candidate_used.unwrap();
    assert_eq!(used.address, OTHER_PAIR);
    assert_eq!(used.source, CandidateSource::Override);
    assert_eq!(report.diagnostics.candidates_tried, 1);
    assert!(report.records.iter().all(|r| r.pair == OTHER_PAIR));
    assert!(mock.requests().iter().all(|r| r.address == OTHER_PAIR));
}

/// Test that a malformed override falls back to the configured pair
#[tokio::test]
async fn test_malformed_override_is_ignored() {
    let mock = MockChainReader::new(HEAD).with_logs(vec![swap_entry(PAIR, HEAD - 10, 0)]);
    let (_, aggregator) = aggregator(mock, deployment().with_pair(PAIR));

    let report = aggregator.get_recent_activity(Some("0x1234")).await;

    let used = report.diagnostics.candidate_used.unwrap();
    assert_eq!(used.source, CandidateSource::Config);
    assert_eq!(report.records.len(), 1);
}

/// Test that records come back newest block first with timestamps back-filled
#[tokio::test]
async fn test_records_are_ordered_and_timestamped() {
    let mock = MockChainReader::new(HEAD)
        .with_logs(vec![
            swap_entry(PAIR, HEAD - 1_000, 0),
            mint_entry(PAIR, HEAD - 500, 2),
            burn_entry(PAIR, HEAD - 500, 5),
        ])
        .with_calls(contracts().into_handler());
    let (mock, aggregator) = aggregator(mock, deployment().with_pair(PAIR));

    let report = aggregator.get_recent_activity(None).await;

    let kinds: Vec<ActivityKind> = report.records.iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![ActivityKind::Mint, ActivityKind::Burn, ActivityKind::Swap]);
    for record in &report.records {
        assert_eq!(record.timestamp, Some(block_timestamp(record.block_number)));
        assert_eq!(record.token_labels.token0, "WETH");
        assert_eq!(record.token_labels.token1, "USDC");
    }
    assert_eq!(mock.timestamp_calls(), 2, "one lookup per distinct block");
    assert_eq!(report.diagnostics.block_span, Some(2_000_000));
    assert_eq!(report.diagnostics.head_block, Some(HEAD));
    assert_eq!(report.diagnostics.empty_reason, None);
    assert!(!report.diagnostics.metadata_incomplete);
}

/// Test that unreadable token metadata is labelled and flagged
#[tokio::test]
async fn test_unreadable_metadata_is_flagged() {
    let mock = MockChainReader::new(HEAD).with_logs(vec![swap_entry(PAIR, HEAD - 5, 0)]);
    let (_, aggregator) = aggregator(mock, deployment().with_pair(PAIR));

    let report = aggregator.get_recent_activity(None).await;

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].token_labels.token0, "TOKEN0");
    assert_eq!(report.records[0].token_labels.token1, "TOKEN1");
    assert!(report.diagnostics.metadata_incomplete);
}

/// Test that a failed timestamp lookup keeps the record and is retried later
#[tokio::test]
async fn test_failed_timestamp_lookup_is_not_cached() {
    let mock = MockChainReader::new(HEAD)
        .with_logs(vec![swap_entry(PAIR, HEAD - 5, 0)])
        .fail_timestamps(1);
    let (mock, aggregator) = aggregator(mock, deployment().with_pair(PAIR));

    let first = aggregator.get_recent_activity(None).await;
    assert_eq!(first.records.len(), 1);
    assert_eq!(first.records[0].timestamp, None);
    assert!(aggregator.timestamp_cache().is_empty().await);

    let second = aggregator.get_recent_activity(None).await;
    assert_eq!(second.records[0].timestamp, Some(block_timestamp(HEAD - 5)));
    assert_eq!(mock.timestamp_calls(), 2);
}

/// Test that a shared timestamp cache serves repeat runs without lookups
#[tokio::test]
async fn test_timestamp_cache_is_reused_across_runs() {
    let mock = MockChainReader::new(HEAD).with_logs(vec![swap_entry(PAIR, HEAD - 5, 0)]);
    let (mock, reader) = shared(mock);
    let cache = Arc::new(BlockTimestampCache::new());
    let aggregator = ActivityAggregator::new(reader, deployment().with_pair(PAIR), ScanConfig::minimal())
        .with_timestamp_cache(cache.clone());

    let first = aggregator.get_recent_activity(None).await;
    let second = aggregator.get_recent_activity(None).await;

    assert_eq!(first.records, second.records);
    assert_eq!(mock.timestamp_calls(), 1);
    assert_eq!(cache.stats().await.hits, 1);
}

/// Test that a pair without activity yields an explained empty report
#[tokio::test]
async fn test_quiet_pair_reports_no_events() {
    let (mock, aggregator) = aggregator(MockChainReader::new(HEAD), deployment().with_pair(PAIR));

    let report = aggregator.get_recent_activity(None).await;

    assert!(report.records.is_empty());
    assert_eq!(report.diagnostics.logs_fetched, 0);
    assert_eq!(report.diagnostics.empty_reason, Some(EmptyReason::NoEventsInRange));
    assert!(report.diagnostics.used_fallback);
    assert!(mock.requests().iter().all(|r| r.range.from() > HEAD - 2_000_000));
}

/// Test that a floor block above the head is an empty range, not a failure
#[tokio::test]
async fn test_floor_above_head_reports_no_events() {
    let (mock, aggregator) = aggregator(
        MockChainReader::new(1_000),
        deployment().with_pair(PAIR).with_floor_block(1_001),
    );

    let report = aggregator.get_recent_activity(None).await;

    assert_eq!(report.diagnostics.empty_reason, Some(EmptyReason::NoEventsInRange));
    assert_eq!(report.diagnostics.windows_failed, 0);
    assert_eq!(mock.log_calls(), 0);
}

/// Test that an abandoned span hands over to the next, narrower one
#[tokio::test]
async fn test_abandoned_span_steps_down_the_ladder() {
    let mock = MockChainReader::new(HEAD)
        .with_logs(vec![swap_entry(PAIR, HEAD - 10, 0)])
        .fail_logs_when(|index, _| index < 5);
    let (mock, aggregator) = aggregator(mock, deployment().with_pair(PAIR));

    let report = aggregator.get_recent_activity(None).await;

    assert_eq!(report.records.len(), 1);
    assert_eq!(report.diagnostics.block_span, Some(1_000_000));
    assert_eq!(report.diagnostics.windows_failed, 5);
    assert!(!report.diagnostics.used_fallback);
    let floors: Vec<u64> = mock.requests().iter().map(|r| r.range.from()).collect();
    assert_eq!(floors.last(), Some(&(HEAD - 49_999)));
}

/// Test that an empty deployment makes no range queries
#[tokio::test]
async fn test_no_candidates() {
    let (mock, aggregator) = aggregator(MockChainReader::new(HEAD), deployment());

    let report = aggregator.get_recent_activity(None).await;

    assert_eq!(report.diagnostics.empty_reason, Some(EmptyReason::NoCandidates));
    assert_eq!(mock.log_calls(), 0);
}

/// Test that an unreachable head is reported rather than raised
#[tokio::test]
async fn test_head_unavailable() {
    let (mock, aggregator) = aggregator(MockChainReader::new(HEAD).without_head(), deployment().with_pair(PAIR));

    let report = aggregator.get_recent_activity(None).await;

    assert_eq!(report.diagnostics.empty_reason, Some(EmptyReason::HeadUnavailable));
    assert_eq!(report.diagnostics.head_block, None);
    assert_eq!(mock.log_calls(), 0);
}

/// Test that node-side filtering is tried when unfiltered queries keep failing
#[tokio::test]
async fn test_filtered_fallback_recovers_records() {
    let mock = MockChainReader::new(HEAD)
        .with_logs(vec![swap_entry(PAIR, HEAD - 100, 0)])
        .fail_logs_when(|_, _| true);
    let (mock, aggregator) = aggregator(mock, deployment().with_pair(PAIR));

    let report = aggregator.get_recent_activity(None).await;

    assert_eq!(report.records.len(), 1);
    assert!(report.diagnostics.used_fallback);
    assert!(report.diagnostics.windows_failed >= 5);
    assert!(mock.requests().iter().any(|r| r.server_filtered));
}

/// Test that every query failing is distinguished from a quiet pair
#[tokio::test]
async fn test_all_windows_failed() {
    let mock = MockChainReader::new(HEAD)
        .fail_logs_when(|_, _| true)
        .fail_filtered_logs_when(|_, _| true);
    let (_, aggregator) = aggregator(mock, deployment().with_pair(PAIR));

    let report = aggregator.get_recent_activity(None).await;

    assert_eq!(report.diagnostics.empty_reason, Some(EmptyReason::AllWindowsFailed));
    assert!(!report.diagnostics.budget_exhausted);
    assert!(report.diagnostics.windows_failed > 0);
}

/// Test that a factory-derived pair is scanned when nothing is configured
#[tokio::test]
async fn test_factory_candidate() {
    let mock = MockChainReader::new(HEAD)
        .with_logs(vec![swap_entry(PAIR, HEAD - 1, 0)])
        .with_calls(contracts().into_handler());
    let (_, aggregator) = aggregator(
        mock,
        deployment().with_factory(FACTORY).with_token_pair(WETH, USDC),
    );

    let report = aggregator.get_recent_activity(None).await;

    let used = report.diagnostics.candidate_used.unwrap();
    assert_eq!(used.address, PAIR);
    assert_eq!(used.source, CandidateSource::Factory);
    assert_eq!(report.records.len(), 1);
}

/// Test that a quiet first candidate hands over to the next one
#[tokio::test]
async fn test_next_candidate_after_quiet_one() {
    let mock = MockChainReader::new(HEAD)
        .with_logs(vec![mint_entry(PAIR, HEAD - 40_000, 0)])
        .with_calls(contracts().into_handler());
    let (_, aggregator) = aggregator(
        mock,
        deployment()
            .with_pair(OTHER_PAIR)
            .with_factory(FACTORY)
            .with_token_pair(WETH, USDC),
    );

    let report = aggregator.get_recent_activity(None).await;

    assert_eq!(report.diagnostics.candidates_tried, 2);
    assert_eq!(report.diagnostics.candidate_used.unwrap().address, PAIR);
    assert_eq!(report.records[0].kind, ActivityKind::Mint);
}

/// Test that a stalled node is cut off by the budget and reported as such
#[tokio::test(start_paused = true)]
async fn test_budget_exhausted_before_first_success() {
    let mock = MockChainReader::new(HEAD).with_log_delay(Duration::from_secs(10));
    let (mock, reader) = shared(mock);
    let config = ScanConfigBuilder::new()
        .total_budget(Duration::from_secs(20))
        .per_call_timeout(Duration::from_secs(4))
        .build();
    let aggregator = ActivityAggregator::new(reader, deployment().with_pair(PAIR), config);
    let started = tokio::time::Instant::now();

    let report = aggregator.get_recent_activity(None).await;

    assert!(started.elapsed() <= Duration::from_secs(24));
    assert!(report.diagnostics.budget_exhausted);
    assert_eq!(
        report.diagnostics.empty_reason,
        Some(EmptyReason::BudgetExhaustedBeforeFirstSuccess)
    );
    assert!(mock.log_calls() <= 6);
}
