//! Tests for peer scorers

use super::*;
use crate::test_utils::make_peers;

// =============================================================================
// BAD RESPONSES
// =============================================================================

#[test]
fn test_strikes_are_monotonic_until_reset() {
    let scorer = BadResponsesScorer::new(5);
    let peer = make_peers(1).remove(0);

    let mut last = 0;
    for _ in 0..10 {
        let count = scorer.increment(&peer);
        assert!(count > last);
        last = count;
    }
    assert_eq!(scorer.count(&peer), 10);

    scorer.reset(&peer);
    assert_eq!(scorer.count(&peer), 0);
}

#[test]
fn test_bad_only_above_threshold() {
    let scorer = BadResponsesScorer::new(5);
    let peer = make_peers(1).remove(0);
    for _ in 0..5 {
        scorer.increment(&peer);
    }
    assert!(!scorer.is_bad_peer(&peer));
    scorer.increment(&peer);
    assert!(scorer.is_bad_peer(&peer));
    assert_eq!(scorer.bad_peers(), vec![peer]);
}

#[test]
fn test_max_threshold_never_marks_bad() {
    let scorer = BadResponsesScorer::new(u32::MAX);
    let peer = make_peers(1).remove(0);
    for _ in 0..3 {
        scorer.increment(&peer);
    }
    assert_eq!(scorer.count(&peer), 3);
    assert!(!scorer.is_bad_peer(&peer));
    assert!(scorer.bad_peers().is_empty());
}

// =============================================================================
// BLOCK PROVIDER
// =============================================================================

#[test]
fn test_provider_score_before_any_delivery() {
    let scorer = BlockProviderScorer::new();
    let peer = make_peers(1).remove(0);
    assert_eq!(scorer.score(&peer), 1.0);
}

#[test]
fn test_provider_score_is_relative_to_best() {
    let scorer = BlockProviderScorer::new();
    let peers = make_peers(3);
    scorer.touch_n(&peers[0], 9);
    scorer.touch_n(&peers[1], 4);

    assert_eq!(scorer.score(&peers[0]), 1.0);
    assert_eq!(scorer.score(&peers[1]), 0.5);
    assert_eq!(scorer.score(&peers[2]), 0.1);
}

#[test]
fn test_weight_sorted_orders_by_provider_score() {
    let scorer = BlockProviderScorer::new();
    let peers = make_peers(3);
    scorer.touch_n(&peers[2], 10);
    scorer.touch_n(&peers[1], 5);

    let sorted = scorer.weight_sorted(peers.clone(), |_, score| score);
    assert_eq!(sorted, vec![peers[2].clone(), peers[1].clone(), peers[0].clone()]);
}

// =============================================================================
// PURE HELPERS
// =============================================================================

#[test]
fn test_weight_sort_is_stable_for_ties() {
    let peers = make_peers(4);
    let sorted = weight_sort(peers.clone(), &[0.5, 0.9, 0.5, 0.9]);
    assert_eq!(
        sorted,
        vec![
            peers[1].clone(),
            peers[3].clone(),
            peers[0].clone(),
            peers[2].clone()
        ]
    );
}

#[test]
fn test_combined_score_zero_when_nearly_exhausted() {
    assert_eq!(combined_score(1.0, 63, 576, 64, 0.2), 0.0);
}

#[test]
fn test_combined_score_blend() {
    // 1.0 * 0.8 + (576 / 576) * 0.2
    assert_eq!(combined_score(1.0, 576, 576, 64, 0.2), 1.0);
    // 0.5 * 0.8 + 0.5 * 0.2
    assert_eq!(combined_score(0.5, 288, 576, 64, 0.2), 0.5);
}

#[test]
fn test_round_score() {
    assert_eq!(round_score(0.123456), 0.1235);
    assert_eq!(round_score(1.0 / 3.0), 0.3333);
}

#[test]
fn test_scorer_service_wires_threshold() {
    let service = ScorerService::new(&crate::domain::config::ScorerConfig {
        bad_responses_threshold: 1,
    });
    let peer = make_peers(1).remove(0);
    service.bad_responses().increment(&peer);
    service.bad_responses().increment(&peer);
    assert!(service.bad_responses().is_bad_peer(&peer));
    assert_eq!(service.block_provider().processed(&peer), 0);
}
