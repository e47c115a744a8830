// Unit tests for execution rules

use super::*;

#[test]
fn test_plan_switches_to_batches_above_limit() {
    let policy = ExecutionPolicy::default();
    assert_eq!(policy.plan(1), PlannedMode::SinglePassFirst);
    assert_eq!(policy.plan(100), PlannedMode::SinglePassFirst);
    assert_eq!(policy.plan(101), PlannedMode::BatchedOnly);
}

#[test]
fn test_batch_ranges_cover_all_overlays_in_order() {
    let policy = ExecutionPolicy::default();
    let ranges = policy.batch_ranges(70);
    assert_eq!(ranges, vec![0..32, 32..64, 64..70]);

    let exact = policy.batch_ranges(96);
    assert_eq!(exact.len(), 3);
    assert!(exact.iter().all(|r| r.len() == 32));

    assert!(policy.batch_ranges(0).is_empty());
}

#[test]
fn test_zero_batch_size_is_rejected() {
    assert!(ExecutionPolicy::new(100, 0).is_err());
    assert_eq!(ExecutionPolicy::new(10, 4).unwrap().batch_size, 4);
}

#[test]
fn test_frame_percent_is_capped_at_99() {
    assert_eq!(frame_percent(0, 300), 0);
    assert_eq!(frame_percent(150, 300), 50);
    assert_eq!(frame_percent(299, 300), 99);
    assert_eq!(frame_percent(400, 300), 99);
    assert_eq!(frame_percent(10, 0), 0);
}

#[test]
fn test_total_frames_from_duration() {
    assert_eq!(estimate_total_frames(10.0), 300);
    assert_eq!(estimate_total_frames(2.5), 75);
    assert_eq!(estimate_total_frames(0.0), 0);
    assert_eq!(estimate_total_frames(f64::NAN), 0);
}

#[test]
fn test_weighted_batch_percent() {
    assert_eq!(weighted_batch_percent(1, 4, 0), 0);
    assert_eq!(weighted_batch_percent(1, 4, 50), 13);
    assert_eq!(weighted_batch_percent(2, 4, 0), 25);
    assert_eq!(weighted_batch_percent(3, 4, 50), 63);
    assert_eq!(weighted_batch_percent(4, 4, 99), 99);
}
