//! End-to-end sweep orchestration tests over the fake registry.

use pkgsweep_core::fakes::{version, FakeRegistry};
use pkgsweep_core::{sweep_package, RawPolicy, RetentionPolicy, SweepError};

fn policy(adjust: impl FnOnce(&mut RawPolicy)) -> RetentionPolicy {
    let mut raw = RawPolicy {
        owner: "octo-org".to_string(),
        package_name: "widget".to_string(),
        package_type: "container".to_string(),
        num_to_delete: -1,
        min_to_keep: -1,
        token: "t0k3n".to_string(),
        ..RawPolicy::default()
    };
    adjust(&mut raw);
    RetentionPolicy::validate(raw).unwrap()
}

fn seeded(count: u64) -> FakeRegistry {
    FakeRegistry::with_versions(
        (0..count)
            .map(|i| version(i, &format!("1.0.{i}"), 1000 - i as i64, false))
            .collect(),
    )
}

#[tokio::test(start_paused = true)]
async fn full_sweep_deletes_oldest_first() {
    let registry = seeded(10);
    let p = policy(|_| {});

    let report = sweep_package(&registry, &p).await.unwrap();

    assert_eq!(report.deleted, 10);
    assert_eq!(report.selected.len(), 10);
    // Ages decrease with id, so id 0 is the oldest.
    assert_eq!(registry.deleted_ids(), (0..10).collect::<Vec<u64>>());
}

#[tokio::test]
async fn missing_token_fails_before_any_network_call() {
    let registry = seeded(10);
    let p = policy(|r| r.token = String::new());

    let err = sweep_package(&registry, &p).await.unwrap_err();

    assert!(matches!(err, SweepError::Config(_)));
    assert_eq!(registry.list_calls(), 0);
    assert_eq!(registry.delete_calls(), 0);
}

#[tokio::test]
async fn nothing_requested_short_circuits_without_network() {
    let registry = seeded(10);
    let p = policy(|r| r.num_to_delete = 0);

    let report = sweep_package(&registry, &p).await.unwrap();

    assert!(report.selected.is_empty());
    assert_eq!(report.deleted, 0);
    assert_eq!(registry.list_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn dry_run_computes_selection_but_deletes_nothing() {
    let registry = seeded(10);
    let p = policy(|r| r.dry_run = true);

    let report = sweep_package(&registry, &p).await.unwrap();

    assert!(report.dry_run);
    assert_eq!(report.selected.len(), 10);
    assert_eq!(report.deleted, 0);
    assert!(registry.list_calls() >= 1);
    assert_eq!(registry.delete_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn explicit_ids_go_straight_to_the_deleter() {
    let registry = FakeRegistry::new();
    let p = policy(|r| r.version_ids = vec![42, 7]);

    let report = sweep_package(&registry, &p).await.unwrap();

    assert_eq!(report.deleted, 2);
    assert_eq!(registry.list_calls(), 0);
    assert_eq!(registry.deleted_ids(), vec![42, 7]);
}

#[tokio::test(start_paused = true)]
async fn partial_delete_failure_surfaces_the_cursor() {
    let registry = seeded(5);
    registry.fail_delete_of(2);
    let p = policy(|_| {});

    let err = sweep_package(&registry, &p).await.unwrap_err();

    match err {
        SweepError::Delete { deleted, .. } => assert_eq!(deleted, 3),
        other => panic!("expected Delete error, got {other:?}"),
    }
    assert_eq!(registry.deleted_ids(), vec![0, 1]);
}
