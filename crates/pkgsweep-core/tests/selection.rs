//! Selection pipeline tests: explicit-id bypass, filter composition,
//! sort stability, and truncation arithmetic, all over the in-memory
//! fake registry.

use chrono::{DateTime, TimeZone, Utc};
use pkgsweep_core::fakes::FakeRegistry;
use pkgsweep_core::{select_versions, RawPolicy, RetentionPolicy, SweepError, VersionRecord};

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn rec(id: u64, name: &str, at: i64) -> VersionRecord {
    VersionRecord {
        id,
        name: name.to_string(),
        created_at: ts(at),
        tagged: false,
    }
}

fn tagged_rec(id: u64, name: &str, at: i64) -> VersionRecord {
    VersionRecord {
        tagged: true,
        ..rec(id, name, at)
    }
}

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

#[tokio::test]
async fn explicit_ids_bypass_fetch_entirely() {
    let registry = FakeRegistry::with_versions(vec![rec(1, "1.0.0", 0)]);
    let p = policy(|r| r.version_ids = vec![9, 5, 7]);

    let ids = select_versions(&registry, &p).await.unwrap();

    assert_eq!(ids, vec![9, 5, 7]);
    assert_eq!(registry.list_calls(), 0);
}

#[tokio::test]
async fn missing_fetch_query_is_a_config_error() {
    let registry = FakeRegistry::new();
    let p = policy(|r| r.owner = String::new());

    let err = select_versions(&registry, &p).await.unwrap_err();

    assert!(matches!(err, SweepError::Config(_)));
    assert_eq!(registry.list_calls(), 0);
}

#[tokio::test]
async fn default_policy_deletes_everything_oldest_first() {
    let versions = (0..10).map(|i| rec(100 + i, &format!("1.{i}.0"), i as i64)).collect();
    let registry = FakeRegistry::with_versions(versions);
    let p = policy(|_| {});

    let ids = select_versions(&registry, &p).await.unwrap();

    assert_eq!(ids, (0..10).map(|i| 100 + i).collect::<Vec<u64>>());
}

#[tokio::test]
async fn include_filter_drops_non_matching_labels() {
    let registry = FakeRegistry::with_versions(vec![
        rec(1, "1.0.0", 0),
        rec(2, "2.0.0-rc.1", 10),
        rec(3, "2.0.0", 20),
        rec(4, "3.0.0-rc.1", 30),
    ]);
    let p = policy(|r| r.include_versions = Some(regex::Regex::new("-rc").unwrap()));

    let ids = select_versions(&registry, &p).await.unwrap();

    assert_eq!(ids, vec![2, 4]);
}

#[tokio::test]
async fn ignored_labels_never_selected_even_when_oldest() {
    let registry = FakeRegistry::with_versions(vec![
        rec(1, "0.9.0", 0),
        rec(2, "1.0.0", 10),
        rec(3, "1.1.0", 20),
    ]);
    let p = policy(|r| {
        r.ignore_versions = Some(regex::Regex::new(r"^0\.").unwrap());
        r.num_to_delete = 1;
    });

    let ids = select_versions(&registry, &p).await.unwrap();

    // The oldest version matches the ignore pattern; the next oldest
    // takes its place.
    assert_eq!(ids, vec![2]);
}

#[tokio::test]
async fn untagged_only_never_selects_tagged_records() {
    let registry = FakeRegistry::with_versions(vec![
        tagged_rec(1, "sha256:aaa", 0),
        rec(2, "sha256:bbb", 10),
        tagged_rec(3, "sha256:ccc", 20),
        rec(4, "sha256:ddd", 30),
    ]);
    let p = policy(|r| r.untagged_only = true);

    let ids = select_versions(&registry, &p).await.unwrap();

    assert_eq!(ids, vec![2, 4]);
}

#[tokio::test(start_paused = true)]
async fn sort_is_stable_across_shuffled_pages() {
    // 150 records spanning two pages, deliberately stored newest-first
    // so upstream ordering is useless.
    let mut versions: Vec<VersionRecord> = (0..150)
        .map(|i| rec(1000 + i, &format!("v{i}"), i as i64))
        .collect();
    versions.reverse();
    let registry = FakeRegistry::with_versions(versions);
    let p = policy(|_| {});

    let ids = select_versions(&registry, &p).await.unwrap();

    assert_eq!(ids, (0..150).map(|i| 1000 + i).collect::<Vec<u64>>());
    assert!(registry.list_calls() >= 2);
}

#[tokio::test]
async fn creation_time_ties_break_by_ascending_id() {
    let registry = FakeRegistry::with_versions(vec![
        rec(30, "c", 5),
        rec(10, "a", 5),
        rec(20, "b", 5),
    ]);
    let p = policy(|_| {});

    let ids = select_versions(&registry, &p).await.unwrap();

    assert_eq!(ids, vec![10, 20, 30]);
}

#[tokio::test]
async fn keep_floor_selects_exactly_the_oldest_surplus() {
    let versions = (0..50).map(|i| rec(i, &format!("1.0.{i}"), i as i64)).collect();
    let registry = FakeRegistry::with_versions(versions);
    let p = policy(|r| r.min_to_keep = 10);

    let ids = select_versions(&registry, &p).await.unwrap();

    assert_eq!(ids.len(), 40);
    assert_eq!(ids, (0..40).collect::<Vec<u64>>());
}

#[tokio::test]
async fn keep_floor_at_or_above_population_selects_nothing() {
    let versions = (0..5).map(|i| rec(i, &format!("1.0.{i}"), i as i64)).collect();
    let registry = FakeRegistry::with_versions(versions);
    let p = policy(|r| r.min_to_keep = 5);

    let ids = select_versions(&registry, &p).await.unwrap();

    assert!(ids.is_empty());
}

#[tokio::test]
async fn delete_count_is_capped_by_population() {
    let versions = (0..3).map(|i| rec(i, &format!("1.0.{i}"), i as i64)).collect();
    let registry = FakeRegistry::with_versions(versions);
    // num_to_delete = 1 keeps the small-count bypass out of play.
    let p = policy(|r| r.num_to_delete = 1);

    let ids = select_versions(&registry, &p).await.unwrap();

    assert_eq!(ids, vec![0]);
}

#[tokio::test(start_paused = true)]
async fn two_full_pages_come_back_in_chronological_order() {
    // Newest half on page 1, oldest half on page 2.
    let mut versions: Vec<VersionRecord> = Vec::new();
    for i in 100..200 {
        versions.push(rec(i, &format!("v{i}"), i as i64));
    }
    for i in 0..100 {
        versions.push(rec(i, &format!("v{i}"), i as i64));
    }
    let registry = FakeRegistry::with_versions(versions);
    let p = policy(|_| {});

    let ids = select_versions(&registry, &p).await.unwrap();

    assert_eq!(ids.len(), 200);
    assert_eq!(ids, (0..200).collect::<Vec<u64>>());
}

#[tokio::test]
async fn prerelease_only_selects_only_prerelease_labels() {
    let registry = FakeRegistry::with_versions(vec![
        rec(1, "1.0.0", 0),
        rec(2, "1.1.0-rc.1", 10),
        rec(3, "1.1.0", 20),
        rec(4, "2.0.0-beta", 30),
    ]);
    let p = policy(|r| r.prerelease_only = true);

    let ids = select_versions(&registry, &p).await.unwrap();

    assert_eq!(ids, vec![2, 4]);
}
