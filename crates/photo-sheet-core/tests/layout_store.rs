use std::time::{Duration, SystemTime};

use photo_sheet_core::model::LayoutResult;
use photo_sheet_core::store::{DEFAULT_TTL, LayoutStore};

const HOUR: Duration = Duration::from_secs(3600);

fn result_with(id: &str) -> LayoutResult {
    LayoutResult {
        unplaced_ids: vec![id.to_string()],
        ..Default::default()
    }
}

#[test]
fn default_ttl_is_a_day() {
    let store = LayoutStore::default();
    assert_eq!(store.ttl(), DEFAULT_TTL);
    assert_eq!(DEFAULT_TTL, 24 * HOUR);
    assert!(store.is_empty());
}

#[test]
fn entries_expire_after_ttl() {
    let t0 = SystemTime::UNIX_EPOCH + 1000 * HOUR;
    let mut store = LayoutStore::default();
    store.insert_at("job-1", result_with("x"), t0);

    assert!(store.get_at("job-1", t0 + 23 * HOUR).is_some());
    assert!(store.get_at("job-1", t0 + 25 * HOUR).is_none());
    // expired entries stay until swept
    assert_eq!(store.len(), 1);
    assert_eq!(store.sweep(t0 + 25 * HOUR), 1);
    assert!(store.is_empty());
}

#[test]
fn sweep_keeps_fresh_entries() {
    let t0 = SystemTime::UNIX_EPOCH + 1000 * HOUR;
    let mut store = LayoutStore::new(2 * HOUR);
    store.insert_at("old", result_with("a"), t0);
    store.insert_at("new", result_with("b"), t0 + 2 * HOUR);
    // created after `now`: treated as fresh
    store.insert_at("future", result_with("c"), t0 + 10 * HOUR);

    assert_eq!(store.sweep(t0 + 3 * HOUR), 1);
    assert_eq!(store.len(), 2);
    assert!(store.get_at("new", t0 + 3 * HOUR).is_some());
    assert!(store.get_at("future", t0 + 3 * HOUR).is_some());
}

#[test]
fn insert_replaces_and_remove_returns() {
    let mut store = LayoutStore::default();
    store.insert("job", result_with("first"));
    store.insert("job", result_with("second"));
    assert_eq!(store.len(), 1);
    assert_eq!(store.get("job").unwrap().unplaced_ids, vec!["second".to_string()]);

    let removed = store.remove("job").unwrap();
    assert_eq!(removed.unplaced_ids, vec!["second".to_string()]);
    assert!(store.remove("job").is_none());
    assert!(store.get("job").is_none());
}
