use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use scopus_harvest::domain::ScopusId;
use scopus_harvest::error::HarvestError;
use scopus_harvest::store::IdStore;

fn temp_store(temp: &tempfile::TempDir, name: &str) -> IdStore {
    IdStore::new(Utf8PathBuf::from_path_buf(temp.path().join(name)).unwrap())
}

#[test]
fn round_trip_keeps_order_and_nulls() {
    let temp = tempfile::tempdir().unwrap();
    let store = temp_store(&temp, "scopus_ids.json");
    let ids: Vec<Option<ScopusId>> = vec![
        Some("85186352022".parse().unwrap()),
        None,
        Some("85185000001".parse().unwrap()),
    ];

    store.write(&ids).unwrap();
    assert_eq!(store.read().unwrap(), ids);

    let raw = std::fs::read_to_string(store.path().as_std_path()).unwrap();
    assert_eq!(raw, r#"["85186352022",null,"85185000001"]"#);
}

#[test]
fn write_replaces_previous_list() {
    let temp = tempfile::tempdir().unwrap();
    let store = temp_store(&temp, "nested/scopus_ids.json");

    store
        .write(&[Some("1".parse().unwrap()), Some("2".parse().unwrap())])
        .unwrap();
    store.write(&[Some("3".parse().unwrap())]).unwrap();

    assert_eq!(store.read().unwrap(), vec![Some("3".parse().unwrap())]);
}

#[test]
fn missing_file_is_a_read_error() {
    let temp = tempfile::tempdir().unwrap();
    let store = temp_store(&temp, "absent.json");
    assert_matches!(store.read(), Err(HarvestError::StoreRead { .. }));
}

#[test]
fn malformed_file_is_a_read_error() {
    let temp = tempfile::tempdir().unwrap();
    let store = temp_store(&temp, "broken.json");
    std::fs::write(store.path().as_std_path(), b"{\"not\": \"a list\"}").unwrap();
    assert_matches!(store.read(), Err(HarvestError::StoreRead { .. }));
}
