use std::time::Duration;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use scopus_harvest::config::{Config, ConfigLoader, SearchEntry};
use scopus_harvest::domain::SearchFilter;
use scopus_harvest::error::HarvestError;

#[test]
fn parse_config_file_with_filter() {
    let content = r#"{
        "timeout_secs": 30,
        "batch_size": 25,
        "store_path": "out/ids.json",
        "search": {"country": "japan", "published_after": 2020, "subject_area": "comp"}
    }"#;
    let config: Config = serde_json::from_str(content).unwrap();
    assert_matches!(config.search, Some(SearchEntry::Filter(_)));

    let resolved = ConfigLoader::resolve_config(config, |_| None).unwrap();
    assert_eq!(resolved.timeout, Duration::from_secs(30));
    assert_eq!(resolved.batch_size, 25);
    assert_eq!(resolved.store_path, Utf8PathBuf::from("out/ids.json"));
    assert_eq!(
        resolved.query,
        "AFFILCOUNTRY ( japan ) AND PUBYEAR > 2020 AND SUBJAREA ( comp )"
    );
}

#[test]
fn parse_config_file_with_raw_query() {
    let config: Config = serde_json::from_str(r#"{"search": {"query": "TITLE ( rust )"}}"#).unwrap();
    let resolved = ConfigLoader::resolve_config(config, |_| None).unwrap();
    assert_eq!(resolved.query, "TITLE ( rust )");
}

#[test]
fn default_query_matches_default_filter() {
    let resolved = ConfigLoader::resolve_config(Config::default(), |_| None).unwrap();
    assert_eq!(resolved.query, SearchFilter::default().to_query());
}

#[test]
fn invalid_env_value_is_rejected() {
    let err = ConfigLoader::resolve_config(Config::default(), |key| {
        (key == "SCOPUS_HARVEST_TIMEOUT").then(|| "soon".to_string())
    })
    .unwrap_err();
    assert_matches!(err, HarvestError::ConfigParse(_));
}

#[test]
fn explicit_missing_config_file_fails() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("nope.json");
    let err = ConfigLoader::resolve(path.to_str()).unwrap_err();
    assert_matches!(err, HarvestError::ConfigRead(_));
}
