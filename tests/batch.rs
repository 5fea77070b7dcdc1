use std::sync::Mutex;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use scopus_harvest::app::{ProgressEvent, ProgressSink};
use scopus_harvest::batch::{ItemState, run_batch, select_batch};
use scopus_harvest::domain::{DocumentRequest, ScopusId};
use scopus_harvest::error::HarvestError;
use scopus_harvest::fetch::{DocumentFetcher, FetchOutcome};

struct NoopSink;

impl ProgressSink for NoopSink {
    fn event(&self, _event: ProgressEvent) {}
}

#[derive(Default)]
struct ScriptedFetcher {
    fail: Vec<&'static str>,
    calls: Mutex<Vec<Option<String>>>,
}

impl DocumentFetcher for ScriptedFetcher {
    fn fetch(&self, request: &DocumentRequest) -> FetchOutcome {
        if self.fail.contains(&request.id()) {
            return FetchOutcome::Failed {
                reason: "Read document failed.".to_string(),
            };
        }
        FetchOutcome::Fetched {
            title: Some(format!("doc {}", request.id())),
            path: Utf8PathBuf::from(format!("data/abstracts/{}.json", request.id())),
        }
    }

    fn fetch_abstract(&self, scopus_id: Option<&ScopusId>) -> FetchOutcome {
        self.calls
            .lock()
            .unwrap()
            .push(scopus_id.map(|id| id.to_string()));
        match scopus_id {
            Some(id) => self.fetch(&DocumentRequest::Abstract(id.clone())),
            None => FetchOutcome::Failed {
                reason: "no Scopus ID specified".to_string(),
            },
        }
    }
}

fn scopus_ids(raw: &[&str]) -> Vec<Option<ScopusId>> {
    raw.iter().map(|id| Some(id.parse().unwrap())).collect()
}

#[test]
fn select_thirty_ids_in_batches() {
    let ids = (1..=30)
        .map(|n| Some(n.to_string().parse::<ScopusId>().unwrap()))
        .collect::<Vec<_>>();

    let first = select_batch(&ids, 1, 25).unwrap();
    assert_eq!(first, &ids[..25]);

    let second = select_batch(&ids, 2, 25).unwrap();
    assert_eq!(second.len(), 5);
    assert_eq!(second, &ids[25..]);

    assert!(select_batch(&ids, 3, 25).unwrap().is_empty());
}

#[test]
fn select_rejects_zero_arguments() {
    let ids = scopus_ids(&["1", "2"]);
    assert_matches!(
        select_batch(&ids, 0, 25),
        Err(HarvestError::InvalidBatchArgument {
            name: "batch_number",
            value: 0
        })
    );
    assert_matches!(
        select_batch(&ids, 1, 0),
        Err(HarvestError::InvalidBatchArgument {
            name: "batch_size",
            value: 0
        })
    );
}

#[test]
fn failure_in_the_middle_does_not_stop_the_batch() {
    let fetcher = ScriptedFetcher {
        fail: vec!["222"],
        ..ScriptedFetcher::default()
    };
    let batch = scopus_ids(&["111", "222", "333"]);

    let report = run_batch(&fetcher, &batch, 1, 3, &NoopSink);

    let calls = fetcher.calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            Some("111".to_string()),
            Some("222".to_string()),
            Some("333".to_string())
        ]
    );
    let states = report.items.iter().map(|item| item.state).collect::<Vec<_>>();
    assert_eq!(
        states,
        vec![ItemState::Fetched, ItemState::FetchFailed, ItemState::Fetched]
    );
    assert_eq!(report.fetched(), 2);
    assert_eq!(report.failed(), 1);
}

#[test]
fn absent_identifier_is_attempted_and_fails() {
    let fetcher = ScriptedFetcher::default();
    let batch = vec![Some("111".parse().unwrap()), None, Some("333".parse().unwrap())];

    let report = run_batch(&fetcher, &batch, 1, 25, &NoopSink);

    assert_eq!(fetcher.calls.lock().unwrap().len(), 3);
    assert_eq!(fetcher.calls.lock().unwrap()[1], None);
    assert_eq!(report.items[1].state, ItemState::FetchFailed);
    assert_matches!(
        &report.items[1].outcome,
        Some(FetchOutcome::Failed { reason }) if reason == "no Scopus ID specified"
    );
    assert_eq!(report.items[2].state, ItemState::Fetched);
}

#[test]
fn empty_batch_makes_no_calls() {
    let fetcher = ScriptedFetcher::default();
    let report = run_batch(&fetcher, &[], 3, 25, &NoopSink);
    assert!(report.items.is_empty());
    assert!(fetcher.calls.lock().unwrap().is_empty());
}
