use std::time::{Duration, Instant};

use serde::Serialize;

use crate::batch::{BatchReport, run_batch, select_batch, validate_batch};
use crate::domain::DocumentRequest;
use crate::elsevier::{SearchClient, SearchOptions};
use crate::error::HarvestError;
use crate::fetch::{DocumentFetcher, FetchOutcome};
use crate::search::collect_scopus_ids;
use crate::store::IdStore;

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub query: String,
    pub collected: usize,
    pub missing: usize,
    pub store_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReadResult {
    pub document: String,
    pub outcome: FetchOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub search: Option<SearchResult>,
    pub batch: BatchReport,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub search: Option<SearchOptions>,
    pub batch_number: usize,
    pub batch_size: usize,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct App<S: SearchClient, F: DocumentFetcher> {
    store: IdStore,
    query: String,
    search: S,
    fetcher: F,
}

impl<S: SearchClient, F: DocumentFetcher> App<S, F> {
    pub fn new(store: IdStore, query: impl Into<String>, search: S, fetcher: F) -> Self {
        Self {
            store,
            query: query.into(),
            search,
            fetcher,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn search_and_store(
        &self,
        options: SearchOptions,
        sink: &dyn ProgressSink,
    ) -> Result<SearchResult, HarvestError> {
        let started = Instant::now();
        sink.event(ProgressEvent {
            message: format!("phase=Search; {}", self.query),
            elapsed: None,
        });
        let ids = collect_scopus_ids(&self.search, &self.query, options)?;
        self.store.write(&ids)?;
        sink.event(ProgressEvent {
            message: format!(
                "phase=Store; {} Scopus IDs saved to {}",
                ids.len(),
                self.store.path()
            ),
            elapsed: Some(started.elapsed()),
        });

        Ok(SearchResult {
            query: self.query.clone(),
            collected: ids.len(),
            missing: ids.iter().filter(|id| id.is_none()).count(),
            store_path: self.store.path().to_string(),
        })
    }

    pub fn fetch_batch(
        &self,
        batch_number: usize,
        batch_size: usize,
        sink: &dyn ProgressSink,
    ) -> Result<BatchReport, HarvestError> {
        // Reject bad arguments before touching the store.
        validate_batch(batch_number, batch_size)?;

        sink.event(ProgressEvent {
            message: format!("phase=Store; reading {}", self.store.path()),
            elapsed: None,
        });
        let ids = self.store.read()?;
        let batch = select_batch(&ids, batch_number, batch_size)?;
        sink.event(ProgressEvent {
            message: format!(
                "phase=Resolve; batch {batch_number} of size {batch_size}: {} of {} Scopus IDs",
                batch.len(),
                ids.len()
            ),
            elapsed: None,
        });

        Ok(run_batch(
            &self.fetcher,
            batch,
            batch_number,
            batch_size,
            sink,
        ))
    }

    pub fn read_document(&self, request: &DocumentRequest, sink: &dyn ProgressSink) -> ReadResult {
        let started = Instant::now();
        let outcome = self.fetcher.fetch(request);
        let message = match &outcome {
            FetchOutcome::Fetched { title, .. } => format!(
                "phase=Fetch; {request}: {}",
                title.as_deref().unwrap_or("(untitled)")
            ),
            FetchOutcome::Failed { reason } => format!("phase=Fetch; {request}: failed ({reason})"),
        };
        sink.event(ProgressEvent {
            message,
            elapsed: Some(started.elapsed()),
        });
        ReadResult {
            document: request.to_string(),
            outcome,
        }
    }

    pub fn run(&self, options: RunOptions, sink: &dyn ProgressSink) -> Result<RunResult, HarvestError> {
        let search = match options.search {
            Some(search_options) => Some(self.search_and_store(search_options, sink)?),
            None => None,
        };
        let batch = self.fetch_batch(options.batch_number, options.batch_size, sink)?;
        Ok(RunResult { search, batch })
    }
}
