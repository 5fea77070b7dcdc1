use std::time::Instant;

use serde::Serialize;

use crate::app::{ProgressEvent, ProgressSink};
use crate::domain::ScopusId;
use crate::error::HarvestError;
use crate::fetch::{DocumentFetcher, FetchOutcome};

pub fn select_batch<T>(
    items: &[T],
    batch_number: usize,
    batch_size: usize,
) -> Result<&[T], HarvestError> {
    validate_batch(batch_number, batch_size)?;

    let start = (batch_number - 1)
        .saturating_mul(batch_size)
        .min(items.len());
    let end = batch_number.saturating_mul(batch_size).min(items.len());
    tracing::info!(
        batch_number,
        batch_size,
        total = items.len(),
        selected = end - start,
        "batch selected"
    );
    Ok(&items[start..end])
}

pub fn validate_batch(batch_number: usize, batch_size: usize) -> Result<(), HarvestError> {
    if batch_number < 1 {
        return Err(HarvestError::InvalidBatchArgument {
            name: "batch_number",
            value: batch_number,
        });
    }
    if batch_size < 1 {
        return Err(HarvestError::InvalidBatchArgument {
            name: "batch_size",
            value: batch_size,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    Pending,
    Fetched,
    FetchFailed,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub scopus_id: Option<ScopusId>,
    pub state: ItemState,
    pub outcome: Option<FetchOutcome>,
}

impl BatchItem {
    fn pending(scopus_id: Option<ScopusId>) -> Self {
        Self {
            scopus_id,
            state: ItemState::Pending,
            outcome: None,
        }
    }

    fn finish(&mut self, outcome: FetchOutcome) {
        self.state = if outcome.is_success() {
            ItemState::Fetched
        } else {
            ItemState::FetchFailed
        };
        self.outcome = Some(outcome);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub batch_number: usize,
    pub batch_size: usize,
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn fetched(&self) -> usize {
        self.count(ItemState::Fetched)
    }

    pub fn failed(&self) -> usize {
        self.count(ItemState::FetchFailed)
    }

    fn count(&self, state: ItemState) -> usize {
        self.items.iter().filter(|item| item.state == state).count()
    }
}

pub fn run_batch<F: DocumentFetcher + ?Sized>(
    fetcher: &F,
    batch: &[Option<ScopusId>],
    batch_number: usize,
    batch_size: usize,
    sink: &dyn ProgressSink,
) -> BatchReport {
    let mut items = batch
        .iter()
        .cloned()
        .map(BatchItem::pending)
        .collect::<Vec<_>>();
    let total = items.len();

    for (index, item) in items.iter_mut().enumerate() {
        let started = Instant::now();
        let outcome = fetcher.fetch_abstract(item.scopus_id.as_ref());
        let label = item
            .scopus_id
            .as_ref()
            .map(|id| id.as_str())
            .unwrap_or("<none>");
        let message = match &outcome {
            FetchOutcome::Fetched { title, .. } => {
                tracing::info!(scopus_id = label, title = title.as_deref(), "abstract fetched");
                format!(
                    "phase=Fetch; [{}/{total}] {label}: {}",
                    index + 1,
                    title.as_deref().unwrap_or("(untitled)")
                )
            }
            FetchOutcome::Failed { reason } => {
                tracing::warn!(scopus_id = label, reason = %reason, "read document failed");
                format!("phase=Fetch; [{}/{total}] {label}: failed ({reason})", index + 1)
            }
        };
        sink.event(ProgressEvent {
            message,
            elapsed: Some(started.elapsed()),
        });
        item.finish(outcome);
    }

    BatchReport {
        batch_number,
        batch_size,
        items,
    }
}
