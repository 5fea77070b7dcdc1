use camino::Utf8PathBuf;
use serde::Serialize;

use crate::domain::{DocumentRequest, ScopusId};
use crate::elsevier::DocumentClient;
use crate::store::{DocumentStore, FetchedDocument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    Fetched {
        title: Option<String>,
        path: Utf8PathBuf,
    },
    Failed {
        reason: String,
    },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Fetched { .. })
    }
}

pub trait DocumentFetcher {
    fn fetch(&self, request: &DocumentRequest) -> FetchOutcome;

    fn fetch_abstract(&self, scopus_id: Option<&ScopusId>) -> FetchOutcome {
        match scopus_id {
            Some(id) => self.fetch(&DocumentRequest::Abstract(id.clone())),
            None => FetchOutcome::Failed {
                reason: "no Scopus ID specified".to_string(),
            },
        }
    }
}

pub struct ElsevierFetcher<C: DocumentClient> {
    client: C,
    store: DocumentStore,
}

impl<C: DocumentClient> ElsevierFetcher<C> {
    pub fn new(client: C, store: DocumentStore) -> Self {
        Self { client, store }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }
}

impl<C: DocumentClient> DocumentFetcher for ElsevierFetcher<C> {
    fn fetch(&self, request: &DocumentRequest) -> FetchOutcome {
        let record = match self.client.read(request) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(document = %request, error = %err, "read document failed");
                return FetchOutcome::Failed {
                    reason: err.to_string(),
                };
            }
        };

        let document = FetchedDocument {
            kind: request.kind(),
            id: request.id().to_string(),
            title: record.title,
            source_url: record.source_url,
            fetched_at: chrono::Utc::now().to_rfc3339(),
            data: record.data,
        };
        match self.store.write(request, &document) {
            Ok(path) => {
                tracing::info!(document = %request, path = %path, "document saved");
                FetchOutcome::Fetched {
                    title: document.title,
                    path,
                }
            }
            Err(err) => {
                tracing::warn!(document = %request, error = %err, "write document failed");
                FetchOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}
