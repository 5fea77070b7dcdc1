use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::Builder;

use crate::domain::{DocumentKind, DocumentRequest, ScopusId};
use crate::error::HarvestError;

#[derive(Debug, Clone)]
pub struct IdStore {
    path: Utf8PathBuf,
}

impl IdStore {
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn write(&self, ids: &[Option<ScopusId>]) -> Result<(), HarvestError> {
        let write_err = |message: String| HarvestError::StoreWrite {
            path: self.path.clone(),
            message,
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_str().is_empty() {
                fs::create_dir_all(parent.as_std_path())
                    .map_err(|err| write_err(err.to_string()))?;
            }
        }
        let content = serde_json::to_vec(ids).map_err(|err| write_err(err.to_string()))?;
        fs::write(self.path.as_std_path(), content).map_err(|err| write_err(err.to_string()))?;
        tracing::info!(count = ids.len(), path = %self.path, "identifier list saved");
        Ok(())
    }

    pub fn read(&self) -> Result<Vec<Option<ScopusId>>, HarvestError> {
        let read_err = |message: String| HarvestError::StoreRead {
            path: self.path.clone(),
            message,
        };
        let content =
            fs::read_to_string(self.path.as_std_path()).map_err(|err| read_err(err.to_string()))?;
        let ids: Vec<Option<ScopusId>> =
            serde_json::from_str(&content).map_err(|err| read_err(err.to_string()))?;
        tracing::debug!(count = ids.len(), path = %self.path, "identifier list loaded");
        Ok(ids)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedDocument {
    pub kind: DocumentKind,
    pub id: String,
    pub title: Option<String>,
    pub source_url: String,
    pub fetched_at: String,
    pub data: Value,
}

#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: Utf8PathBuf,
}

impl DocumentStore {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn document_path(&self, request: &DocumentRequest) -> Utf8PathBuf {
        self.root
            .join(request.kind().dir_name())
            .join(format!("{}.json", sanitize_file_name(request.id())))
    }

    pub fn write(
        &self,
        request: &DocumentRequest,
        document: &FetchedDocument,
    ) -> Result<Utf8PathBuf, HarvestError> {
        let path = self.document_path(request);
        let content = serde_json::to_vec_pretty(document)
            .map_err(|err| HarvestError::Filesystem(err.to_string()))?;
        write_bytes_atomic(&path, &content)?;
        Ok(path)
    }
}

pub fn write_bytes_atomic(path: &Utf8Path, content: &[u8]) -> Result<(), HarvestError> {
    let parent = path
        .parent()
        .ok_or_else(|| HarvestError::Filesystem("invalid destination path".to_string()))?;
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| HarvestError::Filesystem(err.to_string()))?;
    let mut temp = Builder::new()
        .prefix("scopus-harvest")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| HarvestError::Filesystem(err.to_string()))?;
    temp.write_all(content)
        .map_err(|err| HarvestError::Filesystem(err.to_string()))?;
    temp.persist(path.as_std_path())
        .map_err(|err| HarvestError::Filesystem(err.to_string()))?;
    Ok(())
}

fn sanitize_file_name(id: &str) -> String {
    id.chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_layout() {
        let store = DocumentStore::new("data");
        let abs = DocumentRequest::Abstract("85186352022".parse().unwrap());
        assert_eq!(
            store.document_path(&abs),
            Utf8PathBuf::from("data/abstracts/85186352022.json")
        );

        let doi = DocumentRequest::Doi("10.1016/S1525-1578(10)60571-5".to_string());
        assert_eq!(
            store.document_path(&doi),
            Utf8PathBuf::from("data/fulltext-doi/10.1016_S1525-1578(10)60571-5.json")
        );
    }
}
