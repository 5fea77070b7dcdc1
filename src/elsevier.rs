use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;

use crate::config::HarvestConfig;
use crate::domain::DocumentRequest;
use crate::error::HarvestError;

pub const ELSEVIER_BASE: &str = "https://api.elsevier.com/content";

// Scopus refuses to page past this many results without a cursor.
pub const SCOPUS_RESULT_CEILING: usize = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub get_all: bool,
    pub count: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            get_all: false,
            count: crate::config::DEFAULT_SEARCH_COUNT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentRecord {
    pub title: Option<String>,
    pub source_url: String,
    pub data: Value,
}

pub trait SearchClient: Send + Sync {
    fn search(&self, query: &str, options: SearchOptions) -> Result<Vec<Value>, HarvestError>;
}

pub trait DocumentClient: Send + Sync {
    fn read(&self, request: &DocumentRequest) -> Result<DocumentRecord, HarvestError>;
}

#[derive(Clone)]
pub struct ElsevierHttpClient {
    client: Client,
    base_url: Url,
}

impl ElsevierHttpClient {
    pub fn new(config: &HarvestConfig) -> Result<Self, HarvestError> {
        Self::with_base_url(config, ELSEVIER_BASE)
    }

    pub fn with_base_url(config: &HarvestConfig, base_url: &str) -> Result<Self, HarvestError> {
        let api_key = config.require_api_key()?;
        let base_url = Url::parse(base_url)
            .map_err(|err| HarvestError::ElsevierHttp(format!("invalid base URL {base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(HarvestError::ElsevierHttp(format!(
                "invalid base URL {base_url}: not a hierarchical URL"
            )));
        }
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("scopus-harvest/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| HarvestError::ElsevierHttp(err.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|err| HarvestError::ElsevierHttp(err.to_string()))?;
        key.set_sensitive(true);
        headers.insert("X-ELS-APIKey", key);
        if let Some(token) = config.inst_token.as_deref() {
            let mut token = HeaderValue::from_str(token)
                .map_err(|err| HarvestError::ElsevierHttp(err.to_string()))?;
            token.set_sensitive(true);
            headers.insert("X-ELS-Insttoken", token);
        }
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|err| HarvestError::ElsevierHttp(err.to_string()))?;
        Ok(Self { client, base_url })
    }

    pub fn document_url(&self, request: &DocumentRequest) -> Url {
        let route = match request {
            DocumentRequest::Abstract(_) => ["abstract", "scopus_id"],
            DocumentRequest::Pii(_) => ["article", "pii"],
            DocumentRequest::Doi(_) => ["article", "doi"],
            DocumentRequest::Affiliation(_) => ["affiliation", "affiliation_id"],
        };
        // DOIs keep their `/` separators; everything else in a segment is escaped.
        self.endpoint(route.into_iter().chain(request.id().split('/')))
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get_json(&self, request: reqwest::blocking::RequestBuilder) -> Result<Value, HarvestError> {
        let response = request
            .send()
            .map_err(|err| HarvestError::ElsevierHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        response
            .json()
            .map_err(|err| HarvestError::ElsevierResponse(err.to_string()))
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, HarvestError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "Elsevier request failed".to_string());
        Err(HarvestError::ElsevierStatus { status, message })
    }
}

impl SearchClient for ElsevierHttpClient {
    fn search(&self, query: &str, options: SearchOptions) -> Result<Vec<Value>, HarvestError> {
        let url = self.endpoint(["search", "scopus"]);
        let count = options.count.to_string();
        let body = self.get_json(
            self.client
                .get(url)
                .query(&[("query", query), ("count", count.as_str())]),
        )?;
        let mut page = SearchPage::parse(&body)?;
        let total = page.total;
        let mut results = std::mem::take(&mut page.entries);
        tracing::info!(total, received = results.len(), "scopus search executed");

        if options.get_all {
            while results.len() < total && results.len() < SCOPUS_RESULT_CEILING {
                let Some(next) = page.next.take() else {
                    break;
                };
                let body = self.get_json(self.client.get(&next))?;
                page = SearchPage::parse(&body)?;
                if page.entries.is_empty() {
                    break;
                }
                results.append(&mut page.entries);
                tracing::debug!(received = results.len(), total, "scopus search page");
            }
        }

        Ok(results)
    }
}

impl DocumentClient for ElsevierHttpClient {
    fn read(&self, request: &DocumentRequest) -> Result<DocumentRecord, HarvestError> {
        let url = self.document_url(request);
        let data = self.get_json(self.client.get(url.clone()))?;
        let title = document_title(request, &data);
        Ok(DocumentRecord {
            title,
            source_url: url.to_string(),
            data,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub total: usize,
    pub entries: Vec<Value>,
    pub next: Option<String>,
}

impl SearchPage {
    pub fn parse(body: &Value) -> Result<Self, HarvestError> {
        let results = body.get("search-results").ok_or_else(|| {
            HarvestError::ElsevierResponse("missing search-results object".to_string())
        })?;

        let total = match results.get("opensearch:totalResults") {
            Some(Value::String(value)) => value.parse().map_err(|_| {
                HarvestError::ElsevierResponse(format!("invalid totalResults {value:?}"))
            })?,
            Some(Value::Number(value)) => value.as_u64().unwrap_or(0) as usize,
            _ => 0,
        };

        // An empty result set comes back as a single entry carrying only an error.
        let entries = results
            .get("entry")
            .and_then(|value| value.as_array())
            .map(|array| {
                array
                    .iter()
                    .filter(|entry| entry.get("error").is_none())
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();

        let next = results
            .get("link")
            .and_then(|value| value.as_array())
            .and_then(|links| {
                links.iter().find(|link| {
                    link.get("@ref").and_then(|value| value.as_str()) == Some("next")
                })
            })
            .and_then(|link| link.get("@href"))
            .and_then(|value| value.as_str())
            .map(|value| value.to_string());

        Ok(Self {
            total,
            entries,
            next,
        })
    }
}

pub fn document_title(request: &DocumentRequest, data: &Value) -> Option<String> {
    let title = match request {
        DocumentRequest::Abstract(_) => data
            .get("abstracts-retrieval-response")
            .and_then(|value| value.get("coredata"))
            .and_then(|value| value.get("dc:title")),
        DocumentRequest::Pii(_) | DocumentRequest::Doi(_) => data
            .get("full-text-retrieval-response")
            .and_then(|value| value.get("coredata"))
            .and_then(|value| value.get("dc:title")),
        DocumentRequest::Affiliation(_) => data
            .get("affiliation-retrieval-response")
            .and_then(|value| value.get("affiliation-name")),
    };
    title
        .and_then(|value| value.as_str())
        .map(|value| value.trim().to_string())
}
