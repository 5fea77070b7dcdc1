use serde_json::Value;

use crate::domain::{ScopusId, extract_scopus_id};
use crate::elsevier::{SearchClient, SearchOptions};
use crate::error::HarvestError;

pub const IDENTIFIER_FIELD: &str = "dc:identifier";

// Entries without a usable `dc:identifier` stay as `None` to keep result order.
pub fn collect_scopus_ids<S: SearchClient + ?Sized>(
    client: &S,
    query: &str,
    options: SearchOptions,
) -> Result<Vec<Option<ScopusId>>, HarvestError> {
    let entries = client.search(query, options)?;
    tracing::info!(results = entries.len(), "search returned entries");

    let ids = entries.iter().map(entry_scopus_id).collect::<Vec<_>>();
    let missing = ids.iter().filter(|id| id.is_none()).count();
    if missing > 0 {
        tracing::warn!(missing, "search entries without a Scopus ID");
    }
    Ok(ids)
}

fn entry_scopus_id(entry: &Value) -> Option<ScopusId> {
    entry
        .get(IDENTIFIER_FIELD)
        .and_then(|value| value.as_str())
        .and_then(extract_scopus_id)
}
