use assert_matches::assert_matches;

use scopus_harvest::domain::{DocumentKind, DocumentRequest, ScopusId, extract_scopus_id};
use scopus_harvest::error::HarvestError;

#[test]
fn extract_from_scopus_identifier() {
    let id = extract_scopus_id("SCOPUS_ID:85186352022").unwrap();
    assert_eq!(id, "85186352022".parse::<ScopusId>().unwrap());
}

#[test]
fn extract_returns_first_of_several_runs() {
    let id = extract_scopus_id("urn:42:scopus:85186352022").unwrap();
    assert_eq!(id.as_str(), "42");
}

#[test]
fn extract_without_digits() {
    assert_eq!(extract_scopus_id("SCOPUS_ID:unknown"), None);
}

#[test]
fn parse_document_requests() {
    let abs: DocumentRequest = "abstract:85186352022".parse().unwrap();
    assert_eq!(abs.kind(), DocumentKind::Abstract);
    assert_eq!(abs.to_string(), "abstract:85186352022");

    let pii: DocumentRequest = "pii:S1674927814000082".parse().unwrap();
    assert_eq!(pii.id(), "S1674927814000082");

    let affil: DocumentRequest = "affiliation:60101411".parse().unwrap();
    assert_eq!(affil.kind(), DocumentKind::Affiliation);
}

#[test]
fn parse_document_request_invalid() {
    assert_matches!(
        "abstract:abc".parse::<DocumentRequest>(),
        Err(HarvestError::InvalidScopusId(_))
    );
    assert_matches!(
        "85186352022".parse::<DocumentRequest>(),
        Err(HarvestError::InvalidDocumentRequest(_))
    );
    assert_matches!(
        "affiliation:Chulalongkorn".parse::<DocumentRequest>(),
        Err(HarvestError::InvalidDocumentRequest(_))
    );
}
