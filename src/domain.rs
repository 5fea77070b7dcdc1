use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::HarvestError;

// `\d` is Unicode-aware, so both regexes accept the same digit set.
static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static DIGITS_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopusId(String);

impl ScopusId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScopusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ScopusId {
    type Err = HarvestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let trimmed = trimmed
            .strip_prefix("SCOPUS_ID:")
            .or_else(|| trimmed.strip_prefix("2-s2.0-"))
            .unwrap_or(trimmed);
        if !DIGITS_ONLY.is_match(trimmed) {
            return Err(HarvestError::InvalidScopusId(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

pub fn extract_scopus_id(raw: &str) -> Option<ScopusId> {
    DIGIT_RUN
        .find(raw)
        .map(|found| ScopusId(found.as_str().to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Abstract,
    Pii,
    Doi,
    Affiliation,
}

impl DocumentKind {
    pub fn dir_name(&self) -> &'static str {
        match self {
            DocumentKind::Abstract => "abstracts",
            DocumentKind::Pii => "fulltext-pii",
            DocumentKind::Doi => "fulltext-doi",
            DocumentKind::Affiliation => "affiliations",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Abstract => write!(f, "abstract"),
            DocumentKind::Pii => write!(f, "pii"),
            DocumentKind::Doi => write!(f, "doi"),
            DocumentKind::Affiliation => write!(f, "affiliation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentRequest {
    Abstract(ScopusId),
    Pii(String),
    Doi(String),
    Affiliation(String),
}

impl DocumentRequest {
    pub fn kind(&self) -> DocumentKind {
        match self {
            DocumentRequest::Abstract(_) => DocumentKind::Abstract,
            DocumentRequest::Pii(_) => DocumentKind::Pii,
            DocumentRequest::Doi(_) => DocumentKind::Doi,
            DocumentRequest::Affiliation(_) => DocumentKind::Affiliation,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            DocumentRequest::Abstract(id) => id.as_str(),
            DocumentRequest::Pii(pii) => pii,
            DocumentRequest::Doi(doi) => doi,
            DocumentRequest::Affiliation(id) => id,
        }
    }
}

impl fmt::Display for DocumentRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

impl FromStr for DocumentRequest {
    type Err = HarvestError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let (kind, rest) = trimmed
            .split_once(':')
            .ok_or_else(|| HarvestError::InvalidDocumentRequest(value.to_string()))?;
        let rest = rest.trim();
        if rest.is_empty() {
            return Err(HarvestError::InvalidDocumentRequest(value.to_string()));
        }
        match kind {
            "abstract" | "scopus" => Ok(DocumentRequest::Abstract(rest.parse()?)),
            "pii" => Ok(DocumentRequest::Pii(rest.to_string())),
            "doi" => Ok(DocumentRequest::Doi(rest.to_string())),
            "affiliation" | "affil" => {
                if !rest.chars().all(|ch| ch.is_ascii_digit()) {
                    return Err(HarvestError::InvalidDocumentRequest(value.to_string()));
                }
                Ok(DocumentRequest::Affiliation(rest.to_string()))
            }
            _ => Err(HarvestError::InvalidDocumentRequest(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub country: String,
    pub published_after: u16,
    pub subject_area: String,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            country: "thailand".to_string(),
            published_after: 2023,
            subject_area: "engi".to_string(),
        }
    }
}

impl SearchFilter {
    pub fn to_query(&self) -> String {
        format!(
            "AFFILCOUNTRY ( {} ) AND PUBYEAR > {} AND SUBJAREA ( {} )",
            self.country, self.published_after, self.subject_area
        )
    }
}
