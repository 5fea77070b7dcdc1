use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum HarvestError {
    #[error("invalid batch argument: {name} should be greater than 0 (got {value})")]
    InvalidBatchArgument { name: &'static str, value: usize },

    #[error("invalid Scopus ID: {0}")]
    InvalidScopusId(String),

    #[error("invalid document request: {0}")]
    InvalidDocumentRequest(String),

    #[error("missing Elsevier API key (set ELSEVIER_API_KEY or api_key in scopus-harvest.json)")]
    MissingApiKey,

    #[error("failed to read config file at {0}")]
    ConfigRead(Utf8PathBuf),

    #[error("failed to parse config: {0}")]
    ConfigParse(String),

    #[error("failed to read identifier store {path}: {message}")]
    StoreRead { path: Utf8PathBuf, message: String },

    #[error("failed to write identifier store {path}: {message}")]
    StoreWrite { path: Utf8PathBuf, message: String },

    #[error("Elsevier request failed: {0}")]
    ElsevierHttp(String),

    #[error("Elsevier returned status {status}: {message}")]
    ElsevierStatus { status: u16, message: String },

    #[error("unexpected Elsevier response: {0}")]
    ElsevierResponse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
