use thiserror::Error;

use crate::remote::error::FetchError;

#[derive(Error, Debug)]
pub enum ArchiefError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid bootstrap data: {0}")]
    Bootstrap(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid form: {0}")]
    InvalidForm(String),

    #[error("zaak '{0}' not found in the loaded set")]
    ZaakNotFound(String),

    #[error("zaak '{0}' is not available for selection")]
    ZaakUnavailable(String),

    #[error("no zaken selected")]
    NothingSelected,

    #[error("failed to load zaken: {}", .0.join("; "))]
    LoadFailed(Vec<String>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ArchiefError>;
