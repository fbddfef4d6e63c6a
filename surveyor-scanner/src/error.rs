use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Navigation blocked: {0}")]
    NavigationBlocked(String),

    #[error("No page loaded in session")]
    NoPage,

    #[error("No element matched selector: {0}")]
    NoMatch(String),

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
