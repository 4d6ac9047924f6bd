use std::path::PathBuf;
use thiserror::Error;

/// Failure taxonomy for the scraping pipeline.
///
/// Soft failures (optional interstitials, optional guarantee boxes) never
/// reach this enum: the action layer reports them as `bool`/`Option` and the
/// caller degrades locally. Only required-step failures escalate here.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("webdriver error: {0}")]
    WebDriver(String),

    #[error("login failed: {0}")]
    LoginFailed(String),

    #[error("navigation step failed: {0}")]
    Navigation(String),

    #[error("required form field failed: {0}")]
    FormField(String),

    #[error("price parse failed: {0}")]
    Parse(String),

    #[error("destination file is locked or not writable: {0}")]
    StoreLocked(PathBuf),

    #[error("table error: {0}")]
    Table(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// True when the failure aborts the whole batch rather than one record.
    pub fn is_fatal_to_batch(&self) -> bool {
        matches!(self, ScrapeError::WebDriver(_) | ScrapeError::LoginFailed(_))
    }
}

impl From<fantoccini::error::CmdError> for ScrapeError {
    fn from(err: fantoccini::error::CmdError) -> Self {
        ScrapeError::WebDriver(err.to_string())
    }
}

impl From<fantoccini::error::NewSessionError> for ScrapeError {
    fn from(err: fantoccini::error::NewSessionError) -> Self {
        ScrapeError::WebDriver(err.to_string())
    }
}
