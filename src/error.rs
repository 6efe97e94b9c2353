use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
    #[error("Timed out after {waited:?} waiting for selector {selector}")]
    SelectorTimeout { selector: String, waited: Duration },
    #[error("No document loaded in page")]
    NotLoaded,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
