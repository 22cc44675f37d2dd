//! Errors raised while talking to a source.

use thiserror::Error;

/// Any failure while fetching from a source. All of them abort the run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to {url} failed with HTTP status {status}")]
    Status { status: u16, url: String },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
