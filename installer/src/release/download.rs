//! Release downloads over HTTP.
//!
//! Provides a trait-based abstraction over the two requests the updater
//! makes (the latest-version lookup and the archive download), so tests can
//! stub the network entirely.

use log::{debug, trace};
use std::io::Read;

/// Status codes at or above this value are treated as failures.
pub const HTTP_ERROR_THRESHOLD: u16 = 400;

/// Trait for fetching release metadata and archives.
///
/// # Examples
///
/// ```
/// use gup::release::download::HttpReleaseClient;
///
/// let client = HttpReleaseClient::new();
/// // Use client.download("https://dl.google.com/go/go1.21.0.linux-amd64.tar.gz")
/// // in production.
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ReleaseClient {
    /// Fetch the body of the latest-version endpoint at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a status of 400 or above.
    fn latest_version(&self, url: &str) -> Result<String, DownloadError>;

    /// Fetch the archive at `url`, buffering the whole body in memory.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a status of 400 or above.
    fn download(&self, url: &str) -> Result<Vec<u8>, DownloadError>;
}

/// Errors arising from release download operations.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The server answered with a failure status.
    #[error("request to {url} failed with HTTP status {status}")]
    HttpStatus {
        /// The URL that was requested.
        url: String,
        /// The status code returned.
        status: u16,
    },

    /// The request could not be completed.
    #[error("request to {url} failed: {reason}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// The response body could not be read.
    #[error("failed to read response body from {url}")]
    Body {
        /// The URL that was requested.
        url: String,
        /// The underlying read error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Return the HTTP status code when the failure was a status response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Body { .. } => None,
        }
    }
}

/// HTTP-based client using `ureq` with default agent settings.
pub struct HttpReleaseClient {
    agent: ureq::Agent,
}

impl HttpReleaseClient {
    /// Create a client with the default agent configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
        }
    }

    fn get(&self, url: &str) -> Result<ureq::http::Response<ureq::Body>, DownloadError> {
        debug!("GET {url}");
        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| map_ureq_error(url, &e))?;
        let status = response.status().as_u16();
        trace!("GET {url} answered {status}");
        // Agents configured not to raise status errors still land here.
        if status >= HTTP_ERROR_THRESHOLD {
            return Err(DownloadError::HttpStatus {
                url: url.to_owned(),
                status,
            });
        }
        Ok(response)
    }
}

impl Default for HttpReleaseClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ReleaseClient for HttpReleaseClient {
    fn latest_version(&self, url: &str) -> Result<String, DownloadError> {
        let mut body = String::new();
        self.get(url)?
            .into_body()
            .as_reader()
            .read_to_string(&mut body)
            .map_err(|source| DownloadError::Body {
                url: url.to_owned(),
                source,
            })?;
        Ok(body)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let mut payload = Vec::new();
        self.get(url)?
            .into_body()
            .as_reader()
            .read_to_end(&mut payload)
            .map_err(|source| DownloadError::Body {
                url: url.to_owned(),
                source,
            })?;
        debug!("downloaded {} bytes from {url}", payload.len());
        Ok(payload)
    }
}

/// Map a ureq error to a [`DownloadError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> DownloadError {
    match err {
        ureq::Error::StatusCode(status) => DownloadError::HttpStatus {
            url: url.to_owned(),
            status: *status,
        },
        other => DownloadError::Transport {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}
