//! Release selection and archive naming.
//!
//! Turns the `--version` selector into the archive filename that fully
//! determines the download URL. Explicit versions are not validated; a
//! malformed value simply produces a URL that fails to download.

use super::download::{DownloadError, ReleaseClient};
use crate::config::UpdaterConfig;
use log::debug;
use std::fmt;

/// Selector value that requests the newest published release.
pub const LATEST_SELECTOR: &str = "latest";

/// Which release to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    /// Look the version up from the latest-version endpoint.
    Latest,
    /// Use the given version string as-is (e.g. `1.21.0`).
    Explicit(String),
}

impl From<&str> for VersionSelector {
    fn from(value: &str) -> Self {
        if value == LATEST_SELECTOR {
            Self::Latest
        } else {
            Self::Explicit(value.to_owned())
        }
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST_SELECTOR),
            Self::Explicit(version) => f.write_str(version),
        }
    }
}

/// A resolved release archive filename, e.g. `go1.21.0.linux-amd64.tar.gz`.
///
/// # Examples
///
/// ```
/// use gup::config::UpdaterConfig;
/// use gup::release::version::ArchiveName;
///
/// let config = UpdaterConfig::default();
/// let name = ArchiveName::for_version(&config, "1.21.0");
/// assert_eq!(name.as_str(), "go1.21.0.linux-amd64.tar.gz");
/// assert_eq!(
///     name.download_url(&config.download_base_url),
///     "https://dl.google.com/go/go1.21.0.linux-amd64.tar.gz"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName(String);

impl ArchiveName {
    /// Build the archive name for an explicit version string.
    #[must_use]
    pub fn for_version(config: &UpdaterConfig, version: &str) -> Self {
        Self(format!(
            "{}{version}{}",
            config.archive_prefix, config.platform_suffix
        ))
    }

    /// Build the archive name from a latest-version response body.
    ///
    /// The body already carries the `go` prefix and is used verbatim.
    #[must_use]
    pub fn from_latest_body(config: &UpdaterConfig, body: &str) -> Self {
        Self(format!("{body}{}", config.platform_suffix))
    }

    /// Return the filename.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the URL the archive is downloaded from.
    #[must_use]
    pub fn download_url(&self, base_url: &str) -> String {
        format!("{base_url}{}", self.0)
    }
}

impl fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve `selector` into an archive filename.
///
/// Only [`VersionSelector::Latest`] touches the network.
///
/// # Errors
///
/// Returns the [`DownloadError`] from the latest-version lookup when the
/// endpoint is unreachable or answers with a status of 400 or above.
pub fn resolve_archive_name(
    selector: &VersionSelector,
    config: &UpdaterConfig,
    client: &dyn ReleaseClient,
) -> Result<ArchiveName, DownloadError> {
    match selector {
        VersionSelector::Explicit(version) => Ok(ArchiveName::for_version(config, version)),
        VersionSelector::Latest => {
            debug!("querying latest release from {}", config.latest_url);
            let body = client.latest_version(&config.latest_url)?;
            Ok(ArchiveName::from_latest_body(config, &body))
        }
    }
}
