//! Updater configuration.
//!
//! [`UpdaterConfig`] gathers the fixed endpoints and naming conventions used by
//! every pipeline stage. It is built once at startup and passed by reference,
//! so tests can point the stages at a temporary root or a stub endpoint.

use camino::Utf8PathBuf;
use std::path::PathBuf;

/// Endpoint returning the bare version string of the newest release.
pub const LATEST_VERSION_URL: &str = "https://golang.org/VERSION";

/// Base URL that release archives are served from.
pub const DOWNLOAD_BASE_URL: &str = "https://dl.google.com/go/";

/// Prefix prepended to an explicit version when forming an archive name.
pub const ARCHIVE_PREFIX: &str = "go";

/// Platform suffix of every archive this updater fetches.
pub const PLATFORM_SUFFIX: &str = ".linux-amd64.tar.gz";

/// Top-level directory inside the release archive.
pub const EXTRACTED_ROOT: &str = "go";

/// Prefix of the per-run scratch directory.
pub const SCRATCH_PREFIX: &str = "gup";

/// Static configuration shared by all pipeline stages.
///
/// # Examples
///
/// ```
/// use gup::config::UpdaterConfig;
///
/// let config = UpdaterConfig::default();
/// assert_eq!(config.platform_suffix, ".linux-amd64.tar.gz");
/// assert!(config.download_base_url.ends_with('/'));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdaterConfig {
    /// URL queried when the `latest` release is requested.
    pub latest_url: String,
    /// Base URL the archive filename is appended to.
    pub download_base_url: String,
    /// Prefix for archive names built from an explicit version.
    pub archive_prefix: String,
    /// Suffix naming the archive's OS, architecture, and format.
    pub platform_suffix: String,
    /// Name of the directory the archive unpacks into.
    pub extracted_root: String,
    /// Prefix of the scratch directory name.
    pub scratch_prefix: String,
    /// Directory the scratch directory is created in.
    pub temp_root: PathBuf,
}

impl UpdaterConfig {
    /// Return a copy of this configuration rooted at `temp_root`.
    #[must_use]
    pub fn with_temp_root(mut self, temp_root: impl Into<PathBuf>) -> Self {
        self.temp_root = temp_root.into();
        self
    }

    /// Return a copy of this configuration fetching from other endpoints.
    #[must_use]
    pub fn with_endpoints(
        mut self,
        latest_url: impl Into<String>,
        download_base_url: impl Into<String>,
    ) -> Self {
        self.latest_url = latest_url.into();
        self.download_base_url = download_base_url.into();
        self
    }
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            latest_url: LATEST_VERSION_URL.to_owned(),
            download_base_url: DOWNLOAD_BASE_URL.to_owned(),
            archive_prefix: ARCHIVE_PREFIX.to_owned(),
            platform_suffix: PLATFORM_SUFFIX.to_owned(),
            extracted_root: EXTRACTED_ROOT.to_owned(),
            scratch_prefix: SCRATCH_PREFIX.to_owned(),
            temp_root: std::env::temp_dir(),
        }
    }
}

/// Per-run values supplied on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    /// Which release to install.
    pub selector: crate::release::version::VersionSelector,
    /// Installation directory to replace.
    pub install_dir: Option<Utf8PathBuf>,
}
