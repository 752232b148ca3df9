//! Error types for the updater.
//!
//! Every pipeline stage returns a [`Result`]; nothing below `main` terminates
//! the process. Each [`UpdaterError`] variant names the stage that failed and
//! keeps the underlying cause as its source, and [`UpdaterError::kind`] sorts
//! failures into network, filesystem, and archive-format errors.

use crate::extraction::ExtractionError;
use crate::install::InstallError;
use crate::release::download::DownloadError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Broad classification of an [`UpdaterError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The command line was incomplete.
    Usage,
    /// A request failed in transport or returned a status of 400 or above.
    Network,
    /// A create, open, read, write, or remove operation failed.
    Filesystem,
    /// The archive was not a well-formed gzip-compressed tar stream.
    Archive,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Usage => "usage",
            Self::Network => "network",
            Self::Filesystem => "filesystem",
            Self::Archive => "archive",
        };
        f.write_str(label)
    }
}

/// Errors that can occur during an update run.
#[derive(Debug, Error)]
pub enum UpdaterError {
    /// No installation directory was given.
    #[error("no installation directory given; pass --goroot <DIR>")]
    MissingInstallDir,

    /// The latest-version lookup failed.
    #[error("failed to get latest version")]
    LatestVersion(#[source] DownloadError),

    /// The release archive could not be downloaded.
    #[error("failed getting download of {archive}")]
    Download {
        /// The archive filename that was requested.
        archive: String,
        /// The underlying download failure.
        #[source]
        source: DownloadError,
    },

    /// The scratch directory could not be created.
    #[error("failed to create scratch directory under {}", path.display())]
    ScratchDir {
        /// Directory the scratch directory was to be created in.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The downloaded archive could not be saved.
    #[error("failed to save archive to {}", path.display())]
    StoreArchive {
        /// Path the archive was to be written to.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The archive could not be unpacked.
    #[error("failed to extract archive")]
    Extraction(#[from] ExtractionError),

    /// The installation directory could not be replaced.
    #[error("failed to install release")]
    Install(#[from] InstallError),
}

impl UpdaterError {
    /// Classify this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use gup::error::{ErrorKind, UpdaterError};
    ///
    /// assert_eq!(UpdaterError::MissingInstallDir.kind(), ErrorKind::Usage);
    /// ```
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingInstallDir => ErrorKind::Usage,
            Self::LatestVersion(_) | Self::Download { .. } => ErrorKind::Network,
            Self::ScratchDir { .. } | Self::StoreArchive { .. } | Self::Install(_) => {
                ErrorKind::Filesystem
            }
            Self::Extraction(err) => {
                if err.is_format_error() {
                    ErrorKind::Archive
                } else {
                    ErrorKind::Filesystem
                }
            }
        }
    }
}

/// Result type alias using [`UpdaterError`].
pub type Result<T> = std::result::Result<T, UpdaterError>;
