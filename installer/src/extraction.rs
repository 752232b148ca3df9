//! Release archive extraction.
//!
//! Unpacks a `.tar.gz` release archive one entry at a time, in stream order.
//! Directories and regular files are materialised under the destination;
//! every other entry type (symlinks, hard links, devices, FIFOs, metadata
//! records) is skipped. Entry paths that would escape the destination are
//! rejected.

use flate2::read::MultiGzDecoder;
use log::{debug, trace};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Component, Path, PathBuf};
use tar::{EntryType, Header};

/// Mode used for directories created during extraction.
pub const EXTRACTED_DIR_MODE: u32 = 0o755;

const COPY_BUFFER_LEN: usize = 8192;

/// How a single archive entry is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Ensure the directory exists.
    Directory,
    /// Write the entry's bytes to a file with the declared mode.
    File {
        /// Permission bits declared in the entry header.
        mode: u32,
    },
    /// Any other entry type; skipped.
    Other(EntryType),
}

impl EntryKind {
    /// Classify an entry from its header.
    ///
    /// # Errors
    ///
    /// Returns an error if a regular file's mode field is malformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use gup::extraction::EntryKind;
    /// use tar::{EntryType, Header};
    ///
    /// let mut header = Header::new_gnu();
    /// header.set_entry_type(EntryType::Symlink);
    /// assert_eq!(
    ///     EntryKind::from_header(&header).expect("valid header"),
    ///     EntryKind::Other(EntryType::Symlink)
    /// );
    /// ```
    pub fn from_header(header: &Header) -> io::Result<Self> {
        let kind = match header.entry_type() {
            EntryType::Directory => Self::Directory,
            EntryType::Regular => Self::File {
                mode: header.mode()?,
            },
            other => Self::Other(other),
        };
        Ok(kind)
    }
}

/// Counts of what an extraction produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Directory entries processed.
    pub directories: usize,
    /// Regular files written.
    pub files: usize,
    /// Entries skipped because of their type.
    pub skipped: usize,
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The archive file could not be opened.
    #[error("could not open archive {}", path.display())]
    Open {
        /// Path of the archive.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The compressed entry stream was malformed or could not be read.
    #[error("failed to read entry in archive")]
    Stream {
        /// The underlying decoding error.
        #[source]
        source: io::Error,
    },

    /// A directory entry could not be created.
    #[error("failed to make directory {}", path.display())]
    CreateDirectory {
        /// The directory path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A file entry could not be written.
    #[error("failed to write file {}", path.display())]
    WriteFile {
        /// The file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// An entry path is absolute or climbs out of the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },
}

impl ExtractionError {
    /// Return true when the archive itself is at fault rather than the
    /// filesystem.
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(self, Self::Stream { .. } | Self::PathTraversal { .. })
    }
}

/// Extract the `.tar.gz` archive at `archive_path` into `dest_dir`.
///
/// Entries are processed lazily in stream order; the first failure aborts
/// the whole extraction.
///
/// # Errors
///
/// Returns an [`ExtractionError`] naming the failing path or stream.
pub fn extract_archive(
    archive_path: &Path,
    dest_dir: &Path,
) -> Result<ExtractionSummary, ExtractionError> {
    let file = fs::File::open(archive_path).map_err(|source| ExtractionError::Open {
        path: archive_path.to_path_buf(),
        source,
    })?;
    extract_from_reader(MultiGzDecoder::new(file), dest_dir)
}

/// Extract a gzip-decoded tar stream read from `reader` into `dest_dir`.
///
/// Callers decoding gzip must read every member (see [`MultiGzDecoder`]);
/// a decoder that stops after the first member truncates the tar stream.
///
/// # Errors
///
/// Returns an [`ExtractionError`] naming the failing path or stream.
pub fn extract_from_reader<R: Read>(
    reader: R,
    dest_dir: &Path,
) -> Result<ExtractionSummary, ExtractionError> {
    let mut archive = tar::Archive::new(reader);
    let mut summary = ExtractionSummary::default();
    let entries = archive
        .entries()
        .map_err(|source| ExtractionError::Stream { source })?;

    for entry_result in entries {
        let mut entry = entry_result.map_err(|source| ExtractionError::Stream { source })?;
        let entry_path = entry
            .path()
            .map_err(|source| ExtractionError::Stream { source })?
            .into_owned();
        let kind = EntryKind::from_header(entry.header())
            .map_err(|source| ExtractionError::Stream { source })?;

        if let EntryKind::Other(entry_type) = kind {
            debug!(
                "skipping {entry_type:?} entry {} in archive",
                entry_path.display()
            );
            summary.skipped += 1;
            continue;
        }

        validate_entry_path(&entry_path)?;
        let target = dest_dir.join(&entry_path);

        match kind {
            EntryKind::Directory => {
                ensure_directory(&target)?;
                summary.directories += 1;
            }
            EntryKind::File { mode } => {
                write_file_entry(&mut entry, &target, mode)?;
                summary.files += 1;
            }
            EntryKind::Other(_) => {}
        }
    }

    debug!(
        "extracted {} directories and {} files, skipped {} entries",
        summary.directories, summary.files, summary.skipped
    );
    Ok(summary)
}

/// Validate that a tar entry path does not escape the destination
/// directory via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractionError> {
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|component| matches!(component, Component::ParentDir | Component::RootDir));
    if escapes {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

fn ensure_directory(target: &Path) -> Result<(), ExtractionError> {
    if target.exists() {
        return Ok(());
    }
    create_dir_all_with_mode(target).map_err(|source| ExtractionError::CreateDirectory {
        path: target.to_path_buf(),
        source,
    })
}

fn write_file_entry(
    entry: &mut impl Read,
    target: &Path,
    mode: u32,
) -> Result<(), ExtractionError> {
    let write_error = |source| ExtractionError::WriteFile {
        path: target.to_path_buf(),
        source,
    };

    if let Some(parent) = target.parent() {
        if !parent.exists() {
            create_dir_all_with_mode(parent).map_err(|source| {
                ExtractionError::CreateDirectory {
                    path: parent.to_path_buf(),
                    source,
                }
            })?;
        }
    }

    trace!("writing {} with mode {mode:o}", target.display());
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    let mut file = options.open(target).map_err(write_error)?;

    // Not `io::copy`: read failures are archive faults, write failures are not.
    let mut buffer = [0u8; COPY_BUFFER_LEN];
    loop {
        let bytes_read = entry
            .read(&mut buffer)
            .map_err(|source| ExtractionError::Stream { source })?;
        let Some(chunk) = buffer.get(..bytes_read).filter(|chunk| !chunk.is_empty()) else {
            break;
        };
        file.write_all(chunk).map_err(write_error)?;
    }
    file.flush().map_err(write_error)
}

fn create_dir_all_with_mode(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(EXTRACTED_DIR_MODE);
    }
    builder.create(path)
}

#[cfg(test)]
#[path = "extraction_tests.rs"]
mod tests;
