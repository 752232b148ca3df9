//! Installation directory replacement.
//!
//! The installation directory is never merged: it is removed outright,
//! recreated empty, and filled with a copy of the extracted release tree.
//! There is no atomic swap, so a failure part-way through the copy leaves a
//! partial installation behind.

use log::{debug, trace};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Mode of the recreated installation directory and its subdirectories.
pub const INSTALL_DIR_MODE: u32 = 0o755;

/// Mode every installed file is written with.
pub const INSTALLED_FILE_MODE: u32 = 0o777;

/// Counts of what an installation wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstallSummary {
    /// Directories created below the installation root.
    pub directories: usize,
    /// Files copied.
    pub files: usize,
}

/// Errors raised while replacing the installation directory.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The extracted tree to install from does not exist.
    #[error("extracted release tree {} is missing", path.display())]
    MissingSource {
        /// The expected source root.
        path: PathBuf,
    },

    /// The old installation could not be removed.
    #[error("failed to remove existing installation {}", path.display())]
    Remove {
        /// The installation directory.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The installation directory could not be recreated.
    #[error("failed to create installation directory {}", path.display())]
    Create {
        /// The installation directory.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The extracted tree could not be traversed.
    #[error("failed to walk {}", path.display())]
    Walk {
        /// The path being visited when traversal failed.
        path: PathBuf,
        /// The underlying traversal error.
        #[source]
        source: walkdir::Error,
    },

    /// A directory or file could not be copied into place.
    #[error("failed to copy {} into {}", from.display(), to.display())]
    Copy {
        /// Source path inside the extracted tree.
        from: PathBuf,
        /// Destination path inside the installation directory.
        to: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Replace `install_dir` with a copy of `source_root`.
///
/// The source tree is visited in lexical order. Directories are recreated
/// with [`INSTALL_DIR_MODE`]; every other entry is read whole and written
/// with [`INSTALLED_FILE_MODE`].
///
/// # Errors
///
/// Returns an [`InstallError`] for the first step that fails. Nothing is
/// removed when `source_root` is missing.
pub fn replace_installation(
    source_root: &Path,
    install_dir: &Path,
) -> Result<InstallSummary, InstallError> {
    if !source_root.is_dir() {
        return Err(InstallError::MissingSource {
            path: source_root.to_path_buf(),
        });
    }

    remove_existing(install_dir)?;
    create_install_dir(install_dir)?;

    let mut summary = InstallSummary::default();
    for entry in WalkDir::new(source_root).sort_by_file_name() {
        let entry = entry.map_err(|source| InstallError::Walk {
            path: source
                .path()
                .map_or_else(|| source_root.to_path_buf(), Path::to_path_buf),
            source,
        })?;
        let Ok(relative) = entry.path().strip_prefix(source_root) else {
            continue;
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let target = install_dir.join(relative);
        let copy_error = |source| InstallError::Copy {
            from: entry.path().to_path_buf(),
            to: target.clone(),
            source,
        };
        if entry.file_type().is_dir() {
            trace!("creating directory {}", target.display());
            create_dir_with_mode(&target).map_err(copy_error)?;
            summary.directories += 1;
        } else {
            trace!("copying {} to {}", entry.path().display(), target.display());
            copy_file(entry.path(), &target).map_err(copy_error)?;
            summary.files += 1;
        }
    }

    debug!(
        "installed {} directories and {} files into {}",
        summary.directories,
        summary.files,
        install_dir.display()
    );
    Ok(summary)
}

fn remove_existing(install_dir: &Path) -> Result<(), InstallError> {
    let remove_error = |source| InstallError::Remove {
        path: install_dir.to_path_buf(),
        source,
    };
    let metadata = match fs::symlink_metadata(install_dir) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!("{} does not exist; nothing to remove", install_dir.display());
            return Ok(());
        }
        Err(err) => return Err(remove_error(err)),
    };

    debug!("removing {}", install_dir.display());
    if metadata.is_dir() {
        fs::remove_dir_all(install_dir).map_err(remove_error)
    } else {
        fs::remove_file(install_dir).map_err(remove_error)
    }
}

fn create_install_dir(install_dir: &Path) -> Result<(), InstallError> {
    create_dir_with_mode(install_dir).map_err(|source| InstallError::Create {
        path: install_dir.to_path_buf(),
        source,
    })
}

// Non-recursive: a missing parent or a path that reappeared is an error.
fn create_dir_with_mode(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(INSTALL_DIR_MODE);
    }
    builder.create(path)
}

fn copy_file(from: &Path, to: &Path) -> io::Result<()> {
    let contents = fs::read(from)?;
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(INSTALLED_FILE_MODE);
    }
    let mut file = options.open(to)?;
    file.write_all(&contents)?;
    file.flush()
}
