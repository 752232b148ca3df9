//! Per-run scratch directory.
//!
//! Holds every intermediate artefact of a run: the downloaded archive and the
//! tree it extracts to. The directory is deliberately left on disk after the
//! run so a failed update can be inspected.

use crate::config::UpdaterConfig;
use crate::error::{Result, UpdaterError};
use crate::release::version::ArchiveName;
use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Mode the stored archive is written with.
pub const ARCHIVE_FILE_MODE: u32 = 0o644;

/// Number of random characters in the scratch directory name.
const SCRATCH_SUFFIX_LEN: usize = 5;

/// A uniquely named directory under the configured temp root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    /// Create a fresh scratch directory, e.g. `/tmp/gupa1B2c`.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::ScratchDir`] if the directory cannot be created.
    pub fn create(config: &UpdaterConfig) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&config.scratch_prefix)
            .rand_bytes(SCRATCH_SUFFIX_LEN)
            .tempdir_in(&config.temp_root)
            .map_err(|source| UpdaterError::ScratchDir {
                path: config.temp_root.clone(),
                source,
            })?;
        let path = dir.keep();
        debug!("created scratch directory {}", path.display());
        Ok(Self { path })
    }

    /// Wrap an existing directory.
    #[cfg(any(test, feature = "test-support"))]
    #[must_use]
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Return the scratch directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return where the archive called `name` is stored.
    #[must_use]
    pub fn archive_path(&self, name: &ArchiveName) -> PathBuf {
        self.path.join(name.as_str())
    }

    /// Return the root of the extracted release tree.
    #[must_use]
    pub fn extracted_root(&self, config: &UpdaterConfig) -> PathBuf {
        self.path.join(&config.extracted_root)
    }

    /// Write `payload` verbatim to the archive file and return its path.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::StoreArchive`] if the file cannot be written.
    pub fn store_archive(&self, name: &ArchiveName, payload: &[u8]) -> Result<PathBuf> {
        let path = self.archive_path(name);
        write_archive_file(&path, payload).map_err(|source| UpdaterError::StoreArchive {
            path: path.clone(),
            source,
        })?;
        debug!("stored {} bytes at {}", payload.len(), path.display());
        Ok(path)
    }
}

fn write_archive_file(path: &Path, payload: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(ARCHIVE_FILE_MODE);
    }
    let mut file = options.open(path)?;
    file.write_all(payload)?;
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn temp_root() -> TempDir {
        tempfile::tempdir().expect("temp root")
    }

    fn config_in(root: &TempDir) -> UpdaterConfig {
        UpdaterConfig::default().with_temp_root(root.path())
    }

    #[rstest]
    fn create_makes_prefixed_directory_under_temp_root(temp_root: TempDir) {
        let scratch = ScratchDir::create(&config_in(&temp_root)).expect("scratch dir");

        assert!(scratch.path().is_dir());
        assert_eq!(scratch.path().parent(), Some(temp_root.path()));
        let name = scratch
            .path()
            .file_name()
            .and_then(|n| n.to_str())
            .expect("UTF-8 name");
        assert!(name.starts_with("gup"), "unexpected name {name}");
        assert_eq!(name.len(), "gup".len() + SCRATCH_SUFFIX_LEN);
    }

    #[rstest]
    fn create_is_unique_per_call(temp_root: TempDir) {
        let config = config_in(&temp_root);
        let first = ScratchDir::create(&config).expect("first");
        let second = ScratchDir::create(&config).expect("second");
        assert_ne!(first.path(), second.path());
    }

    #[test]
    fn create_fails_when_temp_root_is_missing() {
        let root = tempfile::tempdir().expect("temp root");
        let config = UpdaterConfig::default().with_temp_root(root.path().join("absent"));

        let err = ScratchDir::create(&config).expect_err("missing root should fail");
        assert!(matches!(err, UpdaterError::ScratchDir { .. }));
    }

    #[rstest]
    fn store_archive_writes_payload_verbatim(temp_root: TempDir) {
        let config = config_in(&temp_root);
        let scratch = ScratchDir::create(&config).expect("scratch dir");
        let name = ArchiveName::for_version(&config, "1.21.0");

        let path = scratch
            .store_archive(&name, b"\x1f\x8b\x08payload")
            .expect("store archive");

        assert_eq!(path, scratch.path().join("go1.21.0.linux-amd64.tar.gz"));
        assert_eq!(fs::read(&path).expect("read back"), b"\x1f\x8b\x08payload");
    }

    #[cfg(unix)]
    #[rstest]
    fn store_archive_uses_world_readable_mode(temp_root: TempDir) {
        use std::os::unix::fs::PermissionsExt;

        let config = config_in(&temp_root);
        let scratch = ScratchDir::create(&config).expect("scratch dir");
        let name = ArchiveName::for_version(&config, "1.21.0");
        let path = scratch.store_archive(&name, b"x").expect("store archive");

        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o004, 0o004, "mode {mode:o} is not world-readable");
    }

    #[test]
    fn store_archive_reports_path_on_failure() {
        let scratch = ScratchDir::from_path("/nonexistent/gup-scratch");
        let config = UpdaterConfig::default();
        let name = ArchiveName::for_version(&config, "1.21.0");

        let err = scratch
            .store_archive(&name, b"x")
            .expect_err("write into missing dir should fail");
        match err {
            UpdaterError::StoreArchive { path, .. } => {
                assert!(path.ends_with("go1.21.0.linux-amd64.tar.gz"));
            }
            other => panic!("expected StoreArchive, got {other:?}"),
        }
    }

    #[rstest]
    fn extracted_root_uses_configured_name(temp_root: TempDir) {
        let config = config_in(&temp_root);
        let scratch = ScratchDir::from_path(temp_root.path());
        assert_eq!(scratch.extracted_root(&config), temp_root.path().join("go"));
    }
}
