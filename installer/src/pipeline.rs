//! Update pipeline orchestration.
//!
//! Runs the stages strictly in order: resolve the archive name, download it,
//! store it in a fresh scratch directory, extract it there, and replace the
//! installation directory with the extracted tree. The first failing stage
//! ends the run; the scratch directory is left behind either way.

use crate::config::{UpdateRequest, UpdaterConfig};
use crate::error::{Result, UpdaterError};
use crate::extraction::{ExtractionSummary, extract_archive};
use crate::install::{InstallSummary, replace_installation};
use crate::output::write_stderr_line;
use crate::progress::ProgressReporter;
use crate::release::download::ReleaseClient;
use crate::release::version::{ArchiveName, resolve_archive_name};
use crate::scratch::ScratchDir;
use camino::Utf8Path;
use log::debug;
use std::io::Write;
use std::path::PathBuf;

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// The archive that was installed.
    pub archive_name: ArchiveName,
    /// Scratch directory holding the archive and extracted tree.
    pub scratch_dir: PathBuf,
    /// Size of the downloaded archive.
    pub downloaded_bytes: usize,
    /// Extraction counts.
    pub extraction: ExtractionSummary,
    /// Installation counts.
    pub install: InstallSummary,
    /// The replaced installation directory.
    pub install_dir: PathBuf,
}

/// Run one update end to end.
///
/// Status lines go to `stderr`; slow stages are bracketed by `reporter`,
/// which always sees a `stop` for every `start`.
///
/// # Errors
///
/// Returns the [`UpdaterError`] of the first stage that fails. A missing
/// installation directory is rejected before any network or filesystem work.
pub fn run_update(
    request: &UpdateRequest,
    config: &UpdaterConfig,
    client: &dyn ReleaseClient,
    reporter: &mut dyn ProgressReporter,
    stderr: &mut dyn Write,
) -> Result<UpdateOutcome> {
    let install_dir = require_install_dir(request)?;

    let archive_name = resolve_archive_name(&request.selector, config, client)
        .map_err(UpdaterError::LatestVersion)?;
    debug!("resolved {} to {archive_name}", request.selector);

    let scratch = ScratchDir::create(config)?;
    let payload = download(&archive_name, config, client, reporter, stderr)?;
    let archive_path = scratch.store_archive(&archive_name, &payload)?;
    write_stderr_line(
        stderr,
        format!(
            "Downloaded {} bytes; saved to {}",
            payload.len(),
            archive_path.display()
        ),
    );

    write_stderr_line(
        stderr,
        format!("Extracting to {}", scratch.path().display()),
    );
    let extraction = with_reporter(reporter, "Extracting archive", |_| {
        extract_archive(&archive_path, scratch.path()).map_err(UpdaterError::from)
    })?;

    write_stderr_line(stderr, format!("Installing to {install_dir}"));
    let source_root = scratch.extracted_root(config);
    let install = with_reporter(reporter, "Installing release", |reporter| {
        let summary = replace_installation(&source_root, install_dir.as_std_path())?;
        reporter.final_message(&format!("Installed {archive_name} into {install_dir}"));
        Ok(summary)
    })?;

    Ok(UpdateOutcome {
        archive_name,
        scratch_dir: scratch.path().to_path_buf(),
        downloaded_bytes: payload.len(),
        extraction,
        install,
        install_dir: install_dir.as_std_path().to_path_buf(),
    })
}

fn require_install_dir(request: &UpdateRequest) -> Result<&Utf8Path> {
    request
        .install_dir
        .as_deref()
        .filter(|dir| !dir.as_str().is_empty())
        .ok_or(UpdaterError::MissingInstallDir)
}

fn download(
    archive_name: &ArchiveName,
    config: &UpdaterConfig,
    client: &dyn ReleaseClient,
    reporter: &mut dyn ProgressReporter,
    stderr: &mut dyn Write,
) -> Result<Vec<u8>> {
    let url = archive_name.download_url(&config.download_base_url);
    write_stderr_line(stderr, format!("Downloading {url}"));
    with_reporter(reporter, "Downloading release archive", |_| {
        client.download(&url).map_err(|source| UpdaterError::Download {
            archive: archive_name.to_string(),
            source,
        })
    })
}

fn with_reporter<T>(
    reporter: &mut dyn ProgressReporter,
    message: &str,
    stage: impl FnOnce(&mut dyn ProgressReporter) -> Result<T>,
) -> Result<T> {
    reporter.start(message);
    let result = stage(&mut *reporter);
    reporter.stop();
    result
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
