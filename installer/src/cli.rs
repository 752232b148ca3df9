//! CLI argument definitions for the updater.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use crate::config::UpdateRequest;
use crate::release::version::{LATEST_SELECTOR, VersionSelector};
use camino::Utf8PathBuf;
use clap::Parser;

/// Update a Go toolchain installation in place.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "gup")]
#[command(about, disable_version_flag = true)]
#[command(long_about = concat!(
    "Update a Go toolchain installation in place.\n\n",
    "gup downloads the linux-amd64 release archive for the requested version ",
    "(or the newest release), unpacks it into a fresh scratch directory under ",
    "the system temp directory, and replaces the installation directory with ",
    "the unpacked tree.\n\n",
    "The installation directory is removed completely before the new release ",
    "is copied in; nothing is merged. The scratch directory is kept after the ",
    "run so it can be inspected.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Install the newest release:\n",
    "    $ gup --goroot /usr/local/go\n\n",
    "  Install a specific release:\n",
    "    $ gup --version 1.21.0 --goroot /usr/local/go\n",
))]
pub struct Cli {
    /// Release to install, e.g. 1.21.0, or `latest`.
    #[arg(long, value_name = "VERSION", default_value = LATEST_SELECTOR)]
    pub version: String,

    /// Installation directory to replace.
    #[arg(long, value_name = "DIR")]
    pub goroot: Option<Utf8PathBuf>,
}

impl Default for Cli {
    /// Creates a `Cli` selecting the latest release with no installation
    /// directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use gup::cli::Cli;
    ///
    /// let cli = Cli::default();
    /// assert_eq!(cli.version, "latest");
    /// assert!(cli.goroot.is_none());
    /// ```
    fn default() -> Self {
        Self {
            version: LATEST_SELECTOR.to_owned(),
            goroot: None,
        }
    }
}

impl Cli {
    /// Convert the parsed arguments into an [`UpdateRequest`].
    #[must_use]
    pub fn update_request(&self) -> UpdateRequest {
        UpdateRequest {
            selector: VersionSelector::from(self.version.as_str()),
            install_dir: self.goroot.clone(),
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
