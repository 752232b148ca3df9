//! gup updater library.
//!
//! This crate provides the pipeline behind the `gup` binary: resolving a Go
//! release, downloading its archive, extracting it into a scratch directory,
//! and replacing an installation directory with the result. It can be
//! consumed programmatically with a custom [`release::download::ReleaseClient`]
//! or [`progress::ProgressReporter`].
//!
//! # Modules
//!
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - Endpoints, naming conventions, and per-run requests
//! - [`error`] - Top-level error type and failure classification
//! - [`extraction`] - Streaming `.tar.gz` extraction
//! - [`install`] - Installation directory replacement
//! - [`output`] - Status lines, error rendering, and summaries
//! - [`pipeline`] - End-to-end update orchestration
//! - [`progress`] - Progress reporting seam and spinner
//! - [`release`] - Version resolution and archive download
//! - [`scratch`] - Per-run scratch directory

pub mod cli;
pub mod config;
pub mod error;
pub mod extraction;
pub mod install;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod release;
pub mod scratch;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
