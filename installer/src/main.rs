//! gup CLI entrypoint.
//!
//! Downloads a Go release archive, unpacks it into a scratch directory, and
//! replaces the installation directory named by `--goroot` with its contents.

use clap::Parser;
use gup::cli::Cli;
use gup::config::UpdaterConfig;
use gup::error::Result;
use gup::output::{render_error, success_message, write_stderr_line};
use gup::pipeline::run_update;
use gup::progress::SpinnerReporter;
use gup::release::download::HttpReleaseClient;
use std::io::Write;

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, stderr: &mut dyn Write) -> Result<()> {
    let config = UpdaterConfig::default();
    let client = HttpReleaseClient::new();
    let mut reporter = SpinnerReporter::new();

    let outcome = run_update(
        &cli.update_request(),
        &config,
        &client,
        &mut reporter,
        stderr,
    )?;

    write_stderr_line(stderr, "");
    write_stderr_line(stderr, success_message(&outcome));
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, render_error(&err));
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gup::error::UpdaterError;
    use gup::install::InstallError;
    use std::path::PathBuf;

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_chain_and_returns_one() {
        let err = UpdaterError::Install(InstallError::Remove {
            path: PathBuf::from("/usr/local/go"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        });

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.starts_with(
            "failed to install release: failed to remove existing installation /usr/local/go: "
        ));
        assert!(stderr_text.ends_with('\n'));
    }

    #[test]
    fn run_without_goroot_fails_before_any_work() {
        let mut stderr = Vec::new();
        let err = run(&Cli::default(), &mut stderr).expect_err("goroot is required");

        assert!(matches!(err, UpdaterError::MissingInstallDir));
        assert!(stderr.is_empty());
    }
}
