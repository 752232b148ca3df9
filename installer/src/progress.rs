//! Progress reporting for long-running pipeline stages.
//!
//! The pipeline only talks to the [`ProgressReporter`] trait. The binary
//! plugs in [`SpinnerReporter`], which draws an `indicatif` spinner on
//! standard error; tests and embedders use [`SilentReporter`] or a recorder.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {msg}";
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Receives notifications around slow stages.
///
/// Every `start` is followed by exactly one `stop`, on success and failure
/// alike. `final_message` may be called while a stage is running to set the
/// line left behind when it stops.
#[cfg_attr(test, mockall::automock)]
pub trait ProgressReporter {
    /// Begin showing activity with `message`.
    fn start(&mut self, message: &str);

    /// Stop showing activity.
    fn stop(&mut self);

    /// Set the line displayed once the current stage stops.
    fn final_message(&mut self, message: &str);
}

/// Terminal spinner backed by `indicatif`.
#[derive(Default)]
pub struct SpinnerReporter {
    hidden: bool,
    bar: Option<ProgressBar>,
    pending_final: Option<String>,
}

impl SpinnerReporter {
    /// Create a spinner that draws to standard error.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a spinner that tracks state but never draws.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            hidden: true,
            ..Self::default()
        }
    }

    /// Return true while a stage is being reported.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.bar.is_some()
    }

    /// Return the message of the running stage, if any.
    #[must_use]
    pub fn current_message(&self) -> Option<String> {
        self.bar.as_ref().map(ProgressBar::message)
    }

    fn make_bar(&self) -> ProgressBar {
        if self.hidden {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
            bar.set_style(style);
        }
        bar.enable_steady_tick(TICK_INTERVAL);
        bar
    }
}

impl ProgressReporter for SpinnerReporter {
    fn start(&mut self, message: &str) {
        if let Some(previous) = self.bar.take() {
            previous.finish_and_clear();
        }
        let bar = self.make_bar();
        bar.set_message(message.to_owned());
        self.bar = Some(bar);
    }

    fn stop(&mut self) {
        let Some(bar) = self.bar.take() else {
            return;
        };
        match self.pending_final.take() {
            Some(message) => bar.finish_with_message(message),
            None => bar.finish_and_clear(),
        }
    }

    fn final_message(&mut self, message: &str) {
        self.pending_final = Some(message.to_owned());
    }
}

/// Reporter that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {
    fn start(&mut self, _message: &str) {}

    fn stop(&mut self) {}

    fn final_message(&mut self, _message: &str) {}
}
