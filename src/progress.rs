//! Progress and status reporting
//!
//! The crawl coordinator and the match orchestrator report through the
//! [`ProgressReporter`] trait. Reporting is purely observational: nothing a
//! reporter does can influence the run.

use indicatif::{ProgressBar, ProgressStyle};

/// Resolution of the progress bar; fractions are mapped onto this many steps
const BAR_STEPS: u64 = 1000;

/// Observer for long-running phases
pub trait ProgressReporter: Send + Sync {
    /// Sets completion of the current phase, in `0.0..=1.0`
    fn set_progress(&self, fraction: f64);

    /// Replaces the current status line
    fn set_status(&self, message: &str);

    /// Surfaces a non-fatal error (for example a failed batch)
    fn report_error(&self, message: &str);

    /// Clears the status line once a phase ends
    fn finish(&self) {}
}

/// Reporter that forwards everything to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn set_progress(&self, fraction: f64) {
        tracing::trace!(progress = fraction, "progress");
    }

    fn set_status(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn report_error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Terminal progress bar for interactive runs
pub struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(BAR_STEPS);
        bar.set_style(
            ProgressStyle::with_template("[{bar:40}] {percent:>3}% {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        Self { bar }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for BarProgress {
    fn set_progress(&self, fraction: f64) {
        self.bar.set_position(fraction_to_steps(fraction));
    }

    fn set_status(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn report_error(&self, message: &str) {
        self.bar.suspend(|| tracing::error!("{}", message));
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
        self.bar.reset();
    }
}

fn fraction_to_steps(fraction: f64) -> u64 {
    if !fraction.is_finite() {
        return 0;
    }
    (fraction.clamp(0.0, 1.0) * BAR_STEPS as f64).round() as u64
}
