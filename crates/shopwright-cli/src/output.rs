//! Terminal output: scenario progress, status lines and the run summary

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use shopwright::{Reporter, ScenarioEvent};
use std::time::Duration;

/// Status line for a finished scenario, `None` for `Started`
#[must_use]
pub fn scenario_line(event: &ScenarioEvent, use_color: bool) -> Option<String> {
    let (tag, color, text) = match event {
        ScenarioEvent::Started { .. } => return None,
        ScenarioEvent::Passed {
            name,
            duration,
            attempts,
        } => {
            let retried = if *attempts > 1 {
                format!(" after {attempts} attempts")
            } else {
                String::new()
            };
            (
                "PASS",
                Style::new().green().bold(),
                format!("{name} ({:.2}s){retried}", duration.as_secs_f64()),
            )
        }
        ScenarioEvent::Failed {
            name,
            duration,
            error,
            screenshot,
            ..
        } => {
            let shot = screenshot
                .as_ref()
                .map(|p| format!("\n      screenshot: {}", p.display()))
                .unwrap_or_default();
            (
                "FAIL",
                Style::new().red().bold(),
                format!("{name} ({:.2}s)\n      {error}{shot}", duration.as_secs_f64()),
            )
        }
        ScenarioEvent::Skipped { name, reason, .. } => {
            ("SKIP", Style::new().yellow(), format!("{name} ({reason})"))
        }
    };
    let tag = if use_color {
        color.apply_to(tag).to_string()
    } else {
        tag.to_string()
    };
    Some(format!("{tag} {text}"))
}

/// Progress reporter for a suite run
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over `total` scenarios
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Show one scenario event
    pub fn on_event(&self, event: &ScenarioEvent) {
        if let ScenarioEvent::Started { name, .. } = event {
            if let Some(ref pb) = self.progress_bar {
                pb.set_message(name.clone());
            }
            return;
        }
        // Failures are shown even in quiet mode
        let show = !self.quiet || matches!(event, ScenarioEvent::Failed { .. });
        if let Some(line) = scenario_line(event, self.use_color).filter(|_| show) {
            if let Some(ref pb) = self.progress_bar {
                pb.println(line);
            } else {
                let _ = self.term.write_line(&line);
            }
        }
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
        }
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&styled);
    }

    /// Print the run summary
    pub fn summary(&self, reporter: &Reporter, duration: Duration) {
        let (passed, failed, skipped) = (
            reporter.passed_count(),
            reporter.failed_count(),
            reporter.skipped_count(),
        );
        if self.quiet && failed == 0 {
            return;
        }

        let _ = self.term.write_line("");

        let total = passed + failed + skipped;
        let duration_secs = duration.as_secs_f64();
        let rate = reporter.pass_rate() * 100.0;

        if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let skipped_style = Style::new().yellow();

            let status = if failed > 0 {
                failed_style.apply_to("FAILED")
            } else {
                passed_style.apply_to("PASSED")
            };

            let _ = self.term.write_line(&format!(
                "{} {} scenarios in {:.2}s ({} passed, {} failed, {} skipped, {:.1}% pass rate)",
                status,
                total,
                duration_secs,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
                skipped_style.apply_to(skipped),
                rate
            ));
        } else {
            let status = if failed > 0 { "FAILED" } else { "PASSED" };
            let _ = self.term.write_line(&format!(
                "{status} {total} scenarios in {duration_secs:.2}s ({passed} passed, {failed} failed, {skipped} skipped, {rate:.1}% pass rate)"
            ));
        }
    }
}
