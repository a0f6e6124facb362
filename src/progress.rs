use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Controls how the CLI renders feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Spinner + styled messages on a TTY.
    Normal,
    /// No ANSI — plain println output (piped/non-TTY or --plain).
    Plain,
    /// Essential output only.
    Quiet,
}

impl OutputMode {
    pub fn resolve(plain: bool, quiet: bool) -> Self {
        if quiet {
            OutputMode::Quiet
        } else if plain || !std::io::stderr().is_terminal() {
            OutputMode::Plain
        } else {
            OutputMode::Normal
        }
    }
}

/// Spinner shown while the long-running creation call is in flight.
///
/// In Plain mode prints the label once instead; in Quiet mode stays
/// silent. Finalization keeps the line (checkmark/cross) rather than
/// clearing it, so the outcome stays visible in scrollback.
pub struct SubmitSpinner {
    bar: Option<ProgressBar>,
    mode: OutputMode,
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .expect("valid spinner template")
}

impl SubmitSpinner {
    pub fn start(label: &str, mode: OutputMode) -> Self {
        match mode {
            OutputMode::Normal => {
                let bar = ProgressBar::new_spinner();
                bar.set_style(spinner_style());
                bar.set_message(label.to_string());
                bar.enable_steady_tick(Duration::from_millis(80));
                Self {
                    bar: Some(bar),
                    mode,
                }
            }
            OutputMode::Plain => {
                eprintln!("{label}...");
                Self { bar: None, mode }
            }
            OutputMode::Quiet => Self { bar: None, mode },
        }
    }

    pub fn finish_ok(self, message: &str) {
        match (self.bar, self.mode) {
            (Some(bar), _) => bar.finish_with_message(format!("\u{2713} {message}")),
            (None, OutputMode::Plain) => eprintln!("\u{2713} {message}"),
            (None, _) => {}
        }
    }

    pub fn finish_err(self, message: &str) {
        match (self.bar, self.mode) {
            (Some(bar), _) => bar.finish_with_message(format!("\u{2717} {message}")),
            (None, OutputMode::Plain) => eprintln!("\u{2717} {message}"),
            (None, _) => {}
        }
    }
}
