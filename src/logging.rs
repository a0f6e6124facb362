use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::progress::OutputMode;

// ── FileWriter ───────────────────────────────────────────

/// A `MakeWriter` appending to a shared log file.
#[derive(Clone)]
struct FileWriter {
    inner: Arc<Mutex<File>>,
}

/// Writer handed out per event — locks the shared file for the write.
struct LockedWriter {
    inner: Arc<Mutex<File>>,
}

impl std::io::Write for LockedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self.inner.lock() {
            Ok(mut f) => f.write(buf),
            Err(_) => Ok(buf.len()), // poisoned — drop the line
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self.inner.lock() {
            Ok(mut f) => f.flush(),
            Err(_) => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for FileWriter {
    type Writer = LockedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LockedWriter {
            inner: self.inner.clone(),
        }
    }
}

fn open_log_file(path: &Path) -> Option<FileWriter> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok()?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path).ok()?;
    Some(FileWriter {
        inner: Arc::new(Mutex::new(file)),
    })
}

// ── subscriber setup ─────────────────────────────────────

/// Install the tracing subscriber: a stderr layer gated by the output
/// mode (suppressed in Normal mode — tracing lines corrupt indicatif's
/// terminal tracking) and an optional always-debug file layer. Failing
/// to open the log file downgrades to terminal-only logging.
pub fn init(mode: OutputMode, verbose: bool, log_file: Option<&Path>) {
    let terminal_filter = if verbose {
        EnvFilter::new("vmforge=debug")
    } else {
        match mode {
            OutputMode::Normal | OutputMode::Quiet => EnvFilter::new("off"),
            OutputMode::Plain => EnvFilter::from_default_env()
                .add_directive("vmforge=info".parse().expect("valid log directive")),
        }
    };

    let terminal_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(terminal_filter);

    let file_layer = log_file.and_then(open_log_file).map(|writer| {
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(EnvFilter::new("vmforge=debug"))
    });

    tracing_subscriber::registry()
        .with(terminal_layer)
        .with(file_layer)
        .init();
}
