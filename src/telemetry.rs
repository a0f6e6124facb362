//! Fire-and-forget event reporting.
//!
//! Sinks consume lifecycle events from the create and group flows and
//! record them without ever failing the primary operation — every error
//! on the emit path is swallowed (and at most traced).

use std::io::Write;
use std::path::PathBuf;
use std::time::SystemTime;

use facet::Facet;

#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    CreateStarted { name: String },
    CreateCompleted { name: String },
    CreateFailed { name: String, error: String },
    GroupRemoved { id: String },
}

impl TelemetryEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::CreateStarted { .. } => "create_started",
            Self::CreateCompleted { .. } => "create_completed",
            Self::CreateFailed { .. } => "create_failed",
            Self::GroupRemoved { .. } => "group_removed",
        }
    }

    fn detail(&self) -> String {
        match self {
            Self::CreateStarted { name }
            | Self::CreateCompleted { name } => name.clone(),
            Self::CreateFailed { name, error } => format!("{name}: {error}"),
            Self::GroupRemoved { id } => id.clone(),
        }
    }
}

/// One NDJSON line per event.
#[derive(Debug, Clone, Default, Facet)]
#[facet(default)]
struct EventRecord {
    timestamp: u64,
    event: String,
    detail: String,
}

pub trait EventSink {
    fn emit(&self, event: &TelemetryEvent);
}

/// Appends NDJSON records to a local file.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn try_emit(&self, event: &TelemetryEvent) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let record = EventRecord {
            timestamp: unix_timestamp(),
            event: event.name().to_string(),
            detail: event.detail(),
        };
        let line = facet_json::to_string(&record)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}

impl EventSink for FileSink {
    fn emit(&self, event: &TelemetryEvent) {
        if let Err(e) = self.try_emit(event) {
            tracing::debug!(error = %e, "telemetry emit failed");
        }
    }
}

/// Sink used when telemetry is disabled.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &TelemetryEvent) {}
}

pub fn create_sink(enabled: bool, path: PathBuf) -> Box<dyn EventSink> {
    if enabled {
        Box::new(FileSink::new(path))
    } else {
        Box::new(NullSink)
    }
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_sink_appends_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.ndjson");
        let sink = FileSink::new(path.clone());

        sink.emit(&TelemetryEvent::CreateStarted { name: "New VM".into() });
        sink.emit(&TelemetryEvent::GroupRemoved { id: "ci".into() });

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("create_started"));
        assert!(lines[1].contains("group_removed"));
    }

    #[test]
    fn emit_never_fails_the_caller() {
        // Unwritable destination — emit must swallow the error.
        let sink = FileSink::new(PathBuf::from("/proc/definitely/not/writable/events.ndjson"));
        sink.emit(&TelemetryEvent::CreateFailed {
            name: "vm".into(),
            error: "boom".into(),
        });
    }
}
