use std::path::PathBuf;

/// Default client config file: `~/.config/vmforge/config.toml`
pub fn config_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("vmforge")
        .join("config.toml")
}

/// Data directory for local state (group store, telemetry):
/// `~/.local/share/vmforge/`
pub fn data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("vmforge")
}

/// Path to the persisted group store within a data directory.
pub fn groups_file(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("groups.json")
}

/// Path to the telemetry event log within a data directory.
pub fn telemetry_file(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("events.ndjson")
}

/// Log directory: `~/.local/share/vmforge/logs/`
pub fn logs_dir(data_dir: &std::path::Path) -> PathBuf {
    data_dir.join("logs")
}
