//! Client configuration.
//!
//! Raw facet structs mirror the TOML file; `load_config` validates and
//! resolves them into a [`ClientConfig`] with all defaults applied. A
//! missing file at the default location is not an error — everything has
//! a sensible default — but an explicitly passed `--config` path must
//! exist.

use std::path::{Path, PathBuf};

use facet::Facet;

use crate::error::ForgeError;
use crate::paths;

/// Composer service endpoint used when the config file doesn't set one.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8920";

// ── raw file structs ─────────────────────────────────────

#[derive(Debug, Clone, Default, Facet)]
#[facet(default)]
struct ConfigFile {
    endpoint: String,
    catalog: String,
    data_dir: String,
    telemetry: TelemetrySection,
}

#[derive(Debug, Clone, Default, Facet)]
#[facet(default)]
struct TelemetrySection {
    disabled: bool,
    path: String,
}

// ── resolved config ──────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    /// Catalog source override — a URL or a path to a JSON file. `None`
    /// means fetch from `{endpoint}/v1/catalog`.
    pub catalog: Option<String>,
    pub data_dir: PathBuf,
    pub telemetry_enabled: bool,
    pub telemetry_path: PathBuf,
}

fn validate_endpoint(endpoint: &str) -> Result<(), ForgeError> {
    if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
        return Err(ForgeError::Validation {
            message: format!("endpoint must be an http(s) URL, got '{endpoint}'"),
        });
    }
    Ok(())
}

fn resolve(file: ConfigFile) -> Result<ClientConfig, ForgeError> {
    let endpoint = if file.endpoint.is_empty() {
        DEFAULT_ENDPOINT.to_string()
    } else {
        file.endpoint
    };
    validate_endpoint(&endpoint)?;

    let data_dir = if file.data_dir.is_empty() {
        paths::data_dir()
    } else {
        PathBuf::from(file.data_dir)
    };

    let telemetry_path = if file.telemetry.path.is_empty() {
        paths::telemetry_file(&data_dir)
    } else {
        PathBuf::from(file.telemetry.path)
    };

    Ok(ClientConfig {
        endpoint,
        catalog: (!file.catalog.is_empty()).then_some(file.catalog),
        data_dir,
        telemetry_enabled: !file.telemetry.disabled,
        telemetry_path,
    })
}

// ── public API ───────────────────────────────────────────

/// Load the client config. `path` is an explicit `--config` override;
/// without it the default location is used and a missing file yields the
/// built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<ClientConfig, ForgeError> {
    let (path, required) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (paths::config_file(), false),
    };

    let contents = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(source) if !required && source.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return resolve(ConfigFile::default());
        }
        Err(source) => {
            return Err(ForgeError::ConfigLoad {
                path: path.display().to_string(),
                source,
            });
        }
    };

    let file: ConfigFile = facet_toml::from_str(&contents).map_err(|e| ForgeError::ConfigParse {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    resolve(file)
}
