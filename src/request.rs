//! The normalized creation request handed to the composer service.
//!
//! Built exactly once per submit by [`crate::resolver::SelectionResolver`]
//! and immutable afterwards. The structs double as the wire format
//! (snake_case JSON via facet).

use facet::Facet;

/// Fallback machine specs when neither the image nor the user supplies a
/// value.
pub const DEFAULT_CPUS: u32 = 2;
pub const DEFAULT_MEMORY_MB: u64 = 2048;
pub const DEFAULT_DISK_MB: u64 = 65536;

/// Name used when the user leaves the machine name blank.
pub const DEFAULT_NAME: &str = "New VM";

#[derive(Debug, Clone, Facet)]
pub struct CreationRequest {
    pub name: String,
    pub os: String,
    pub platform: String,
    pub distro: Option<String>,
    pub image: String,
    pub iso_url: String,
    pub iso_checksum: String,
    pub specs: MachineSpecs,
    pub flags: RequestFlags,
    pub addons: Vec<String>,
}

#[derive(Debug, Clone, Facet)]
pub struct MachineSpecs {
    pub cpus: u32,
    pub memory_mb: u64,
    pub disk_mb: u64,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Facet)]
pub struct RequestFlags {
    pub start_headless: bool,
    pub generate_vagrant_box: bool,
}

impl CreationRequest {
    pub fn to_json(&self) -> String {
        facet_json::to_string(self).expect("JSON serialization")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_snake_case_keys() {
        let request = CreationRequest {
            name: "New VM".into(),
            os: "linux".into(),
            platform: "x86".into(),
            distro: Some("ubuntu".into()),
            image: "22.04".into(),
            iso_url: String::new(),
            iso_checksum: String::new(),
            specs: MachineSpecs {
                cpus: DEFAULT_CPUS,
                memory_mb: DEFAULT_MEMORY_MB,
                disk_mb: DEFAULT_DISK_MB,
                username: String::new(),
                password: String::new(),
            },
            flags: RequestFlags {
                start_headless: true,
                generate_vagrant_box: false,
            },
            addons: vec!["docker".into()],
        };

        let json = request.to_json();
        assert!(json.contains("\"start_headless\""));
        assert!(json.contains("\"memory_mb\""));
        assert!(json.contains("\"docker\""));
    }
}
