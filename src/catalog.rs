//! Image catalog — the static tree of selectable operating systems,
//! platforms, distributions, and images served by the composer service.
//!
//! Parsing happens in two layers: raw facet structs matching the wire
//! JSON, then validation into domain types. Platforms carry a tagged
//! [`PlatformImages`] variant — Linux-style platforms hold distros,
//! everything else holds images directly — so downstream code matches on
//! the shape instead of comparing OS id strings.

use std::collections::BTreeSet;
use std::fmt;

use facet::Facet;

use crate::error::ForgeError;

// ── wire structs ─────────────────────────────────────────

#[derive(Debug, Clone, Default, Facet)]
#[facet(default)]
struct RawOperatingSystem {
    id: String,
    name: String,
    platforms: Vec<RawPlatform>,
}

#[derive(Debug, Clone, Default, Facet)]
#[facet(default)]
struct RawPlatform {
    id: String,
    name: String,
    distros: Vec<RawDistro>,
    images: Vec<RawImage>,
}

#[derive(Debug, Clone, Default, Facet)]
#[facet(default)]
struct RawDistro {
    id: String,
    name: String,
    images: Vec<RawImage>,
}

#[derive(Debug, Clone, Default, Facet)]
#[facet(default)]
struct RawImage {
    id: String,
    name: String,
    kind: String,
    require_iso_download: bool,
    allow_machine_specs: bool,
    allow_user_override: bool,
    allow_addons: bool,
    iso_url: String,
    iso_checksum: String,
    defaults: Option<RawSpecDefaults>,
    addons: Vec<RawAddon>,
}

#[derive(Debug, Clone, Default, Facet)]
#[facet(default)]
struct RawSpecDefaults {
    cpus: Option<u32>,
    memory_mb: Option<u64>,
    disk_mb: Option<u64>,
}

#[derive(Debug, Clone, Default, Facet)]
#[facet(default)]
struct RawAddon {
    id: String,
    name: String,
}

// ── domain types ─────────────────────────────────────────

/// OS id for which spec/option sections are hidden regardless of image
/// capability flags.
pub const OS_MACOS: &str = "macos";

#[derive(Debug, Clone)]
pub struct Catalog {
    pub systems: Vec<OperatingSystem>,
}

#[derive(Debug, Clone)]
pub struct OperatingSystem {
    pub id: String,
    pub name: String,
    pub platforms: Vec<Platform>,
}

#[derive(Debug, Clone)]
pub struct Platform {
    pub id: String,
    pub name: String,
    pub images: PlatformImages,
}

/// What a platform holds underneath it. Linux platforms group images by
/// distribution; all other operating systems attach images directly.
#[derive(Debug, Clone)]
pub enum PlatformImages {
    Direct(Vec<Image>),
    ViaDistro(Vec<Distro>),
}

#[derive(Debug, Clone)]
pub struct Distro {
    pub id: String,
    pub name: String,
    pub images: Vec<Image>,
}

/// A concrete installable/attachable VM source.
#[derive(Debug, Clone)]
pub struct Image {
    pub id: String,
    pub name: String,
    pub kind: ImageKind,
    pub require_iso_download: bool,
    pub allow_machine_specs: bool,
    pub allow_user_override: bool,
    pub allow_addons: bool,
    pub iso_url: String,
    pub iso_checksum: String,
    pub defaults: SpecDefaults,
    pub addons: Vec<Addon>,
}

/// Per-image machine spec defaults. Absent values fall back to the
/// global defaults at request-build time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecDefaults {
    pub cpus: Option<u32>,
    pub memory_mb: Option<u64>,
    pub disk_mb: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Addon {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Internal,
    Iso,
    Packer,
    Macos,
    Other,
}

impl ImageKind {
    fn parse(s: &str) -> Self {
        match s {
            "internal" => Self::Internal,
            "iso" => Self::Iso,
            "packer" => Self::Packer,
            "macos" => Self::Macos,
            _ => Self::Other,
        }
    }

    /// Internal appliances and raw ISOs carry no configurable options or
    /// addons — the service attaches them as-is.
    pub fn is_preconfigured(self) -> bool {
        matches!(self, Self::Internal | Self::Iso)
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Internal => "internal",
            Self::Iso => "iso",
            Self::Packer => "packer",
            Self::Macos => "macos",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

// ── validation ───────────────────────────────────────────

fn check_unique(kind: &'static str, ids: impl Iterator<Item = String>) -> Result<(), ForgeError> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if id.is_empty() {
            return Err(ForgeError::CatalogParse {
                message: format!("{kind} with empty id"),
            });
        }
        if !seen.insert(id.clone()) {
            return Err(ForgeError::CatalogParse {
                message: format!("duplicate {kind} id '{id}'"),
            });
        }
    }
    Ok(())
}

fn convert_image(raw: RawImage) -> Result<Image, ForgeError> {
    check_unique("addon", raw.addons.iter().map(|a| a.id.clone()))?;
    Ok(Image {
        kind: ImageKind::parse(&raw.kind),
        id: raw.id,
        name: raw.name,
        require_iso_download: raw.require_iso_download,
        allow_machine_specs: raw.allow_machine_specs,
        allow_user_override: raw.allow_user_override,
        allow_addons: raw.allow_addons,
        iso_url: raw.iso_url,
        iso_checksum: raw.iso_checksum,
        defaults: raw
            .defaults
            .map(|d| SpecDefaults {
                cpus: d.cpus,
                memory_mb: d.memory_mb,
                disk_mb: d.disk_mb,
            })
            .unwrap_or_default(),
        addons: raw
            .addons
            .into_iter()
            .map(|a| Addon {
                id: a.id,
                name: a.name,
            })
            .collect(),
    })
}

fn convert_platform(raw: RawPlatform) -> Result<Platform, ForgeError> {
    let images = match (raw.distros.is_empty(), raw.images.is_empty()) {
        (false, false) => {
            return Err(ForgeError::CatalogParse {
                message: format!("platform '{}' declares both distros and images", raw.id),
            });
        }
        (true, true) => {
            return Err(ForgeError::CatalogParse {
                message: format!("platform '{}' declares neither distros nor images", raw.id),
            });
        }
        (false, true) => {
            check_unique("distro", raw.distros.iter().map(|d| d.id.clone()))?;
            let distros = raw
                .distros
                .into_iter()
                .map(|d| {
                    check_unique("image", d.images.iter().map(|i| i.id.clone()))?;
                    Ok(Distro {
                        id: d.id,
                        name: d.name,
                        images: d
                            .images
                            .into_iter()
                            .map(convert_image)
                            .collect::<Result<_, _>>()?,
                    })
                })
                .collect::<Result<_, ForgeError>>()?;
            PlatformImages::ViaDistro(distros)
        }
        (true, false) => {
            check_unique("image", raw.images.iter().map(|i| i.id.clone()))?;
            PlatformImages::Direct(
                raw.images
                    .into_iter()
                    .map(convert_image)
                    .collect::<Result<_, _>>()?,
            )
        }
    };

    Ok(Platform {
        id: raw.id,
        name: raw.name,
        images,
    })
}

// ── public API ───────────────────────────────────────────

impl Catalog {
    /// Parse the wire JSON — a top-level array of operating systems.
    pub fn from_json(json: &str) -> Result<Self, ForgeError> {
        let raw: Vec<RawOperatingSystem> =
            facet_json::from_str(json).map_err(|e| ForgeError::CatalogParse {
                message: e.to_string(),
            })?;

        check_unique("operating system", raw.iter().map(|o| o.id.clone()))?;

        let systems = raw
            .into_iter()
            .map(|o| {
                check_unique("platform", o.platforms.iter().map(|p| p.id.clone()))?;
                Ok(OperatingSystem {
                    id: o.id,
                    name: o.name,
                    platforms: o
                        .platforms
                        .into_iter()
                        .map(convert_platform)
                        .collect::<Result<_, _>>()?,
                })
            })
            .collect::<Result<_, ForgeError>>()?;

        Ok(Self { systems })
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    pub fn os(&self, id: &str) -> Option<&OperatingSystem> {
        self.systems.iter().find(|o| o.id == id)
    }
}

impl OperatingSystem {
    pub fn platform(&self, id: &str) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }
}

impl Platform {
    /// Distros under this platform; `None` when images attach directly.
    pub fn distro(&self, id: &str) -> Option<&Distro> {
        match &self.images {
            PlatformImages::ViaDistro(distros) => distros.iter().find(|d| d.id == id),
            PlatformImages::Direct(_) => None,
        }
    }

    pub fn has_distros(&self) -> bool {
        matches!(self.images, PlatformImages::ViaDistro(_))
    }
}

impl Distro {
    pub fn image(&self, id: &str) -> Option<&Image> {
        self.images.iter().find(|i| i.id == id)
    }
}

impl Image {
    pub fn addon(&self, id: &str) -> Option<&Addon> {
        self.addons.iter().find(|a| a.id == id)
    }
}
