//! Cascading selection state over an image catalog.
//!
//! `SelectionResolver` is the synchronous core behind the create wizard:
//! it applies field changes one at a time, keeps the os → platform →
//! distro → image chain consistent, exposes pure visibility derivations
//! for the presentation layer, and builds the final [`CreationRequest`]
//! on submit. It performs no I/O and holds the catalog immutably for the
//! session's lifetime.

use std::collections::BTreeMap;

use crate::catalog::{Catalog, Distro, Image, OperatingSystem, Platform, PlatformImages, OS_MACOS};
use crate::error::ForgeError;
use crate::request::{
    CreationRequest, MachineSpecs, RequestFlags, DEFAULT_CPUS, DEFAULT_DISK_MB, DEFAULT_MEMORY_MB,
    DEFAULT_NAME,
};

// ── session state ────────────────────────────────────────

/// The current id chain. A set field's ancestors are always set and
/// valid; mutating level K clears everything below it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub os: Option<String>,
    pub platform: Option<String>,
    pub distro: Option<String>,
    pub image: Option<String>,
}

/// Flags and ISO source copied off the resolved image. Reset to the
/// defaults whenever the chain above the image changes.
#[derive(Debug, Clone, Default)]
struct ImageTraits {
    require_iso_download: bool,
    allow_machine_specs: bool,
    allow_user_override: bool,
    allow_addons: bool,
    iso_url: String,
    iso_checksum: String,
}

/// Machine specs seeded from the image defaults (global fallbacks when
/// the image declares none).
#[derive(Debug, Clone, Copy)]
struct SeededSpecs {
    cpus: u32,
    memory_mb: u64,
    disk_mb: u64,
}

impl Default for SeededSpecs {
    fn default() -> Self {
        Self {
            cpus: DEFAULT_CPUS,
            memory_mb: DEFAULT_MEMORY_MB,
            disk_mb: DEFAULT_DISK_MB,
        }
    }
}

/// User-edited spec fields. `None` falls back to the seeded value.
#[derive(Debug, Clone, Default)]
pub struct SpecsOverride {
    pub cpus: Option<u32>,
    pub memory_mb: Option<u64>,
    pub disk_mb: Option<u64>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// User-edited option toggles. `start_headless` is a default-on policy:
/// the request flag is true unless the user explicitly disabled it.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionsOverride {
    pub start_headless: Option<bool>,
    pub generate_vagrant_box: Option<bool>,
}

pub struct SelectionResolver<'a> {
    catalog: &'a Catalog,
    selection: Selection,
    traits: ImageTraits,
    seeded: SeededSpecs,
    display_name: String,
    /// Addon id → deploy flag. Entries exist only for addons the user
    /// has toggled on; toggling off removes the entry.
    addons: BTreeMap<String, bool>,
}

impl<'a> SelectionResolver<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            selection: Selection::default(),
            traits: ImageTraits::default(),
            seeded: SeededSpecs::default(),
            display_name: String::new(),
            addons: BTreeMap::new(),
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    // ── chain navigation ─────────────────────────────────

    fn current_os(&self) -> Option<&'a OperatingSystem> {
        self.catalog.os(self.selection.os.as_deref()?)
    }

    fn current_platform(&self) -> Option<&'a Platform> {
        self.current_os()?.platform(self.selection.platform.as_deref()?)
    }

    fn current_distro(&self) -> Option<&'a Distro> {
        self.current_platform()?.distro(self.selection.distro.as_deref()?)
    }

    /// The image record the current chain resolves to, if complete.
    pub fn resolved_image(&self) -> Option<&'a Image> {
        let image_id = self.selection.image.as_deref()?;
        match &self.current_platform()?.images {
            PlatformImages::Direct(images) => images.iter().find(|i| i.id == image_id),
            PlatformImages::ViaDistro(_) => self.current_distro()?.image(image_id),
        }
    }

    // ── option lists for the presentation layer ──────────

    pub fn available_platforms(&self) -> &'a [Platform] {
        self.current_os().map(|o| o.platforms.as_slice()).unwrap_or(&[])
    }

    pub fn available_distros(&self) -> &'a [Distro] {
        match self.current_platform().map(|p| &p.images) {
            Some(PlatformImages::ViaDistro(distros)) => distros.as_slice(),
            _ => &[],
        }
    }

    pub fn available_images(&self) -> &'a [Image] {
        match self.current_platform().map(|p| &p.images) {
            Some(PlatformImages::Direct(images)) => images.as_slice(),
            Some(PlatformImages::ViaDistro(_)) => self
                .current_distro()
                .map(|d| d.images.as_slice())
                .unwrap_or(&[]),
            None => &[],
        }
    }

    // ── mutations ────────────────────────────────────────

    /// Reset everything derived from the image (and below) — called on
    /// every ancestor change.
    fn clear_image_state(&mut self) {
        self.selection.image = None;
        self.traits = ImageTraits::default();
        self.seeded = SeededSpecs::default();
        self.display_name.clear();
        self.addons.clear();
    }

    pub fn set_os(&mut self, id: Option<&str>) -> Result<(), ForgeError> {
        let os = match id {
            Some(id) => Some(self.catalog.os(id).ok_or_else(|| ForgeError::CatalogLookup {
                kind: "operating system",
                id: id.into(),
            })?),
            None => None,
        };

        self.selection.os = os.map(|o| o.id.clone());
        self.selection.platform = None;
        self.selection.distro = None;
        self.clear_image_state();

        // A single-platform OS has nothing to choose — select it now and
        // keep the platform field hidden.
        if let Some(os) = os {
            if let [only] = os.platforms.as_slice() {
                self.selection.platform = Some(only.id.clone());
            }
        }
        Ok(())
    }

    pub fn set_platform(&mut self, id: Option<&str>) -> Result<(), ForgeError> {
        let os = self.current_os().ok_or(ForgeError::SelectionOrder {
            field: "platform",
            needed: "operating system",
        })?;

        if let Some(id) = id {
            if os.platform(id).is_none() {
                return Err(ForgeError::CatalogLookup {
                    kind: "platform",
                    id: id.into(),
                });
            }
        }

        self.selection.platform = id.map(Into::into);
        self.selection.distro = None;
        self.clear_image_state();
        Ok(())
    }

    pub fn set_distro(&mut self, id: Option<&str>) -> Result<(), ForgeError> {
        let platform = self.current_platform().ok_or(ForgeError::SelectionOrder {
            field: "distro",
            needed: "platform",
        })?;

        if !platform.has_distros() {
            return Err(ForgeError::Validation {
                message: format!(
                    "platform '{}' has no distribution level — select an image directly",
                    platform.id
                ),
            });
        }

        if let Some(id) = id {
            if platform.distro(id).is_none() {
                return Err(ForgeError::CatalogLookup {
                    kind: "distro",
                    id: id.into(),
                });
            }
        }

        self.selection.distro = id.map(Into::into);
        self.clear_image_state();
        Ok(())
    }

    pub fn set_image(&mut self, id: Option<&str>) -> Result<(), ForgeError> {
        let platform = self.current_platform().ok_or(ForgeError::SelectionOrder {
            field: "image",
            needed: "platform",
        })?;

        if platform.has_distros() && self.current_distro().is_none() {
            return Err(ForgeError::SelectionOrder {
                field: "image",
                needed: "distribution",
            });
        }

        let image = match id {
            Some(id) => Some(
                self.available_images()
                    .iter()
                    .find(|i| i.id == id)
                    .ok_or_else(|| ForgeError::CatalogLookup {
                        kind: "image",
                        id: id.into(),
                    })?,
            ),
            None => None,
        };

        self.clear_image_state();

        if let Some(image) = image {
            self.selection.image = Some(image.id.clone());
            self.traits = ImageTraits {
                require_iso_download: image.require_iso_download,
                allow_machine_specs: image.allow_machine_specs,
                allow_user_override: image.allow_user_override,
                allow_addons: image.allow_addons,
                iso_url: image.iso_url.clone(),
                iso_checksum: image.iso_checksum.clone(),
            };
            self.seeded = SeededSpecs {
                cpus: image.defaults.cpus.unwrap_or(DEFAULT_CPUS),
                memory_mb: image.defaults.memory_mb.unwrap_or(DEFAULT_MEMORY_MB),
                disk_mb: image.defaults.disk_mb.unwrap_or(DEFAULT_DISK_MB),
            };
            self.display_name = image.name.clone();
        }
        Ok(())
    }

    /// Replace the ISO source for images that require a user-supplied
    /// ISO. Only meaningful once an image is resolved.
    pub fn set_iso_source(&mut self, url: &str, checksum: &str) -> Result<(), ForgeError> {
        if self.resolved_image().is_none() {
            return Err(ForgeError::MissingImage);
        }
        self.traits.iso_url = url.into();
        self.traits.iso_checksum = checksum.into();
        Ok(())
    }

    /// Idempotent upsert into the addon selection. The addon must be
    /// offered by the resolved image.
    pub fn toggle_addon(&mut self, addon_id: &str, deploy: bool) -> Result<(), ForgeError> {
        let image = self.resolved_image().ok_or(ForgeError::MissingImage)?;
        if image.addon(addon_id).is_none() {
            return Err(ForgeError::CatalogLookup {
                kind: "addon",
                id: addon_id.into(),
            });
        }
        if deploy {
            self.addons.insert(addon_id.into(), true);
        } else {
            self.addons.remove(addon_id);
        }
        Ok(())
    }

    // ── derived visibility (pure, idempotent) ────────────

    pub fn require_iso_download(&self) -> bool {
        self.traits.require_iso_download
    }

    pub fn allow_user_override(&self) -> bool {
        self.traits.allow_user_override
    }

    pub fn iso_source(&self) -> (&str, &str) {
        (&self.traits.iso_url, &self.traits.iso_checksum)
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// The specs the request would carry with no user override —
    /// image defaults with global fallbacks. Used to prefill prompts.
    pub fn seeded_specs(&self) -> (u32, u64, u64) {
        (self.seeded.cpus, self.seeded.memory_mb, self.seeded.disk_mb)
    }

    fn os_is_macos(&self) -> bool {
        self.selection.os.as_deref() == Some(OS_MACOS)
    }

    /// The platform dropdown only appears when there is a real choice.
    pub fn platform_field_visible(&self) -> bool {
        self.current_os()
            .is_some_and(|os| os.platforms.len() > 1)
    }

    pub fn distro_field_visible(&self) -> bool {
        self.current_platform().is_some_and(Platform::has_distros)
    }

    pub fn image_field_visible(&self) -> bool {
        match self.current_platform() {
            Some(p) if p.has_distros() => self.current_distro().is_some(),
            Some(_) => true,
            None => false,
        }
    }

    pub fn specs_section_visible(&self) -> bool {
        self.resolved_image().is_some() && self.traits.allow_machine_specs && !self.os_is_macos()
    }

    pub fn options_section_visible(&self) -> bool {
        self.resolved_image()
            .is_some_and(|i| !i.kind.is_preconfigured())
            && !self.os_is_macos()
    }

    pub fn addons_section_visible(&self) -> bool {
        self.resolved_image().is_some_and(|i| {
            self.traits.allow_addons && !i.kind.is_preconfigured() && !i.addons.is_empty()
        })
    }

    // ── submit ───────────────────────────────────────────

    /// Derive the final request from the session plus user overrides.
    /// Pure — the session is untouched, so a failed service call can be
    /// corrected and resubmitted.
    pub fn build_request(
        &self,
        name: Option<&str>,
        specs: &SpecsOverride,
        options: &OptionsOverride,
    ) -> Result<CreationRequest, ForgeError> {
        let os = self.selection.os.clone().ok_or(ForgeError::MissingOs)?;
        let image = self.selection.image.clone().ok_or(ForgeError::MissingImage)?;
        let platform = self.selection.platform.clone().ok_or(ForgeError::MissingImage)?;

        let name = match name.map(str::trim) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ if !self.display_name.is_empty() => self.display_name.clone(),
            _ => DEFAULT_NAME.to_string(),
        };

        Ok(CreationRequest {
            name,
            os,
            platform,
            distro: self.selection.distro.clone(),
            image,
            iso_url: self.traits.iso_url.clone(),
            iso_checksum: self.traits.iso_checksum.clone(),
            specs: MachineSpecs {
                cpus: specs.cpus.unwrap_or(self.seeded.cpus),
                memory_mb: specs.memory_mb.unwrap_or(self.seeded.memory_mb),
                disk_mb: specs.disk_mb.unwrap_or(self.seeded.disk_mb),
                username: specs.username.clone().unwrap_or_default(),
                password: specs.password.clone().unwrap_or_default(),
            },
            flags: RequestFlags {
                start_headless: options.start_headless.unwrap_or(true),
                generate_vagrant_box: options.generate_vagrant_box.unwrap_or(false),
            },
            addons: self
                .addons
                .iter()
                .filter(|(_, deploy)| **deploy)
                .map(|(id, _)| id.clone())
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::sample_catalog;

    fn linux_chain(resolver: &mut SelectionResolver<'_>) {
        resolver.set_os(Some("linux")).unwrap();
        resolver.set_platform(Some("x86")).unwrap();
        resolver.set_distro(Some("ubuntu")).unwrap();
        resolver.set_image(Some("22.04")).unwrap();
    }

    #[test]
    fn full_chain_builds_request_with_image_defaults() {
        let catalog = sample_catalog();
        let mut resolver = SelectionResolver::new(&catalog);
        linux_chain(&mut resolver);

        let request = resolver
            .build_request(None, &SpecsOverride::default(), &OptionsOverride::default())
            .unwrap();

        assert_eq!(request.os, "linux");
        assert_eq!(request.platform, "x86");
        assert_eq!(request.distro.as_deref(), Some("ubuntu"));
        assert_eq!(request.image, "22.04");
        assert_eq!(request.specs.cpus, 4);
        assert_eq!(request.specs.memory_mb, 4096);
        assert_eq!(request.specs.disk_mb, 40960);
        // The 22.04 image has no display name, so the fallback applies
        assert_eq!(request.name, "New VM");
    }

    #[test]
    fn global_defaults_apply_when_image_declares_none() {
        let catalog = sample_catalog();
        let mut resolver = SelectionResolver::new(&catalog);
        resolver.set_os(Some("linux")).unwrap();
        resolver.set_platform(Some("x86")).unwrap();
        resolver.set_distro(Some("ubuntu")).unwrap();
        resolver.set_image(Some("20.04")).unwrap();

        let request = resolver
            .build_request(None, &SpecsOverride::default(), &OptionsOverride::default())
            .unwrap();
        assert_eq!(request.specs.cpus, DEFAULT_CPUS);
        assert_eq!(request.specs.memory_mb, DEFAULT_MEMORY_MB);
        assert_eq!(request.specs.disk_mb, DEFAULT_DISK_MB);
        // This image has a display name, and no override was given
        assert_eq!(request.name, "Ubuntu 20.04 LTS");
    }

    #[test]
    fn single_platform_os_auto_selects_and_hides_field() {
        let catalog = sample_catalog();
        let mut resolver = SelectionResolver::new(&catalog);
        resolver.set_os(Some("windows")).unwrap();

        assert_eq!(resolver.selection().platform.as_deref(), Some("x86"));
        assert!(!resolver.platform_field_visible());
        assert!(!resolver.distro_field_visible());
        assert!(resolver.image_field_visible());

        resolver.set_image(Some("win11")).unwrap();
        let request = resolver
            .build_request(None, &SpecsOverride::default(), &OptionsOverride::default())
            .unwrap();
        assert_eq!(request.distro, None);
        assert_eq!(request.iso_url, "https://images.example.com/win11.iso");
        assert_eq!(request.iso_checksum, "sha256:aabbcc");
    }

    #[test]
    fn multi_platform_os_shows_field_and_defers_choice() {
        let catalog = sample_catalog();
        let mut resolver = SelectionResolver::new(&catalog);
        resolver.set_os(Some("linux")).unwrap();

        assert_eq!(resolver.selection().platform, None);
        assert!(resolver.platform_field_visible());
        assert!(!resolver.image_field_visible());
    }

    #[test]
    fn setting_os_is_idempotent() {
        let catalog = sample_catalog();
        let mut resolver = SelectionResolver::new(&catalog);
        resolver.set_os(Some("linux")).unwrap();
        let once = resolver.selection().clone();
        resolver.set_os(Some("linux")).unwrap();
        assert_eq!(resolver.selection(), &once);
    }

    #[test]
    fn ancestor_change_clears_descendants_and_flags() {
        let catalog = sample_catalog();
        let mut resolver = SelectionResolver::new(&catalog);
        linux_chain(&mut resolver);
        resolver.toggle_addon("docker", true).unwrap();
        assert!(resolver.specs_section_visible());

        resolver.set_platform(Some("arm64")).unwrap();

        assert_eq!(resolver.selection().distro, None);
        assert_eq!(resolver.selection().image, None);
        assert!(!resolver.specs_section_visible());
        assert!(!resolver.addons_section_visible());
        assert!(matches!(
            resolver.build_request(None, &SpecsOverride::default(), &OptionsOverride::default()),
            Err(ForgeError::MissingImage)
        ));
    }

    #[test]
    fn unset_os_clears_everything() {
        let catalog = sample_catalog();
        let mut resolver = SelectionResolver::new(&catalog);
        linux_chain(&mut resolver);
        resolver.set_os(None).unwrap();
        assert_eq!(resolver.selection(), &Selection::default());
    }

    #[test]
    fn out_of_order_selection_is_rejected() {
        let catalog = sample_catalog();
        let mut resolver = SelectionResolver::new(&catalog);
        assert!(matches!(
            resolver.set_platform(Some("x86")),
            Err(ForgeError::SelectionOrder { .. })
        ));
        resolver.set_os(Some("linux")).unwrap();
        assert!(matches!(
            resolver.set_image(Some("22.04")),
            Err(ForgeError::SelectionOrder { .. })
        ));
    }

    #[test]
    fn unknown_ids_fail_explicitly_and_preserve_state() {
        let catalog = sample_catalog();
        let mut resolver = SelectionResolver::new(&catalog);
        linux_chain(&mut resolver);

        let err = resolver.set_image(Some("nope")).unwrap_err();
        assert!(matches!(err, ForgeError::CatalogLookup { kind: "image", .. }));
        // validate-then-apply: the previous image selection survives
        assert_eq!(resolver.selection().image.as_deref(), Some("22.04"));

        assert!(matches!(
            resolver.set_os(Some("plan9")),
            Err(ForgeError::CatalogLookup { .. })
        ));
    }

    #[test]
    fn distro_rejected_on_direct_platform() {
        let catalog = sample_catalog();
        let mut resolver = SelectionResolver::new(&catalog);
        resolver.set_os(Some("windows")).unwrap();
        assert!(matches!(
            resolver.set_distro(Some("ubuntu")),
            Err(ForgeError::Validation { .. })
        ));
    }

    #[test]
    fn addon_toggle_round_trip() {
        let catalog = sample_catalog();
        let mut resolver = SelectionResolver::new(&catalog);
        linux_chain(&mut resolver);

        resolver.toggle_addon("docker", true).unwrap();
        resolver.toggle_addon("k8s", true).unwrap();
        resolver.toggle_addon("docker", false).unwrap();
        resolver.toggle_addon("docker", false).unwrap();

        let request = resolver
            .build_request(None, &SpecsOverride::default(), &OptionsOverride::default())
            .unwrap();
        assert_eq!(request.addons, vec!["k8s".to_string()]);

        assert!(matches!(
            resolver.toggle_addon("flux-capacitor", true),
            Err(ForgeError::CatalogLookup { kind: "addon", .. })
        ));
    }

    #[test]
    fn addon_selection_resets_with_the_image() {
        let catalog = sample_catalog();
        let mut resolver = SelectionResolver::new(&catalog);
        linux_chain(&mut resolver);
        resolver.toggle_addon("docker", true).unwrap();

        resolver.set_image(Some("20.04")).unwrap();
        resolver.set_image(Some("22.04")).unwrap();

        let request = resolver
            .build_request(None, &SpecsOverride::default(), &OptionsOverride::default())
            .unwrap();
        assert!(request.addons.is_empty());
    }

    #[test]
    fn build_request_validates_missing_selections() {
        let catalog = sample_catalog();
        let mut resolver = SelectionResolver::new(&catalog);
        assert!(matches!(
            resolver.build_request(None, &SpecsOverride::default(), &OptionsOverride::default()),
            Err(ForgeError::MissingOs)
        ));
        resolver.set_os(Some("linux")).unwrap();
        assert!(matches!(
            resolver.build_request(None, &SpecsOverride::default(), &OptionsOverride::default()),
            Err(ForgeError::MissingImage)
        ));
    }

    #[test]
    fn headless_defaults_on_unless_explicitly_disabled() {
        let catalog = sample_catalog();
        let mut resolver = SelectionResolver::new(&catalog);
        linux_chain(&mut resolver);

        let build = |options: OptionsOverride| {
            resolver
                .build_request(None, &SpecsOverride::default(), &options)
                .unwrap()
                .flags
        };

        assert!(build(OptionsOverride::default()).start_headless);
        assert!(build(OptionsOverride {
            start_headless: Some(true),
            ..Default::default()
        })
        .start_headless);
        assert!(!build(OptionsOverride {
            start_headless: Some(false),
            ..Default::default()
        })
        .start_headless);

        assert!(!build(OptionsOverride::default()).generate_vagrant_box);
        assert!(build(OptionsOverride {
            generate_vagrant_box: Some(true),
            ..Default::default()
        })
        .generate_vagrant_box);
    }

    #[test]
    fn overrides_take_precedence_over_seeded_specs() {
        let catalog = sample_catalog();
        let mut resolver = SelectionResolver::new(&catalog);
        linux_chain(&mut resolver);

        let request = resolver
            .build_request(
                Some("dev box"),
                &SpecsOverride {
                    cpus: Some(8),
                    username: Some("admin".into()),
                    ..Default::default()
                },
                &OptionsOverride::default(),
            )
            .unwrap();
        assert_eq!(request.name, "dev box");
        assert_eq!(request.specs.cpus, 8);
        assert_eq!(request.specs.memory_mb, 4096);
        assert_eq!(request.specs.username, "admin");
        assert_eq!(request.specs.password, "");
    }

    #[test]
    fn blank_name_override_falls_back() {
        let catalog = sample_catalog();
        let mut resolver = SelectionResolver::new(&catalog);
        linux_chain(&mut resolver);
        let request = resolver
            .build_request(Some("   "), &SpecsOverride::default(), &OptionsOverride::default())
            .unwrap();
        assert_eq!(request.name, "New VM");
    }

    #[test]
    fn build_request_does_not_consume_the_session() {
        let catalog = sample_catalog();
        let mut resolver = SelectionResolver::new(&catalog);
        linux_chain(&mut resolver);

        let first = resolver
            .build_request(None, &SpecsOverride::default(), &OptionsOverride::default())
            .unwrap();
        let second = resolver
            .build_request(None, &SpecsOverride::default(), &OptionsOverride::default())
            .unwrap();
        assert_eq!(first.name, second.name);
        assert_eq!(first.specs.cpus, second.specs.cpus);
        assert_eq!(resolver.selection().image.as_deref(), Some("22.04"));
    }

    #[test]
    fn macos_hides_specs_and_options_sections() {
        let json = r#"[{"id":"macos","name":"macOS","platforms":[{"id":"arm64","name":"Apple Silicon",
            "images":[{"id":"sonoma","name":"macOS Sonoma","kind":"macos","allow_machine_specs":true}]}]}]"#;
        let catalog = Catalog::from_json(json).unwrap();
        let mut resolver = SelectionResolver::new(&catalog);
        resolver.set_os(Some("macos")).unwrap();
        resolver.set_image(Some("sonoma")).unwrap();

        assert!(!resolver.specs_section_visible());
        assert!(!resolver.options_section_visible());
    }

    #[test]
    fn preconfigured_kinds_hide_options_and_addons() {
        let catalog = sample_catalog();
        let mut resolver = SelectionResolver::new(&catalog);
        resolver.set_os(Some("windows")).unwrap();
        resolver.set_image(Some("win11")).unwrap();

        assert!(resolver.specs_section_visible());
        assert!(resolver.require_iso_download());
        assert!(!resolver.options_section_visible());
        assert!(!resolver.addons_section_visible());
    }

    #[test]
    fn iso_source_can_be_replaced_by_the_user() {
        let catalog = sample_catalog();
        let mut resolver = SelectionResolver::new(&catalog);
        resolver.set_os(Some("windows")).unwrap();

        assert!(matches!(
            resolver.set_iso_source("file:///x.iso", ""),
            Err(ForgeError::MissingImage)
        ));

        resolver.set_image(Some("win11")).unwrap();
        resolver
            .set_iso_source("https://mirror.example.com/win11.iso", "sha256:ddeeff")
            .unwrap();
        let request = resolver
            .build_request(None, &SpecsOverride::default(), &OptionsOverride::default())
            .unwrap();
        assert_eq!(request.iso_url, "https://mirror.example.com/win11.iso");
        assert_eq!(request.iso_checksum, "sha256:ddeeff");
    }
}
