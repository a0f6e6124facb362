//! Interactive create wizard.
//!
//! A thin presentation adapter over [`SelectionResolver`]: every prompt
//! feeds one field change into the resolver, and every visibility
//! question is answered by the resolver. No derivation logic lives here.

use inquire::validator::Validation;
use inquire::{Confirm, CustomType, MultiSelect, Password, Select, Text};

use crate::catalog::{Catalog, ImageKind};
use crate::error::ForgeError;
use crate::request::CreationRequest;
use crate::resolver::{OptionsOverride, SelectionResolver, SpecsOverride};
use crate::util::parse_size_mb;

// ── prompt plumbing ──────────────────────────────────────

/// One selectable entry; shows its display name, carries its id.
struct Choice {
    id: String,
    label: String,
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label)
    }
}

fn choice(id: &str, name: &str) -> Choice {
    Choice {
        id: id.to_string(),
        label: if name.is_empty() {
            id.to_string()
        } else {
            name.to_string()
        },
    }
}

pub fn map_inquire_err(e: inquire::InquireError) -> ForgeError {
    match e {
        inquire::InquireError::OperationCanceled | inquire::InquireError::OperationInterrupted => {
            ForgeError::Cancelled
        }
        other => ForgeError::Validation {
            message: format!("prompt error: {other}"),
        },
    }
}

fn size_validator(input: &str) -> Result<Validation, inquire::CustomUserError> {
    match parse_size_mb(input) {
        Ok(_) => Ok(Validation::Valid),
        Err(e) => Ok(Validation::Invalid(format!("{e}").into())),
    }
}

// ── public entry point ───────────────────────────────────

/// Walk the selection chain and return the finished creation request.
pub fn run(catalog: &Catalog) -> Result<CreationRequest, ForgeError> {
    if catalog.is_empty() {
        return Err(ForgeError::CatalogEmpty);
    }

    let mut resolver = SelectionResolver::new(catalog);

    let os_choices: Vec<Choice> = catalog
        .systems
        .iter()
        .map(|o| choice(&o.id, &o.name))
        .collect();
    let os = Select::new("Operating system:", os_choices)
        .prompt()
        .map_err(map_inquire_err)?;
    resolver.set_os(Some(&os.id))?;

    if resolver.platform_field_visible() {
        let platforms: Vec<Choice> = resolver
            .available_platforms()
            .iter()
            .map(|p| choice(&p.id, &p.name))
            .collect();
        let platform = Select::new("Platform:", platforms)
            .prompt()
            .map_err(map_inquire_err)?;
        resolver.set_platform(Some(&platform.id))?;
    } else if let Some(id) = resolver.selection().platform.clone() {
        println!("  Platform: {id}");
    }

    if resolver.distro_field_visible() {
        let distros: Vec<Choice> = resolver
            .available_distros()
            .iter()
            .map(|d| choice(&d.id, &d.name))
            .collect();
        let distro = Select::new("Distribution:", distros)
            .prompt()
            .map_err(map_inquire_err)?;
        resolver.set_distro(Some(&distro.id))?;
    }

    let images: Vec<Choice> = resolver
        .available_images()
        .iter()
        .map(|i| choice(&i.id, &i.name))
        .collect();
    if images.is_empty() {
        return Err(ForgeError::Validation {
            message: "no images available for this selection".into(),
        });
    }
    let image = Select::new("Image:", images)
        .prompt()
        .map_err(map_inquire_err)?;
    resolver.set_image(Some(&image.id))?;

    let kind = resolver
        .resolved_image()
        .map(|i| i.kind)
        .unwrap_or(ImageKind::Other);

    if resolver.require_iso_download() {
        let (current_url, current_checksum) = {
            let (u, c) = resolver.iso_source();
            (u.to_string(), c.to_string())
        };
        let url = Text::new("ISO url/file:")
            .with_default(&current_url)
            .with_help_message("Where the service should fetch the installer ISO")
            .prompt()
            .map_err(map_inquire_err)?;
        let checksum = Text::new("ISO checksum:")
            .with_default(&current_checksum)
            .with_help_message("e.g. sha256:...")
            .prompt()
            .map_err(map_inquire_err)?;
        resolver.set_iso_source(&url, &checksum)?;
    }

    let name = Text::new("Machine name:")
        .with_default(resolver.display_name())
        .with_help_message("Leave empty for 'New VM'")
        .prompt()
        .map_err(map_inquire_err)?;

    let mut specs = SpecsOverride::default();
    if resolver.specs_section_visible() {
        let (seed_cpus, seed_memory, seed_disk) = resolver.seeded_specs();

        let cpus: u32 = CustomType::new("CPUs:")
            .with_default(seed_cpus)
            .with_error_message("Please enter a valid number")
            .with_validator(|val: &u32| {
                if *val >= 1 {
                    Ok(Validation::Valid)
                } else {
                    Ok(Validation::Invalid("Must be at least 1".into()))
                }
            })
            .prompt()
            .map_err(map_inquire_err)?;

        let memory_default = seed_memory.to_string();
        let memory = Text::new("Memory:")
            .with_default(&memory_default)
            .with_help_message("MB, or a size like '4G'")
            .with_validator(size_validator)
            .prompt()
            .map_err(map_inquire_err)?;

        let disk_default = seed_disk.to_string();
        let disk = Text::new("Disk size:")
            .with_default(&disk_default)
            .with_help_message("MB, or a size like '64G'")
            .with_validator(size_validator)
            .prompt()
            .map_err(map_inquire_err)?;

        specs.cpus = Some(cpus);
        specs.memory_mb = Some(parse_size_mb(&memory)?);
        specs.disk_mb = Some(parse_size_mb(&disk)?);

        if resolver.allow_user_override() {
            let username = Text::new("Username:")
                .with_help_message("Guest account to provision (leave empty to skip)")
                .prompt()
                .map_err(map_inquire_err)?;
            if !username.is_empty() {
                let password = Password::new("Password:")
                    .without_confirmation()
                    .prompt()
                    .map_err(map_inquire_err)?;
                specs.username = Some(username);
                specs.password = Some(password);
            }
        }
    }

    let mut options = OptionsOverride::default();
    if resolver.options_section_visible() {
        let headless = Confirm::new("Start headless?")
            .with_default(true)
            .with_help_message("Run without a console window")
            .prompt()
            .map_err(map_inquire_err)?;
        options.start_headless = Some(headless);

        if kind == ImageKind::Packer {
            let vagrant = Confirm::new("Generate a Vagrant box?")
                .with_default(false)
                .prompt()
                .map_err(map_inquire_err)?;
            options.generate_vagrant_box = Some(vagrant);
        }
    }

    if resolver.addons_section_visible() {
        let addon_choices: Vec<Choice> = resolver
            .resolved_image()
            .map(|i| i.addons.iter().map(|a| choice(&a.id, &a.name)).collect())
            .unwrap_or_default();
        let selected = MultiSelect::new("Addons to deploy:", addon_choices)
            .prompt()
            .map_err(map_inquire_err)?;
        for addon in &selected {
            resolver.toggle_addon(&addon.id, true)?;
        }
    }

    let request = resolver.build_request(Some(&name), &specs, &options)?;

    let verb = match kind {
        ImageKind::Internal => "Attach appliance",
        ImageKind::Packer if request.flags.generate_vagrant_box => "Generate Vagrant box",
        _ => "Create VM",
    };
    let confirmed = Confirm::new(&format!("{verb} '{}'?", request.name))
        .with_default(true)
        .prompt()
        .map_err(map_inquire_err)?;
    if !confirmed {
        return Err(ForgeError::Cancelled);
    }

    Ok(request)
}
