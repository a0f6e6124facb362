use clap::Parser;
use console::style;
use inquire::Confirm;

use vmforge::catalog::{Catalog, Image, PlatformImages};
use vmforge::cli::{Cli, Command, CreateArgs, GroupCommand};
use vmforge::config::{self, ClientConfig};
use vmforge::error::ForgeError;
use vmforge::groups::{GroupStore, NO_GROUP_ID, NO_GROUP_NAME};
use vmforge::progress::{OutputMode, SubmitSpinner};
use vmforge::request::CreationRequest;
use vmforge::resolver::{OptionsOverride, SelectionResolver, SpecsOverride};
use vmforge::service::{HttpMachineService, MachineService};
use vmforge::telemetry::{self, TelemetryEvent};
use vmforge::wizard::map_inquire_err;
use vmforge::{logging, paths, util, wizard};

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    let mode = OutputMode::resolve(cli.plain, cli.quiet);

    let config = config::load_config(cli.config.as_deref())?;

    // File logging only for the create flow — the long-running one
    let log_file = matches!(cli.command, Command::Create(_))
        .then(|| paths::logs_dir(&config.data_dir).join("vmforge.log"));
    logging::init(mode, cli.verbose, log_file.as_deref());

    let result = match cli.command {
        Command::Create(args) => run_create(args, &config, mode).await,
        Command::Catalog { json, catalog } => run_catalog(json, catalog.as_deref(), &config).await,
        Command::Group { action } => run_group(action, &config),
    };

    match result {
        Err(ForgeError::Cancelled) => {
            println!("Cancelled.");
            Ok(())
        }
        other => other.map_err(Into::into),
    }
}

// ── create ───────────────────────────────────────────────

async fn run_create(
    args: CreateArgs,
    config: &ClientConfig,
    mode: OutputMode,
) -> Result<(), ForgeError> {
    let service = HttpMachineService::new(
        &config.endpoint,
        args.catalog.as_deref().or(config.catalog.as_deref()),
    )?;

    let catalog = service.fetch_catalog().await?;
    if catalog.is_empty() {
        return Err(ForgeError::CatalogEmpty);
    }

    // Validate the target group before doing anything long-running
    let groups_path = paths::groups_file(&config.data_dir);
    if let Some(group) = &args.group {
        let store = GroupStore::load(&groups_path)?;
        if store.get_group(group).is_none() {
            return Err(ForgeError::Validation {
                message: format!("no such group '{group}'"),
            });
        }
    }

    let interactive = args.os.is_none() && args.image.is_none();
    let request = if interactive {
        wizard::run(&catalog)?
    } else {
        build_from_flags(&args, &catalog)?
    };

    if args.dry_run {
        println!("{}", request.to_json());
        return Ok(());
    }

    let sink = telemetry::create_sink(config.telemetry_enabled, config.telemetry_path.clone());
    sink.emit(&TelemetryEvent::CreateStarted {
        name: request.name.clone(),
    });

    let spinner = SubmitSpinner::start(&format!("Creating VM {}", request.name), mode);
    match service.create(&request).await {
        Ok(outcome) => {
            spinner.finish_ok(&format!("VM {} created", request.name));
            sink.emit(&TelemetryEvent::CreateCompleted {
                name: request.name.clone(),
            });
            tracing::info!(name = %request.name, machine_id = %outcome.machine_id, "VM created");

            let machine = if outcome.machine_id.is_empty() {
                request.name.clone()
            } else {
                outcome.machine_id
            };
            let group = args.group.as_deref().unwrap_or(NO_GROUP_ID);
            let mut store = GroupStore::load(&groups_path)?;
            store.add_vm_to_group(group, &machine)?;
            store.save()?;

            println!(
                "VM '{}' created successfully",
                style(&request.name).green()
            );
            Ok(())
        }
        Err(e) => {
            spinner.finish_err(&format!("VM {} not created", request.name));
            sink.emit(&TelemetryEvent::CreateFailed {
                name: request.name.clone(),
                error: e.to_string(),
            });
            tracing::error!(name = %request.name, error = %e, "creation failed");
            Err(e)
        }
    }
}

/// Non-interactive path: the selection chain comes from flags and the
/// resolver enforces the same ordering and validation as the wizard.
fn build_from_flags(args: &CreateArgs, catalog: &Catalog) -> Result<CreationRequest, ForgeError> {
    let mut resolver = SelectionResolver::new(catalog);

    if args.os.is_some() {
        resolver.set_os(args.os.as_deref())?;
    }
    if args.platform.is_some() {
        resolver.set_platform(args.platform.as_deref())?;
    }
    if args.distro.is_some() {
        resolver.set_distro(args.distro.as_deref())?;
    }
    if args.image.is_some() {
        resolver.set_image(args.image.as_deref())?;
    }

    if args.iso_url.is_some() || args.iso_checksum.is_some() {
        let (url, checksum) = {
            let (u, c) = resolver.iso_source();
            (u.to_string(), c.to_string())
        };
        resolver.set_iso_source(
            args.iso_url.as_deref().unwrap_or(&url),
            args.iso_checksum.as_deref().unwrap_or(&checksum),
        )?;
    }

    for addon in &args.addons {
        resolver.toggle_addon(addon, true)?;
    }

    if let Some(name) = &args.name {
        if !name.trim().is_empty() {
            util::validate_name(name)?;
        }
    }

    let specs = SpecsOverride {
        cpus: args.cpus,
        memory_mb: args.memory.as_deref().map(util::parse_size_mb).transpose()?,
        disk_mb: args.disk.as_deref().map(util::parse_size_mb).transpose()?,
        username: args.username.clone(),
        password: args.password.clone(),
    };
    let options = OptionsOverride {
        start_headless: args.headless,
        generate_vagrant_box: args.vagrant_box.then_some(true),
    };

    resolver.build_request(args.name.as_deref(), &specs, &options)
}

// ── catalog ──────────────────────────────────────────────

async fn run_catalog(
    json: bool,
    catalog_flag: Option<&str>,
    config: &ClientConfig,
) -> Result<(), ForgeError> {
    let service = HttpMachineService::new(
        &config.endpoint,
        catalog_flag.or(config.catalog.as_deref()),
    )?;

    let text = service.fetch_catalog_text().await?;
    let catalog = Catalog::from_json(&text)?;
    if catalog.is_empty() {
        return Err(ForgeError::CatalogEmpty);
    }

    if json {
        println!("{text}");
    } else {
        print_catalog(&catalog);
    }
    Ok(())
}

fn print_image(image: &Image, indent: usize) {
    let name = if image.name.is_empty() {
        &image.id
    } else {
        &image.name
    };
    println!(
        "{:indent$}{name} ({}, {})",
        "",
        image.id,
        style(image.kind).dim()
    );
}

fn print_catalog(catalog: &Catalog) {
    for os in &catalog.systems {
        println!("{} ({})", style(&os.name).bold(), os.id);
        for platform in &os.platforms {
            println!("  {} ({})", platform.name, platform.id);
            match &platform.images {
                PlatformImages::ViaDistro(distros) => {
                    for distro in distros {
                        println!("    {} ({})", distro.name, distro.id);
                        for image in &distro.images {
                            print_image(image, 6);
                        }
                    }
                }
                PlatformImages::Direct(images) => {
                    for image in images {
                        print_image(image, 4);
                    }
                }
            }
        }
    }
}

// ── groups ───────────────────────────────────────────────

fn run_group(action: GroupCommand, config: &ClientConfig) -> Result<(), ForgeError> {
    let path = paths::groups_file(&config.data_dir);
    let mut store = GroupStore::load(&path)?;

    match action {
        GroupCommand::List => {
            for group in store.groups() {
                println!("{} ({})", style(&group.name).bold(), group.id);
                for machine in &group.machines {
                    println!("  {machine}");
                }
            }
            Ok(())
        }
        GroupCommand::Add { name } => {
            let id = store.create_group(&name)?.id.clone();
            store.save()?;
            println!("Created group '{id}'");
            Ok(())
        }
        GroupCommand::Assign { vm, group } => {
            store.add_vm_to_group(&group, &vm)?;
            store.save()?;
            println!("Moved '{vm}' to '{group}'");
            Ok(())
        }
        GroupCommand::Remove { id, yes } => {
            let Some(group) = store.get_group(&id) else {
                println!("Group '{id}' not found — nothing to do");
                return Ok(());
            };
            let name = group.name.clone();

            if !yes {
                let confirmed = Confirm::new(&format!(
                    "Remove group '{name}'? Its machines move to '{NO_GROUP_NAME}'"
                ))
                .with_default(false)
                .prompt()
                .map_err(map_inquire_err)?;
                if !confirmed {
                    return Err(ForgeError::Cancelled);
                }
            }

            store.remove_group(&id)?;
            store.save()?;

            let sink =
                telemetry::create_sink(config.telemetry_enabled, config.telemetry_path.clone());
            sink.emit(&TelemetryEvent::GroupRemoved { id: id.clone() });
            tracing::info!(group = %id, "group removed");
            println!("Group '{name}' removed");
            Ok(())
        }
    }
}
