use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "vmforge",
    about = "Create and manage virtual machines via a composer service"
)]
pub struct Cli {
    /// Path to the client config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Plain output — no spinners or ANSI styling
    #[arg(long)]
    pub plain: bool,

    /// Essential output only
    #[arg(short, long)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new virtual machine (interactive unless --os/--image are given)
    Create(CreateArgs),

    /// Show the image catalog
    Catalog {
        /// Print the raw catalog JSON instead of the tree
        #[arg(long)]
        json: bool,

        /// Catalog source override (URL or path to a JSON file)
        #[arg(long)]
        catalog: Option<String>,
    },

    /// Manage VM groups
    Group {
        #[command(subcommand)]
        action: GroupCommand,
    },
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Operating system id
    #[arg(long)]
    pub os: Option<String>,

    /// Platform id (may be omitted for single-platform systems)
    #[arg(long)]
    pub platform: Option<String>,

    /// Distribution id (Linux-style platforms only)
    #[arg(long)]
    pub distro: Option<String>,

    /// Image id
    #[arg(long)]
    pub image: Option<String>,

    /// Machine name (defaults to the image display name)
    #[arg(long)]
    pub name: Option<String>,

    /// Number of virtual CPUs
    #[arg(long)]
    pub cpus: Option<u32>,

    /// Memory size — MB, or a size like '4G'
    #[arg(long)]
    pub memory: Option<String>,

    /// Disk size — MB, or a size like '64G'
    #[arg(long)]
    pub disk: Option<String>,

    /// Guest username to provision
    #[arg(long)]
    pub username: Option<String>,

    /// Guest password to provision
    #[arg(long)]
    pub password: Option<String>,

    /// Start the VM without a console window (on unless set to false)
    #[arg(long)]
    pub headless: Option<bool>,

    /// Generate a Vagrant box instead of a plain VM (packer images)
    #[arg(long)]
    pub vagrant_box: bool,

    /// ISO url/file override for images that require one
    #[arg(long)]
    pub iso_url: Option<String>,

    /// Checksum for the ISO override
    #[arg(long)]
    pub iso_checksum: Option<String>,

    /// Addon id to deploy (repeatable)
    #[arg(long = "addon")]
    pub addons: Vec<String>,

    /// Group to place the created machine in
    #[arg(long)]
    pub group: Option<String>,

    /// Catalog source override (URL or path to a JSON file)
    #[arg(long)]
    pub catalog: Option<String>,

    /// Print the creation request as JSON instead of submitting it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Subcommand, Debug)]
pub enum GroupCommand {
    /// List groups and their machines
    List,

    /// Create a new group
    Add {
        /// Display name; the id is a slug of it
        name: String,
    },

    /// Move a machine into a group
    Assign {
        /// Machine id
        vm: String,
        /// Target group id
        group: String,
    },

    /// Remove a group — its machines move to the default bucket
    Remove {
        /// Group id
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}
