use clap::{Parser, Subcommand};
use console::style;
use std::path::{Path, PathBuf};
use tracing::debug;

use brewform_core::{BrewformConfig, default_config_path, init_logger};

use crate::apply::{Applier, apply_manifest};
use crate::brew::{PlatformProfile, ProfileName, SystemRunner};
use crate::core::manifest::Manifest;
use crate::core::resource::{Ensure, PackageFact, PackageResource, ProviderKind, TapFact, TapResource};
use crate::provider::{HomebrewProvider, Provider, TapProvider, Upgradeable};
use crate::utils::filesystem::file_exists;
use crate::utils::{ProviderError, ProviderResult, log_step, log_success, log_warning, resolve_manifest_path};

#[derive(Debug, Parser)]
#[command(author, version = crate::VERSION, about = "Declarative Homebrew package and tap management", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ~/.brewform/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Homebrew installation to drive (homebrew, homebrew-arm)
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Use this brew binary instead of the profile default
    #[arg(long, global = true)]
    pub brew: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List installed formulae and casks with their versions
    List,

    /// Show the installed versions of a package
    Query {
        name: String,
    },

    /// Print the version text of an installed package
    Latest {
        name: String,
    },

    /// Install a formula, falling back to a cask
    Install {
        name: String,

        /// present, latest or a version (installs name@version)
        #[arg(long, default_value = "present")]
        ensure: String,

        /// Extra argument passed to brew install (repeatable)
        #[arg(long = "option", allow_hyphen_values = true)]
        options: Vec<String>,
    },

    /// Uninstall a formula, falling back to a cask
    Uninstall {
        name: String,

        /// Extra argument passed to brew uninstall (repeatable)
        #[arg(long = "option", allow_hyphen_values = true)]
        options: Vec<String>,
    },

    /// Upgrade an installed package
    Update {
        name: String,
    },

    /// Manage taps (lists taps without a subcommand)
    Tap {
        #[command(subcommand)]
        action: Option<TapCommands>,
    },

    /// Bring taps and packages in line with a manifest
    Apply {
        /// Path to the manifest TOML file
        manifest: String,

        /// Show what would change without changing anything
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum TapCommands {
    /// List tapped repositories
    List,

    /// Tap a repository
    Add {
        name: String,

        /// Extra argument passed to brew tap (repeatable)
        #[arg(long = "option", allow_hyphen_values = true)]
        options: Vec<String>,
    },

    /// Untap a repository
    Remove {
        name: String,
    },
}

/// Profile from the command line, then the config file, then `homebrew`
///
/// A brew path from either source replaces the profile default, the
/// command line winning.
pub fn resolve_profile(
    profile: Option<&str>,
    brew: Option<&Path>,
    config: &BrewformConfig,
) -> ProviderResult<PlatformProfile> {
    let name = match profile.or(config.profile.as_deref()) {
        Some(name) => name.parse::<ProfileName>()?,
        None => ProfileName::Homebrew,
    };

    let mut resolved = name.profile();
    let brew_path = brew.map(Path::to_path_buf).or_else(|| config.expanded_brew_path());
    if let Some(path) = brew_path {
        resolved = resolved.with_brew_path(path);
    }

    debug!("Using {} profile with {}", resolved.kind, resolved.brew_path.display());
    Ok(resolved)
}

/// Tap management always goes through the Apple Silicon installation,
/// unless the selected profile already points at one
fn tap_profile(profile: &PlatformProfile) -> PlatformProfile {
    match profile.kind {
        ProviderKind::HomebrewArm => PlatformProfile::tap_arm().with_brew_path(profile.brew_path.clone()),
        _ => PlatformProfile::tap_arm(),
    }
}

fn load_config(path: Option<&Path>) -> ProviderResult<BrewformConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Ok(path) => path,
            Err(e) => {
                debug!("No default config location ({}), using defaults", e);
                return Ok(BrewformConfig::default());
            }
        },
    };
    Ok(BrewformConfig::load_or_default(&path)?)
}

pub fn run() -> ProviderResult<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logger(cli.verbose || config.verbose);

    let profile = resolve_profile(cli.profile.as_deref(), cli.brew.as_deref(), &config)?;
    let runner = SystemRunner::new();
    let packages = HomebrewProvider::new(runner, profile.clone());

    match cli.command {
        Commands::List => {
            print_packages(&packages.instances()?);
            Ok(())
        }
        Commands::Query { name } => {
            match packages.query(&PackageResource::new(name.as_str(), Ensure::Present))? {
                Some(fact) => print_packages(&[fact]),
                None => log_warning(&format!("Package {} is not installed", name)),
            }
            Ok(())
        }
        Commands::Latest { name } => {
            if let Some(version) = packages.latest(&PackageResource::new(name.as_str(), Ensure::Present))? {
                println!("{}", version);
            }
            Ok(())
        }
        Commands::Install { name, ensure, options } => {
            let resource = PackageResource::new(name, ensure.as_str()).with_install_options(options);
            log_step(&format!("Installing {}", resource.install_target()));
            packages.install(&resource)?;
            log_success(&format!("Installed {}", resource.install_target()));
            Ok(())
        }
        Commands::Uninstall { name, options } => {
            let resource = PackageResource::new(name, Ensure::Absent).with_uninstall_options(options);
            log_step(&format!("Uninstalling {}", resource.resolved_name()));
            packages.uninstall(&resource)?;
            log_success(&format!("Uninstalled {}", resource.resolved_name()));
            Ok(())
        }
        Commands::Update { name } => {
            let resource = PackageResource::new(name, Ensure::Latest);
            log_step(&format!("Updating {}", resource.resolved_name()));
            packages.update(&resource)?;
            log_success(&format!("Updated {}", resource.resolved_name()));
            Ok(())
        }
        Commands::Tap { action } => {
            let taps = TapProvider::new(runner, tap_profile(&profile));
            match action.unwrap_or(TapCommands::List) {
                TapCommands::List => print_taps(&taps.instances()?),
                TapCommands::Add { name, options } => {
                    let mut resource = TapResource::new(name, Ensure::Present);
                    resource.install_options = options;
                    taps.install(&resource)?;
                    log_success(&format!("Tapped {}", resource.resolved_name()));
                }
                TapCommands::Remove { name } => {
                    let resource = TapResource::new(name, Ensure::Absent);
                    taps.uninstall(&resource)?;
                    log_success(&format!("Untapped {}", resource.resolved_name()));
                }
            }
            Ok(())
        }
        Commands::Apply { manifest, dry_run } => {
            let path = resolve_manifest_path(&manifest);
            if !file_exists(&path) {
                return Err(ProviderError::Manifest(format!("manifest not found: {}", path.display())));
            }
            let manifest = Manifest::from_file(&path)?;
            log_step(&format!("Applying {}", path.display()));

            let applier = Applier::new(runner, profile);
            let summary = apply_manifest(&manifest, &applier, dry_run);

            let verb = if dry_run { "would change" } else { "changed" };
            println!(
                "{} {}, {} unchanged, {} failed",
                style(summary.changes.len()).bold(),
                verb,
                summary.unchanged,
                summary.failed()
            );
            summary.into_result().map(|_| ())
        }
    }
}

fn print_packages(facts: &[PackageFact]) {
    for fact in facts {
        println!("{} {} {}", style(&fact.name).bold(), fact.ensure, style(format!("({})", fact.provider)).dim());
    }
}

fn print_taps(facts: &[TapFact]) {
    for fact in facts {
        println!("{}", style(&fact.name).bold());
    }
}
