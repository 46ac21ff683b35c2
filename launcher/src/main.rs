//! RetroLaunch - command-line front-end
//!
//! # Commands
//!
//! - `retrolaunch launch <PLATFORM> <PATH>...` - Prepare an entry and run it in the host
//! - `retrolaunch platforms` - List configured platforms
//! - `retrolaunch verify <PLATFORM>` - Check mandatory firmware
//! - `retrolaunch cache size|clear` - Inspect or clear the extraction cache
//!
//! Every failure is reported as a single `error[<kind>]: <message>` line on
//! stderr and the process exits with the code mapped from the error kind.

mod cli;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use retrolaunch_core::{
    Extractor, GameEntry, LaunchError, Launcher, PlatformRegistry, Settings, firmware, settings,
};

use crate::cli::{CacheCommand, Cli, Commands, LaunchArgs};

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so `--dry-run` output stays clean on stdout
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        std::process::exit(report(&err));
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_dir = resolve_config_dir(cli.config_dir)?;
    tracing::debug!("Using config directory {}", config_dir.display());

    match cli.command {
        Commands::Launch(args) => launch(&config_dir, args),
        Commands::Platforms => list_platforms(&config_dir),
        Commands::Verify { platform } => verify(&config_dir, &platform),
        Commands::Cache(command) => cache(&config_dir, command),
    }
}

fn resolve_config_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    match explicit {
        Some(dir) => Ok(dir),
        None => settings::config_dir().context("could not determine a config directory"),
    }
}

/// Print the single-line failure report and return the exit code.
fn report(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<LaunchError>() {
        Some(launch_err) => {
            eprintln!("error[{}]: {}", launch_err.kind(), launch_err);
            launch_err.exit_code()
        }
        None => {
            eprintln!("error: {:#}", err);
            1
        }
    }
}

fn launch(config_dir: &std::path::Path, args: LaunchArgs) -> Result<()> {
    let settings = Settings::load(config_dir)?;
    let registry = PlatformRegistry::load(config_dir)?;

    let descriptor = registry
        .get(&args.platform)
        .ok_or_else(|| LaunchError::UnknownPlatform(args.platform.clone()))?;
    let entry = GameEntry::classify(args.platform.as_str(), &args.paths, descriptor)?
        .with_rom_files(args.rom_files.clone());

    let mut config = settings.launch_config();
    config.display = args.display(config.display);

    tracing::info!(
        "Preparing {} entry {} for {}",
        entry.source.kind_name(),
        entry.display_path().display(),
        entry.platform
    );

    let mut launcher = Launcher::new(config, registry);

    if args.dry_run {
        let plan = launcher.plan(&entry)?;
        println!("{}", plan.command_line());
        return Ok(());
    }

    let outcome = launcher.launch(&entry)?;
    if outcome.success() {
        tracing::info!("Host exited cleanly");
    }
    Ok(())
}

fn list_platforms(config_dir: &std::path::Path) -> Result<()> {
    let registry = PlatformRegistry::load(config_dir)?;

    for (name, descriptor) in registry.iter() {
        let firmware = if descriptor.firmware_required {
            format!(
                "  firmware: {}",
                descriptor
                    .firmware_files
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        } else {
            String::new()
        };
        println!(
            "{:<18} {:<22} {}{}",
            name,
            descriptor.core_basename(),
            descriptor.extensions.join(" "),
            firmware
        );
    }
    Ok(())
}

fn verify(config_dir: &std::path::Path, platform: &str) -> Result<()> {
    let settings = Settings::load(config_dir)?;
    let registry = PlatformRegistry::load(config_dir)?;

    if registry.get(platform).is_none() {
        return Err(LaunchError::UnknownPlatform(platform.to_string()).into());
    }

    let report = firmware::verify(&registry, platform, &settings.bios_path);
    if !report.ok {
        return Err(LaunchError::FirmwareMissing {
            platform: platform.to_string(),
            missing: report.missing,
            message: report.message,
        }
        .into());
    }

    println!("{}: {}", platform, report.message);
    Ok(())
}

fn cache(config_dir: &std::path::Path, command: CacheCommand) -> Result<()> {
    let settings = Settings::load(config_dir)?;
    let mut extractor = Extractor::for_cache_path(&settings.cache_path);

    match command {
        CacheCommand::Size => {
            println!(
                "{} ({})",
                format_size(extractor.cache_size()),
                extractor.cache_root().display()
            );
        }
        CacheCommand::Clear => {
            let freed = extractor.cache_size();
            extractor.clear_cache()?;
            println!("Cleared {} from {}", format_size(freed), extractor.cache_root().display());
        }
    }
    Ok(())
}

/// Human-readable byte count using binary units.
fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
