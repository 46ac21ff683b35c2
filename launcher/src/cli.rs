//! Command-line surface.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use retrolaunch_core::DisplayOptions;

/// RetroLaunch - run ROMs through a libretro emulator host
#[derive(Debug, Parser)]
#[command(name = "retrolaunch")]
#[command(about = "Run ROMs, archives and disk sets through a libretro emulator host")]
#[command(version)]
pub struct Cli {
    /// Directory holding settings.toml and platforms.json
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Prepare an entry and run it in the emulator host
    Launch(LaunchArgs),

    /// List configured platforms
    Platforms,

    /// Check mandatory firmware for a platform
    Verify {
        /// Platform display name, e.g. "PlayStation"
        platform: String,
    },

    /// Inspect or clear the extraction cache
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Debug, Subcommand)]
pub enum CacheCommand {
    /// Print the total size of cached extractions
    Size,
    /// Delete every cached extraction
    Clear,
}

#[derive(Debug, Args)]
pub struct LaunchArgs {
    /// Platform display name, e.g. "Amiga"
    pub platform: String,

    /// ROM file, archive, or folder; several paths form a multi-disk set
    #[arg(required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// Preferred main file inside an archive or folder (repeatable)
    #[arg(long = "rom-file", action = ArgAction::Append)]
    pub rom_files: Vec<PathBuf>,

    /// Run the host fullscreen
    #[arg(long, overrides_with = "windowed")]
    pub fullscreen: bool,

    /// Run the host in a window
    #[arg(long, overrides_with = "fullscreen")]
    pub windowed: bool,

    /// Enable vertical sync
    #[arg(long, overrides_with = "no_vsync")]
    pub vsync: bool,

    /// Disable vertical sync
    #[arg(long, overrides_with = "vsync")]
    pub no_vsync: bool,

    /// Print the host command line instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

impl LaunchArgs {
    /// Apply the display flags on top of the configured options.
    pub fn display(&self, configured: DisplayOptions) -> DisplayOptions {
        let mut display = configured;
        if self.fullscreen {
            display.fullscreen = true;
        } else if self.windowed {
            display.fullscreen = false;
        }
        if self.vsync {
            display.vsync = true;
        } else if self.no_vsync {
            display.vsync = false;
        }
        display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("retrolaunch").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_launch_with_disks_and_hints() {
        let cli = parse(&[
            "launch",
            "Amiga",
            "disk1.adf",
            "disk2.adf",
            "--rom-file",
            "game.adf",
            "--dry-run",
        ]);
        let Commands::Launch(args) = cli.command else {
            panic!("expected launch");
        };
        assert_eq!(args.platform, "Amiga");
        assert_eq!(
            args.paths,
            vec![PathBuf::from("disk1.adf"), PathBuf::from("disk2.adf")]
        );
        assert_eq!(args.rom_files, vec![PathBuf::from("game.adf")]);
        assert!(args.dry_run);
    }

    #[test]
    fn test_launch_requires_a_path() {
        let result = Cli::try_parse_from(["retrolaunch", "launch", "NES"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["cache", "size", "--config-dir", "/tmp/cfg", "-v"]);
        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/cfg")));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Cache(CacheCommand::Size)));
    }

    #[test]
    fn test_display_overrides() {
        let configured = DisplayOptions {
            fullscreen: false,
            vsync: true,
        };

        let Commands::Launch(args) = parse(&["launch", "NES", "a.nes"]).command else {
            panic!("expected launch");
        };
        assert_eq!(args.display(configured), configured);

        let Commands::Launch(args) =
            parse(&["launch", "NES", "a.nes", "--fullscreen", "--no-vsync"]).command
        else {
            panic!("expected launch");
        };
        assert_eq!(
            args.display(configured),
            DisplayOptions {
                fullscreen: true,
                vsync: false,
            }
        );

        let Commands::Launch(args) = parse(&["launch", "NES", "a.nes", "--windowed"]).command
        else {
            panic!("expected launch");
        };
        assert!(!args.display(DisplayOptions {
            fullscreen: true,
            vsync: true,
        })
        .fullscreen);
    }
}
