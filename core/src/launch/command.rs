//! Host command construction.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::settings::DisplayOptions;

/// Executable name of the emulator host, looked up on `PATH`.
pub const HOST_EXECUTABLE: &str = "retroarch";

pub const ENV_SYSTEM_DIRECTORY: &str = "SYSTEM_DIRECTORY";
pub const ENV_SRAM_DIRECTORY: &str = "SRAM_DIRECTORY";
pub const ENV_SAVESTATE_DIRECTORY: &str = "SAVESTATE_DIRECTORY";

/// Fully prepared host invocation.
///
/// Argument order is fixed:
/// `-L <core> <rom> --system <dir> --savefile <dir> --savestate <dir>
/// [--fullscreen] [--vsync] --verbose`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub program: String,
    pub args: Vec<OsString>,
    /// Variables added on top of the inherited environment, overriding existing values.
    pub env: Vec<(&'static str, PathBuf)>,
    pub core_path: PathBuf,
    pub rom_path: PathBuf,
    pub system_dir: PathBuf,
    pub save_dir: PathBuf,
}

impl LaunchPlan {
    pub fn new(
        program: impl Into<String>,
        core_path: &Path,
        rom_path: &Path,
        system_dir: &Path,
        save_dir: &Path,
        display: DisplayOptions,
    ) -> Self {
        let mut args: Vec<OsString> = vec![
            "-L".into(),
            core_path.into(),
            rom_path.into(),
            "--system".into(),
            system_dir.into(),
            "--savefile".into(),
            save_dir.into(),
            "--savestate".into(),
            save_dir.into(),
        ];
        if display.fullscreen {
            args.push("--fullscreen".into());
        }
        if display.vsync {
            args.push("--vsync".into());
        }
        args.push("--verbose".into());

        let env = vec![
            (ENV_SYSTEM_DIRECTORY, system_dir.to_path_buf()),
            (ENV_SRAM_DIRECTORY, save_dir.to_path_buf()),
            (ENV_SAVESTATE_DIRECTORY, save_dir.to_path_buf()),
        ];

        Self {
            program: program.into(),
            args,
            env,
            core_path: core_path.to_path_buf(),
            rom_path: rom_path.to_path_buf(),
            system_dir: system_dir.to_path_buf(),
            save_dir: save_dir.to_path_buf(),
        }
    }

    /// Command running `executable` with this plan's arguments and environment.
    ///
    /// `executable` is normally the `PATH`-resolved location of [`LaunchPlan::program`].
    /// Stdio is inherited.
    pub fn command(&self, executable: &Path) -> Command {
        let mut cmd = Command::new(executable);
        cmd.args(&self.args);
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }

    /// Space-joined command line for display and logging.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(|arg| arg.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
