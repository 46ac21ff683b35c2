//! Settings management (`settings.toml`)
//!
//! The settings file belongs to the front-end; the pipeline only reads the
//! directory paths and display options from it. Missing keys fall back to
//! directories relative to the working directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LaunchError, Result};

/// File name of the settings file inside the config directory.
pub const SETTINGS_FILE: &str = "settings.toml";

/// User settings consumed by the launch pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// ROM library root (informational)
    #[serde(default = "default_rom_path")]
    pub rom_path: PathBuf,
    /// Firmware root; each platform reads `<bios_path>/<platform>/`
    #[serde(default = "default_bios_path")]
    pub bios_path: PathBuf,
    /// Directory holding `*_libretro.<suffix>` cores
    #[serde(default = "default_core_path")]
    pub core_path: PathBuf,
    /// Save root; each platform writes `<save_path>/<platform>/`
    #[serde(default = "default_save_path")]
    pub save_path: PathBuf,
    /// Extraction cache root
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
    /// Launch the host fullscreen (default: false)
    #[serde(default)]
    pub fullscreen: bool,
    /// Enable vertical sync (default: true)
    #[serde(default = "default_true")]
    pub vsync: bool,
}

fn default_rom_path() -> PathBuf {
    PathBuf::from("roms")
}
fn default_bios_path() -> PathBuf {
    PathBuf::from("bios")
}
fn default_core_path() -> PathBuf {
    PathBuf::from("cores")
}
fn default_save_path() -> PathBuf {
    PathBuf::from("saves")
}
fn default_cache_path() -> PathBuf {
    PathBuf::from("cache")
}
fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rom_path: default_rom_path(),
            bios_path: default_bios_path(),
            core_path: default_core_path(),
            save_path: default_save_path(),
            cache_path: default_cache_path(),
            fullscreen: false,
            vsync: default_true(),
        }
    }
}

impl Settings {
    /// Read `<config_dir>/settings.toml`, or defaults if the file does not exist.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let path = config_dir.join(SETTINGS_FILE);
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| LaunchError::ConfigInvalid {
                path,
                message: e.message().to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(LaunchError::io(&path, e)),
        }
    }

    /// Write `<config_dir>/settings.toml`, creating the directory if needed.
    pub fn save(&self, config_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(config_dir).map_err(|e| LaunchError::io(config_dir, e))?;
        let path = config_dir.join(SETTINGS_FILE);
        let content = toml::to_string_pretty(self).map_err(|e| LaunchError::ConfigInvalid {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| LaunchError::io(&path, e))
    }

    /// Freeze the settings into the configuration the orchestrator runs with.
    pub fn launch_config(&self) -> LaunchConfig {
        LaunchConfig {
            core_root: self.core_path.clone(),
            rom_root: self.rom_path.clone(),
            firmware_root: self.bios_path.clone(),
            save_root: self.save_path.clone(),
            cache_root: self.cache_path.clone(),
            display: DisplayOptions {
                fullscreen: self.fullscreen,
                vsync: self.vsync,
            },
        }
    }
}

/// Host display flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayOptions {
    pub fullscreen: bool,
    pub vsync: bool,
}

/// Process-wide launch configuration. Built once, never mutated by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    pub core_root: PathBuf,
    /// Informational only; entries carry their own paths.
    pub rom_root: PathBuf,
    pub firmware_root: PathBuf,
    pub save_root: PathBuf,
    pub cache_root: PathBuf,
    pub display: DisplayOptions,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Settings::default().launch_config()
    }
}

/// Platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\RetroLaunch\config`
/// On macOS: `~/Library/Application Support/io.retrolaunch.RetroLaunch`
/// On Linux: `~/.config/retrolaunch`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.retrolaunch", "", "RetroLaunch")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.rom_path, PathBuf::from("roms"));
        assert_eq!(settings.bios_path, PathBuf::from("bios"));
        assert_eq!(settings.core_path, PathBuf::from("cores"));
        assert_eq!(settings.save_path, PathBuf::from("saves"));
        assert_eq!(settings.cache_path, PathBuf::from("cache"));
        assert!(!settings.fullscreen);
        assert!(settings.vsync);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        assert_eq!(Settings::load(temp.path()).unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(SETTINGS_FILE),
            "core_path = \"/opt/cores\"\nfullscreen = true\nunrelated = 3\n",
        )
        .unwrap();

        let settings = Settings::load(temp.path()).unwrap();
        assert_eq!(settings.core_path, PathBuf::from("/opt/cores"));
        assert!(settings.fullscreen);
        assert_eq!(settings.bios_path, PathBuf::from("bios"));
        assert!(settings.vsync);
    }

    #[test]
    fn test_malformed_file_is_config_invalid() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(SETTINGS_FILE), "core_path = [").unwrap();

        let err = Settings::load(temp.path()).unwrap_err();
        assert!(matches!(err, LaunchError::ConfigInvalid { .. }), "{:?}", err);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_save_round_trip() {
        let temp = TempDir::new().unwrap();
        let settings = Settings {
            save_path: PathBuf::from("/data/saves"),
            vsync: false,
            ..Settings::default()
        };
        settings.save(&temp.path().join("cfg")).unwrap();

        assert_eq!(Settings::load(&temp.path().join("cfg")).unwrap(), settings);
    }

    #[test]
    fn test_launch_config_mapping() {
        let settings = Settings {
            bios_path: PathBuf::from("/bios"),
            fullscreen: true,
            ..Settings::default()
        };
        let config = settings.launch_config();
        assert_eq!(config.firmware_root, PathBuf::from("/bios"));
        assert_eq!(config.core_root, PathBuf::from("cores"));
        assert!(config.display.fullscreen);
        assert!(config.display.vsync);
    }
}
