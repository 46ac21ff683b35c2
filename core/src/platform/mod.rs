//! Platform registry
//!
//! Per-platform descriptors keyed by display name. Each descriptor tells the
//! rest of the pipeline which core to load, which file extensions count as
//! ROMs, whether archives must be unpacked, and which firmware is mandatory.
//!
//! The registry is pure data: it can be loaded from `platforms.json`, built
//! from the built-in defaults, or injected directly in tests.

mod defaults;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LaunchError, Result};

pub use defaults::builtin_platforms;

/// File name of the persisted registry inside the config directory.
pub const PLATFORMS_FILE: &str = "platforms.json";

/// Infix every discoverable core file carries before its suffix.
pub const CORE_INFIX: &str = "_libretro";

/// Whether the emulator host can open archives itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArchivePolicy {
    /// Host accepts the archive as the content path.
    Native,
    /// Archive must be unpacked before launch.
    #[default]
    Extract,
}

/// Everything the pipeline needs to know about one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDescriptor {
    /// Core basename without the shared-library suffix.
    pub core_filename: String,
    /// Lowercase extensions with leading dot, in preference order.
    pub extensions: Vec<String>,
    #[serde(default)]
    pub archive_policy: ArchivePolicy,
    /// Keep extracted archives in the persistent cache instead of staging.
    #[serde(default)]
    pub cache_extracted: bool,
    #[serde(default)]
    pub firmware_required: bool,
    /// Firmware filename -> human description.
    #[serde(default)]
    pub firmware_files: BTreeMap<String, String>,
}

impl PlatformDescriptor {
    /// Case-insensitive suffix check of `filename` against the extension list.
    pub fn matches_extension(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        self.extensions
            .iter()
            .any(|ext| lower.ends_with(ext.to_lowercase().as_str()))
    }

    /// Core basename including the `_libretro` infix.
    pub fn core_basename(&self) -> String {
        with_core_infix(&self.core_filename)
    }

    /// Check the descriptor invariants, returning a description of the first violation.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.core_filename.trim().is_empty() {
            return Err("core_filename is empty".to_string());
        }
        if self.extensions.is_empty() {
            return Err("extensions must not be empty".to_string());
        }
        if let Some(ext) = self.extensions.iter().find(|ext| !ext.starts_with('.')) {
            return Err(format!("extension '{}' must start with '.'", ext));
        }
        if self.firmware_required && self.firmware_files.is_empty() {
            return Err("firmware_required is set but firmware_files is empty".to_string());
        }
        if !self.firmware_required && !self.firmware_files.is_empty() {
            return Err("firmware_files listed but firmware_required is false".to_string());
        }
        Ok(())
    }
}

/// Shared-library suffixes a core may carry, native suffix first.
pub fn core_suffixes() -> [&'static str; 3] {
    if cfg!(target_os = "windows") {
        ["dll", "so", "dylib"]
    } else if cfg!(target_os = "macos") {
        ["dylib", "so", "dll"]
    } else {
        ["so", "dylib", "dll"]
    }
}

/// Core file name with the native suffix, e.g. `stella_libretro.so` for `stella`.
pub fn core_file_name(core_filename: &str) -> String {
    format!("{}.{}", with_core_infix(core_filename), core_suffixes()[0])
}

fn with_core_infix(core_filename: &str) -> String {
    if core_filename.ends_with(CORE_INFIX) {
        core_filename.to_string()
    } else {
        format!("{}{}", core_filename, CORE_INFIX)
    }
}

/// Registry of platform descriptors keyed by display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformRegistry {
    platforms: BTreeMap<String, PlatformDescriptor>,
}

impl PlatformRegistry {
    /// Registry populated with the built-in platform table.
    pub fn builtin() -> Self {
        Self {
            platforms: builtin_platforms(),
        }
    }

    /// Build a registry from injected descriptors, checking invariants.
    pub fn from_descriptors(platforms: BTreeMap<String, PlatformDescriptor>) -> Result<Self> {
        let registry = Self { platforms };
        registry.validate(Path::new(PLATFORMS_FILE))?;
        Ok(registry)
    }

    /// Load `<config_dir>/platforms.json`.
    ///
    /// When the file does not exist the directory is created, the built-in
    /// defaults are written out, and the defaults are returned.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let path = config_dir.join(PLATFORMS_FILE);

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No platform config at {}, writing defaults", path.display());
                let registry = Self::builtin();
                registry.save(config_dir)?;
                return Ok(registry);
            }
            Err(e) => return Err(LaunchError::io(&path, e)),
        };

        let platforms: BTreeMap<String, PlatformDescriptor> = serde_json::from_str(&content)
            .map_err(|e| LaunchError::ConfigInvalid {
                path: path.clone(),
                message: e.to_string(),
            })?;

        let registry = Self { platforms };
        registry.validate(&path)?;

        tracing::debug!(
            "Loaded {} platforms from {}",
            registry.platforms.len(),
            path.display()
        );
        Ok(registry)
    }

    /// Write `<config_dir>/platforms.json` with 2-space indentation.
    pub fn save(&self, config_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(config_dir).map_err(|e| LaunchError::io(config_dir, e))?;

        let path = config_dir.join(PLATFORMS_FILE);
        let mut json = serde_json::to_string_pretty(&self.platforms).map_err(|e| {
            LaunchError::ConfigInvalid {
                path: path.clone(),
                message: e.to_string(),
            }
        })?;
        json.push('\n');

        std::fs::write(&path, json).map_err(|e| LaunchError::io(&path, e))
    }

    fn validate(&self, source: &Path) -> Result<()> {
        for (name, descriptor) in &self.platforms {
            descriptor
                .validate()
                .map_err(|message| LaunchError::ConfigInvalid {
                    path: source.to_path_buf(),
                    message: format!("platform '{}': {}", name, message),
                })?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&PlatformDescriptor> {
        self.platforms.get(name)
    }

    /// Platform names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.platforms.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlatformDescriptor)> {
        self.platforms.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    /// Add or replace a descriptor. Returns the previous one, if any.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        descriptor: PlatformDescriptor,
    ) -> Option<PlatformDescriptor> {
        self.platforms.insert(name.into(), descriptor)
    }

    /// First existing core file for the platform under `core_root`.
    ///
    /// Tries `<core_root>/<base>_libretro.<suffix>` for each suffix in
    /// [`core_suffixes`] order.
    pub fn core_path(&self, name: &str, core_root: &Path) -> Option<PathBuf> {
        let base = self.get(name)?.core_basename();
        core_suffixes()
            .iter()
            .map(|suffix| core_root.join(format!("{}.{}", base, suffix)))
            .find(|candidate| candidate.is_file())
    }

    /// Core path with the native suffix, whether or not it exists.
    pub fn expected_core_path(&self, name: &str, core_root: &Path) -> Option<PathBuf> {
        let descriptor = self.get(name)?;
        Some(core_root.join(core_file_name(&descriptor.core_filename)))
    }

    /// Whether `filename` carries one of the platform's extensions.
    ///
    /// Unknown platforms never match.
    pub fn extension_matches(&self, name: &str, filename: &str) -> bool {
        self.get(name)
            .is_some_and(|descriptor| descriptor.matches_extension(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn simple_descriptor(core: &str, exts: &[&str]) -> PlatformDescriptor {
        PlatformDescriptor {
            core_filename: core.to_string(),
            extensions: exts.iter().map(|e| e.to_string()).collect(),
            archive_policy: ArchivePolicy::Extract,
            cache_extracted: false,
            firmware_required: false,
            firmware_files: BTreeMap::new(),
        }
    }

    #[test]
    fn test_load_writes_defaults_when_missing() {
        let temp = TempDir::new().unwrap();
        let config_dir = temp.path().join("nested").join("config");

        let registry = PlatformRegistry::load(&config_dir).unwrap();

        assert_eq!(registry, PlatformRegistry::builtin());
        assert!(config_dir.join(PLATFORMS_FILE).is_file());
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let temp = TempDir::new().unwrap();
        let registry = PlatformRegistry::builtin();
        registry.save(temp.path()).unwrap();

        let reloaded = PlatformRegistry::load(temp.path()).unwrap();
        assert_eq!(registry, reloaded);
    }

    #[test]
    fn test_saved_file_uses_two_space_indent() {
        let temp = TempDir::new().unwrap();
        PlatformRegistry::builtin().save(temp.path()).unwrap();

        let content = std::fs::read_to_string(temp.path().join(PLATFORMS_FILE)).unwrap();
        let second_line = content.lines().nth(1).unwrap();
        assert!(second_line.starts_with("  \""), "{:?}", second_line);
        assert!(!second_line.starts_with("   "));
    }

    #[test]
    fn test_malformed_json_is_config_invalid() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(PLATFORMS_FILE), "{ not json").unwrap();

        let err = PlatformRegistry::load(temp.path()).unwrap_err();
        assert!(matches!(err, LaunchError::ConfigInvalid { .. }), "{:?}", err);
    }

    #[test]
    fn test_invariant_violation_is_config_invalid() {
        let temp = TempDir::new().unwrap();
        let json = r#"{
  "Broken": {
    "core_filename": "broken",
    "extensions": [],
    "archive_policy": "extract"
  }
}"#;
        std::fs::write(temp.path().join(PLATFORMS_FILE), json).unwrap();

        let err = PlatformRegistry::load(temp.path()).unwrap_err();
        assert!(err.to_string().contains("Broken"), "{}", err);
    }

    #[test]
    fn test_firmware_flag_must_match_files() {
        let mut descriptor = simple_descriptor("puae", &[".adf"]);
        descriptor.firmware_required = true;
        assert!(descriptor.validate().is_err());

        descriptor
            .firmware_files
            .insert("kick34005.A500".to_string(), "Kickstart 1.3".to_string());
        assert!(descriptor.validate().is_ok());

        descriptor.firmware_required = false;
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn test_optional_fields_default() {
        let json = r#"{ "core_filename": "fceumm", "extensions": [".nes"] }"#;
        let descriptor: PlatformDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.archive_policy, ArchivePolicy::Extract);
        assert!(!descriptor.cache_extracted);
        assert!(!descriptor.firmware_required);
        assert!(descriptor.firmware_files.is_empty());
    }

    #[test]
    fn test_unknown_platform_is_absent() {
        let registry = PlatformRegistry::builtin();
        assert!(registry.get("Vectrex 3000").is_none());
        assert!(registry.core_path("Vectrex 3000", Path::new("cores")).is_none());
        assert!(!registry.extension_matches("Vectrex 3000", "game.bin"));
    }

    #[test]
    fn test_extension_matches_case_insensitive() {
        let registry = PlatformRegistry::builtin();
        assert!(registry.extension_matches("Atari 2600", "PITFALL.BIN"));
        assert!(registry.extension_matches("Atari 2600", "pitfall.a26"));
        assert!(!registry.extension_matches("Atari 2600", "pitfall.nes"));
    }

    #[test]
    fn test_core_path_prefers_native_suffix() {
        let temp = TempDir::new().unwrap();
        let registry = PlatformRegistry::builtin();
        let suffixes = core_suffixes();

        // Only a foreign suffix present: still discoverable
        let foreign = temp.path().join(format!("stella_libretro.{}", suffixes[2]));
        std::fs::write(&foreign, b"core").unwrap();
        assert_eq!(
            registry.core_path("Atari 2600", temp.path()),
            Some(foreign.clone())
        );

        // Native suffix wins once present
        let native = temp.path().join(format!("stella_libretro.{}", suffixes[0]));
        std::fs::write(&native, b"core").unwrap();
        assert_eq!(registry.core_path("Atari 2600", temp.path()), Some(native));
    }

    #[test]
    fn test_core_without_infix_is_not_discoverable() {
        let temp = TempDir::new().unwrap();
        let registry = PlatformRegistry::builtin();
        std::fs::write(
            temp.path().join(format!("stella.{}", core_suffixes()[0])),
            b"core",
        )
        .unwrap();

        assert!(registry.core_path("Atari 2600", temp.path()).is_none());
    }

    #[test]
    fn test_core_basename_appends_infix_once() {
        assert_eq!(
            simple_descriptor("stella", &[".a26"]).core_basename(),
            "stella_libretro"
        );
        assert_eq!(
            simple_descriptor("stella_libretro", &[".a26"]).core_basename(),
            "stella_libretro"
        );
    }

    #[test]
    fn test_from_descriptors_and_insert() {
        let mut platforms = BTreeMap::new();
        platforms.insert("Test".to_string(), simple_descriptor("test", &[".tst"]));
        let mut registry = PlatformRegistry::from_descriptors(platforms).unwrap();
        assert_eq!(registry.len(), 1);

        let previous = registry.insert("Test", simple_descriptor("other", &[".tst"]));
        assert_eq!(previous.unwrap().core_filename, "test");
        assert_eq!(registry.get("Test").unwrap().core_filename, "other");
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Test"]);
    }
}
