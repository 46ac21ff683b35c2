//! Firmware presence checks.
//!
//! Presence only: files are not hashed. Names are matched case-sensitively,
//! exactly as the descriptor lists them.

use std::path::{Path, PathBuf};

use crate::platform::PlatformRegistry;

/// Outcome of a firmware check. Always displayable to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareReport {
    pub ok: bool,
    pub message: String,
    /// Firmware filenames that were expected but not found.
    pub missing: Vec<String>,
}

impl FirmwareReport {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            missing: Vec::new(),
        }
    }
}

/// Directory the host reads a platform's firmware from.
pub fn system_dir(firmware_root: &Path, platform: &str) -> PathBuf {
    firmware_root.join(platform)
}

/// Check that every mandated firmware file exists under `<firmware_root>/<platform>/`.
pub fn verify(registry: &PlatformRegistry, platform: &str, firmware_root: &Path) -> FirmwareReport {
    let Some(descriptor) = registry.get(platform) else {
        return FirmwareReport {
            ok: false,
            message: format!("unknown platform '{}'", platform),
            missing: Vec::new(),
        };
    };

    if !descriptor.firmware_required {
        return FirmwareReport::ok("no firmware required");
    }

    let dir = system_dir(firmware_root, platform);
    if !dir.is_dir() {
        return FirmwareReport {
            ok: false,
            message: format!(
                "firmware directory {} not found (needs {})",
                dir.display(),
                descriptor
                    .firmware_files
                    .keys()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            missing: descriptor.firmware_files.keys().cloned().collect(),
        };
    }

    let missing: Vec<String> = descriptor
        .firmware_files
        .keys()
        .filter(|name| !dir.join(name.as_str()).is_file())
        .cloned()
        .collect();

    if missing.is_empty() {
        return FirmwareReport::ok(format!(
            "all {} firmware files present in {}",
            descriptor.firmware_files.len(),
            dir.display()
        ));
    }

    let details = missing
        .iter()
        .map(|name| match descriptor.firmware_files.get(name) {
            Some(desc) if !desc.is_empty() => format!("{} ({})", name, desc),
            _ => name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ");

    FirmwareReport {
        ok: false,
        message: format!("missing in {}: {}", dir.display(), details),
        missing,
    }
}
