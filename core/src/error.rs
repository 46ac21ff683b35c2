//! Error kinds surfaced by the launch pipeline.
//!
//! Every variant names the offending path, platform, or executable so that the
//! rendered message alone is enough for a single-line report.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result alias used throughout the pipeline.
pub type Result<T> = std::result::Result<T, LaunchError>;

#[derive(Debug, Error)]
pub enum LaunchError {
    /// A config or settings file could not be parsed or violates an invariant.
    #[error("invalid configuration in {}: {message}", .path.display())]
    ConfigInvalid { path: PathBuf, message: String },

    /// The entry names a platform the registry does not know.
    #[error("unknown platform '{0}'")]
    UnknownPlatform(String),

    /// Mandated firmware files are absent from the firmware directory.
    #[error("firmware missing for {platform}: {message}")]
    FirmwareMissing {
        platform: String,
        missing: Vec<String>,
        message: String,
    },

    /// No core binary with a recognized suffix exists for the platform.
    #[error("core for {platform} not found (expected {})", .expected.display())]
    CoreMissing { platform: String, expected: PathBuf },

    /// Archive could not be expanded; any partial output has been removed.
    #[error("extraction of {} failed: {reason}", .archive.display())]
    ExtractionFailed { archive: PathBuf, reason: String },

    /// The entry did not yield a loadable ROM file.
    #[error("no ROM found in {}", .path.display())]
    NoRomFound { path: PathBuf },

    /// The emulator host executable could not be spawned.
    #[error("emulator host '{0}' not found on PATH")]
    HostMissing(String),

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LaunchError {
    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn extraction(archive: impl AsRef<Path>, reason: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            archive: archive.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    pub(crate) fn no_rom(path: impl AsRef<Path>) -> Self {
        Self::NoRomFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Short identifier used in single-line failure reports.
    pub fn kind(&self) -> &'static str {
        match self {
            LaunchError::ConfigInvalid { .. } => "config-invalid",
            LaunchError::UnknownPlatform(_) => "unknown-platform",
            LaunchError::FirmwareMissing { .. } => "firmware-missing",
            LaunchError::CoreMissing { .. } => "core-missing",
            LaunchError::ExtractionFailed { .. } => "extraction-failed",
            LaunchError::NoRomFound { .. } => "no-rom-found",
            LaunchError::HostMissing(_) => "host-missing",
            LaunchError::Io { .. } => "io",
        }
    }

    /// Process exit code for the outer CLI wrapper.
    ///
    /// - `2` configuration error (including unknown platforms)
    /// - `3` firmware missing
    /// - `4` core missing
    /// - `5` ROM resolution failure
    /// - `6` extraction failure
    /// - `7` host not found
    /// - `1` anything else
    pub fn exit_code(&self) -> i32 {
        match self {
            LaunchError::ConfigInvalid { .. } | LaunchError::UnknownPlatform(_) => 2,
            LaunchError::FirmwareMissing { .. } => 3,
            LaunchError::CoreMissing { .. } => 4,
            LaunchError::NoRomFound { .. } => 5,
            LaunchError::ExtractionFailed { .. } => 6,
            LaunchError::HostMissing(_) => 7,
            LaunchError::Io { .. } => 1,
        }
    }
}
