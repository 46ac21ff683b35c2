//! Game entries handed to the launch pipeline.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LaunchError, Result};
use crate::extract::is_archive;
use crate::platform::{ArchivePolicy, PlatformDescriptor};

/// Where an entry's content lives, discriminated by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EntrySource {
    /// A ROM file the host can load directly.
    File { path: PathBuf },
    /// An archive that must be unpacked first.
    Archive { path: PathBuf },
    /// A directory tree containing the ROM somewhere inside.
    Folder { path: PathBuf },
    /// An ordered disk set; the first disk is launched.
    Multidisk { disks: Vec<PathBuf> },
}

impl EntrySource {
    pub fn kind_name(&self) -> &'static str {
        match self {
            EntrySource::File { .. } => "file",
            EntrySource::Archive { .. } => "archive",
            EntrySource::Folder { .. } => "folder",
            EntrySource::Multidisk { .. } => "multidisk",
        }
    }
}

/// A user-selected game: platform key, content source, and optional hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEntry {
    pub platform: String,
    #[serde(flatten)]
    pub source: EntrySource,
    /// Paths relative to the archive/folder root naming the main ROM candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rom_files: Option<Vec<PathBuf>>,
}

impl GameEntry {
    fn new(platform: impl Into<String>, source: EntrySource) -> Self {
        Self {
            platform: platform.into(),
            source,
            rom_files: None,
        }
    }

    pub fn file(platform: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(platform, EntrySource::File { path: path.into() })
    }

    pub fn archive(platform: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(platform, EntrySource::Archive { path: path.into() })
    }

    pub fn folder(platform: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(platform, EntrySource::Folder { path: path.into() })
    }

    pub fn multidisk(platform: impl Into<String>, disks: Vec<PathBuf>) -> Self {
        Self::new(platform, EntrySource::Multidisk { disks })
    }

    /// Attach main-ROM hints.
    pub fn with_rom_files(mut self, rom_files: Vec<PathBuf>) -> Self {
        self.rom_files = if rom_files.is_empty() {
            None
        } else {
            Some(rom_files)
        };
        self
    }

    /// Build an entry from filesystem paths.
    ///
    /// - more than one path: `multidisk`
    /// - a directory: `folder`
    /// - a zip on a platform whose policy is `extract`: `archive`
    /// - anything else: `file` (archives on `native` platforms go to the host as-is)
    pub fn classify(
        platform: impl Into<String>,
        paths: &[PathBuf],
        descriptor: &PlatformDescriptor,
    ) -> Result<Self> {
        let platform = platform.into();
        match paths {
            [] => Err(LaunchError::no_rom(Path::new(""))),
            [single] => {
                let entry = if single.is_dir() {
                    Self::folder(platform, single.clone())
                } else if is_archive(single) && descriptor.archive_policy == ArchivePolicy::Extract
                {
                    Self::archive(platform, single.clone())
                } else {
                    Self::file(platform, single.clone())
                };
                Ok(entry)
            }
            disks => Ok(Self::multidisk(platform, disks.to_vec())),
        }
    }

    /// Path used in log and error messages.
    pub fn display_path(&self) -> PathBuf {
        match &self.source {
            EntrySource::File { path }
            | EntrySource::Archive { path }
            | EntrySource::Folder { path } => path.clone(),
            EntrySource::Multidisk { disks } => disks.first().cloned().unwrap_or_default(),
        }
    }
}
