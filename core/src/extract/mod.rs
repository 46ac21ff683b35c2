//! Archive extraction cache and staging
//!
//! Archives are expanded either into the persistent cache or into a
//! per-launch staging directory, depending on the platform descriptor.
//!
//! # Layout
//!
//! ```text
//! <cache_root>/                  (normally <cache_path>/extracted)
//!   <stem>_<mtime>/              cache entry, content-stable once present
//!   temp/
//!     <stem>_<random>/           staging entry, removed by cleanup()
//! ```
//!
//! Cache entries are populated in a sibling directory under `temp/` and
//! renamed into place, so a half-written cache entry is never visible under
//! its key.

mod archive;

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use walkdir::WalkDir;

use crate::error::{LaunchError, Result};
use crate::platform::PlatformDescriptor;

pub use archive::{ARCHIVE_EXTENSIONS, is_archive};
pub(crate) use archive::is_unsupported_archive;

/// Subdirectory of the configured cache path holding extracted archives.
pub const EXTRACTED_DIR: &str = "extracted";
/// Subdirectory of the extraction root holding staging directories.
pub const STAGING_DIR: &str = "temp";

/// Owner of the extraction cache and the current session's staging directories.
#[derive(Debug)]
pub struct Extractor {
    cache_root: PathBuf,
    staging: Vec<PathBuf>,
}

impl Extractor {
    /// Extractor rooted directly at `cache_root`.
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            staging: Vec::new(),
        }
    }

    /// Extractor for the configured cache path (`<cache_path>/extracted`).
    pub fn for_cache_path(cache_path: &Path) -> Self {
        Self::new(cache_path.join(EXTRACTED_DIR))
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    pub fn staging_root(&self) -> PathBuf {
        self.cache_root.join(STAGING_DIR)
    }

    /// Staging directories recorded in this session.
    pub fn staging_dirs(&self) -> &[PathBuf] {
        &self.staging
    }

    /// Cache key for an archive: `<stem>_<whole seconds of mtime>`.
    pub fn cache_key(archive: &Path) -> Result<String> {
        let metadata = std::fs::metadata(archive).map_err(|e| {
            LaunchError::extraction(archive, format!("cannot read archive metadata: {}", e))
        })?;
        let mtime = metadata
            .modified()
            .ok()
            .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
            .map(|duration| duration.as_secs())
            .unwrap_or(0);

        Ok(format!("{}_{}", archive_stem(archive), mtime))
    }

    /// Cache directory an archive maps to, whether or not it exists yet.
    pub fn cache_dir_for(&self, archive: &Path) -> Result<PathBuf> {
        Ok(self.cache_root.join(Self::cache_key(archive)?))
    }

    /// Return a directory holding the full contents of `archive`.
    ///
    /// With `cache_extracted` set, a populated cache entry is reused as-is.
    /// Otherwise the archive goes into a fresh staging directory that is
    /// recorded for [`Extractor::cleanup`]. On failure nothing partial is
    /// left behind.
    pub fn ensure_extracted(
        &mut self,
        archive: &Path,
        descriptor: &PlatformDescriptor,
    ) -> Result<PathBuf> {
        if descriptor.cache_extracted {
            self.extract_to_cache(archive)
        } else {
            self.extract_to_staging(archive)
        }
    }

    fn extract_to_cache(&mut self, archive: &Path) -> Result<PathBuf> {
        let target = self.cache_dir_for(archive)?;

        if has_visible_file(&target) {
            tracing::info!("Cache hit for {}: {}", archive.display(), target.display());
            return Ok(target);
        }
        if target.exists() {
            tracing::warn!("Discarding empty cache entry {}", target.display());
            std::fs::remove_dir_all(&target).map_err(|e| LaunchError::io(&target, e))?;
        }

        let work = self.create_unique_dir(archive)?;
        if let Err(e) = archive::extract_zip(archive, &work) {
            remove_quietly(&work);
            return Err(e);
        }

        if let Err(e) = std::fs::rename(&work, &target) {
            remove_quietly(&work);
            // Lost a race with another writer; their tree is as good as ours
            if has_visible_file(&target) {
                return Ok(target);
            }
            return Err(LaunchError::io(&target, e));
        }

        tracing::info!("Extracted {} into cache {}", archive.display(), target.display());
        Ok(target)
    }

    fn extract_to_staging(&mut self, archive: &Path) -> Result<PathBuf> {
        let dir = self.create_unique_dir(archive)?;
        self.register_staging(dir.clone());

        if let Err(e) = archive::extract_zip(archive, &dir) {
            remove_quietly(&dir);
            return Err(e);
        }

        tracing::info!("Extracted {} into staging {}", archive.display(), dir.display());
        Ok(dir)
    }

    /// Fresh `<staging_root>/<stem>_<random>` directory. Never reuses a name.
    fn create_unique_dir(&self, archive: &Path) -> Result<PathBuf> {
        let staging_root = self.staging_root();
        std::fs::create_dir_all(&staging_root).map_err(|e| LaunchError::io(&staging_root, e))?;

        let dir = tempfile::Builder::new()
            .prefix(&format!("{}_", archive_stem(archive)))
            .tempdir_in(&staging_root)
            .map_err(|e| LaunchError::io(&staging_root, e))?;
        Ok(dir.keep())
    }

    /// Record a staging directory for removal by [`Extractor::cleanup`].
    pub fn register_staging(&mut self, path: PathBuf) {
        if !self.staging.contains(&path) {
            self.staging.push(path);
        }
    }

    /// Remove every staging directory recorded in this session.
    ///
    /// Failures are logged, never returned. Calling it again is a no-op.
    pub fn cleanup(&mut self) {
        for dir in self.staging.drain(..) {
            if !dir.exists() {
                continue;
            }
            match std::fs::remove_dir_all(&dir) {
                Ok(()) => tracing::debug!("Removed staging directory {}", dir.display()),
                Err(e) => tracing::warn!(
                    "Failed to remove staging directory {}: {}",
                    dir.display(),
                    e
                ),
            }
        }
    }

    /// Remove the whole cache root and recreate it empty.
    pub fn clear_cache(&mut self) -> Result<()> {
        if self.cache_root.exists() {
            std::fs::remove_dir_all(&self.cache_root)
                .map_err(|e| LaunchError::io(&self.cache_root, e))?;
        }
        std::fs::create_dir_all(&self.cache_root)
            .map_err(|e| LaunchError::io(&self.cache_root, e))?;
        tracing::info!("Cleared extraction cache {}", self.cache_root.display());
        Ok(())
    }

    /// Total size in bytes of all regular files under the cache root.
    pub fn cache_size(&self) -> u64 {
        WalkDir::new(&self.cache_root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| entry.metadata().ok())
            .map(|metadata| metadata.len())
            .sum()
    }

    /// Borrow the extractor for one launch; staging is cleaned up on drop.
    pub fn session(&mut self) -> ExtractorSession<'_> {
        ExtractorSession { extractor: self }
    }
}

/// Scoped use of an [`Extractor`] that runs [`Extractor::cleanup`] when dropped.
pub struct ExtractorSession<'a> {
    extractor: &'a mut Extractor,
}

impl Deref for ExtractorSession<'_> {
    type Target = Extractor;

    fn deref(&self) -> &Extractor {
        &*self.extractor
    }
}

impl DerefMut for ExtractorSession<'_> {
    fn deref_mut(&mut self) -> &mut Extractor {
        &mut *self.extractor
    }
}

impl Drop for ExtractorSession<'_> {
    fn drop(&mut self) {
        self.extractor.cleanup();
    }
}

fn archive_stem(archive: &Path) -> String {
    archive
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive".to_string())
}

/// Confine a caller-supplied relative path the same way archive entries are.
pub(crate) fn safe_relative_path(path: &Path) -> Option<PathBuf> {
    archive::safe_entry_path(&path.to_string_lossy()).filter(|p| !p.as_os_str().is_empty())
}

/// Dotfiles (and dot-directories) are hidden.
pub(crate) fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Whether `dir` contains, at any depth, a regular file that is not hidden.
pub(crate) fn has_visible_file(dir: &Path) -> bool {
    if !dir.is_dir() {
        return false;
    }
    WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry.file_name()))
        .filter_map(|entry| entry.ok())
        .any(|entry| entry.file_type().is_file())
}

fn remove_quietly(dir: &Path) {
    if let Err(e) = std::fs::remove_dir_all(dir)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        tracing::warn!("Failed to remove {}: {}", dir.display(), e);
    }
}
