//! ROM resolution
//!
//! Turns a [`GameEntry`] into a single file path the emulator host can load.
//!
//! | Kind        | Strategy                                                    |
//! |-------------|-------------------------------------------------------------|
//! | `file`      | the path itself                                             |
//! | `archive`   | extract, collect candidates, pick via the main-ROM ladder   |
//! | `folder`    | first-disk subfolder, then hints, then first file in tree   |
//! | `multidisk` | first disk (recursing as an archive when it is one)         |

mod ladder;

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::entry::{EntrySource, GameEntry};
use crate::error::{LaunchError, Result};
use crate::extract::{
    Extractor, is_archive, is_hidden, is_unsupported_archive, safe_relative_path,
};
use crate::platform::PlatformDescriptor;

pub use ladder::select_main_rom;

/// Case-insensitive markers identifying a first-disk subfolder, in priority order.
pub const FIRST_DISK_MARKERS: [&str; 4] = ["disk1", "disk 1", "disc1", "disc 1"];

/// Resolve `entry` to a loadable ROM path.
///
/// Archives are expanded through `extractor`, so staging directories created
/// here are released by the extractor's cleanup.
pub fn resolve(
    entry: &GameEntry,
    descriptor: &PlatformDescriptor,
    extractor: &mut Extractor,
) -> Result<PathBuf> {
    let path = match &entry.source {
        EntrySource::File { path } => resolve_file(path)?,
        EntrySource::Archive { path } => {
            resolve_archive(path, entry.rom_files.as_deref(), descriptor, extractor)?
        }
        EntrySource::Folder { path } => {
            resolve_folder(path, entry.rom_files.as_deref(), descriptor)?
        }
        EntrySource::Multidisk { disks } => {
            let Some(first) = disks.first() else {
                return Err(LaunchError::no_rom(Path::new("")));
            };
            if is_archive(first) {
                let first_disk = GameEntry {
                    platform: entry.platform.clone(),
                    source: EntrySource::Archive {
                        path: first.clone(),
                    },
                    rom_files: entry.rom_files.clone(),
                };
                return resolve(&first_disk, descriptor, extractor);
            }
            if is_unsupported_archive(first) {
                tracing::debug!(
                    "{} looks like an archive the extractor cannot unpack, passing it to the host as-is",
                    first.display()
                );
            }
            resolve_file(first)?
        }
    };

    tracing::debug!(
        "Resolved {} entry {} -> {}",
        entry.source.kind_name(),
        entry.display_path().display(),
        path.display()
    );
    Ok(path)
}

fn resolve_file(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(LaunchError::no_rom(path))
    }
}

fn resolve_archive(
    archive: &Path,
    rom_files: Option<&[PathBuf]>,
    descriptor: &PlatformDescriptor,
    extractor: &mut Extractor,
) -> Result<PathBuf> {
    let root = extractor.ensure_extracted(archive, descriptor)?;

    let candidates: Vec<PathBuf> = match rom_files {
        Some(hints) => hints
            .iter()
            .filter_map(|hint| safe_relative_path(hint))
            .filter(|hint| root.join(hint).is_file())
            .collect(),
        None => scan_roms(&root, descriptor),
    };

    let main = select_main_rom(&candidates).ok_or_else(|| LaunchError::no_rom(archive))?;
    let full = root.join(main);
    std::path::absolute(&full).map_err(|e| LaunchError::io(&full, e))
}

/// Regular, non-hidden files under `root` matching the descriptor's extensions,
/// relative to `root`, in file-name order.
fn scan_roms(root: &Path, descriptor: &PlatformDescriptor) -> Vec<PathBuf> {
    visible_files(root)
        .filter(|path| {
            path.file_name()
                .is_some_and(|name| descriptor.matches_extension(&name.to_string_lossy()))
        })
        .filter_map(|path| path.strip_prefix(root).ok().map(Path::to_path_buf))
        .collect()
}

fn resolve_folder(
    folder: &Path,
    rom_files: Option<&[PathBuf]>,
    descriptor: &PlatformDescriptor,
) -> Result<PathBuf> {
    if !folder.is_dir() {
        return Err(LaunchError::no_rom(folder));
    }

    if let Some(disk_dir) = find_first_disk_dir(folder)
        && let Some(file) = first_file_in(&disk_dir)
    {
        return Ok(file);
    }

    if let Some(first) = rom_files.and_then(|hints| hints.first()) {
        match safe_relative_path(first) {
            Some(relative) => {
                let hinted = folder.join(relative);
                if hinted.is_file() {
                    return Ok(hinted);
                }
                tracing::warn!("Hinted ROM {} does not exist, scanning folder", hinted.display());
            }
            None => tracing::warn!(
                "Ignoring hint {} outside {}",
                first.display(),
                folder.display()
            ),
        }
    }

    // Prefer files the platform recognizes, then anything visible
    let mut fallback = None;
    for path in visible_files(folder) {
        let matches = path
            .file_name()
            .is_some_and(|name| descriptor.matches_extension(&name.to_string_lossy()));
        if matches {
            return Ok(path);
        }
        fallback.get_or_insert(path);
    }

    fallback.ok_or_else(|| LaunchError::no_rom(folder))
}

/// Top-level subdirectory whose name carries a first-disk marker.
fn find_first_disk_dir(folder: &Path) -> Option<PathBuf> {
    let mut dirs: Vec<PathBuf> = std::fs::read_dir(folder)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    dirs.sort();

    FIRST_DISK_MARKERS.iter().find_map(|marker| {
        dirs.iter()
            .find(|dir| {
                dir.file_name()
                    .is_some_and(|name| name.to_string_lossy().to_lowercase().contains(marker))
            })
            .cloned()
    })
}

fn first_file_in(dir: &Path) -> Option<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .filter(|entry| !is_hidden(&entry.file_name()))
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files.into_iter().next()
}

fn visible_files(root: &Path) -> impl Iterator<Item = PathBuf> {
    WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry.file_name()))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
}
