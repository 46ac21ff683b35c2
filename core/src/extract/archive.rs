//! Zip archive expansion.

use std::fs::File;
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};

use zip::ZipArchive;

use crate::error::{LaunchError, Result};

/// Extensions (lowercase, leading dot) the extractor can unpack.
pub const ARCHIVE_EXTENSIONS: &[&str] = &[".zip"];

/// Whether `path` names an archive the extractor can unpack.
pub fn is_archive(path: &Path) -> bool {
    let name = path.to_string_lossy().to_lowercase();
    ARCHIVE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Archive formats the host may be handed but the extractor cannot unpack.
const UNSUPPORTED_ARCHIVE_EXTENSIONS: &[&str] = &[".7z", ".rar", ".tar", ".tar.gz", ".tgz", ".gz"];

/// Whether `path` looks like an archive in a format the extractor does not support.
pub(crate) fn is_unsupported_archive(path: &Path) -> bool {
    let name = path.to_string_lossy().to_lowercase();
    UNSUPPORTED_ARCHIVE_EXTENSIONS
        .iter()
        .any(|ext| name.ends_with(ext))
}

/// Map an archive entry name to a relative path confined to the extraction root.
///
/// Returns `None` for absolute names, drive-prefixed names, and names that
/// climb out of the root with `..`. A name consisting only of `.` segments
/// yields an empty path.
pub(crate) fn safe_entry_path(name: &str) -> Option<PathBuf> {
    let normalized = name.replace('\\', "/");
    if normalized.starts_with('/') {
        return None;
    }

    let mut out = PathBuf::new();
    for (i, component) in Path::new(&normalized).components().enumerate() {
        match component {
            Component::Normal(part) => {
                // "C:" style prefixes are plain components on Unix
                if i == 0 && part.to_string_lossy().contains(':') {
                    return None;
                }
                out.push(part);
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

/// Expand every entry of the zip at `archive` into `dest`.
///
/// Entry names are all checked before anything is written, so an archive
/// with an unsafe entry leaves `dest` untouched. Returns the number of files
/// written.
pub(crate) fn extract_zip(archive: &Path, dest: &Path) -> Result<usize> {
    let file = File::open(archive)
        .map_err(|e| LaunchError::extraction(archive, format!("cannot open archive: {}", e)))?;
    let mut zip = ZipArchive::new(BufReader::new(file))
        .map_err(|e| LaunchError::extraction(archive, format!("unreadable archive: {}", e)))?;

    if let Some(bad) = zip.file_names().find(|name| safe_entry_path(name).is_none()) {
        return Err(LaunchError::extraction(
            archive,
            format!("unsafe entry '{}'", bad),
        ));
    }

    let mut written = 0;
    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| LaunchError::extraction(archive, e.to_string()))?;

        let Some(relative) = safe_entry_path(entry.name()) else {
            return Err(LaunchError::extraction(
                archive,
                format!("unsafe entry '{}'", entry.name()),
            ));
        };
        if relative.as_os_str().is_empty() {
            continue;
        }

        let write_failed = |e: std::io::Error| {
            LaunchError::extraction(
                archive,
                format!("failed to write {}: {}", relative.display(), e),
            )
        };

        let out_path = dest.join(&relative);
        if entry.is_dir() {
            std::fs::create_dir_all(&out_path).map_err(write_failed)?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent).map_err(write_failed)?;
        }
        let mut out = File::create(&out_path).map_err(write_failed)?;
        std::io::copy(&mut entry, &mut out).map_err(write_failed)?;
        written += 1;
    }

    tracing::debug!(
        "Extracted {} files from {} into {}",
        written,
        archive.display(),
        dest.display()
    );
    Ok(written)
}
