//! Platform images
//!
//! A platform image is a gzip-compressed tar archive of a prepared platform.
//! Paths inside the archive are relative to the platform root. Directories,
//! regular files (with their mode bits) and symbolic links are meaningful;
//! any other entry type is skipped.

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use tar::{Archive, Builder, EntryType};
use tracing::{debug, info};

use crate::error::{DeployError, Result};

/// Summary of an extraction
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ExtractStats {
    pub directories: usize,
    pub files: usize,
    pub symlinks: usize,
    pub skipped: usize,
}

/// Extracts a platform image into `dest`
///
/// `dest` must exist. Entries are streamed; a read or write failure aborts
/// the extraction, as does an entry whose path is absolute or climbs out of
/// `dest`, either by name or through a symbolic link unpacked earlier.
pub fn extract(image: &Path, dest: &Path) -> Result<ExtractStats> {
    let file = File::open(image).map_err(|e| extract_error(image, e))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    let mut stats = ExtractStats::default();

    let entries = archive.entries().map_err(|e| extract_error(image, e))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| extract_error(image, e))?;
        let relative = safe_relative(&entry.path().map_err(|e| extract_error(image, e))?)?;

        let kind = entry.header().entry_type();
        match kind {
            EntryType::Directory if relative.as_os_str().is_empty() => continue,
            EntryType::Directory
            | EntryType::Regular
            | EntryType::Continuous
            | EntryType::Symlink => {}
            other => {
                debug!("Skipping {:?} entry {}", other, relative.display());
                stats.skipped += 1;
                continue;
            }
        }

        // unpack_in refuses targets whose parent resolves outside `dest`
        entry.set_preserve_permissions(true);
        let unpacked = entry.unpack_in(dest).map_err(|e| extract_error(image, e))?;
        if !unpacked {
            return Err(DeployError::UnsafeEntry(relative));
        }

        match kind {
            EntryType::Directory => stats.directories += 1,
            EntryType::Symlink => stats.symlinks += 1,
            _ => stats.files += 1,
        }
    }

    info!(
        "Extracted {} file(s), {} directory(ies), {} symlink(s) into {}",
        stats.files,
        stats.directories,
        stats.symlinks,
        dest.display()
    );
    Ok(stats)
}

/// Packs `src` into a platform image at `dest`
///
/// Entry paths are relative to `src`. Symbolic links are stored as links,
/// never followed. Parent directories of `dest` are created.
pub fn pack_directory(src: &Path, dest: &Path) -> Result<()> {
    let pack_error = |source: io::Error| DeployError::Pack {
        path: dest.to_path_buf(),
        source,
    };

    if !src.is_dir() {
        return Err(pack_error(io::Error::new(
            io::ErrorKind::NotFound,
            format!("source directory {} not found", src.display()),
        )));
    }

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(pack_error)?;
    }

    let file = File::create(dest).map_err(pack_error)?;
    let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));
    builder.follow_symlinks(false);
    builder.append_dir_all("", src).map_err(pack_error)?;

    let encoder = builder.into_inner().map_err(pack_error)?;
    encoder.finish().map_err(pack_error)?;

    info!("Platform image {} created from {}", dest.display(), src.display());
    Ok(())
}

/// Strips `.` components and rejects paths that leave the destination
fn safe_relative(path: &Path) -> Result<PathBuf> {
    let mut relative = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(DeployError::UnsafeEntry(path.to_path_buf()));
            }
        }
    }
    Ok(relative)
}

fn extract_error(image: &Path, source: io::Error) -> DeployError {
    DeployError::Extract {
        path: image.to_path_buf(),
        source,
    }
}
