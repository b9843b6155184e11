//! Replace-in-place link and copy operations
//!
//! Every operation converges: running it twice leaves the same tree as
//! running it once. Targets, including whole directory copies, are staged
//! under a temporary name in the destination directory and renamed over the
//! final name, so a reader never observes a half-written destination.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use walkdir::WalkDir;

use crate::{Error, Result};

/// What happened at the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Nothing existed at the destination before.
    Created,
    /// An existing entry was overwritten.
    Replaced,
    /// The destination already had the desired state.
    Unchanged,
}

/// Absolute form of `path` without resolving symlinks.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    let absolute = std::path::absolute(path).map_err(|e| Error::io(path, e))?;
    Ok(dunce::simplified(&absolute).to_path_buf())
}

/// Create the parent directory of `path`. Concurrent or prior creation is
/// not an error.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    Ok(())
}

/// Create (or repoint) a symbolic link at `link` pointing at `target`.
pub fn symlink_replace(target: &Path, link: &Path) -> Result<Placement> {
    ensure_parent_dir(link)?;

    if let Ok(existing) = fs::read_link(link)
        && existing == target
    {
        return Ok(Placement::Unchanged);
    }

    let existed = clear_directory(link)?;
    let staging = staging_path(link);
    remove_entry(&staging)?;
    make_symlink(target, &staging).map_err(|e| Error::io(&staging, e))?;
    commit(&staging, link)?;

    debug!(link = %link.display(), target = %target.display(), "Linked");
    Ok(placement(existed))
}

/// Copy `source` to `dest`, replacing whatever is there. Directories are
/// copied recursively; symlinks inside them are recreated, not followed.
pub fn copy_replace(source: &Path, dest: &Path) -> Result<Placement> {
    let metadata = fs::metadata(source).map_err(|e| Error::io(source, e))?;
    ensure_parent_dir(dest)?;

    let staging = staging_path(dest);
    discard(&staging)?;
    let staged = if metadata.is_dir() {
        copy_tree(source, &staging)
    } else {
        fs::copy(source, &staging)
            .map(|_| ())
            .map_err(|e| Error::io(&staging, e))
    };
    if let Err(e) = staged {
        let _ = discard(&staging);
        return Err(e);
    }

    let existed = clear_directory(dest)?;
    if metadata.is_dir() {
        remove_entry(dest)?;
    }
    commit(&staging, dest)?;

    debug!(source = %source.display(), dest = %dest.display(), "Copied");
    Ok(placement(existed))
}

/// Recursively copy the directory `source` to `dest`.
pub fn copy_tree(source: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(source).follow_links(false) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            Error::io(path, e.into())
        })?;
        let Ok(relative) = entry.path().strip_prefix(source) else {
            continue;
        };
        let target = dest.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| Error::io(&target, e))?;
        } else if file_type.is_symlink() {
            let link_target = fs::read_link(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
            make_symlink(&link_target, &target).map_err(|e| Error::io(&target, e))?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| Error::io(&target, e))?;
        }
    }
    Ok(())
}

fn placement(existed: bool) -> Placement {
    if existed {
        Placement::Replaced
    } else {
        Placement::Created
    }
}

/// Remove `path` if it is a real directory, since rename cannot replace one.
/// Returns whether anything existed at `path`.
fn clear_directory(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => {
            fs::remove_dir_all(path).map_err(|e| Error::io(path, e))?;
            Ok(true)
        }
        Ok(_) => Ok(true),
        Err(_) => Ok(false),
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

/// Remove a file or symlink at `path` if one exists.
fn remove_entry(path: &Path) -> Result<()> {
    if fs::symlink_metadata(path).is_ok() {
        fs::remove_file(path).map_err(|e| Error::io(path, e))?;
    }
    Ok(())
}

/// Remove whatever is at `path`, directory or not.
fn discard(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path).map_err(|e| Error::io(path, e)),
        Ok(_) => fs::remove_file(path).map_err(|e| Error::io(path, e)),
        Err(_) => Ok(()),
    }
}

fn commit(staging: &Path, dest: &Path) -> Result<()> {
    if let Err(e) = fs::rename(staging, dest) {
        let _ = discard(staging);
        return Err(Error::io(dest, e));
    }
    Ok(())
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn make_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    if target.is_dir() {
        std::os::windows::fs::symlink_dir(target, link)
    } else {
        std::os::windows::fs::symlink_file(target, link)
    }
}
