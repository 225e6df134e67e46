// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Symlink creation and removal.
//!
//! Thin layer over the file system that knows the difference between a path
//! that is a symlink (or a shortcut file) and a path holding real content.
//! Real content is never removed unless the caller forces it.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs::{self, Metadata},
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use tracing::debug;

/// Result of a successful link operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Link did not exist and was created.
    Created,

    /// Something stood at the link path and was replaced.
    Replaced,

    /// Link already pointed at the right place.
    Unchanged,

    /// Link was removed.
    Removed,

    /// Nothing existed at the link path.
    Absent,
}

impl Display for Outcome {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(match self {
            Self::Created => "created",
            Self::Replaced => "replaced",
            Self::Unchanged => "unchanged",
            Self::Removed => "removed",
            Self::Absent => "absent",
        })
    }
}

/// Create symlink at `link` pointing to `source`.
///
/// Creates `source` as a directory if it does not exist yet, and creates
/// the parent directories of `link`. A symlink already pointing at `source`
/// is left alone unless `force` is set. Any other symlink at `link` is
/// replaced. Real content at `link` is only removed if `force` is set.
///
/// # Errors
///
/// - Return [`Error::Conflict`] if `link` holds real content and `force` is
///   not set, or if a parent directory position is taken by a file.
/// - Return [`Error::Io`] if file system operations fail.
pub fn create_symlink(
    source: impl AsRef<Path>,
    link: impl AsRef<Path>,
    force: bool,
) -> Result<Outcome> {
    let source = source.as_ref();
    let link = link.as_ref();

    // INVARIANT: A link never replaces a directory holding its own source.
    if source.starts_with(link) {
        return Err(Error::Conflict {
            path: link.to_path_buf(),
        });
    }

    if let Some(parent) = link.parent() {
        ensure_dir(parent)?;
    }
    if fs::symlink_metadata(source).is_err() {
        ensure_dir(source)?;
    }

    let outcome = match fs::symlink_metadata(link) {
        Err(err) if err.kind() == ErrorKind::NotFound => Outcome::Created,
        Err(err) => return Err(Error::io(err, link)),
        Ok(meta) if meta.file_type().is_symlink() => {
            let current = fs::read_link(link).map_err(|err| Error::io(err, link))?;
            if current == source && !force {
                return Ok(Outcome::Unchanged);
            }
            remove_entry(link, &meta)?;
            Outcome::Replaced
        }
        Ok(meta) if force => {
            debug!("force removal of {:?}", link.display());
            remove_entry(link, &meta)?;
            Outcome::Replaced
        }
        Ok(_) => {
            return Err(Error::Conflict {
                path: link.to_path_buf(),
            })
        }
    };

    symlink(source, link).map_err(|err| Error::io(err, link))?;
    Ok(outcome)
}

/// Remove link at `path`.
///
/// Symlinks are always removed, wherever they point. A regular file whose
/// extension is `shortcut_extension` counts as a link too. Anything else is
/// only removed, recursively, if `force` is set. Nothing existing at `path`
/// is not an error.
///
/// # Errors
///
/// - Return [`Error::Conflict`] if `path` holds real content and `force` is
///   not set.
/// - Return [`Error::Io`] if file system operations fail.
pub fn remove_link(
    path: impl AsRef<Path>,
    force: bool,
    shortcut_extension: Option<&str>,
) -> Result<Outcome> {
    let path = path.as_ref();
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Outcome::Absent),
        Err(err) => return Err(Error::io(err, path)),
    };

    let is_shortcut = meta.is_file()
        && shortcut_extension.is_some_and(|ext| crate::path::has_extension(path, ext));

    if meta.file_type().is_symlink() || is_shortcut || force {
        remove_entry(path, &meta)?;
        return Ok(Outcome::Removed);
    }

    Err(Error::Conflict {
        path: path.to_path_buf(),
    })
}

/// Check if `link` is a symlink pointing at `source`.
pub fn is_linked(source: impl AsRef<Path>, link: impl AsRef<Path>) -> bool {
    fs::read_link(link.as_ref()).is_ok_and(|current| current == source.as_ref())
}

/// Make sure `dir` is a directory, creating it when missing.
///
/// A symlink to a directory counts as a directory.
///
/// # Errors
///
/// - Return [`Error::Conflict`] if `dir` exists but is not a directory.
/// - Return [`Error::Io`] if directory cannot be created.
pub fn ensure_dir(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(Error::Conflict {
            path: dir.to_path_buf(),
        }),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|err| Error::io(err, dir))
        }
        Err(err) => Err(Error::io(err, dir)),
    }
}

fn remove_entry(path: &Path, meta: &Metadata) -> Result<()> {
    let result = if meta.file_type().is_symlink() {
        remove_symlink(path)
    } else if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };

    result.map_err(|err| Error::io(err, path))
}

#[cfg(unix)]
fn symlink(source: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, link)
}

#[cfg(windows)]
fn symlink(source: &Path, link: &Path) -> io::Result<()> {
    if source.is_dir() {
        std::os::windows::fs::symlink_dir(source, link)
    } else {
        std::os::windows::fs::symlink_file(source, link)
    }
}

#[cfg(unix)]
fn remove_symlink(path: &Path) -> io::Result<()> {
    fs::remove_file(path)
}

// INVARIANT: Directory symlinks on Windows must be removed as directories.
#[cfg(windows)]
fn remove_symlink(path: &Path) -> io::Result<()> {
    use std::os::windows::fs::FileTypeExt;

    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink_dir() => fs::remove_dir(path),
        _ => fs::remove_file(path),
    }
}

/// Link operation error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Path holds real content that cannot be replaced without force.
    #[error("{:?} exists and is not a link (use force to replace it)", path.display())]
    Conflict { path: PathBuf },

    /// File system operation fails.
    #[error("file system operation failed at {:?}", path.display())]
    Io {
        #[source]
        source: io::Error,
        path: PathBuf,
    },
}

impl Error {
    fn io(source: io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }
}

/// Friendly result alias :3
type Result<T, E = Error> = std::result::Result<T, E>;
