// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Path resolution utilities.
//!
//! Turn the path expressions found in descriptor files into clean absolute
//! paths. Nothing here touches the file system, so a path returned by these
//! helpers may not actually exist.

use std::{
    ffi::OsStr,
    path::{Component, Path, PathBuf},
};

/// Lexically normalize a path.
///
/// Folds away `.` components, and resolves `..` against the component that
/// precedes it. A `..` that would climb above the root is dropped, while a
/// leading `..` in a relative path is preserved.
pub fn normalize(path: impl AsRef<Path>) -> PathBuf {
    let mut normal = PathBuf::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => continue,
            Component::ParentDir => match normal.components().next_back() {
                Some(Component::Normal(_)) => {
                    normal.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => continue,
                _ => normal.push(component),
            },
            _ => normal.push(component),
        }
    }

    normal
}

/// Resolve a descriptor path expression against an application base
/// directory.
///
/// A leading `~` expands to the user's home directory. Relative paths are
/// joined onto `base`. The result is always normalized.
pub fn absolutize(base: impl AsRef<Path>, path: impl AsRef<str>) -> PathBuf {
    let expanded = shellexpand::tilde_with_context(path.as_ref(), home_dir);
    let path = Path::new(expanded.as_ref());
    if path.is_absolute() {
        normalize(path)
    } else {
        normalize(base.as_ref().join(path))
    }
}

/// Home directory of the current user as a lossy string.
fn home_dir() -> Option<String> {
    dirs::home_dir().map(|home| home.to_string_lossy().into_owned())
}

/// Check if a file name ends in the given extension, ignoring ASCII case.
pub fn has_extension(name: impl AsRef<OsStr>, extension: &str) -> bool {
    Path::new(name.as_ref())
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Name of a file with the given extension appended to it, unless it already
/// carries that extension.
pub fn with_extension(name: &str, extension: &str) -> String {
    if has_extension(name, extension) {
        name.to_string()
    } else {
        format!("{name}.{extension}")
    }
}

/// Final component of a path as a lossy string.
pub(crate) fn base_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}
