// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Locate portable applications below a set of root directories.
//!
//! Discovery walks each root a bounded number of directory levels deep, and
//! tries to load an application from every directory it visits. Directories
//! whose name starts with `.`, `_`, or `~` are skipped along with everything
//! beneath them, e.g., `.git`, `_backup`, `~trash`.
//!
//! A directory that does not define an application is not an error, and
//! neither is a malformed definition. Both are logged and skipped, so one
//! broken application never hides the rest.

use crate::{
    alias::HostDirs,
    app::{self, App},
};

use ignore::{DirEntry, WalkBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument, warn};

/// Default number of directory levels walked below each root.
pub const DEFAULT_DEPTH: usize = 3;

/// Discover every application below `roots`.
///
/// With `max_depth` of zero, each root is itself loaded as an application
/// directory or definition file. Otherwise every directory up to
/// `max_depth` levels below each root, root included, is tried. Results
/// follow root order, then file name order within each root.
#[instrument(skip(roots, host), level = "debug")]
pub fn discover(roots: &[PathBuf], max_depth: usize, host: &HostDirs) -> Vec<App> {
    let mut apps = Vec::new();
    for root in roots {
        for dir in candidate_dirs(root, max_depth) {
            match App::load(&dir, host) {
                Ok(app) => {
                    info!("found {:?} at {:?}", app.name(), app.base().display());
                    apps.push(app);
                }
                Err(err) if err.is_not_found() => debug!("skip {:?}: {err}", dir.display()),
                Err(err) => warn!("skip {:?}: {:#}", dir.display(), anyhow::Error::new(err)),
            }
        }
    }

    apps
}

/// Load one application from each of `paths`, without walking.
///
/// Unlike [`discover`], every path is expected to name an application, so
/// each one that fails to load is logged as an error and returned.
#[instrument(skip(paths, host), level = "debug")]
pub fn load_paths(paths: &[PathBuf], host: &HostDirs) -> (Vec<App>, Vec<app::Error>) {
    let mut apps = Vec::new();
    let mut errors = Vec::new();
    for path in paths {
        match App::load(path, host) {
            Ok(app) => {
                info!("found {:?} at {:?}", app.name(), app.base().display());
                apps.push(app);
            }
            Err(err) => {
                match std::error::Error::source(&err) {
                    Some(cause) => error!("{err}: {cause}"),
                    None => error!("{err}"),
                }
                errors.push(err);
            }
        }
    }

    (apps, errors)
}

/// List the directories under `root` that may hold an application.
pub fn candidate_dirs(root: impl AsRef<Path>, max_depth: usize) -> Vec<PathBuf> {
    let root = root.as_ref();
    if max_depth == 0 {
        return vec![root.to_path_buf()];
    }

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .max_depth(Some(max_depth))
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| entry.depth() == 0 || is_candidate(entry))
        .build();

    let mut dirs = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_some_and(|kind| kind.is_dir()) => {
                dirs.push(entry.into_path())
            }
            Ok(_) => continue,
            Err(err) => warn!("cannot walk {:?}: {err}", root.display()),
        }
    }

    dirs
}

/// Expand root patterns holding glob metacharacters.
///
/// Patterns without metacharacters are kept as-is, even when they do not
/// exist. A pattern matching nothing is dropped.
pub fn expand_roots<I, P>(patterns: I) -> Vec<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut roots = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let text = pattern.to_string_lossy();
        if !text.contains(['*', '?', '[']) {
            roots.push(pattern.to_path_buf());
            continue;
        }

        let matches = match glob::glob(&text) {
            Ok(paths) => paths
                .filter_map(|path| match path {
                    Ok(path) => Some(path),
                    Err(err) => {
                        warn!("cannot expand {text:?}: {err}");
                        None
                    }
                })
                .collect::<Vec<_>>(),
            Err(err) => {
                warn!("invalid pattern {text:?}: {err}");
                continue;
            }
        };

        if matches.is_empty() {
            warn!("pattern {text:?} matches nothing");
        }
        roots.extend(matches);
    }

    roots
}

/// Check if a directory name marks a subtree to skip.
pub fn is_skipped_name(name: &str) -> bool {
    name.starts_with(['.', '_', '~'])
}

fn is_candidate(entry: &DirEntry) -> bool {
    if !entry.file_type().is_some_and(|kind| kind.is_dir()) {
        return false;
    }

    let name = entry.file_name().to_string_lossy();
    if is_skipped_name(&name) {
        debug!("skip subtree {:?}", entry.path().display());
        return false;
    }

    true
}
