// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Symbolic names for well-known directories.
//!
//! An __alias__ is a symbolic name standing for an absolute directory, e.g.,
//! "Desktop" for the user's desktop folder. Descriptor files refer to these
//! directories through `${Name}` placeholders, which keeps them portable
//! between machines whose users keep their folders in different places.
//!
//! The [`AliasTable`] works in two directions:
//!
//! - __Expansion__ maps a name to its directory. Lookups ignore case.
//! - __Reduction__ maps a path to the most specific alias whose directory
//!   contains it. Entries are kept sorted by descending directory length so
//!   that deeper directories are always tried before their ancestors.
//!
//! Tables are built fresh for each application, because some entries like
//! "Base" depend on where the application lives. Once built, a table never
//! changes.

use std::{
    env,
    path::{Component, Path, PathBuf},
};

/// Alias name of an application's base directory.
pub const BASE: &str = "Base";

/// Alias name of the user's desktop directory.
pub const DESKTOP: &str = "Desktop";

/// Alias name of the start menu root where shortcuts are grouped.
pub const START: &str = "Start";

/// Well-known user directories of the host.
///
/// Any directory that cannot be determined on the current host is left as
/// `None`, and simply does not appear in alias tables built from it.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct HostDirs {
    pub home: Option<PathBuf>,
    pub desktop: Option<PathBuf>,
    pub documents: Option<PathBuf>,
    pub downloads: Option<PathBuf>,
    pub music: Option<PathBuf>,
    pub pictures: Option<PathBuf>,
    pub videos: Option<PathBuf>,
    pub local: Option<PathBuf>,
    pub roaming: Option<PathBuf>,
    pub programs: Option<PathBuf>,
    pub program_files: Option<PathBuf>,
    pub program_files_x86: Option<PathBuf>,
    pub start_menu: Option<PathBuf>,
}

impl HostDirs {
    /// Detect user directories of the current host.
    pub fn detect() -> Self {
        let local = dirs::data_local_dir();
        let roaming = dirs::data_dir();
        let programs = dirs::executable_dir()
            .or_else(|| local.as_ref().map(|local| local.join("Programs")));

        Self {
            home: dirs::home_dir(),
            desktop: dirs::desktop_dir(),
            documents: dirs::document_dir(),
            downloads: dirs::download_dir(),
            music: dirs::audio_dir(),
            pictures: dirs::picture_dir(),
            videos: dirs::video_dir(),
            programs,
            program_files: env::var_os("ProgramFiles").map(PathBuf::from),
            program_files_x86: env::var_os("ProgramFiles(x86)").map(PathBuf::from),
            start_menu: roaming.as_deref().map(start_menu_root),
            local,
            roaming,
        }
    }
}

#[cfg(windows)]
fn start_menu_root(roaming: &Path) -> PathBuf {
    roaming
        .join("Microsoft")
        .join("Windows")
        .join("Start Menu")
        .join("PortableApps")
}

#[cfg(not(windows))]
fn start_menu_root(data: &Path) -> PathBuf {
    data.join("applications").join("PortableApps")
}

/// Single alias entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    name: String,
    dir: PathBuf,
}

impl Alias {
    /// Symbolic name of the alias.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute directory the alias stands for.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Immutable table of aliases sorted for longest-prefix reduction.
///
/// # Invariant
///
/// - No entry has an empty directory.
/// - Entries are sorted by descending directory length, ties broken by
///   reverse lexicographic name.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct AliasTable {
    entries: Vec<Alias>,
}

impl AliasTable {
    /// Construct new alias table from name and directory pairs.
    ///
    /// Pairs with an empty name or directory are dropped.
    pub fn new<N, D>(entries: impl IntoIterator<Item = (N, D)>) -> Self
    where
        N: Into<String>,
        D: Into<PathBuf>,
    {
        let mut entries = entries
            .into_iter()
            .map(|(name, dir)| Alias {
                name: name.into(),
                dir: crate::path::normalize(dir.into()),
            })
            .filter(|alias| !alias.name.is_empty() && !alias.dir.as_os_str().is_empty())
            .collect::<Vec<_>>();

        entries.sort_by(|a, b| {
            b.dir
                .as_os_str()
                .len()
                .cmp(&a.dir.as_os_str().len())
                .then_with(|| b.name.cmp(&a.name))
        });

        Self { entries }
    }

    /// Build the alias table for an application living at `base`.
    pub fn for_app(base: impl AsRef<Path>, host: &HostDirs) -> Self {
        let host_entries = [
            ("Home", &host.home),
            (DESKTOP, &host.desktop),
            ("Document", &host.documents),
            ("Documents", &host.documents),
            ("Download", &host.downloads),
            ("Downloads", &host.downloads),
            ("Music", &host.music),
            ("Musics", &host.music),
            ("Picture", &host.pictures),
            ("Pictures", &host.pictures),
            ("Video", &host.videos),
            ("Videos", &host.videos),
            ("Local", &host.local),
            ("Roaming", &host.roaming),
            ("Programs", &host.programs),
            ("ProgramFiles", &host.program_files),
            ("ProgramFilesX86", &host.program_files_x86),
            (START, &host.start_menu),
        ];

        let app_entries = [(BASE, base.as_ref().to_path_buf())];
        Self::new(
            host_entries
                .into_iter()
                .filter_map(|(name, dir)| dir.clone().map(|dir| (name, dir)))
                .chain(app_entries),
        )
    }

    /// Expand alias name into its directory, ignoring case.
    pub fn lookup(&self, name: impl AsRef<str>) -> Option<&Path> {
        let name = name.as_ref();
        self.entries
            .iter()
            .find(|alias| alias.name.eq_ignore_ascii_case(name))
            .map(|alias| alias.dir.as_path())
    }

    /// Reduce a path to the most specific alias containing it.
    ///
    /// Returns the alias along with the remainder of `path` relative to the
    /// alias directory. Matching is performed per path component and ignores
    /// case, so `/home/u/.localx` is not considered to be under
    /// `/home/u/.local`.
    pub fn reduce(&self, path: impl AsRef<Path>) -> Option<(&Alias, PathBuf)> {
        let path = path.as_ref();
        self.entries
            .iter()
            .find_map(|alias| strip_prefix_ignore_case(path, &alias.dir).map(|rest| (alias, rest)))
    }

    /// Iterate through entries in reduction order.
    pub fn iter(&self) -> impl Iterator<Item = &Alias> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn strip_prefix_ignore_case(path: &Path, prefix: &Path) -> Option<PathBuf> {
    let mut components = path.components();
    for expect in prefix.components() {
        let found = components.next()?;
        if !component_eq_ignore_case(found, expect) {
            return None;
        }
    }

    Some(components.as_path().to_path_buf())
}

fn component_eq_ignore_case(a: Component<'_>, b: Component<'_>) -> bool {
    let a = a.as_os_str().to_string_lossy();
    let b = b.as_os_str().to_string_lossy();
    a == b || a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn host() -> HostDirs {
        HostDirs {
            home: Some("/home/u".into()),
            desktop: Some("/home/u/Desktop".into()),
            documents: Some("/home/u/Documents".into()),
            local: Some("/home/u/.local".into()),
            roaming: Some("/home/u/.local/share".into()),
            start_menu: Some("/home/u/.local/share/applications/PortableApps".into()),
            ..HostDirs::default()
        }
    }

    #[test]
    fn lookup_ignores_case() {
        let table = AliasTable::for_app("/apps/foo", &host());
        assert_eq!(table.lookup("desktop"), Some(Path::new("/home/u/Desktop")));
        assert_eq!(table.lookup("LOCAL"), Some(Path::new("/home/u/.local")));
        assert_eq!(table.lookup("base"), Some(Path::new("/apps/foo")));
        assert_eq!(table.lookup("Music"), None);
    }

    #[test]
    fn aliases_sharing_a_directory_resolve_identically() {
        let table = AliasTable::for_app("/apps/foo", &host());
        assert_eq!(table.lookup("Document"), table.lookup("Documents"));
        assert_eq!(table.lookup("Document"), Some(Path::new("/home/u/Documents")));
    }

    #[test]
    fn entries_sorted_by_descending_directory_length() {
        let table = AliasTable::new([("A", "/a"), ("ABC", "/a/b/c"), ("AB", "/a/b")]);
        let names = table.iter().map(Alias::name).collect::<Vec<_>>();
        assert_eq!(names, vec!["ABC", "AB", "A"]);
    }

    #[test]
    fn empty_entries_are_dropped() {
        let table = AliasTable::new([("A", ""), ("", "/b"), ("C", "/c")]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("C"), Some(Path::new("/c")));
    }

    #[test]
    fn reduce_prefers_most_specific_alias() {
        let table = AliasTable::for_app("/apps/foo", &host());
        let (alias, rest) = table.reduce("/home/u/.local/share/foo/cfg").unwrap();
        assert_eq!(alias.name(), "Roaming");
        assert_eq!(rest, PathBuf::from("foo/cfg"));

        let (alias, rest) = table.reduce("/home/u/.local/foo").unwrap();
        assert_eq!(alias.name(), "Local");
        assert_eq!(rest, PathBuf::from("foo"));
    }

    #[test]
    fn reduce_respects_component_boundaries() {
        let table = AliasTable::new([("Local", "/home/u/.local"), ("Home", "/home/u")]);
        let (alias, rest) = table.reduce("/home/u/.localx/foo").unwrap();
        assert_eq!(alias.name(), "Home");
        assert_eq!(rest, PathBuf::from(".localx/foo"));
        assert!(table.reduce("/srv/foo").is_none());
    }

    #[test]
    fn reduce_ignores_case() {
        let table = AliasTable::new([("Documents", "/Home/U/Documents")]);
        let (alias, rest) = table.reduce("/home/u/documents/Notes").unwrap();
        assert_eq!(alias.name(), "Documents");
        assert_eq!(rest, PathBuf::from("Notes"));
    }

    #[test]
    fn reduce_picks_plural_name_for_shared_directory() {
        let table = AliasTable::for_app("/apps/foo", &host());
        let (alias, _) = table.reduce("/home/u/Documents/x").unwrap();
        assert_eq!(alias.name(), "Documents");
    }
}
