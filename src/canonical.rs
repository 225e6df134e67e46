// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Canonical storage locations for bound paths.
//!
//! Every path an application binds is backed by a directory under the
//! application's data root. The location is derived from the path itself:
//!
//! - If an alias contains the path, the location is
//!   `<data-root>/<alias name>/<rest of path>`. Since the location is keyed
//!   by the alias name instead of the raw host path, the data root can be
//!   carried to another machine with different folder locations.
//! - Otherwise, the location falls back to
//!   `<data-root>/<parent directory name>/<file name>`.

use crate::{alias::AliasTable, path::base_name};

use std::path::{Path, PathBuf};

/// Map an absolute target path to its canonical source under `data_root`.
///
/// Deterministic for a given alias table. When several aliases contain the
/// target, the one with the longest directory wins.
pub fn map_to_canonical(
    aliases: &AliasTable,
    target: impl AsRef<Path>,
    data_root: impl AsRef<Path>,
) -> PathBuf {
    let target = target.as_ref();
    let data_root = data_root.as_ref();

    if let Some((alias, rest)) = aliases.reduce(target) {
        let mut source = data_root.join(alias.name());
        if !rest.as_os_str().is_empty() {
            source.push(rest);
        }
        return source;
    }

    let mut source = data_root.to_path_buf();
    if let Some(parent) = target.parent().and_then(base_name) {
        source.push(parent);
    }
    if let Some(name) = base_name(target) {
        source.push(name);
    }

    source
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use simple_test_case::test_case;

    fn aliases() -> AliasTable {
        AliasTable::new([
            ("Home", "/home/u"),
            ("Local", "/home/u/.local"),
            ("Roaming", "/home/u/.local/share"),
            ("Base", "/apps/foo"),
        ])
    }

    #[test_case("/home/u/.local/MyApp/config", "/apps/foo/Data/Local/MyApp/config"; "local alias")]
    #[test_case("/home/u/.local/share/MyApp", "/apps/foo/Data/Roaming/MyApp"; "longest prefix wins")]
    #[test_case("/home/u/.MyApp", "/apps/foo/Data/Home/.MyApp"; "broad ancestor")]
    #[test_case("/HOME/U/.Local/MyApp", "/apps/foo/Data/Local/MyApp"; "ignores case")]
    #[test_case("/apps/foo/settings", "/apps/foo/Data/Base/settings"; "app relative")]
    #[test_case("/srv/games/MyApp/save", "/apps/foo/Data/MyApp/save"; "fallback to parent name")]
    #[test_case("/save", "/apps/foo/Data/save"; "fallback without parent")]
    #[test_case("/home/u/.local", "/apps/foo/Data/Local"; "alias directory itself")]
    #[test]
    fn map_target_to_canonical_source(target: &str, expect: &str) {
        let source = map_to_canonical(&aliases(), target, "/apps/foo/Data");
        pretty_assertions::assert_eq!(source, PathBuf::from(expect));
    }

    #[test]
    fn mapping_is_deterministic() {
        let aliases = aliases();
        let first = map_to_canonical(&aliases, "/home/u/.local/share/x/y", "/d");
        let second = map_to_canonical(&aliases, "/home/u/.local/share/x/y", "/d");
        assert_eq!(first, second);
    }
}
