// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Portable application descriptors.
//!
//! A __portable application__ is a self-contained directory accompanied by a
//! definition file named `portable.yaml` (or `.yml`, `.json`, `.toml`). The
//! definition lists __bindings__, i.e., paths the application expects to
//! exist that should instead live inside the application's data root, and
//! __shortcuts__ pointing at executables inside the application.
//!
//! Loading a definition produces an [`App`] descriptor, where every
//! placeholder is expanded, every path is absolute, and every binding knows
//! its canonical source under the data root. Loading never touches the file
//! system beyond reading the definition file.
//!
//! # Data Root
//!
//! Bound content is stored at `<base>/Data`, where `<base>` is the directory
//! holding the definition file. See [`crate::canonical`] for how each bound
//! path maps to a location inside it.

use crate::{
    alias::{self, AliasTable, HostDirs},
    canonical::map_to_canonical,
    config::{AppDefinition, ConfigError, ConfigFormat, ShortcutDefinition},
    path::{absolutize, base_name},
    template::Template,
};

use std::{
    fs::{create_dir_all, read_to_string, write},
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

/// Stem of definition file names.
pub const CONFIG_NAME: &str = "portable";

/// Name of data root directory inside an application.
pub const DATA_DIR: &str = "Data";

/// Bound path and the canonical location storing its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Canonical location under the data root.
    pub source: PathBuf,

    /// Path the application expects, which becomes a symlink to `source`.
    pub link: PathBuf,
}

/// Fully resolved shortcut.
///
/// # Invariant
///
/// - `name` and `target` must be non-empty before creation is attempted.
///   Empty values are kept as-is so that creation can report them.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    pub name: String,
    pub target: PathBuf,
    pub workdir: PathBuf,
    pub args: String,
    pub description: String,
    pub hotkey: String,
    pub style: String,
    pub icon: String,
    pub category: String,
    pub places: Vec<PathBuf>,
}

/// Fully resolved portable application descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct App {
    name: String,
    base: PathBuf,
    config_path: PathBuf,
    bindings: Vec<Binding>,
    shortcuts: Vec<Shortcut>,
}

impl App {
    /// Load application descriptor from a definition file or directory.
    ///
    /// If `path` is a directory, the definition file is searched inside of it
    /// by probing each extension of [`ConfigFormat::EXTENSIONS`] in order.
    ///
    /// # Errors
    ///
    /// - Return [`Error::NotFound`] if no definition file exists.
    /// - Return [`Error::Read`] if definition file cannot be read.
    /// - Return [`Error::Config`] if definition file is malformed.
    #[instrument(skip(path, host), level = "debug")]
    pub fn load(path: impl AsRef<Path>, host: &HostDirs) -> Result<Self> {
        let config_path = locate(path.as_ref())?;
        debug!("load definition {:?}", config_path.display());

        let data = read_to_string(&config_path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => Error::NotFound {
                path: config_path.clone(),
            },
            _ => Error::Read {
                source: err,
                path: config_path.clone(),
            },
        })?;

        let definition = ConfigFormat::from_path(&config_path)
            .and_then(|format| AppDefinition::parse(&data, format))
            .map_err(|err| Error::Config {
                source: err,
                path: config_path.clone(),
            })?;

        Ok(Self::from_definition(definition, config_path, host))
    }

    /// Resolve a parsed definition that was read from `config_path`.
    ///
    /// The application base is the parent directory of `config_path`, which
    /// is expected to be absolute.
    pub fn from_definition(
        definition: AppDefinition,
        config_path: impl Into<PathBuf>,
        host: &HostDirs,
    ) -> Self {
        let config_path = config_path.into();
        let base = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let data_root = base.join(DATA_DIR);
        let aliases = AliasTable::for_app(&base, host);
        let template = Template::new(&aliases);

        let name = match definition.name.trim() {
            "" => base_name(&base).unwrap_or_default(),
            name => template.resolve(name),
        };

        let bindings = definition
            .bind
            .iter()
            .map(|raw| {
                let link = absolutize(&base, template.resolve(raw));
                let source = map_to_canonical(&aliases, &link, &data_root);
                Binding { source, link }
            })
            .collect();

        let shortcuts = definition
            .shortcuts
            .into_iter()
            .map(|shortcut| resolve_shortcut(shortcut, &base, &aliases, &template))
            .collect();

        Self {
            name,
            base,
            config_path,
            bindings,
            shortcuts,
        }
    }

    /// Display name of the application.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding the application.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Directory storing bound content.
    pub fn data_root(&self) -> PathBuf {
        self.base.join(DATA_DIR)
    }

    /// Definition file the descriptor was loaded from.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Resolved bindings, in definition order.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Resolved shortcuts, in definition order.
    pub fn shortcuts(&self) -> &[Shortcut] {
        &self.shortcuts
    }
}

fn resolve_shortcut(
    shortcut: ShortcutDefinition,
    base: &Path,
    aliases: &AliasTable,
    template: &Template<'_>,
) -> Shortcut {
    let resolve_path = |raw: &str| match template.resolve(raw).trim() {
        "" => PathBuf::new(),
        path => absolutize(base, path),
    };

    let target = resolve_path(shortcut.target.as_str());
    let workdir = match resolve_path(shortcut.workdir.as_str()) {
        workdir if workdir.as_os_str().is_empty() => target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
        workdir => workdir,
    };

    let mut places = shortcut
        .places
        .iter()
        .map(|place| resolve_path(place.as_str()))
        .filter(|place| !place.as_os_str().is_empty())
        .collect::<Vec<_>>();

    // INVARIANT: Default places only apply when none were written down.
    if shortcut.places.is_empty() {
        places.push(base.to_path_buf());
        if let Some(desktop) = aliases.lookup(alias::DESKTOP) {
            places.push(desktop.to_path_buf());
        }
        if let Some(start) = aliases.lookup(alias::START) {
            match shortcut.category.trim() {
                "" => places.push(start.to_path_buf()),
                category => places.push(start.join(category)),
            }
        }
    }

    let icon = match template.resolve(&shortcut.icon).trim() {
        "" => String::new(),
        icon => absolutize(base, icon).to_string_lossy().into_owned(),
    };

    Shortcut {
        name: template.resolve(&shortcut.name).trim().to_string(),
        target,
        workdir,
        args: template.resolve(&shortcut.args),
        description: shortcut.description,
        hotkey: shortcut.hotkey,
        style: shortcut.style,
        icon,
        category: shortcut.category,
        places,
    }
}

/// Write a skeleton definition file into `dir`.
///
/// The application is named `name`, or after `dir` when no name is given.
/// Creates `dir` if it does not exist yet.
///
/// # Errors
///
/// - Return [`Error::Exists`] if `dir` already holds a definition file.
/// - Return [`Error::Write`] if definition file cannot be written.
/// - Return [`Error::Config`] if skeleton cannot be serialized.
#[instrument(skip(dir), level = "debug")]
pub fn init(dir: impl AsRef<Path>, name: Option<&str>) -> Result<PathBuf> {
    let dir = std::path::absolute(dir.as_ref()).map_err(|err| Error::Write {
        source: err,
        path: dir.as_ref().to_path_buf(),
    })?;
    let dir = crate::path::normalize(dir);

    if let Some(existing) = ConfigFormat::EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{CONFIG_NAME}.{ext}")))
        .find(|candidate| candidate.exists())
    {
        return Err(Error::Exists { path: existing });
    }

    let config_path = dir.join(format!("{CONFIG_NAME}.{}", ConfigFormat::EXTENSIONS[0]));
    let definition = AppDefinition {
        name: name
            .map(ToString::to_string)
            .or_else(|| base_name(&dir))
            .unwrap_or_default(),
        ..AppDefinition::default()
    };
    let data = definition
        .render(ConfigFormat::Yaml)
        .map_err(|err| Error::Config {
            source: err,
            path: config_path.clone(),
        })?;

    let write_err = |err| Error::Write {
        source: err,
        path: config_path.clone(),
    };
    create_dir_all(&dir).map_err(write_err)?;
    write(&config_path, data).map_err(write_err)?;
    info!("wrote definition {:?}", config_path.display());

    Ok(config_path)
}

/// Find the definition file named by `path`.
fn locate(path: &Path) -> Result<PathBuf> {
    let path = std::path::absolute(path).map_err(|err| Error::Read {
        source: err,
        path: path.to_path_buf(),
    })?;
    let path = crate::path::normalize(path);

    if !path.is_dir() {
        return Ok(path);
    }

    ConfigFormat::EXTENSIONS
        .iter()
        .map(|ext| path.join(format!("{CONFIG_NAME}.{ext}")))
        .find(|candidate| candidate.is_file())
        .ok_or(Error::NotFound { path })
}

/// Descriptor loading error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Definition file or directory does not exist.
    #[error("no definition found at {:?}", path.display())]
    NotFound { path: PathBuf },

    /// Definition file cannot be read.
    #[error("failed to read definition at {:?}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Definition file already exists where a new one should be written.
    #[error("definition already exists at {:?}", path.display())]
    Exists { path: PathBuf },

    /// Definition file cannot be written.
    #[error("failed to write definition at {:?}", path.display())]
    Write {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Definition file content is malformed.
    #[error("malformed definition at {:?}", path.display())]
    Config {
        #[source]
        source: ConfigError,
        path: PathBuf,
    },
}

impl Error {
    /// Check if error only means that there is no application here.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Friendly result alias :3
type Result<T, E = Error> = std::result::Result<T, E>;
