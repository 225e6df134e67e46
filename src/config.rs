// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of descriptor files to simplify the process of
//! serialization and deserialization. Fields are kept exactly as written,
//! placeholders included. Resolving them is left to [`crate::app`], and file
//! I/O is left to the caller to figure out.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::Path,
};

/// Application definition layout.
///
/// All portable applications come with a __definition__ file at the top of
/// their directory. It names the application, lists the paths the
/// application expects to exist that should be redirected into its data
/// root, and lists the shortcuts that should point into it.
///
/// # General Layout
///
/// ```yaml
/// name: Foo
/// bind:
///   - ${Roaming}/Foo
///   - ${Local}/Foo/cache
/// shortcut:
///   - name: Foo
///     target: foo.exe
///     category: Tools
/// ```
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppDefinition {
    /// Display name of the application.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Path expressions to bind into the data root.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bind: Vec<String>,

    /// Shortcuts to create for the application.
    #[serde(rename = "shortcut", skip_serializing_if = "Vec::is_empty")]
    pub shortcuts: Vec<ShortcutDefinition>,
}

impl AppDefinition {
    /// Parse definition from text in the given format.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError`] variant matching `format` if text cannot be
    ///   deserialized.
    pub fn parse(data: &str, format: ConfigFormat) -> Result<Self> {
        // INVARIANT: Empty definition files are valid and define nothing.
        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        let definition = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(data)?,
            ConfigFormat::Json => serde_json::from_str(data)?,
            ConfigFormat::Toml => toml::de::from_str(data)?,
        };

        Ok(definition)
    }

    /// Serialize definition in the given format.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError`] variant matching `format` if definition
    ///   cannot be serialized.
    pub fn render(&self, format: ConfigFormat) -> Result<String> {
        let data = match format {
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Toml => toml::ser::to_string_pretty(self)?,
        };

        Ok(data)
    }
}

impl Display for AppDefinition {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(self.render(ConfigFormat::Yaml)?.as_str())
    }
}

/// Shortcut definition layout.
///
/// Every field may carry `${Name}` placeholders. When no places are given,
/// the shortcut goes to the application directory, the desktop, and the
/// start menu under `category`.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ShortcutDefinition {
    /// File name of the shortcut, without extension.
    pub name: String,

    /// Executable the shortcut launches.
    pub target: String,

    /// Working directory to launch in.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub workdir: String,

    /// Command line arguments.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub args: String,

    /// Brief description shown as a tooltip.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Global hotkey, e.g., "Ctrl+Alt+F".
    #[serde(skip_serializing_if = "String::is_empty")]
    pub hotkey: String,

    /// Window style to launch with.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub style: String,

    /// Icon location.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon: String,

    /// Start menu group used for the default places.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub category: String,

    /// Directories to place the shortcut in.
    #[serde(rename = "place", alias = "places", skip_serializing_if = "Vec::is_empty")]
    pub places: Vec<String>,
}

/// Supported definition file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    /// File extensions tried when looking for a definition file, in order of preference.
    pub const EXTENSIONS: [&'static str; 4] = ["yaml", "yml", "json", "toml"];

    /// Determine format from a file extension, ignoring case.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            "toml" => Some(Self::Toml),
            _ => None,
        }
    }

    /// Determine format of a definition file from its path.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Unsupported`] if the extension is unknown.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let extension = path
            .as_ref()
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self::from_extension(&extension).ok_or(ConfigError::Unsupported(extension))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize or serialize YAML.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// Failed to deserialize or serialize JSON.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Failed to deserialize TOML.
    #[error(transparent)]
    TomlDeserialize(#[from] toml::de::Error),

    /// Failed to serialize TOML.
    #[error(transparent)]
    TomlSerialize(#[from] toml::ser::Error),

    /// Definition file has an unknown extension.
    #[error("unsupported definition format {0:?}")]
    Unsupported(String),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn expected() -> AppDefinition {
        AppDefinition {
            name: "Foo".into(),
            bind: vec!["${Roaming}/Foo".into(), "${Local}/Foo/cache".into()],
            shortcuts: vec![ShortcutDefinition {
                name: "Foo".into(),
                target: "${Base}/foo.exe".into(),
                args: "--portable".into(),
                category: "Tools".into(),
                places: vec!["${Desktop}".into()],
                ..ShortcutDefinition::default()
            }],
        }
    }

    #[test]
    fn deserialize_yaml_definition() -> anyhow::Result<()> {
        let result = AppDefinition::parse(
            indoc! {r#"
                name: Foo
                bind:
                  - ${Roaming}/Foo
                  - ${Local}/Foo/cache
                shortcut:
                  - name: Foo
                    target: ${Base}/foo.exe
                    args: --portable
                    category: Tools
                    place: ["${Desktop}"]
            "#},
            ConfigFormat::Yaml,
        )?;

        assert_eq!(result, expected());
        Ok(())
    }

    #[test]
    fn deserialize_json_definition() -> anyhow::Result<()> {
        let result = AppDefinition::parse(
            indoc! {r#"
                {
                    "name": "Foo",
                    "bind": ["${Roaming}/Foo", "${Local}/Foo/cache"],
                    "shortcut": [{
                        "name": "Foo",
                        "target": "${Base}/foo.exe",
                        "args": "--portable",
                        "category": "Tools",
                        "places": ["${Desktop}"],
                        "unknown": true
                    }]
                }
            "#},
            ConfigFormat::Json,
        )?;

        assert_eq!(result, expected());
        Ok(())
    }

    #[test]
    fn deserialize_toml_definition() -> anyhow::Result<()> {
        let result = AppDefinition::parse(
            indoc! {r#"
                name = "Foo"
                bind = ["${Roaming}/Foo", "${Local}/Foo/cache"]

                [[shortcut]]
                name = "Foo"
                target = "${Base}/foo.exe"
                args = "--portable"
                category = "Tools"
                place = ["${Desktop}"]
            "#},
            ConfigFormat::Toml,
        )?;

        assert_eq!(result, expected());
        Ok(())
    }

    #[test]
    fn deserialize_empty_definition() -> anyhow::Result<()> {
        let result = AppDefinition::parse("{}", ConfigFormat::Yaml)?;
        assert_eq!(result, AppDefinition::default());

        let result = AppDefinition::parse("\n", ConfigFormat::Json)?;
        assert_eq!(result, AppDefinition::default());
        Ok(())
    }

    #[test]
    fn deserialize_malformed_definition() {
        let result = AppDefinition::parse("bind: {", ConfigFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::Yaml(_))));

        let result = AppDefinition::parse("bind = 3", ConfigFormat::Toml);
        assert!(matches!(result, Err(ConfigError::TomlDeserialize(_))));
    }

    #[test]
    fn serialized_definition_reads_back() -> anyhow::Result<()> {
        let text = expected().to_string();
        assert_eq!(AppDefinition::parse(&text, ConfigFormat::Yaml)?, expected());
        Ok(())
    }

    #[test]
    fn format_from_path() {
        assert_eq!(ConfigFormat::from_path("a/portable.YML").ok(), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_path("a/portable.toml").ok(), Some(ConfigFormat::Toml));
        assert!(matches!(
            ConfigFormat::from_path("a/portable.ini"),
            Err(ConfigError::Unsupported(ext)) if ext == "ini"
        ));
    }
}
