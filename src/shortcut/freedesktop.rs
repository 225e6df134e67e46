// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Shortcuts as XDG desktop entries.
//!
//! Writes `.desktop` files following the Desktop Entry Specification. There
//! is no host service to talk to, so sessions hold nothing.
//!
//! # See Also
//!
//! - [Desktop Entry format](https://specifications.freedesktop.org/desktop-entry-spec/latest/)

use crate::{
    app::Shortcut,
    shortcut::{Error, Result, ShortcutSession, ShortcutShell},
};

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs,
    path::Path,
};
use tracing::debug;

/// Shortcut shell writing desktop entries.
#[derive(Debug, Default, Clone, Copy)]
pub struct FreedesktopShell;

impl FreedesktopShell {
    /// Construct new desktop entry shell.
    pub fn new() -> Self {
        Self
    }
}

impl ShortcutShell for FreedesktopShell {
    type Session = FreedesktopSession;

    fn extension(&self) -> &str {
        "desktop"
    }

    fn open(&self) -> Result<Self::Session> {
        Ok(FreedesktopSession)
    }
}

/// Session of [`FreedesktopShell`].
#[derive(Debug)]
pub struct FreedesktopSession;

impl ShortcutSession for FreedesktopSession {
    fn create(&mut self, shortcut: &Shortcut, path: &Path) -> Result<()> {
        let io_err = |source| Error::Io {
            source,
            path: path.to_path_buf(),
        };

        fs::write(path, render(shortcut)).map_err(io_err)?;

        // INVARIANT: Desktop environments only trust executable entries.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).map_err(io_err)?;
        }

        debug!("wrote desktop entry {:?}", path.display());
        Ok(())
    }
}

/// Render desktop entry content for a shortcut.
pub fn render(shortcut: &Shortcut) -> String {
    DesktopEntry(shortcut).to_string()
}

/// Desktop entry view of a shortcut.
#[derive(Debug, Clone, Copy)]
pub struct DesktopEntry<'a>(pub &'a Shortcut);

impl Display for DesktopEntry<'_> {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        let shortcut = self.0;

        let mut exec = quote_arg(&shortcut.target.to_string_lossy());
        if !shortcut.args.trim().is_empty() {
            exec.push(' ');
            exec.push_str(shortcut.args.trim());
        }

        let name = Path::new(&shortcut.name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| shortcut.name.clone());

        writeln!(fmt, "[Desktop Entry]")?;
        writeln!(fmt, "Type=Application")?;
        writeln!(fmt, "Name={}", escape_value(&name))?;
        if !shortcut.description.is_empty() {
            writeln!(fmt, "Comment={}", escape_value(&shortcut.description))?;
        }
        writeln!(fmt, "Exec={exec}")?;
        if !shortcut.workdir.as_os_str().is_empty() {
            writeln!(fmt, "Path={}", shortcut.workdir.to_string_lossy())?;
        }
        if !shortcut.icon.is_empty() {
            writeln!(fmt, "Icon={}", shortcut.icon)?;
        }
        writeln!(fmt, "Terminal=false")?;
        if !shortcut.category.is_empty() {
            writeln!(fmt, "Categories={};", shortcut.category)?;
        }

        Ok(())
    }
}

/// Quote an argument of the `Exec` key when it needs it.
fn quote_arg(arg: &str) -> String {
    const RESERVED: &[char] = &[
        ' ', '\t', '\n', '"', '\'', '\\', '>', '<', '~', '|', '&', ';', '$', '*', '?', '#', '(',
        ')', '`',
    ];

    if !arg.contains(RESERVED) {
        return arg.to_string();
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for ch in arg.chars() {
        if matches!(ch, '"' | '`' | '$' | '\\') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

fn escape_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\t', "\\t")
}
