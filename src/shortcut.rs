// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Shortcut creation through the host's shell.
//!
//! Shortcuts are written by a [`ShortcutShell`]. Creating a shortcut usually
//! requires some host automation service to be set up first, e.g., a COM
//! session on Windows. So shells hand out a [`ShortcutSession`] that is
//! acquired once for a whole batch of shortcuts, and released when dropped.
//!
//! The traits exist as a seam for tests, which swap in a recording shell,
//! and for the one host-specific backend. They are not meant as a general
//! cross-platform shortcut abstraction.
//!
//! # Backends
//!
//! - [`wscript`]: `.lnk` files through `WScript.Shell` on Windows. This is
//!   the targeted host.
//! - [`freedesktop`]: minimal `.desktop` entries as a stand-in on other
//!   hosts, so that installs and tests run there too.

pub mod freedesktop;
#[cfg(windows)]
pub mod wscript;

use crate::app::Shortcut;

use std::path::{Path, PathBuf};

/// Shortcut shell of the current host.
#[cfg(windows)]
pub type NativeShell = wscript::WscriptShell;

/// Shortcut shell of the current host.
#[cfg(not(windows))]
pub type NativeShell = freedesktop::FreedesktopShell;

/// Host service that writes shortcut files.
pub trait ShortcutShell {
    /// Session type handed out by the shell.
    type Session: ShortcutSession;

    /// Extension of shortcut files, without leading dot.
    fn extension(&self) -> &str;

    /// Acquire a session for a batch of shortcut operations.
    ///
    /// # Errors
    ///
    /// - Return [`Error::Shell`] if the host service cannot be set up.
    fn open(&self) -> Result<Self::Session>;

    /// Path of the shortcut file for `shortcut` inside `place`.
    fn shortcut_path(&self, shortcut: &Shortcut, place: &Path) -> PathBuf {
        place.join(crate::path::with_extension(&shortcut.name, self.extension()))
    }
}

/// Scoped session of a [`ShortcutShell`].
///
/// Host resources held by a session are released when it is dropped.
pub trait ShortcutSession {
    /// Write shortcut file at `path`, replacing any existing one.
    ///
    /// # Errors
    ///
    /// - Return [`Error::Shell`] if the host service fails.
    /// - Return [`Error::Io`] if the shortcut file cannot be written.
    fn create(&mut self, shortcut: &Shortcut, path: &Path) -> Result<()>;
}

/// Check that a shortcut has everything needed to be created.
///
/// # Errors
///
/// - Return [`Error::Incomplete`] if name or target is empty.
pub fn validate(shortcut: &Shortcut) -> Result<()> {
    if shortcut.name.trim().is_empty() || shortcut.target.as_os_str().is_empty() {
        return Err(Error::Incomplete {
            name: shortcut.name.clone(),
        });
    }

    Ok(())
}

/// Shortcut operation error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Shortcut lacks a name or a target.
    #[error("shortcut {name:?} needs both a name and a target")]
    Incomplete { name: String },

    /// Host automation service fails.
    #[error("shortcut shell failed: {0}")]
    Shell(String),

    /// Shell session could not be acquired for this batch.
    #[error("shortcut shell unavailable: {0}")]
    Unavailable(String),

    /// Shortcut file cannot be written.
    #[error("failed to write shortcut at {:?}", path.display())]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = Error> = std::result::Result<T, E>;
