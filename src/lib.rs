// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Install and uninstall portable applications.
//!
//! A __portable application__ is a self-contained directory holding a
//! definition file. The definition lists paths the application expects to
//! find on the host that should instead live inside the application's own
//! data root, and shortcuts pointing at executables inside the application.
//!
//! Installing an application turns each of those host paths into a symlink
//! to its canonical location in the data root, and places each shortcut.
//! Uninstalling removes the symlinks and shortcuts again, leaving the data
//! root intact. Moving the application directory to another host and
//! installing it there brings all of its state along.
//!
//! # Pipeline
//!
//! 1. [`discover`] locates application directories below a set of roots.
//! 2. [`App::load`] reads a definition, expands `${Name}` placeholders
//!    through an [`AliasTable`], and maps every bound path into the data
//!    root with [`map_to_canonical`].
//! 3. [`Reconciler`] installs or uninstalls the resolved application,
//!    collecting every failed operation into [`Failures`].

pub mod alias;
pub mod app;
pub mod canonical;
pub mod config;
pub mod discover;
pub mod link;
pub mod path;
pub mod reconcile;
pub mod shortcut;
pub mod template;

pub use alias::{AliasTable, HostDirs};
pub use app::{App, Binding, Shortcut};
pub use canonical::map_to_canonical;
pub use config::{AppDefinition, ConfigFormat, ShortcutDefinition};
pub use discover::{discover, expand_roots};
pub use reconcile::{Failures, Reconciler};
pub use shortcut::{NativeShell, ShortcutSession, ShortcutShell};
pub use template::Template;
