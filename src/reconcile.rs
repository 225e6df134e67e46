// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Install and uninstall portable applications.
//!
//! Installing an application means making every binding a symlink into the
//! data root, and writing every shortcut into each of its places.
//! Uninstalling removes those symlinks and shortcut files again. Content in
//! the data root is never touched by either direction.
//!
//! # Error Handling
//!
//! Operations are independent of each other. A failing operation never
//! stops the remaining ones. Instead, every failure is collected into one
//! [`Failures`] aggregate returned once the whole pass is over. Each
//! operation is also logged individually as it completes.
//!
//! # Concurrency
//!
//! No locking is performed. Callers must make sure that a given application
//! is not installed or uninstalled by two passes at the same time.

use crate::{
    app::{App, Binding, Shortcut},
    link::{self, Outcome},
    shortcut::{self, ShortcutSession, ShortcutShell},
};

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs,
    path::{Path, PathBuf},
};
use tracing::{error, info, instrument};

/// Single unit of work of an install or uninstall pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation<'a> {
    /// Symlink from a bound path into the data root.
    Symlink(&'a Binding),

    /// Shortcut file inside one of the shortcut's places.
    Shortcut {
        shortcut: &'a Shortcut,
        path: PathBuf,
    },
}

impl Operation<'_> {
    /// Path that the operation creates or removes.
    pub fn path(&self) -> &Path {
        match self {
            Self::Symlink(binding) => &binding.link,
            Self::Shortcut { path, .. } => path,
        }
    }
}

impl Display for Operation<'_> {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Symlink(binding) => write!(
                fmt,
                "symlink {:?} -> {:?}",
                binding.link.display(),
                binding.source.display()
            ),
            Self::Shortcut { shortcut, path } => write!(
                fmt,
                "shortcut {:?} -> {:?}",
                path.display(),
                shortcut.target.display()
            ),
        }
    }
}

/// Lay out every operation of an application, bindings first.
pub fn plan<'a>(app: &'a App, shell: &impl ShortcutShell) -> Vec<Operation<'a>> {
    let symlinks = app.bindings().iter().map(Operation::Symlink);
    let shortcuts = app.shortcuts().iter().flat_map(|shortcut| {
        shortcut.places.iter().map(move |place| Operation::Shortcut {
            shortcut,
            path: shell.shortcut_path(shortcut, place),
        })
    });

    symlinks.chain(shortcuts).collect()
}

/// Which way a pass goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Install,
    Uninstall,
}

impl Display for Direction {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
        })
    }
}

/// Applies install and uninstall passes to applications.
#[derive(Debug, Clone)]
pub struct Reconciler<S>
where
    S: ShortcutShell,
{
    shell: S,
    force: bool,
    dirty: bool,
}

impl<S> Reconciler<S>
where
    S: ShortcutShell,
{
    /// Construct new reconciler writing shortcuts through `shell`.
    pub fn new(shell: S) -> Self {
        Self {
            shell,
            force: false,
            dirty: false,
        }
    }

    /// Replace real content standing in the way of links.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Only resolve and log operations, without touching the file system.
    pub fn dirty(mut self, dirty: bool) -> Self {
        self.dirty = dirty;
        self
    }

    /// Shell used for shortcut operations.
    pub fn shell(&self) -> &S {
        &self.shell
    }

    /// Create every symlink and shortcut of an application.
    ///
    /// Symlinks that already point at the right place are left alone unless
    /// force is set.
    ///
    /// # Errors
    ///
    /// - Return [`Failures`] listing every operation that failed.
    #[instrument(skip(self, app), fields(app = app.name()), level = "debug")]
    pub fn install(&self, app: &App) -> Result<(), Failures> {
        self.run(app, Direction::Install)
    }

    /// Remove every symlink and shortcut of an application.
    ///
    /// Missing symlinks and shortcuts are not an error.
    ///
    /// # Errors
    ///
    /// - Return [`Failures`] listing every operation that failed.
    #[instrument(skip(self, app), fields(app = app.name()), level = "debug")]
    pub fn uninstall(&self, app: &App) -> Result<(), Failures> {
        self.run(app, Direction::Uninstall)
    }

    fn run(&self, app: &App, direction: Direction) -> Result<(), Failures> {
        info!(
            "{direction} {:?} from {:?} (force = {}, dirty = {})",
            app.name(),
            app.base().display(),
            self.force,
            self.dirty
        );

        let operations = plan(app, &self.shell);
        let data_root = app.data_root();
        let mut failures = Failures::new(app.name());

        if self.dirty {
            for operation in &operations {
                let outcome = self.planned(operation, direction);
                info!(dirty = true, "{direction} {operation}: {outcome}");
            }
            return Ok(());
        }

        // INVARIANT: Acquire one shell session per pass, and only when needed.
        let needs_session = direction == Direction::Install
            && operations
                .iter()
                .any(|operation| matches!(operation, Operation::Shortcut { .. }));
        let mut session = match needs_session {
            true => Some(self.shell.open().map_err(|err| err.to_string())),
            false => None,
        };

        for operation in operations {
            let result = match direction {
                Direction::Install => self.create(&operation, &data_root, session.as_mut()),
                Direction::Uninstall => self.remove(&operation, &data_root),
            };

            match result {
                Ok(outcome) => info!("{direction} {operation}: {outcome}"),
                Err(err) => {
                    error!("{direction} {operation}: {err}");
                    failures.push(direction, operation, err);
                }
            }
        }

        drop(session);
        failures.into_result()
    }

    /// Outcome an operation would have, judged without touching anything.
    fn planned(&self, operation: &Operation<'_>, direction: Direction) -> Outcome {
        let exists = fs::symlink_metadata(operation.path()).is_ok();
        match (direction, operation) {
            (Direction::Install, Operation::Symlink(binding))
                if !self.force && link::is_linked(&binding.source, &binding.link) =>
            {
                Outcome::Unchanged
            }
            (Direction::Install, _) if exists => Outcome::Replaced,
            (Direction::Install, _) => Outcome::Created,
            (Direction::Uninstall, _) if exists => Outcome::Removed,
            (Direction::Uninstall, _) => Outcome::Absent,
        }
    }

    fn create(
        &self,
        operation: &Operation<'_>,
        data_root: &Path,
        session: Option<&mut Result<S::Session, String>>,
    ) -> Result<Outcome, OperationError> {
        match operation {
            Operation::Symlink(binding) => {
                check_overlap(binding, data_root)?;
                Ok(link::create_symlink(&binding.source, &binding.link, self.force)?)
            }
            Operation::Shortcut { shortcut, path } => {
                shortcut::validate(shortcut)?;
                let session = match session {
                    Some(Ok(session)) => session,
                    Some(Err(reason)) => {
                        return Err(shortcut::Error::Unavailable(reason.clone()).into())
                    }
                    None => return Err(shortcut::Error::Unavailable("no session".into()).into()),
                };

                let outcome = match path.exists() {
                    true => Outcome::Replaced,
                    false => Outcome::Created,
                };
                if let Some(place) = path.parent() {
                    link::ensure_dir(place)?;
                }
                session.create(shortcut, path)?;
                Ok(outcome)
            }
        }
    }

    // INVARIANT: Shortcut files count as links for bindings and shortcuts alike.
    fn remove(
        &self,
        operation: &Operation<'_>,
        data_root: &Path,
    ) -> Result<Outcome, OperationError> {
        let extension = Some(self.shell.extension());
        match operation {
            Operation::Symlink(binding) => {
                check_overlap(binding, data_root)?;
                Ok(link::remove_link(&binding.link, self.force, extension)?)
            }
            Operation::Shortcut { path, .. } => Ok(link::remove_link(path, self.force, extension)?),
        }
    }
}

/// Reject a binding whose link overlaps the data root in either direction,
/// or contains its own source.
///
/// # Errors
///
/// - Return [`OperationError::Overlap`] if the binding overlaps.
fn check_overlap(binding: &Binding, data_root: &Path) -> Result<(), OperationError> {
    let link = binding.link.as_path();
    if link.starts_with(data_root) || data_root.starts_with(link) || binding.source.starts_with(link)
    {
        return Err(OperationError::Overlap {
            path: link.to_path_buf(),
            data_root: data_root.to_path_buf(),
        });
    }

    Ok(())
}

/// Reason a single operation failed.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    /// Symlink or file system handling fails.
    #[error(transparent)]
    Link(#[from] link::Error),

    /// Shortcut handling fails.
    #[error(transparent)]
    Shortcut(#[from] shortcut::Error),

    /// Bound path overlaps the data root.
    #[error("{:?} overlaps data root {:?}", path.display(), data_root.display())]
    Overlap { path: PathBuf, data_root: PathBuf },
}

/// Single failed operation.
#[derive(Debug)]
pub struct Failure {
    /// Description of the operation.
    pub operation: String,

    /// Path the operation acted upon.
    pub path: PathBuf,

    /// Cause of the failure.
    pub error: OperationError,
}

impl Display for Failure {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(fmt, "{}: {}", self.operation, self.error)?;
        let mut source = std::error::Error::source(&self.error);
        while let Some(cause) = source {
            write!(fmt, ": {cause}")?;
            source = cause.source();
        }

        Ok(())
    }
}

/// Aggregate of every failed operation of a pass.
#[derive(Debug)]
pub struct Failures {
    app: String,
    items: Vec<Failure>,
}

impl Failures {
    fn new(app: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            items: Vec::new(),
        }
    }

    fn push(&mut self, direction: Direction, operation: Operation<'_>, error: OperationError) {
        self.items.push(Failure {
            path: operation.path().to_path_buf(),
            operation: format!("{direction} {operation}"),
            error,
        });
    }

    fn into_result(self) -> Result<(), Self> {
        match self.items.is_empty() {
            true => Ok(()),
            false => Err(self),
        }
    }

    /// Name of the application the failures belong to.
    pub fn app(&self) -> &str {
        &self.app
    }

    /// Iterate through failures in the order they happened.
    pub fn iter(&self) -> impl Iterator<Item = &Failure> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Display for Failures {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(
            fmt,
            "{} operation(s) failed for {:?}",
            self.items.len(),
            self.app
        )?;
        for failure in &self.items {
            write!(fmt, "\n  - {failure}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Failures {}
