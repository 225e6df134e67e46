// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

#![cfg(unix)]

use portable::{
    app::{self, Shortcut},
    discover::discover,
    link::is_linked,
    shortcut::{self, freedesktop::FreedesktopShell},
    App, HostDirs, Reconciler, ShortcutSession, ShortcutShell,
};

use anyhow::Result;
use indoc::indoc;
use pretty_assertions::assert_eq;
use sealed_test::prelude::*;
use std::{
    cell::RefCell,
    env::current_dir,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

/// Shell double remembering every shortcut it was asked to write.
#[derive(Debug, Default, Clone)]
struct RecordingShell {
    written: Rc<RefCell<Vec<(String, PathBuf)>>>,
    sessions: Rc<RefCell<usize>>,
}

struct RecordingSession {
    written: Rc<RefCell<Vec<(String, PathBuf)>>>,
}

impl ShortcutShell for RecordingShell {
    type Session = RecordingSession;

    fn extension(&self) -> &str {
        "lnk"
    }

    fn open(&self) -> shortcut::Result<Self::Session> {
        *self.sessions.borrow_mut() += 1;
        Ok(RecordingSession {
            written: self.written.clone(),
        })
    }
}

impl ShortcutSession for RecordingSession {
    fn create(&mut self, shortcut: &Shortcut, path: &Path) -> shortcut::Result<()> {
        fs::write(path, shortcut.target.to_string_lossy().as_bytes()).map_err(|source| {
            shortcut::Error::Io {
                source,
                path: path.to_path_buf(),
            }
        })?;
        self.written
            .borrow_mut()
            .push((shortcut.name.clone(), path.to_path_buf()));
        Ok(())
    }
}

fn host(root: &Path) -> HostDirs {
    let home = root.join("home");
    HostDirs {
        desktop: Some(home.join("Desktop")),
        documents: Some(home.join("Documents")),
        local: Some(home.join(".local/share")),
        roaming: Some(home.join(".config")),
        start_menu: Some(home.join(".local/share/applications/PortableApps")),
        home: Some(home),
        ..HostDirs::default()
    }
}

fn write_app(dir: impl AsRef<Path>, definition: &str) -> Result<()> {
    fs::create_dir_all(dir.as_ref())?;
    fs::write(dir.as_ref().join("portable.yaml"), definition)?;
    Ok(())
}

const EDITOR: &str = indoc! {r#"
    name: Editor
    bind:
      - ${Roaming}/Editor
      - ${Documents}/Editor Projects
      - ${Base}/settings
    shortcut:
      - name: Editor
        target: bin/editor
        args: --portable
        category: Development
"#};

#[sealed_test]
fn install_and_uninstall_discovered_apps() -> Result<()> {
    let root = current_dir()?;
    let host = host(&root);
    write_app("apps/Editor", EDITOR)?;
    write_app("apps/.cache/Ghost", "name: Ghost\n")?;
    write_app(
        "apps/Viewer",
        indoc! {r#"
            bind:
              - ${Local}/Viewer/cache
        "#},
    )?;

    let apps = discover(&[root.join("apps")], 2, &host);
    let names = apps.iter().map(App::name).collect::<Vec<_>>();
    assert_eq!(names, vec!["Editor", "Viewer"]);

    let shell = RecordingShell::default();
    let reconciler = Reconciler::new(shell.clone());
    for app in &apps {
        reconciler.install(app)?;
    }

    let editor = &apps[0];
    let data = root.join("apps/Editor/Data");
    assert_eq!(
        editor
            .bindings()
            .iter()
            .map(|binding| binding.source.clone())
            .collect::<Vec<_>>(),
        vec![
            data.join("Roaming/Editor"),
            data.join("Documents/Editor Projects"),
            data.join("Base/settings"),
        ]
    );
    for binding in editor.bindings().iter().chain(apps[1].bindings()) {
        assert!(is_linked(&binding.source, &binding.link));
    }
    assert!(root.join("apps/Viewer/Data/Local/Viewer/cache").is_dir());

    // Only the Editor has shortcuts, so only one session was opened for it.
    assert_eq!(*shell.sessions.borrow(), 1);
    let written = shell
        .written
        .borrow()
        .iter()
        .map(|(_, path)| path.clone())
        .collect::<Vec<_>>();
    assert_eq!(
        written,
        vec![
            root.join("apps/Editor/Editor.lnk"),
            root.join("home/Desktop/Editor.lnk"),
            root.join("home/.local/share/applications/PortableApps/Development/Editor.lnk"),
        ]
    );
    assert_eq!(
        fs::read_to_string(root.join("home/Desktop/Editor.lnk"))?,
        root.join("apps/Editor/bin/editor").to_string_lossy()
    );

    // Content written through a link lands in the data root and survives.
    fs::write(root.join("home/.config/Editor/init.conf"), "theme = dark")?;

    for app in &apps {
        reconciler.uninstall(app)?;
    }
    for binding in editor.bindings() {
        assert!(fs::symlink_metadata(&binding.link).is_err());
    }
    for (_, path) in shell.written.borrow().iter() {
        assert!(!path.exists());
    }
    assert_eq!(
        fs::read_to_string(data.join("Roaming/Editor/init.conf"))?,
        "theme = dark"
    );

    Ok(())
}

#[sealed_test]
fn reinstall_after_moving_app() -> Result<()> {
    let root = current_dir()?;
    let host = host(&root);
    write_app("old/Editor", EDITOR)?;

    let reconciler = Reconciler::new(RecordingShell::default());
    let app = App::load("old/Editor", &host)?;
    reconciler.install(&app)?;
    fs::write(root.join("home/.config/Editor/init.conf"), "theme = dark")?;

    // Moving the app leaves dangling links behind, which get replaced.
    fs::rename("old", "new")?;
    let app = App::load("new/Editor", &host)?;
    reconciler.install(&app)?;

    assert_eq!(
        fs::read_to_string(root.join("home/.config/Editor/init.conf"))?,
        "theme = dark"
    );
    assert!(is_linked(
        root.join("new/Editor/Data/Roaming/Editor"),
        root.join("home/.config/Editor")
    ));

    Ok(())
}

#[sealed_test]
fn failed_app_does_not_block_others() -> Result<()> {
    let root = current_dir()?;
    let host = host(&root);
    write_app("apps/Editor", EDITOR)?;
    write_app("apps/Viewer", "bind: [\"${Local}/Viewer\"]\n")?;
    fs::create_dir_all(root.join("home/.config/Editor"))?;
    fs::write(root.join("home/.config/Editor/real.conf"), "mine")?;

    let reconciler = Reconciler::new(RecordingShell::default());
    let apps = discover(&[root.join("apps")], 1, &host);

    let failures = reconciler.install(&apps[0]).unwrap_err();
    assert_eq!(failures.len(), 1);
    assert_eq!(
        failures.iter().next().map(|failure| failure.path.clone()),
        Some(root.join("home/.config/Editor"))
    );
    assert_eq!(
        fs::read_to_string(root.join("home/.config/Editor/real.conf"))?,
        "mine"
    );
    assert!(is_linked(
        root.join("apps/Editor/Data/Base/settings"),
        root.join("apps/Editor/settings")
    ));

    reconciler.install(&apps[1])?;
    assert!(root.join("home/.local/share/Viewer").is_symlink());

    Ok(())
}

#[sealed_test]
fn desktop_entries_round_trip() -> Result<()> {
    let root = current_dir()?;
    let host = host(&root);
    write_app("apps/Editor", EDITOR)?;

    let app = App::load("apps/Editor", &host)?;
    let reconciler = Reconciler::new(FreedesktopShell::new());
    reconciler.install(&app)?;

    let entry = root.join("home/Desktop/Editor.desktop");
    let content = fs::read_to_string(&entry)?;
    assert!(content.contains(&format!(
        "Exec={} --portable\n",
        root.join("apps/Editor/bin/editor").display()
    )));
    assert!(content.contains("Categories=Development;\n"));

    reconciler.uninstall(&app)?;
    assert!(!entry.exists());
    assert!(root.join("home/Desktop").is_dir());

    Ok(())
}

#[sealed_test]
fn init_then_install() -> Result<()> {
    let root = current_dir()?;
    let host = host(&root);

    let path = app::init("apps/Blank", None)?;
    assert_eq!(fs::read_to_string(&path)?, "name: Blank\n");

    let app = App::load("apps/Blank", &host)?;
    Reconciler::new(RecordingShell::default()).install(&app)?;
    assert!(app.bindings().is_empty());
    assert!(!root.join("home").exists());

    Ok(())
}
