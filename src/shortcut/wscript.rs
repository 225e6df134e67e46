// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Shortcuts as Windows shell links.
//!
//! Windows only exposes `.lnk` creation through the `WScript.Shell` COM
//! object. A session hosts one PowerShell process holding that object, and
//! feeds it one statement per shortcut over stdin. Each statement answers
//! with a single status line on stdout, so failures stay attached to the
//! shortcut that caused them.
//!
//! The COM object is released, and the PowerShell process is reaped, when
//! the session is dropped.

use crate::{
    app::Shortcut,
    shortcut::{Error, Result, ShortcutSession, ShortcutShell},
};

use std::{
    io::{BufRead, BufReader, Write},
    path::Path,
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
};
use tracing::{debug, warn};

const OK: &str = "ok";
const ERR: &str = "err ";

/// Shortcut shell backed by `WScript.Shell`.
#[derive(Debug, Default, Clone, Copy)]
pub struct WscriptShell;

impl WscriptShell {
    /// Construct new `WScript.Shell` backed shell.
    pub fn new() -> Self {
        Self
    }
}

impl ShortcutShell for WscriptShell {
    type Session = WscriptSession;

    fn extension(&self) -> &str {
        "lnk"
    }

    fn open(&self) -> Result<Self::Session> {
        let mut child = Command::new("powershell.exe")
            .args([
                "-NoLogo",
                "-NoProfile",
                "-NonInteractive",
                "-ExecutionPolicy",
                "Bypass",
                "-Command",
                "-",
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| Error::Shell(format!("cannot start powershell: {err}")))?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take().map(BufReader::new);
        let (Some(stdin), Some(stdout)) = (stdin, stdout) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::Shell("cannot attach to powershell".into()));
        };

        let mut session = WscriptSession {
            child,
            stdin: Some(stdin),
            stdout,
        };
        session.call(
            "try { $ws = New-Object -ComObject WScript.Shell; [Console]::Out.WriteLine('ok') } \
             catch { [Console]::Out.WriteLine('err ' + $_.Exception.Message) }; \
             [Console]::Out.Flush()",
        )?;
        debug!("acquired WScript.Shell session");

        Ok(session)
    }
}

/// Session of [`WscriptShell`].
#[derive(Debug)]
pub struct WscriptSession {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl WscriptSession {
    /// Run one statement and wait for its status line.
    fn call(&mut self, statement: &str) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| Error::Shell("session already closed".into()))?;
        writeln!(stdin, "{statement}")
            .and_then(|_| stdin.flush())
            .map_err(|err| Error::Shell(format!("cannot talk to powershell: {err}")))?;

        let mut line = String::new();
        let read = self
            .stdout
            .read_line(&mut line)
            .map_err(|err| Error::Shell(format!("cannot read from powershell: {err}")))?;
        if read == 0 {
            return Err(Error::Shell("powershell exited unexpectedly".into()));
        }

        match line.trim_end() {
            OK => Ok(()),
            status => Err(Error::Shell(
                status.strip_prefix(ERR).unwrap_or(status).to_string(),
            )),
        }
    }
}

impl ShortcutSession for WscriptSession {
    fn create(&mut self, shortcut: &Shortcut, path: &Path) -> Result<()> {
        self.call(&create_statement(shortcut, path))
    }
}

impl Drop for WscriptSession {
    fn drop(&mut self) {
        if let Some(mut stdin) = self.stdin.take() {
            let _ = writeln!(
                stdin,
                "[void][Runtime.InteropServices.Marshal]::ReleaseComObject($ws)"
            );
        }

        if let Err(err) = self.child.wait() {
            warn!("failed to reap powershell: {err}");
        }
        debug!("released WScript.Shell session");
    }
}

/// Build the PowerShell statement creating one shell link.
fn create_statement(shortcut: &Shortcut, path: &Path) -> String {
    let mut props = vec![
        ("TargetPath", quote(&shortcut.target.to_string_lossy())),
        ("WorkingDirectory", quote(&shortcut.workdir.to_string_lossy())),
        ("Arguments", quote(&shortcut.args)),
        ("Description", quote(&shortcut.description)),
        ("Hotkey", quote(&shortcut.hotkey)),
        ("IconLocation", quote(&shortcut.icon)),
    ];
    props.retain(|(_, value)| value != "''");
    if let Some(style) = window_style(&shortcut.style) {
        props.push(("WindowStyle", style.to_string()));
    }

    let mut statement = format!("try {{ $s = $ws.CreateShortcut({}); ", quote(&path.to_string_lossy()));
    for (key, value) in props {
        statement.push_str(&format!("$s.{key} = {value}; "));
    }
    statement.push_str(
        "$s.Save(); [Console]::Out.WriteLine('ok') } \
         catch { [Console]::Out.WriteLine('err ' + $_.Exception.Message) }; \
         [Console]::Out.Flush()",
    );

    statement
}

/// Window style number understood by `WScript.Shell`.
fn window_style(style: &str) -> Option<u8> {
    match style.trim().to_ascii_lowercase().as_str() {
        "" => None,
        "normal" => Some(1),
        "maximized" | "max" => Some(3),
        "minimized" | "min" => Some(7),
        number => number.parse().ok(),
    }
}

/// Quote a value as a single line PowerShell literal.
fn quote(value: &str) -> String {
    let value = value.replace(['\r', '\n'], " ").replace('\'', "''");
    format!("'{value}'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn create_statement_sets_non_empty_properties() {
        let shortcut = Shortcut {
            name: "Foo".into(),
            target: r"C:\Apps\Foo\foo.exe".into(),
            workdir: r"C:\Apps\Foo".into(),
            args: "--name 'bar'".into(),
            style: "maximized".into(),
            ..Shortcut::default()
        };

        let statement = create_statement(&shortcut, Path::new(r"C:\Users\u\Desktop\Foo.lnk"));
        assert!(statement.starts_with(r"try { $s = $ws.CreateShortcut('C:\Users\u\Desktop\Foo.lnk'); "));
        assert!(statement.contains(r"$s.TargetPath = 'C:\Apps\Foo\foo.exe'; "));
        assert!(statement.contains("$s.Arguments = '--name ''bar'''; "));
        assert!(statement.contains("$s.WindowStyle = 3; "));
        assert!(!statement.contains("Description"));
        assert!(!statement.contains('\n'));
    }

    #[test]
    fn window_style_names_and_numbers() {
        assert_eq!(window_style("Normal"), Some(1));
        assert_eq!(window_style("7"), Some(7));
        assert_eq!(window_style(""), None);
        assert_eq!(window_style("weird"), None);
    }
}
