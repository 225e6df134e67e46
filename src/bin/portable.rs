// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

use portable::{
    app,
    discover::{self, DEFAULT_DEPTH},
    App, HostDirs, NativeShell, Reconciler,
};

use anyhow::{anyhow, Result};
use clap::{Args, Parser, Subcommand};
use std::{path::PathBuf, process::exit};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Parser)]
#[command(
    about,
    override_usage = "portable [options] <command> [<path>]...",
    subcommand_help_heading = "Commands",
    version
)]
struct Cli {
    /// Log every step, and show details when listing.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    fn run(self) -> Result<()> {
        let verbose = self.verbose;
        match self.command {
            Command::Install(opts) => run_install(opts),
            Command::Uninstall(opts) => run_uninstall(opts),
            Command::List(opts) => run_list(opts, verbose),
            Command::Init(opts) => run_init(opts),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Link bound paths into data roots and place shortcuts.
    #[command(
        visible_aliases = ["i", "add"],
        override_usage = "portable install [options] [<path>]..."
    )]
    Install(ReconcileOptions),

    /// Remove links and shortcuts, keeping data roots intact.
    #[command(
        visible_aliases = ["un", "del", "rm", "remove"],
        override_usage = "portable uninstall [options] [<path>]..."
    )]
    Uninstall(ReconcileOptions),

    /// List discovered portable applications.
    #[command(visible_alias = "ls", override_usage = "portable list [options] [<path>]...")]
    List(ListOptions),

    /// Write skeleton definition file.
    #[command(override_usage = "portable init [options] [<path>]")]
    Init(InitOptions),
}

#[derive(Args, Clone, Debug)]
struct ReconcileOptions {
    /// Application directories or definition files, or roots with --all.
    #[arg(value_name = "path")]
    pub paths: Vec<PathBuf>,

    /// Search given paths for applications instead of using them directly.
    #[arg(short, long)]
    pub all: bool,

    /// Number of directory levels to search with --all.
    #[arg(short, long, value_name = "levels", default_value_t = DEFAULT_DEPTH)]
    pub depth: usize,

    /// Replace real files and directories standing in the way.
    #[arg(short, long)]
    pub force: bool,

    /// Only show what would be done.
    #[arg(long)]
    pub dirty: bool,
}

#[derive(Args, Clone, Debug)]
struct ListOptions {
    /// Roots to search for applications.
    #[arg(value_name = "path")]
    pub paths: Vec<PathBuf>,

    /// Number of directory levels to search.
    #[arg(short, long, value_name = "levels", default_value_t = DEFAULT_DEPTH)]
    pub depth: usize,
}

#[derive(Args, Clone, Debug)]
struct InitOptions {
    /// Application directory to write definition into.
    #[arg(value_name = "path", default_value = ".")]
    pub path: PathBuf,

    /// Application name instead of the directory name.
    #[arg(short, long, value_name = "name")]
    pub name: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let layer = fmt::layer()
        .compact()
        .with_target(false)
        .without_time();
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(layer)
        .with(filter)
        .init();

    if let Err(error) = cli.run() {
        error!("{error:#}");
        exit(1);
    }

    exit(0)
}

fn default_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let paths = match paths.is_empty() {
        true => vec![PathBuf::from(".")],
        false => paths,
    };

    discover::expand_roots(paths)
}

/// Applications named by reconcile options, along with how many failed to
/// load. Only explicitly named applications count as failures.
fn select_apps(opts: &ReconcileOptions) -> (Vec<App>, usize) {
    let paths = default_paths(opts.paths.clone());
    let host = HostDirs::detect();
    match opts.all {
        true => (discover::discover(&paths, opts.depth, &host), 0),
        false => {
            let (apps, errors) = discover::load_paths(&paths, &host);
            (apps, errors.len())
        }
    }
}

fn reconciler(opts: &ReconcileOptions) -> Reconciler<NativeShell> {
    Reconciler::new(NativeShell::new())
        .force(opts.force)
        .dirty(opts.dirty)
}

fn run_install(opts: ReconcileOptions) -> Result<()> {
    let reconciler = reconciler(&opts);
    let (apps, mut failed) = select_apps(&opts);

    for app in apps {
        if let Err(failures) = reconciler.install(&app) {
            error!("{failures}");
            failed += 1;
        }
    }

    match failed {
        0 => Ok(()),
        count => Err(anyhow!("failed to install {count} application(s)")),
    }
}

fn run_uninstall(opts: ReconcileOptions) -> Result<()> {
    let reconciler = reconciler(&opts);
    let (apps, mut failed) = select_apps(&opts);

    for app in apps {
        if let Err(failures) = reconciler.uninstall(&app) {
            error!("{failures}");
            failed += 1;
        }
    }

    match failed {
        0 => Ok(()),
        count => Err(anyhow!("failed to uninstall {count} application(s)")),
    }
}

fn run_list(opts: ListOptions, verbose: bool) -> Result<()> {
    let paths = default_paths(opts.paths);
    for app in discover::discover(&paths, opts.depth, &HostDirs::detect()) {
        info!("{:<16} {}", app.name(), app.config_path().display());
        if !verbose {
            continue;
        }

        for binding in app.bindings() {
            info!(
                "  bind {} -> {}",
                binding.link.display(),
                binding.source.display()
            );
        }
        for shortcut in app.shortcuts() {
            for place in &shortcut.places {
                info!("  shortcut {:?} in {}", shortcut.name, place.display());
            }
        }
    }

    Ok(())
}

fn run_init(opts: InitOptions) -> Result<()> {
    app::init(&opts.path, opts.name.as_deref())?;
    Ok(())
}
