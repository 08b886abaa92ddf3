//! Interactive workflow configurator.
//!
//! Asks for a working directory, a phase and a module, then for each of the
//! module's arguments, and saves the answers as a workflow YAML document.
//! Analyse-phase sessions may bundle several modules into one `meta` document.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use configurator::check::check_workflow_file;
use configurator::core::schema::{SchemaProvider, effective_args};
use configurator::core::types::{META_MODULE, Phase};
use configurator::exit_codes;
use configurator::io::config::{ConfiguratorConfig, load_config, write_config};
use configurator::io::library::ModuleLibrary;
use configurator::io::screens::Screens;
use configurator::logging;
use configurator::present::{Presenter, SessionEnd};
use configurator::session::Session;
use configurator::validate::Validator;

#[derive(Parser)]
#[command(
    name = "configurator",
    version,
    about = "Interactive builder for pipeline workflow configurations"
)]
struct Cli {
    /// Path to the configurator config file.
    #[arg(long, global = true, default_value = "configurator.toml")]
    config: PathBuf,

    /// Log engine decisions to stderr (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a default config file and create the workflows directory.
    Init {
        /// Overwrite an existing config file.
        #[arg(short, long)]
        force: bool,
    },
    /// Build a workflow interactively and save it.
    New,
    /// List the selectable modules of a phase.
    Modules {
        /// `select` or `analyse`.
        phase: Phase,
    },
    /// Print the arguments a module is configured with, in question order.
    Args {
        /// `select` or `analyse`.
        phase: Phase,
        module: String,
    },
    /// Check a saved workflow document against the module library.
    Check { file: PathBuf },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Command::Init { force } => cmd_init(&cli.config, force),
        Command::New => cmd_new(&load_config(&cli.config)?),
        Command::Modules { phase } => cmd_modules(&load_config(&cli.config)?, phase),
        Command::Args { phase, module } => cmd_args(&load_config(&cli.config)?, phase, &module),
        Command::Check { file } => cmd_check(&load_config(&cli.config)?, &file),
    }
}

fn cmd_init(config_path: &Path, force: bool) -> Result<i32> {
    if config_path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    let cfg = ConfiguratorConfig::default();
    write_config(config_path, &cfg).with_context(|| format!("write {}", config_path.display()))?;
    fs::create_dir_all(&cfg.workflows_dir)
        .with_context(|| format!("create {}", cfg.workflows_dir.display()))?;
    info!(path = %config_path.display(), "config written");
    Ok(exit_codes::OK)
}

fn cmd_new(cfg: &ConfiguratorConfig) -> Result<i32> {
    let library = ModuleLibrary::from_config(cfg);
    let validator = Validator::new(&cfg.folder_root);
    let screens = Screens::new()?;
    let presenter = Presenter {
        validator: &validator,
        screens: &screens,
        workflows_dir: &cfg.workflows_dir,
    };
    let mut session = Session::start(library).context("start session")?;
    let stdin = io::stdin();
    let end = presenter.run(&mut session, stdin.lock(), io::stdout().lock())?;
    Ok(match end {
        SessionEnd::Saved(_) => exit_codes::OK,
        SessionEnd::Quit => exit_codes::QUIT,
    })
}

fn cmd_modules(cfg: &ConfiguratorConfig, phase: Phase) -> Result<i32> {
    let library = ModuleLibrary::from_config(cfg);
    for module in library.modules(phase)? {
        if module != META_MODULE {
            println!("{module}");
        }
    }
    Ok(exit_codes::OK)
}

fn cmd_args(cfg: &ConfiguratorConfig, phase: Phase, module: &str) -> Result<i32> {
    let library = ModuleLibrary::from_config(cfg);
    for arg in effective_args(&library, module, phase)? {
        let required = if arg.required { "required" } else { "optional" };
        println!("{}\t{}\t{}", arg.name, arg.arg_type, required);
    }
    Ok(exit_codes::OK)
}

fn cmd_check(cfg: &ConfiguratorConfig, file: &Path) -> Result<i32> {
    let library = ModuleLibrary::from_config(cfg);
    let problems = check_workflow_file(file, &library)?;
    if !problems.is_empty() {
        bail!(
            "workflow check failed for {}:\n- {}",
            file.display(),
            problems.join("\n- ")
        );
    }
    println!("ok: {}", file.display());
    Ok(exit_codes::OK)
}
