mod cmd;
mod output;
mod root;

use clap::{error::ErrorKind, CommandFactory, Parser};
use shiftleft_core::catalog;
use shiftleft_core::config::{Config, WarnLevel};
use shiftleft_core::stage::Stage;
use shiftleft_core::PipelineError;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;

/// Exit status for usage errors (unknown flag or stage) in strict mode.
const STRICT_USAGE_EXIT: i32 = 2;

#[derive(Parser)]
#[command(
    name = "shiftleft",
    about = "Run the DevSecOps pipeline: secrets, dependencies, tests, IaC, scans, deploy",
    version
)]
struct Cli {
    /// Stage to run: all, talisman, dependency, python, terraform, ansible,
    /// sonar, docker, sast, dast, jenkins, monitoring, deploy
    #[arg(short = 's', long, default_value = "all", value_name = "NAME")]
    stage: String,

    /// Project root (default: auto-detect from .shiftleft/ or .git/)
    #[arg(long, env = "SHIFTLEFT_ROOT")]
    root: Option<PathBuf>,

    /// Print the commands the stage would run, without running them
    #[arg(long)]
    list: bool,

    /// Check that every tool the stage needs is installed
    #[arg(long)]
    check: bool,

    /// Write a default .shiftleft/config.yaml if none exists
    #[arg(long)]
    init: bool,

    /// Never try to install missing tools
    #[arg(long)]
    no_install: bool,

    /// Output as JSON
    #[arg(long, short = 'j')]
    json: bool,

    /// Log stage progress at info level
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => process::exit(report_parse_error(e)),
    };

    let default_level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    // RUST_LOG, when set, replaces the default level entirely
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    if cli.init {
        exit_on_error(cmd::init::run(&root));
        return;
    }

    // The stage name is checked before the config so a bad name always takes
    // the usage path, even when the config itself is invalid.
    let stage: Stage = match cli.stage.parse() {
        Ok(stage) => stage,
        Err(PipelineError::UnknownStage(name)) => {
            eprintln!("error: unknown stage '{name}'");
            eprintln!("valid stages: {}", Stage::names().join(", "));
            print_usage();
            process::exit(usage_exit_code(strict_usage_configured(&root)));
        }
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let config = match load_config(&root) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    };
    let actions = catalog::resolve_stage(stage, &config);

    let result = if cli.list {
        cmd::list::run(&actions, cli.json)
    } else if cli.check {
        cmd::check::run(&root, &actions, install_enabled(&cli, &config), cli.json)
    } else {
        cmd::run::run(&root, &actions, install_enabled(&cli, &config), cli.json)
    };
    exit_on_error(result);
}

fn load_config(root: &Path) -> anyhow::Result<Config> {
    use anyhow::Context;

    let config = Config::load(root).context("failed to load .shiftleft/config.yaml")?;
    for warning in config.validate() {
        if warning.level == WarnLevel::Warning {
            tracing::warn!("config: {}", warning.message);
        }
    }
    config.ensure_valid()?;
    Ok(config)
}

fn install_enabled(cli: &Cli, config: &Config) -> bool {
    config.install.enabled && !cli.no_install
}

fn exit_on_error(result: anyhow::Result<()>) {
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

/// Help and version requests exit 0. Any other parse failure prints the
/// error and usage, then exits through the usage path.
fn report_parse_error(err: clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            let _ = err.print();
            0
        }
        _ => {
            let _ = err.print();
            print_usage();
            // clap did not finish parsing, so read the root override directly
            let explicit = std::env::var_os("SHIFTLEFT_ROOT").map(PathBuf::from);
            usage_exit_code(strict_usage_configured(&root::resolve_root(
                explicit.as_deref(),
            )))
        }
    }
}

/// `strict_usage` from the config at `root`; an unreadable config counts as off.
fn strict_usage_configured(root: &Path) -> bool {
    Config::load(root).map(|c| c.strict_usage).unwrap_or(false)
}

fn print_usage() {
    println!();
    let _ = Cli::command().print_help();
}

fn usage_exit_code(config_strict: bool) -> i32 {
    let env_strict = std::env::var("SHIFTLEFT_STRICT_USAGE")
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);
    if config_strict || env_strict {
        STRICT_USAGE_EXIT
    } else {
        0
    }
}
