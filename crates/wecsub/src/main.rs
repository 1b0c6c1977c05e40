use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use wecsub::commands::{self, Command, Context};
use wecsub::host::{self, TargetArgs};
use wecsub::prompt;
use wecsub_core::config::load_config;
use wecsub_core::tracing_init::{default_filter, init_tracing};

/// Manage Windows Event Collector subscriptions.
#[derive(Debug, Parser)]
#[command(name = "wecsub", version, about)]
struct Cli {
    /// Collector to manage (default: configured default computer, else this machine)
    #[arg(long, global = true)]
    computer: Option<String>,

    /// Named session profile from settings.json
    #[arg(long, global = true, conflicts_with = "computer")]
    session: Option<String>,

    /// User name for remoting; the password comes from WECSUB_PASSWORD or a prompt
    #[arg(long, global = true)]
    credential: Option<String>,

    /// Path to a settings.json to use instead of the global one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Run without interactive prompts
    #[arg(long, global = true)]
    non_interactive: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    init_tracing(&default_filter(&config.log_level), cli.log_json);

    let target = TargetArgs {
        computer: cli.computer,
        session: cli.session,
        credential: cli.credential,
    };
    let non_interactive = cli.non_interactive;
    let shell = host::connect(&target, &config, |user| prompt::password(user, non_interactive))?;
    tracing::debug!(computer = shell.computer(), "connected");

    let ctx = Context {
        shell: shell.as_ref(),
        config: &config,
        non_interactive,
        json: cli.json,
    };
    commands::run(&ctx, cli.command)
}
